//! Client for the Azure Key Vault REST API (version 7.3).
//!
//! A [`KeyVaultClient`] authenticates every request with a bearer token from a
//! [`TokenCredential`] and hands out [`Secret`] and [`Key`] handles. Each handle
//! method is one request/response round trip against the vault:
//!
//! ```no_run
//! # async fn run() -> Result<(), azure_keyvault_rest::KeyVaultError> {
//! use azure_keyvault_rest::{KeyVaultClient, SignatureAlgorithm};
//!
//! let client = KeyVaultClient::new("{client_id}", "{client_secret}", "{tenant_id}", "my-vault")?;
//!
//! let password = client.secret("db-password").get_value().await?;
//! let jwk = client.key("signer").get_key().await?;
//! let signed = client
//!     .key("signer")
//!     .sign_digest(&[0u8; 32], SignatureAlgorithm::ES256)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod credential;
mod error;
mod key;
mod models;
mod secret;

pub use client::{KeyVaultClient, API_VERSION};
pub use config::KeyVaultConfig;
pub use credential::{ClientSecretCredential, StaticTokenCredential, TokenCredential, PUBLIC_RESOURCE};
pub use error::KeyVaultError;
pub use key::{JsonWebKey, Key, KeyBundle, KeyItem, KeyOperationResult, SignatureAlgorithm, UnknownAlgorithm};
pub use models::{Attributes, Page};
pub use secret::{Secret, SecretBundle, SecretItem};

// Re-exported so callers of `KeyVaultClient::fetch` need no direct reqwest dependency.
pub use reqwest::{header, Method, Response, StatusCode, Url};
