use crate::KeyVaultError;
use anyhow::Context;
use async_trait::async_trait;
use azure_sdk_auth_aad::authorize_non_interactive;
use chrono::{DateTime, Duration, Utc};
use oauth2::{AccessToken, ClientId, ClientSecret};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Resource the public cloud issues Key Vault tokens for.
pub const PUBLIC_RESOURCE: &str = "https://vault.azure.net";

/// Source of bearer tokens attached to every Key Vault request.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Returns a token that is valid right now, refreshing it if needed.
    async fn bearer_token(&self) -> Result<String, KeyVaultError>;
}

/// Tokens this close to expiry are refreshed instead of sent.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug)]
struct CachedToken {
    token: AccessToken,
    expires_on: DateTime<Utc>,
}

impl CachedToken {
    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_on - Duration::seconds(EXPIRY_MARGIN_SECS) > now
    }
}

/// Azure Active Directory application identity (client credentials flow).
///
/// The token is cached until it expires and refreshed on the next call.
///
/// # Examples
///
/// ```
/// use azure_keyvault_rest::ClientSecretCredential;
/// let credential = ClientSecretCredential::new("{client_id}", "{client_secret}", "{tenant_id}");
/// ```
pub struct ClientSecretCredential {
    client_id: ClientId,
    client_secret: ClientSecret,
    tenant_id: String,
    resource: String,
    http: Arc<reqwest::Client>,
    cache: Mutex<Option<CachedToken>>,
}

impl ClientSecretCredential {
    pub fn new(client_id: &str, client_secret: &str, tenant_id: &str) -> Self {
        Self::new_with_resource(client_id, client_secret, tenant_id, PUBLIC_RESOURCE)
    }

    /// Creates a credential for a non-public cloud, e.g. `https://vault.azure.cn`.
    pub fn new_with_resource(client_id: &str, client_secret: &str, tenant_id: &str, resource: &str) -> Self {
        Self {
            client_id: ClientId::new(client_id.to_owned()),
            client_secret: ClientSecret::new(client_secret.to_owned()),
            tenant_id: tenant_id.to_owned(),
            resource: resource.to_owned(),
            http: Arc::new(reqwest::Client::new()),
            cache: Mutex::new(None),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl std::fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("client_id", &self.client_id)
            .field("tenant_id", &self.tenant_id)
            .field("resource", &self.resource)
            .finish()
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn bearer_token(&self) -> Result<String, KeyVaultError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.is_valid_at(Utc::now()) {
                return Ok(cached.token.secret().clone());
            }
        }

        tracing::debug!(tenant_id = %self.tenant_id, resource = %self.resource, "refreshing AAD token");
        let token = authorize_non_interactive(
            self.http.clone(),
            &self.client_id,
            &self.client_secret,
            &self.resource,
            &self.tenant_id,
        )
        .await
        .with_context(|| "Failed to authenticate to Azure Active Directory")
        .map_err(KeyVaultError::AuthorizationError)?;

        let secret = token.access_token().secret().clone();
        *cache = Some(CachedToken {
            token: token.access_token().clone(),
            expires_on: token.expires_on,
        });
        Ok(secret)
    }
}

/// A pre-issued bearer token, used as-is for every request.
#[derive(Clone)]
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    /// Accepts the raw token or a full `Bearer <token>` header value.
    pub fn new(token: &str) -> Self {
        let trimmed = token.trim();
        let token = match trimmed.get(..7) {
            Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => trimmed[7..].trim_start(),
            _ => trimmed,
        };
        Self {
            token: token.to_owned(),
        }
    }
}

impl std::fmt::Debug for StaticTokenCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticTokenCredential { .. }")
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn bearer_token(&self) -> Result<String, KeyVaultError> {
        Ok(self.token.clone())
    }
}
