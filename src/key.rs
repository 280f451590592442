use crate::client::{ensure_name, max_results};
use crate::models::{last_segment, Attributes, Page};
use crate::KeyVaultClient;
use crate::KeyVaultError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use getset::Getters;
use reqwest::{Method, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Public (and for exportable keys, private) key material in JSON Web Key form.
/// Binary members are kept as the base64url text the service returns.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct JsonWebKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
    kty: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    key_ops: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    e: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    qi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    p: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    k: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_hsm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<String>,
}

/// Response of `GET /keys/{name}[/{version}]`.
#[derive(Deserialize, Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct KeyBundle {
    key: JsonWebKey,
    attributes: Attributes,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    managed: Option<bool>,
}

impl KeyBundle {
    pub fn into_key(self) -> JsonWebKey {
        self.key
    }
}

/// One entry of `GET /keys/{name}/versions`.
#[derive(Deserialize, Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct KeyItem {
    kid: String,
    attributes: Attributes,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    managed: Option<bool>,
}

impl KeyItem {
    /// Version id, taken from the last segment of `kid`.
    pub fn version(&self) -> &str {
        last_segment(&self.kid)
    }
}

/// Response of `POST /keys/{name}[/{version}]/sign`.
#[derive(Deserialize, Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct KeyOperationResult {
    kid: String,
    value: String,
}

impl KeyOperationResult {
    /// Decodes the base64url signature.
    pub fn signature(&self) -> Result<Vec<u8>, KeyVaultError> {
        Ok(URL_SAFE_NO_PAD.decode(self.value.trim_end_matches('='))?)
    }
}

/// Signing algorithms accepted by the `sign` operation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    PS256,
    PS384,
    PS512,
    RS256,
    RS384,
    RS512,
    RSNULL,
    ES256,
    ES384,
    ES512,
    ES256K,
}

impl SignatureAlgorithm {
    pub const ALL: [SignatureAlgorithm; 11] = [
        SignatureAlgorithm::PS256,
        SignatureAlgorithm::PS384,
        SignatureAlgorithm::PS512,
        SignatureAlgorithm::RS256,
        SignatureAlgorithm::RS384,
        SignatureAlgorithm::RS512,
        SignatureAlgorithm::RSNULL,
        SignatureAlgorithm::ES256,
        SignatureAlgorithm::ES384,
        SignatureAlgorithm::ES512,
        SignatureAlgorithm::ES256K,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SignatureAlgorithm::PS256 => "PS256",
            SignatureAlgorithm::PS384 => "PS384",
            SignatureAlgorithm::PS512 => "PS512",
            SignatureAlgorithm::RS256 => "RS256",
            SignatureAlgorithm::RS384 => "RS384",
            SignatureAlgorithm::RS512 => "RS512",
            SignatureAlgorithm::RSNULL => "RSNULL",
            SignatureAlgorithm::ES256 => "ES256",
            SignatureAlgorithm::ES384 => "ES384",
            SignatureAlgorithm::ES512 => "ES512",
            SignatureAlgorithm::ES256K => "ES256K",
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown signature algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for SignatureAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignatureAlgorithm::ALL
            .iter()
            .copied()
            .find(|alg| alg.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownAlgorithm(s.to_owned()))
    }
}

/// Handle to a named key (optionally pinned to a version) in a vault.
#[derive(Debug, Clone)]
pub struct Key<'a> {
    client: &'a KeyVaultClient,
    name: String,
    version: Option<String>,
}

impl KeyVaultClient {
    /// Handle to the key called `name`; nothing is sent until a method is awaited.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), azure_keyvault_rest::KeyVaultError> {
    /// use azure_keyvault_rest::KeyVaultClient;
    /// let client = KeyVaultClient::from_env()?;
    /// let jwk = client.key("signer").version("78deebed173b48e48f55abf87ed4cf71").get_key().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn key(&self, name: &str) -> Key<'_> {
        Key {
            client: self,
            name: name.to_owned(),
            version: None,
        }
    }
}

impl<'a> Key<'a> {
    /// Key name, as given to [`KeyVaultClient::key`].
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version_id(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Pins the handle to a version. An empty version keeps the latest one.
    pub fn version(self, version: &str) -> Key<'a> {
        if version.is_empty() {
            self
        } else {
            Key {
                version: Some(version.to_owned()),
                ..self
            }
        }
    }

    /// `keys/{name}[/{version}][/{operation}]`
    fn url(&self, operation: Option<&str>, query: &[(&str, String)]) -> Result<Url, KeyVaultError> {
        ensure_name("key", &self.name)?;
        let mut segments = vec!["keys", self.name.as_str()];
        if let Some(version) = &self.version {
            segments.push(version.as_str());
        }
        if let Some(operation) = operation {
            segments.push(operation);
        }
        self.client.url_for(&segments, query)
    }

    /// Issues the `GET` and hands back the raw response, whatever its status.
    pub async fn get_raw(&self) -> Result<Response, KeyVaultError> {
        let url = self.url(None, &[])?;
        self.client.fetch(Method::GET, url, None, None).await
    }

    /// Fetches the key material together with its attributes and tags.
    pub async fn get(&self) -> Result<KeyBundle, KeyVaultError> {
        let url = self.url(None, &[])?;
        self.client.fetch_json(Method::GET, url, None).await
    }

    /// Fetches only the JSON Web Key.
    pub async fn get_key(&self) -> Result<JsonWebKey, KeyVaultError> {
        Ok(self.get().await?.into_key())
    }

    /// First page of the key's versions. A pinned version is ignored here.
    pub async fn versions(&self, max_results_per_page: Option<u32>) -> Result<Page<KeyItem>, KeyVaultError> {
        ensure_name("key", &self.name)?;
        let url = self.client.url_for(
            &["keys", self.name.as_str(), "versions"],
            &max_results(max_results_per_page),
        )?;
        self.client.fetch_json(Method::GET, url, None).await
    }

    /// Every version of the key, following `nextLink` until exhausted.
    pub async fn all_versions(&self) -> Result<Vec<KeyItem>, KeyVaultError> {
        let first = self.versions(None).await?;
        self.client.collect_pages(first).await
    }

    /// Asks the vault to sign `value`, the base64url-encoded digest, with `alg`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), azure_keyvault_rest::KeyVaultError> {
    /// use azure_keyvault_rest::{KeyVaultClient, SignatureAlgorithm};
    /// let client = KeyVaultClient::from_env()?;
    /// let result = client
    ///     .key("signer")
    ///     .sign("n4bQgYhMfWWaL-qgxVrQFaO_TxsrC4Is0V1sFbDwCgg", SignatureAlgorithm::ES256)
    ///     .await?;
    /// let signature = result.signature()?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn sign(&self, value: &str, alg: SignatureAlgorithm) -> Result<KeyOperationResult, KeyVaultError> {
        let url = self.url(Some("sign"), &[])?;
        let body = json!({ "alg": alg, "value": value });
        self.client.fetch_json(Method::POST, url, Some(&body)).await
    }

    /// Like [`Key::sign`], taking the raw digest bytes.
    pub async fn sign_digest(&self, digest: &[u8], alg: SignatureAlgorithm) -> Result<KeyOperationResult, KeyVaultError> {
        self.sign(&URL_SAFE_NO_PAD.encode(digest), alg).await
    }
}
