use crate::client::{ensure_name, max_results};
use crate::models::{last_segment, Attributes, Page};
use crate::KeyVaultClient;
use crate::KeyVaultError;
use getset::Getters;
use reqwest::{Method, Response};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

/// A secret value together with its metadata, as returned by `GET /secrets/{name}`.
#[derive(Deserialize, Debug, Clone, Getters)]
#[getset(get = "pub")]
#[serde(rename_all = "camelCase")]
pub struct SecretBundle {
    value: String,
    id: String,
    attributes: Attributes,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    kid: Option<String>,
    #[serde(default)]
    managed: Option<bool>,
}

impl SecretBundle {
    /// Consumes the bundle, keeping only the plaintext value.
    pub fn into_value(self) -> String {
        self.value
    }
}

/// One entry of a secret listing. The value itself is never listed.
#[derive(Deserialize, Debug, Clone, Getters)]
#[getset(get = "pub")]
#[serde(rename_all = "camelCase")]
pub struct SecretItem {
    id: String,
    attributes: Attributes,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    managed: Option<bool>,
}

impl SecretItem {
    /// Secret name, taken from the last segment of `id`.
    pub fn name(&self) -> &str {
        last_segment(&self.id)
    }
}

/// Handle to a named secret (optionally pinned to a version) in a vault.
///
/// Handles are cheap: they carry only the name and version and borrow the client.
#[derive(Debug, Clone)]
pub struct Secret<'a> {
    client: &'a KeyVaultClient,
    name: String,
    version: Option<String>,
}

impl KeyVaultClient {
    /// # Example
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), azure_keyvault_rest::KeyVaultError> {
    /// use azure_keyvault_rest::KeyVaultClient;
    /// let client = KeyVaultClient::from_env()?;
    /// let password = client.secret("db-password").get_value().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn secret(&self, name: &str) -> Secret<'_> {
        Secret {
            client: self,
            name: name.to_owned(),
            version: None,
        }
    }

    /// Lists the secrets in the vault, one page at a time.
    /// Follow `next_link` with [`KeyVaultClient::next_page`].
    pub async fn list_secrets(&self, max_results_per_page: Option<u32>) -> Result<Page<SecretItem>, KeyVaultError> {
        let url = self.url_for(&["secrets"], &max_results(max_results_per_page))?;
        self.fetch_json(Method::GET, url, None).await
    }

    /// Lists every secret in the vault, following `nextLink` until exhausted.
    pub async fn all_secrets(&self) -> Result<Vec<SecretItem>, KeyVaultError> {
        let first = self.list_secrets(None).await?;
        self.collect_pages(first).await
    }
}

impl<'a> Secret<'a> {
    /// Secret name, as given to [`KeyVaultClient::secret`].
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version_id(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Pins the handle to a version. An empty version keeps the latest one.
    pub fn version(self, version: &str) -> Secret<'a> {
        if version.is_empty() {
            self
        } else {
            Secret {
                version: Some(version.to_owned()),
                ..self
            }
        }
    }

    fn url(&self) -> Result<reqwest::Url, KeyVaultError> {
        ensure_name("secret", &self.name)?;
        match &self.version {
            Some(version) => self.client.url_for(&["secrets", self.name.as_str(), version.as_str()], &[]),
            None => self.client.url_for(&["secrets", self.name.as_str()], &[]),
        }
    }

    /// Issues the `GET` and hands back the raw response, whatever its status.
    pub async fn get_raw(&self) -> Result<Response, KeyVaultError> {
        let url = self.url()?;
        self.client.fetch(Method::GET, url, None, None).await
    }

    /// Fetches the value together with its attributes and tags.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), azure_keyvault_rest::KeyVaultError> {
    /// use azure_keyvault_rest::KeyVaultClient;
    /// let client = KeyVaultClient::from_env()?;
    /// let secret = client.secret("db-password").get().await?;
    /// println!("{} expires {:?}", secret.id(), secret.attributes().exp());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get(&self) -> Result<SecretBundle, KeyVaultError> {
        let url = self.url()?;
        self.client.fetch_json(Method::GET, url, None).await
    }

    /// Fetches only the plaintext value.
    pub async fn get_value(&self) -> Result<String, KeyVaultError> {
        Ok(self.get().await?.into_value())
    }

    /// Stores a new value, creating a new version of the secret.
    /// Always writes to the secret itself, regardless of a pinned version.
    pub async fn set(&self, value: &str) -> Result<SecretBundle, KeyVaultError> {
        ensure_name("secret", &self.name)?;
        let url = self.client.url_for(&["secrets", self.name.as_str()], &[])?;
        let body = json!({ "value": value });
        self.client.fetch_json(Method::PUT, url, Some(&body)).await
    }
}
