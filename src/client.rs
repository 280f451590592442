use crate::config::{vault_url_for, KeyVaultConfig, PUBLIC_ENDPOINT_SUFFIX};
use crate::credential::{ClientSecretCredential, TokenCredential};
use crate::models::Page;
use crate::KeyVaultError;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::{Method, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// REST API version sent with every request.
pub const API_VERSION: &str = "7.3";

/// Client for a single Key Vault. Hands out [`Secret`](crate::Secret) and
/// [`Key`](crate::Key) handles and performs the authenticated round trips
/// behind them.
///
/// # Examples
///
/// ```
/// use azure_keyvault_rest::KeyVaultClient;
/// let client = KeyVaultClient::new("{client_id}", "{client_secret}", "{tenant_id}", "test-keyvault").unwrap();
/// assert_eq!(client.vault_url().as_str(), "https://test-keyvault.vault.azure.net/");
/// ```
#[derive(Clone)]
pub struct KeyVaultClient {
    vault_url: Url,
    credential: Arc<dyn TokenCredential>,
    http: reqwest::Client,
}

impl KeyVaultClient {
    /// Creates a new `KeyVaultClient` for a vault in the public Azure cloud.
    pub fn new(
        aad_client_id: &str,
        aad_client_secret: &str,
        aad_tenant_id: &str,
        keyvault_name: &str,
    ) -> Result<Self, KeyVaultError> {
        KeyVaultClient::new_with_endpoint_suffix(
            aad_client_id,
            aad_client_secret,
            aad_tenant_id,
            keyvault_name,
            PUBLIC_ENDPOINT_SUFFIX,
        )
    }

    /// Creates a new `KeyVaultClient` with an endpoint suffix. Useful for non-public Azure clouds.
    ///
    /// # Examples
    ///
    /// ```
    /// use azure_keyvault_rest::KeyVaultClient;
    /// let client = KeyVaultClient::new_with_endpoint_suffix(
    ///     "c1a6d79b-082b-4798-b362-a77e96de50db",
    ///     "SUPER_SECRET_KEY",
    ///     "bc598e67-03d8-44d5-aa46-8289b9a39a14",
    ///     "test-keyvault",
    ///     "vault.azure.cn",
    /// )
    /// .unwrap();
    /// assert_eq!(client.vault_url().host_str(), Some("test-keyvault.vault.azure.cn"));
    /// ```
    pub fn new_with_endpoint_suffix(
        aad_client_id: &str,
        aad_client_secret: &str,
        aad_tenant_id: &str,
        keyvault_name: &str,
        endpoint_suffix: &str,
    ) -> Result<Self, KeyVaultError> {
        if keyvault_name.is_empty() {
            return Err(KeyVaultError::InvalidName { kind: "vault" });
        }
        let credential = ClientSecretCredential::new_with_resource(
            aad_client_id,
            aad_client_secret,
            aad_tenant_id,
            &format!("https://{}", endpoint_suffix),
        );
        KeyVaultClient::with_credential(&vault_url_for(keyvault_name, endpoint_suffix), credential)
    }

    /// Creates a client for an explicit vault URL (sovereign clouds, emulators,
    /// private endpoints) with any token source.
    pub fn with_credential<C>(vault_url: &str, credential: C) -> Result<Self, KeyVaultError>
    where
        C: TokenCredential + 'static,
    {
        KeyVaultClient::with_shared_credential(vault_url, Arc::new(credential))
    }

    /// Same as [`KeyVaultClient::with_credential`], for a credential shared
    /// with other clients.
    ///
    /// # Examples
    ///
    /// ```
    /// use azure_keyvault_rest::{KeyVaultClient, StaticTokenCredential, TokenCredential};
    /// use std::sync::Arc;
    ///
    /// let credential: Arc<dyn TokenCredential> = Arc::new(StaticTokenCredential::new("eyJ0eXAi..."));
    /// let primary = KeyVaultClient::with_shared_credential("https://primary.vault.azure.net", credential.clone()).unwrap();
    /// let backup = KeyVaultClient::with_shared_credential("https://backup.vault.azure.net", credential).unwrap();
    /// ```
    pub fn with_shared_credential(
        vault_url: &str,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, KeyVaultError> {
        let mut vault_url = Url::parse(vault_url)?;
        if !matches!(vault_url.scheme(), "http" | "https") || vault_url.cannot_be_a_base() {
            return Err(KeyVaultError::InvalidUrl(vault_url.to_string()));
        }
        vault_url.set_query(None);
        vault_url.set_fragment(None);
        Ok(Self {
            vault_url,
            credential,
            http: reqwest::Client::new(),
        })
    }

    /// Creates a client from a [`KeyVaultConfig`], authenticating with its AAD application.
    pub fn from_config(config: &KeyVaultConfig) -> Result<Self, KeyVaultError> {
        let credential = ClientSecretCredential::new_with_resource(
            &config.client_id,
            &config.client_secret,
            &config.tenant_id,
            &config.resource(),
        );
        KeyVaultClient::with_credential(&config.vault_url, credential)
    }

    /// Shorthand for `KeyVaultClient::from_config(&KeyVaultConfig::from_env()?)`.
    pub fn from_env() -> Result<Self, KeyVaultError> {
        KeyVaultClient::from_config(&KeyVaultConfig::from_env()?)
    }

    /// Base URL every request path is appended to.
    pub fn vault_url(&self) -> &Url {
        &self.vault_url
    }

    /// Builds `{vault}/{segments...}?api-version=7.3[&query...]`.
    pub(crate) fn url_for(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, KeyVaultError> {
        let mut url = self.vault_url.clone();
        url.path_segments_mut()
            .map_err(|_| KeyVaultError::InvalidUrl(self.vault_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api-version", API_VERSION);
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// Sends one authenticated request and returns the raw response, whatever its status.
    ///
    /// A fresh bearer token is requested from the credential before every call.
    /// `Content-Type: application/json` is only attached when `body` is present.
    pub async fn fetch(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        headers: Option<HeaderMap>,
    ) -> Result<Response, KeyVaultError> {
        let token = self.credential.bearer_token().await?;

        tracing::debug!(method = %method, url = %url, "sending Key Vault request");
        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", token));
        if let Some(headers) = headers {
            request = request.headers(headers);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        tracing::debug!(status = %response.status(), "received Key Vault response");
        Ok(response)
    }

    pub(crate) async fn fetch_json<T>(&self, method: Method, url: Url, body: Option<&Value>) -> Result<T, KeyVaultError>
    where
        T: DeserializeOwned,
    {
        let response = self.fetch(method, url, body, None).await?;
        read_json(response).await
    }

    /// Follows a `nextLink` returned by a list operation.
    ///
    /// The link must point at this vault; anything else is refused so the
    /// bearer token never leaves it.
    pub async fn next_page<T>(&self, next_link: &str) -> Result<T, KeyVaultError>
    where
        T: DeserializeOwned,
    {
        let url = Url::parse(next_link).map_err(|_| KeyVaultError::UntrustedNextLink(next_link.to_owned()))?;
        if url.origin() != self.vault_url.origin() {
            return Err(KeyVaultError::UntrustedNextLink(next_link.to_owned()));
        }
        self.fetch_json(Method::GET, url, None).await
    }

    /// Drains a listing: the items of `first` plus every page behind its `nextLink`.
    /// A link that comes around a second time ends the listing with an error.
    pub(crate) async fn collect_pages<T>(&self, first: Page<T>) -> Result<Vec<T>, KeyVaultError>
    where
        T: DeserializeOwned,
    {
        let (mut items, mut next_link) = first.into_parts();
        let mut seen = HashSet::new();
        while let Some(link) = next_link {
            if !seen.insert(link.clone()) {
                return Err(KeyVaultError::RepeatedNextLink(link));
            }
            let page: Page<T> = self.next_page(&link).await?;
            let (more, next) = page.into_parts();
            items.extend(more);
            next_link = next;
        }
        Ok(items)
    }
}

impl std::fmt::Debug for KeyVaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVaultClient")
            .field("vault_url", &self.vault_url.as_str())
            .finish()
    }
}

/// Reads the body and maps it onto `T`, or onto a `KeyVaultError` for non-2xx statuses.
pub(crate) async fn read_json<T>(response: Response) -> Result<T, KeyVaultError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let err = KeyVaultError::from_response(status, body);
        tracing::warn!(status = %status, error = %err, "Key Vault request failed");
        return Err(err);
    }
    Ok(serde_json::from_str(&body)?)
}

pub(crate) fn ensure_name(kind: &'static str, name: &str) -> Result<(), KeyVaultError> {
    if name.is_empty() {
        Err(KeyVaultError::InvalidName { kind })
    } else {
        Ok(())
    }
}

/// `maxresults` is only sent for a positive count.
pub(crate) fn max_results(max: Option<u32>) -> Vec<(&'static str, String)> {
    match max {
        Some(max) if max > 0 => vec![("maxresults", max.to_string())],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticTokenCredential;

    fn client(url: &str) -> KeyVaultClient {
        KeyVaultClient::with_credential(url, StaticTokenCredential::new("token")).unwrap()
    }

    #[test]
    fn builds_urls_without_double_slashes() {
        let client = client("https://my-vault.vault.azure.net");
        let url = client.url_for(&["secrets", "db-password"], &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://my-vault.vault.azure.net/secrets/db-password?api-version=7.3"
        );

        let url = client
            .url_for(&["keys", "signer", "versions"], &max_results(Some(5)))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://my-vault.vault.azure.net/keys/signer/versions?api-version=7.3&maxresults=5"
        );
    }

    #[test]
    fn keeps_base_path_and_encodes_segments() {
        let client = client("http://127.0.0.1:8443/proxy/");
        let url = client.url_for(&["secrets", "a b/c"], &[]).unwrap();
        assert_eq!(url.path(), "/proxy/secrets/a%20b%2Fc");
    }

    #[test]
    fn zero_max_results_is_omitted() {
        assert!(max_results(None).is_empty());
        assert!(max_results(Some(0)).is_empty());
        assert_eq!(max_results(Some(25)), vec![("maxresults", "25".to_owned())]);
    }

    #[test]
    fn rejects_unusable_vault_urls() {
        let credential = || StaticTokenCredential::new("token");
        assert!(matches!(
            KeyVaultClient::with_credential("not a url", credential()),
            Err(KeyVaultError::InvalidUrl(_))
        ));
        assert!(matches!(
            KeyVaultClient::with_credential("mailto:vault@example.com", credential()),
            Err(KeyVaultError::InvalidUrl(_))
        ));
        assert!(matches!(
            KeyVaultClient::new("id", "secret", "tenant", ""),
            Err(KeyVaultError::InvalidName { kind: "vault" })
        ));
    }

    #[tokio::test]
    async fn refuses_foreign_next_link() {
        let client = client("https://my-vault.vault.azure.net");
        let result = client
            .next_page::<Value>("https://attacker.example.com/keys/k/versions?api-version=7.3")
            .await;
        assert!(matches!(result, Err(KeyVaultError::UntrustedNextLink(_))));
    }
}
