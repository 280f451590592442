use crate::KeyVaultError;
use std::env;

pub(crate) const PUBLIC_ENDPOINT_SUFFIX: &str = "vault.azure.net";

/// Where the vault lives and which application identity talks to it.
///
/// Read from the environment with [`KeyVaultConfig::from_env`]:
///
/// | Variable | Meaning |
/// |---|---|
/// | `AZURE_KEYVAULT_URL` | Full vault URL; takes precedence over the name |
/// | `AZURE_KEYVAULT_NAME` | Vault name, combined with the endpoint suffix |
/// | `AZURE_KEYVAULT_ENDPOINT_SUFFIX` | Defaults to `vault.azure.net` |
/// | `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET` | AAD application |
#[derive(Clone)]
pub struct KeyVaultConfig {
    pub vault_url: String,
    pub endpoint_suffix: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl KeyVaultConfig {
    pub fn from_env() -> Result<Self, KeyVaultError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, KeyVaultError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let endpoint_suffix = get("AZURE_KEYVAULT_ENDPOINT_SUFFIX")
            .unwrap_or_else(|| PUBLIC_ENDPOINT_SUFFIX.to_owned());
        let vault_url = match get("AZURE_KEYVAULT_URL") {
            Some(url) => url,
            None => {
                let name = get("AZURE_KEYVAULT_NAME").ok_or(KeyVaultError::MissingConfig(
                    "AZURE_KEYVAULT_NAME (or AZURE_KEYVAULT_URL)",
                ))?;
                vault_url_for(&name, &endpoint_suffix)
            }
        };

        Ok(Self {
            vault_url,
            endpoint_suffix,
            tenant_id: get("AZURE_TENANT_ID").ok_or(KeyVaultError::MissingConfig("AZURE_TENANT_ID"))?,
            client_id: get("AZURE_CLIENT_ID").ok_or(KeyVaultError::MissingConfig("AZURE_CLIENT_ID"))?,
            client_secret: get("AZURE_CLIENT_SECRET")
                .ok_or(KeyVaultError::MissingConfig("AZURE_CLIENT_SECRET"))?,
        })
    }

    /// Token audience matching the endpoint suffix.
    pub fn resource(&self) -> String {
        format!("https://{}", self.endpoint_suffix)
    }
}

impl std::fmt::Debug for KeyVaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVaultConfig")
            .field("vault_url", &self.vault_url)
            .field("endpoint_suffix", &self.endpoint_suffix)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .finish()
    }
}

pub(crate) fn vault_url_for(keyvault_name: &str, endpoint_suffix: &str) -> String {
    format!("https://{}.{}/", keyvault_name, endpoint_suffix)
}
