#![allow(dead_code)]

use azure_keyvault_rest::{KeyVaultClient, StaticTokenCredential};
use serde_json::{json, Value};

pub const TOKEN: &str = "test-token";

pub fn client() -> KeyVaultClient {
    KeyVaultClient::with_credential(&mockito::server_url(), StaticTokenCredential::new(TOKEN)).unwrap()
}

pub fn bearer() -> String {
    format!("Bearer {}", TOKEN)
}

pub fn attributes() -> Value {
    json!({
        "enabled": true,
        "exp": 1924992000,
        "created": 1493938410,
        "updated": 1493938412,
        "recoveryLevel": "Recoverable+Purgeable",
        "recoverableDays": 90
    })
}
