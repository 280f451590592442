use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyVaultError {
    #[error("Authorization error: {0}")]
    AuthorizationError(anyhow::Error),

    #[error("Request to Key Vault failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Key Vault returned {status} ({code}): {message}")]
    Service {
        status: StatusCode,
        code: String,
        message: String,
    },

    #[error("Key Vault returned {status} with an unrecognized body: {body}")]
    UnexpectedResponse { status: StatusCode, body: String },

    #[error("Failed to parse Key Vault response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid Key Vault URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid {kind} name: must not be empty")]
    InvalidName { kind: &'static str },

    #[error("Refusing to follow nextLink outside of the vault: {0}")]
    UntrustedNextLink(String),

    #[error("Listing did not advance, nextLink repeated: {0}")]
    RepeatedNextLink(String),

    #[error("Missing configuration value: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid base64url payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl From<url::ParseError> for KeyVaultError {
    fn from(err: url::ParseError) -> Self {
        KeyVaultError::InvalidUrl(err.to_string())
    }
}

/// `{ "error": { "code": ..., "message": ... } }`
#[derive(Deserialize, Debug)]
pub(crate) struct ErrorResponse {
    pub(crate) error: ErrorDetails,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ErrorDetails {
    #[serde(default)]
    pub(crate) code: String,
    #[serde(default)]
    pub(crate) message: String,
}

impl KeyVaultError {
    /// Maps a non-success response body onto a `KeyVaultError`.
    pub(crate) fn from_response(status: StatusCode, body: String) -> Self {
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(response) => KeyVaultError::Service {
                status,
                code: response.error.code,
                message: response.error.message,
            },
            Err(_) => KeyVaultError::UnexpectedResponse { status, body },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_documented_error_body() {
        let body = r#"{"error":{"code":"SecretNotFound","message":"A secret with (name/id) foo was not found in this key vault."}}"#;
        match KeyVaultError::from_response(StatusCode::NOT_FOUND, body.to_owned()) {
            KeyVaultError::Service {
                status,
                code,
                message,
            } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(code, "SecretNotFound");
                assert!(message.contains("foo"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn keeps_unrecognized_body() {
        let err = KeyVaultError::from_response(StatusCode::BAD_GATEWAY, "upstream down".to_owned());
        assert!(matches!(
            err,
            KeyVaultError::UnexpectedResponse { status, ref body }
                if status == StatusCode::BAD_GATEWAY && body == "upstream down"
        ));
    }
}
