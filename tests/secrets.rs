mod common;

use azure_keyvault_rest::{KeyVaultError, StatusCode};
use chrono::{TimeZone, Utc};
use mockito::{mock, Matcher};
use serde_json::json;

#[tokio::test]
async fn get_secret_returns_value_and_metadata() {
    let body = json!({
        "value": "hunter2",
        "id": format!("{}/secrets/db-password/4387e9f3d6e14c459867679a90fd0f79", mockito::server_url()),
        "attributes": common::attributes(),
        "tags": { "owner": "payments" }
    });
    let _m = mock("GET", "/secrets/db-password")
        .match_query(Matcher::Exact("api-version=7.3".into()))
        .match_header("authorization", common::bearer().as_str())
        .match_header("content-type", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .expect(1)
        .create();

    let client = common::client();
    let secret = client.secret("db-password").get().await.unwrap();

    assert_eq!(secret.value(), "hunter2");
    assert!(secret.id().ends_with("/secrets/db-password/4387e9f3d6e14c459867679a90fd0f79"));
    assert!(*secret.attributes().enabled());
    assert_eq!(secret.attributes().exp(), &Some(Utc.timestamp_opt(1_924_992_000, 0).unwrap()));
    assert_eq!(secret.attributes().updated(), &Utc.timestamp_opt(1_493_938_412, 0).unwrap());
    assert_eq!(secret.attributes().recovery_level().as_deref(), Some("Recoverable+Purgeable"));
    assert_eq!(secret.tags().get("owner").map(String::as_str), Some("payments"));
    _m.assert();
}

#[tokio::test]
async fn get_value_of_pinned_version() {
    let _m = mock("GET", "/secrets/api-key/0f9e1c")
        .match_query(Matcher::UrlEncoded("api-version".into(), "7.3".into()))
        .match_header("authorization", common::bearer().as_str())
        .with_status(200)
        .with_body(
            json!({
                "value": "v1-value",
                "id": "https://my-vault.vault.azure.net/secrets/api-key/0f9e1c",
                "attributes": common::attributes()
            })
            .to_string(),
        )
        .expect(1)
        .create();

    let client = common::client();
    let value = client.secret("api-key").version("0f9e1c").get_value().await.unwrap();

    assert_eq!(value, "v1-value");
    _m.assert();
}

#[tokio::test]
async fn get_raw_passes_the_response_through() {
    let _m = mock("GET", "/secrets/raw-secret")
        .match_query(Matcher::UrlEncoded("api-version".into(), "7.3".into()))
        .with_status(403)
        .with_body(r#"{"error":{"code":"Forbidden","message":"Access denied"}}"#)
        .create();

    let client = common::client();
    let response = client.secret("raw-secret").get_raw().await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.text().await.unwrap().contains("Access denied"));
}

#[tokio::test]
async fn set_secret_puts_json_body() {
    let _m = mock("PUT", "/secrets/feature-flag")
        .match_query(Matcher::Exact("api-version=7.3".into()))
        .match_header("authorization", common::bearer().as_str())
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({ "value": "on" })))
        .with_status(200)
        .with_body(
            json!({
                "value": "on",
                "id": "https://my-vault.vault.azure.net/secrets/feature-flag/a1b2c3",
                "attributes": common::attributes()
            })
            .to_string(),
        )
        .expect(1)
        .create();

    let client = common::client();
    let stored = client.secret("feature-flag").version("ignored").set("on").await.unwrap();

    assert_eq!(stored.value(), "on");
    _m.assert();
}

#[tokio::test]
async fn list_secrets_follows_next_link() {
    let next_link = format!(
        "{}/secrets?api-version=7.3&$skiptoken=page2&maxresults=1",
        mockito::server_url()
    );
    let _first = mock("GET", "/secrets")
        .match_query(Matcher::Exact("api-version=7.3&maxresults=1".into()))
        .with_status(200)
        .with_body(
            json!({
                "value": [{
                    "id": "https://my-vault.vault.azure.net/secrets/alpha",
                    "attributes": common::attributes()
                }],
                "nextLink": next_link
            })
            .to_string(),
        )
        .expect(1)
        .create();
    let _second = mock("GET", "/secrets")
        .match_query(Matcher::UrlEncoded("$skiptoken".into(), "page2".into()))
        .match_header("authorization", common::bearer().as_str())
        .with_status(200)
        .with_body(
            json!({
                "value": [{
                    "id": "https://my-vault.vault.azure.net/secrets/beta",
                    "attributes": common::attributes(),
                    "contentType": "text/plain"
                }],
                "nextLink": null
            })
            .to_string(),
        )
        .expect(1)
        .create();

    let client = common::client();
    let page = client.list_secrets(Some(1)).await.unwrap();
    assert_eq!(page.value().len(), 1);
    assert_eq!(page.value()[0].name(), "alpha");

    let link = page.next_link().clone().unwrap();
    let second: azure_keyvault_rest::Page<azure_keyvault_rest::SecretItem> = client.next_page(&link).await.unwrap();
    assert_eq!(second.value()[0].name(), "beta");
    assert!(second.next_link().is_none());

    _first.assert();
    _second.assert();
}

#[tokio::test]
async fn missing_secret_maps_to_service_error() {
    let _m = mock("GET", "/secrets/does-not-exist")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(
            json!({
                "error": {
                    "code": "SecretNotFound",
                    "message": "A secret with (name/id) does-not-exist was not found in this key vault."
                }
            })
            .to_string(),
        )
        .create();

    let client = common::client();
    let err = client.secret("does-not-exist").get().await.unwrap_err();

    match err {
        KeyVaultError::Service { status, code, message } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(code, "SecretNotFound");
            assert!(message.contains("does-not-exist"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let _m = mock("GET", "/secrets/garbled")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{\"value\": ")
        .create();

    let client = common::client();
    let err = client.secret("garbled").get().await.unwrap_err();

    assert!(matches!(err, KeyVaultError::Parse(_)));
}

#[tokio::test]
async fn empty_secret_name_is_rejected_before_sending() {
    let client = common::client();
    let err = client.secret("").get().await.unwrap_err();

    assert!(matches!(err, KeyVaultError::InvalidName { kind: "secret" }));
}
