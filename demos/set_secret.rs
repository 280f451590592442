use azure_keyvault_rest::KeyVaultClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = KeyVaultClient::from_env()?;
    let secret = client.secret("test");

    secret.set("whatup").await?;
    assert_eq!(secret.get_value().await?, "whatup");

    Ok(())
}
