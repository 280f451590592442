use azure_keyvault_rest::KeyVaultClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let secret_name = std::env::args().nth(1).unwrap_or_else(|| "test".to_owned());
    let client = KeyVaultClient::from_env()?;

    let secret = client.secret(&secret_name).get().await?;
    dbg!(secret.value());
    dbg!(secret.attributes());

    Ok(())
}
