use azure_keyvault_rest::KeyVaultClient;
use chrono::Utc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = KeyVaultClient::from_env()?;

    let now = Utc::now();
    for item in client.all_secrets().await? {
        let state = if item.attributes().is_usable_at(now) {
            "usable"
        } else {
            "disabled or outside its validity window"
        };
        println!("{} ({})", item.name(), state);
    }

    Ok(())
}
