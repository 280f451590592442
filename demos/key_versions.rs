use azure_keyvault_rest::KeyVaultClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let key_name = std::env::args().nth(1).ok_or("missing key name")?;
    let client = KeyVaultClient::from_env()?;

    for item in client.key(&key_name).all_versions().await? {
        println!(
            "{} created {} expires {:?}",
            item.version(),
            item.attributes().created(),
            item.attributes().exp()
        );
    }

    Ok(())
}
