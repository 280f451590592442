use azure_keyvault_rest::{KeyVaultClient, SignatureAlgorithm};
use tracing_subscriber::EnvFilter;

/// Usage: sign_with_key <key-name> <base64url-digest> [algorithm]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let key_name = args.next().ok_or("missing key name")?;
    let digest = args.next().ok_or("missing base64url digest")?;
    let alg: SignatureAlgorithm = args.next().as_deref().unwrap_or("RS256").parse()?;

    let client = KeyVaultClient::from_env()?;
    let key = client.key(&key_name);

    let jwk = key.get_key().await?;
    println!("kid: {:?} kty: {}", jwk.kid(), jwk.kty());

    let result = key.sign(&digest, alg).await?;
    println!("signed by {}: {}", result.kid(), result.value());
    println!("{} signature bytes", result.signature()?.len());

    Ok(())
}
