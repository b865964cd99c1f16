#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;

use anyhow::{bail, Context};
use safe_passkeys::{
    passkey::PasskeySettings, AppSettings, FileStorage, PasskeyManager, SoftwareAuthenticator,
};

type Manager = PasskeyManager<SoftwareAuthenticator<Arc<FileStorage>>, Arc<FileStorage>>;

const USAGE: &str = "Usage: safe-passkeys <create | list | verify <rawId> | clear>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = AppSettings::load()
        .map_err(|e| anyhow::anyhow!("Failed to load settings: {e}"))?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let manager = build_manager(&settings.passkeys)?;

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["create"] => create(&manager).await,
        ["list"] => list(&manager),
        ["verify", raw_id] => verify(&manager, raw_id).await,
        ["clear"] => {
            manager.clear_passkeys().context("Failed to clear passkeys")?;
            println!("✓ Removed all stored passkeys");
            Ok(())
        }
        _ => bail!(USAGE),
    }
}

/// Wire file storage and the software authenticator into a manager
///
/// # Errors
///
/// Returns an error if the storage directory cannot be created or the
/// authenticator origin is invalid
fn build_manager(settings: &PasskeySettings) -> anyhow::Result<Manager> {
    let storage = Arc::new(
        FileStorage::open(&settings.storage_dir).with_context(|| {
            format!("Failed to open passkey storage at {}", settings.storage_dir)
        })?,
    );

    let origin = settings
        .rp_id
        .as_ref()
        .map_or_else(|| "http://localhost".to_string(), |id| format!("https://{id}"));
    let authenticator = SoftwareAuthenticator::new(Arc::clone(&storage), &origin)
        .context("Failed to initialize the software authenticator")?;

    log::info!(
        "Using passkey storage {} for origin {}",
        storage.dir().display(),
        authenticator.origin()
    );
    Ok(PasskeyManager::new(authenticator, storage, settings.clone()))
}

async fn create(manager: &Manager) -> anyhow::Result<()> {
    let passkey = manager
        .create_passkey()
        .await
        .context("Failed to create passkey")?;
    manager
        .store_passkey(&passkey)
        .context("Failed to store passkey")?;
    println!("✓ Created passkey {}", hex::encode(&passkey.raw_id));
    Ok(())
}

fn list(manager: &Manager) -> anyhow::Result<()> {
    let passkeys = manager.load_passkeys().context("Failed to load passkeys")?;
    if passkeys.is_empty() {
        println!("No passkeys stored");
    }
    for item in passkeys {
        println!("{}  {}", item.raw_id, item.public_key);
    }
    Ok(())
}

async fn verify(manager: &Manager, raw_id: &str) -> anyhow::Result<()> {
    let passkey = manager
        .get_passkey_by_raw_id(raw_id)
        .await
        .with_context(|| format!("Failed to verify passkey {raw_id}"))?;
    println!(
        "✓ Passkey {} verified ({} byte public key)",
        hex::encode(&passkey.raw_id),
        passkey.public_key.len()
    );
    Ok(())
}
