// src/main.rs

//! # NEAR Access Key Signer - Main Entry Point
//!
//! Wires the delegated signer to its collaborators and serves the plugin
//! hooks over HTTP.
//!
//! ## Components
//! 1. **Credential Store**: JSON file under `ACCESS_KEY_STORAGE_DIR`
//! 2. **Network Layer**: NEAR JSON-RPC, endpoint chosen per request network
//! 3. **Interactive Wallet**: HTTP wallet bridge at `ACCESS_KEY_WALLET_URL`
//!
//! See [`near_access_key_signer::settings`] for every variable.

use anyhow::Context;
use dotenv::dotenv;
use log::info;
use near_access_key_signer::blockchain::near_client::JsonRpcSubmitter;
use near_access_key_signer::services::api_server::ApiServer;
use near_access_key_signer::settings::Settings;
use near_access_key_signer::wallet::credential_storage::FileCredentialStore;
use near_access_key_signer::wallet::interactive::HttpWallet;
use near_access_key_signer::DelegatedSigner;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::init();

    let settings = Settings::from_env().context("failed to load settings")?;

    let store = FileCredentialStore::open(&settings.storage_dir).with_context(|| {
        format!("failed to open credential store at {}", settings.storage_dir.display())
    })?;
    info!("Access key record at {}", store.path().display());

    let signer = DelegatedSigner::new(
        Arc::new(store),
        Arc::new(JsonRpcSubmitter::new()),
        settings.rpc_endpoints(),
    );
    let wallet = HttpWallet::new(settings.wallet_url.clone(), settings.wallet_id.clone());

    let api_server = ApiServer::new(signer, Arc::new(wallet));

    info!("API server running at http://{}", settings.listen_addr);
    info!("Available endpoints:");
    info!("- POST /access-key");
    info!("- GET  /access-key");
    info!("- POST /sign-and-send-transaction");
    info!("- POST /sign-and-send-transactions");
    info!("- POST /sign-out");

    api_server
        .run(settings.listen_addr)
        .await
        .context("API server stopped")
}
