// src/wallet/interactive.rs
//! Interactive wallet collaborator.
//!
//! The interactive wallet asks the user to approve every transaction. It is
//! both the issuer of delegated access keys and the fallback whenever a
//! request cannot be signed locally.

use crate::models::transaction::{Outcome, WalletAccount};
use async_trait::async_trait;
use serde_json::{json, Value};

/// User-facing signer owned by the host wallet framework.
///
/// Transactions are handed over as the JSON the host supplied, so a
/// forwarded request reaches the wallet exactly as it was received. Errors
/// are opaque to this crate and propagated as returned.
#[async_trait]
pub trait InteractiveSigner: Send + Sync {
    /// Identifier of the wallet, for diagnostics.
    fn manifest_id(&self) -> &str;

    async fn get_accounts(&self) -> anyhow::Result<Vec<WalletAccount>>;

    async fn sign_and_send_transaction(&self, transaction: &Value) -> anyhow::Result<Outcome>;

    async fn sign_and_send_transactions(
        &self,
        transactions: &[Value],
    ) -> anyhow::Result<Vec<Outcome>>;

    async fn sign_out(&self) -> anyhow::Result<()>;
}

/// [`InteractiveSigner`] reached over HTTP through a wallet bridge.
///
/// The bridge exposes:
/// - `GET  /accounts`
/// - `POST /sign-and-send-transaction`
/// - `POST /sign-and-send-transactions`
/// - `POST /sign-out`
#[derive(Clone)]
pub struct HttpWallet {
    base_url: String,
    manifest_id: String,
    http: reqwest::Client,
}

impl HttpWallet {
    /// Creates a client for the wallet bridge.
    ///
    /// # Arguments
    /// * `base_url` - Root URL of the bridge; a trailing slash is ignored
    /// * `manifest_id` - Identifier reported by [`InteractiveSigner::manifest_id`]
    pub fn new(base_url: impl Into<String>, manifest_id: impl Into<String>) -> Self {
        HttpWallet {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            manifest_id: manifest_id.into(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl InteractiveSigner for HttpWallet {
    fn manifest_id(&self) -> &str {
        &self.manifest_id
    }

    async fn get_accounts(&self) -> anyhow::Result<Vec<WalletAccount>> {
        let accounts = self
            .http
            .get(self.url("accounts"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(accounts)
    }

    async fn sign_and_send_transaction(&self, transaction: &Value) -> anyhow::Result<Outcome> {
        let outcome = self
            .http
            .post(self.url("sign-and-send-transaction"))
            .json(transaction)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(outcome)
    }

    async fn sign_and_send_transactions(
        &self,
        transactions: &[Value],
    ) -> anyhow::Result<Vec<Outcome>> {
        let outcomes = self
            .http
            .post(self.url("sign-and-send-transactions"))
            .json(&json!({ "transactions": transactions }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(outcomes)
    }

    async fn sign_out(&self) -> anyhow::Result<()> {
        self.http
            .post(self.url("sign-out"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
