// src/blockchain/near_client.rs
//! NEAR JSON-RPC client used for locally signed submissions.
//!
//! Provides an account-bound sender for delegated access keys:
//! - RPC endpoint selection per network
//! - Nonce and recent block hash lookup for the signing key
//! - Transaction signing and `broadcast_tx_commit` submission
//!
//! The delegated signer only depends on the [`TransactionSubmitter`] trait,
//! so the JSON-RPC implementation can be swapped for a test double.

use crate::blockchain::transaction::{PublicKey, SignedAction, Transaction};
use crate::error::{Error, Result};
use crate::models::credential::Credential;
use crate::models::transaction::{NetworkId, Outcome};
use crate::wallet::key_management::KeyPair;
use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use serde_json::{json, Value};

pub const MAINNET_RPC_URL: &str = "https://rpc.mainnet.near.org";
pub const TESTNET_RPC_URL: &str = "https://rpc.testnet.near.org";

/// RPC endpoints per network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcEndpoints {
    pub mainnet: String,
    pub testnet: String,
}

impl Default for RpcEndpoints {
    fn default() -> Self {
        RpcEndpoints {
            mainnet: MAINNET_RPC_URL.to_string(),
            testnet: TESTNET_RPC_URL.to_string(),
        }
    }
}

impl RpcEndpoints {
    /// `Mainnet` maps to the production endpoint, everything else to testnet.
    pub fn url_for(&self, network: NetworkId) -> &str {
        match network {
            NetworkId::Mainnet => &self.mainnet,
            NetworkId::Testnet => &self.testnet,
        }
    }
}

/// Account id plus the delegated key that signs for it.
#[derive(Debug, Clone)]
pub struct SigningIdentity {
    pub account_id: String,
    pub key: KeyPair,
}

impl SigningIdentity {
    /// Rebuilds a signing identity from a stored credential.
    pub fn from_credential(credential: &Credential) -> Result<Self> {
        Ok(SigningIdentity {
            account_id: credential.owner_account.clone(),
            key: credential.secret_key.parse()?,
        })
    }
}

/// Network submission layer.
///
/// Builds an account-bound transaction for `identity`, signs it and submits
/// it to `rpc_url`, resolving to the finalized outcome.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(
        &self,
        rpc_url: &str,
        identity: &SigningIdentity,
        receiver_id: &str,
        actions: Vec<SignedAction>,
    ) -> anyhow::Result<Outcome>;
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Deserialize)]
struct AccessKeyView {
    nonce: u64,
    block_hash: String,
}

/// [`TransactionSubmitter`] talking to a NEAR node over JSON-RPC.
#[derive(Clone, Default)]
pub struct JsonRpcSubmitter {
    http: reqwest::Client,
}

impl JsonRpcSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues one JSON-RPC call and unwraps its `result`.
    async fn call(&self, rpc_url: &str, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": "dontcare",
            "method": method,
            "params": params,
        });

        let response: RpcResponse = self
            .http
            .post(rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Rpc { code: -1, message: e.to_string() })?
            .json()
            .await
            .map_err(|e| Error::Rpc { code: -1, message: e.to_string() })?;

        if let Some(error) = response.error {
            let message = match error.data {
                Some(data) => format!("{}: {}", error.message, data),
                None => error.message,
            };
            return Err(Error::Rpc { code: error.code, message });
        }

        response.result.ok_or_else(|| Error::Rpc {
            code: -1,
            message: format!("`{}` returned neither result nor error", method),
        })
    }

    /// Looks up the current nonce of the signing key and a recent block hash.
    async fn access_key_view(
        &self,
        rpc_url: &str,
        identity: &SigningIdentity,
    ) -> Result<AccessKeyView> {
        let result = self
            .call(
                rpc_url,
                "query",
                json!({
                    "request_type": "view_access_key",
                    "finality": "final",
                    "account_id": identity.account_id,
                    "public_key": identity.key.public_key_string(),
                }),
            )
            .await?;

        // Older nodes report a missing key inside `result`
        if let Some(message) = result.get("error").and_then(Value::as_str) {
            return Err(Error::Rpc { code: -1, message: message.to_string() });
        }

        Ok(serde_json::from_value(result)?)
    }

    async fn sign_and_broadcast(
        &self,
        rpc_url: &str,
        identity: &SigningIdentity,
        receiver_id: &str,
        actions: Vec<SignedAction>,
    ) -> Result<Outcome> {
        let view = self.access_key_view(rpc_url, identity).await?;
        let nonce = view.nonce.checked_add(1).ok_or_else(|| Error::Rpc {
            code: -1,
            message: "access key nonce exhausted".to_string(),
        })?;

        let block_hash_bytes = bs58::decode(&view.block_hash)
            .into_vec()
            .map_err(|e| Error::Rpc { code: -1, message: format!("invalid block hash: {}", e) })?;
        let block_hash: [u8; 32] = block_hash_bytes.as_slice().try_into().map_err(|_| Error::Rpc {
            code: -1,
            message: format!("block hash has {} bytes", block_hash_bytes.len()),
        })?;

        let transaction = Transaction {
            signer_id: identity.account_id.clone(),
            public_key: PublicKey(identity.key.public_key_bytes()),
            nonce,
            receiver_id: receiver_id.to_string(),
            block_hash,
            actions,
        };
        debug!(
            "Signing transaction {} -> {} with nonce {}",
            transaction.signer_id, transaction.receiver_id, transaction.nonce
        );

        let signed = transaction.sign(&identity.key)?;
        let outcome = self
            .call(rpc_url, "broadcast_tx_commit", json!([signed.to_base64()?]))
            .await?;

        if let Some(failure) = outcome.get("status").and_then(|s| s.get("Failure")) {
            return Err(Error::Rpc {
                code: -1,
                message: format!("transaction failed: {}", failure),
            });
        }

        info!("Submitted access key transaction to {}", receiver_id);
        Ok(outcome)
    }
}

#[async_trait]
impl TransactionSubmitter for JsonRpcSubmitter {
    async fn submit(
        &self,
        rpc_url: &str,
        identity: &SigningIdentity,
        receiver_id: &str,
        actions: Vec<SignedAction>,
    ) -> anyhow::Result<Outcome> {
        Ok(self.sign_and_broadcast(rpc_url, identity, receiver_id, actions).await?)
    }
}
