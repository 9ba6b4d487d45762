// src/models/transaction.rs
//! Transaction request model shared with the host wallet framework.
//!
//! Requests use the wallet-selector JSON shape: a receiver, an ordered list of
//! actions tagged by `type` with their fields under `params`, and the network
//! the request is meant for.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Finalized execution outcome as returned by a wallet or the RPC node.
///
/// Treated as opaque and handed back to the caller untouched.
pub type Outcome = serde_json::Value;

/// NEAR network environment a request targets.
///
/// Only used to choose an RPC endpoint for local submission. Any identifier
/// other than `mainnet` selects the test network.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum NetworkId {
    Mainnet,
    #[default]
    Testnet,
}

impl From<&str> for NetworkId {
    fn from(id: &str) -> Self {
        match id {
            "mainnet" => NetworkId::Mainnet,
            _ => NetworkId::Testnet,
        }
    }
}

impl From<String> for NetworkId {
    fn from(id: String) -> Self {
        NetworkId::from(id.as_str())
    }
}

impl From<NetworkId> for String {
    fn from(id: NetworkId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkId::Mainnet => f.write_str("mainnet"),
            NetworkId::Testnet => f.write_str("testnet"),
        }
    }
}

/// Account exposed by the interactive wallet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccount {
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// A transaction the host asks to be signed and sent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Signer hint from the host. Local signing always uses the credential's
    /// owner account instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_id: Option<String>,

    /// Destination account or contract
    #[serde(rename = "receiverId")]
    pub target_account: String,

    pub actions: Vec<Action>,

    #[serde(default)]
    pub network_id: NetworkId,
}

/// Typed transaction operation.
///
/// Only [`Action::FunctionCall`] can ever be signed with a delegated key, the
/// other variants exist so requests carrying them are recognised and routed
/// to the interactive wallet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "params")]
pub enum Action {
    FunctionCall(FunctionCallAction),
    AddKey(AddKeyAction),
    Transfer {
        deposit: String,
    },
    DeleteKey {
        #[serde(rename = "publicKey")]
        public_key: String,
    },
    CreateAccount,
    DeployContract {
        code: Vec<u8>,
    },
    Stake {
        stake: String,
        #[serde(rename = "publicKey")]
        public_key: String,
    },
    DeleteAccount {
        #[serde(rename = "beneficiaryId")]
        beneficiary_id: String,
    },
}

impl Action {
    /// The `type` tag of the action, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::FunctionCall(_) => "FunctionCall",
            Action::AddKey(_) => "AddKey",
            Action::Transfer { .. } => "Transfer",
            Action::DeleteKey { .. } => "DeleteKey",
            Action::CreateAccount => "CreateAccount",
            Action::DeployContract { .. } => "DeployContract",
            Action::Stake { .. } => "Stake",
            Action::DeleteAccount { .. } => "DeleteAccount",
        }
    }
}

/// Invocation of a contract method.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCallAction {
    pub method_name: String,

    /// JSON arguments, or a byte array passed through as raw bytes
    #[serde(default = "empty_args")]
    pub args: serde_json::Value,

    /// Gas budget as a decimal string; defaulted locally when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,

    /// Attached deposit in yoctoNEAR; zero when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit: Option<String>,
}

fn empty_args() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl FunctionCallAction {
    pub fn new(method_name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            method_name: method_name.into(),
            args,
            gas: None,
            deposit: None,
        }
    }
}

/// Registration of a new key on an account.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddKeyAction {
    pub public_key: String,
    pub access_key: AccessKeySpec,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AccessKeySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    pub permission: AccessKeyPermission,
}

/// Permission attached to a registered key: `"FullAccess"` or a function
/// call scope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum AccessKeyPermission {
    FunctionCall(FunctionCallPermission),
    FullAccess(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCallPermission {
    pub receiver_id: String,
    #[serde(default)]
    pub method_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowance: Option<String>,
}
