// src/models/credential.rs
//! Delegated access key data model.
//!
//! A [`Credential`] is a function-call access key registered on-chain against
//! an owner account. It is scoped to a single contract and an ordered list of
//! method names, and capped by an allowance the network enforces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A delegated access key as persisted by the credential store.
///
/// The serialized form is the persisted record layout:
/// ```json
/// { "accountId": "...", "privateKey": "ed25519:...", "contractId": "...",
///   "allowedMethods": ["..."], "allowance": "..." }
/// ```
/// Every field is required, a record missing any of them does not
/// deserialize and is therefore treated as absent by the store.
///
/// # Security Considerations
/// - `secret_key` never leaves the store except to build a signing identity
/// - The `Debug` implementation redacts it
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Account on whose behalf the key acts
    /// Example: "alice.near"
    #[serde(rename = "accountId")]
    pub owner_account: String,

    /// Secret half of the delegated key pair in `ed25519:<base58>` form
    #[serde(rename = "privateKey")]
    pub secret_key: String,

    /// The only receiver this key may address
    /// Example: "app.near"
    #[serde(rename = "contractId")]
    pub scope_contract: String,

    /// Method names the key may call. Passed through unvalidated.
    pub allowed_methods: Vec<String>,

    /// Decimal yoctoNEAR string bounding cumulative gas spend.
    /// Enforced on-chain, never tracked locally.
    #[serde(rename = "allowance")]
    pub spend_allowance: String,
}

impl Credential {
    /// Literal membership test against the allowed method list.
    pub fn allows_method(&self, method_name: &str) -> bool {
        self.allowed_methods.iter().any(|m| m == method_name)
    }

    /// A view of this credential safe to hand to callers.
    pub fn public_view(&self, public_key: String) -> CredentialView {
        CredentialView {
            account_id: self.owner_account.clone(),
            public_key,
            contract_id: self.scope_contract.clone(),
            allowed_methods: self.allowed_methods.clone(),
            allowance: self.spend_allowance.clone(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("owner_account", &self.owner_account)
            .field("secret_key", &"<redacted>")
            .field("scope_contract", &self.scope_contract)
            .field("allowed_methods", &self.allowed_methods)
            .field("spend_allowance", &self.spend_allowance)
            .finish()
    }
}

/// Secret-free projection of a [`Credential`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialView {
    pub account_id: String,
    pub public_key: String,
    pub contract_id: String,
    pub allowed_methods: Vec<String>,
    pub allowance: String,
}
