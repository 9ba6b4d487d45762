// src/blockchain/transaction.rs
//! Locally signed transaction model and its wire encoding.
//!
//! Mirrors the subset of the NEAR transaction schema an access key can sign:
//! function calls only. Encoding is Borsh; the signature covers the SHA-256
//! digest of the encoded transaction.

use crate::error::{Error, Result};
use crate::models::transaction::Action;
use crate::wallet::key_management::KeyPair;
use borsh::{BorshSerialize, to_vec};
use sha2::{Digest, Sha256};
use std::io::Write;

/// Gas attached to a function call when the request leaves it unspecified.
pub const DEFAULT_FUNCTION_CALL_GAS: u64 = 30_000_000_000_000;

/// Borsh tag of the ed25519 key and signature variants.
const ED25519_KEY_TYPE: u8 = 0;

/// Borsh tag of `FunctionCall` in the on-chain `Action` enum.
const FUNCTION_CALL_ACTION_TAG: u8 = 2;

#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub method_name: String,
    pub args: Vec<u8>,
    pub gas: u64,
    pub deposit: u128,
}

/// Action that can be signed with a function-call access key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedAction {
    FunctionCall(FunctionCall),
}

impl BorshSerialize for SignedAction {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        match self {
            SignedAction::FunctionCall(call) => {
                FUNCTION_CALL_ACTION_TAG.serialize(writer)?;
                call.serialize(writer)
            }
        }
    }
}

impl SignedAction {
    /// Translates a request action for local signing.
    ///
    /// Gas defaults to [`DEFAULT_FUNCTION_CALL_GAS`] and deposit to zero.
    /// JSON arguments are serialized to bytes; a JSON array of numbers is
    /// taken as raw bytes. Any action other than a function call is an
    /// [`Error::UnsupportedAction`].
    pub fn from_request_action(action: &Action) -> Result<Self> {
        let call = match action {
            Action::FunctionCall(call) => call,
            other => {
                return Err(Error::UnsupportedAction {
                    action: other.kind().to_string(),
                })
            }
        };

        let gas = match &call.gas {
            Some(gas) => parse_amount::<u64>("gas", gas)?,
            None => DEFAULT_FUNCTION_CALL_GAS,
        };
        let deposit = match &call.deposit {
            Some(deposit) => parse_amount::<u128>("deposit", deposit)?,
            None => 0,
        };

        Ok(SignedAction::FunctionCall(FunctionCall {
            method_name: call.method_name.clone(),
            args: encode_args(&call.args)?,
            gas,
            deposit,
        }))
    }
}

fn parse_amount<T: std::str::FromStr>(field: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| Error::UnsupportedAction {
        action: format!("FunctionCall with invalid {} `{}`: {}", field, value, e),
    })
}

fn encode_args(args: &serde_json::Value) -> Result<Vec<u8>> {
    if let Some(items) = args.as_array() {
        let raw: Option<Vec<u8>> = items
            .iter()
            .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect();
        if let Some(raw) = raw {
            if !raw.is_empty() {
                return Ok(raw);
            }
        }
    }
    Ok(serde_json::to_vec(args)?)
}

/// ed25519 public key in Borsh layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(pub [u8; 32]);

impl BorshSerialize for PublicKey {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        ED25519_KEY_TYPE.serialize(writer)?;
        self.0.serialize(writer)
    }
}

/// Unsigned transaction.
#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signer_id: String,
    pub public_key: PublicKey,
    pub nonce: u64,
    pub receiver_id: String,
    pub block_hash: [u8; 32],
    pub actions: Vec<SignedAction>,
}

impl Transaction {
    /// SHA-256 of the Borsh encoding, the message a signer signs.
    pub fn hash(&self) -> Result<[u8; 32]> {
        let bytes = to_vec(self).map_err(Error::Encoding)?;
        Ok(Sha256::digest(&bytes).into())
    }

    pub fn sign(self, key: &KeyPair) -> Result<SignedTransaction> {
        let signature = key.sign(&self.hash()?);
        Ok(SignedTransaction {
            transaction: self,
            signature,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: [u8; 64],
}

impl BorshSerialize for SignedTransaction {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.transaction.serialize(writer)?;
        ED25519_KEY_TYPE.serialize(writer)?;
        self.signature.serialize(writer)
    }
}

impl SignedTransaction {
    /// Base64 of the Borsh encoding, as `broadcast_tx_commit` expects.
    pub fn to_base64(&self) -> Result<String> {
        Ok(base64::encode(to_vec(self).map_err(Error::Encoding)?))
    }
}
