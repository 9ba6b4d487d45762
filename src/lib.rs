// src/lib.rs
//! # NEAR Access Key Signer
//!
//! Delegated signing for NEAR transactions. A function-call access key is
//! issued once through the user's interactive wallet and stored locally;
//! afterwards, transactions that stay inside the key's scope are signed and
//! submitted without user interaction, and everything else falls back to
//! the wallet.
//!
//! ## Architecture Overview
//! 1. **Wallet Layer**: credential store, key material, interactive wallet trait
//! 2. **Policy Layer**: pure authorization predicate
//! 3. **Blockchain Layer**: transaction encoding and JSON-RPC submission
//! 4. **Services Layer**: the delegated signer and its HTTP hooks

pub mod blockchain;
pub mod error;
pub mod models;
pub mod policy;
pub mod services;
pub mod settings;
pub mod wallet;

pub use error::{Error, Result};
pub use services::delegated_signer::{CreateAccessKeyParams, DelegatedSigner};
