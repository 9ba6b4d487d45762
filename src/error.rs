// src/error.rs
//! Error kinds surfaced by the delegated signer.
//!
//! Collaborator failures (interactive wallet, network layer) are carried as
//! [`anyhow::Error`] without reinterpretation. The variants owned by this
//! crate are the preconditions it enforces itself.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The interactive wallet returned an empty account list during issuance.
    #[error("interactive wallet returned no accounts")]
    NoAccount,

    /// A non function-call action reached the local signing path.
    ///
    /// The authorization predicate rejects these before local signing, so
    /// seeing this error means the two have drifted apart.
    #[error("unsupported action `{action}` on the local signing path")]
    UnsupportedAction { action: String },

    /// The on-chain key registration submitted through the wallet failed.
    #[error("access key registration failed: {0}")]
    RegistrationFailed(#[source] anyhow::Error),

    /// A locally signed submission failed.
    ///
    /// `index` is the position of the failing request inside its batch and
    /// `submitted` the number of earlier requests that already reached the
    /// chain. Their outcomes are not returned.
    #[error("local submission {index} failed after {submitted} successful submission(s): {source}")]
    SubmissionFailed {
        index: usize,
        submitted: usize,
        #[source]
        source: anyhow::Error,
    },

    /// Error returned by the interactive wallet on the fallback path.
    #[error(transparent)]
    Wallet(anyhow::Error),

    #[error("credential storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Borsh encoding of a transaction failed.
    #[error("transaction encoding error: {0}")]
    Encoding(#[source] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// JSON-RPC level error reported by a NEAR node.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
