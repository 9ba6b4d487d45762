// src/policy/authorization.rs
//! Authorization predicate for delegated signing.
//!
//! Decides whether a stored access key may sign a request locally. The
//! functions here are pure: they read nothing but their arguments, so the
//! caller fetches the credential from the store once and passes it in.

use crate::models::credential::Credential;
use crate::models::transaction::{Action, TransactionRequest};
use log::debug;

/// Returns `true` when `credential` may sign `request` without the user.
///
/// Checks run in order and the first failing one rejects the request:
/// 1. a credential must be stored
/// 2. the request must target the credential's contract
/// 3. every action must be a function call to an allowed method
///
/// An empty `allowed_methods` list authorizes no function call here, even
/// though the registered on-chain permission treats it as "any method".
pub fn is_authorized(credential: Option<&Credential>, request: &TransactionRequest) -> bool {
    let Some(credential) = credential else {
        debug!("No access key stored, {} needs the wallet", request.target_account);
        return false;
    };

    if request.target_account != credential.scope_contract {
        debug!(
            "Receiver {} is outside access key scope {}",
            request.target_account, credential.scope_contract
        );
        return false;
    }

    for action in &request.actions {
        match action {
            Action::FunctionCall(call) if credential.allows_method(&call.method_name) => {}
            Action::FunctionCall(call) => {
                debug!("Method {} is not allowed by the access key", call.method_name);
                return false;
            }
            other => {
                debug!("{} actions cannot be signed with an access key", other.kind());
                return false;
            }
        }
    }

    true
}

/// All-or-nothing batch check.
///
/// A single request that fails [`is_authorized`] rejects the whole batch.
pub fn is_batch_authorized(
    credential: Option<&Credential>,
    requests: &[TransactionRequest],
) -> bool {
    requests.iter().all(|request| is_authorized(credential, request))
}
