// src/services/delegated_signer.rs
//! Delegated signer service.
//!
//! Signs transactions with a stored function-call access key when the
//! authorization predicate allows it, and forwards everything else to the
//! interactive wallet untouched.
//!
//! Entry points:
//! - [`DelegatedSigner::issue_credential`]: registers a new access key through
//!   the wallet and stores it
//! - [`DelegatedSigner::sign_and_submit`] / [`DelegatedSigner::sign_and_submit_batch`]:
//!   local signing with fallback
//! - [`DelegatedSigner::revoke`]: forgets the key and signs out of the wallet
//!
//! The credential store is the only shared mutable state and provides no
//! isolation. Callers must not overlap issuance or revocation with signing.

use crate::blockchain::near_client::{RpcEndpoints, SigningIdentity, TransactionSubmitter};
use crate::blockchain::transaction::SignedAction;
use crate::error::{Error, Result};
use crate::models::credential::{Credential, CredentialView};
use crate::models::transaction::{
    AccessKeyPermission, AccessKeySpec, Action, AddKeyAction, FunctionCallPermission, NetworkId,
    Outcome, TransactionRequest,
};
use crate::policy::authorization::{is_authorized, is_batch_authorized};
use crate::wallet::credential_storage::CredentialStore;
use crate::wallet::interactive::InteractiveSigner;
use crate::wallet::key_management::KeyPair;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Allowance granted when none is requested: 0.25 NEAR in yoctoNEAR.
pub const DEFAULT_ALLOWANCE: &str = "250000000000000000000000";

/// Parameters of a new access key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccessKeyParams {
    /// Contract the key will be scoped to
    pub contract_id: String,

    /// Callable methods. Empty registers an "any method" permission on-chain.
    #[serde(default)]
    pub allowed_methods: Vec<String>,

    /// Allowance in yoctoNEAR, [`DEFAULT_ALLOWANCE`] when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowance: Option<String>,

    /// Network the registration is sent on
    #[serde(default)]
    pub network_id: NetworkId,
}

impl CreateAccessKeyParams {
    pub fn new(contract_id: impl Into<String>, allowed_methods: Vec<String>) -> Self {
        CreateAccessKeyParams {
            contract_id: contract_id.into(),
            allowed_methods,
            allowance: None,
            network_id: NetworkId::default(),
        }
    }
}

/// Reads a host request into the typed model.
///
/// Requests the model cannot represent, such as unknown action types, are
/// never signed locally and come back as `None`.
fn parse_request(raw: &Value) -> Option<TransactionRequest> {
    match serde_json::from_value(raw.clone()) {
        Ok(request) => Some(request),
        Err(e) => {
            debug!("Request not eligible for local signing: {}", e);
            None
        }
    }
}

/// A request fully prepared for local submission.
struct LocalSubmission<'a> {
    identity: SigningIdentity,
    rpc_url: &'a str,
    receiver_id: String,
    actions: Vec<SignedAction>,
}

/// Orchestrates access key issuance, local signing and revocation.
///
/// The interactive wallet is passed to every call as the host's `next`
/// continuation; the store and network layer are fixed at construction.
#[derive(Clone)]
pub struct DelegatedSigner {
    store: Arc<dyn CredentialStore>,
    submitter: Arc<dyn TransactionSubmitter>,
    endpoints: RpcEndpoints,
}

impl DelegatedSigner {
    /// Creates a signer over its injected collaborators.
    ///
    /// # Arguments
    /// * `store` - Single-slot storage for the access key
    /// * `submitter` - Network layer used for locally signed transactions
    /// * `endpoints` - RPC endpoint per network
    pub fn new(
        store: Arc<dyn CredentialStore>,
        submitter: Arc<dyn TransactionSubmitter>,
        endpoints: RpcEndpoints,
    ) -> Self {
        DelegatedSigner {
            store,
            submitter,
            endpoints,
        }
    }

    /// Public view of the stored access key.
    ///
    /// # Returns
    /// - `Some(view)` with the owner, scope and public key
    /// - `None` when no usable key is stored
    pub fn credential_view(&self) -> Option<CredentialView> {
        let credential = self.store.get()?;
        let key: KeyPair = credential.secret_key.parse().ok()?;
        Some(credential.public_view(key.public_key_string()))
    }

    /// Registers a new function-call access key and stores it.
    ///
    /// The first wallet account becomes the owner. A fresh key pair is
    /// generated locally and a single `AddKey` transaction is sent through
    /// the wallet. Only a successful registration replaces the stored key.
    ///
    /// # Errors
    /// - [`Error::NoAccount`] when the wallet exposes no account
    /// - [`Error::RegistrationFailed`] when the wallet rejects or fails the
    ///   registration; the store is left untouched
    pub async fn issue_credential(
        &self,
        wallet: &dyn InteractiveSigner,
        params: CreateAccessKeyParams,
    ) -> Result<Outcome> {
        let accounts = wallet.get_accounts().await.map_err(Error::Wallet)?;
        let owner = accounts.into_iter().next().ok_or(Error::NoAccount)?.account_id;

        let key = KeyPair::generate();
        let allowance = params
            .allowance
            .unwrap_or_else(|| DEFAULT_ALLOWANCE.to_string());

        let registration = TransactionRequest {
            signer_id: Some(owner.clone()),
            target_account: owner.clone(),
            actions: vec![Action::AddKey(AddKeyAction {
                public_key: key.public_key_string(),
                access_key: AccessKeySpec {
                    nonce: None,
                    permission: AccessKeyPermission::FunctionCall(FunctionCallPermission {
                        receiver_id: params.contract_id.clone(),
                        method_names: params.allowed_methods.clone(),
                        allowance: Some(allowance.clone()),
                    }),
                },
            })],
            network_id: params.network_id,
        };

        let outcome = wallet
            .sign_and_send_transaction(&serde_json::to_value(&registration)?)
            .await
            .map_err(Error::RegistrationFailed)?;

        let credential = Credential {
            owner_account: owner,
            secret_key: key.secret_key_string(),
            scope_contract: params.contract_id,
            allowed_methods: params.allowed_methods,
            spend_allowance: allowance,
        };
        if let Err(e) = self.store.put(&credential) {
            warn!(
                "Access key {} registered for {} but could not be stored: {}",
                key.public_key_string(),
                credential.owner_account,
                e
            );
            return Err(e);
        }

        info!(
            "Issued access key {} for {} scoped to {} via {}",
            key.public_key_string(),
            credential.owner_account,
            credential.scope_contract,
            wallet.manifest_id()
        );
        Ok(outcome)
    }

    /// Signs and sends one transaction, locally when authorized.
    ///
    /// `request` is the host's JSON. When it is not authorized it is
    /// forwarded to `next` exactly as received.
    pub async fn sign_and_submit(
        &self,
        request: &Value,
        next: &dyn InteractiveSigner,
    ) -> Result<Outcome> {
        let credential = self.store.get();
        let parsed = parse_request(request);

        match (credential, parsed) {
            (Some(credential), Some(parsed)) if is_authorized(Some(&credential), &parsed) => {
                let submission = self.prepare(&credential, &parsed)?;
                self.submit_locally(submission, 0, 0).await
            }
            _ => {
                info!("Forwarding transaction to {}", next.manifest_id());
                next.sign_and_send_transaction(request)
                    .await
                    .map_err(Error::Wallet)
            }
        }
    }

    /// Signs and sends a batch, locally only when every request is authorized.
    ///
    /// Every request is translated and its signing identity rebuilt before
    /// the first submission, so a request that cannot be signed fails the
    /// batch with nothing sent. Submissions then run strictly one after
    /// another in input order. If request `k` fails the remaining ones are
    /// not sent, and requests `0..k` stay on-chain even though their
    /// outcomes are dropped; the returned [`Error::SubmissionFailed`] reports
    /// both numbers.
    pub async fn sign_and_submit_batch(
        &self,
        requests: &[Value],
        next: &dyn InteractiveSigner,
    ) -> Result<Vec<Outcome>> {
        let credential = self.store.get();
        let parsed: Option<Vec<_>> = requests.iter().map(parse_request).collect();

        let (credential, parsed) = match (credential, parsed) {
            (Some(credential), Some(parsed))
                if is_batch_authorized(Some(&credential), &parsed) =>
            {
                (credential, parsed)
            }
            _ => {
                info!(
                    "Forwarding batch of {} transaction(s) to {}",
                    requests.len(),
                    next.manifest_id()
                );
                return next
                    .sign_and_send_transactions(requests)
                    .await
                    .map_err(Error::Wallet);
            }
        };

        let submissions = parsed
            .iter()
            .map(|request| self.prepare(&credential, request))
            .collect::<Result<Vec<_>>>()?;

        let mut outcomes = Vec::with_capacity(submissions.len());
        for (index, submission) in submissions.into_iter().enumerate() {
            let outcome = self.submit_locally(submission, index, outcomes.len()).await?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Forgets the stored key, then signs out of the wallet.
    ///
    /// The wallet sign-out runs even when nothing was stored or clearing the
    /// store failed; a store error is reported after it.
    pub async fn revoke(&self, next: &dyn InteractiveSigner) -> Result<()> {
        let cleared = self.store.clear();
        if let Err(ref e) = cleared {
            warn!("Failed to clear access key: {}", e);
        }

        next.sign_out().await.map_err(Error::Wallet)?;
        info!("Signed out of {}", next.manifest_id());
        cleared
    }

    /// Rebuilds the signing identity and translates the actions of one request.
    fn prepare<'a>(
        &'a self,
        credential: &Credential,
        request: &TransactionRequest,
    ) -> Result<LocalSubmission<'a>> {
        let actions = request
            .actions
            .iter()
            .map(SignedAction::from_request_action)
            .collect::<Result<Vec<_>>>()?;

        Ok(LocalSubmission {
            identity: SigningIdentity::from_credential(credential)?,
            rpc_url: self.endpoints.url_for(request.network_id),
            receiver_id: request.target_account.clone(),
            actions,
        })
    }

    async fn submit_locally(
        &self,
        submission: LocalSubmission<'_>,
        index: usize,
        submitted: usize,
    ) -> Result<Outcome> {
        info!(
            "Signing {} action(s) for {} locally via {}",
            submission.actions.len(),
            submission.receiver_id,
            submission.rpc_url
        );
        self.submitter
            .submit(
                submission.rpc_url,
                &submission.identity,
                &submission.receiver_id,
                submission.actions,
            )
            .await
            .map_err(|source| Error::SubmissionFailed {
                index,
                submitted,
                source,
            })
    }
}
