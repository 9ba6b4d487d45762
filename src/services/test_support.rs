// src/services/test_support.rs
//! In-process collaborators for service tests.

use crate::blockchain::near_client::{SigningIdentity, TransactionSubmitter};
use crate::blockchain::transaction::SignedAction;
use crate::error::Result;
use crate::models::credential::Credential;
use crate::models::transaction::{Outcome, WalletAccount};
use crate::wallet::credential_storage::CredentialStore;
use crate::wallet::interactive::InteractiveSigner;
use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::io;
use std::sync::Mutex;

/// Interactive wallet double recording everything it is asked to send.
#[derive(Default)]
pub struct FakeWallet {
    accounts: Vec<WalletAccount>,
    fail_sends: bool,
    sent: Mutex<Vec<Value>>,
    batches: Mutex<Vec<Vec<Value>>>,
    sign_outs: Mutex<usize>,
}

impl FakeWallet {
    pub fn with_accounts(ids: &[&str]) -> Self {
        FakeWallet {
            accounts: ids
                .iter()
                .map(|id| WalletAccount {
                    account_id: id.to_string(),
                    public_key: None,
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn sent(&self) -> Vec<Value> {
        self.sent.lock().unwrap().clone()
    }

    pub fn batches(&self) -> Vec<Vec<Value>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn sign_outs(&self) -> usize {
        *self.sign_outs.lock().unwrap()
    }
}

#[async_trait]
impl InteractiveSigner for FakeWallet {
    fn manifest_id(&self) -> &str {
        "fake"
    }

    async fn get_accounts(&self) -> anyhow::Result<Vec<WalletAccount>> {
        Ok(self.accounts.clone())
    }

    async fn sign_and_send_transaction(&self, transaction: &Value) -> anyhow::Result<Outcome> {
        if self.fail_sends {
            return Err(anyhow!("user rejected the request"));
        }
        self.sent.lock().unwrap().push(transaction.clone());
        Ok(json!({ "wallet": "fake" }))
    }

    async fn sign_and_send_transactions(
        &self,
        transactions: &[Value],
    ) -> anyhow::Result<Vec<Outcome>> {
        if self.fail_sends {
            return Err(anyhow!("user rejected the request"));
        }
        self.batches.lock().unwrap().push(transactions.to_vec());
        Ok(transactions.iter().map(|_| json!({ "wallet": "fake" })).collect())
    }

    async fn sign_out(&self) -> anyhow::Result<()> {
        *self.sign_outs.lock().unwrap() += 1;
        Ok(())
    }
}

/// Store whose reads find nothing and whose writes always fail.
pub struct FailingStore;

impl CredentialStore for FailingStore {
    fn get(&self) -> Option<Credential> {
        None
    }

    fn put(&self, _credential: &Credential) -> Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only storage").into())
    }

    fn clear(&self) -> Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only storage").into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitEvent {
    Started(usize),
    Finished(usize),
}

#[derive(Debug, Clone)]
pub struct SubmitCall {
    pub rpc_url: String,
    pub account_id: String,
    pub receiver_id: String,
    pub actions: Vec<SignedAction>,
}

/// Network layer double. Yields mid-submission so overlapping calls would
/// show up as interleaved events.
#[derive(Default)]
pub struct FakeSubmitter {
    fail_at: Option<usize>,
    calls: Mutex<Vec<SubmitCall>>,
    events: Mutex<Vec<SubmitEvent>>,
}

impl FakeSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the submission with the given call index.
    pub fn failing_at(index: usize) -> Self {
        FakeSubmitter {
            fail_at: Some(index),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<SubmitCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<SubmitEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionSubmitter for FakeSubmitter {
    async fn submit(
        &self,
        rpc_url: &str,
        identity: &SigningIdentity,
        receiver_id: &str,
        actions: Vec<SignedAction>,
    ) -> anyhow::Result<Outcome> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(SubmitCall {
                rpc_url: rpc_url.to_string(),
                account_id: identity.account_id.clone(),
                receiver_id: receiver_id.to_string(),
                actions,
            });
            calls.len() - 1
        };
        self.events.lock().unwrap().push(SubmitEvent::Started(index));

        tokio::task::yield_now().await;

        if self.fail_at == Some(index) {
            return Err(anyhow!("InvalidNonce"));
        }
        self.events.lock().unwrap().push(SubmitEvent::Finished(index));
        Ok(json!({ "submitted": index }))
    }
}
