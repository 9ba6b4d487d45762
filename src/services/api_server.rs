// src/services/api_server.rs
//! HTTP surface of the access key plugin.
//!
//! Exposes the wallet-framework hooks as JSON endpoints. Every hook receives
//! the configured interactive wallet as its fallback continuation.
//!
//! - `POST /access-key`: issue a new access key
//! - `GET  /access-key`: public view of the stored key
//! - `POST /sign-and-send-transaction`
//! - `POST /sign-and-send-transactions`
//! - `POST /sign-out`

use crate::error::Error;
use crate::services::delegated_signer::{CreateAccessKeyParams, DelegatedSigner};
use crate::wallet::interactive::InteractiveSigner;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

/// Request payload for batch submission. Items are kept as received so a
/// forwarded batch reaches the wallet unchanged.
#[derive(Serialize, Deserialize)]
struct SignAndSendTransactionsRequest {
    transactions: Vec<Value>,
}

/// Main API server state
///
/// Cheap to clone: the signer and wallet are shared.
#[derive(Clone)]
pub struct ApiServer {
    signer: DelegatedSigner,
    /// Interactive wallet used as issuer and fallback
    wallet: Arc<dyn InteractiveSigner>,
}

/// Maps an error to a status code and JSON body.
fn error_response(err: Error) -> Response {
    let status = match &err {
        Error::NoAccount => StatusCode::BAD_REQUEST,
        Error::RegistrationFailed(_)
        | Error::SubmissionFailed { .. }
        | Error::Wallet(_)
        | Error::Rpc { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {}", err);
    }
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

impl ApiServer {
    pub fn new(signer: DelegatedSigner, wallet: Arc<dyn InteractiveSigner>) -> Self {
        ApiServer { signer, wallet }
    }

    /// Configures all API routes
    pub fn router(&self) -> Router {
        Router::new()
            .route(
                "/access-key",
                post(Self::create_access_key_handler).get(Self::get_access_key_handler),
            )
            .route(
                "/sign-and-send-transaction",
                post(Self::sign_and_send_transaction_handler),
            )
            .route(
                "/sign-and-send-transactions",
                post(Self::sign_and_send_transactions_handler),
            )
            .route("/sign-out", post(Self::sign_out_handler))
            .with_state(Arc::new(self.clone()))
    }

    /// Starts the API server and serves until the listener fails
    pub async fn run(&self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await
    }

    /// Issues a new access key through the interactive wallet
    ///
    /// # Responses
    /// - 200 OK: registration outcome
    /// - 400 Bad Request: the wallet has no account
    /// - 502 Bad Gateway: the wallet failed the registration
    async fn create_access_key_handler(
        State(state): State<Arc<ApiServer>>,
        Json(params): Json<CreateAccessKeyParams>,
    ) -> Response {
        match state.signer.issue_credential(state.wallet.as_ref(), params).await {
            Ok(outcome) => Json(outcome).into_response(),
            Err(e) => error_response(e),
        }
    }

    async fn get_access_key_handler(State(state): State<Arc<ApiServer>>) -> Response {
        match state.signer.credential_view() {
            Some(view) => Json(view).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn sign_and_send_transaction_handler(
        State(state): State<Arc<ApiServer>>,
        Json(request): Json<Value>,
    ) -> Response {
        match state.signer.sign_and_submit(&request, state.wallet.as_ref()).await {
            Ok(outcome) => Json(outcome).into_response(),
            Err(e) => error_response(e),
        }
    }

    async fn sign_and_send_transactions_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<SignAndSendTransactionsRequest>,
    ) -> Response {
        match state
            .signer
            .sign_and_submit_batch(&payload.transactions, state.wallet.as_ref())
            .await
        {
            Ok(outcomes) => Json(outcomes).into_response(),
            Err(e) => error_response(e),
        }
    }

    async fn sign_out_handler(State(state): State<Arc<ApiServer>>) -> Response {
        match state.signer.revoke(state.wallet.as_ref()).await {
            Ok(()) => StatusCode::NO_CONTENT.into_response(),
            Err(e) => error_response(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::near_client::RpcEndpoints;
    use crate::services::test_support::{FakeSubmitter, FakeWallet};
    use crate::wallet::credential_storage::InMemoryCredentialStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn server(wallet: FakeWallet) -> (ApiServer, Arc<FakeSubmitter>) {
        let submitter = Arc::new(FakeSubmitter::new());
        let signer = DelegatedSigner::new(
            Arc::new(InMemoryCredentialStore::new()),
            submitter.clone(),
            RpcEndpoints::default(),
        );
        (ApiServer::new(signer, Arc::new(wallet)), submitter)
    }

    async fn call(
        router: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_access_key_lifecycle_over_http() {
        let (server, submitter) = server(FakeWallet::with_accounts(&["alice.near"]));

        let (status, _) = call(server.router(), "GET", "/access-key", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            server.router(),
            "POST",
            "/access-key",
            Some(json!({ "contractId": "app.near", "allowedMethods": ["vote"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, view) = call(server.router(), "GET", "/access-key", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["contractId"], "app.near");
        assert!(view["publicKey"].as_str().unwrap().starts_with("ed25519:"));
        assert!(view.get("privateKey").is_none());

        let (status, outcome) = call(
            server.router(),
            "POST",
            "/sign-and-send-transaction",
            Some(json!({
                "receiverId": "app.near",
                "actions": [{
                    "type": "FunctionCall",
                    "params": { "methodName": "vote", "args": {} }
                }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["submitted"], 0);
        assert_eq!(submitter.calls().len(), 1);

        let (status, _) = call(server.router(), "POST", "/sign-out", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(server.router(), "GET", "/access-key", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_no_account_is_bad_request() {
        let (server, _) = server(FakeWallet::with_accounts(&[]));
        let (status, body) = call(
            server.router(),
            "POST",
            "/access-key",
            Some(json!({ "contractId": "app.near" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("no accounts"));
    }

    #[tokio::test]
    async fn test_batch_without_key_goes_to_wallet() {
        let (server, submitter) = server(FakeWallet::with_accounts(&["alice.near"]));
        let (status, outcomes) = call(
            server.router(),
            "POST",
            "/sign-and-send-transactions",
            Some(json!({ "transactions": [
                { "receiverId": "app.near", "actions": [] },
                { "receiverId": "app.near", "actions": [] }
            ]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcomes.as_array().unwrap().len(), 2);
        assert!(submitter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_action_type_reaches_wallet() {
        let (server, submitter) = server(FakeWallet::with_accounts(&["alice.near"]));
        let (status, outcome) = call(
            server.router(),
            "POST",
            "/sign-and-send-transaction",
            Some(json!({
                "receiverId": "app.near",
                "actions": [{ "type": "SignedDelegate", "params": {} }]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["wallet"], "fake");
        assert!(submitter.calls().is_empty());
    }
}
