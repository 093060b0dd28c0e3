//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{
        ErrorResponse, HealthResponse, ProtectRequest, ProtectResponse, RevealRequest,
        RevealResponse,
    },
    ServiceError,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::state::AppState;
use crate::crypto::CipherError;

/// `POST /v1/pii/protect` — encrypt the PII fields of a record before it is written.
///
/// Any key service failure fails the whole request with `502`; the caller must
/// not write the record.
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn protect(
    State(state): State<AppState>,
    body: Result<Json<ProtectRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return error_response(&bad_request(&rejection)),
    };

    match state.mapper.protect(req.record).await {
        Ok(record) => (StatusCode::OK, Json(ProtectResponse { record })).into_response(),
        Err(e) => {
            warn!(error = %e, "protect failed");
            error_response(&cipher_failure(&e))
        }
    }
}

/// `POST /v1/pii/reveal` — decrypt the PII fields of a record read from storage.
///
/// Fields that cannot be decrypted are returned as stored and listed in
/// `unrevealed`. Only a key service failure fails the request.
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn reveal(
    State(state): State<AppState>,
    body: Result<Json<RevealRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return error_response(&bad_request(&rejection)),
    };

    match state.mapper.reveal_with_report(req.record).await {
        Ok(outcome) => {
            let body = RevealResponse {
                record: outcome.record,
                unrevealed: outcome.unrevealed,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "reveal failed");
            error_response(&cipher_failure(&e))
        }
    }
}

/// `GET /health` — liveness check reporting the cipher mode.
pub async fn health(State(state): State<AppState>) -> Response {
    let mode = if state.mapper.gateway().is_passthrough() {
        "passthrough"
    } else {
        "managed"
    };
    let body = HealthResponse {
        status: "ok".into(),
        mode: mode.into(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn bad_request(rejection: &JsonRejection) -> ServiceError {
    ServiceError::BadRequest(rejection.body_text())
}

/// Only systemic key service failures reach a handler; per-field decode
/// failures are absorbed by the mapper and reported in `unrevealed`.
fn cipher_failure(err: &CipherError) -> ServiceError {
    ServiceError::KeyService(err.to_string())
}

fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{routing::{get, post}, Router};
    use axum_test::TestServer;
    use bytes::Bytes;
    use serde_json::{json, Value};

    use super::*;
    use crate::crypto::CipherGateway;
    use crate::kms::{KeyServiceError, KeyServiceFuture, MockKeyService};
    use crate::pii::PiiFieldMapper;

    fn ready<T: Send + 'static>(result: Result<T, KeyServiceError>) -> KeyServiceFuture<T> {
        Box::pin(std::future::ready(result))
    }

    fn test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route("/v1/pii/protect", post(protect))
            .route("/v1/pii/reveal", post(reveal))
            .route("/health", get(health))
            .with_state(state);
        TestServer::new(app).unwrap()
    }

    fn managed_state(kms: MockKeyService) -> AppState {
        AppState::new(PiiFieldMapper::new(CipherGateway::managed(
            "alias/pii",
            Arc::new(kms),
        )))
    }

    #[tokio::test]
    async fn health_reports_passthrough_mode() {
        let server = test_server(AppState::default());
        let resp = server.get("/health").await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        let body: HealthResponse = resp.json();
        assert_eq!(body.status, "ok");
        assert_eq!(body.mode, "passthrough");
    }

    #[tokio::test]
    async fn health_reports_managed_mode() {
        let server = test_server(managed_state(MockKeyService::new()));
        let body: HealthResponse = server.get("/health").await.json();
        assert_eq!(body.mode, "managed");
    }

    #[tokio::test]
    async fn protect_encodes_kms_ciphertext() {
        let mut kms = MockKeyService::new();
        kms.expect_encrypt()
            .times(1)
            .returning(|_, _| ready(Ok(Bytes::from_static(&[0x01, 0x02, 0x03]))));
        let server = test_server(managed_state(kms));

        let resp = server
            .post("/v1/pii/protect")
            .json(&json!({"record": {"email": "jane@example.com", "status": "new", "phone": null}}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        let body: Value = resp.json();
        assert_eq!(
            body,
            json!({"record": {"email": "AQID", "status": "new", "phone": null}})
        );
    }

    #[tokio::test]
    async fn protect_key_service_failure_is_502() {
        let mut kms = MockKeyService::new();
        kms.expect_encrypt().returning(|_, _| {
            ready(Err(KeyServiceError::Rejected {
                operation: "Encrypt",
                code: "AccessDeniedException".into(),
                message: "not authorized".into(),
            }))
        });
        let server = test_server(managed_state(kms));

        let resp = server
            .post("/v1/pii/protect")
            .json(&json!({"record": {"email": "x@y.com"}}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::BAD_GATEWAY);
        let err: ErrorResponse = resp.json();
        assert_eq!(err.code, "key_service_error");
        assert!(!err.message.contains("x@y.com"));
    }

    #[tokio::test]
    async fn reveal_lists_fields_left_as_stored() {
        let mut kms = MockKeyService::new();
        kms.expect_decrypt()
            .times(1)
            .returning(|_| ready(Ok(Bytes::from_static(b"555-0100"))));
        let server = test_server(managed_state(kms));

        let resp = server
            .post("/v1/pii/reveal")
            .json(&json!({"record": {"email": "not-valid-base64!!", "phone": "AQID"}}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        let body: RevealResponse = resp.json();
        assert_eq!(body.record["email"].as_deref(), Some("not-valid-base64!!"));
        assert_eq!(body.record["phone"].as_deref(), Some("555-0100"));
        assert_eq!(body.unrevealed.into_iter().collect::<Vec<_>>(), vec!["email"]);
    }

    #[tokio::test]
    async fn reveal_key_service_outage_is_502() {
        let mut kms = MockKeyService::new();
        kms.expect_decrypt().returning(|_| {
            ready(Err(KeyServiceError::Transport {
                operation: "Decrypt",
                message: "connection refused".into(),
            }))
        });
        let server = test_server(managed_state(kms));

        let resp = server
            .post("/v1/pii/reveal")
            .json(&json!({"record": {"email": "AQID"}}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn passthrough_round_trip_over_http() {
        let server = test_server(AppState::default());
        let record = json!({"name": "Jane Doe", "email": "jane@example.com"});

        let protected: ProtectResponse = server
            .post("/v1/pii/protect")
            .json(&json!({ "record": record }))
            .await
            .json();
        let revealed: RevealResponse = server
            .post("/v1/pii/reveal")
            .json(&json!({ "record": protected.record }))
            .await
            .json();
        assert_eq!(serde_json::to_value(&revealed.record).unwrap(), record);
        assert!(revealed.unrevealed.is_empty());
    }

    #[tokio::test]
    async fn reveal_non_utf8_plaintext_is_left_as_stored() {
        let mut kms = MockKeyService::new();
        kms.expect_decrypt()
            .times(1)
            .returning(|_| ready(Ok(Bytes::from_static(&[0xFF]))));
        let server = test_server(managed_state(kms));

        let resp = server
            .post("/v1/pii/reveal")
            .json(&json!({"record": {"phone": "AQID"}}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        let body: RevealResponse = resp.json();
        assert_eq!(body.record["phone"].as_deref(), Some("AQID"));
        assert_eq!(body.unrevealed.into_iter().collect::<Vec<_>>(), vec!["phone"]);
    }
}
