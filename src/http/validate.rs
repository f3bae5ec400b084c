//! Admission endpoint.
//!
//! # Responsibilities
//! - Read the bounded request body
//! - Decode envelope and VirtualService, evaluate policy, encode reply
//! - Map protocol failures to opaque HTTP errors and decisions to 200
//!
//! # Design Decisions
//! - Exactly one response per request; a failed decode never falls
//!   through to policy evaluation
//! - Error details go to the log, never to the caller

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::admission::{decode_review, encode_review, DecodeError};
use crate::mesh::{decode_object, extract_routes};
use crate::observability::metrics::{record_admission, Outcome};
use crate::policy::{Decision, PolicyEvaluator};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const JSON_CONTENT_TYPE: &str = "application/json";

/// State shared by the admission handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub evaluator: Arc<PolicyEvaluator>,
    pub max_body_bytes: usize,
}

/// Failures that prevent an admission decision.
#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("failed to encode admission review: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A decided admission review, ready to send.
#[derive(Debug)]
pub struct Reviewed {
    pub uid: String,
    pub decision: Decision,
    pub body: Vec<u8>,
}

/// Decode `body`, evaluate its routes and encode the reply envelope.
pub fn review(evaluator: &PolicyEvaluator, body: &[u8]) -> Result<Reviewed, AdmissionError> {
    let mut review = decode_review(body)?;
    let request = review.request()?;
    let vs = decode_object(request)?;
    let uid = request.uid.clone();

    let routes = extract_routes(&vs);
    tracing::debug!(
        uid = %uid,
        virtual_service = %vs.display_name(),
        routes = routes.len(),
        "Validating VirtualService"
    );
    let decision = evaluator.evaluate(routes);

    review.respond(&decision)?;
    let body = encode_review(&review)?;

    Ok(Reviewed {
        uid,
        decision,
        body,
    })
}

/// `POST /validate`
pub async fn validate(State(state): State<AppState>, headers: HeaderMap, body: Body) -> Response {
    let start = Instant::now();
    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    if !accepts_json(&headers) {
        tracing::warn!(request_id = %request_id, "Rejected admission request with non-JSON content type");
        record_admission(Outcome::Error, start);
        return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
    }

    let bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to read admission request body");
            record_admission(Outcome::Error, start);
            return internal_error();
        }
    };

    match review(&state.evaluator, &bytes) {
        Ok(reviewed) => {
            let outcome = match &reviewed.decision {
                Decision::Allow => {
                    tracing::debug!(request_id = %request_id, uid = %reviewed.uid, "Admission request allowed");
                    Outcome::Allowed
                }
                Decision::Deny(message) => {
                    tracing::info!(
                        request_id = %request_id,
                        uid = %reviewed.uid,
                        message = %message,
                        "Admission request denied"
                    );
                    Outcome::Denied
                }
            };
            record_admission(outcome, start);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
                reviewed.body,
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to process admission review");
            record_admission(Outcome::Error, start);
            internal_error()
        }
    }
}

fn accepts_json(headers: &HeaderMap) -> bool {
    match headers.get(header::CONTENT_TYPE) {
        None => true,
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|v| v.split(';').next())
            .map(|mime| mime.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
            .unwrap_or(false),
    }
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::{json, Value};

    fn body(uid: &str, prefixes: &[&str]) -> Vec<u8> {
        let http: Vec<Value> = prefixes
            .iter()
            .map(|p| json!({"match": [{"uri": {"prefix": p}}]}))
            .collect();
        serde_json::to_vec(&json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": uid,
                "kind": {"group": "networking.istio.io", "version": "v1alpha3", "kind": "VirtualService"},
                "object": {"apiVersion": "networking.istio.io/v1alpha3", "kind": "VirtualService", "spec": {"http": http}}
            }
        }))
        .unwrap()
    }

    #[test]
    fn review_allows_and_echoes_uid() {
        let reviewed = review(&PolicyEvaluator::default(), &body("u2", &["/a", "/b"])).unwrap();
        assert_eq!(reviewed.uid, "u2");
        assert_eq!(reviewed.decision, Decision::Allow);

        let reply: Value = serde_json::from_slice(&reviewed.body).unwrap();
        assert_eq!(reply["response"], json!({"uid": "u2", "allowed": true}));
    }

    #[test]
    fn review_denies_duplicates() {
        let reviewed = review(&PolicyEvaluator::default(), &body("u3", &["/api", "/api"])).unwrap();
        assert!(!reviewed.decision.is_allowed());
        let reply: Value = serde_json::from_slice(&reviewed.body).unwrap();
        assert_eq!(
            reply["response"]["status"]["message"],
            "The provided api prefix already exists"
        );
    }

    #[test]
    fn review_surfaces_decode_errors() {
        assert!(matches!(
            review(&PolicyEvaluator::default(), b"{"),
            Err(AdmissionError::Decode(DecodeError::Malformed { .. }))
        ));
    }

    #[test]
    fn content_type_check() {
        let mut headers = HeaderMap::new();
        assert!(accepts_json(&headers));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(accepts_json(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("Application/JSON; charset=utf-8"),
        );
        assert!(accepts_json(&headers));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/yaml"));
        assert!(!accepts_json(&headers));
    }
}
