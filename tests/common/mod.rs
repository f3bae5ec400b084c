//! Shared builders for admission endpoint tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use vs_admission_webhook::{WebhookConfig, WebhookServer};

/// A URI matcher as it appears on the wire.
pub enum Uri<'a> {
    Prefix(&'a str),
    Exact(&'a str),
    Regex(&'a str),
}

impl Uri<'_> {
    fn to_json(&self) -> Value {
        match self {
            Uri::Prefix(p) => json!({"prefix": p}),
            Uri::Exact(p) => json!({"exact": p}),
            Uri::Regex(p) => json!({"regex": p}),
        }
    }
}

/// A VirtualService whose routes each carry one URI match.
pub fn virtual_service(uris: &[Uri<'_>]) -> Value {
    let http: Vec<Value> = uris
        .iter()
        .enumerate()
        .map(|(i, uri)| {
            json!({
                "name": format!("route-{i}"),
                "match": [{"uri": uri.to_json()}],
                "route": [{"destination": {"host": format!("svc-{i}.default.svc.cluster.local")}}]
            })
        })
        .collect();

    json!({
        "apiVersion": "networking.istio.io/v1alpha3",
        "kind": "VirtualService",
        "metadata": {"name": "reviews", "namespace": "default"},
        "spec": {"hosts": ["reviews"], "http": http}
    })
}

/// A VirtualService whose routes use URI prefixes only.
pub fn with_prefixes(prefixes: &[&str]) -> Value {
    let uris: Vec<Uri<'_>> = prefixes.iter().map(|p| Uri::Prefix(*p)).collect();
    virtual_service(&uris)
}

/// Wrap `object` in an admission review envelope.
pub fn admission_review(uid: &str, object: Value) -> Value {
    json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": uid,
            "kind": {"group": "networking.istio.io", "version": "v1alpha3", "kind": "VirtualService"},
            "resource": {"group": "networking.istio.io", "version": "v1alpha3", "resource": "virtualservices"},
            "namespace": "default",
            "operation": "CREATE",
            "userInfo": {"username": "kubernetes-admin", "groups": ["system:masters"]},
            "object": object,
            "dryRun": false
        }
    })
}

pub fn router() -> Router {
    router_with(WebhookConfig::default())
}

pub fn router_with(config: WebhookConfig) -> Router {
    WebhookServer::new(config).router()
}

pub fn post_validate(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/validate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

pub async fn send(router: Router, request: Request<Body>) -> Response<Body> {
    router.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// POST a review and return the reply's `response` section.
pub async fn admit(uid: &str, object: Value) -> Value {
    let body = serde_json::to_vec(&admission_review(uid, object)).unwrap();
    let response = send(router(), post_validate(body)).await;
    assert_eq!(response.status(), 200);
    body_json(response).await["response"].clone()
}
