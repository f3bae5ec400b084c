//! AdmissionReview envelope codec.
//!
//! Wire casing follows the cluster convention of lower-camel keys. Every
//! struct keeps the keys it does not model in a flattened `extra` map, so a
//! decoded envelope re-encodes with the caller's fields intact.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::policy::Decision;

/// API group of the admission envelope.
pub const ADMISSION_GROUP: &str = "admission.k8s.io";

/// Envelope versions this webhook speaks.
pub const SUPPORTED_VERSIONS: &[&str] = &["v1", "v1beta1"];

/// Kind of the admission envelope.
pub const ADMISSION_REVIEW_KIND: &str = "AdmissionReview";

/// Used when a policy denies without saying why.
const FALLBACK_DENY_MESSAGE: &str = "The request was denied by the admission policy";

/// Errors raised while decoding the envelope or its embedded object.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not valid JSON for the expected shape.
    #[error("malformed {what}: {source}")]
    Malformed {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The envelope carries a group/version/kind this webhook does not handle.
    #[error("unsupported envelope {api_version}, kind {kind}")]
    UnsupportedEnvelope { api_version: String, kind: String },

    /// The envelope has no `request` section.
    #[error("admission review carries no request")]
    MissingRequest,

    /// The request has no embedded object.
    #[error("admission request {uid} carries no object")]
    MissingObject { uid: String },

    /// The embedded object is not the expected resource kind.
    #[error("unexpected object kind {found}, expected {expected}")]
    UnexpectedKind { expected: String, found: String },
}

/// Group, version and kind triple as carried in `request.kind`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GroupVersionKind {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub kind: String,
}

impl GroupVersionKind {
    /// Split an `apiVersion` such as `networking.istio.io/v1alpha3` and pair it
    /// with a kind. A version without a slash belongs to the core group.
    pub fn from_api_version(api_version: &str, kind: &str) -> Self {
        let (group, version) = match api_version.split_once('/') {
            Some((group, version)) => (group, version),
            None => ("", api_version),
        };
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }
}

impl std::fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}, Kind={}", self.version, self.kind)
        } else {
            write!(f, "{}/{}, Kind={}", self.group, self.version, self.kind)
        }
    }
}

/// The serialized object under review, kept verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RawExtension(pub Value);

impl RawExtension {
    /// Borrow the embedded JSON.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

/// The request half of the envelope.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    /// Opaque identifier the response must echo.
    pub uid: String,

    /// Kind of the object under review.
    pub kind: GroupVersionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<RawExtension>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AdmissionRequest {
    /// The embedded object, or `MissingObject` when absent or null.
    pub fn object(&self) -> Result<&RawExtension, DecodeError> {
        match &self.object {
            Some(raw) if !raw.is_null() => Ok(raw),
            _ => Err(DecodeError::MissingObject {
                uid: self.uid.clone(),
            }),
        }
    }
}

/// Human readable explanation attached to a denial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Status {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// The response half of the envelope.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AdmissionResponse {
    pub uid: String,
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl AdmissionResponse {
    /// Admit the request identified by `uid`.
    pub fn allowed(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            allowed: true,
            status: None,
        }
    }

    /// Reject the request identified by `uid`. The message is never empty.
    pub fn denied(uid: impl Into<String>, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = FALLBACK_DENY_MESSAGE.to_string();
        }
        Self {
            uid: uid.into(),
            allowed: false,
            status: Some(Status { message }),
        }
    }

    /// Build the response for a policy decision.
    pub fn from_decision(uid: impl Into<String>, decision: &Decision) -> Self {
        match decision {
            Decision::Allow => Self::allowed(uid),
            Decision::Deny(message) => Self::denied(uid, message.as_str()),
        }
    }

    /// The denial message, if any.
    pub fn message(&self) -> Option<&str> {
        self.status
            .as_ref()
            .map(|s| s.message.as_str())
            .filter(|m| !m.is_empty())
    }
}

/// The admission envelope exchanged with the API server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReview {
    pub api_version: String,
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<AdmissionRequest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AdmissionResponse>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AdmissionReview {
    /// The request section. Present on every envelope `decode_review` returns.
    pub fn request(&self) -> Result<&AdmissionRequest, DecodeError> {
        self.request.as_ref().ok_or(DecodeError::MissingRequest)
    }

    /// Attach the response for `decision`, echoing the request UID.
    pub fn respond(&mut self, decision: &Decision) -> Result<&AdmissionResponse, DecodeError> {
        let uid = self.request()?.uid.clone();
        Ok(&*self
            .response
            .insert(AdmissionResponse::from_decision(uid, decision)))
    }

    fn is_supported(&self) -> bool {
        let gvk = GroupVersionKind::from_api_version(&self.api_version, &self.kind);
        gvk.group == ADMISSION_GROUP
            && SUPPORTED_VERSIONS.contains(&gvk.version.as_str())
            && gvk.kind == ADMISSION_REVIEW_KIND
    }
}

/// Decode an admission envelope from a JSON body.
pub fn decode_review(bytes: &[u8]) -> Result<AdmissionReview, DecodeError> {
    let review: AdmissionReview =
        serde_json::from_slice(bytes).map_err(|source| DecodeError::Malformed {
            what: "admission review",
            source,
        })?;

    if !review.is_supported() {
        return Err(DecodeError::UnsupportedEnvelope {
            api_version: review.api_version,
            kind: review.kind,
        });
    }
    review.request()?;

    Ok(review)
}

/// Encode an envelope (normally carrying a response) as JSON.
pub fn encode_review(review: &AdmissionReview) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(review)
}
