//! Admission protocol subsystem.
//!
//! # Data Flow
//! ```text
//! POST /validate body (JSON)
//!     → review.rs (decode_review: envelope + group/version/kind check)
//!     → request.object handed to mesh::virtual_service::decode_object
//!     → policy decision
//!     → review.rs (AdmissionReview::respond, encode_review)
//!     → response body
//! ```
//!
//! # Design Decisions
//! - The envelope is echoed back whole; keys we do not model ride along in
//!   `extra` maps so the API server sees its own request untouched
//! - Only `allowed` and `status.message` are ever produced; no patches

pub mod review;

pub use review::{
    decode_review, encode_review, AdmissionRequest, AdmissionResponse, AdmissionReview,
    DecodeError, GroupVersionKind, RawExtension, Status,
};
