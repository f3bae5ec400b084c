//! Service-mesh routing resources.
//!
//! # Data Flow
//! ```text
//! request.object (raw JSON)
//!     → virtual_service.rs (decode_object: kind check + typed decode)
//!     → extract_routes (ordered spec.http entries)
//!     → policy evaluator
//! ```
//!
//! # Design Decisions
//! - Only the fields a routing policy could reasonably consult are modeled;
//!   everything else in the object is ignored on decode
//! - URI and header matchers are a tagged enum, never a bare string

pub mod virtual_service;

pub use virtual_service::{
    decode_object, extract_routes, Destination, HttpMatchRequest, HttpRoute,
    HttpRouteDestination, StringMatch, VirtualService, VirtualServiceSpec,
};
