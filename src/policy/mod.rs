//! Routing policy subsystem.
//!
//! # Data Flow
//! ```text
//! &[HttpRoute] (from mesh::extract_routes)
//!     → PolicyEvaluator (each RoutePolicy in order)
//!         → unique_prefix.rs (PrefixIndex per evaluation)
//!     → Decision::Allow | Decision::Deny(message)
//! ```
//!
//! # Design Decisions
//! - Policies combine with AND semantics; the first denial wins
//! - Evaluation is a pure function of the route list; nothing is shared
//!   between decisions
//! - New rules are added as further `RoutePolicy` implementations

pub mod prefix_index;
pub mod unique_prefix;

pub use prefix_index::PrefixIndex;
pub use unique_prefix::{UniquePrefix, DUPLICATE_PREFIX_MESSAGE};

use crate::mesh::HttpRoute;

/// Outcome of evaluating routes against the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Reject with a short human readable sentence.
    Deny(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// A single admission rule over the routes of one resource.
pub trait RoutePolicy: Send + Sync + std::fmt::Debug {
    /// Stable identifier used in logs.
    fn name(&self) -> &'static str;

    /// Decide whether `routes` satisfy this rule.
    fn evaluate(&self, routes: &[HttpRoute]) -> Decision;
}

/// Runs every configured policy; all must allow.
#[derive(Debug)]
pub struct PolicyEvaluator {
    policies: Vec<Box<dyn RoutePolicy>>,
}

impl PolicyEvaluator {
    pub fn new(policies: Vec<Box<dyn RoutePolicy>>) -> Self {
        Self { policies }
    }

    /// Evaluate `routes`, returning the first denial or `Allow`.
    pub fn evaluate(&self, routes: &[HttpRoute]) -> Decision {
        for policy in &self.policies {
            let decision = policy.evaluate(routes);
            if !decision.is_allowed() {
                tracing::debug!(policy = policy.name(), "Policy denied routes");
                return decision;
            }
        }
        Decision::Allow
    }

    /// Names of the configured policies, in evaluation order.
    pub fn policy_names(&self) -> Vec<&'static str> {
        self.policies.iter().map(|p| p.name()).collect()
    }
}

impl Default for PolicyEvaluator {
    fn default() -> Self {
        Self::new(vec![Box::new(UniquePrefix)])
    }
}
