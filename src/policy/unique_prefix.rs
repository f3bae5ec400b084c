//! URI prefix uniqueness.
//!
//! A VirtualService must not declare the same URI prefix twice across its
//! own HTTP routes. Only `prefix` matchers take part; `exact` and `regex`
//! matchers are outside the uniqueness domain. Routes are walked in order
//! and the first repeated prefix ends the walk.

use super::{Decision, PrefixIndex, RoutePolicy};
use crate::mesh::HttpRoute;

/// Denial message for a repeated prefix. Cluster operators see this text.
pub const DUPLICATE_PREFIX_MESSAGE: &str = "The provided api prefix already exists";

#[derive(Debug, Default, Clone, Copy)]
pub struct UniquePrefix;

impl RoutePolicy for UniquePrefix {
    fn name(&self) -> &'static str {
        "unique-uri-prefix"
    }

    fn evaluate(&self, routes: &[HttpRoute]) -> Decision {
        let mut index = PrefixIndex::new();
        for (position, route) in routes.iter().enumerate() {
            for prefix in route.uri_prefixes() {
                if !index.insert(prefix) {
                    tracing::debug!(
                        route = position,
                        route_name = route.name.as_deref().unwrap_or(""),
                        prefix = %prefix,
                        "Duplicate URI prefix"
                    );
                    return Decision::Deny(DUPLICATE_PREFIX_MESSAGE.to_string());
                }
            }
        }
        Decision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{HttpMatchRequest, StringMatch};

    fn route(uris: &[StringMatch]) -> HttpRoute {
        HttpRoute {
            matches: uris
                .iter()
                .cloned()
                .map(|uri| HttpMatchRequest {
                    uri: Some(uri),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn prefix(p: &str) -> StringMatch {
        StringMatch::Prefix(p.to_string())
    }

    fn denied() -> Decision {
        Decision::Deny(DUPLICATE_PREFIX_MESSAGE.to_string())
    }

    #[test]
    fn no_routes_is_allowed() {
        assert_eq!(UniquePrefix.evaluate(&[]), Decision::Allow);
    }

    #[test]
    fn routes_without_matches_are_allowed() {
        let routes = vec![HttpRoute::default(), HttpRoute::default()];
        assert_eq!(UniquePrefix.evaluate(&routes), Decision::Allow);
    }

    #[test]
    fn distinct_prefixes_are_allowed() {
        let routes = vec![route(&[prefix("/a")]), route(&[prefix("/b")]), route(&[prefix("/c")])];
        assert_eq!(UniquePrefix.evaluate(&routes), Decision::Allow);
    }

    #[test]
    fn duplicate_across_routes_is_denied() {
        let routes = vec![route(&[prefix("/api")]), route(&[prefix("/api")])];
        assert_eq!(UniquePrefix.evaluate(&routes), denied());

        let routes = vec![route(&[prefix("/a")]), route(&[prefix("/b")]), route(&[prefix("/a")])];
        assert_eq!(UniquePrefix.evaluate(&routes), denied());
    }

    #[test]
    fn duplicate_within_one_route_is_denied() {
        let routes = vec![route(&[prefix("/v1"), prefix("/v1")])];
        assert_eq!(UniquePrefix.evaluate(&routes), denied());
    }

    #[test]
    fn other_matcher_kinds_do_not_collide() {
        let routes = vec![
            route(&[StringMatch::Exact("/api".into())]),
            route(&[prefix("/api")]),
            route(&[StringMatch::Regex("/api".into())]),
            route(&[StringMatch::Exact("/api".into())]),
        ];
        assert_eq!(UniquePrefix.evaluate(&routes), Decision::Allow);
    }

    #[test]
    fn empty_prefixes_collide() {
        let routes = vec![route(&[prefix("")]), route(&[prefix("")])];
        assert_eq!(UniquePrefix.evaluate(&routes), denied());
    }

    #[test]
    fn header_matchers_are_ignored() {
        let mut first = route(&[prefix("/a")]);
        first.matches[0]
            .headers
            .insert("x-prefix".into(), prefix("/b"));
        let routes = vec![first, route(&[prefix("/b")])];
        assert_eq!(UniquePrefix.evaluate(&routes), Decision::Allow);
    }
}
