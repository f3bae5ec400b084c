//! Property tests for the prefix uniqueness policy.

use std::collections::BTreeSet;

use proptest::prelude::*;
use vs_admission_webhook::mesh::{HttpMatchRequest, HttpRoute, StringMatch};
use vs_admission_webhook::policy::DUPLICATE_PREFIX_MESSAGE;
use vs_admission_webhook::{Decision, PolicyEvaluator};

fn route(matcher: StringMatch) -> HttpRoute {
    HttpRoute {
        matches: vec![HttpMatchRequest {
            uri: Some(matcher),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn prefix_routes(prefixes: &[String]) -> Vec<HttpRoute> {
    prefixes
        .iter()
        .map(|p| route(StringMatch::Prefix(p.clone())))
        .collect()
}

fn distinct_prefixes() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("/[a-z0-9/-]{0,12}", 0..16)
        .prop_map(|set: BTreeSet<String>| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

proptest! {
    #[test]
    fn distinct_prefixes_are_allowed(prefixes in distinct_prefixes()) {
        let decision = PolicyEvaluator::default().evaluate(&prefix_routes(&prefixes));
        prop_assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn any_repeated_prefix_is_denied(
        prefixes in distinct_prefixes().prop_filter("need a prefix to repeat", |p| !p.is_empty()),
        pick in any::<prop::sample::Index>(),
        at in any::<prop::sample::Index>(),
    ) {
        let mut with_duplicate = prefixes.clone();
        let repeated = prefixes[pick.index(prefixes.len())].clone();
        with_duplicate.insert(at.index(prefixes.len() + 1), repeated);

        let decision = PolicyEvaluator::default().evaluate(&prefix_routes(&with_duplicate));
        prop_assert_eq!(decision, Decision::Deny(DUPLICATE_PREFIX_MESSAGE.to_string()));
    }

    #[test]
    fn non_prefix_matchers_never_deny(
        paths in prop::collection::vec("/[a-z]{0,4}", 0..12),
        exact in any::<bool>(),
    ) {
        let routes: Vec<HttpRoute> = paths
            .iter()
            .map(|p| route(if exact { StringMatch::Exact(p.clone()) } else { StringMatch::Regex(p.clone()) }))
            .collect();
        prop_assert!(PolicyEvaluator::default().evaluate(&routes).is_allowed());
    }

    #[test]
    fn evaluation_is_deterministic(prefixes in prop::collection::vec("/[a-c]{0,2}", 0..10)) {
        let routes = prefix_routes(&prefixes);
        let evaluator = PolicyEvaluator::default();
        prop_assert_eq!(evaluator.evaluate(&routes), evaluator.evaluate(&routes));

        let unique: BTreeSet<&String> = prefixes.iter().collect();
        prop_assert_eq!(evaluator.evaluate(&routes).is_allowed(), unique.len() == prefixes.len());
    }
}
