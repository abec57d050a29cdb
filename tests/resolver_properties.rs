//! Property-based tests for the dependency resolver and query codec
//!
//! The resolver promises that any selection it returns is legal and that
//! resolving is idempotent; the query codec promises lossless round trips.
//! Both promises are checked over generated inputs rather than hand-picked
//! cases.

use hazvis_rs::backend::{HazardService, MockHazardService};
use hazvis_rs::catalog::{DependencyResolver, FlowConfig};
use hazvis_rs::config::query;
use hazvis_rs::types::{ParamKey, Selection};
use hazvis_rs::ParameterCatalog;
use proptest::prelude::*;

fn mock_catalog() -> ParameterCatalog {
    MockHazardService::new()
        .fetch_parameters()
        .expect("mock catalog always loads")
}

fn edition() -> impl Strategy<Value = String> {
    prop_oneof![Just("E2008".to_string()), Just("E2014".to_string())]
}

fn region() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("COUS".to_string()),
        Just("WUS".to_string()),
        Just("CEUS".to_string()),
        Just("AK".to_string()),
    ]
}

fn imt() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("PGA".to_string()),
        Just("SA0P2".to_string()),
        Just("SA1P0".to_string()),
    ]
}

fn vs30() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("259".to_string()),
        Just("360".to_string()),
        Just("537".to_string()),
        Just("760".to_string()),
    ]
}

/// Arbitrary (possibly mutually illegal) full selections
fn any_selection() -> impl Strategy<Value = Selection> {
    (edition(), region(), imt(), vs30()).prop_map(|(e, r, i, v)| {
        let mut selection = Selection::new();
        selection.set_single(ParamKey::Edition, e);
        selection.set_single(ParamKey::Region, r);
        selection.set_single(ParamKey::Imt, i);
        selection.set_single(ParamKey::Vs30, v);
        selection
    })
}

fn flow() -> impl Strategy<Value = FlowConfig> {
    prop_oneof![Just(FlowConfig::explorer()), Just(FlowConfig::compare())]
}

proptest! {
    /// Whatever the starting selection, a full resolve leaves every
    /// parameter set and mutually legal
    #[test]
    fn resolve_all_yields_complete_legal_selection(
        selection in any_selection(),
        flow in flow(),
    ) {
        let catalog = mock_catalog();
        let resolution = DependencyResolver::resolve_all(&catalog, &flow, &selection);
        prop_assert!(DependencyResolver::is_complete_and_legal(
            &catalog,
            &flow,
            &resolution.selection
        ));
    }

    /// Resolving an already-resolved selection changes nothing
    #[test]
    fn resolve_all_is_idempotent(selection in any_selection(), flow in flow()) {
        let catalog = mock_catalog();
        let first = DependencyResolver::resolve_all(&catalog, &flow, &selection);
        let second = DependencyResolver::resolve_all(&catalog, &flow, &first.selection);
        prop_assert_eq!(first, second);
    }

    /// A selection surviving its own legal sets is never altered by repair
    #[test]
    fn legal_selection_is_preserved(selection in any_selection(), flow in flow()) {
        let catalog = mock_catalog();
        let resolved = DependencyResolver::resolve_all(&catalog, &flow, &selection).selection;
        for key in ParamKey::ALL {
            if selection.get(key) == resolved.get(key) {
                continue;
            }
            // Any change must have been forced: the original id was not in
            // the legal set computed without it
            let legal = DependencyResolver::legal_values(&catalog, &resolved, key);
            let original = selection.single(key).unwrap();
            prop_assert!(
                !legal.iter().any(|v| v.value == original),
                "{key}: {original} was legal but got replaced"
            );
        }
    }

    /// Query strings survive an encode/decode round trip
    #[test]
    fn query_round_trip(
        selection in any_selection(),
        lat in -90.0f64..90.0,
        lon in -180.0f64..180.0,
    ) {
        let encoded = query::encode(&selection, Some(lat), Some(lon));
        let decoded = query::decode(&encoded).expect("own encoding must decode");
        prop_assert_eq!(decoded.selection, selection);
        prop_assert_eq!(decoded.latitude, Some(lat));
        prop_assert_eq!(decoded.longitude, Some(lon));
    }
}
