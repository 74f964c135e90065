// Property-based tests for selection and settlement arithmetic.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;

use collecta_netting::{
    classify, total, Balance, DocumentType, SelectableDocument, SelectionSet, SettlementState,
};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Mostly well-formed amounts, sometimes strings, sometimes garbage.
fn arb_balance() -> impl Strategy<Value = Balance> {
    prop_oneof![
        3 => (0i64..10_000_000).prop_map(|n| Balance::Number(n as f64)),
        2 => (0i64..10_000_000).prop_map(|n| Balance::Text(n.to_string())),
        1 => r"[a-z]{0,5}".prop_map(Balance::Text),
        1 => Just(Balance::Missing),
    ]
}

fn arb_doc(prefix: &'static str) -> impl Strategy<Value = SelectableDocument> {
    (0u32..40, arb_balance()).prop_map(move |(n, balance)| {
        SelectableDocument::new(format!("{prefix}{n}"), balance, "d1", DocumentType::Invoice)
    })
}

fn set_of(docs: Vec<SelectableDocument>) -> SelectionSet {
    let mut set = SelectionSet::new();
    set.select_all(docs);
    set
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn toggle_twice_is_identity(
        docs in prop::collection::vec(arb_doc("a"), 0..20),
        extra in arb_doc("a"),
    ) {
        let original = set_of(docs);
        let mut set = original.clone();
        set.toggle(extra.clone());
        set.toggle(extra.clone());

        let mut before = original.ids();
        let mut after = set.ids();
        let others_before: Vec<String> = before.iter().filter(|id| **id != extra.id).cloned().collect();
        let others_after: Vec<String> = after.iter().filter(|id| **id != extra.id).cloned().collect();
        prop_assert_eq!(others_after, others_before);

        before.sort();
        after.sort();
        prop_assert_eq!(after, before);
    }

    #[test]
    fn ids_are_unique(docs in prop::collection::vec(arb_doc("a"), 0..40)) {
        let mut set = SelectionSet::new();
        for d in docs {
            set.toggle(d);
        }
        let mut ids = set.ids();
        let n = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), n);
    }

    #[test]
    fn total_is_additive_over_disjoint_sets(
        left in prop::collection::vec(arb_doc("l"), 0..20),
        right in prop::collection::vec(arb_doc("r"), 0..20),
    ) {
        let s1 = set_of(left);
        let s2 = set_of(right);
        let union = set_of(s1.iter().chain(s2.iter()).cloned().collect());
        prop_assert_eq!(total(&union), total(&s1) + total(&s2));
    }

    #[test]
    fn classifier_is_total(debit in 0i64..1_000_000_000, credit in 0i64..1_000_000_000) {
        let s = classify(debit, credit);
        let expected = if debit == 0 || credit == 0 {
            SettlementState::Empty
        } else if debit == credit {
            SettlementState::Balanced
        } else if credit > debit {
            SettlementState::Surplus
        } else {
            SettlementState::Pending
        };
        prop_assert_eq!(s.state, expected);
        prop_assert_eq!(s.delta, (debit - credit).abs());
    }

    #[test]
    fn compensable_amount_is_bounded(debit in 0i64..1_000_000_000, credit in 0i64..1_000_000_000) {
        let s = classify(debit, credit);
        prop_assert!(s.compensable_amount <= debit);
        prop_assert!(s.compensable_amount <= credit);
    }
}
