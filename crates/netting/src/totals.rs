use crate::selection::{SelectionSet, SelectionStore};

/// Sum of a selection in whole currency units.
///
/// Each balance is rounded before it is added, so the sum never picks up
/// floating point drift. Malformed balances contribute zero.
pub fn total(set: &SelectionSet) -> i64 {
    set.iter()
        .fold(0i64, |acc, doc| acc.saturating_add(doc.amount()))
}

/// Debit and credit totals taken from the same store snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub debit: i64,
    pub credit: i64,
}

impl Totals {
    pub fn of(store: &SelectionStore) -> Self {
        Self {
            debit: total(store.invoices()),
            credit: total(store.payments()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Balance, DocumentType, SelectableDocument};
    use crate::selection::Side;

    fn doc(id: &str, balance: Balance) -> SelectableDocument {
        SelectableDocument::new(id, balance, "d1", DocumentType::Invoice)
    }

    #[test]
    fn empty_set_totals_zero() {
        assert_eq!(total(&SelectionSet::new()), 0);
    }

    #[test]
    fn mixed_encodings_sum() {
        let mut set = SelectionSet::new();
        set.toggle(doc("a", Balance::Number(100000.0)));
        set.toggle(doc("b", Balance::from("150000")));
        assert_eq!(total(&set), 250000);
    }

    #[test]
    fn malformed_balance_contributes_zero() {
        let mut set = SelectionSet::new();
        set.toggle(doc("a", Balance::from("abc")));
        set.toggle(doc("b", Balance::Missing));
        set.toggle(doc("c", Balance::from("500")));
        assert_eq!(total(&set), 500);
    }

    #[test]
    fn each_step_is_rounded() {
        // 0.4 three times: rounding per step gives 0, a float sum would give 1
        let mut set = SelectionSet::new();
        for id in ["a", "b", "c"] {
            set.toggle(doc(id, Balance::Number(0.4)));
        }
        assert_eq!(total(&set), 0);
    }

    #[test]
    fn totals_read_both_sides() {
        let mut store = SelectionStore::new();
        store.toggle(Side::Invoices, doc("i1", Balance::Number(250000.0)));
        store.toggle(Side::Payments, doc("p1", Balance::from("150000")));
        let totals = Totals::of(&store);
        assert_eq!(totals, Totals { debit: 250000, credit: 150000 });
    }
}
