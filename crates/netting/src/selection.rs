//! Selection store: the debit and credit documents picked for one netting.
//!
//! Two ordered lists, insertion order = selection order. Ids are unique per
//! list; toggling an id that is already present removes it.

use crate::document::SelectableDocument;

/// Which of the two selection lists an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Outstanding invoices (debits).
    Invoices,
    /// Payments and credit notes (credits).
    Payments,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invoices => write!(f, "invoices"),
            Self::Payments => write!(f, "payments"),
        }
    }
}

// ---------------------------------------------------------------------------
// SelectionSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    docs: Vec<SelectableDocument>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the document if its id is selected, append it otherwise.
    pub fn toggle(&mut self, doc: SelectableDocument) {
        if let Some(pos) = self.docs.iter().position(|d| d.id == doc.id) {
            self.docs.remove(pos);
        } else {
            self.docs.push(doc);
        }
    }

    /// Replace the whole selection. Later duplicates of an id are dropped.
    pub fn select_all(&mut self, docs: impl IntoIterator<Item = SelectableDocument>) {
        self.docs.clear();
        for doc in docs {
            if !self.contains(&doc.id) {
                self.docs.push(doc);
            }
        }
    }

    pub fn clear(&mut self) {
        self.docs.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.docs.iter().any(|d| d.id == id)
    }

    /// Selected ids in selection order.
    pub fn ids(&self) -> Vec<String> {
        self.docs.iter().map(|d| d.id.clone()).collect()
    }

    pub fn first(&self) -> Option<&SelectableDocument> {
        self.docs.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SelectableDocument> {
        self.docs.iter()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a SelectableDocument;
    type IntoIter = std::slice::Iter<'a, SelectableDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

// ---------------------------------------------------------------------------
// SelectionStore
// ---------------------------------------------------------------------------

/// Sole owner of the invoice and payment selections for one screen.
///
/// Documents are expected to belong to a single debtor; the enclosing
/// session enforces that by only feeding documents fetched for its debtor.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    invoices: SelectionSet,
    payments: SelectionSet,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, side: Side) -> &SelectionSet {
        match side {
            Side::Invoices => &self.invoices,
            Side::Payments => &self.payments,
        }
    }

    fn set_mut(&mut self, side: Side) -> &mut SelectionSet {
        match side {
            Side::Invoices => &mut self.invoices,
            Side::Payments => &mut self.payments,
        }
    }

    pub fn invoices(&self) -> &SelectionSet {
        &self.invoices
    }

    pub fn payments(&self) -> &SelectionSet {
        &self.payments
    }

    pub fn toggle(&mut self, side: Side, doc: SelectableDocument) {
        log::debug!("toggle {} {}", side, doc.id);
        self.set_mut(side).toggle(doc);
    }

    pub fn select_all(&mut self, side: Side, docs: impl IntoIterator<Item = SelectableDocument>) {
        self.set_mut(side).select_all(docs);
    }

    pub fn clear(&mut self, side: Side) {
        self.set_mut(side).clear();
    }

    pub fn clear_all(&mut self) {
        self.invoices.clear();
        self.payments.clear();
    }

    pub fn is_selected(&self, side: Side, id: &str) -> bool {
        self.set(side).contains(id)
    }

    /// Debtor the compensation is filed under: owner of the first selected payment.
    pub fn debtor_id(&self) -> Option<&str> {
        self.payments
            .first()
            .map(|d| d.debtor_id.as_str())
            .filter(|id| !id.is_empty())
    }
}
