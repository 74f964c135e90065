//! Screen-scoped reconciliation state.
//!
//! One session per open reconciliation screen. Nothing here is global, so two
//! screens (or two tabs) never see each other's selections.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::compensation::CompensationRequest;
use crate::dispute::DisputeRequest;
use crate::document::SelectableDocument;
use crate::error::NettingError;
use crate::selection::{SelectionStore, Side};
use crate::settlement::{classify, Settlement, SettlementState};
use crate::totals::Totals;

/// Shared "is the screen still there" flag.
///
/// Cloned into work that may outlive the session, such as a submit still in
/// flight when the user navigates away.
#[derive(Debug, Clone)]
pub struct MountGuard(Arc<AtomicBool>);

impl MountGuard {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn release(&self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct ReconciliationSession {
    debtor_id: String,
    selection: SelectionStore,
    guard: MountGuard,
}

impl ReconciliationSession {
    pub fn new(debtor_id: impl Into<String>) -> Self {
        Self {
            debtor_id: debtor_id.into(),
            selection: SelectionStore::new(),
            guard: MountGuard::new(),
        }
    }

    pub fn debtor_id(&self) -> &str {
        &self.debtor_id
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn mount_guard(&self) -> MountGuard {
        self.guard.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.guard.is_mounted()
    }

    fn belongs_here(&self, doc: &SelectableDocument) -> bool {
        doc.debtor_id.is_empty() || doc.debtor_id == self.debtor_id
    }

    /// Toggle a row. Documents owned by another debtor are ignored; returns
    /// whether the selection changed.
    pub fn toggle(&mut self, side: Side, doc: SelectableDocument) -> bool {
        if !self.belongs_here(&doc) {
            log::warn!(
                "ignoring {} {} of debtor {} in session for {}",
                side,
                doc.id,
                doc.debtor_id,
                self.debtor_id
            );
            return false;
        }
        self.selection.toggle(side, doc);
        true
    }

    pub fn select_all(&mut self, side: Side, docs: impl IntoIterator<Item = SelectableDocument>) {
        let own: Vec<_> = docs.into_iter().filter(|d| self.belongs_here(d)).collect();
        self.selection.select_all(side, own);
    }

    pub fn clear(&mut self, side: Side) {
        self.selection.clear(side);
    }

    pub fn clear_all(&mut self) {
        self.selection.clear_all();
    }

    pub fn totals(&self) -> Totals {
        Totals::of(&self.selection)
    }

    /// Always derived from the current selection.
    pub fn settlement(&self) -> Settlement {
        let totals = self.totals();
        classify(totals.debit, totals.credit)
    }

    /// Navigate to another debtor. Starts from an empty selection.
    pub fn switch_debtor(&mut self, debtor_id: impl Into<String>) {
        let debtor_id = debtor_id.into();
        if debtor_id != self.debtor_id {
            log::debug!("switching debtor {} -> {}", self.debtor_id, debtor_id);
            self.debtor_id = debtor_id;
            self.selection.clear_all();
        }
    }

    /// Tear the screen down. Outstanding work sees `is_mounted() == false`.
    pub fn unmount(&mut self) {
        self.guard.release();
        self.selection.clear_all();
    }

    /// Build the reconciliation-create body for the current selection.
    pub fn compensation_request(&self) -> Result<CompensationRequest, NettingError> {
        if self.selection.invoices().is_empty() {
            return Err(NettingError::NoInvoicesSelected);
        }
        if self.selection.payments().is_empty() {
            return Err(NettingError::NoPaymentsSelected);
        }
        let debtor_id = self
            .selection
            .debtor_id()
            .ok_or(NettingError::MissingDebtor)?
            .to_string();
        if !self.settlement().can_submit() {
            return Err(NettingError::NothingToCompensate);
        }

        Ok(CompensationRequest {
            debtor_id,
            invoices: self.selection.invoices().ids(),
            payments: self.selection.payments().ids(),
        })
    }

    /// Build a litigation body for the pending delta.
    pub fn dispute_request(&self, reason: impl Into<String>) -> Result<DisputeRequest, NettingError> {
        let settlement = self.settlement();
        if settlement.state != SettlementState::Pending {
            return Err(NettingError::NoPendingBalance);
        }
        Ok(DisputeRequest {
            debtor_id: self.debtor_id.clone(),
            invoices: self.selection.invoices().ids(),
            amount: settlement.delta,
            reason: reason.into(),
        })
    }
}

impl Drop for ReconciliationSession {
    fn drop(&mut self) {
        self.guard.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentType;

    fn inv(id: &str, amount: i64) -> SelectableDocument {
        SelectableDocument::new(id, amount, "d1", DocumentType::Invoice)
    }

    fn pay(id: &str, amount: i64) -> SelectableDocument {
        SelectableDocument::new(id, amount, "d1", DocumentType::Payment)
    }

    #[test]
    fn negative_credit_note_on_invoice_side_blocks_submit() {
        let mut s = ReconciliationSession::new("d1");
        s.toggle(
            Side::Invoices,
            SelectableDocument::new("nc-61-1", "-50000", "d1", DocumentType::CreditNote),
        );
        s.toggle(Side::Payments, pay("p1", 30000));
        assert_eq!(s.settlement().state, SettlementState::Empty);
        assert_eq!(s.compensation_request(), Err(NettingError::NothingToCompensate));
    }

    #[test]
    fn settlement_tracks_every_toggle() {
        let mut s = ReconciliationSession::new("d1");
        assert_eq!(s.settlement().state, SettlementState::Empty);
        s.toggle(Side::Invoices, inv("i1", 250000));
        assert_eq!(s.settlement().state, SettlementState::Empty);
        s.toggle(Side::Payments, pay("p1", 150000));
        assert_eq!(s.settlement().state, SettlementState::Pending);
        s.toggle(Side::Payments, pay("p2", 100000));
        assert_eq!(s.settlement().state, SettlementState::Balanced);
        s.toggle(Side::Payments, pay("p3", 1));
        assert_eq!(s.settlement().state, SettlementState::Surplus);
    }

    #[test]
    fn foreign_debtor_documents_are_ignored() {
        let mut s = ReconciliationSession::new("d1");
        let other = SelectableDocument::new("x", 10, "d2", DocumentType::Invoice);
        assert!(!s.toggle(Side::Invoices, other.clone()));
        s.select_all(Side::Invoices, vec![inv("i1", 1), other]);
        assert_eq!(s.selection().invoices().ids(), vec!["i1"]);
    }

    #[test]
    fn switching_debtor_clears_selection() {
        let mut s = ReconciliationSession::new("d1");
        s.toggle(Side::Invoices, inv("i1", 1));
        s.switch_debtor("d1");
        assert_eq!(s.selection().invoices().len(), 1);
        s.switch_debtor("d2");
        assert_eq!(s.debtor_id(), "d2");
        assert!(s.selection().invoices().is_empty());
    }

    #[test]
    fn unmount_releases_guard() {
        let mut s = ReconciliationSession::new("d1");
        let guard = s.mount_guard();
        s.toggle(Side::Invoices, inv("i1", 1));
        assert!(guard.is_mounted());
        s.unmount();
        assert!(!guard.is_mounted());
        assert!(s.selection().invoices().is_empty());
    }

    #[test]
    fn drop_releases_guard() {
        let s = ReconciliationSession::new("d1");
        let guard = s.mount_guard();
        drop(s);
        assert!(!guard.is_mounted());
    }

    #[test]
    fn request_needs_both_sides() {
        let mut s = ReconciliationSession::new("d1");
        assert_eq!(s.compensation_request(), Err(NettingError::NoInvoicesSelected));
        s.toggle(Side::Invoices, inv("i1", 10));
        assert_eq!(s.compensation_request(), Err(NettingError::NoPaymentsSelected));
    }

    #[test]
    fn request_rejects_zero_totals() {
        let mut s = ReconciliationSession::new("d1");
        s.toggle(Side::Invoices, inv("i1", 10));
        s.toggle(
            Side::Payments,
            SelectableDocument::new("p1", "abc", "d1", DocumentType::Payment),
        );
        assert_eq!(s.compensation_request(), Err(NettingError::NothingToCompensate));
    }

    #[test]
    fn request_without_payment_debtor() {
        let mut s = ReconciliationSession::new("d1");
        s.toggle(Side::Invoices, inv("i1", 10));
        s.toggle(
            Side::Payments,
            SelectableDocument::new("p1", 10, "", DocumentType::Payment),
        );
        assert_eq!(s.compensation_request(), Err(NettingError::MissingDebtor));
    }

    #[test]
    fn request_lists_ids_in_selection_order() {
        let mut s = ReconciliationSession::new("d1");
        s.toggle(Side::Invoices, inv("i2", 10));
        s.toggle(Side::Invoices, inv("i1", 10));
        s.toggle(Side::Payments, pay("p1", 20));
        let req = s.compensation_request().unwrap();
        assert_eq!(req.debtor_id, "d1");
        assert_eq!(req.invoices, vec!["i2", "i1"]);
        assert_eq!(req.payments, vec!["p1"]);
    }

    #[test]
    fn dispute_only_when_pending() {
        let mut s = ReconciliationSession::new("d1");
        s.toggle(Side::Invoices, inv("i1", 250000));
        s.toggle(Side::Payments, pay("p1", 250000));
        assert_eq!(s.dispute_request("x"), Err(NettingError::NoPendingBalance));
        s.toggle(Side::Payments, pay("p1", 250000));
        s.toggle(Side::Payments, pay("p2", 150000));
        let req = s.dispute_request("short payment").unwrap();
        assert_eq!(req.amount, 100000);
        assert_eq!(req.invoices, vec!["i1"]);
        assert_eq!(req.reason, "short payment");
    }
}
