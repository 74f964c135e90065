//! `collecta-netting`: payment-netting engine for accounts-receivable collections.
//!
//! Pure engine crate: holds the selected debit and credit documents for one
//! debtor, reduces them to totals, classifies the settlement, and drives the
//! compensation submit through caller-supplied gateways. No network or file IO.

pub mod cache;
pub mod compensation;
pub mod dispute;
pub mod document;
pub mod error;
pub mod selection;
pub mod session;
pub mod settlement;
pub mod totals;

pub use cache::{DocumentCache, DocumentSource, ListKind};
pub use compensation::{
    CompensationOutcome, CompensationRequest, CompensationSubmitter, Notifier,
    ReconciliationGateway, ServerReply,
};
pub use dispute::{DisputeRequest, LitigationGateway};
pub use document::{parse_balance, Balance, DocumentType, SelectableDocument};
pub use error::{GatewayError, NettingError};
pub use selection::{SelectionSet, SelectionStore, Side};
pub use session::{MountGuard, ReconciliationSession};
pub use settlement::{classify, format_amount, AlertSeverity, Settlement, SettlementAlert, SettlementState};
pub use totals::{total, Totals};
