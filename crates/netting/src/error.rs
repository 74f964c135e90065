use std::fmt;

/// Failure reported by a backend gateway (list source or reconciliation endpoint).
///
/// The engine does not care about transport details; the client crate
/// flattens its own error into one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Could not reach the backend.
    Network(String),
    /// Backend answered with a non-success status.
    Rejected { status: u16, message: String },
    /// Backend answered with something we could not read.
    Malformed(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Rejected { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for GatewayError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NettingError {
    /// No invoice was selected.
    NoInvoicesSelected,
    /// No credit document was selected.
    NoPaymentsSelected,
    /// Could not derive the owning debtor from the selection.
    MissingDebtor,
    /// The selection does not produce a submittable settlement.
    NothingToCompensate,
    /// Dispute requested for a settlement that has no pending balance.
    NoPendingBalance,
    /// Backend call failed.
    Gateway(GatewayError),
}

impl fmt::Display for NettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoInvoicesSelected => write!(f, "no invoices selected"),
            Self::NoPaymentsSelected => write!(f, "no payments selected"),
            Self::MissingDebtor => write!(f, "cannot determine debtor from selected payments"),
            Self::NothingToCompensate => write!(f, "selection has nothing to compensate"),
            Self::NoPendingBalance => write!(f, "settlement has no pending balance to dispute"),
            Self::Gateway(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for NettingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gateway(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GatewayError> for NettingError {
    fn from(e: GatewayError) -> Self {
        Self::Gateway(e)
    }
}
