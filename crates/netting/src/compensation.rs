//! Compensation submit: record a netting with the backend.
//!
//! One call, never retried, no idempotency key. Whatever the outcome, the
//! selection is cleared and the debtor's cached lists go stale so the next
//! read reflects what the server actually recorded.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::DocumentCache;
use crate::error::{GatewayError, NettingError};
use crate::session::{MountGuard, ReconciliationSession};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Body of the reconciliation-create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationRequest {
    pub debtor_id: String,
    pub invoices: Vec<String>,
    pub payments: Vec<String>,
}

/// `{ success, message }` reply shared by the mutation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerReply {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

pub trait ReconciliationGateway {
    fn create_reconciliation(&self, req: &CompensationRequest) -> Result<ServerReply, GatewayError>;
}

/// Toast-style user notifications.
pub trait Notifier {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompensationOutcome {
    /// Server recorded the compensation.
    Accepted { message: String },
    /// Server answered but reported `success: false`.
    Rejected { message: String },
    /// Call did not complete.
    Failed(GatewayError),
}

impl CompensationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Self::Accepted { message } | Self::Rejected { message } => message.clone(),
            Self::Failed(e) => e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Submitter
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CompensationSubmitter {
    gateway: Arc<dyn ReconciliationGateway + Send + Sync>,
    cache: Arc<DocumentCache>,
    notifier: Arc<dyn Notifier + Send + Sync>,
}

impl CompensationSubmitter {
    pub fn new(
        gateway: Arc<dyn ReconciliationGateway + Send + Sync>,
        cache: Arc<DocumentCache>,
        notifier: Arc<dyn Notifier + Send + Sync>,
    ) -> Self {
        Self { gateway, cache, notifier }
    }

    /// Submit the session's selection and reset it.
    ///
    /// Validation failures leave the selection untouched and make no call.
    pub fn submit(
        &self,
        session: &mut ReconciliationSession,
    ) -> Result<CompensationOutcome, NettingError> {
        let req = session.compensation_request()?;
        let guard = session.mount_guard();
        let outcome = self.dispatch(&req, &guard);
        session.clear_all();
        Ok(outcome)
    }

    /// Send a prepared request.
    ///
    /// Safe to run after the screen has gone away: the call still completes
    /// and the cache is still invalidated, but nothing is shown to a screen
    /// that no longer exists.
    pub fn dispatch(&self, req: &CompensationRequest, guard: &MountGuard) -> CompensationOutcome {
        log::info!(
            "submitting compensation for debtor {}: {} invoice(s), {} payment(s)",
            req.debtor_id,
            req.invoices.len(),
            req.payments.len()
        );

        let outcome = match self.gateway.create_reconciliation(req) {
            Ok(reply) if reply.success => CompensationOutcome::Accepted { message: reply.message },
            Ok(reply) => CompensationOutcome::Rejected { message: reply.message },
            Err(e) => CompensationOutcome::Failed(e),
        };

        self.cache.invalidate_debtor(&req.debtor_id);

        if !guard.is_mounted() {
            log::warn!(
                "compensation for debtor {} finished after the screen closed: {}",
                req.debtor_id,
                outcome.message()
            );
            return outcome;
        }

        match &outcome {
            CompensationOutcome::Accepted { message } => {
                log::info!("compensation accepted: {message}");
                self.notifier.success(message);
            }
            CompensationOutcome::Rejected { message } => {
                log::warn!("compensation rejected: {message}");
                let text = if message.is_empty() {
                    "Compensation was rejected by the server"
                } else {
                    message.as_str()
                };
                self.notifier.error(text);
            }
            CompensationOutcome::Failed(e) => {
                log::warn!("compensation failed: {e}");
                self.notifier.error(&format!("Compensation failed: {e}"));
            }
        }

        outcome
    }
}
