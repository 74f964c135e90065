//! Dispute filing for the uncovered part of a pending settlement.

use serde::{Deserialize, Serialize};

use crate::compensation::ServerReply;
use crate::error::GatewayError;

/// Body of the litigation-create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeRequest {
    pub debtor_id: String,
    pub invoices: Vec<String>,
    /// Pending delta in whole currency units.
    pub amount: i64,
    pub reason: String,
}

pub trait LitigationGateway {
    fn create_litigation(&self, req: &DisputeRequest) -> Result<ServerReply, GatewayError>;
}
