//! Settlement classification: what happens if the current selection is netted.
//!
//! Four states, a pure function of (debit total, credit total):
//! - Empty: either side totals zero (or less). Nothing to submit.
//! - Balanced: both sides equal.
//! - Surplus: credits exceed debits; the rest stays in the debtor's favor.
//! - Pending: debits exceed credits; the rest stays owed.
//!
//! Recomputed from scratch on every selection change. No memory between calls.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementState {
    Empty,
    Balanced,
    Surplus,
    Pending,
}

impl std::fmt::Display for SettlementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Balanced => write!(f, "balanced"),
            Self::Surplus => write!(f, "surplus"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub state: SettlementState,
    pub debit_total: i64,
    pub credit_total: i64,
    /// |debit - credit|
    pub delta: i64,
    /// Amount that is actually settled: min(debit, credit).
    pub compensable_amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Success,
    Warning,
}

/// Banner shown above the submit action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementAlert {
    pub severity: AlertSeverity,
    pub message: String,
}

/// Classify a pair of totals.
pub fn classify(debit_total: i64, credit_total: i64) -> Settlement {
    // A side netted down to zero or below (negative credit notes) has nothing to offer.
    let state = if debit_total <= 0 || credit_total <= 0 {
        SettlementState::Empty
    } else if debit_total == credit_total {
        SettlementState::Balanced
    } else if credit_total > debit_total {
        SettlementState::Surplus
    } else {
        SettlementState::Pending
    };

    Settlement {
        state,
        debit_total,
        credit_total,
        delta: debit_total.abs_diff(credit_total).min(i64::MAX as u64) as i64,
        compensable_amount: debit_total.min(credit_total),
    }
}

impl Settlement {
    /// Submit is disabled only while one side is empty.
    pub fn can_submit(&self) -> bool {
        self.state != SettlementState::Empty
    }

    /// A dispute can be filed for the uncovered part of a pending settlement.
    pub fn offers_dispute(&self) -> bool {
        self.state == SettlementState::Pending
    }

    pub fn alert(&self) -> Option<SettlementAlert> {
        match self.state {
            SettlementState::Empty => None,
            SettlementState::Balanced => Some(SettlementAlert {
                severity: AlertSeverity::Success,
                message: format!(
                    "Selection balances exactly: {} will be compensated",
                    format_amount(self.compensable_amount)
                ),
            }),
            SettlementState::Surplus => Some(SettlementAlert {
                severity: AlertSeverity::Warning,
                message: format!(
                    "Credit balance of {} remains in the debtor's favor",
                    format_amount(self.delta)
                ),
            }),
            SettlementState::Pending => Some(SettlementAlert {
                severity: AlertSeverity::Warning,
                message: format!(
                    "Pending balance of {} remains owed; consider filing a dispute",
                    format_amount(self.delta)
                ),
            }),
        }
    }
}

/// Peso formatting: `$1.250.000`, negative as `-$500`.
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
