use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Balance
// ---------------------------------------------------------------------------

/// Outstanding amount as it arrives from the backend.
///
/// The API is inconsistent: some endpoints send numbers, others send
/// decimal strings, and a few omit the field or send `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Balance {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl From<i64> for Balance {
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<i32> for Balance {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for Balance {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Whole currency units (CLP has no minor unit) for a balance.
///
/// Never fails: unparsable, missing, or non-finite values count as zero.
/// Fractional values are rounded half away from zero.
pub fn parse_balance(balance: &Balance) -> i64 {
    let raw = match balance {
        Balance::Number(n) => *n,
        Balance::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Balance::Missing => 0.0,
    };
    if !raw.is_finite() {
        return 0;
    }
    // `as` saturates on overflow
    raw.round() as i64
}

// ---------------------------------------------------------------------------
// Document type
// ---------------------------------------------------------------------------

/// Display-only discriminator for a document (DTE kind or payment kind).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Invoice,
    CreditNote,
    DebitNote,
    Payment,
    #[serde(untagged)]
    Other(String),
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invoice => write!(f, "INVOICE"),
            Self::CreditNote => write!(f, "CREDIT_NOTE"),
            Self::DebitNote => write!(f, "DEBIT_NOTE"),
            Self::Payment => write!(f, "PAYMENT"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Selectable document
// ---------------------------------------------------------------------------

/// An invoice or credit document that can be picked for netting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectableDocument {
    pub id: String,
    #[serde(default)]
    pub balance: Balance,
    pub debtor_id: String,
    pub document_type: DocumentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl SelectableDocument {
    pub fn new(
        id: impl Into<String>,
        balance: impl Into<Balance>,
        debtor_id: impl Into<String>,
        document_type: DocumentType,
    ) -> Self {
        Self {
            id: id.into(),
            balance: balance.into(),
            debtor_id: debtor_id.into(),
            document_type,
            due_date: None,
        }
    }

    /// Balance in whole currency units, see [`parse_balance`].
    pub fn amount(&self) -> i64 {
        parse_balance(&self.balance)
    }
}
