//! CLI Exit Code Registry
//!
//! Single source of truth for every `collecta` exit code.
//! Scripts that drive the netting workflow branch on these values.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                                   |
//! |---------|-----------|-----------------------------------------------|
//! | 0       | Universal | Success                                       |
//! | 1       | Universal | General error (unspecified)                   |
//! | 2       | Universal | Usage error (bad args, unknown document id)   |
//! | 10-19   | backend   | Auth, transport, and settings failures        |
//! | 20-29   | netting   | Compensation and dispute outcomes             |

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, ids not present in the debtor's lists.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Backend (10-19)
// =============================================================================

/// No token saved and `COLLECTA_TOKEN` unset, or token rejected (401/403).
pub const EXIT_NOT_AUTH: u8 = 10;

/// Backend unreachable (connect error, timeout, reset).
pub const EXIT_NETWORK: u8 = 11;

/// Backend answered with an error status or an unreadable body.
pub const EXIT_UPSTREAM: u8 = 12;

/// Settings file or `COLLECTA_*` override is invalid.
pub const EXIT_CONFIG: u8 = 13;

// =============================================================================
// Netting (20-29)
// =============================================================================

/// Selection has nothing to compensate (a side is empty or totals zero).
pub const EXIT_NETTING_EMPTY: u8 = 20;

/// Backend refused the compensation or dispute (`success: false`).
pub const EXIT_NETTING_REJECTED: u8 = 21;

/// Compensation call did not complete. Selection was still discarded.
pub const EXIT_NETTING_FAILED: u8 = 22;

/// Dispute requested but the settlement is not pending.
pub const EXIT_NETTING_NOT_PENDING: u8 = 23;
