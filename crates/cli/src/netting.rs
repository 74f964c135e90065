//! `collecta netting preview|submit|dispute`
//!
//! Each run builds a one-shot reconciliation session: fetch the debtor's
//! lists, apply the selection flags, then classify / submit / dispute.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde_json::json;

use collecta_netting::{
    format_amount, AlertSeverity, CompensationOutcome, CompensationSubmitter, DocumentCache,
    ListKind, NettingError, ReconciliationGateway, ReconciliationSession, SelectableDocument,
    Settlement, SettlementState, Side,
};

use crate::context::{connect, Context};
use crate::documents::{document_json, render_table};
use crate::exit_codes::*;
use crate::notify::StderrNotifier;
use crate::CliError;

#[derive(Subcommand)]
pub enum NettingCommands {
    /// Show totals and the settlement state for a selection
    #[command(after_help = "\
Examples:
  collecta netting preview 76.123.456-7 --invoice dte-33-10451 --all-payments
  collecta netting preview 76.123.456-7 --all-invoices --all-payments --json")]
    Preview {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Record the compensation with the backend
    #[command(after_help = "\
Examples:
  collecta netting submit 76.123.456-7 --invoice dte-33-10451 --payment mov-88120

Exit codes:
  0   compensation recorded
  20  one side of the selection is empty
  21  server rejected the compensation
  22  request did not complete")]
    Submit {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// File a dispute for the pending balance of a selection
    #[command(after_help = "\
Examples:
  collecta netting dispute 76.123.456-7 --all-invoices --payment mov-88120 \\
      --reason \"Pago parcial sin respaldo\"

Exit codes:
  0   dispute filed
  21  server rejected the dispute
  23  selection leaves no pending balance")]
    Dispute {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Dispute reason (defaults to settings netting.default_dispute_reason)
        #[arg(long)]
        reason: Option<String>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct SelectionArgs {
    /// Debtor id
    pub debtor: String,

    /// Invoice id to select (repeatable)
    #[arg(long = "invoice", value_name = "ID")]
    pub invoices: Vec<String>,

    /// Payment or credit note id to select (repeatable)
    #[arg(long = "payment", value_name = "ID")]
    pub payments: Vec<String>,

    /// Select every outstanding invoice
    #[arg(long, conflicts_with = "invoices")]
    pub all_invoices: bool,

    /// Select every payment and credit note
    #[arg(long, conflicts_with = "payments")]
    pub all_payments: bool,
}

pub fn cmd_netting(cmd: NettingCommands) -> Result<(), CliError> {
    match cmd {
        NettingCommands::Preview { selection, json } => cmd_preview(selection, json),
        NettingCommands::Submit { selection, json } => cmd_submit(selection, json),
        NettingCommands::Dispute { selection, reason, json } => cmd_dispute(selection, reason, json),
    }
}

// ── Session setup ──────────────────────────────────────────────────

struct Lists {
    invoices: Vec<SelectableDocument>,
    payments: Vec<SelectableDocument>,
}

fn fetch_lists(ctx: &Context, cache: &DocumentCache, debtor: &str) -> Result<Lists, CliError> {
    let invoices = cache
        .get_or_fetch(&*ctx.client, debtor, ListKind::Invoices)
        .map_err(CliError::gateway)?;
    let payments = cache
        .get_or_fetch(&*ctx.client, debtor, ListKind::Payments)
        .map_err(CliError::gateway)?;
    Ok(Lists { invoices, payments })
}

/// Apply the selection flags to a fresh session. Unknown ids are a usage error.
fn build_session(args: &SelectionArgs, lists: &Lists) -> Result<ReconciliationSession, CliError> {
    let mut session = ReconciliationSession::new(args.debtor.clone());
    apply_side(&mut session, Side::Invoices, args.all_invoices, &args.invoices, &lists.invoices)?;
    apply_side(&mut session, Side::Payments, args.all_payments, &args.payments, &lists.payments)?;
    Ok(session)
}

fn apply_side(
    session: &mut ReconciliationSession,
    side: Side,
    all: bool,
    ids: &[String],
    available: &[SelectableDocument],
) -> Result<(), CliError> {
    if all {
        session.select_all(side, available.iter().cloned());
        return Ok(());
    }
    for id in ids {
        if session.selection().is_selected(side, id) {
            continue;
        }
        let doc = available.iter().find(|d| &d.id == id).ok_or_else(|| {
            CliError::usage(format!("unknown {} id '{}' for debtor {}", side_noun(side), id, session.debtor_id()))
                .with_hint(format!("list them with `collecta {} {}`", side, session.debtor_id()))
        })?;
        session.toggle(side, doc.clone());
    }
    Ok(())
}

fn side_noun(side: Side) -> &'static str {
    match side {
        Side::Invoices => "invoice",
        Side::Payments => "payment",
    }
}

fn open(args: &SelectionArgs) -> Result<(Context, Arc<DocumentCache>, ReconciliationSession), CliError> {
    if args.debtor.trim().is_empty() {
        return Err(CliError::usage("debtor id must not be empty"));
    }
    let ctx = connect()?;
    let cache = Arc::new(DocumentCache::new());
    let lists = fetch_lists(&ctx, &cache, &args.debtor)?;
    let session = build_session(args, &lists)?;
    Ok((ctx, cache, session))
}

// ── Output ─────────────────────────────────────────────────────────

fn session_json(session: &ReconciliationSession) -> serde_json::Value {
    let settlement = session.settlement();
    json!({
        "debtor_id": session.debtor_id(),
        "invoices": session.selection().invoices().iter().map(document_json).collect::<Vec<_>>(),
        "payments": session.selection().payments().iter().map(document_json).collect::<Vec<_>>(),
        "settlement": settlement,
        "alert": settlement.alert(),
    })
}

fn print_settlement(settlement: &Settlement) {
    eprintln!("  Debit:       {}", format_amount(settlement.debit_total));
    eprintln!("  Credit:      {}", format_amount(settlement.credit_total));
    eprintln!("  Compensable: {}", format_amount(settlement.compensable_amount));
    eprintln!("  State:       {}", settlement.state);
    if let Some(alert) = settlement.alert() {
        let label = match alert.severity {
            AlertSeverity::Success => "ok",
            AlertSeverity::Warning => "warning",
        };
        eprintln!();
        eprintln!("{}: {}", label, alert.message);
    }
}

fn print_session(session: &ReconciliationSession) {
    let selection = session.selection();
    eprintln!("Debtor {}", session.debtor_id());
    eprintln!();
    eprintln!("Invoices ({})", selection.invoices().len());
    if !selection.invoices().is_empty() {
        let docs: Vec<_> = selection.invoices().iter().cloned().collect();
        eprint!("{}", render_table(&docs));
    }
    eprintln!();
    eprintln!("Payments ({})", selection.payments().len());
    if !selection.payments().is_empty() {
        let docs: Vec<_> = selection.payments().iter().cloned().collect();
        eprint!("{}", render_table(&docs));
    }
    eprintln!();
    print_settlement(&session.settlement());
}

fn emit_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// ── Preview ────────────────────────────────────────────────────────

fn cmd_preview(args: SelectionArgs, json_output: bool) -> Result<(), CliError> {
    let (_ctx, _cache, session) = open(&args)?;
    if json_output {
        emit_json(&session_json(&session));
    } else {
        print_session(&session);
    }
    Ok(())
}

// ── Submit ─────────────────────────────────────────────────────────

fn selection_error(err: NettingError) -> CliError {
    match err {
        NettingError::Gateway(e) => CliError::gateway(e),
        NettingError::NoPendingBalance => CliError::new(EXIT_NETTING_NOT_PENDING, err.to_string()),
        NettingError::MissingDebtor => CliError::new(EXIT_NETTING_EMPTY, err.to_string())
            .with_hint("the selected payments carry no debtor id; check the payments list from the API"),
        _ => CliError::new(EXIT_NETTING_EMPTY, err.to_string())
            .with_hint("select at least one invoice and one payment with a non-zero balance"),
    }
}

fn cmd_submit(args: SelectionArgs, json_output: bool) -> Result<(), CliError> {
    let (ctx, cache, mut session) = open(&args)?;
    let preview = session.settlement();

    if !json_output {
        print_session(&session);
        eprintln!();
    }

    let gateway: Arc<dyn ReconciliationGateway + Send + Sync> = ctx.client.clone();
    let submitter = CompensationSubmitter::new(gateway, cache.clone(), Arc::new(StderrNotifier));
    let outcome = submitter.submit(&mut session).map_err(selection_error)?;

    if json_output {
        let (status, message) = match &outcome {
            CompensationOutcome::Accepted { message } => ("accepted", message.clone()),
            CompensationOutcome::Rejected { message } => ("rejected", message.clone()),
            CompensationOutcome::Failed(e) => ("failed", e.to_string()),
        };
        emit_json(&json!({
            "debtor_id": args.debtor,
            "status": status,
            "message": message,
            "settlement": preview,
        }));
    } else if outcome.is_success() {
        print_remaining(&ctx, &cache, &args.debtor);
    }

    // The notifier has already reported the failure.
    match outcome {
        CompensationOutcome::Accepted { .. } => Ok(()),
        CompensationOutcome::Rejected { .. } => Err(CliError::silent(EXIT_NETTING_REJECTED)),
        CompensationOutcome::Failed(_) => Err(CliError::silent(EXIT_NETTING_FAILED)),
    }
}

/// Re-read the debtor's lists after a submit; the cache was invalidated.
fn print_remaining(ctx: &Context, cache: &DocumentCache, debtor: &str) {
    match fetch_lists(ctx, cache, debtor) {
        Ok(lists) => {
            let sum = |docs: &[SelectableDocument]| {
                docs.iter().fold(0i64, |acc, d| acc.saturating_add(d.amount()))
            };
            eprintln!(
                "Remaining: {} invoice(s) {}, {} payment(s) {}",
                lists.invoices.len(),
                format_amount(sum(&lists.invoices)),
                lists.payments.len(),
                format_amount(sum(&lists.payments)),
            );
        }
        Err(e) => log::warn!("could not refresh balances for {debtor}: {}", e.message),
    }
}

// ── Dispute ────────────────────────────────────────────────────────

fn cmd_dispute(args: SelectionArgs, reason: Option<String>, json_output: bool) -> Result<(), CliError> {
    let (ctx, _cache, session) = open(&args)?;
    let settlement = session.settlement();

    let reason = reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| ctx.settings.netting.default_dispute_reason.clone());

    let req = session.dispute_request(reason).map_err(|e| {
        let err = selection_error(e);
        if settlement.state == SettlementState::Empty {
            err
        } else {
            err.with_hint(format!("selection is {}; only a pending balance can be disputed", settlement.state))
        }
    })?;

    if !json_output {
        print_session(&session);
        eprintln!();
        eprintln!("Filing dispute for {}", format_amount(req.amount));
    }

    log::info!("filing dispute for debtor {} amount {}", req.debtor_id, req.amount);
    let reply = ctx.client.create_litigation(&req).map_err(CliError::client)?;

    if json_output {
        let status = if reply.success { "filed" } else { "rejected" };
        emit_json(&json!({
            "debtor_id": req.debtor_id,
            "status": status,
            "message": reply.message,
            "amount": req.amount,
            "reason": req.reason,
        }));
    }

    if !reply.success {
        let message = if reply.message.is_empty() {
            "Dispute was rejected by the server".to_string()
        } else {
            reply.message
        };
        return Err(CliError::new(EXIT_NETTING_REJECTED, message));
    }

    if !json_output {
        if reply.message.is_empty() {
            eprintln!("ok: dispute filed");
        } else {
            eprintln!("ok: {}", reply.message);
        }
    }
    Ok(())
}
