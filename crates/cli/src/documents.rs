//! `collecta invoices` / `collecta payments`: list a debtor's open documents.

use collecta_netting::{format_amount, DocumentSource, ListKind, SelectableDocument};
use serde_json::json;

use crate::context::connect;
use crate::CliError;

pub fn cmd_list(debtor: &str, kind: ListKind, json_output: bool) -> Result<(), CliError> {
    if debtor.trim().is_empty() {
        return Err(CliError::usage("debtor id must not be empty"));
    }

    let ctx = connect()?;
    let docs = ctx.client.list(debtor, kind).map_err(CliError::gateway)?;
    let total = docs.iter().fold(0i64, |acc, d| acc.saturating_add(d.amount()));

    if json_output {
        let out = json!({
            "debtor_id": debtor,
            "kind": kind.to_string(),
            "documents": docs.iter().map(document_json).collect::<Vec<_>>(),
            "total": total,
        });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        return Ok(());
    }

    if docs.is_empty() {
        eprintln!("No {} for debtor {}", kind, debtor);
        return Ok(());
    }

    print!("{}", render_table(&docs));
    println!();
    println!("{} {}, total {}", docs.len(), kind, format_amount(total));
    Ok(())
}

/// JSON row shared with `netting preview --json`.
pub fn document_json(doc: &SelectableDocument) -> serde_json::Value {
    json!({
        "id": doc.id,
        "type": doc.document_type.to_string(),
        "amount": doc.amount(),
        "due_date": doc.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
    })
}

pub fn render_table(docs: &[SelectableDocument]) -> String {
    use std::fmt::Write;

    let id_width = docs.iter().map(|d| d.id.len()).max().unwrap_or(2).max(2);
    let type_width = docs
        .iter()
        .map(|d| d.document_type.to_string().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<id_w$}  {:<ty_w$}  {:<10}  {:>15}",
        "ID", "TYPE", "DUE", "BALANCE",
        id_w = id_width,
        ty_w = type_width,
    );
    for doc in docs {
        let due = doc
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<id_w$}  {:<ty_w$}  {:<10}  {:>15}",
            doc.id,
            doc.document_type.to_string(),
            due,
            format_amount(doc.amount()),
            id_w = id_width,
            ty_w = type_width,
        );
    }
    out
}
