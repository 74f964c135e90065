//! Golden schema tests for the mutation wire contract.
//!
//! The backend parses these bodies. If a field is added, removed, or renamed,
//! these tests fail and the golden files have to be updated on purpose.

use collecta_netting::{CompensationRequest, DisputeRequest, ServerReply};

fn golden(path: &str) -> serde_json::Value {
    serde_json::from_str(
        &std::fs::read_to_string(path).unwrap_or_else(|e| panic!("Cannot read {}: {}", path, e)),
    )
    .unwrap_or_else(|e| panic!("Cannot parse {}: {}", path, e))
}

/// Every golden key must be present in the serialized value, and nothing else.
fn assert_same_keys(golden_path: &str, serialized: &serde_json::Value) {
    let golden = golden(golden_path);
    let golden_obj = golden.as_object().expect("golden file should be an object");
    let serial_obj = serialized.as_object().expect("should serialize as object");

    for key in golden_obj.keys() {
        assert!(
            serial_obj.contains_key(key),
            "Golden key '{}' missing from serialization (file: {})",
            key,
            golden_path,
        );
    }
    for key in serial_obj.keys() {
        assert!(
            golden_obj.contains_key(key),
            "Serialized key '{}' not in golden file {}",
            key,
            golden_path,
        );
    }
}

#[test]
fn test_golden_reconciliation_request() {
    let req = CompensationRequest {
        debtor_id: "76.123.456-7".into(),
        invoices: vec!["dte-33-10451".into(), "dte-33-10452".into()],
        payments: vec!["mov-88120".into()],
    };
    let json = serde_json::to_value(&req).unwrap();
    assert_same_keys("tests/golden/reconciliation-request.json", &json);
    assert_eq!(json, golden("tests/golden/reconciliation-request.json"));
}

#[test]
fn test_golden_reconciliation_request_parses_back() {
    let req: CompensationRequest =
        serde_json::from_value(golden("tests/golden/reconciliation-request.json")).unwrap();
    assert_eq!(req.debtor_id, "76.123.456-7");
    assert_eq!(req.payments, vec!["mov-88120"]);
}

#[test]
fn test_golden_reconciliation_reply() {
    let reply: ServerReply =
        serde_json::from_value(golden("tests/golden/reconciliation-reply.json")).unwrap();
    assert!(reply.success);
    assert_eq!(reply.message, "Compensación registrada");
    assert_same_keys(
        "tests/golden/reconciliation-reply.json",
        &serde_json::to_value(&reply).unwrap(),
    );
}

#[test]
fn test_golden_litigation_request() {
    let req = DisputeRequest {
        debtor_id: "76.123.456-7".into(),
        invoices: vec!["dte-33-10451".into()],
        amount: 100000,
        reason: "Pago parcial sin respaldo".into(),
    };
    let json = serde_json::to_value(&req).unwrap();
    assert_same_keys("tests/golden/litigation-request.json", &json);
    assert!(json["amount"].is_i64(), "amount must be an integer, never a float");
}
