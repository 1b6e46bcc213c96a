//! CLI commands

use fides_authz::PaymentGate;
use fides_ledger::{ChainIntegrity, NewDecision, NewRevocation, Payment, Record};

use crate::context::AppContext;

/// Create a decision record
pub fn decide(ctx: &AppContext, input: NewDecision) -> Result<Record, anyhow::Error> {
    let record = ctx.gate.create_decision(input)?;

    println!(
        "✅ {} recorded: {}",
        record.record_type(),
        record.decision_id().unwrap_or_default()
    );
    Ok(record)
}

/// Revoke a decision
pub fn revoke(ctx: &AppContext, input: NewRevocation) -> Result<Record, anyhow::Error> {
    let record = ctx.gate.create_revocation(input)?;

    println!(
        "✅ Decision revoked: {}",
        record.target_decision_id().unwrap_or_default()
    );
    Ok(record)
}

/// Authorize and, if allowed, record a payment.
///
/// Prints only AUTHORIZED or BLOCKED; the reason goes to the audit trail.
pub fn pay(
    ctx: &AppContext,
    payment_id: Option<&str>,
    payment: &Payment,
) -> Result<bool, anyhow::Error> {
    let recorded = match payment_id {
        Some(id) => ctx.gate.authorize_and_record_with_id(id, payment)?,
        None => ctx.gate.authorize_and_record(payment)?,
    };

    let authorized = recorded.is_some();
    println!("{}", verdict(authorized));
    Ok(authorized)
}

/// Decide a payment without recording it
pub fn check(ctx: &AppContext, payment: &Payment) -> bool {
    let authorized = ctx.gate.check(payment);
    println!("{}", verdict(authorized));
    authorized
}

/// Verify the hash chain
pub fn audit(ctx: &AppContext) -> Result<ChainIntegrity, anyhow::Error> {
    let integrity = ctx.gate.verify_chain_integrity()?;
    let records = ctx.record_count()?;

    match integrity.first_invalid_index {
        None => println!("✅ Hash chain verified ({} records)", records),
        Some(index) => println!("❌ Hash chain broken at index {}", index),
    }
    Ok(integrity)
}

fn verdict(authorized: bool) -> &'static str {
    if authorized {
        "AUTHORIZED"
    } else {
        "BLOCKED"
    }
}

/// Outcome of the demo scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoReport {
    /// AUTHORIZED/BLOCKED for each payment attempt, in order
    pub attempts: Vec<bool>,
    pub integrity: ChainIntegrity,
    pub records: usize,
}

/// In-memory end-to-end scenario: decide, pay, overspend, revoke, pay
pub fn demo() -> Result<DemoReport, anyhow::Error> {
    let gate = PaymentGate::in_memory();
    let mut attempts = Vec::new();

    println!();
    print!("[1] Creating Decision Record... ");
    let record = gate.create_decision(NewDecision {
        authority_id: "GOV-DEMO-001".to_string(),
        deciders_id: vec!["DECIDER-001".to_string(), "DECIDER-002".to_string()],
        act_type: "contract".to_string(),
        currency: "BRL".to_string(),
        maximum_value: "100000.00".to_string(),
        beneficiary: "SUPPLIER-ABC-123".to_string(),
        legal_basis: "Lei 14.133/2021 Art. 75".to_string(),
        decision_date: "2024-01-15T10:00:00Z".to_string(),
        signatures: vec!["SIG-001".to_string(), "SIG-002".to_string()],
        record_timestamp: Some("2024-01-15T10:30:00Z".to_string()),
        ..Default::default()
    })?;
    let decision_id = record.decision_id().unwrap_or_default().to_string();
    println!("OK");

    let payment = |value: &str, date: &str| {
        Payment::new(decision_id.as_str(), "SUPPLIER-ABC-123", "BRL", value, date)
    };

    print!("[2] Attempting authorized payment... ");
    let first = gate.authorize_and_record_with_id(
        "PAY-001",
        &payment("50000.00", "2024-02-01T14:00:00Z"),
    )?;
    attempts.push(first.is_some());
    println!("{}", verdict(first.is_some()));

    print!("[3] Attempting payment exceeding limit... ");
    let second = gate.check(&payment("60000.00", "2024-02-15T14:00:00Z"));
    attempts.push(second);
    println!("{}", verdict(second));

    gate.create_revocation(NewRevocation {
        target_decision_id: decision_id.clone(),
        authority_id: "GOV-DEMO-001".to_string(),
        deciders_id: vec!["DECIDER-001".to_string(), "DECIDER-002".to_string()],
        revocation_reason: "Contract cancelled by mutual agreement".to_string(),
        signatures: vec!["SIG-001".to_string(), "SIG-002".to_string()],
        record_timestamp: Some("2024-03-01T09:00:00Z".to_string()),
        ..Default::default()
    })?;

    print!("[4] Attempting payment after revocation... ");
    let third = gate.check(&payment("10000.00", "2024-03-05T14:00:00Z"));
    attempts.push(third);
    println!("{}", verdict(third));

    println!();
    println!("Fides: No record, no payment.");
    println!();

    let integrity = gate.verify_chain_integrity()?;
    let records = gate.with_ledger(|ledger| ledger.len())??;
    match integrity.first_invalid_index {
        None => println!("Chain integrity: VALID ({} records)", records),
        Some(index) => println!("Chain integrity: BROKEN at index {}", index),
    }

    Ok(DemoReport {
        attempts,
        integrity,
        records,
    })
}
