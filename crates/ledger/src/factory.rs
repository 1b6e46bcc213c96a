//! Record factory - builds, validates and appends records
//!
//! Each operation derives the missing identifiers and timestamps, computes
//! the chain link from the ledger's current tail, validates the assembled
//! record (reporting every violated rule) and appends it. The append
//! re-checks the link; a mismatch there means the tail moved between the
//! two steps.

use crate::error::{LedgerResult, LookupError};
use crate::hash::compute_previous_hash;
use crate::ledger::Ledger;
use crate::record::{DecisionRecord, Record, RevocationRecord};
use crate::store::RecordStore;
use crate::validation::validate;
use fides_core::{new_uuid_v4, now_timestamp};

/// Input for a new Decision Record.
///
/// `decision_id` and `record_timestamp` are generated when absent. Setting
/// `maximum_term` produces a term-limited decision (SDR).
#[derive(Debug, Clone, Default)]
pub struct NewDecision {
    pub authority_id: String,
    pub deciders_id: Vec<String>,
    pub act_type: String,
    pub currency: String,
    pub maximum_value: String,
    pub beneficiary: String,
    pub legal_basis: String,
    pub decision_date: String,
    pub signatures: Vec<String>,
    pub decision_id: Option<String>,
    pub record_timestamp: Option<String>,
    pub maximum_term: Option<String>,
}

/// Input for a new Revocation Record.
///
/// `revocation_date` defaults to the record timestamp.
#[derive(Debug, Clone, Default)]
pub struct NewRevocation {
    pub target_decision_id: String,
    pub authority_id: String,
    pub deciders_id: Vec<String>,
    pub revocation_reason: String,
    pub signatures: Vec<String>,
    pub revocation_id: Option<String>,
    pub revocation_date: Option<String>,
    pub record_timestamp: Option<String>,
}

/// Create a DR (or SDR) and append it to the ledger
pub fn create_decision_record<S: RecordStore>(
    ledger: &mut Ledger<S>,
    new: NewDecision,
) -> LedgerResult<Record> {
    let decision_id = new.decision_id.unwrap_or_else(new_uuid_v4);
    let record_timestamp = new.record_timestamp.unwrap_or_else(now_timestamp);

    let previous_record_hash = compute_previous_hash(
        &new.authority_id,
        &record_timestamp,
        ledger.last_record()?.as_ref(),
    );

    let body = DecisionRecord {
        decision_id,
        authority_id: new.authority_id,
        deciders_id: new.deciders_id,
        act_type: new.act_type,
        currency: new.currency,
        maximum_value: new.maximum_value,
        beneficiary: new.beneficiary,
        legal_basis: new.legal_basis,
        decision_date: new.decision_date,
        previous_record_hash,
        record_timestamp,
        signatures: new.signatures,
        maximum_term: new.maximum_term,
    };

    let record = if body.maximum_term.is_some() {
        Record::TermLimitedDecision(body)
    } else {
        Record::Decision(body)
    };

    validate(&record).into_result(record.record_type())?;
    ledger.append(record.clone())?;

    tracing::info!(
        decision_id = record.decision_id().unwrap_or_default(),
        record_type = %record.record_type(),
        "Decision record created"
    );

    Ok(record)
}

/// Create an RR for an existing, unrevoked decision and append it
pub fn create_revocation_record<S: RecordStore>(
    ledger: &mut Ledger<S>,
    new: NewRevocation,
) -> LedgerResult<Record> {
    if ledger.find_decision(&new.target_decision_id)?.is_none() {
        return Err(LookupError::TargetNotFound(new.target_decision_id).into());
    }

    // No double revocation
    if ledger.is_revoked(&new.target_decision_id)? {
        return Err(LookupError::AlreadyRevoked(new.target_decision_id).into());
    }

    let revocation_id = new.revocation_id.unwrap_or_else(new_uuid_v4);
    let record_timestamp = new.record_timestamp.unwrap_or_else(now_timestamp);
    let revocation_date = new
        .revocation_date
        .unwrap_or_else(|| record_timestamp.clone());

    let previous_record_hash = compute_previous_hash(
        &new.authority_id,
        &record_timestamp,
        ledger.last_record()?.as_ref(),
    );

    let record = Record::Revocation(RevocationRecord {
        revocation_id,
        target_decision_id: new.target_decision_id,
        authority_id: new.authority_id,
        deciders_id: new.deciders_id,
        revocation_reason: new.revocation_reason,
        revocation_date,
        previous_record_hash,
        record_timestamp,
        signatures: new.signatures,
    });

    validate(&record).into_result(record.record_type())?;
    ledger.append(record.clone())?;

    tracing::info!(
        target_decision_id = record.target_decision_id().unwrap_or_default(),
        "Revocation record created"
    );

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::hash::{genesis_hash, record_hash};
    use crate::validation::ValidationCode;

    fn decision_input() -> NewDecision {
        NewDecision {
            authority_id: "GOV-TEST-001".to_string(),
            deciders_id: vec!["DECIDER-001".to_string()],
            act_type: "contract".to_string(),
            currency: "BRL".to_string(),
            maximum_value: "10000.00".to_string(),
            beneficiary: "SUPPLIER-TEST".to_string(),
            legal_basis: "Test Law".to_string(),
            decision_date: "2024-01-01T10:00:00Z".to_string(),
            signatures: vec!["SIG-001".to_string()],
            record_timestamp: Some("2024-01-01T10:30:00Z".to_string()),
            ..Default::default()
        }
    }

    fn revocation_input(target: &str) -> NewRevocation {
        NewRevocation {
            target_decision_id: target.to_string(),
            authority_id: "GOV-TEST-001".to_string(),
            deciders_id: vec!["DECIDER-001".to_string()],
            revocation_reason: "Contract cancelled".to_string(),
            signatures: vec!["SIG-001".to_string()],
            record_timestamp: Some("2024-02-01T09:00:00Z".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_decision_uses_genesis() {
        let mut ledger = Ledger::in_memory();
        let record = create_decision_record(&mut ledger, decision_input()).unwrap();

        assert_eq!(
            record.previous_record_hash(),
            genesis_hash("GOV-TEST-001", "2024-01-01T10:30:00Z")
        );
        assert!(fides_core::is_uuid_v4(record.decision_id().unwrap()));
        assert_eq!(record.record_type(), crate::RecordType::Decision);
    }

    #[test]
    fn test_defaults_record_timestamp() {
        let mut ledger = Ledger::in_memory();
        let mut input = decision_input();
        input.record_timestamp = None;

        let record = create_decision_record(&mut ledger, input).unwrap();
        assert!(fides_core::is_timestamp(record.record_timestamp()));
    }

    #[test]
    fn test_second_record_links_to_first() {
        let mut ledger = Ledger::in_memory();
        let first = create_decision_record(&mut ledger, decision_input()).unwrap();
        let second = create_decision_record(&mut ledger, decision_input()).unwrap();

        assert_eq!(second.previous_record_hash(), record_hash(&first));
        assert!(ledger.verify_chain_integrity().unwrap().is_valid());
    }

    #[test]
    fn test_maximum_term_makes_sdr() {
        let mut ledger = Ledger::in_memory();
        let mut input = decision_input();
        input.maximum_term = Some("2024-06-30T23:59:59Z".to_string());

        let record = create_decision_record(&mut ledger, input).unwrap();
        assert!(record.is_term_limited());
    }

    #[test]
    fn test_validation_reports_every_error() {
        let mut ledger = Ledger::in_memory();
        let mut input = decision_input();
        input.decision_id = Some("not-a-uuid".to_string());
        input.maximum_value = "0".to_string();
        input.signatures.push("SIG-002".to_string());

        let err = create_decision_record(&mut ledger, input).unwrap_err();
        match err {
            LedgerError::Validation(validation) => assert_eq!(
                validation.errors,
                vec![
                    ValidationCode::InvalidDecisionId,
                    ValidationCode::InvalidMaximumValue,
                    ValidationCode::DecidersSignaturesMismatch,
                ]
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(ledger.is_empty().unwrap());
    }

    #[test]
    fn test_revocation_defaults_date() {
        let mut ledger = Ledger::in_memory();
        let decision = create_decision_record(&mut ledger, decision_input()).unwrap();
        let target = decision.decision_id().unwrap();

        let record = create_revocation_record(&mut ledger, revocation_input(target)).unwrap();
        let rr = record.as_revocation().unwrap();
        assert_eq!(rr.revocation_date, "2024-02-01T09:00:00Z");
        assert_eq!(rr.previous_record_hash, record_hash(&decision));
        assert!(ledger.is_revoked(target).unwrap());
    }

    #[test]
    fn test_revocation_requires_target() {
        let mut ledger = Ledger::in_memory();
        let err = create_revocation_record(
            &mut ledger,
            revocation_input("00000000-0000-4000-8000-000000000000"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Lookup(LookupError::TargetNotFound(_))
        ));
    }

    #[test]
    fn test_no_double_revocation() {
        let mut ledger = Ledger::in_memory();
        let decision = create_decision_record(&mut ledger, decision_input()).unwrap();
        let target = decision.decision_id().unwrap();
        create_revocation_record(&mut ledger, revocation_input(target)).unwrap();

        let err = create_revocation_record(&mut ledger, revocation_input(target)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Lookup(LookupError::AlreadyRevoked(_))
        ));
        assert_eq!(ledger.len().unwrap(), 2);
    }

    #[test]
    fn test_mixed_chain_verifies() {
        let mut ledger = Ledger::in_memory();
        let dr1 = create_decision_record(&mut ledger, decision_input()).unwrap();
        create_decision_record(&mut ledger, decision_input()).unwrap();
        create_revocation_record(&mut ledger, revocation_input(dr1.decision_id().unwrap()))
            .unwrap();

        let integrity = ledger.verify_chain_integrity().unwrap();
        assert!(integrity.is_valid());
        assert_eq!(integrity.first_invalid_index, None);
        assert_eq!(ledger.records().unwrap().len(), 3);
    }
}
