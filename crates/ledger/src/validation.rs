//! Record validation rules
//!
//! Rules run over the record's document form so the same checks apply to
//! freshly built records and to raw documents read back from storage or
//! imported from elsewhere. All violated rules are collected in a fixed
//! order; a missing required field stops the check early.

use crate::record::{Record, RecordType};
use fides_core::{is_timestamp, is_uuid_v4, parse_decimal, parse_timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use strum_macros::{AsRefStr, EnumString};
use thiserror::Error;

/// Record fields that can be reported missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RecordField {
    RecordType,
    DecisionId,
    RevocationId,
    TargetDecisionId,
    AuthorityId,
    DecidersId,
    ActType,
    Currency,
    MaximumValue,
    Beneficiary,
    LegalBasis,
    DecisionDate,
    RevocationReason,
    RevocationDate,
    PreviousRecordHash,
    RecordTimestamp,
    Signatures,
}

const DECISION_REQUIRED: &[RecordField] = &[
    RecordField::DecisionId,
    RecordField::AuthorityId,
    RecordField::DecidersId,
    RecordField::ActType,
    RecordField::Currency,
    RecordField::MaximumValue,
    RecordField::Beneficiary,
    RecordField::LegalBasis,
    RecordField::DecisionDate,
    RecordField::PreviousRecordHash,
    RecordField::RecordTimestamp,
    RecordField::Signatures,
];

const REVOCATION_REQUIRED: &[RecordField] = &[
    RecordField::RevocationId,
    RecordField::TargetDecisionId,
    RecordField::AuthorityId,
    RecordField::DecidersId,
    RecordField::RevocationReason,
    RecordField::RevocationDate,
    RecordField::PreviousRecordHash,
    RecordField::RecordTimestamp,
    RecordField::Signatures,
];

/// A violated validation rule.
///
/// Displayed (and serialized) as its SCREAMING_SNAKE_CASE code, e.g.
/// `MISSING_LEGAL_BASIS` or `DECIDERS_SIGNATURES_MISMATCH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ValidationCode {
    Missing(RecordField),
    UnknownRecordType,
    InvalidDecisionId,
    InvalidRevocationId,
    InvalidTargetDecisionId,
    InvalidDecidersId,
    InvalidActType,
    InvalidMaximumValue,
    InvalidDecisionDate,
    InvalidRevocationDate,
    InvalidRecordTimestamp,
    DecisionDateAfterRecordTimestamp,
    InvalidSignatures,
    DecidersSignaturesMismatch,
    InvalidMaximumTerm,
}

impl ValidationCode {
    pub fn code(&self) -> String {
        let fixed = match self {
            ValidationCode::Missing(field) => {
                return format!("MISSING_{}", field.as_ref().to_uppercase())
            }
            ValidationCode::UnknownRecordType => "UNKNOWN_RECORD_TYPE",
            ValidationCode::InvalidDecisionId => "INVALID_DECISION_ID",
            ValidationCode::InvalidRevocationId => "INVALID_REVOCATION_ID",
            ValidationCode::InvalidTargetDecisionId => "INVALID_TARGET_DECISION_ID",
            ValidationCode::InvalidDecidersId => "INVALID_DECIDERS_ID",
            ValidationCode::InvalidActType => "INVALID_ACT_TYPE",
            ValidationCode::InvalidMaximumValue => "INVALID_MAXIMUM_VALUE",
            ValidationCode::InvalidDecisionDate => "INVALID_DECISION_DATE",
            ValidationCode::InvalidRevocationDate => "INVALID_REVOCATION_DATE",
            ValidationCode::InvalidRecordTimestamp => "INVALID_RECORD_TIMESTAMP",
            ValidationCode::DecisionDateAfterRecordTimestamp => {
                "DECISION_DATE_AFTER_RECORD_TIMESTAMP"
            }
            ValidationCode::InvalidSignatures => "INVALID_SIGNATURES",
            ValidationCode::DecidersSignaturesMismatch => "DECIDERS_SIGNATURES_MISMATCH",
            ValidationCode::InvalidMaximumTerm => "INVALID_MAXIMUM_TERM",
        };
        fixed.to_string()
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl FromStr for ValidationCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(field) = s.strip_prefix("MISSING_") {
            return RecordField::from_str(&field.to_lowercase())
                .map(ValidationCode::Missing)
                .map_err(|_| format!("Unknown validation code: {s}"));
        }

        Ok(match s {
            "UNKNOWN_RECORD_TYPE" => ValidationCode::UnknownRecordType,
            "INVALID_DECISION_ID" => ValidationCode::InvalidDecisionId,
            "INVALID_REVOCATION_ID" => ValidationCode::InvalidRevocationId,
            "INVALID_TARGET_DECISION_ID" => ValidationCode::InvalidTargetDecisionId,
            "INVALID_DECIDERS_ID" => ValidationCode::InvalidDecidersId,
            "INVALID_ACT_TYPE" => ValidationCode::InvalidActType,
            "INVALID_MAXIMUM_VALUE" => ValidationCode::InvalidMaximumValue,
            "INVALID_DECISION_DATE" => ValidationCode::InvalidDecisionDate,
            "INVALID_REVOCATION_DATE" => ValidationCode::InvalidRevocationDate,
            "INVALID_RECORD_TIMESTAMP" => ValidationCode::InvalidRecordTimestamp,
            "DECISION_DATE_AFTER_RECORD_TIMESTAMP" => {
                ValidationCode::DecisionDateAfterRecordTimestamp
            }
            "INVALID_SIGNATURES" => ValidationCode::InvalidSignatures,
            "DECIDERS_SIGNATURES_MISMATCH" => ValidationCode::DecidersSignaturesMismatch,
            "INVALID_MAXIMUM_TERM" => ValidationCode::InvalidMaximumTerm,
            _ => return Err(format!("Unknown validation code: {s}")),
        })
    }
}

impl TryFrom<String> for ValidationCode {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ValidationCode> for String {
    fn from(code: ValidationCode) -> Self {
        code.code()
    }
}

/// Outcome of validating one record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationCode>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert into a `Result`, tagging the failure with the record type
    pub fn into_result(self, record_type: RecordType) -> Result<(), ValidationError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ValidationError {
                record_type,
                errors: self.errors,
            })
        }
    }
}

/// A record failed one or more validation rules.
///
/// Carries every violated rule so the caller can fix them in one pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {record_type} record: [{}]", join_codes(.errors))]
pub struct ValidationError {
    pub record_type: RecordType,
    pub errors: Vec<ValidationCode>,
}

fn join_codes(codes: &[ValidationCode]) -> String {
    codes
        .iter()
        .map(ValidationCode::code)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate a typed record
pub fn validate(record: &Record) -> ValidationReport {
    validate_document(&record.to_document())
}

/// Validate a raw record document, dispatching on `record_type`
pub fn validate_document(document: &Value) -> ValidationReport {
    match document.get("record_type") {
        None | Some(Value::Null) => ValidationReport {
            errors: vec![ValidationCode::Missing(RecordField::RecordType)],
        },
        Some(Value::String(kind)) => match kind.parse::<RecordType>() {
            Ok(RecordType::Decision) => validate_decision_document(document),
            Ok(RecordType::TermLimitedDecision) => {
                let mut report = validate_decision_document(document);
                if report.errors.iter().any(is_missing) {
                    return report;
                }
                if let Some(term) = present(document, "maximum_term") {
                    if !is_timestamp_value(term) {
                        report.errors.push(ValidationCode::InvalidMaximumTerm);
                    }
                }
                report
            }
            Ok(RecordType::Revocation) => validate_revocation_document(document),
            Err(_) => ValidationReport {
                errors: vec![ValidationCode::UnknownRecordType],
            },
        },
        Some(_) => ValidationReport {
            errors: vec![ValidationCode::UnknownRecordType],
        },
    }
}

/// DR rules
pub fn validate_decision_document(dr: &Value) -> ValidationReport {
    let missing = missing_fields(dr, DECISION_REQUIRED);
    if !missing.is_empty() {
        return ValidationReport { errors: missing };
    }

    let mut errors = Vec::new();

    if !is_uuid_value(&dr["decision_id"]) {
        errors.push(ValidationCode::InvalidDecisionId);
    }

    if !is_non_empty_list(&dr["deciders_id"]) {
        errors.push(ValidationCode::InvalidDecidersId);
    }

    if !dr["act_type"].as_str().is_some_and(|s| !s.is_empty()) {
        errors.push(ValidationCode::InvalidActType);
    }

    if !is_positive_decimal(&dr["maximum_value"]) {
        errors.push(ValidationCode::InvalidMaximumValue);
    }

    let decision_date = timestamp_of(&dr["decision_date"]);
    if decision_date.is_none() {
        errors.push(ValidationCode::InvalidDecisionDate);
    }

    let record_timestamp = timestamp_of(&dr["record_timestamp"]);
    if record_timestamp.is_none() {
        errors.push(ValidationCode::InvalidRecordTimestamp);
    }

    // Temporal constraint: decision_date <= record_timestamp
    if let (Some(decided), Some(recorded)) = (decision_date, record_timestamp) {
        if decided > recorded {
            errors.push(ValidationCode::DecisionDateAfterRecordTimestamp);
        }
    }

    if !is_non_empty_list(&dr["signatures"]) {
        errors.push(ValidationCode::InvalidSignatures);
    }

    // Binding rule: one signature per decider
    if let (Some(deciders), Some(signatures)) =
        (dr["deciders_id"].as_array(), dr["signatures"].as_array())
    {
        if deciders.len() != signatures.len() {
            errors.push(ValidationCode::DecidersSignaturesMismatch);
        }
    }

    ValidationReport { errors }
}

/// RR rules
pub fn validate_revocation_document(rr: &Value) -> ValidationReport {
    let missing = missing_fields(rr, REVOCATION_REQUIRED);
    if !missing.is_empty() {
        return ValidationReport { errors: missing };
    }

    let mut errors = Vec::new();

    if !is_uuid_value(&rr["revocation_id"]) {
        errors.push(ValidationCode::InvalidRevocationId);
    }

    if !is_uuid_value(&rr["target_decision_id"]) {
        errors.push(ValidationCode::InvalidTargetDecisionId);
    }

    if !is_non_empty_list(&rr["deciders_id"]) {
        errors.push(ValidationCode::InvalidDecidersId);
    }

    if !is_timestamp_value(&rr["revocation_date"]) {
        errors.push(ValidationCode::InvalidRevocationDate);
    }

    if !is_timestamp_value(&rr["record_timestamp"]) {
        errors.push(ValidationCode::InvalidRecordTimestamp);
    }

    if !is_non_empty_list(&rr["signatures"]) {
        errors.push(ValidationCode::InvalidSignatures);
    }

    ValidationReport { errors }
}

fn present<'a>(document: &'a Value, key: &str) -> Option<&'a Value> {
    document.get(key).filter(|value| !value.is_null())
}

fn missing_fields(document: &Value, required: &[RecordField]) -> Vec<ValidationCode> {
    required
        .iter()
        .filter(|field| present(document, field.as_ref()).is_none())
        .map(|field| ValidationCode::Missing(*field))
        .collect()
}

fn is_missing(code: &ValidationCode) -> bool {
    matches!(code, ValidationCode::Missing(_))
}

fn is_uuid_value(value: &Value) -> bool {
    value.as_str().is_some_and(is_uuid_v4)
}

fn is_non_empty_list(value: &Value) -> bool {
    value.as_array().is_some_and(|items| !items.is_empty())
}

fn is_timestamp_value(value: &Value) -> bool {
    value.as_str().is_some_and(is_timestamp)
}

fn timestamp_of(value: &Value) -> Option<chrono::DateTime<chrono::Utc>> {
    value.as_str().and_then(|s| parse_timestamp(s).ok())
}

/// Decimal strings, and plain JSON numbers from imported documents
fn is_positive_decimal(value: &Value) -> bool {
    let parsed = match value {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => parse_decimal(&n.to_string()),
        _ => return false,
    };
    parsed.is_ok_and(|d| d > Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::{sample_decision, sample_revocation};
    use serde_json::json;

    #[test]
    fn test_valid_decision() {
        let report = validate(&Record::Decision(sample_decision()));
        assert!(report.is_valid(), "{:?}", report.errors);
    }

    #[test]
    fn test_valid_revocation() {
        let report = validate(&Record::Revocation(sample_revocation()));
        assert!(report.is_valid(), "{:?}", report.errors);
    }

    #[test]
    fn test_missing_fields_short_circuit() {
        let mut document = Record::Decision(sample_decision()).to_document();
        let object = document.as_object_mut().unwrap();
        object.remove("legal_basis");
        object.insert("beneficiary".into(), Value::Null);
        // Would also be invalid, but missing fields stop the check
        object.insert("decision_id".into(), json!("not-a-uuid"));

        let report = validate_document(&document);
        assert_eq!(
            report.errors,
            vec![
                ValidationCode::Missing(RecordField::Beneficiary),
                ValidationCode::Missing(RecordField::LegalBasis),
            ]
        );
        assert_eq!(report.errors[1].to_string(), "MISSING_LEGAL_BASIS");
    }

    #[test]
    fn test_collects_all_decision_errors() {
        let mut dr = sample_decision();
        dr.decision_id = "123".to_string();
        dr.act_type = String::new();
        dr.maximum_value = "-5".to_string();
        dr.decision_date = "2024-01-02T00:00:00Z".to_string();
        dr.record_timestamp = "2024-01-01T00:00:00Z".to_string();
        dr.signatures = vec![];

        let report = validate(&Record::Decision(dr));
        assert_eq!(
            report.errors,
            vec![
                ValidationCode::InvalidDecisionId,
                ValidationCode::InvalidActType,
                ValidationCode::InvalidMaximumValue,
                ValidationCode::DecisionDateAfterRecordTimestamp,
                ValidationCode::InvalidSignatures,
                ValidationCode::DecidersSignaturesMismatch,
            ]
        );
    }

    #[test]
    fn test_invalid_dates_skip_ordering_rule() {
        let mut dr = sample_decision();
        dr.decision_date = "soon".to_string();
        dr.record_timestamp = "later".to_string();

        let report = validate(&Record::Decision(dr));
        assert_eq!(
            report.errors,
            vec![
                ValidationCode::InvalidDecisionDate,
                ValidationCode::InvalidRecordTimestamp,
            ]
        );
    }

    #[test]
    fn test_empty_deciders() {
        let mut dr = sample_decision();
        dr.deciders_id = vec![];

        let report = validate(&Record::Decision(dr));
        assert_eq!(
            report.errors,
            vec![
                ValidationCode::InvalidDecidersId,
                ValidationCode::DecidersSignaturesMismatch,
            ]
        );
    }

    #[test]
    fn test_zero_and_garbage_maximum_value() {
        for value in ["0", "0.00", "abc", ""] {
            let mut dr = sample_decision();
            dr.maximum_value = value.to_string();
            let report = validate(&Record::Decision(dr));
            assert_eq!(report.errors, vec![ValidationCode::InvalidMaximumValue]);
        }
    }

    #[test]
    fn test_numeric_maximum_value_in_raw_document() {
        let mut document = Record::Decision(sample_decision()).to_document();
        document["maximum_value"] = json!(2500);
        assert!(validate_document(&document).is_valid());
    }

    #[test]
    fn test_term_limited_maximum_term() {
        let mut dr = sample_decision();
        dr.maximum_term = Some("2024-12-31T23:59:59Z".to_string());
        assert!(validate(&Record::TermLimitedDecision(dr.clone())).is_valid());

        dr.maximum_term = Some("forever".to_string());
        assert_eq!(
            validate(&Record::TermLimitedDecision(dr)).errors,
            vec![ValidationCode::InvalidMaximumTerm]
        );
    }

    #[test]
    fn test_collects_all_revocation_errors() {
        let mut rr = sample_revocation();
        rr.revocation_id = "nope".to_string();
        rr.target_decision_id = "6f9619ff-8b86-1011-b42d-00c04fc964ff".to_string();
        rr.deciders_id = vec![];
        rr.revocation_date = "never".to_string();
        rr.signatures = vec![];

        let report = validate(&Record::Revocation(rr));
        assert_eq!(
            report.errors,
            vec![
                ValidationCode::InvalidRevocationId,
                ValidationCode::InvalidTargetDecisionId,
                ValidationCode::InvalidDecidersId,
                ValidationCode::InvalidRevocationDate,
                ValidationCode::InvalidSignatures,
            ]
        );
    }

    #[test]
    fn test_revocation_does_not_bind_signature_count() {
        let mut rr = sample_revocation();
        rr.deciders_id.push("DECIDER-002".to_string());
        assert!(validate(&Record::Revocation(rr)).is_valid());
    }

    #[test]
    fn test_record_type_dispatch() {
        assert_eq!(
            validate_document(&json!({})).errors,
            vec![ValidationCode::Missing(RecordField::RecordType)]
        );
        assert_eq!(
            validate_document(&json!({"record_type": "XX"})).errors,
            vec![ValidationCode::UnknownRecordType]
        );

        let errors = validate_document(&json!({"record_type": "RR"})).errors;
        assert_eq!(errors.len(), REVOCATION_REQUIRED.len());
    }

    #[test]
    fn test_validation_code_strings() {
        let codes = [
            ValidationCode::Missing(RecordField::PreviousRecordHash),
            ValidationCode::DecisionDateAfterRecordTimestamp,
            ValidationCode::InvalidMaximumTerm,
        ];
        for code in codes {
            let text = code.to_string();
            assert_eq!(text.parse::<ValidationCode>().unwrap(), code);
        }
        assert_eq!(
            codes[0].to_string(),
            "MISSING_PREVIOUS_RECORD_HASH"
        );
        assert!("BOGUS".parse::<ValidationCode>().is_err());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationReport {
            errors: vec![
                ValidationCode::InvalidDecisionId,
                ValidationCode::InvalidSignatures,
            ],
        }
        .into_result(RecordType::Decision)
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid DR record: [INVALID_DECISION_ID, INVALID_SIGNATURES]"
        );
    }
}
