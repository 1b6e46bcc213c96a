//! Ledger records - Decision (DR), term-limited decision (SDR), Revocation (RR)
//!
//! Every field is kept exactly as it was written: the record's document form
//! is the hash input, so dates and values stay strings here and are parsed
//! only by the validator and the authorization engine.

use serde::Deserialize;
use serde_json::{json, Value};
use strum_macros::{AsRefStr, Display, EnumString};

/// Discriminant carried in the `record_type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum RecordType {
    /// Decision Record
    #[strum(serialize = "DR")]
    Decision,

    /// Term-limited Decision Record (carries `maximum_term`)
    #[strum(serialize = "SDR")]
    TermLimitedDecision,

    /// Revocation Record
    #[strum(serialize = "RR")]
    Revocation,
}

/// An administrative decision authorizing payments up to `maximum_value`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionRecord {
    pub decision_id: String,
    pub authority_id: String,
    pub deciders_id: Vec<String>,
    pub act_type: String,
    /// ISO 4217 currency code
    pub currency: String,
    /// Positive decimal string, e.g. `"100000.00"`
    pub maximum_value: String,
    pub beneficiary: String,
    pub legal_basis: String,
    pub decision_date: String,
    pub previous_record_hash: String,
    pub record_timestamp: String,
    pub signatures: Vec<String>,
    /// Expiry of a term-limited decision; only read for `SDR` records
    #[serde(default)]
    pub maximum_term: Option<String>,
}

/// Terminates payment authorization for `target_decision_id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevocationRecord {
    pub revocation_id: String,
    pub target_decision_id: String,
    pub authority_id: String,
    pub deciders_id: Vec<String>,
    pub revocation_reason: String,
    pub revocation_date: String,
    pub previous_record_hash: String,
    pub record_timestamp: String,
    pub signatures: Vec<String>,
}

/// A chained ledger record, tagged by `record_type`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "record_type")]
pub enum Record {
    #[serde(rename = "DR")]
    Decision(DecisionRecord),

    #[serde(rename = "SDR")]
    TermLimitedDecision(DecisionRecord),

    #[serde(rename = "RR")]
    Revocation(RevocationRecord),
}

impl Record {
    pub fn record_type(&self) -> RecordType {
        match self {
            Record::Decision(_) => RecordType::Decision,
            Record::TermLimitedDecision(_) => RecordType::TermLimitedDecision,
            Record::Revocation(_) => RecordType::Revocation,
        }
    }

    pub fn authority_id(&self) -> &str {
        match self {
            Record::Decision(dr) | Record::TermLimitedDecision(dr) => &dr.authority_id,
            Record::Revocation(rr) => &rr.authority_id,
        }
    }

    pub fn previous_record_hash(&self) -> &str {
        match self {
            Record::Decision(dr) | Record::TermLimitedDecision(dr) => &dr.previous_record_hash,
            Record::Revocation(rr) => &rr.previous_record_hash,
        }
    }

    pub fn record_timestamp(&self) -> &str {
        match self {
            Record::Decision(dr) | Record::TermLimitedDecision(dr) => &dr.record_timestamp,
            Record::Revocation(rr) => &rr.record_timestamp,
        }
    }

    /// The decision body, for DR and SDR records
    pub fn as_decision(&self) -> Option<&DecisionRecord> {
        match self {
            Record::Decision(dr) | Record::TermLimitedDecision(dr) => Some(dr),
            Record::Revocation(_) => None,
        }
    }

    pub fn as_revocation(&self) -> Option<&RevocationRecord> {
        match self {
            Record::Revocation(rr) => Some(rr),
            _ => None,
        }
    }

    /// `decision_id` of a DR/SDR
    pub fn decision_id(&self) -> Option<&str> {
        self.as_decision().map(|dr| dr.decision_id.as_str())
    }

    /// `target_decision_id` of an RR
    pub fn target_decision_id(&self) -> Option<&str> {
        self.as_revocation().map(|rr| rr.target_decision_id.as_str())
    }

    pub fn is_term_limited(&self) -> bool {
        matches!(self, Record::TermLimitedDecision(_))
    }

    /// Wire/document form of the record.
    ///
    /// This object is what gets canonicalized and hashed, and what the
    /// storage layer persists. `maximum_term` is omitted when absent.
    pub fn to_document(&self) -> Value {
        match self {
            Record::Decision(dr) => decision_document(RecordType::Decision, dr),
            Record::TermLimitedDecision(dr) => {
                decision_document(RecordType::TermLimitedDecision, dr)
            }
            Record::Revocation(rr) => json!({
                "record_type": RecordType::Revocation.as_ref(),
                "revocation_id": rr.revocation_id,
                "target_decision_id": rr.target_decision_id,
                "authority_id": rr.authority_id,
                "deciders_id": rr.deciders_id,
                "revocation_reason": rr.revocation_reason,
                "revocation_date": rr.revocation_date,
                "previous_record_hash": rr.previous_record_hash,
                "record_timestamp": rr.record_timestamp,
                "signatures": rr.signatures,
            }),
        }
    }

    /// Rebuild a typed record from its document form
    pub fn from_document(document: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(document)
    }
}

fn decision_document(record_type: RecordType, dr: &DecisionRecord) -> Value {
    let mut document = json!({
        "record_type": record_type.as_ref(),
        "decision_id": dr.decision_id,
        "authority_id": dr.authority_id,
        "deciders_id": dr.deciders_id,
        "act_type": dr.act_type,
        "currency": dr.currency,
        "maximum_value": dr.maximum_value,
        "beneficiary": dr.beneficiary,
        "legal_basis": dr.legal_basis,
        "decision_date": dr.decision_date,
        "previous_record_hash": dr.previous_record_hash,
        "record_timestamp": dr.record_timestamp,
        "signatures": dr.signatures,
    });

    if let Some(ref term) = dr.maximum_term {
        document["maximum_term"] = Value::String(term.clone());
    }

    document
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_decision() -> DecisionRecord {
        DecisionRecord {
            decision_id: "6f9619ff-8b86-4011-b42d-00c04fc964ff".to_string(),
            authority_id: "GOV-TEST-001".to_string(),
            deciders_id: vec!["DECIDER-001".to_string()],
            act_type: "contract".to_string(),
            currency: "BRL".to_string(),
            maximum_value: "10000.00".to_string(),
            beneficiary: "SUPPLIER-TEST".to_string(),
            legal_basis: "Test Law".to_string(),
            decision_date: "2024-01-01T10:00:00Z".to_string(),
            previous_record_hash: "0".repeat(64),
            record_timestamp: "2024-01-01T10:30:00Z".to_string(),
            signatures: vec!["SIG-001".to_string()],
            maximum_term: None,
        }
    }

    pub(crate) fn sample_revocation() -> RevocationRecord {
        RevocationRecord {
            revocation_id: "0b6ad2a4-58e4-4c0e-9a4c-3f1fd0a6f7d1".to_string(),
            target_decision_id: "6f9619ff-8b86-4011-b42d-00c04fc964ff".to_string(),
            authority_id: "GOV-TEST-001".to_string(),
            deciders_id: vec!["DECIDER-001".to_string()],
            revocation_reason: "Contract cancelled".to_string(),
            revocation_date: "2024-02-01T09:00:00Z".to_string(),
            previous_record_hash: "0".repeat(64),
            record_timestamp: "2024-02-01T09:00:00Z".to_string(),
            signatures: vec!["SIG-001".to_string()],
        }
    }

    #[test]
    fn test_record_type_codes() {
        assert_eq!(RecordType::Decision.to_string(), "DR");
        assert_eq!(RecordType::TermLimitedDecision.to_string(), "SDR");
        assert_eq!("RR".parse::<RecordType>().unwrap(), RecordType::Revocation);
    }

    #[test]
    fn test_document_roundtrip_decision() {
        let record = Record::Decision(sample_decision());
        let document = record.to_document();

        assert_eq!(document["record_type"], "DR");
        assert!(document.get("maximum_term").is_none());

        let parsed = Record::from_document(document).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_document_roundtrip_term_limited() {
        let mut dr = sample_decision();
        dr.maximum_term = Some("2024-06-30T23:59:59Z".to_string());
        let record = Record::TermLimitedDecision(dr);

        let document = record.to_document();
        assert_eq!(document["record_type"], "SDR");
        assert_eq!(document["maximum_term"], "2024-06-30T23:59:59Z");

        let parsed = Record::from_document(document).unwrap();
        assert!(parsed.is_term_limited());
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_document_roundtrip_revocation() {
        let record = Record::Revocation(sample_revocation());
        let parsed = Record::from_document(record.to_document()).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(
            parsed.target_decision_id(),
            Some("6f9619ff-8b86-4011-b42d-00c04fc964ff")
        );
        assert_eq!(parsed.decision_id(), None);
    }

    #[test]
    fn test_unknown_record_type_rejected() {
        let mut document = Record::Decision(sample_decision()).to_document();
        document["record_type"] = Value::String("XX".to_string());
        assert!(Record::from_document(document).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        // An extra key would be dropped from the hash input and go unnoticed
        let mut document = Record::Decision(sample_decision()).to_document();
        document["approved_by"] = Value::String("MALLORY".to_string());
        assert!(Record::from_document(document).is_err());

        let mut document = Record::Revocation(sample_revocation()).to_document();
        document["note"] = Value::String("x".to_string());
        assert!(Record::from_document(document).is_err());
    }
}
