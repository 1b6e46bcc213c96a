//! Authorization Engine - the payment decision chain
//!
//! Pure reads over the ledger. Rules run in a fixed order and the first one
//! that fails decides the outcome; later rules assume the earlier ones held.
//!
//! 1. decision record exists
//! 2. not revoked
//! 3. record passes re-validation
//! 4. payment and decision dates valid, payment not before decision
//! 5. beneficiary matches
//! 6. currency matches
//! 7. value positive, cumulative total within `maximum_value`
//! 8. term-limited decisions: payment not after `maximum_term`

use crate::decision::{Authorization, RejectReason};
use fides_core::{exact_add, parse_decimal, parse_timestamp, Amount, AmountError};
use fides_ledger::{validate, Ledger, LedgerError, Payment, RecordStore};
use rust_decimal::Decimal;

/// Binary decision: may this payment be executed?
///
/// Never fails. Every failure mode, including an unreadable ledger, is a
/// `false`.
pub fn is_authorized<S: RecordStore>(ledger: &Ledger<S>, payment: &Payment) -> bool {
    authorize_with_reason(ledger, payment).is_authorized()
}

/// Same decision as [`is_authorized`], carrying the failing rule.
///
/// For offline audit only. The reason must not be shown to whoever asked
/// for the payment: distinguishing "no such decision" from "wrong
/// beneficiary" lets a caller probe for valid decision ids.
pub fn authorize_with_reason<S: RecordStore>(
    ledger: &Ledger<S>,
    payment: &Payment,
) -> Authorization {
    let outcome: Authorization = evaluate(ledger, payment).into();

    match outcome.reason() {
        None => tracing::debug!(decision_id = %payment.decision_id, "Payment authorized"),
        Some(reason) => tracing::warn!(
            decision_id = %payment.decision_id,
            reason = %reason,
            "Payment blocked"
        ),
    }

    outcome
}

fn unavailable(err: LedgerError) -> RejectReason {
    tracing::warn!(error = %err, "Ledger read failed during authorization");
    RejectReason::LedgerUnavailable
}

fn evaluate<S: RecordStore>(ledger: &Ledger<S>, payment: &Payment) -> Result<(), RejectReason> {
    let record = ledger
        .find_decision(&payment.decision_id)
        .map_err(unavailable)?
        .ok_or(RejectReason::RecordNotFound)?;

    if ledger.is_revoked(&payment.decision_id).map_err(unavailable)? {
        return Err(RejectReason::DecisionRevoked);
    }

    validate(&record)
        .into_result(record.record_type())
        .map_err(|err| RejectReason::InvalidRecord { errors: err.errors })?;

    let decision = record.as_decision().ok_or(RejectReason::RecordNotFound)?;

    let payment_date =
        parse_timestamp(&payment.payment_date).map_err(|_| RejectReason::InvalidPaymentDate)?;
    let decision_date =
        parse_timestamp(&decision.decision_date).map_err(|_| RejectReason::InvalidDecisionDate)?;
    if payment_date < decision_date {
        return Err(RejectReason::PaymentBeforeDecision);
    }

    if payment.beneficiary != decision.beneficiary {
        return Err(RejectReason::BeneficiaryMismatch);
    }

    if payment.currency != decision.currency {
        return Err(RejectReason::CurrencyMismatch);
    }

    let maximum =
        parse_decimal(&decision.maximum_value).map_err(|_| RejectReason::InvalidNumericValue)?;
    let value = match Amount::parse(&payment.value) {
        Ok(amount) => Decimal::from(amount),
        Err(AmountError::Unparseable(_)) => return Err(RejectReason::InvalidNumericValue),
        Err(AmountError::NotPositive(_)) => return Err(RejectReason::InvalidPaymentValue),
    };

    let paid = ledger
        .sum_payments(&payment.decision_id)
        .map_err(unavailable)?;
    // A total that overflows or would round is treated as over the limit
    match exact_add(paid, value) {
        Some(total) if total <= maximum => {}
        _ => return Err(RejectReason::ExceedsMaximumValue),
    }

    if record.is_term_limited() {
        // A malformed term never gets here: re-validation rejects it
        let term = decision
            .maximum_term
            .as_deref()
            .and_then(|term| parse_timestamp(term).ok());
        if let Some(term) = term {
            if payment_date > term {
                return Err(RejectReason::ExceptionExpired);
            }
        }
    }

    Ok(())
}
