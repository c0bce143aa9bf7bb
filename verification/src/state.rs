//! Payment state transition rules.

use crate::PaymentError;
use regdesk_types::{PaymentDecision, PaymentStatus};

/// State after a proof submission from `from`.
///
/// A proof may be (re)submitted while pending, after a rejection, or while
/// an earlier proof still awaits review.
pub fn on_submit(from: PaymentStatus) -> Result<PaymentStatus, PaymentError> {
    match from {
        PaymentStatus::Pending | PaymentStatus::Rejected | PaymentStatus::Submitted => {
            Ok(PaymentStatus::Submitted)
        }
        PaymentStatus::Verified => Err(PaymentError::AlreadyVerified),
        PaymentStatus::NoPaymentRequired => Err(PaymentError::NoPaymentExpected),
    }
}

/// State after an admin decision from `from`. Only a submitted proof can be
/// reviewed.
pub fn on_verify(
    from: PaymentStatus,
    decision: &PaymentDecision,
) -> Result<PaymentStatus, PaymentError> {
    if from != PaymentStatus::Submitted {
        return Err(PaymentError::InvalidStateTransition { from });
    }
    Ok(match decision {
        PaymentDecision::Approve => PaymentStatus::Verified,
        PaymentDecision::Reject { .. } => PaymentStatus::Rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PaymentStatus; 5] = [
        PaymentStatus::NoPaymentRequired,
        PaymentStatus::Pending,
        PaymentStatus::Submitted,
        PaymentStatus::Verified,
        PaymentStatus::Rejected,
    ];

    #[test]
    fn submit_table() {
        for from in ALL {
            let result = on_submit(from);
            match from {
                PaymentStatus::Verified => {
                    assert!(matches!(result, Err(PaymentError::AlreadyVerified)))
                }
                PaymentStatus::NoPaymentRequired => {
                    assert!(matches!(result, Err(PaymentError::NoPaymentExpected)))
                }
                _ => assert_eq!(result.unwrap(), PaymentStatus::Submitted),
            }
        }
    }

    #[test]
    fn verify_only_from_submitted() {
        let reject = PaymentDecision::Reject { reason: None };
        for from in ALL {
            if from == PaymentStatus::Submitted {
                assert_eq!(
                    on_verify(from, &PaymentDecision::Approve).unwrap(),
                    PaymentStatus::Verified
                );
                assert_eq!(on_verify(from, &reject).unwrap(), PaymentStatus::Rejected);
            } else {
                assert!(matches!(
                    on_verify(from, &PaymentDecision::Approve),
                    Err(PaymentError::InvalidStateTransition { from: f }) if f == from
                ));
            }
        }
    }
}
