//! Payment status state machine and merge rule.
//!
//! ```text
//! pending_payment --(provider: confirmed)--> confirmed   [terminal]
//! pending_payment --(provider: failed)----> failed       [terminal]
//! pending_payment --(provider: pending)---> pending_payment
//! confirmed ------------------------------> confirmed    (never regresses)
//! ```
//!
//! Both reconciliation paths (webhook push and status pull) apply the same
//! merge: `confirmed` is sticky, anything else adopts the provider's report.
//! Final state is therefore independent of delivery order or duplication.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Payment status of a registration, as reported by the booking provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting payment; the only non-terminal state.
    PendingPayment,

    /// Payment completed; terminal, never regresses.
    Confirmed,

    /// Payment failed; terminal-negative, may be superseded by a fresh attempt.
    Failed,
}

/// A status string outside the provider's fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown payment status '{0}'")]
pub struct UnknownStatus(pub String);

impl PaymentStatus {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, PaymentStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Confirmed | PaymentStatus::Failed)
    }

    /// Merges a provider-reported status into the stored one.
    ///
    /// `confirmed` is never overwritten; otherwise the report wins. Applying
    /// any permutation of the same reports converges on the same value.
    pub fn merge(self, reported: PaymentStatus) -> PaymentStatus {
        if self.is_confirmed() {
            PaymentStatus::Confirmed
        } else {
            reported
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::PendingPayment => "pending_payment",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payment" => Ok(PaymentStatus::PendingPayment),
            "confirmed" => Ok(PaymentStatus::Confirmed),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn confirmed_is_sticky() {
        assert_eq!(
            PaymentStatus::Confirmed.merge(PaymentStatus::PendingPayment),
            PaymentStatus::Confirmed
        );
        assert_eq!(
            PaymentStatus::Confirmed.merge(PaymentStatus::Failed),
            PaymentStatus::Confirmed
        );
    }

    #[test]
    fn pending_adopts_the_report() {
        assert_eq!(
            PaymentStatus::PendingPayment.merge(PaymentStatus::Confirmed),
            PaymentStatus::Confirmed
        );
        assert_eq!(
            PaymentStatus::PendingPayment.merge(PaymentStatus::Failed),
            PaymentStatus::Failed
        );
        assert_eq!(
            PaymentStatus::PendingPayment.merge(PaymentStatus::PendingPayment),
            PaymentStatus::PendingPayment
        );
    }

    #[test]
    fn interleaved_deliveries_converge_on_confirmed() {
        // Duplicated and reordered webhook deliveries must not matter.
        let deliveries = [
            PaymentStatus::PendingPayment,
            PaymentStatus::Confirmed,
            PaymentStatus::PendingPayment,
            PaymentStatus::Confirmed,
        ];
        let finals = deliveries
            .iter()
            .fold(PaymentStatus::PendingPayment, |acc, &r| acc.merge(r));
        assert_eq!(finals, PaymentStatus::Confirmed);
    }

    #[test]
    fn parses_provider_vocabulary_only() {
        assert_eq!(
            "pending_payment".parse::<PaymentStatus>().unwrap(),
            PaymentStatus::PendingPayment
        );
        assert_eq!(
            "confirmed".parse::<PaymentStatus>().unwrap(),
            PaymentStatus::Confirmed
        );
        assert_eq!(
            "failed".parse::<PaymentStatus>().unwrap(),
            PaymentStatus::Failed
        );
        assert!("refunded".parse::<PaymentStatus>().is_err());
        assert!("".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn serde_uses_snake_case_wire_form() {
        let json = serde_json::to_string(&PaymentStatus::PendingPayment).unwrap();
        assert_eq!(json, "\"pending_payment\"");
        let back: PaymentStatus = serde_json::from_str("\"confirmed\"").unwrap();
        assert_eq!(back, PaymentStatus::Confirmed);
    }

    fn any_status() -> impl Strategy<Value = PaymentStatus> {
        prop_oneof![
            Just(PaymentStatus::PendingPayment),
            Just(PaymentStatus::Confirmed),
            Just(PaymentStatus::Failed),
        ]
    }

    proptest! {
        /// Once a confirmed report has been merged, no later sequence of
        /// reports can move the status off confirmed.
        #[test]
        fn no_regression_after_confirmation(
            before in prop::collection::vec(any_status(), 0..8),
            after in prop::collection::vec(any_status(), 0..8),
        ) {
            let mut status = PaymentStatus::PendingPayment;
            for r in before {
                status = status.merge(r);
            }
            status = status.merge(PaymentStatus::Confirmed);
            for r in after {
                status = status.merge(r);
            }
            prop_assert_eq!(status, PaymentStatus::Confirmed);
        }

        /// Merge is idempotent: applying the same report twice equals once.
        #[test]
        fn merge_is_idempotent(stored in any_status(), reported in any_status()) {
            let once = stored.merge(reported);
            let twice = stored.merge(reported).merge(reported);
            prop_assert_eq!(once, twice);
        }
    }
}
