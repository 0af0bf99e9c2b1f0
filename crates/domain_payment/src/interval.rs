//! Payment intervals

use serde::{Deserialize, Serialize};

/// How often a payment recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentInterval {
    OneTime,
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl PaymentInterval {
    /// Returns the interval length in months, 0 for one-time payments
    pub fn as_months(&self) -> u8 {
        match self {
            PaymentInterval::OneTime => 0,
            PaymentInterval::Monthly => 1,
            PaymentInterval::Quarterly => 3,
            PaymentInterval::HalfYearly => 6,
            PaymentInterval::Yearly => 12,
        }
    }

    /// Maps an interval length in months back to the interval
    pub fn from_months(months: u8) -> Option<Self> {
        match months {
            0 => Some(PaymentInterval::OneTime),
            1 => Some(PaymentInterval::Monthly),
            3 => Some(PaymentInterval::Quarterly),
            6 => Some(PaymentInterval::HalfYearly),
            12 => Some(PaymentInterval::Yearly),
            _ => None,
        }
    }

    /// Returns true for every interval except one-time
    pub fn is_recurring(&self) -> bool {
        !matches!(self, PaymentInterval::OneTime)
    }
}
