use std::{convert::Infallible, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

//--------------------------------------     PaymentStatus     ---------------------------------------------------------
/// The lifecycle status of an invoice, as stored locally and as reported by a payment processor.
///
/// Processors use their own vocabulary (BTCPay: `New`, `Settled`; NowPayments: `waiting`, `finished`, ...). Known
/// values are normalised into the named variants, case-insensitively. Anything else is kept verbatim in
/// [`PaymentStatus::Other`] so that a poll never loses information.
///
/// Transitions between statuses are not validated. Any status can follow any other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    /// The invoice has been issued, and nothing has been paid yet.
    #[default]
    Created,
    /// The invoice is known, but the processor has no payment records for it yet.
    Pending,
    /// A payment was seen but is not yet confirmed.
    Processing,
    Paid,
    /// The invoice was paid and the payment confirmed (BTCPay `Settled`).
    Completed,
    /// NowPayments' terminal "paid" value.
    Finished,
    Expired,
    Invalid,
    Failed,
    Other(String),
}

impl PaymentStatus {
    /// Terminal statuses are never re-polled from the processor.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Completed | Self::Finished | Self::Failed | Self::Expired)
    }

    /// True for the statuses that mark an invoice as paid, and so stamp `paid_at` on the record.
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Paid | Self::Completed | Self::Finished)
    }

    /// True if the processor did not report any status at all.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Other(s) if s.trim().is_empty())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Paid => "paid",
            Self::Completed => "completed",
            Self::Finished => "finished",
            Self::Expired => "expired",
            Self::Invalid => "invalid",
            Self::Failed => "failed",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for PaymentStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" | "new" => Self::Created,
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "paid" => Self::Paid,
            "completed" | "complete" | "settled" => Self::Completed,
            "finished" => Self::Finished,
            "expired" => Self::Expired,
            "invalid" => Self::Invalid,
            "failed" => Self::Failed,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<PaymentStatus> for String {
    fn from(value: PaymentStatus) -> Self {
        match value {
            PaymentStatus::Other(s) => s,
            s => s.as_str().to_string(),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}
