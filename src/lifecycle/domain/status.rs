//! Ordered lead pipeline status.

use super::ParseLeadStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline status of a lead.
///
/// Variants are declared in pipeline order; [`LeadStatus::ordinal`] follows
/// declaration order and is the only ordering the transition policy uses.
/// `Disqualified` sits before `Converted`, so that move counts as forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Freshly captured lead.
    New,
    /// First contact has been made.
    Contacted,
    /// Lead meets qualification criteria.
    Qualified,
    /// A proposal has been sent.
    Proposal,
    /// Terms are being negotiated.
    Negotiation,
    /// Lead was ruled out.
    Disqualified,
    /// Lead became a customer.
    Converted,
}

impl LeadStatus {
    /// Every status in pipeline order.
    pub const ALL: [Self; 7] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::Proposal,
        Self::Negotiation,
        Self::Disqualified,
        Self::Converted,
    ];

    /// Returns the position of this status in the pipeline.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Contacted => 1,
            Self::Qualified => 2,
            Self::Proposal => 3,
            Self::Negotiation => 4,
            Self::Disqualified => 5,
            Self::Converted => 6,
        }
    }

    /// Returns `true` when moving to `target` advances the pipeline.
    ///
    /// Staying on the same status is not a forward move.
    #[must_use]
    pub const fn is_forward_to(self, target: Self) -> bool {
        target.ordinal() > self.ordinal()
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::Disqualified => "disqualified",
            Self::Converted => "converted",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for LeadStatus {
    type Error = ParseLeadStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "qualified" => Ok(Self::Qualified),
            "proposal" => Ok(Self::Proposal),
            "negotiation" => Ok(Self::Negotiation),
            "disqualified" => Ok(Self::Disqualified),
            "converted" => Ok(Self::Converted),
            _ => Err(ParseLeadStatusError(value.to_owned())),
        }
    }
}
