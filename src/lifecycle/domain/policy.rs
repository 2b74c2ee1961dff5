//! Forward-only transition policy with controlled overrides.

use super::{LeadStatus, ParseEnforcementModeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How policy violations are treated.
///
/// The mode changes the consequence of a violation, never whether the
/// violation is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementMode {
    /// Violations are permitted silently.
    Off,
    /// Violations are permitted and flagged for logging.
    LogOnly,
    /// Violations are rejected.
    #[default]
    Enforce,
}

impl EnforcementMode {
    /// Returns the canonical configuration representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::LogOnly => "log_only",
            Self::Enforce => "enforce",
        }
    }
}

impl fmt::Display for EnforcementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EnforcementMode {
    type Error = ParseEnforcementModeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "log_only" => Ok(Self::LogOnly),
            "enforce" => Ok(Self::Enforce),
            _ => Err(ParseEnforcementModeError(value.to_owned())),
        }
    }
}

/// Ways a requested move can break pipeline ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionViolation {
    /// Target sits earlier in the pipeline than the current status.
    Backward,
    /// Target equals the current status.
    Unchanged,
}

impl fmt::Display for TransitionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Backward => "backward move",
            Self::Unchanged => "status unchanged",
        })
    }
}

/// Why the policy reached its decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "violation", rename_all = "snake_case")]
pub enum DecisionReason {
    /// The move advances the pipeline.
    Forward,
    /// The actor holds override capability.
    Overridden(TransitionViolation),
    /// Enforcement is off.
    EnforcementOff(TransitionViolation),
    /// Enforcement is log-only; the violation must be logged.
    LoggedViolation(TransitionViolation),
    /// Enforcement rejected the move.
    Rejected(TransitionViolation),
}

/// Outcome of evaluating one requested move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    allowed: bool,
    reason: DecisionReason,
}

impl PolicyDecision {
    /// Returns `true` when the move may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Returns the reason behind the decision.
    #[must_use]
    pub const fn reason(&self) -> DecisionReason {
        self.reason
    }

    /// Returns the ordering violation, if the move was not forward.
    #[must_use]
    pub const fn violation(&self) -> Option<TransitionViolation> {
        match self.reason {
            DecisionReason::Forward => None,
            DecisionReason::Overridden(violation)
            | DecisionReason::EnforcementOff(violation)
            | DecisionReason::LoggedViolation(violation)
            | DecisionReason::Rejected(violation) => Some(violation),
        }
    }

    /// Returns `true` when a permitted violation must be logged.
    #[must_use]
    pub const fn requires_logging(&self) -> bool {
        matches!(self.reason, DecisionReason::LoggedViolation(_))
    }
}

/// Pure decision function over lead status moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionPolicy {
    mode: EnforcementMode,
}

impl TransitionPolicy {
    /// Creates a policy evaluating under `mode`.
    #[must_use]
    pub const fn new(mode: EnforcementMode) -> Self {
        Self { mode }
    }

    /// Returns the enforcement mode.
    #[must_use]
    pub const fn mode(&self) -> EnforcementMode {
        self.mode
    }

    /// Decides whether moving from `current` to `target` is allowed.
    ///
    /// Actors without override capability may only move forward. Override
    /// capable actors may set any status.
    #[must_use]
    pub const fn evaluate(
        &self,
        current: LeadStatus,
        target: LeadStatus,
        can_override: bool,
    ) -> PolicyDecision {
        if current.is_forward_to(target) {
            return PolicyDecision {
                allowed: true,
                reason: DecisionReason::Forward,
            };
        }
        let violation = if target.ordinal() == current.ordinal() {
            TransitionViolation::Unchanged
        } else {
            TransitionViolation::Backward
        };

        let (allowed, reason) = if can_override {
            (true, DecisionReason::Overridden(violation))
        } else {
            match self.mode {
                EnforcementMode::Off => (true, DecisionReason::EnforcementOff(violation)),
                EnforcementMode::LogOnly => (true, DecisionReason::LoggedViolation(violation)),
                EnforcementMode::Enforce => (false, DecisionReason::Rejected(violation)),
            }
        };
        PolicyDecision { allowed, reason }
    }
}
