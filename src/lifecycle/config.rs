//! Lifecycle engine configuration.
//!
//! Configuration is an explicit value handed to the services at construction.
//! Services snapshot it once per request, so a request never observes two
//! different enforcement modes.

use crate::lifecycle::domain::{EnforcementMode, ParseEnforcementModeError};
use crate::scope::domain::{ParseRoleError, Role};
use chrono::Duration;
use std::collections::BTreeSet;
use thiserror::Error;

/// Environment variable selecting the enforcement mode.
pub const ENFORCEMENT_MODE_VAR: &str = "LEADLINE_ENFORCEMENT_MODE";
/// Environment variable listing override-capable roles, comma separated.
pub const OVERRIDE_ROLES_VAR: &str = "LEADLINE_OVERRIDE_ROLES";
/// Environment variable bounding bulk request size.
pub const MAX_BATCH_SIZE_VAR: &str = "LEADLINE_MAX_BATCH_SIZE";
/// Environment variable bounding bulk fan-out concurrency.
pub const BULK_CONCURRENCY_VAR: &str = "LEADLINE_BULK_CONCURRENCY";
/// Environment variable setting idempotency retention in seconds.
pub const IDEMPOTENCY_TTL_VAR: &str = "LEADLINE_IDEMPOTENCY_TTL_SECS";
/// Environment variable capping retained idempotency entries.
pub const IDEMPOTENCY_MAX_ENTRIES_VAR: &str = "LEADLINE_IDEMPOTENCY_MAX_ENTRIES";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The enforcement mode is not recognised.
    #[error("{var}: {source}")]
    EnforcementMode {
        /// Offending variable.
        var: &'static str,
        /// Parse failure.
        source: ParseEnforcementModeError,
    },

    /// A role in the override list is not recognised.
    #[error("{var}: {source}")]
    Role {
        /// Offending variable.
        var: &'static str,
        /// Parse failure.
        source: ParseRoleError,
    },

    /// A numeric setting is malformed or zero.
    #[error("{var}: expected a positive integer, got '{value}'")]
    PositiveInteger {
        /// Offending variable.
        var: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Roles allowed to set any lead status regardless of ordering.
///
/// This set is independent of the per-organization administrative roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideRoles(BTreeSet<Role>);

impl OverrideRoles {
    /// Creates the set from explicit roles.
    #[must_use]
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self(roles.into_iter().collect())
    }

    /// Creates an empty set; no actor may override ordering.
    #[must_use]
    pub const fn none() -> Self {
        Self(BTreeSet::new())
    }

    /// Returns `true` when `role` holds override capability.
    #[must_use]
    pub fn grants(&self, role: Option<Role>) -> bool {
        role.is_some_and(|held| self.0.contains(&held))
    }

    /// Iterates over the roles in the set.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl Default for OverrideRoles {
    fn default() -> Self {
        Self::new(
            Role::ALL
                .into_iter()
                .filter(|role| role.capabilities().lifecycle_override),
        )
    }
}

/// Retention policy for idempotency entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdempotencyConfig {
    /// How long a cached result stays replayable.
    pub ttl: Duration,
    /// Maximum number of retained entries.
    pub max_entries: usize,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(24),
            max_entries: 10_000,
        }
    }
}

/// Configuration for the lead lifecycle services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Consequence of policy violations.
    pub enforcement_mode: EnforcementMode,
    /// Roles with override capability.
    pub override_roles: OverrideRoles,
    /// Largest accepted bulk request.
    pub max_batch_size: usize,
    /// Maximum bulk items in flight at once.
    pub bulk_concurrency: usize,
    /// Idempotency retention.
    pub idempotency: IdempotencyConfig,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            enforcement_mode: EnforcementMode::Enforce,
            override_roles: OverrideRoles::default(),
            max_batch_size: 100,
            bulk_concurrency: 8,
            idempotency: IdempotencyConfig::default(),
        }
    }
}

impl LifecycleConfig {
    /// Sets the enforcement mode.
    #[must_use]
    pub const fn with_enforcement_mode(mut self, mode: EnforcementMode) -> Self {
        self.enforcement_mode = mode;
        self
    }

    /// Replaces the override role set.
    #[must_use]
    pub fn with_override_roles(mut self, roles: OverrideRoles) -> Self {
        self.override_roles = roles;
        self
    }

    /// Sets the maximum bulk batch size.
    #[must_use]
    pub const fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    /// Sets the bulk fan-out concurrency; zero is treated as one.
    #[must_use]
    pub const fn with_bulk_concurrency(mut self, concurrency: usize) -> Self {
        self.bulk_concurrency = if concurrency == 0 { 1 } else { concurrency };
        self
    }

    /// Sets the idempotency retention policy.
    #[must_use]
    pub const fn with_idempotency(mut self, idempotency: IdempotencyConfig) -> Self {
        self.idempotency = idempotency;
        self
    }

    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first malformed variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// absent keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first malformed key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let enforcement_mode = match lookup(ENFORCEMENT_MODE_VAR) {
            Some(raw) => EnforcementMode::try_from(raw.as_str()).map_err(|source| {
                ConfigError::EnforcementMode {
                    var: ENFORCEMENT_MODE_VAR,
                    source,
                }
            })?,
            None => defaults.enforcement_mode,
        };

        let override_roles = match lookup(OVERRIDE_ROLES_VAR) {
            Some(raw) => parse_roles(&raw)?,
            None => defaults.override_roles,
        };

        let max_batch_size =
            positive_usize(&lookup, MAX_BATCH_SIZE_VAR)?.unwrap_or(defaults.max_batch_size);
        let bulk_concurrency =
            positive_usize(&lookup, BULK_CONCURRENCY_VAR)?.unwrap_or(defaults.bulk_concurrency);
        let max_entries = positive_usize(&lookup, IDEMPOTENCY_MAX_ENTRIES_VAR)?
            .unwrap_or(defaults.idempotency.max_entries);
        let ttl = match positive_usize(&lookup, IDEMPOTENCY_TTL_VAR)? {
            Some(seconds) => {
                let secs = i64::try_from(seconds).map_err(|_| ConfigError::PositiveInteger {
                    var: IDEMPOTENCY_TTL_VAR,
                    value: seconds.to_string(),
                })?;
                Duration::try_seconds(secs).ok_or_else(|| ConfigError::PositiveInteger {
                    var: IDEMPOTENCY_TTL_VAR,
                    value: seconds.to_string(),
                })?
            }
            None => defaults.idempotency.ttl,
        };

        Ok(Self {
            enforcement_mode,
            override_roles,
            max_batch_size,
            bulk_concurrency,
            idempotency: IdempotencyConfig { ttl, max_entries },
        })
    }
}

fn parse_roles(raw: &str) -> Result<OverrideRoles, ConfigError> {
    let roles = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            Role::try_from(name).map_err(|source| ConfigError::Role {
                var: OVERRIDE_ROLES_VAR,
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(OverrideRoles::new(roles))
}

fn positive_usize(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<usize>, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ConfigError::PositiveInteger { var, value: raw }),
    }
}
