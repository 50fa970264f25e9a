//! Runtime configuration structures and loaders.

use std::collections::BTreeSet;
use std::env;

use tactics_core::{ValidationErrorKind, ValidationPolicy};
use tracing::warn;

use crate::progression::LevelCurve;
use crate::transport::TransportMode;

/// Deployment-wide runtime settings, fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    pub transport_mode: TransportMode,
    pub policy: ValidationPolicy,
    /// Maximum combat log entries accepted in one state submission.
    pub log_batch_limit: usize,
    /// Maximum combat log entries stored per session.
    pub log_capacity: usize,
    pub level_curve: LevelCurve,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            transport_mode: TransportMode::Secured,
            policy: ValidationPolicy::default(),
            log_batch_limit: Self::DEFAULT_LOG_BATCH_LIMIT,
            log_capacity: Self::DEFAULT_LOG_CAPACITY,
            level_curve: LevelCurve::default(),
        }
    }
}

impl RuntimeConfig {
    pub const DEFAULT_LOG_BATCH_LIMIT: usize = 256;
    pub const DEFAULT_LOG_CAPACITY: usize = 10_000;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SESSION_TRANSPORT_MODE` - `plaintext` or `secured` (default: secured)
    /// - `SESSION_EXCESSIVE_RESOURCE_FACTOR` - resource tolerance factor (default: 2.0)
    /// - `SESSION_HARD_REJECT_KINDS` - comma-separated validation kinds that reject outright
    /// - `SESSION_LOG_BATCH_LIMIT` - combat log entries per submission (default: 256)
    /// - `SESSION_LOG_CAPACITY` - combat log entries kept per session (default: 10000)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(mode) = read_env::<TransportMode>("SESSION_TRANSPORT_MODE") {
            config.transport_mode = mode;
        }
        if let Some(factor) = read_env::<f64>("SESSION_EXCESSIVE_RESOURCE_FACTOR") {
            config.policy.excessive_resource_factor = factor.max(1.0);
        }
        if let Ok(raw) = env::var("SESSION_HARD_REJECT_KINDS") {
            config.policy.hard_reject = parse_kinds(&raw);
        }
        if let Some(limit) = read_env::<usize>("SESSION_LOG_BATCH_LIMIT") {
            config.log_batch_limit = limit.max(1);
        }
        if let Some(capacity) = read_env::<usize>("SESSION_LOG_CAPACITY") {
            config.log_capacity = capacity.max(1);
        }

        config
    }

    #[must_use]
    pub fn with_transport_mode(mut self, mode: TransportMode) -> Self {
        self.transport_mode = mode;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_log_batch_limit(mut self, limit: usize) -> Self {
        self.log_batch_limit = limit.max(1);
        self
    }

    #[must_use]
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity.max(1);
        self
    }
}

fn parse_kinds(raw: &str) -> BTreeSet<ValidationErrorKind> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| match name.parse() {
            Ok(kind) => Some(kind),
            Err(_) => {
                warn!(kind = name, "ignoring unknown validation kind");
                None
            }
        })
        .collect()
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_secured_with_standard_policy() {
        let config = RuntimeConfig::default();
        assert_eq!(config.transport_mode, TransportMode::Secured);
        assert_eq!(config.policy, ValidationPolicy::default());
        assert_eq!(config.log_batch_limit, 256);
        assert_eq!(config.log_capacity, 10_000);
    }

    #[test]
    fn kind_list_skips_unknown_names() {
        let kinds = parse_kinds("negative_resource, turn_regression,bogus,,");
        assert_eq!(kinds.len(), 2);
        assert!(kinds.contains(&ValidationErrorKind::NegativeResource));
        assert!(kinds.contains(&ValidationErrorKind::TurnRegression));
    }

    #[test]
    fn transport_mode_parses_case_insensitively() {
        assert_eq!("Plaintext".parse::<TransportMode>().unwrap(), TransportMode::Plaintext);
        assert_eq!("secured".parse::<TransportMode>().unwrap(), TransportMode::Secured);
    }
}
