//! Construction-time configuration, validated once up front rather than
//! re-checked on every access. Mirrors the way `fuel-vm`'s `InterpreterParams`
//! collects the knobs a single interpreter instance is built with.

use regex::Regex;
use std::path::PathBuf;

use crate::consts::MAX_CYCLES;

/// Configuration accepted when constructing an [`crate::Interpreter`].
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Dispatch-cycle budget for a single call into the step loop.
    pub max_cycles: u32,
    /// Patterns a path must match at least one of to be eligible for
    /// `IOLOAD`.
    pub load_allowlist: Vec<Regex>,
    /// Patterns a path must match at least one of to be eligible for
    /// `IOSAVE`.
    pub save_allowlist: Vec<Regex>,
    /// Directory all relative paths resolve against, and the containment
    /// boundary canonicalized paths must stay inside of.
    pub working_dir: PathBuf,
    /// How many `IOLOAD` calls may be nested inside one another.
    pub max_ioload_depth: u8,
    /// Start with instruction tracing enabled.
    pub trace: bool,
}

/// Why a [`VmConfig`] was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max_cycles must be nonzero")]
    ZeroCycleBudget,
    #[error("max_ioload_depth must be nonzero")]
    ZeroIoloadDepth,
    #[error("working_dir {0:?} does not exist")]
    MissingWorkingDir(PathBuf),
    #[error("invalid allow-list pattern {pattern:?}: {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl VmConfig {
    /// Build a config from string patterns, compiling each into a [`Regex`].
    pub fn new(
        max_cycles: u32,
        load_allowlist: &[&str],
        save_allowlist: &[&str],
        working_dir: PathBuf,
        max_ioload_depth: u8,
        trace: bool,
    ) -> Result<Self, ConfigError> {
        let compile = |patterns: &[&str]| -> Result<Vec<Regex>, ConfigError> {
            patterns
                .iter()
                .map(|pattern| {
                    Regex::new(pattern).map_err(|source| ConfigError::BadPattern {
                        pattern: (*pattern).to_owned(),
                        source,
                    })
                })
                .collect()
        };
        let config = Self {
            max_cycles,
            load_allowlist: compile(load_allowlist)?,
            save_allowlist: compile(save_allowlist)?,
            working_dir,
            max_ioload_depth,
            trace,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cycles == 0 {
            return Err(ConfigError::ZeroCycleBudget);
        }
        if self.max_ioload_depth == 0 {
            return Err(ConfigError::ZeroIoloadDepth);
        }
        if !self.working_dir.is_dir() {
            return Err(ConfigError::MissingWorkingDir(self.working_dir.clone()));
        }
        Ok(())
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_cycles: MAX_CYCLES,
            load_allowlist: vec![Regex::new(r".+\.mkb$").expect("static pattern is valid")],
            save_allowlist: vec![Regex::new(r"^self_hosted\.rom$").expect("static pattern is valid")],
            working_dir: PathBuf::from("."),
            max_ioload_depth: 1,
            trace: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = VmConfig::default();
        assert_eq!(config.max_cycles, MAX_CYCLES);
        assert_eq!(config.max_ioload_depth, 1);
    }

    #[test]
    fn zero_cycle_budget_is_rejected() {
        let err = VmConfig::new(0, &[], &[], PathBuf::from("."), 1, false).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroCycleBudget));
    }

    #[test]
    fn bad_pattern_is_rejected() {
        let err = VmConfig::new(1, &["("], &[], PathBuf::from("."), 1, false).unwrap_err();
        assert!(matches!(err, ConfigError::BadPattern { .. }));
    }
}
