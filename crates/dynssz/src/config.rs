//! Hasher configuration.

use serde::Deserialize;

/// Runtime switches of a [`DynSsz`](crate::DynSsz) instance.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DynSszConfig {
    /// Never use precompiled hash routines, except for `uint256` which does
    /// not depend on configuration.
    no_fast_path: bool,

    /// Emit a debug event for every value hashed.
    verbose: bool,
}

impl DynSszConfig {
    /// Constructs the default configuration: fast path on, quiet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether precompiled hash routines are skipped.
    pub fn with_no_fast_path(mut self, no_fast_path: bool) -> Self {
        self.no_fast_path = no_fast_path;
        self
    }

    /// Sets whether every hashed value is traced.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Whether precompiled hash routines are skipped.
    pub fn no_fast_path(&self) -> bool {
        self.no_fast_path
    }

    /// Whether every hashed value is traced.
    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = DynSszConfig::new().with_no_fast_path(true);
        assert!(config.no_fast_path());
        assert!(!config.verbose());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: DynSszConfig = serde_json::from_str(r#"{"verbose": true}"#).unwrap();
        assert_eq!(config, DynSszConfig::new().with_verbose(true));
    }
}
