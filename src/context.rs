use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::equality::{CustomEqualityTester, MatchersUtil};
use crate::errors::{MatchError, Result};
use crate::value::Value;

/// Knobs for message rendering and evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Nesting level past which composites print as their kind name.
    pub max_pretty_print_depth: usize,
    pub max_pretty_print_array_length: usize,
    pub max_pretty_print_object_keys: usize,
    /// Decimal digits `toBeCloseTo` checks when no precision is given.
    pub default_close_to_precision: i32,
    /// Turn a panic inside `compare` into a failing verdict.
    pub catch_matcher_panics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_pretty_print_depth: 40,
            max_pretty_print_array_length: 100,
            max_pretty_print_object_keys: 100,
            default_close_to_precision: 2,
            catch_matcher_panics: true,
        }
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| MatchError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MatchError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

/// What every matcher factory receives: the comparison toolkit and the
/// custom equality testers active in the current scope, innermost first.
#[derive(Clone, Default)]
pub struct ComparisonContext {
    pub util: MatchersUtil,
    pub custom_equality_testers: Vec<Arc<dyn CustomEqualityTester>>,
}

impl ComparisonContext {
    pub fn new(util: MatchersUtil, custom_equality_testers: Vec<Arc<dyn CustomEqualityTester>>) -> Self {
        Self { util, custom_equality_testers }
    }

    pub fn equals(&self, a: &Value, b: &Value) -> bool {
        self.util.equals(a, b, &self.custom_equality_testers)
    }

    pub fn contains(&self, haystack: &Value, needle: &Value) -> bool {
        self.util.contains(haystack, needle, &self.custom_equality_testers)
    }

    pub fn pp(&self, value: &Value) -> String {
        self.util.pp(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("max_pretty_print_depth = 3\ncatch_matcher_panics = false\n").unwrap();
        assert_eq!(config.max_pretty_print_depth, 3);
        assert!(!config.catch_matcher_panics);
        assert_eq!(config.default_close_to_precision, 2);
    }

    #[test]
    fn rejects_bad_toml() {
        let err = Config::from_toml_str("max_pretty_print_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, MatchError::Config(_)));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = Config::load(Path::new("/nonexistent/bddm.toml")).unwrap_err();
        assert!(matches!(err, MatchError::Config(_)));
    }
}
