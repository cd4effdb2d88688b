//! Conversion settings.

use approx::abs_diff_eq;
use serde::{Deserialize, Serialize};

/// Settings shared by every cell of a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Tolerance used when comparing anchor distances and multi-cut spacings.
    ///
    /// Zero requests exact comparison, which is appropriate for drawings on an
    /// integer grid.
    pub epsilon: f64,
    /// Whether to run the cross-primitive consistency warnings after assembly.
    pub check_consistency: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.,
            check_consistency: true,
        }
    }
}

impl ConvertConfig {
    /// Parses a configuration from TOML text. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Returns a copy of this configuration with the given tolerance.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Compares two coordinates under the configured tolerance.
    #[inline]
    pub fn approx_eq(&self, a: f64, b: f64) -> bool {
        if self.epsilon == 0. {
            a == b
        } else {
            abs_diff_eq!(a, b, epsilon = self.epsilon)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn exact_by_default() {
        let cfg = ConvertConfig::default();
        assert!(cfg.approx_eq(1.5, 1.5));
        assert!(!cfg.approx_eq(1.5, 1.5 + 1e-12));
    }

    #[test]
    fn epsilon_widens_equality() {
        let cfg = ConvertConfig::default().with_epsilon(1e-6);
        assert!(cfg.approx_eq(1.5, 1.5 + 1e-9));
        assert!(!cfg.approx_eq(1.5, 1.6));
    }

    #[test]
    fn parses_partial_toml() {
        let cfg = ConvertConfig::from_toml_str("epsilon = 0.001\n").unwrap();
        assert_eq!(cfg.epsilon, 0.001);
        assert!(cfg.check_consistency);
        assert!(ConvertConfig::from_toml_str("bogus = 1\n").is_err());
    }
}
