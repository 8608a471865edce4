//! OpenFOAM dictionary writers
//!
//! All writers are pure: they render into a `String` that the caller writes
//! to disk in one go. Numeric layout is controlled by [`OutputConfig`].

mod fem;
mod format;
mod turbulence;

pub use fem::write_fem_dictionary;
pub use format::{
    format_index, format_sci, format_shortest, write_indices, write_inline_vector, write_rows,
    write_scalars, write_triplets,
};
pub use turbulence::write_turbulence_dictionary;

use crate::error::{OutputError, Result};
use serde::{Deserialize, Serialize};

/// Separator line closing the dictionary header
pub const SEPARATOR: &str =
    "// * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * //";

/// FoamFile header of an `object random` dictionary in `constant/`
pub fn default_banner() -> String {
    [
        r"/*--------------------------------*- C++ -*----------------------------------*\",
        r"|  Synthetic inflow data                                                      |",
        r"\*---------------------------------------------------------------------------*/",
        "FoamFile",
        "{",
        "    version     2.0;",
        "    format      ascii;",
        "    class       dictionary;",
        "    location    \"constant\";",
        "    object      random;",
        "}",
        SEPARATOR,
    ]
    .join("\n")
}

/// Formatting settings shared by the dictionary writers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Header written at the top of every dictionary
    pub banner: String,
    /// Significant digits of the scientific notation
    pub significant_digits: usize,
    /// Value of the `corr` entry; 0 disables the divergence correction
    pub correction_level: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            banner: default_banner(),
            significant_digits: 5,
            correction_level: 1.0,
        }
    }
}

impl OutputConfig {
    /// Replace the header
    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Set the number of significant digits
    pub fn significant_digits(mut self, digits: usize) -> Self {
        self.significant_digits = digits;
        self
    }

    /// Set the `corr` level
    pub fn correction_level(mut self, level: f64) -> Self {
        self.correction_level = level;
        self
    }

    /// Check that the settings can be rendered
    pub fn validate(&self) -> Result<()> {
        // f64 carries 17 significant decimal digits at most
        if !(1..=17).contains(&self.significant_digits) {
            return Err(OutputError::InvalidDigits(self.significant_digits));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_and_validation() {
        let config = OutputConfig::default();
        assert_eq!(config.significant_digits, 5);
        assert_eq!(config.correction_level, 1.0);
        assert!(config.banner.contains("object      random;"));
        assert!(config.banner.ends_with(SEPARATOR));
        assert!(config.validate().is_ok());

        assert!(matches!(
            OutputConfig::default().significant_digits(0).validate(),
            Err(OutputError::InvalidDigits(0))
        ));
    }

    #[test]
    fn test_config_json_defaults() {
        let config: OutputConfig = serde_json::from_str(r#"{"significant_digits": 7}"#).unwrap();
        assert_eq!(config.significant_digits, 7);
        assert_eq!(config.correction_level, 1.0);
        assert_eq!(config.banner, default_banner());
    }
}
