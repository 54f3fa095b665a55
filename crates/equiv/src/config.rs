use serde::{Deserialize, Serialize};

use crate::error::EquivError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Catalog config: where the two manufacturer catalogs live, how their
/// columns are named, how strictly fields are parsed and which tolerance
/// bands queries use.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub schoeck: SchoeckSource,
    pub leviat: LeviatSource,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
}

fn default_name() -> String {
    "catalog".into()
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchoeckSource {
    /// Files in concatenation order. Every file after the first has its
    /// first data row dropped.
    pub files: Vec<String>,
    /// Field delimiter; sniffed per file when absent.
    #[serde(default)]
    pub delimiter: Option<char>,
    #[serde(default)]
    pub columns: SchoeckColumns,
    /// Raw columns never carried into results.
    #[serde(default = "default_hidden_columns")]
    pub hidden_columns: Vec<String>,
}

fn default_hidden_columns() -> Vec<String> {
    vec!["TableName".into()]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchoeckColumns {
    pub identifier: String,
    pub moment: String,
    pub shear: String,
}

impl Default for SchoeckColumns {
    fn default() -> Self {
        Self {
            identifier: "Encoded".into(),
            moment: "MrD".into(),
            shear: "vRd".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeviatSource {
    pub files: Vec<String>,
    #[serde(default)]
    pub delimiter: Option<char>,
    #[serde(default)]
    pub columns: LeviatColumns,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LeviatColumns {
    pub concrete_class: String,
    pub moment: String,
    pub shear: String,
    pub moment_type: String,
    pub shear_type: String,
    pub product_type: String,
    pub height: String,
}

impl Default for LeviatColumns {
    fn default() -> Self {
        Self {
            concrete_class: "c".into(),
            moment: "mrd".into(),
            shear: "vrd".into(),
            moment_type: "mrd_type".into(),
            shear_type: "vrd_type".into(),
            product_type: "new_product_type".into(),
            height: "hh".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse policy
// ---------------------------------------------------------------------------

/// What happens when a catalog field cannot be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsePolicy {
    /// Fail the whole load.
    Strict,
    /// Keep the row out of tolerance matching and carry on.
    Lenient,
}

impl std::fmt::Display for ParsePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Moment and shear resistance fields.
    pub resistance: ParsePolicy,
    /// Height derived from the Schöck identifier / the Leviat height column.
    pub height: ParsePolicy,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            resistance: ParsePolicy::Lenient,
            height: ParsePolicy::Strict,
        }
    }
}

// ---------------------------------------------------------------------------
// Tolerance
// ---------------------------------------------------------------------------

/// Multiplicative bounds on moment and shear plus an additive height window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToleranceBand {
    pub moment_lower: f64,
    pub moment_upper: f64,
    pub shear_lower: f64,
    pub shear_upper: f64,
    pub height_offset: u32,
}

impl Default for ToleranceBand {
    fn default() -> Self {
        Self {
            moment_lower: 0.99,
            moment_upper: 1.03,
            shear_lower: 0.99,
            shear_upper: 1.03,
            height_offset: 20,
        }
    }
}

impl ToleranceBand {
    pub fn validate(&self) -> Result<(), EquivError> {
        check_factors("moment", self.moment_lower, self.moment_upper)?;
        check_factors("shear", self.shear_lower, self.shear_upper)
    }
}

fn check_factors(field: &str, lower: f64, upper: f64) -> Result<(), EquivError> {
    if !lower.is_finite() || !upper.is_finite() || lower <= 0.0 || upper <= 0.0 {
        return Err(EquivError::ConfigValidation(format!(
            "{field} factors must be finite and positive, got {lower}..{upper}"
        )));
    }
    if lower > upper {
        return Err(EquivError::ConfigValidation(format!(
            "{field}_lower ({lower}) exceeds {field}_upper ({upper})"
        )));
    }
    Ok(())
}

/// Bands for the two query modes. Code lookups get their own band so the
/// self-lookup lower bound (0.99 vs 1.00) is a deployment choice.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToleranceConfig {
    pub specs: ToleranceBand,
    pub code: ToleranceBand,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl CatalogConfig {
    pub fn from_toml(input: &str) -> Result<Self, EquivError> {
        let config: CatalogConfig =
            toml::from_str(input).map_err(|e| EquivError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EquivError> {
        if self.schoeck.files.is_empty() {
            return Err(EquivError::ConfigValidation(
                "schoeck: at least one file is required".into(),
            ));
        }
        if self.leviat.files.is_empty() {
            return Err(EquivError::ConfigValidation(
                "leviat: at least one file is required".into(),
            ));
        }

        for (source, delimiter) in [
            ("schoeck", self.schoeck.delimiter),
            ("leviat", self.leviat.delimiter),
        ] {
            if let Some(d) = delimiter {
                if !d.is_ascii() {
                    return Err(EquivError::ConfigValidation(format!(
                        "{source}: delimiter must be a single ASCII character, got '{d}'"
                    )));
                }
            }
        }

        self.tolerance.specs.validate()?;
        self.tolerance.code.validate()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[schoeck]
files = ["Isokorb_T.csv", "Isokorb_XT.csv"]

[leviat]
files = ["HIT_HP.csv", "HIT_SP.csv"]
"#;

    #[test]
    fn parse_minimal_uses_defaults() {
        let config = CatalogConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.name, "catalog");
        assert_eq!(config.schoeck.files.len(), 2);
        assert_eq!(config.schoeck.columns.identifier, "Encoded");
        assert_eq!(config.schoeck.columns.moment, "MrD");
        assert_eq!(config.schoeck.hidden_columns, vec!["TableName"]);
        assert_eq!(config.leviat.columns.concrete_class, "c");
        assert_eq!(config.leviat.columns.product_type, "new_product_type");
        assert_eq!(config.leviat.columns.height, "hh");
        assert_eq!(config.policy.resistance, ParsePolicy::Lenient);
        assert_eq!(config.policy.height, ParsePolicy::Strict);
        assert_eq!(config.tolerance.specs, ToleranceBand::default());
        assert_eq!(config.tolerance.code, ToleranceBand::default());
    }

    #[test]
    fn parse_partial_band_override() {
        let input = format!(
            r#"{MINIMAL}
[tolerance.code]
moment_lower = 1.0

[policy]
resistance = "strict"
"#
        );
        let config = CatalogConfig::from_toml(&input).unwrap();
        assert_eq!(config.tolerance.code.moment_lower, 1.0);
        assert_eq!(config.tolerance.code.moment_upper, 1.03);
        assert_eq!(config.tolerance.code.height_offset, 20);
        assert_eq!(config.tolerance.specs.moment_lower, 0.99);
        assert_eq!(config.policy.resistance, ParsePolicy::Strict);
        assert_eq!(config.policy.height, ParsePolicy::Strict);
    }

    #[test]
    fn parse_custom_columns_and_delimiter() {
        let input = r#"
name = "HIT only"

[schoeck]
files = ["a.csv"]
delimiter = ";"
hidden_columns = []
[schoeck.columns]
identifier = "Typ"

[leviat]
files = ["b.csv"]
[leviat.columns]
height = "H"
"#;
        let config = CatalogConfig::from_toml(input).unwrap();
        assert_eq!(config.name, "HIT only");
        assert_eq!(config.schoeck.delimiter, Some(';'));
        assert!(config.schoeck.hidden_columns.is_empty());
        assert_eq!(config.schoeck.columns.identifier, "Typ");
        assert_eq!(config.schoeck.columns.shear, "vRd");
        assert_eq!(config.leviat.columns.height, "H");
        assert_eq!(config.leviat.columns.moment, "mrd");
    }

    #[test]
    fn reject_missing_files() {
        let input = r#"
[schoeck]
files = []

[leviat]
files = ["b.csv"]
"#;
        let err = CatalogConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("schoeck: at least one file"));
    }

    #[test]
    fn reject_inverted_band() {
        let input = format!(
            r#"{MINIMAL}
[tolerance.specs]
shear_lower = 1.05
shear_upper = 1.03
"#
        );
        let err = CatalogConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("shear_lower"));
    }

    #[test]
    fn reject_unknown_policy_value() {
        let input = format!(
            r#"{MINIMAL}
[policy]
height = "coerce"
"#
        );
        assert!(CatalogConfig::from_toml(&input).is_err());
    }

    #[test]
    fn reject_unknown_key() {
        let input = format!(
            r#"{MINIMAL}
[tolerance.specs]
moment_lowr = 0.98
"#
        );
        let err = CatalogConfig::from_toml(&input);
        assert!(err.is_err(), "typo in band key should fail deserialization");
    }

    #[test]
    fn band_rejects_non_positive_factor() {
        let band = ToleranceBand {
            moment_lower: 0.0,
            ..ToleranceBand::default()
        };
        assert!(band.validate().is_err());
        assert!(ToleranceBand::default().validate().is_ok());
    }
}
