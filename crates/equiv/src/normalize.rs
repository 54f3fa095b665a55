//! Numeric cleanup shared by both catalogs, plus the Schöck-specific
//! normalization of raw rows into [`SchoeckRecord`]s.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::{ParsePolicy, PolicyConfig};
use crate::error::EquivError;
use crate::model::{Manufacturer, RawSchoeckRow, SchoeckRecord};

fn height_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"H(\d+)").unwrap())
}

/// Placeholders catalogs use for "no value", read as zero.
const DASH_PLACEHOLDERS: &[&str] = &["-", "\u{2013}", "\u{2014}"];

/// Normalize a locale-formatted resistance value.
///
/// Comma decimals become points, `±` markers are stripped and a bare dash is
/// zero. Returns `None` for anything that is still not a finite number,
/// including a dash anywhere else in the value.
pub fn normalize_resistance(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', ".").replace('±', "");
    let cleaned = cleaned.trim();

    if DASH_PLACEHOLDERS.contains(&cleaned) {
        return Some(0.0);
    }
    if cleaned.is_empty() || cleaned.contains(['-', '\u{2013}', '\u{2014}']) {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Leviat variant values: every dash is dropped rather than rejected, so a
/// signed `-12,5` reads as `12.5`. A bare dash is still zero.
pub fn normalize_variant_resistance(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if DASH_PLACEHOLDERS.contains(&trimmed) {
        return Some(0.0);
    }
    normalize_resistance(&trimmed.replace(['-', '\u{2013}', '\u{2014}'], ""))
}

/// First `H<digits>` token in a Schöck identifier.
pub fn extract_height(identifier: &str) -> Option<u32> {
    height_token()
        .captures(identifier)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse an integer height cell. Spreadsheet exports sometimes write whole
/// numbers as `160.0`; those are accepted, fractional heights are not.
pub fn parse_height_cell(raw: &str) -> Option<u32> {
    let cleaned = raw.trim();
    if let Ok(h) = cleaned.parse::<u32>() {
        return Some(h);
    }
    let value = cleaned.replace(',', ".").parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

/// Apply `policy` to a field that failed to normalize.
///
/// Strict turns the failure into a [`EquivError::DataFormat`]; lenient logs
/// it and lets the caller continue with a missing value.
pub(crate) fn reject_field(
    policy: ParsePolicy,
    manufacturer: Manufacturer,
    line: usize,
    record: &str,
    field: &'static str,
    value: &str,
) -> Result<(), EquivError> {
    match policy {
        ParsePolicy::Strict => Err(EquivError::DataFormat {
            manufacturer,
            line,
            record: record.to_string(),
            field,
            value: value.to_string(),
        }),
        ParsePolicy::Lenient => {
            log::warn!(
                "{manufacturer} row {line} ('{record}'): unparsable {field} '{value}', excluded from matching"
            );
            Ok(())
        }
    }
}

fn resistance_field(
    raw: &str,
    row: &RawSchoeckRow,
    field: &'static str,
    policy: ParsePolicy,
) -> Result<Option<f64>, EquivError> {
    match normalize_resistance(raw) {
        Some(v) => Ok(Some(v)),
        None => {
            reject_field(policy, Manufacturer::Schoeck, row.line, &row.identifier, field, raw)?;
            Ok(None)
        }
    }
}

/// Normalize raw Schöck rows, keeping source order.
pub fn normalize_schoeck(
    rows: Vec<RawSchoeckRow>,
    policy: &PolicyConfig,
) -> Result<Vec<SchoeckRecord>, EquivError> {
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let moment = resistance_field(&row.moment, &row, "moment", policy.resistance)?;
        let shear = resistance_field(&row.shear, &row, "shear", policy.resistance)?;

        let height = extract_height(&row.identifier);
        if height.is_none() {
            reject_field(
                policy.height,
                Manufacturer::Schoeck,
                row.line,
                &row.identifier,
                "height",
                &row.identifier,
            )?;
        }

        records.push(SchoeckRecord {
            identifier: row.identifier,
            moment,
            shear,
            height,
            extra: row.extra,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn raw(line: usize, id: &str, moment: &str, shear: &str) -> RawSchoeckRow {
        RawSchoeckRow {
            line,
            identifier: id.into(),
            moment: moment.into(),
            shear: shear.into(),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn resistance_locale_cleanup() {
        assert_eq!(normalize_resistance("12,5"), Some(12.5));
        assert_eq!(normalize_resistance(" ±34,8 "), Some(34.8));
        assert_eq!(normalize_resistance("48"), Some(48.0));
        assert_eq!(normalize_resistance("-"), Some(0.0));
        assert_eq!(normalize_resistance(" – "), Some(0.0));
    }

    #[test]
    fn resistance_rejects_stray_dash_and_garbage() {
        assert_eq!(normalize_resistance("12-5"), None);
        assert_eq!(normalize_resistance("-12,5"), None);
        assert_eq!(normalize_resistance(""), None);
        assert_eq!(normalize_resistance("n/a"), None);
        assert_eq!(normalize_resistance("inf"), None);
        assert_eq!(normalize_resistance("NaN"), None);
    }

    #[test]
    fn variant_resistance_drops_every_dash() {
        assert_eq!(normalize_variant_resistance("-12,5"), Some(12.5));
        assert_eq!(normalize_variant_resistance("\u{2013}13,0"), Some(13.0));
        assert_eq!(normalize_variant_resistance("1-2"), Some(12.0));
        assert_eq!(normalize_variant_resistance(" - "), Some(0.0));
        assert_eq!(normalize_variant_resistance("--"), None);
        assert_eq!(normalize_variant_resistance("n/a"), None);
    }

    #[test]
    fn height_from_identifier() {
        assert_eq!(extract_height("T-D-MM1-VV2-REI120-CV35-X80-H170-6.0"), Some(170));
        assert_eq!(extract_height("A-H100"), Some(100));
        // First occurrence wins.
        assert_eq!(extract_height("XT-H200-H180"), Some(200));
        assert_eq!(extract_height("T-D-MM1-VV2"), None);
        assert_eq!(extract_height("T-H-180"), None);
    }

    #[test]
    fn height_cell_accepts_whole_floats() {
        assert_eq!(parse_height_cell("160"), Some(160));
        assert_eq!(parse_height_cell(" 180.0 "), Some(180));
        assert_eq!(parse_height_cell("180,0"), Some(180));
        assert_eq!(parse_height_cell("180.5"), None);
        assert_eq!(parse_height_cell("-20"), None);
        assert_eq!(parse_height_cell(""), None);
    }

    #[test]
    fn lenient_resistance_keeps_row_without_value() {
        let rows = vec![
            raw(1, "T-H180", "12,5", "48"),
            raw(2, "T-H200", "tbd", "50"),
        ];
        let records = normalize_schoeck(rows, &PolicyConfig::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].moment, Some(12.5));
        assert!(records[0].is_matchable());
        assert_eq!(records[1].moment, None);
        assert_eq!(records[1].shear, Some(50.0));
        assert!(!records[1].is_matchable());
    }

    #[test]
    fn strict_resistance_fails_load() {
        let policy = PolicyConfig {
            resistance: ParsePolicy::Strict,
            height: ParsePolicy::Strict,
        };
        let rows = vec![raw(1, "T-H180", "12,5", "4-8")];
        let err = normalize_schoeck(rows, &policy).unwrap_err();
        assert!(err.is_data_error());
        let msg = err.to_string();
        assert!(msg.contains("shear"), "{msg}");
        assert!(msg.contains("'4-8'"), "{msg}");
    }

    #[test]
    fn strict_height_requires_token() {
        let rows = vec![raw(7, "T-D-MM1", "12,5", "48")];
        let err = normalize_schoeck(rows, &PolicyConfig::default()).unwrap_err();
        match err {
            EquivError::DataFormat { line, field, .. } => {
                assert_eq!(line, 7);
                assert_eq!(field, "height");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn lenient_height_yields_missing_height() {
        let policy = PolicyConfig {
            resistance: ParsePolicy::Lenient,
            height: ParsePolicy::Lenient,
        };
        let rows = vec![raw(1, "T-D-MM1", "12,5", "48")];
        let records = normalize_schoeck(rows, &policy).unwrap();
        assert_eq!(records[0].height, None);
        assert!(!records[0].is_matchable());
    }
}
