use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ToleranceBand;
use crate::error::EquivError;

// ---------------------------------------------------------------------------
// Manufacturers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Manufacturer {
    /// Schöck Isokorb: one catalog row per physical variant.
    Schoeck,
    /// Leviat/Halfen HIT: raw variant rows aggregated per product type.
    Leviat,
}

impl std::fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schoeck => write!(f, "schoeck"),
            Self::Leviat => write!(f, "leviat"),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A Schöck row as read from the catalog files, before normalization.
#[derive(Debug, Clone)]
pub struct RawSchoeckRow {
    /// 1-based data row number across the concatenated source files.
    pub line: usize,
    pub identifier: String,
    pub moment: String,
    pub shear: String,
    pub extra: BTreeMap<String, String>,
}

/// A normalized Schöck catalog row.
///
/// `moment`, `shear` and `height` are `None` when the raw value could not be
/// normalized under the lenient policy. Such rows never match a tolerance
/// search but can still be looked up by identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoeckRecord {
    pub identifier: String,
    pub moment: Option<f64>,
    pub shear: Option<f64>,
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl SchoeckRecord {
    /// True when every value the matcher compares is present.
    pub fn is_matchable(&self) -> bool {
        self.moment.is_some() && self.shear.is_some() && self.height.is_some()
    }
}

/// A raw Leviat configuration line. Values stay as strings until the
/// preprocessor has applied the concrete class filter.
#[derive(Debug, Clone)]
pub struct VariantRecord {
    pub line: usize,
    pub concrete_class: String,
    pub product_type_code: String,
    pub moment: String,
    pub shear: String,
    pub moment_type: String,
    pub shear_type: String,
    pub height: String,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Closed interval `[min, max]`. A point value is `[v, v]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn point(value: f64) -> Self {
        Self { min: value, max: value }
    }

    /// Apply multiplicative tolerance factors: `[min * lower, max * upper]`.
    pub fn scaled(self, lower: f64, upper: f64) -> Self {
        Self {
            min: self.min * lower,
            max: self.max * upper,
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.min <= other.max && self.max >= other.min
    }

    /// Widen to include `value`.
    pub fn extend(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// One Leviat product type after aggregation of its 25/30 variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedProductRange {
    pub product_type_code: String,
    pub moment_range: Interval,
    pub shear_range: Interval,
    /// Height of the first qualifying variant in source order.
    pub height: u32,
    pub moment_type: String,
    pub shear_type: String,
    pub variant_count: usize,
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    ByCode,
    BySpecs,
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByCode => write!(f, "by_code"),
            Self::BySpecs => write!(f, "by_specs"),
        }
    }
}

impl FromStr for QueryMode {
    type Err = EquivError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "by_code" => Ok(Self::ByCode),
            "by_specs" => Ok(Self::BySpecs),
            other => Err(EquivError::InvalidQuery(format!(
                "unknown mode '{other}' (expected 'by_code' or 'by_specs')"
            ))),
        }
    }
}

/// Explicit target specification. `band` overrides the configured specs band.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecQuery {
    pub moment: f64,
    pub shear: f64,
    pub height: u32,
    pub band: Option<ToleranceBand>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    ByCode {
        code: String,
        band: Option<ToleranceBand>,
    },
    BySpecs(SpecQuery),
}

impl Query {
    pub fn mode(&self) -> QueryMode {
        match self {
            Self::ByCode { .. } => QueryMode::ByCode,
            Self::BySpecs(_) => QueryMode::BySpecs,
        }
    }
}

/// Resolved target of one matcher invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetSpec {
    pub moment: Interval,
    pub shear: Interval,
    pub height: u32,
}

impl TargetSpec {
    pub fn point(moment: f64, shear: f64, height: u32) -> Self {
        Self {
            moment: Interval::point(moment),
            shear: Interval::point(shear),
            height,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Why a manufacturer branch produced no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// The model code is not in this manufacturer's catalog.
    NotFound,
    /// The target resolved, but nothing fell inside the band.
    NoMatch,
    /// The model code is in the catalog but its structure is invalid.
    Malformed,
    /// The resolved row has no usable moment, shear or height.
    Incomplete,
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::NoMatch => write!(f, "NO_MATCH"),
            Self::Malformed => write!(f, "MALFORMED"),
            Self::Incomplete => write!(f, "INCOMPLETE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRow<T> {
    pub is_origin: bool,
    #[serde(flatten)]
    pub record: T,
}

/// One manufacturer's answer to a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    Matched {
        #[serde(skip_serializing_if = "Option::is_none")]
        origin: Option<T>,
        target: TargetSpec,
        band: ToleranceBand,
        rows: Vec<MatchRow<T>>,
    },
    Empty {
        reason: ReasonCode,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl<T> Outcome<T> {
    pub fn empty(reason: ReasonCode) -> Self {
        Self::Empty { reason, detail: None }
    }

    pub fn rows(&self) -> &[MatchRow<T>] {
        match self {
            Self::Matched { rows, .. } => rows,
            Self::Empty { .. } => &[],
        }
    }

    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            Self::Matched { .. } => None,
            Self::Empty { reason, .. } => Some(*reason),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryMeta {
    pub mode: QueryMode,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub meta: QueryMeta,
    pub schoeck: Outcome<SchoeckRecord>,
    pub leviat: Outcome<AggregatedProductRange>,
}

impl QueryResult {
    pub fn total_rows(&self) -> usize {
        self.schoeck.rows().len() + self.leviat.rows().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_overlap_is_inclusive() {
        let a = Interval::new(3.0, 3.5);
        assert!(a.overlaps(&Interval::new(3.5, 4.0)));
        assert!(a.overlaps(&Interval::new(2.0, 3.0)));
        assert!(!a.overlaps(&Interval::new(3.564, 3.708)));
        assert!(a.contains(3.0));
        assert!(a.contains(3.5));
        assert!(!a.contains(3.51));
    }

    #[test]
    fn scaled_point_interval() {
        let band = Interval::point(10.0).scaled(0.99, 1.03);
        assert!((band.min - 9.9).abs() < 1e-9);
        assert!((band.max - 10.3).abs() < 1e-9);
    }

    #[test]
    fn extend_widens_both_ends() {
        let mut i = Interval::point(3.0);
        i.extend(3.5);
        i.extend(2.5);
        assert_eq!(i, Interval::new(2.5, 3.5));
    }

    #[test]
    fn mode_parses_selector_strings() {
        assert_eq!("by_code".parse::<QueryMode>().unwrap(), QueryMode::ByCode);
        assert_eq!("by_specs".parse::<QueryMode>().unwrap(), QueryMode::BySpecs);
        assert!("by_height".parse::<QueryMode>().is_err());
    }

    #[test]
    fn empty_outcome_serializes_reason_code() {
        let outcome: Outcome<SchoeckRecord> = Outcome::empty(ReasonCode::NotFound);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "empty");
        assert_eq!(json["reason"], "NOT_FOUND");
        assert!(json.get("detail").is_none());
    }

    #[test]
    fn match_row_flattens_record() {
        let row = MatchRow {
            is_origin: true,
            record: SchoeckRecord {
                identifier: "T-H180".into(),
                moment: Some(12.5),
                shear: Some(48.0),
                height: Some(180),
                extra: BTreeMap::new(),
            },
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["is_origin"], true);
        assert_eq!(json["identifier"], "T-H180");
        assert_eq!(json["height"], 180);
    }
}
