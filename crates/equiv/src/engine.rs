use std::sync::Arc;

use serde::Serialize;

use crate::aggregate::aggregate_variants;
use crate::code::ModelCode;
use crate::config::{PolicyConfig, ToleranceBand, ToleranceConfig};
use crate::error::EquivError;
use crate::matcher::{match_leviat, match_schoeck};
use crate::model::{
    AggregatedProductRange, MatchRow, Outcome, Query, QueryMeta, QueryMode, QueryResult, RawSchoeckRow,
    ReasonCode, SchoeckRecord, SpecQuery, TargetSpec, VariantRecord,
};
use crate::normalize::normalize_schoeck;

// ---------------------------------------------------------------------------
// Catalogs
// ---------------------------------------------------------------------------

/// Both manufacturer catalogs, immutable once built.
///
/// The Leviat aggregation is a pure function of the raw variants; it is
/// computed here once and never touched again.
#[derive(Debug, Clone)]
pub struct Catalogs {
    schoeck: Vec<SchoeckRecord>,
    variants: Vec<VariantRecord>,
    leviat: Vec<AggregatedProductRange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    pub schoeck_rows: usize,
    pub schoeck_matchable: usize,
    pub leviat_variants: usize,
    pub leviat_product_types: usize,
}

impl Catalogs {
    pub fn new(
        schoeck: Vec<SchoeckRecord>,
        variants: Vec<VariantRecord>,
        policy: &PolicyConfig,
    ) -> Result<Self, EquivError> {
        let leviat = aggregate_variants(&variants, policy)?;
        Ok(Self {
            schoeck,
            variants,
            leviat,
        })
    }

    /// Normalize raw Schöck rows and aggregate Leviat variants.
    pub fn from_raw(
        schoeck: Vec<RawSchoeckRow>,
        variants: Vec<VariantRecord>,
        policy: &PolicyConfig,
    ) -> Result<Self, EquivError> {
        let schoeck = normalize_schoeck(schoeck, policy)?;
        Self::new(schoeck, variants, policy)
    }

    pub fn schoeck(&self) -> &[SchoeckRecord] {
        &self.schoeck
    }

    pub fn variants(&self) -> &[VariantRecord] {
        &self.variants
    }

    pub fn leviat(&self) -> &[AggregatedProductRange] {
        &self.leviat
    }

    /// First Schöck row whose identifier equals `code`.
    pub fn find_schoeck(&self, code: &str) -> Option<&SchoeckRecord> {
        self.schoeck.iter().find(|r| r.identifier == code)
    }

    pub fn find_leviat(&self, code: &str) -> Option<&AggregatedProductRange> {
        self.leviat.iter().find(|r| r.product_type_code == code)
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            schoeck_rows: self.schoeck.len(),
            schoeck_matchable: self.schoeck.iter().filter(|r| r.is_matchable()).count(),
            leviat_variants: self.variants.len(),
            leviat_product_types: self.leviat.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Query orchestration
// ---------------------------------------------------------------------------

/// Everything a query needs: the loaded catalogs and the configured bands.
#[derive(Debug, Clone)]
pub struct QueryContext {
    catalogs: Arc<Catalogs>,
    tolerance: ToleranceConfig,
}

impl QueryContext {
    pub fn new(catalogs: Arc<Catalogs>, tolerance: ToleranceConfig) -> Self {
        Self { catalogs, tolerance }
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn tolerance(&self) -> &ToleranceConfig {
        &self.tolerance
    }

    /// Run a query in either mode.
    pub fn run(&self, query: &Query) -> Result<QueryResult, EquivError> {
        match query {
            Query::ByCode { code, band } => self.by_code(code, band.as_ref()),
            Query::BySpecs(spec) => self.by_specs(spec),
        }
    }

    /// Resolve `code` in each catalog independently and search around it.
    ///
    /// A code missing from one catalog yields that side's `NOT_FOUND` outcome
    /// and never blocks the other side.
    pub fn by_code(
        &self,
        code: &str,
        band: Option<&ToleranceBand>,
    ) -> Result<QueryResult, EquivError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(EquivError::InvalidQuery("model code is empty".into()));
        }
        let band = band.copied().unwrap_or(self.tolerance.code);
        band.validate()?;

        let schoeck = self.schoeck_by_code(code, &band);
        let leviat = self.leviat_by_code(code, &band);

        log::info!(
            "by_code '{code}': schoeck {}, leviat {}",
            describe(&schoeck),
            describe(&leviat),
        );

        Ok(self.result(QueryMode::ByCode, schoeck, leviat))
    }

    /// Search both catalogs around an explicit target.
    pub fn by_specs(&self, spec: &SpecQuery) -> Result<QueryResult, EquivError> {
        for (field, value) in [("moment", spec.moment), ("shear", spec.shear)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(EquivError::InvalidQuery(format!(
                    "{field} must be a positive number, got {value}"
                )));
            }
        }
        let band = spec.band.unwrap_or(self.tolerance.specs);
        band.validate()?;

        let target = TargetSpec::point(spec.moment, spec.shear, spec.height);
        let schoeck = finish(
            None,
            target,
            band,
            match_schoeck(self.catalogs.schoeck(), &target, &band, None),
        );
        let leviat = finish(
            None,
            target,
            band,
            match_leviat(self.catalogs.leviat(), &target, &band, None),
        );

        log::info!(
            "by_specs moment={} shear={} height={}: schoeck {}, leviat {}",
            spec.moment,
            spec.shear,
            spec.height,
            describe(&schoeck),
            describe(&leviat),
        );

        Ok(self.result(QueryMode::BySpecs, schoeck, leviat))
    }

    fn schoeck_by_code(&self, code: &str, band: &ToleranceBand) -> Outcome<SchoeckRecord> {
        let Some(origin) = self.catalogs.find_schoeck(code) else {
            return Outcome::empty(ReasonCode::NotFound);
        };

        // The target height comes from the code itself, not the identifier scan.
        let parsed = match ModelCode::parse(code) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Outcome::Empty {
                    reason: ReasonCode::Malformed,
                    detail: Some(e.to_string()),
                }
            }
        };

        let (Some(moment), Some(shear), Some(height)) = (origin.moment, origin.shear, origin.height)
        else {
            return Outcome::Empty {
                reason: ReasonCode::Incomplete,
                detail: Some(format!("'{code}' has no parsed moment/shear/height values")),
            };
        };

        // A stored height from an earlier H token would leave the origin outside its own window.
        if height != parsed.height() {
            return Outcome::Empty {
                reason: ReasonCode::Malformed,
                detail: Some(format!(
                    "'{code}' has height segment H{} but its first height token reads H{height}",
                    parsed.height()
                )),
            };
        }

        let target = TargetSpec::point(moment, shear, height);
        let rows = match_schoeck(self.catalogs.schoeck(), &target, band, Some(code));
        finish(Some(origin.clone()), target, *band, rows)
    }

    fn leviat_by_code(&self, code: &str, band: &ToleranceBand) -> Outcome<AggregatedProductRange> {
        let Some(origin) = self.catalogs.find_leviat(code) else {
            return Outcome::empty(ReasonCode::NotFound);
        };

        let target = TargetSpec {
            moment: origin.moment_range,
            shear: origin.shear_range,
            height: origin.height,
        };
        let rows = match_leviat(self.catalogs.leviat(), &target, band, Some(code));
        finish(Some(origin.clone()), target, *band, rows)
    }

    fn result(
        &self,
        mode: QueryMode,
        schoeck: Outcome<SchoeckRecord>,
        leviat: Outcome<AggregatedProductRange>,
    ) -> QueryResult {
        QueryResult {
            meta: QueryMeta {
                mode,
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
            },
            schoeck,
            leviat,
        }
    }
}

fn finish<T>(
    origin: Option<T>,
    target: TargetSpec,
    band: ToleranceBand,
    rows: Vec<MatchRow<T>>,
) -> Outcome<T> {
    if rows.is_empty() {
        return Outcome::empty(ReasonCode::NoMatch);
    }
    Outcome::Matched {
        origin,
        target,
        band,
        rows,
    }
}

fn describe<T>(outcome: &Outcome<T>) -> String {
    match outcome {
        Outcome::Matched { rows, .. } => format!("{} row(s)", rows.len()),
        Outcome::Empty { reason, .. } => reason.to_string(),
    }
}
