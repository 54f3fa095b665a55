use crate::config::ToleranceBand;
use crate::model::{AggregatedProductRange, Interval, MatchRow, SchoeckRecord, TargetSpec};

/// The acceptance window a target spans once a band is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub moment: Interval,
    pub shear: Interval,
    pub height_min: i64,
    pub height_max: i64,
}

impl Window {
    pub fn new(target: &TargetSpec, band: &ToleranceBand) -> Self {
        let height = i64::from(target.height);
        let offset = i64::from(band.height_offset);
        Self {
            moment: target.moment.scaled(band.moment_lower, band.moment_upper),
            shear: target.shear.scaled(band.shear_lower, band.shear_upper),
            height_min: height - offset,
            height_max: height + offset,
        }
    }

    pub fn admits_height(&self, height: u32) -> bool {
        (self.height_min..=self.height_max).contains(&i64::from(height))
    }

    /// Point comparison on every axis.
    pub fn admits_point(&self, moment: f64, shear: f64, height: u32) -> bool {
        self.moment.contains(moment) && self.shear.contains(shear) && self.admits_height(height)
    }

    /// Range overlap on moment and shear, point comparison on height.
    pub fn admits_range(&self, moment: &Interval, shear: &Interval, height: u32) -> bool {
        moment.overlaps(&self.moment) && shear.overlaps(&self.shear) && self.admits_height(height)
    }
}

/// Schöck rows whose point values fall inside the band around `target`.
///
/// Table order is preserved. Rows with a missing value never match. When
/// `origin` is given, the row with that identifier is flagged.
pub fn match_schoeck(
    records: &[SchoeckRecord],
    target: &TargetSpec,
    band: &ToleranceBand,
    origin: Option<&str>,
) -> Vec<MatchRow<SchoeckRecord>> {
    let window = Window::new(target, band);

    records
        .iter()
        .filter(|r| match (r.moment, r.shear, r.height) {
            (Some(m), Some(v), Some(h)) => window.admits_point(m, v, h),
            _ => false,
        })
        .map(|r| MatchRow {
            is_origin: origin.is_some_and(|o| o == r.identifier),
            record: r.clone(),
        })
        .collect()
}

/// Leviat product types whose ranges overlap the band around `target`.
pub fn match_leviat(
    ranges: &[AggregatedProductRange],
    target: &TargetSpec,
    band: &ToleranceBand,
    origin: Option<&str>,
) -> Vec<MatchRow<AggregatedProductRange>> {
    let window = Window::new(target, band);

    ranges
        .iter()
        .filter(|r| window.admits_range(&r.moment_range, &r.shear_range, r.height))
        .map(|r| MatchRow {
            is_origin: origin.is_some_and(|o| o == r.product_type_code),
            record: r.clone(),
        })
        .collect()
}
