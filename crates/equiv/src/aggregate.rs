use std::collections::BTreeMap;

use crate::config::{ParsePolicy, PolicyConfig};
use crate::error::EquivError;
use crate::model::{AggregatedProductRange, Interval, Manufacturer, VariantRecord};
use crate::normalize::{normalize_variant_resistance, parse_height_cell, reject_field};

/// The only concrete class whose variants are aggregated. Compared verbatim.
pub const CONCRETE_CLASS_FILTER: &str = "25/30";

/// Group Leviat variants by product type into moment/shear ranges.
///
/// Rows outside [`CONCRETE_CLASS_FILTER`] are dropped before any value is
/// parsed. Each group's height is taken from its first qualifying row in
/// source order. Groups come out ordered by product type code.
pub fn aggregate_variants(
    rows: &[VariantRecord],
    policy: &PolicyConfig,
) -> Result<Vec<AggregatedProductRange>, EquivError> {
    let mut groups: BTreeMap<&str, AggregatedProductRange> = BTreeMap::new();
    let mut filtered_out = 0usize;

    for row in rows {
        if row.concrete_class != CONCRETE_CLASS_FILTER {
            filtered_out += 1;
            continue;
        }

        let Some(moment) = normalize_variant_resistance(&row.moment) else {
            reject(row, "moment", &row.moment, policy.resistance)?;
            continue;
        };
        let Some(shear) = normalize_variant_resistance(&row.shear) else {
            reject(row, "shear", &row.shear, policy.resistance)?;
            continue;
        };
        let Some(height) = parse_height_cell(&row.height) else {
            reject(row, "height", &row.height, policy.height)?;
            continue;
        };

        groups
            .entry(row.product_type_code.as_str())
            .and_modify(|g| {
                g.moment_range.extend(moment);
                g.shear_range.extend(shear);
                g.variant_count += 1;
            })
            .or_insert_with(|| AggregatedProductRange {
                product_type_code: row.product_type_code.clone(),
                moment_range: Interval::point(moment),
                shear_range: Interval::point(shear),
                height,
                moment_type: row.moment_type.clone(),
                shear_type: row.shear_type.clone(),
                variant_count: 1,
            });
    }

    log::debug!(
        "aggregated {} leviat variants into {} product types ({} outside concrete class {})",
        rows.len() - filtered_out,
        groups.len(),
        filtered_out,
        CONCRETE_CLASS_FILTER,
    );

    Ok(groups.into_values().collect())
}

fn reject(
    row: &VariantRecord,
    field: &'static str,
    value: &str,
    policy: ParsePolicy,
) -> Result<(), EquivError> {
    reject_field(
        policy,
        Manufacturer::Leviat,
        row.line,
        &row.product_type_code,
        field,
        value,
    )
}
