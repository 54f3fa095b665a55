//! Human-readable output. JSON output goes through serde directly.

use std::fmt::Write;

use isofind_equiv::engine::CatalogSummary;
use isofind_equiv::{
    AggregatedProductRange, Interval, ModelCode, Outcome, QueryResult, SchoeckRecord, TargetSpec,
    ToleranceBand,
};

const ORIGIN_MARK: &str = "*";

pub fn result(result: &QueryResult) -> String {
    let mut out = String::new();
    schoeck_block(&mut out, &result.schoeck);
    out.push('\n');
    leviat_block(&mut out, &result.leviat);
    out
}

fn outcome_header<T>(out: &mut String, label: &str, outcome: &Outcome<T>) -> bool {
    match outcome {
        Outcome::Matched { target, band, rows, .. } => {
            let _ = writeln!(out, "{label}: {} product(s)", rows.len());
            let _ = writeln!(out, "  target {}", target_line(target));
            let _ = writeln!(out, "  band   {}", band_line(band));
            true
        }
        Outcome::Empty { reason, detail } => {
            let _ = writeln!(out, "{label}: no products ({reason})");
            if let Some(detail) = detail {
                let _ = writeln!(out, "  {detail}");
            }
            false
        }
    }
}

fn schoeck_block(out: &mut String, outcome: &Outcome<SchoeckRecord>) {
    if !outcome_header(out, "Schöck", outcome) {
        return;
    }
    let width = outcome
        .rows()
        .iter()
        .map(|r| r.record.identifier.len())
        .max()
        .unwrap_or(0)
        .max("IDENTIFIER".len());

    let _ = writeln!(out, "    {:<width$}  {:>8}  {:>8}  {:>5}", "IDENTIFIER", "MRD", "VRD", "H");
    for row in outcome.rows() {
        let r = &row.record;
        let _ = writeln!(
            out,
            "  {} {:<width$}  {:>8}  {:>8}  {:>5}",
            if row.is_origin { ORIGIN_MARK } else { " " },
            r.identifier,
            opt(r.moment),
            opt(r.shear),
            opt(r.height),
        );
    }
}

fn leviat_block(out: &mut String, outcome: &Outcome<AggregatedProductRange>) {
    if !outcome_header(out, "Leviat", outcome) {
        return;
    }
    let width = outcome
        .rows()
        .iter()
        .map(|r| r.record.product_type_code.len())
        .max()
        .unwrap_or(0)
        .max("PRODUCT TYPE".len());

    let _ = writeln!(
        out,
        "    {:<width$}  {:>13}  {:>13}  {:>5}  {:>3}  TYPES",
        "PRODUCT TYPE", "MRD", "VRD", "H", "N"
    );
    for row in outcome.rows() {
        let r = &row.record;
        let _ = writeln!(
            out,
            "  {} {:<width$}  {:>13}  {:>13}  {:>5}  {:>3}  {}/{}",
            if row.is_origin { ORIGIN_MARK } else { " " },
            r.product_type_code,
            r.moment_range.to_string(),
            r.shear_range.to_string(),
            r.height,
            r.variant_count,
            r.moment_type,
            r.shear_type,
        );
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn target_line(target: &TargetSpec) -> String {
    format!(
        "moment {}  shear {}  height {}",
        target.moment, target.shear, target.height
    )
}

fn band_line(band: &ToleranceBand) -> String {
    let window = |i: Interval| format!("x{}..x{}", i.min, i.max);
    format!(
        "moment {}  shear {}  height +/-{} mm",
        window(Interval::new(band.moment_lower, band.moment_upper)),
        window(Interval::new(band.shear_lower, band.shear_upper)),
        band.height_offset
    )
}

pub fn show(
    code: &str,
    schoeck: Option<&SchoeckRecord>,
    parsed: Option<&ModelCode>,
    leviat: Option<&AggregatedProductRange>,
) -> String {
    let mut out = String::new();
    match schoeck {
        Some(r) => {
            let _ = writeln!(out, "Schöck: {}", r.identifier);
            let _ = writeln!(out, "  moment {}  shear {}  height {}", opt(r.moment), opt(r.shear), opt(r.height));
            if let Some(parsed) = parsed {
                let _ = writeln!(
                    out,
                    "  series {}  variant {}  code height {}",
                    parsed.series(),
                    parsed.variant(),
                    parsed.height()
                );
            }
            for (column, value) in &r.extra {
                let _ = writeln!(out, "  {column}: {value}");
            }
        }
        None => {
            let _ = writeln!(out, "Schöck: '{code}' not in catalog");
        }
    }
    match leviat {
        Some(r) => {
            let _ = writeln!(out, "Leviat: {}", r.product_type_code);
            let _ = writeln!(
                out,
                "  moment {} ({})  shear {} ({})  height {}  variants {}",
                r.moment_range, r.moment_type, r.shear_range, r.shear_type, r.height, r.variant_count
            );
        }
        None => {
            let _ = writeln!(out, "Leviat: '{code}' not in catalog");
        }
    }
    out
}

pub fn summary(name: &str, summary: &CatalogSummary) -> String {
    format!(
        "catalog '{name}': ok\n  schoeck: {} rows ({} matchable)\n  leviat:  {} variants in {} product types\n",
        summary.schoeck_rows,
        summary.schoeck_matchable,
        summary.leviat_variants,
        summary.leviat_product_types,
    )
}
