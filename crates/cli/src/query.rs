//! `isofind code|specs|show|validate|examples`: catalog lookups.

use std::path::PathBuf;
use std::sync::Arc;

use isofind_equiv::engine::CatalogSummary;
use isofind_equiv::{
    AggregatedProductRange, ModelCode, Query, QueryContext, QueryResult, ReasonCode, SchoeckRecord,
    SpecQuery,
};
use isofind_io::{open_catalog, OpenCatalog};
use serde::Serialize;

use crate::exit_codes::EXIT_QUERY_EMPTY;
use crate::{render, BandArgs, CliError, OutputArgs};

pub const SCHOECK_EXAMPLE: &str = "T-D-MM1-VV2-REI120-CV35-X80-H170-6.0";
pub const LEVIAT_EXAMPLE: &str = "HIT-HP MVX-0708-27-100-45";

fn open(catalog: Option<PathBuf>) -> Result<OpenCatalog, CliError> {
    let path = catalog.ok_or_else(|| {
        CliError::args("no catalog config given")
            .with_hint("pass --catalog <PATH> or set ISOFIND_CATALOG")
    })?;
    open_catalog(&path).map_err(CliError::load)
}

fn context(open: OpenCatalog) -> QueryContext {
    QueryContext::new(Arc::new(open.catalogs), open.config.tolerance)
}

pub fn cmd_code(
    catalog: Option<PathBuf>,
    code: &str,
    band: &BandArgs,
    output: &OutputArgs,
) -> Result<(), CliError> {
    let ctx = context(open(catalog)?);
    let query = Query::ByCode {
        code: code.to_string(),
        band: band.apply(ctx.tolerance().code),
    };
    let result = ctx.run(&query).map_err(CliError::query)?;
    report(&result, output)?;

    if result.schoeck.reason() == Some(ReasonCode::NotFound)
        && result.leviat.reason() == Some(ReasonCode::NotFound)
    {
        return Err(
            CliError::new(EXIT_QUERY_EMPTY, format!("'{}' not found in either catalog", code.trim()))
                .with_hint("run `isofind examples` for the expected code formats"),
        );
    }
    finish(&result)
}

pub fn cmd_specs(
    catalog: Option<PathBuf>,
    moment: f64,
    shear: f64,
    height: u32,
    band: &BandArgs,
    output: &OutputArgs,
) -> Result<(), CliError> {
    let ctx = context(open(catalog)?);
    let query = Query::BySpecs(SpecQuery {
        moment,
        shear,
        height,
        band: band.apply(ctx.tolerance().specs),
    });
    let result = ctx.run(&query).map_err(CliError::query)?;
    report(&result, output)?;
    finish(&result)
}

fn report(result: &QueryResult, output: &OutputArgs) -> Result<(), CliError> {
    write_json(result, output.json, output.output.as_ref())?;
    if !output.json {
        print!("{}", render::result(result));
    }
    eprintln!(
        "{}: {} schöck, {} leviat",
        result.meta.mode,
        result.schoeck.rows().len(),
        result.leviat.rows().len(),
    );
    Ok(())
}

/// Exit code for a query that ran: empty everywhere is not success.
fn finish(result: &QueryResult) -> Result<(), CliError> {
    if result.total_rows() == 0 {
        return Err(CliError::new(EXIT_QUERY_EMPTY, ""));
    }
    Ok(())
}

fn write_json<T: Serialize>(
    value: &T,
    stdout: bool,
    file: Option<&PathBuf>,
) -> Result<(), CliError> {
    if !stdout && file.is_none() {
        return Ok(());
    }
    let json_str = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::output(format!("JSON serialization error: {e}")))?;

    if let Some(path) = file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::output(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }
    if stdout {
        println!("{json_str}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ShowResult<'a> {
    code: &'a str,
    schoeck: Option<&'a SchoeckRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schoeck_code: Option<ModelCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schoeck_code_error: Option<String>,
    leviat: Option<&'a AggregatedProductRange>,
}

pub fn cmd_show(catalog: Option<PathBuf>, code: &str, json: bool) -> Result<(), CliError> {
    let open = open(catalog)?;
    let code = code.trim();
    let schoeck = open.catalogs.find_schoeck(code);
    let leviat = open.catalogs.find_leviat(code);

    let (parsed, parse_error) = match schoeck.map(|_| ModelCode::parse(code)) {
        Some(Ok(parsed)) => (Some(parsed), None),
        Some(Err(e)) => (None, Some(e.to_string())),
        None => (None, None),
    };

    if json {
        let show = ShowResult {
            code,
            schoeck,
            schoeck_code: parsed,
            schoeck_code_error: parse_error,
            leviat,
        };
        write_json(&show, true, None)?;
    } else {
        print!("{}", render::show(code, schoeck, parsed.as_ref(), leviat));
        if let Some(e) = &parse_error {
            println!("  warning: {e}");
        }
    }

    if schoeck.is_none() && leviat.is_none() {
        return Err(CliError::new(EXIT_QUERY_EMPTY, format!("'{code}' not found in either catalog"))
            .with_hint("run `isofind examples` for the expected code formats"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate / examples
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ValidateResult<'a> {
    name: &'a str,
    #[serde(flatten)]
    summary: CatalogSummary,
}

pub fn cmd_validate(catalog: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let open = open(catalog)?;
    let summary = open.catalogs.summary();

    if json {
        let result = ValidateResult {
            name: &open.config.name,
            summary,
        };
        write_json(&result, true, None)?;
    } else {
        print!("{}", render::summary(&open.config.name, &summary));
    }
    Ok(())
}

pub fn cmd_examples() {
    println!("Examples of model code format:");
    println!();
    println!("  Schöck:        {SCHOECK_EXAMPLE}");
    println!("  Halfen/Leviat: {LEVIAT_EXAMPLE}");
    println!();
    println!("Schöck codes are dash-separated; the eighth segment carries the height (H170 = 170 mm).");
    println!("Leviat codes are product type codes and must match the catalog exactly.");
}
