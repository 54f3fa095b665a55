//! Catalog loading: config file, source tables, row extraction.

use std::collections::BTreeMap;
use std::path::Path;

use isofind_equiv::config::{LeviatSource, SchoeckSource};
use isofind_equiv::model::RawSchoeckRow;
use isofind_equiv::{CatalogConfig, Catalogs, EquivError, Manufacturer, VariantRecord};

use crate::error::LoadError;
use crate::table::{concat_tables, read_table, Table};

/// A parsed config together with the catalogs it describes.
#[derive(Debug, Clone)]
pub struct OpenCatalog {
    pub config: CatalogConfig,
    pub catalogs: Catalogs,
}

/// Read and validate a TOML catalog config.
pub fn read_config(path: &Path) -> Result<CatalogConfig, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(CatalogConfig::from_toml(&text)?)
}

/// Read the config at `path` and load the catalogs it names. Source paths
/// resolve relative to the config file's directory.
pub fn open_catalog(path: &Path) -> Result<OpenCatalog, LoadError> {
    let config = read_config(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let catalogs = load_catalogs(&config, base_dir)?;
    Ok(OpenCatalog { config, catalogs })
}

/// Load both manufacturer catalogs. Aggregation of the Leviat variants
/// happens here, once.
pub fn load_catalogs(config: &CatalogConfig, base_dir: &Path) -> Result<Catalogs, LoadError> {
    let schoeck = load_source(Manufacturer::Schoeck, &config.schoeck.files, config.schoeck.delimiter, base_dir)?;
    let raw = schoeck_rows(&schoeck, &config.schoeck)?;

    let leviat = load_source(Manufacturer::Leviat, &config.leviat.files, config.leviat.delimiter, base_dir)?;
    let variants = leviat_rows(&leviat, &config.leviat)?;

    let catalogs = Catalogs::from_raw(raw, variants, &config.policy)?;
    let summary = catalogs.summary();
    log::info!(
        "catalog '{}': {} schoeck rows ({} matchable), {} leviat variants in {} product types",
        config.name,
        summary.schoeck_rows,
        summary.schoeck_matchable,
        summary.leviat_variants,
        summary.leviat_product_types,
    );
    Ok(catalogs)
}

fn load_source(
    manufacturer: Manufacturer,
    files: &[String],
    delimiter: Option<char>,
    base_dir: &Path,
) -> Result<Table, LoadError> {
    // Config validation guarantees an ASCII delimiter.
    let delimiter = delimiter.map(|d| d as u8);

    let mut tables = Vec::with_capacity(files.len());
    for file in files {
        let table = read_table(&base_dir.join(file), delimiter)?;
        log::debug!("{manufacturer}: {} rows from {file}", table.len());
        tables.push(table);
    }

    concat_tables(tables).ok_or_else(|| {
        LoadError::Engine(EquivError::ConfigValidation(format!(
            "{manufacturer}: at least one file is required"
        )))
    })
}

fn require(table: &Table, manufacturer: Manufacturer, column: &str) -> Result<usize, LoadError> {
    table.column(column).ok_or_else(|| LoadError::MissingColumn {
        manufacturer,
        column: column.to_string(),
        available: table.headers.join(", "),
    })
}

/// Project a concatenated Schöck table into raw rows. Columns other than the
/// three matched ones are carried as `extra`, minus the hidden ones.
pub fn schoeck_rows(table: &Table, source: &SchoeckSource) -> Result<Vec<RawSchoeckRow>, LoadError> {
    let cols = &source.columns;
    let id = require(table, Manufacturer::Schoeck, &cols.identifier)?;
    let moment = require(table, Manufacturer::Schoeck, &cols.moment)?;
    let shear = require(table, Manufacturer::Schoeck, &cols.shear)?;

    let carried: Vec<(usize, &String)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, h)| ![id, moment, shear].contains(i) && !source.hidden_columns.contains(*h))
        .collect();

    Ok(table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| RawSchoeckRow {
            line: i + 1,
            identifier: row[id].clone(),
            moment: row[moment].clone(),
            shear: row[shear].clone(),
            extra: carried
                .iter()
                .map(|(idx, name)| (name.to_string(), row[*idx].clone()))
                .collect::<BTreeMap<_, _>>(),
        })
        .collect())
}

/// Project a concatenated Leviat table into variant records.
pub fn leviat_rows(table: &Table, source: &LeviatSource) -> Result<Vec<VariantRecord>, LoadError> {
    let cols = &source.columns;
    let m = Manufacturer::Leviat;
    let class = require(table, m, &cols.concrete_class)?;
    let code = require(table, m, &cols.product_type)?;
    let moment = require(table, m, &cols.moment)?;
    let shear = require(table, m, &cols.shear)?;
    let moment_type = require(table, m, &cols.moment_type)?;
    let shear_type = require(table, m, &cols.shear_type)?;
    let height = require(table, m, &cols.height)?;

    Ok(table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| VariantRecord {
            line: i + 1,
            concrete_class: row[class].clone(),
            product_type_code: row[code].clone(),
            moment: row[moment].clone(),
            shear: row[shear].clone(),
            moment_type: row[moment_type].clone(),
            shear_type: row[shear_type].clone(),
            height: row[height].clone(),
        })
        .collect())
}
