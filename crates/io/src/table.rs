// Delimited catalog tables

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::LoadError;

/// A header row plus string cells. Rows are padded to the header width.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub source: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Drop rows whose cells are all blank.
    pub fn drop_blank_rows(&mut self) {
        let before = self.rows.len();
        self.rows.retain(|row| row.iter().any(|cell| !cell.trim().is_empty()));
        if self.rows.len() < before {
            log::debug!("dropped {} blank rows", before - self.rows.len());
        }
    }

    /// Index of the column whose trimmed header equals `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, LoadError> {
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(io_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(io_err)?;

    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    })
}

const SNIFF_LINES: usize = 10;
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Pick the field delimiter of a catalog export.
///
/// A candidate must split the header into more than one field; it scores the
/// header width times the number of sampled lines with that same width. A tie
/// between `,` and `;` goes to `;` when data cells use decimal commas, which
/// is how German-locale exports are written.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    let decimal_commas = sample.iter().skip(1).any(|line| has_decimal_comma(line));

    let mut best = b',';
    let mut best_score = 0usize;
    for delimiter in DELIMITERS {
        let widths: Vec<usize> = sample.iter().map(|line| field_count(line, delimiter)).collect();
        let Some(&header_width) = widths.first() else {
            break;
        };
        if header_width <= 1 {
            continue;
        }

        let score = header_width * widths.iter().filter(|&&w| w == header_width).count();
        let locale_tie = score == best_score && delimiter == b';' && decimal_commas;
        if score > best_score || locale_tie {
            best = delimiter;
            best_score = score;
        }
    }

    log::trace!("sniffed delimiter {:?} (score {best_score})", best as char);
    best
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(1, |record| record.len())
}

fn has_decimal_comma(line: &str) -> bool {
    line.as_bytes()
        .windows(3)
        .any(|w| w[0].is_ascii_digit() && w[1] == b',' && w[2].is_ascii_digit())
}

/// Read one delimited file. `delimiter` is sniffed when `None`.
pub fn read_table(path: &Path, delimiter: Option<u8>) -> Result<Table, LoadError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    parse_table(path, &content, delimiter)
}

fn parse_table(path: &Path, content: &str, delimiter: u8) -> Result<Table, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(header) => header.map_err(csv_err)?.iter().map(|h| h.trim().to_string()).collect(),
        None => {
            return Err(LoadError::EmptySource {
                path: path.to_path_buf(),
            })
        }
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(csv_err)?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len().max(row.len()), String::new());
        row.truncate(headers.len());
        rows.push(row);
    }

    log::debug!(
        "read {} ({} columns, {} rows, delimiter {:?})",
        path.display(),
        headers.len(),
        rows.len(),
        delimiter as char,
    );

    Ok(Table {
        source: path.to_path_buf(),
        headers,
        rows,
    })
}

/// Concatenate tables in order, aligning columns by header name.
///
/// Every table after the first is a continuation file whose first data row
/// repeats information already carried by the first file; it is dropped even
/// when blank. Blank rows are removed only after that. Columns missing from a
/// table read as empty cells.
pub fn concat_tables(tables: Vec<Table>) -> Option<Table> {
    let mut iter = tables.into_iter();
    let mut combined = iter.next()?;

    for table in iter {
        let mapping: Vec<usize> = table
            .headers
            .iter()
            .map(|h| match combined.column(h) {
                Some(idx) => idx,
                None => {
                    combined.headers.push(h.clone());
                    for row in &mut combined.rows {
                        row.push(String::new());
                    }
                    combined.headers.len() - 1
                }
            })
            .collect();

        let width = combined.headers.len();
        for row in table.rows.into_iter().skip(1) {
            let mut aligned = vec![String::new(); width];
            for (cell, &idx) in row.into_iter().zip(&mapping) {
                aligned[idx] = cell;
            }
            combined.rows.push(aligned);
        }
    }

    combined.drop_blank_rows();
    Some(combined)
}
