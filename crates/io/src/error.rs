use std::path::PathBuf;

use isofind_equiv::{EquivError, Manufacturer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// File has no header row.
    #[error("{}: file is empty", .path.display())]
    EmptySource { path: PathBuf },

    #[error("{manufacturer}: column '{column}' not found (available: {available})")]
    MissingColumn {
        manufacturer: Manufacturer,
        column: String,
        available: String,
    },

    #[error(transparent)]
    Engine(#[from] EquivError),
}

impl LoadError {
    /// True when the catalog content, not the filesystem, is at fault.
    pub fn is_data_error(&self) -> bool {
        match self {
            Self::Csv { .. } | Self::EmptySource { .. } | Self::MissingColumn { .. } => true,
            Self::Engine(e) => e.is_data_error(),
            Self::Io { .. } => false,
        }
    }
}
