// Catalog file loading

pub mod catalog;
pub mod error;
pub mod table;

pub use catalog::{leviat_rows, load_catalogs, open_catalog, read_config, schoeck_rows, OpenCatalog};
pub use error::LoadError;
pub use table::{concat_tables, read_table, Table};
