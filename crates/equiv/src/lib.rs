//! `isofind-equiv`: equivalence matching engine for thermal-break connectors.
//!
//! Pure engine crate: receives pre-loaded catalog rows, returns matched rows.
//! No CLI or IO dependencies.

pub mod aggregate;
pub mod code;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;

pub use code::ModelCode;
pub use config::{CatalogConfig, ParsePolicy, PolicyConfig, ToleranceBand, ToleranceConfig};
pub use engine::{Catalogs, QueryContext};
pub use error::EquivError;
pub use model::{
    AggregatedProductRange, Interval, Manufacturer, Outcome, Query, QueryResult, ReasonCode,
    SchoeckRecord, SpecQuery, TargetSpec, VariantRecord,
};
