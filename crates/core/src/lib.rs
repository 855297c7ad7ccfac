//! `tagsheet-core` — Pure instrument-table engine.
//!
//! Pure engine crate: receives pre-loaded cell grids, returns located headers,
//! reconciled ranges, and merged record sets. No CLI or IO dependencies.

pub mod config;
pub mod error;
pub mod header;
pub mod merge;
pub mod model;
pub mod reconcile;
pub mod tag;
pub mod value;

pub use config::HeaderProfile;
pub use error::CoreError;
pub use header::find_header;
pub use model::{Cell, HeaderLocation, InstrumentRecord, RangePair};
pub use tag::TagNormalizer;
pub use value::values_equal;
