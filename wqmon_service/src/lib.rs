//! Water quality record ingestion and reporting.
//!
//! Records flow one way: a submitted form is appended to the store
//! (`ingest`), the whole collection is read back (`store`), coerced to typed
//! records (`normalize`), filtered by region and year (`analysis::filters`),
//! and aggregated for display (`analysis::groupings`, `report`).

pub mod analysis;
pub mod config;
pub mod fields;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod verify;
