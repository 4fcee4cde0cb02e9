/// Filtering and aggregation over normalized records.
///
/// Everything here is pure: records in, records or numbers out. Empty input
/// is never an error; it yields empty vectors or `None` so the presentation
/// layer can show "nothing to display".
///
/// Submodules:
/// - `filters` — equality filters by region and year, and selector values.
/// - `groupings` — means, per-year trends, and per-location series.

pub mod filters;
pub mod groupings;
