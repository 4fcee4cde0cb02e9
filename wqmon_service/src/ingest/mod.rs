/// Record ingestion.
///
/// Submodules:
/// - `form` — validates one submitted form and appends it to the store.

pub mod form;

pub use form::{SubmissionForm, submit};
