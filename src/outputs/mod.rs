//! Output generation for finished requests.
//!
//! # Submodules
//!
//! - [`json`]: Serializes a report (or a failure with its logs) as the JSON
//!   payload the front end reads, to a file or stdout
//!
//! CSV export is handled by the front end from the same payload.

pub mod json;
