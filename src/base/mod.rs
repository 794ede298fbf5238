//! Foundation types shared by the model and the converters.
//!
//! - [`Position`] - row/column of a parsed element (diagnostics only)
//! - [`LineIndex`] - byte offset to [`Position`] lookup for one document
//!
//! This module has NO dependencies on other crate modules.

mod position;

pub use position::{LineIndex, Position};
