//! Row structs for the catalog mirror and the progress tables.
//!
//! Each row is a `FromRow` struct matching its table and converts into the
//! corresponding `studytrack-core` type.

pub mod catalog;
pub mod progress;
