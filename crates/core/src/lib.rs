//! Progress tracking domain for the learning platform.
//!
//! Pure domain logic (completion predicates, roll-ups, mock-test scoring)
//! plus the store seams and the `ProgressService` that wires them
//! together. No database or HTTP dependency lives here.

pub mod attempt_status;
pub mod catalog;
pub mod completion;
pub mod error;
pub mod memory;
pub mod percent;
pub mod progress;
pub mod rollup;
pub mod service;
pub mod store;
pub mod types;
pub mod unified;
