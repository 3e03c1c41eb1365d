//! Library half of `ice-compare`: the comparison loop and exit codes, kept
//! out of `main.rs` so integration tests can drive them with fake stores.

pub mod compare;
pub mod exit_codes;

pub use compare::{load_reference_tables, run_comparison, CompareError};
