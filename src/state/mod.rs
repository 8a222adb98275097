//! Network state handling
//!
//! Parsing, inspecting and filtering the YAML documents reported by
//! `nmstatectl show`.

pub mod filter;
pub mod tree;

pub use filter::{filter_out, filter_out_with_stats, FilterStats, InterfaceFilter};
