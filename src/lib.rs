//! nmstate-handler: node network handler for Kubernetes
//!
//! This crate holds the parts of the nmstate handler that turn `nmstatectl`
//! output into status on cluster objects: error message formatting for
//! enactment conditions and current state filtering for NodeNetworkState.

pub mod controller;
pub mod crd;
pub mod diagnostics;
pub mod error;
pub mod state;

pub use crate::error::{Error, Result};
