//! Procurement spending dashboard core.
//!
//! Normalizes Thai-calendar dates and loosely formatted amounts, buckets
//! records into Buddhist-era fiscal or calendar years, and computes the
//! aggregates a dashboard renders.
pub mod aggregate;
pub mod config;
pub mod error;
pub mod fiscal;
pub mod loader;
pub mod output;
pub mod reports;
pub mod thai_date;
pub mod types;
pub mod util;

pub use error::{DashboardError, Result};
