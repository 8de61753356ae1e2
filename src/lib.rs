//! Descriptive aggregates over SARS-CoV-2 genomic surveillance records.
//!
//! A [`models::RecordSet`] is loaded once from CSV and every view
//! (lineage ranking, monthly buckets, demographics, mutation analysis) is a
//! pure function of it. [`dashboard::Dashboard`] memoizes those views.

pub mod dashboard;
pub mod demographics;
pub mod error;
pub mod loader;
pub mod models;
pub mod mutations;
pub mod report;
pub mod summary;
pub mod tally;
pub mod temporal;
pub mod variants;
