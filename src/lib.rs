//! Bank customer churn predictor.
//!
//! Captures a customer profile through an HTML form or a JSON API, turns it
//! into the feature row a fitted classifier expects and reports a churn or
//! stay verdict with its probability.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ml;
pub mod models;
pub mod report;

pub use error::{AppError, Result};
