//! Milk production prediction service
//!
//! HTTP surface over the predictor library, plus its configuration.

pub mod api;
pub mod config;
