//! # Sequence Labeling Features
#![forbid(unsafe_code)]

/// Vocabulary tables
pub mod vocab;

/// Feature encoding
pub mod features;

/// Models
pub mod models;

/// Datasets
pub mod datasets;

/// Utilities
pub mod utils;

/// Error macros
#[macro_use]
extern crate anyhow;
