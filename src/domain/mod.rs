//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - pipeline inputs (`ParameterRecord`)
//! - extraction outputs (`DiagnosticRecord`, `ExtractionFailure`)
//! - detection outputs (`Event`, `Timeline`, `Thresholds`)

pub mod types;

pub use types::*;
