//! Input/output helpers.
//!
//! - NDJSON ingest + per-line validation (`ingest`)
//! - NDJSON exports for diagnostics/timeline/failures (`export`)
//! - AsciiMath summary mirrors (`asciimath`)

pub mod asciimath;
pub mod export;
pub mod ingest;

pub use asciimath::*;
pub use export::*;
pub use ingest::*;
