//! Event detection and timeline assembly.
//!
//! Responsibilities:
//!
//! - scan diagnostics against thresholds (`detect`)
//! - merge per-record events into one deterministic timeline (`timeline`)

pub mod detect;
pub mod timeline;

pub use detect::*;
pub use timeline::*;
