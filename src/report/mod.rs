//! Run summaries and failure reporting.

pub mod format;

pub use format::*;
