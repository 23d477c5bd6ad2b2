//! External solver process boundary.
//!
//! - child-process invocation with the JSON stdin/stdout contract (`gateway`)
//! - failure classification (process error vs malformed output)

pub mod gateway;

pub use gateway::*;
