//! `curvature-timeline` library crate.
//!
//! The binary (`curv`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning the CLI itself
//! - stages are reusable (e.g., future daemon, notebooks, batch runners)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod events;
pub mod extract;
pub mod io;
pub mod report;
pub mod solver;
