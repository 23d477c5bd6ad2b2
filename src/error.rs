//! Application error type.
//!
//! One small error value carries everything the binary needs at the boundary:
//! a message for stderr and a process exit code. Per-record failures are not
//! errors in this sense; they travel as data (`ExtractionFailure`,
//! `LineError`) so a batch always completes.
//!
//! Exit code convention:
//!
//! - `2`: setup/input errors (missing input file, bad flags, unusable solver command)
//! - `3`: output write errors

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
