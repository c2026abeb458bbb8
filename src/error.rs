//! Error types for the smartctl subprocess layer

use std::process::ExitStatus;
use thiserror::Error;

/// Errors raised while invoking smartctl.
///
/// The report parsers never fail; only running the external utility can.
#[derive(Error, Debug)]
pub enum SmartctlError {
    /// The binary could not be started at all
    #[error("failed to run {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// smartctl ran but exited non-zero
    #[error("{path} {args} exited with {status}")]
    ExitStatus {
        path: String,
        args: String,
        status: ExitStatus,
    },
}
