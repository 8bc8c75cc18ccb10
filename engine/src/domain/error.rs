//! Domain-level errors
//! These represent scan orchestration failures, not host-plugin concerns

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DomainError {
    // Container runtime collaborator failures (create/copy/exec/stop)
    #[error("Container operation failed: {0}")]
    ContainerOperation(String),

    // The scan tool returned an exit code outside {0, 1, 3}
    #[error("Error executing the inline scanner. Exit code {exit_code}")]
    ScanFailed { exit_code: i64 },

    // The synchronous scan call was interrupted while waiting
    #[error("Scan interrupted: {0}")]
    Interrupted(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
