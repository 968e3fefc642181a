use thiserror::Error;

/// Seconds any single remote call (token exchange, open, read, write) may take.
pub const REMOTE_TIMEOUT_SECS: u64 = 10;

/// Failure kinds of one render cycle or user-triggered action.
///
/// `Auth`, `SheetAccess` and `Timeout` during the initial fetch are fatal to the
/// render cycle. `SheetWrite` and `Export` are reported to the user while the
/// already rendered dashboard stays valid.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Credential missing, malformed, or rejected by the identity provider.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Spreadsheet or worksheet not found, or access denied.
    #[error("cannot open spreadsheet: {0}")]
    SheetAccess(String),

    /// Write-back rejected or failed.
    #[error("saving to spreadsheet failed: {0}")]
    SheetWrite(String),

    /// A remote call exceeded [`REMOTE_TIMEOUT_SECS`].
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        operation: &'static str,
        seconds: u64,
    },

    #[error("export failed: {0}")]
    Export(String),

    #[error("render failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

/// Classifies a transport error: timeouts keep their own kind, everything else
/// is reported as `kind` with the operation name attached.
#[cfg(feature = "web")]
pub(crate) fn from_transport(
    err: reqwest::Error,
    operation: &'static str,
    kind: fn(String) -> DashboardError,
) -> DashboardError {
    if err.is_timeout() {
        DashboardError::Timeout {
            operation,
            seconds: REMOTE_TIMEOUT_SECS,
        }
    } else {
        kind(format!("{}: {}", operation, err))
    }
}
