//! Unified error type for the diskutil-lib crate.
//!
//! [`DiskutilError`] wraps provider errors (`TopoError`) and the run-level
//! failures: bad operator input, configuration problems, and a control
//! request that matched nothing. `From` impls allow `?` to propagate across
//! module boundaries.

use std::fmt;

use crate::led::IndicatorKind;
use crate::topo::TopoError;

/// Unified error type for diskutil-lib operations.
#[derive(Debug)]
pub enum DiskutilError {
    /// Topology provider error (open, snapshot, walk init).
    Topo(TopoError),
    /// Standard I/O error (writing the report).
    Io(std::io::Error),
    /// Configuration validation error.
    Config(String),
    /// Invalid command-line input.
    Usage(String),
    /// Control mode found no indicator of the requested kind on the disk.
    NoMatch { disk: String, kind: IndicatorKind },
    /// Matching indicators were found but every write to them failed.
    WriteRejected {
        disk: String,
        kind: IndicatorKind,
        failed: usize,
    },
}

impl fmt::Display for DiskutilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiskutilError::Topo(e) => write!(f, "{e}"),
            DiskutilError::Io(e) => write!(f, "I/O error: {e}"),
            DiskutilError::Config(e) => write!(f, "Config error: {e}"),
            DiskutilError::Usage(e) => write!(f, "{e}"),
            DiskutilError::NoMatch { disk, kind } => {
                write!(f, "could not find {kind} LED on disk {disk}")
            }
            DiskutilError::WriteRejected { disk, kind, failed } => write!(
                f,
                "could not set {kind} LED on disk {disk}: {failed} indicator write(s) failed"
            ),
        }
    }
}

impl std::error::Error for DiskutilError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiskutilError::Topo(e) => Some(e),
            DiskutilError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TopoError> for DiskutilError {
    fn from(e: TopoError) -> Self {
        DiskutilError::Topo(e)
    }
}

impl From<std::io::Error> for DiskutilError {
    fn from(e: std::io::Error) -> Self {
        DiskutilError::Io(e)
    }
}

/// Crate-level Result alias using [`DiskutilError`].
pub type Result<T> = std::result::Result<T, DiskutilError>;
