//! diskutil — disk inventory and bay indicator LED control over a hardware topology.

pub mod config;
pub mod error;
pub mod led;
pub mod protocol;
pub mod topo;
pub mod walk;

pub use error::DiskutilError;
