//! Application configuration — TOML-based, platform-aware paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::protocol;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Topology snapshot file. Empty = `topology.json` in the config directory.
    #[serde(default)]
    pub topology_path: String,

    /// Topology scheme to walk. Default: "hc".
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Render ON indicators in reverse video when writing to a terminal.
    #[serde(default = "default_true")]
    pub highlight: bool,
}

fn default_scheme() -> String {
    protocol::SCHEME_HC.into()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            topology_path: String::new(),
            scheme: default_scheme(),
            highlight: true,
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The `scheme` field is empty or whitespace-only.
    EmptyScheme,
    /// The `topology_path` field points at a directory.
    TopologyPathIsDir(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyScheme => write!(f, "Scheme cannot be empty"),
            ValidationError::TopologyPathIsDir(p) => {
                write!(f, "Invalid topology_path: {p} is a directory")
            }
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("diskutil"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Snapshot file to open: the configured path, or the default location.
    pub fn topology_file(&self) -> Option<PathBuf> {
        let p = self.topology_path.trim();
        if p.is_empty() {
            Self::dir().map(|d| d.join("topology.json"))
        } else {
            Some(PathBuf::from(p))
        }
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.scheme.trim().is_empty() {
            errors.push(ValidationError::EmptyScheme);
        }

        let p = self.topology_path.trim();
        if !p.is_empty() && Path::new(p).is_dir() {
            errors.push(ValidationError::TopologyPathIsDir(p.to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// [`validate`](Self::validate), folded into a single crate error.
    pub fn check(&self) -> crate::error::Result<()> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            crate::DiskutilError::Config(msgs.join("; "))
        })
    }
}
