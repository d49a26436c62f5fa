//! Path resolution for host and telemetry files

use std::path::{Path, PathBuf};

/// Resolves the host installation root and user-scoped telemetry paths.
///
/// Hooks are invoked by the host from its installation root, so the current
/// working directory is the host root. Telemetry lives under the invoking
/// user's home directory so a read-only host tree never blocks recording.
#[derive(Debug, Clone)]
pub struct Paths {
    pub host_root: PathBuf,
    pub home_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths resolver for the current working directory
    pub fn new() -> std::io::Result<Self> {
        let host_root = std::env::current_dir()?;
        let home_dir = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;

        Ok(Self {
            host_root,
            home_dir,
        })
    }

    /// Build a resolver rooted at an explicit host directory
    pub fn for_host_root(host_root: impl Into<PathBuf>) -> Self {
        let host_root = host_root.into();
        let home_dir = dirs::home_dir().unwrap_or_else(|| host_root.clone());
        Self {
            host_root,
            home_dir,
        }
    }

    /// Get the updateguard.json config path in the host root
    pub fn config_path(&self) -> PathBuf {
        self.host_root.join("updateguard.json")
    }

    /// Get the host's extension registration file
    pub fn extensions_path(&self) -> PathBuf {
        self.host_root.join("extensions.json")
    }

    /// Default installed-plugins directory under the host root
    pub fn default_plugins_dir(&self) -> PathBuf {
        self.host_root.join("wp-content").join("plugins")
    }

    /// Get telemetry directory path
    pub fn telemetry_dir(&self) -> PathBuf {
        self.home_dir.join(".updateguard").join("telemetry")
    }

    /// Get suppressions.jsonl path
    pub fn events_file(&self) -> PathBuf {
        self.telemetry_dir().join("suppressions.jsonl")
    }

    /// Host root as a displayable string for event records
    pub fn host_root_display(&self) -> String {
        display(&self.host_root)
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
