//! Run configuration describing source, destination and staging layout.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "bundler.config.json";

/// Immutable configuration for one bundling run.
///
/// The paths arrive already resolved from the caller; the library never
/// consults command-line arguments or environment variables. The caller also
/// guarantees that `dest_root` and `staging_root` are empty or nonexistent
/// before `run` is invoked.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Root of the authored site tree to scan.
    pub source_root: PathBuf,
    /// Root under which rewritten documents and passthrough assets land.
    pub dest_root: PathBuf,
    /// Root under which synthesized entry modules are staged.
    pub staging_root: PathBuf,
    /// Development mode: style bundles are referenced as scripts that inject
    /// styles at runtime instead of compiled stylesheets.
    pub dev_mode: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            source_root: "src".into(),
            dest_root: "dest".into(),
            staging_root: "tmp".into(),
            dev_mode: false,
        }
    }
}

impl BundleConfig {
    /// Attempt to load configuration from `bundler.config.json` in the given
    /// directory, falling back to defaults when the file is absent or does
    /// not parse.
    pub fn discover(dir: &Path) -> Self {
        Self::from_path(&dir.join(DEFAULT_CONFIG_FILE)).unwrap_or_default()
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Staging directory for documents living under `web_dir` (the
    /// forward-slash directory of a document relative to the source root).
    pub fn staging_dir(&self, web_dir: &str) -> PathBuf {
        if web_dir.is_empty() {
            self.staging_root.clone()
        } else {
            self.staging_root.join(web_dir)
        }
    }
}
