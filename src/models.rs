//! Data structures shared across the bundling pipeline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Extensions of files the downstream compiler knows how to bundle.
const BUNDLABLE_EXTENSIONS: [&str; 4] = ["css", "scss", "less", "js"];

/// Classification of a file found under the source root.
///
/// Every file belongs to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// An HTML document to be rewritten.
    Document,
    /// A stylesheet or script reachable through synthesized bundles; never
    /// copied directly, the downstream compiler emits it.
    Bundlable,
    /// Anything else; copied to the destination tree verbatim.
    Passthrough,
}

impl SourceKind {
    /// Classify a path by its filename extension.
    pub fn classify(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("html") => Self::Document,
            Some(ext) if BUNDLABLE_EXTENSIONS.contains(&ext) => Self::Bundlable,
            _ => Self::Passthrough,
        }
    }
}

/// The two kinds of bundlable resource references a document can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// `<link rel="stylesheet" href="…">` elements.
    Style,
    /// `<script src="…">` elements.
    Script,
}

impl ResourceKind {
    /// The element attribute holding the resource location.
    pub fn attr_name(self) -> &'static str {
        match self {
            Self::Style => "href",
            Self::Script => "src",
        }
    }

    /// Suffix appended to the document name when deriving bundle names.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Self::Style => "styles",
            Self::Script => "scripts",
        }
    }

    /// Extension of the reference written into the rewritten document.
    ///
    /// Scripts always resolve to `.js`. Styles resolve to `.js` in
    /// development mode, where the bundle is a script that injects styles,
    /// and `.css` in production mode, where the compiler extracts a real
    /// stylesheet.
    pub fn public_extension(self, dev_mode: bool) -> &'static str {
        match self {
            Self::Script => ".js",
            Self::Style if dev_mode => ".js",
            Self::Style => ".css",
        }
    }
}

/// Synthesis output for one resource group.
#[derive(Debug, Clone)]
pub struct BundleRecord {
    /// Where the synthesized import-only module was written.
    pub staging_path: PathBuf,
    /// Absolute web path written into the rewritten document.
    pub public_path: String,
    /// Key under which the bundle is registered for the downstream compiler.
    pub entry_key: String,
}

/// Mapping from entry-point key to the ordered staging modules behind it.
///
/// Built incrementally across all documents of a run and handed back to the
/// caller, which may prepend its own bootstrap entries (live-reload client,
/// hot-update runtime) in development mode before passing the map on.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EntryPointRegistry {
    entries: BTreeMap<String, Vec<PathBuf>>,
}

impl EntryPointRegistry {
    /// Register a staging module under `key`, appending when the key exists.
    ///
    /// Keys derive from document, kind and group index, so distinct groups
    /// never collide within a run.
    pub fn insert(&mut self, key: String, staging_path: PathBuf) {
        self.entries.entry(key).or_default().push(staging_path);
    }

    /// Staging modules registered under `key`, in insertion order.
    pub fn get(&self, key: &str) -> Option<&[PathBuf]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Iterate over all entries, sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<PathBuf>)> {
        self.entries.iter()
    }

    /// Number of registered entry points.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry points were registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the registry as prettified JSON for the compiler configuration.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
