//! Discovery of bundlable stylesheet and script references in a document.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use kuchikikiki::NodeRef;
use regex::Regex;

use crate::config::BundleConfig;
use crate::document::HtmlDocument;
use crate::models::ResourceKind;
use crate::paths;

static EXTERNAL_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?:)?//").expect("invalid external URL regex"));

/// Whether a reference value points outside the site (`http://`, `https://`,
/// or protocol-relative `//`). Such references are never bundled.
pub fn is_external_url(value: &str) -> bool {
    EXTERNAL_URL.is_match(value)
}

/// One bundlable reference found inside a document.
///
/// Elements with missing, empty or external reference attributes produce no
/// `ResourceReference` at all and are left untouched in the document.
pub struct ResourceReference {
    /// The owning element, kept so the rewriter can replace or remove it.
    pub node: NodeRef,
    /// The reference attribute exactly as authored.
    pub raw_value: String,
    /// Resolved on-disk location of the referenced asset.
    pub source_path: PathBuf,
    /// Forward-slash path from the document's staging directory back to the
    /// asset; this is what the synthesized module imports.
    pub import_path: String,
    /// Extension of the referenced asset, including the leading dot.
    pub ext: String,
    /// Base name of the referenced asset without its extension.
    pub name: String,
}

/// Collect the document's bundlable references of one kind, in document
/// order. The order is load-bearing: it determines bundle content order.
pub fn extract_references(
    doc: &HtmlDocument,
    kind: ResourceKind,
    config: &BundleConfig,
) -> Vec<ResourceReference> {
    let staging_dir = config.staging_dir(doc.web_dir());

    doc.query(kind)
        .into_iter()
        .filter_map(|node| {
            let raw_value = HtmlDocument::attribute(&node, kind.attr_name())?;
            if raw_value.trim().is_empty() || is_external_url(&raw_value) {
                return None;
            }

            // Site-absolute references resolve against the source root.
            let source_path = match raw_value.strip_prefix('/') {
                Some(site_relative) => config.source_root.join(site_relative),
                None => doc.dir().join(&raw_value),
            };
            let import_path = paths::relative_import_path(&staging_dir, &source_path);

            let referenced = Path::new(&raw_value);
            let ext = referenced
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default();
            let name = referenced
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();

            Some(ResourceReference {
                node,
                raw_value,
                source_path,
                import_path,
                ext,
                name,
            })
        })
        .collect()
}
