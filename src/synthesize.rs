//! Virtual entry-module synthesis and in-place document rewriting.

use std::fs;

use crate::config::BundleConfig;
use crate::document::HtmlDocument;
use crate::error::BundleError;
use crate::models::{BundleRecord, ResourceKind};
use crate::paths;
use crate::resources::ResourceReference;

/// Synthesize the bundle for one resource group and rewrite the document.
///
/// Writes an import-only staging module (one import per group member, in
/// group order), replaces the group's first element with a single reference
/// to the future bundle and removes the remaining members. The write is an
/// idempotent overwrite; re-running the pipeline regenerates every staging
/// file from scratch.
pub fn synthesize_group(
    doc: &HtmlDocument,
    group: &[ResourceReference],
    kind: ResourceKind,
    group_index: usize,
    config: &BundleConfig,
) -> Result<BundleRecord, BundleError> {
    let body = group
        .iter()
        .map(|reference| format!("import '{}';", reference.import_path))
        .collect::<Vec<_>>()
        .join("\n");

    let bundle_name = bundle_name(doc.name(), kind, group_index);
    let staging_dir = config.staging_dir(doc.web_dir());
    let staging_path = staging_dir.join(format!("{bundle_name}.js"));
    let entry_key = if doc.web_dir().is_empty() {
        bundle_name.clone()
    } else {
        format!("{}/{}", doc.web_dir(), bundle_name)
    };
    let public_path = paths::public_path(
        doc.web_dir(),
        &format!("{bundle_name}{}", kind.public_extension(config.dev_mode)),
    );

    fs::create_dir_all(&staging_dir).map_err(|source| BundleError::write(&staging_dir, source))?;
    fs::write(&staging_path, &body).map_err(|source| BundleError::write(&staging_path, source))?;

    rewrite_group(group, kind, &public_path, config.dev_mode);

    Ok(BundleRecord {
        staging_path,
        public_path,
        entry_key,
    })
}

/// Deterministic bundle name for a document, kind and group index. The
/// numeric suffix is omitted for the first group so single-group documents
/// keep the plain `<name>-styles` / `<name>-scripts` form.
fn bundle_name(doc_name: &str, kind: ResourceKind, group_index: usize) -> String {
    if group_index == 0 {
        format!("{doc_name}-{}", kind.file_suffix())
    } else {
        format!("{doc_name}-{}-{group_index}", kind.file_suffix())
    }
}

/// Replace the first group member with the bundle reference element and drop
/// the rest from the tree.
fn rewrite_group(group: &[ResourceReference], kind: ResourceKind, public_path: &str, dev_mode: bool) {
    for (index, reference) in group.iter().enumerate() {
        if index == 0 {
            let (markup, tag) = replacement_markup(kind, public_path, dev_mode);
            HtmlDocument::replace_with_markup(&reference.node, &markup, tag);
        } else {
            HtmlDocument::remove(&reference.node);
        }
    }
}

/// Markup for the single element that stands in for a whole group.
///
/// Scripts are always referenced as scripts. Style bundles load as scripts
/// in development mode (the bundle injects its styles at runtime) and as
/// real stylesheets in production mode.
fn replacement_markup(
    kind: ResourceKind,
    public_path: &str,
    dev_mode: bool,
) -> (String, &'static str) {
    match (kind, dev_mode) {
        (ResourceKind::Style, false) => (
            format!(r#"<link rel="stylesheet" href="{public_path}"/>"#),
            "link",
        ),
        _ => (format!(r#"<script src="{public_path}"></script>"#), "script"),
    }
}
