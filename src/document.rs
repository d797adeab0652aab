//! HTML document loading and the minimal mutable-tree facade used by the
//! rest of the pipeline.
//!
//! The underlying DOM implementation is deliberately confined to this module:
//! later stages only see [`HtmlDocument`] and the handful of operations below
//! (query by kind, attribute read, previous element sibling, replace, remove,
//! serialize), so the parsing library can be swapped without touching them.

use std::fs;
use std::path::{Path, PathBuf};

use kuchikikiki::traits::TendrilSink;
use kuchikikiki::{ElementData, NodeRef};

use crate::error::BundleError;
use crate::models::ResourceKind;
use crate::paths;

/// One loaded HTML document and its derived location attributes.
///
/// The element tree is mutable and lives for a single processing pass; once
/// rewriting completes the document is serialized and discarded.
pub struct HtmlDocument {
    tree: NodeRef,
    source_path: PathBuf,
    dir: PathBuf,
    name: String,
    web_dir: String,
}

impl HtmlDocument {
    /// Read and parse the document at `path`.
    ///
    /// The parser is error-recovering, so malformed markup never fails here;
    /// only unreadable files do.
    pub fn load(path: &Path, source_root: &Path) -> Result<Self, BundleError> {
        let content =
            fs::read_to_string(path).map_err(|source| BundleError::read(path, source))?;
        Ok(Self::from_content(path, source_root, &content))
    }

    /// Parse an already-read document, attributing it to `path`.
    pub fn from_content(path: &Path, source_root: &Path, content: &str) -> Self {
        let dir = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let web_dir = paths::to_web_path(&paths::relative_path(source_root, &dir));

        Self {
            tree: kuchikikiki::parse_html().one(content),
            source_path: path.to_path_buf(),
            dir,
            name,
            web_dir,
        }
    }

    /// Absolute source path of the document.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Directory containing the document.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Base name of the document without the `.html` extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Document directory relative to the source root, forward-slash
    /// separated; empty for documents at the root itself.
    pub fn web_dir(&self) -> &str {
        &self.web_dir
    }

    /// All elements of the given kind, in document order.
    pub fn query(&self, kind: ResourceKind) -> Vec<NodeRef> {
        self.tree
            .descendants()
            .filter(|node| node.as_element().is_some_and(|el| element_matches(el, kind)))
            .collect()
    }

    /// Read an attribute off an element node.
    pub fn attribute(node: &NodeRef, name: &str) -> Option<String> {
        let element = node.as_element()?;
        let attributes = element.attributes.borrow();
        attributes.get(name).map(String::from)
    }

    /// Whether `node` is an element of the given resource kind.
    pub fn matches_kind(node: &NodeRef, kind: ResourceKind) -> bool {
        node.as_element().is_some_and(|el| element_matches(el, kind))
    }

    /// Nearest preceding sibling that is an element, skipping whitespace,
    /// text and comment nodes.
    pub fn previous_element_sibling(node: &NodeRef) -> Option<NodeRef> {
        let mut cursor = node.previous_sibling();
        while let Some(sibling) = cursor {
            if sibling.as_element().is_some() {
                return Some(sibling);
            }
            cursor = sibling.previous_sibling();
        }
        None
    }

    /// Replace an element with the element parsed from `markup`.
    ///
    /// `tag` names the element to lift out of the parsed markup, since the
    /// parser wraps fragments in a full document shell.
    pub fn replace_with_markup(node: &NodeRef, markup: &str, tag: &str) {
        let shell = kuchikikiki::parse_html().one(markup);
        if let Ok(replacement) = shell.select_first(tag) {
            let replacement = replacement.as_node().clone();
            replacement.detach();
            node.insert_before(replacement);
        }
        node.detach();
    }

    /// Remove an element from the tree without replacement.
    pub fn remove(node: &NodeRef) {
        node.detach();
    }

    /// Serialize the (possibly rewritten) tree back to markup.
    ///
    /// Failures surface as plain I/O errors from the in-memory sink; callers
    /// attach the path they are about to write.
    pub fn serialize(&self) -> std::io::Result<String> {
        let mut bytes = Vec::new();
        self.tree.serialize(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn element_matches(element: &ElementData, kind: ResourceKind) -> bool {
    match kind {
        ResourceKind::Style => {
            element.name.local.as_ref() == "link"
                && element
                    .attributes
                    .borrow()
                    .get("rel")
                    .is_some_and(|rel| rel.trim().eq_ignore_ascii_case("stylesheet"))
        }
        ResourceKind::Script => element.name.local.as_ref() == "script",
    }
}
