//! Partitioning of extracted references into maximal adjacent runs.

use crate::document::HtmlDocument;
use crate::models::ResourceKind;
use crate::resources::extract::{ResourceReference, is_external_url};

/// Partition document-ordered references into maximal runs of contiguous
/// same-kind, bundlable elements.
///
/// A reference joins the open group only when its nearest preceding element
/// sibling (whitespace and comments do not count) is of the same kind *and*
/// itself carries a non-empty, non-external reference attribute. An excluded
/// element of the same tag therefore breaks adjacency: it cannot be merged
/// into a synthesized bundle, so groups never span across it.
///
/// Concatenating the returned groups reproduces the input sequence exactly.
pub fn group_adjacent(
    references: Vec<ResourceReference>,
    kind: ResourceKind,
) -> Vec<Vec<ResourceReference>> {
    let mut groups: Vec<Vec<ResourceReference>> = Vec::new();

    for reference in references {
        let joins_open_group = HtmlDocument::previous_element_sibling(&reference.node)
            .is_some_and(|previous| {
                HtmlDocument::matches_kind(&previous, kind)
                    && HtmlDocument::attribute(&previous, kind.attr_name())
                        .is_some_and(|value| !value.trim().is_empty() && !is_external_url(&value))
            });

        match groups.last_mut() {
            Some(group) if joins_open_group => group.push(reference),
            _ => groups.push(vec![reference]),
        }
    }

    groups
}
