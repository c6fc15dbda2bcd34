//! Inline-markup normalization.
//!
//! Markdown emphasis only renders when the markers hug words, so
//! `<em>foo </em>bar` must become `<em>foo</em> bar`, and split runs such as
//! `<b>foo</b><b>bar</b>` must collapse into one element.

use crate::dom::{self, Document, NodeRef};

/// Inline tags normalized after the structural rewrites, in this order.
pub const INLINE_TAGS: [&str; 14] = [
    "a", "b", "code", "em", "i", "label", "s", "small", "span", "strong", "sub", "sup", "u", "var",
];

/// Normalize every `tag` element in the document.
///
/// Elements are visited last to first. An element whose immediate previous
/// sibling is the same tag is merged into that sibling and removed; the
/// sibling comes earlier in document order, so it is visited (and has its
/// boundary spaces handled) later in the same pass. Any other element has
/// one leading and one trailing literal space moved outside of it.
pub fn normalize(doc: &Document, tag: &str) {
    let elements: Vec<NodeRef> = doc.select(tag).nodes().to_vec();

    for element in elements.iter().rev() {
        if let Some(prev) = element.prev_sibling() {
            if dom::node_tag(&prev).as_deref() == Some(tag) {
                merge_into(&prev, element);
                continue;
            }
        }
        relocate_boundary_spaces(doc, element);
    }
}

/// Move `element`'s children to the end of `target` and drop `element`.
///
/// When the merge makes two inline elements of the same tag adjacent at the
/// join (`<strong><em>a</em></strong><strong><em>b</em></strong>`), they are
/// merged too, down to any depth.
fn merge_into(target: &NodeRef, element: &NodeRef) {
    let left = target.children().last().copied();
    let right = element.children().first().copied();

    dom::move_children(element, target);
    dom::detach(element);

    let (Some(left), Some(right)) = (left, right) else {
        return;
    };
    let Some(tag) = dom::node_tag(&left) else {
        return;
    };
    if INLINE_TAGS.contains(&tag.as_str()) && dom::node_tag(&right).as_deref() == Some(tag.as_str()) {
        merge_into(&left, &right);
    }
}

/// Run [`normalize`] for every tag of [`INLINE_TAGS`].
pub fn normalize_all(doc: &Document) {
    for tag in INLINE_TAGS {
        normalize(doc, tag);
    }
}

fn relocate_boundary_spaces(doc: &Document, element: &NodeRef) {
    if let Some(last) = dom::last_text_descendant(element) {
        let text = last.text();
        if let Some(trimmed) = text.strip_suffix(' ') {
            dom::replace_text(doc, &last, trimmed);
            dom::insert_after(element, &dom::new_text(doc, " "));
        }
    }

    if let Some(first) = dom::first_text_descendant(element) {
        let text = first.text();
        if let Some(trimmed) = text.strip_prefix(' ') {
            dom::replace_text(doc, &first, trimmed);
            dom::insert_before(element, &dom::new_text(doc, " "));
        }
    }
}
