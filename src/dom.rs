//! DOM Operations Adapter
//!
//! Thin layer over the `dom_query` crate. The document is an arena of nodes
//! addressed by stable ids, so every edit below (insert-sibling, move
//! children, detach) is an id-level relink: a handle collected before an
//! edit still names the same node afterwards.
//!
//! The rest of the crate goes through these helpers instead of calling
//! `dom_query` directly, which keeps the mutation vocabulary small.

// Re-export core types for external use
pub use dom_query::{Document, NodeRef, Selection};

pub use tendril::StrTendril;

/// Parse an HTML string into a mutable document tree.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

// === Attribute Operations ===

/// Get any attribute value of the first node in the selection.
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Get an attribute value, treating an empty or whitespace-only value as absent.
#[must_use]
pub fn non_empty_attribute(sel: &Selection, name: &str) -> Option<String> {
    get_attribute(sel, name).filter(|v| !v.trim().is_empty())
}

/// Set an attribute value on every node in the selection.
#[inline]
pub fn set_attribute(sel: &Selection, name: &str, value: &str) {
    sel.set_attr(name, value);
}

// === Tag/Node Information ===

/// Get tag name (lowercase) of a single node. Text nodes have none.
#[must_use]
pub fn node_tag(node: &NodeRef) -> Option<String> {
    if !node.is_element() {
        return None;
    }
    node.node_name().map(|t| t.to_string())
}

/// First node of a selection, if any.
#[inline]
#[must_use]
pub fn first_node<'a>(sel: &Selection<'a>) -> Option<NodeRef<'a>> {
    sel.nodes().first().copied()
}

// === Text Content ===

/// Get all text content of node and descendants.
///
/// Returns `StrTendril` for zero-copy passing. Use `.to_string()` only when
/// you need owned storage.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Get inner HTML content of the first node in the selection.
#[inline]
#[must_use]
pub fn inner_html(sel: &Selection) -> StrTendril {
    sel.inner_html()
}

/// Get outer HTML content of the first node in the selection.
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> StrTendril {
    sel.html()
}

// === Tree Manipulation ===

/// Remove elements from tree.
#[inline]
pub fn remove(sel: &Selection) {
    sel.remove();
}

/// Rename element tag.
#[inline]
pub fn rename(sel: &Selection, new_tag: &str) {
    sel.rename(new_tag);
}

/// Clone an element with all descendants into a standalone document.
///
/// The clone can be edited freely without touching the source tree.
#[must_use]
pub fn clone_element(sel: &Selection) -> Document {
    Document::from(outer_html(sel))
}

/// Create a detached element in `doc`'s arena.
#[must_use]
pub fn new_element<'a>(doc: &'a Document, tag: &str) -> NodeRef<'a> {
    doc.tree.new_element(tag)
}

/// Create a detached text node in `doc`'s arena.
#[must_use]
pub fn new_text<'a>(doc: &'a Document, text: &str) -> NodeRef<'a> {
    doc.tree.new_text(text)
}

/// Create a detached `<tag>text</tag>` element. The text is stored as a text
/// node, so it is escaped on serialization.
#[must_use]
pub fn element_with_text<'a>(doc: &'a Document, tag: &str, text: &str) -> NodeRef<'a> {
    let el = new_element(doc, tag);
    el.append_child(&new_text(doc, text));
    el
}

/// Insert `node` as the immediate previous sibling of `anchor`.
///
/// `node` is detached first, so this also moves nodes already in the tree.
pub fn insert_before(anchor: &NodeRef, node: &NodeRef) {
    node.remove_from_parent();
    anchor.insert_before(node);
}

/// Insert `node` as the immediate next sibling of `anchor`.
pub fn insert_after(anchor: &NodeRef, node: &NodeRef) {
    node.remove_from_parent();
    anchor.insert_after(node);
}

/// Append `node` as the last child of `parent`.
pub fn append_child(parent: &NodeRef, node: &NodeRef) {
    node.remove_from_parent();
    parent.append_child(node);
}

/// Detach a node (and its subtree) from its parent.
#[inline]
pub fn detach(node: &NodeRef) {
    node.remove_from_parent();
}

/// Detach every child of `node`, text nodes included.
pub fn clear_children(node: &NodeRef) {
    for child in node.children() {
        child.remove_from_parent();
    }
}

/// Move every child of `from` to the end of `to`, preserving order.
pub fn move_children(from: &NodeRef, to: &NodeRef) {
    for child in from.children() {
        append_child(to, &child);
    }
}

/// First descendant text node with non-empty content, in document order.
#[must_use]
pub fn first_text_descendant<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    for child in node.children() {
        if child.is_text() {
            if !child.text().is_empty() {
                return Some(child);
            }
        } else if let Some(found) = first_text_descendant(&child) {
            return Some(found);
        }
    }
    None
}

/// Last descendant text node with non-empty content, in document order.
#[must_use]
pub fn last_text_descendant<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    for child in node.children().into_iter().rev() {
        if child.is_text() {
            if !child.text().is_empty() {
                return Some(child);
            }
        } else if let Some(found) = last_text_descendant(&child) {
            return Some(found);
        }
    }
    None
}

/// Replace a text node's content by swapping in a fresh text node.
pub fn replace_text(doc: &Document, text_node: &NodeRef, text: &str) {
    let fresh = new_text(doc, text);
    text_node.insert_before(&fresh);
    text_node.remove_from_parent();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_select() {
        let doc = parse(r#"<div id="main" class="container">content</div>"#);
        let div = doc.select("div");

        assert_eq!(get_attribute(&div, "id"), Some("main".to_string()));
        assert_eq!(first_node(&div).and_then(|n| node_tag(&n)), Some("div".to_string()));
        assert_eq!(non_empty_attribute(&div, "title"), None);
    }

    #[test]
    fn test_insert_siblings() {
        let doc = parse(r#"<div><p id="a">a</p><p id="b">b</p></div>"#);
        let b = first_node(&doc.select("#b")).expect("b");

        insert_before(&b, &new_element(&doc, "hr"));
        insert_after(&b, &element_with_text(&doc, "p", "c"));

        assert_eq!(
            inner_html(&doc.select("div")).to_string(),
            r#"<p id="a">a</p><hr><p id="b">b</p><p>c</p>"#
        );
    }

    #[test]
    fn test_insert_before_moves_attached_node() {
        let doc = parse(r#"<div><p id="a">a</p><p id="b">b</p></div>"#);
        let a = first_node(&doc.select("#a")).expect("a");
        let b = first_node(&doc.select("#b")).expect("b");

        insert_before(&a, &b);

        assert_eq!(
            inner_html(&doc.select("div")).to_string(),
            r#"<p id="b">b</p><p id="a">a</p>"#
        );
    }

    #[test]
    fn test_move_children_preserves_order() {
        let doc = parse(r#"<div><em id="x">one <b>two</b></em><em id="y"> three</em></div>"#);
        let x = first_node(&doc.select("#x")).expect("x");
        let y = first_node(&doc.select("#y")).expect("y");

        move_children(&y, &x);
        detach(&y);

        assert_eq!(
            inner_html(&doc.select("div")).to_string(),
            r#"<em id="x">one <b>two</b> three</em>"#
        );
    }

    #[test]
    fn test_text_descendants_skip_markup() {
        let doc = parse(r#"<p><span><b>first</b> mid</span><i>last</i></p>"#);
        let p = first_node(&doc.select("p")).expect("p");

        let first = first_text_descendant(&p).expect("first");
        let last = last_text_descendant(&p).expect("last");
        assert_eq!(first.text().to_string(), "first");
        assert_eq!(last.text().to_string(), "last");
    }

    #[test]
    fn test_element_with_text_escapes() {
        let doc = parse("<div></div>");
        let div = first_node(&doc.select("div")).expect("div");
        append_child(&div, &element_with_text(&doc, "h1", "R&D <Ops>"));

        assert_eq!(
            inner_html(&doc.select("div")).to_string(),
            "<h1>R&amp;D &lt;Ops&gt;</h1>"
        );
    }

    #[test]
    fn test_clone_element_is_independent() {
        let doc = parse(r#"<div class="box"><p>keep</p></div>"#);
        let clone = clone_element(&doc.select(".box"));
        clone.select("p").remove();

        assert!(doc.select(".box p").exists());
        assert!(!clone.select(".box p").exists());
    }
}
