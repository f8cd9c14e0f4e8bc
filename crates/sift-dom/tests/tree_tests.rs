//! Tests for tree construction and traversal.

use sift_dom::{DomTree, ElementData, NodeId, NodeType};

fn element(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
    tree.append_element(parent, ElementData::new(tag))
}

#[test]
fn test_append_links_siblings() {
    let mut tree = DomTree::new();
    let parent = element(&mut tree, NodeId::ROOT, "div");
    let a = element(&mut tree, parent, "a");
    let b = element(&mut tree, parent, "b");
    let c = element(&mut tree, parent, "c");

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(c), Some(b));
    assert_eq!(tree.next_sibling(c), None);
    assert_eq!(tree.parent(b), Some(parent));
}

#[test]
fn test_descendants_are_pre_order_and_scoped() {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, "html");
    let body = element(&mut tree, html, "body");
    let p = element(&mut tree, body, "p");
    let text = tree.append_text(p, "hi");
    let div = element(&mut tree, body, "div");
    let footer = element(&mut tree, html, "footer");

    let all: Vec<_> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(all, vec![html, body, p, text, div, footer]);

    // Scoped traversal must not leak into the scope's following siblings.
    let under_body: Vec<_> = tree.descendants(body).collect();
    assert_eq!(under_body, vec![p, text, div]);

    assert_eq!(tree.descendants(div).count(), 0);
}

#[test]
fn test_ancestors_and_connection() {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, "html");
    let body = element(&mut tree, html, "body");
    let detached = tree.alloc(NodeType::Element(ElementData::new("span")));

    assert_eq!(tree.ancestors(body).collect::<Vec<_>>(), vec![html, NodeId::ROOT]);
    assert!(tree.is_descendant_of(body, NodeId::ROOT));
    assert!(tree.is_connected(body));
    assert!(!tree.is_connected(detached));
    assert_eq!(tree.document_element(), Some(html));
}

#[test]
fn test_element_data_accessors() {
    let data = ElementData::new("div")
        .with_attr("id", "main")
        .with_attr("class", "a  b\tc");

    assert_eq!(data.id(), Some("main"));
    assert_eq!(data.classes().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert_eq!(data.attr("missing"), None);
}

#[test]
fn test_document_element_skips_comments() {
    let mut tree = DomTree::new();
    let _ = tree.append_comment(NodeId::ROOT, "doctype-ish");
    let html = element(&mut tree, NodeId::ROOT, "html");
    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.as_text(html), None);
}
