//! Integration tests for pseudo-class matching.

use sift_dom::{DomTree, ElementData, NodeId};
use sift_select::{Engine, SelectorParser, StaticHost};

fn el(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let data = attrs
        .iter()
        .fold(ElementData::new(tag), |data, (name, value)| data.with_attr(*name, *value));
    tree.append_element(parent, data)
}

fn children(tree: &mut DomTree, parent: NodeId, tags: &[&str]) -> Vec<NodeId> {
    tags.iter().map(|tag| el(tree, parent, tag, &[])).collect()
}

fn run(tree: &DomTree, selector: &str, scope: NodeId) -> Vec<NodeId> {
    let parser = SelectorParser::default();
    Engine::new(tree, &parser).query(selector, scope).unwrap()
}

#[test]
fn test_nth_child() {
    let mut tree = DomTree::new();
    let list = el(&mut tree, NodeId::ROOT, "ul", &[]);
    let items = children(&mut tree, list, &["li", "li", "li", "li", "li"]);

    assert_eq!(run(&tree, ":nth-child(odd)", list), vec![items[0], items[2], items[4]]);
    assert_eq!(run(&tree, "li:nth-child(2n)", list), vec![items[1], items[3]]);
    assert_eq!(run(&tree, "li:nth-child(-n+2)", list), vec![items[0], items[1]]);
    assert_eq!(run(&tree, "li:nth-child(3)", list), vec![items[2]]);
    assert_eq!(run(&tree, ":nth-last-child(1)", list), vec![items[4]]);
    assert_eq!(run(&tree, "li:nth-last-child(2n+1)", list), vec![items[0], items[2], items[4]]);
}

#[test]
fn test_nth_child_skips_text_siblings() {
    let mut tree = DomTree::new();
    let list = el(&mut tree, NodeId::ROOT, "ul", &[]);
    let _ = tree.append_text(list, "\n  ");
    let first = el(&mut tree, list, "li", &[]);
    let _ = tree.append_text(list, "\n  ");
    let second = el(&mut tree, list, "li", &[]);

    assert_eq!(run(&tree, "li:first-child", list), vec![first]);
    assert_eq!(run(&tree, "li:nth-child(2)", list), vec![second]);
    assert_eq!(run(&tree, "li:last-child", list), vec![second]);
}

#[test]
fn test_first_last_only_child() {
    let mut tree = DomTree::new();
    let pair = el(&mut tree, NodeId::ROOT, "div", &[]);
    let kids = children(&mut tree, pair, &["p", "p"]);
    let single = el(&mut tree, NodeId::ROOT, "div", &[]);
    let alone = el(&mut tree, single, "p", &[]);

    assert_eq!(run(&tree, "p:first-child", NodeId::ROOT), vec![kids[0], alone]);
    assert_eq!(run(&tree, "p:last-child", NodeId::ROOT), vec![kids[1], alone]);
    assert_eq!(run(&tree, "p:only-child", NodeId::ROOT), vec![alone]);
}

#[test]
fn test_of_type() {
    let mut tree = DomTree::new();
    let div = el(&mut tree, NodeId::ROOT, "div", &[]);
    let nodes = children(&mut tree, div, &["span", "p", "span", "p", "em"]);
    let [span1, p1, span2, p2, em] = [nodes[0], nodes[1], nodes[2], nodes[3], nodes[4]];

    assert_eq!(run(&tree, "span:first-of-type", div), vec![span1]);
    assert_eq!(run(&tree, "p:last-of-type", div), vec![p2]);
    assert_eq!(run(&tree, ":only-of-type", div), vec![em]);
    assert_eq!(run(&tree, "span:nth-of-type(2)", div), vec![span2]);
    assert_eq!(run(&tree, ":nth-of-type(1)", div), vec![span1, p1, em]);
    assert_eq!(run(&tree, ":nth-last-of-type(1)", div), vec![span2, p2, em]);
}

#[test]
fn test_relative_match() {
    let mut tree = DomTree::new();
    let list = el(&mut tree, NodeId::ROOT, "ul", &[]);
    let a = el(&mut tree, list, "li", &[("class", "x")]);
    let _plain = el(&mut tree, list, "li", &[]);
    let b = el(&mut tree, list, "li", &[("class", "x")]);
    let c = el(&mut tree, list, "li", &[("class", "x y")]);

    assert_eq!(run(&tree, "li.x:first-match", list), vec![a]);
    assert_eq!(run(&tree, "li.x:last-match", list), vec![c]);
    assert_eq!(run(&tree, "li.x:nth-match(2)", list), vec![b]);
    assert_eq!(run(&tree, "li.x:nth-last-match(odd)", list), vec![a, c]);
    assert_eq!(run(&tree, "li.y:only-match", list), vec![c]);
    assert!(run(&tree, "li.x:only-match", list).is_empty());
}

#[test]
fn test_empty() {
    let mut tree = DomTree::new();
    let bare = el(&mut tree, NodeId::ROOT, "div", &[]);
    let commented = el(&mut tree, NodeId::ROOT, "div", &[]);
    let _ = tree.append_comment(commented, "note");
    let spaced = el(&mut tree, NodeId::ROOT, "div", &[]);
    let _ = tree.append_text(spaced, " ");
    let parent = el(&mut tree, NodeId::ROOT, "div", &[]);
    let _ = el(&mut tree, parent, "br", &[]);

    let found = run(&tree, "div:empty", NodeId::ROOT);
    assert_eq!(found, vec![bare, commented]);
}

#[test]
fn test_not_and_matches() {
    let mut tree = DomTree::new();
    let a = el(&mut tree, NodeId::ROOT, "p", &[("class", "a")]);
    let b = el(&mut tree, NodeId::ROOT, "p", &[("class", "b")]);
    let c = el(&mut tree, NodeId::ROOT, "p", &[("class", "c")]);
    let span = el(&mut tree, NodeId::ROOT, "span", &[("class", "a")]);

    assert_eq!(run(&tree, "p:not(.a)", NodeId::ROOT), vec![b, c]);
    assert_eq!(run(&tree, "p:not(.a, .b)", NodeId::ROOT), vec![c]);
    assert_eq!(run(&tree, "p:matches(.a, .c)", NodeId::ROOT), vec![a, c]);
    assert_eq!(run(&tree, ":matches(.a)", NodeId::ROOT), vec![a, span]);
    assert_eq!(run(&tree, ".a:not(span)", NodeId::ROOT), vec![a]);
    assert_eq!(run(&tree, "p:not(:not(.b))", NodeId::ROOT), vec![b]);
}

#[test]
fn test_matches_with_combinator_inside() {
    let mut tree = DomTree::new();
    let nav = el(&mut tree, NodeId::ROOT, "nav", &[]);
    let in_nav = el(&mut tree, nav, "a", &[]);
    let _outside = el(&mut tree, NodeId::ROOT, "a", &[]);

    assert_eq!(run(&tree, "a:matches(nav a)", NodeId::ROOT), vec![in_nav]);
    assert_eq!(run(&tree, "a:not(nav > a)", NodeId::ROOT).len(), 1);
}

#[test]
fn test_lang_and_dir_inherit() {
    let mut tree = DomTree::new();
    let html = el(&mut tree, NodeId::ROOT, "html", &[("lang", "en-US"), ("dir", "rtl")]);
    let body = el(&mut tree, html, "body", &[]);
    let german = el(&mut tree, body, "p", &[("lang", "de"), ("dir", "ltr")]);
    let english = el(&mut tree, body, "p", &[]);

    assert_eq!(run(&tree, "p:lang(en)", NodeId::ROOT), vec![english]);
    assert_eq!(run(&tree, "p:lang(EN-us)", NodeId::ROOT), vec![english]);
    assert!(run(&tree, "p:lang(e)", NodeId::ROOT).is_empty());
    assert_eq!(run(&tree, "p:lang('de')", NodeId::ROOT), vec![german]);
    assert_eq!(run(&tree, "p:dir(rtl)", NodeId::ROOT), vec![english]);
    assert_eq!(run(&tree, "p:dir(ltr)", NodeId::ROOT), vec![german]);
}

#[test]
fn test_dir_defaults_to_ltr() {
    let mut tree = DomTree::new();
    let p = el(&mut tree, NodeId::ROOT, "p", &[]);

    assert_eq!(run(&tree, ":dir(ltr)", NodeId::ROOT), vec![p]);
    assert!(run(&tree, ":dir(rtl)", NodeId::ROOT).is_empty());
    assert!(run(&tree, ":lang(en)", NodeId::ROOT).is_empty());
}

#[test]
fn test_form_state() {
    let mut tree = DomTree::new();
    let form = el(&mut tree, NodeId::ROOT, "form", &[]);
    let off = el(&mut tree, form, "input", &[("disabled", "")]);
    let on = el(&mut tree, form, "input", &[("checked", "")]);
    let select = el(&mut tree, form, "select", &[]);
    let chosen = el(&mut tree, select, "option", &[("selected", "")]);
    let maybe = el(&mut tree, form, "input", &[("indeterminate", "")]);

    assert_eq!(run(&tree, "input:disabled", form), vec![off]);
    assert_eq!(run(&tree, "input:enabled", form), vec![on, maybe]);
    assert_eq!(run(&tree, ":checked", form), vec![on, chosen]);
    assert_eq!(run(&tree, ":indeterminate", form), vec![maybe]);
}

#[test]
fn test_any_link() {
    let mut tree = DomTree::new();
    let anchor = el(&mut tree, NodeId::ROOT, "a", &[("href", "/x")]);
    let area = el(&mut tree, NodeId::ROOT, "area", &[("href", "/y")]);
    let _named = el(&mut tree, NodeId::ROOT, "a", &[("name", "top")]);
    let _span = el(&mut tree, NodeId::ROOT, "span", &[("href", "/z")]);

    assert_eq!(run(&tree, ":any-link", NodeId::ROOT), vec![anchor, area]);
}

#[test]
fn test_local_link() {
    let mut tree = DomTree::new();
    let sibling = el(&mut tree, NodeId::ROOT, "a", &[("href", "https://example.com/docs/api")]);
    let same = el(
        &mut tree,
        NodeId::ROOT,
        "a",
        &[("href", "https://example.com/docs/guide/intro#setup")],
    );
    let foreign = el(&mut tree, NodeId::ROOT, "a", &[("href", "https://other.org/docs")]);
    let _relative = el(&mut tree, NodeId::ROOT, "a", &[("href", "guide/intro")]);

    let host: StaticHost<NodeId> = StaticHost {
        location: Some("https://example.com/docs/guide/intro?page=2#top".to_owned()),
        ..StaticHost::default()
    };
    let parser = SelectorParser::default();
    let engine = Engine::new(&tree, &parser).with_host(&host);
    let query = |selector: &str| engine.query(selector, NodeId::ROOT).unwrap();

    assert_eq!(query(":local-link"), vec![same]);
    assert_eq!(query(":local-link(2)"), vec![sibling, same]);
    assert_eq!(query(":local-link(3)"), vec![same]);
    assert_eq!(query(":local-link(0)"), vec![sibling, same, foreign]);
    assert!(query(":local-link(9)").is_empty());
}

#[test]
fn test_local_link_without_location() {
    let mut tree = DomTree::new();
    let _ = el(&mut tree, NodeId::ROOT, "a", &[("href", "https://example.com/")]);

    assert!(run(&tree, ":local-link(0)", NodeId::ROOT).is_empty());
}

#[test]
fn test_focus_requires_focusable_element_and_focused_document() {
    let mut tree = DomTree::new();
    let input = el(&mut tree, NodeId::ROOT, "input", &[("type", "text")]);
    let div = el(&mut tree, NodeId::ROOT, "div", &[]);
    let parser = SelectorParser::default();

    let focused = StaticHost {
        active: Some(input),
        ..StaticHost::default()
    };
    let engine = Engine::new(&tree, &parser).with_host(&focused);
    assert_eq!(engine.query(":focus", NodeId::ROOT).unwrap(), vec![input]);
    assert!(engine.matches("input:focus", input, None).unwrap());

    let blurred = StaticHost {
        active: Some(input),
        focused: false,
        ..StaticHost::default()
    };
    let engine = Engine::new(&tree, &parser).with_host(&blurred);
    assert!(engine.query(":focus", NodeId::ROOT).unwrap().is_empty());

    let plain = StaticHost {
        active: Some(div),
        ..StaticHost::default()
    };
    let engine = Engine::new(&tree, &parser).with_host(&plain);
    assert!(engine.query(":focus", NodeId::ROOT).unwrap().is_empty());
}

#[test]
fn test_target() {
    let mut tree = DomTree::new();
    let section = el(&mut tree, NodeId::ROOT, "section", &[("id", "intro")]);
    let parser = SelectorParser::default();

    let none: StaticHost<NodeId> = StaticHost::default();
    let engine = Engine::new(&tree, &parser).with_host(&none);
    assert!(engine.query(":target", NodeId::ROOT).unwrap().is_empty());

    let empty: StaticHost<NodeId> = StaticHost {
        fragment: Some(String::new()),
        ..StaticHost::default()
    };
    let engine = Engine::new(&tree, &parser).with_host(&empty);
    assert!(engine.query(":target", NodeId::ROOT).unwrap().is_empty());

    let hit: StaticHost<NodeId> = StaticHost {
        fragment: Some("intro".to_owned()),
        ..StaticHost::default()
    };
    let engine = Engine::new(&tree, &parser).with_host(&hit);
    assert_eq!(engine.query("section:target", NodeId::ROOT).unwrap(), vec![section]);
    assert!(engine.query("div:target", NodeId::ROOT).unwrap().is_empty());
}

#[test]
fn test_root() {
    let mut tree = DomTree::new();
    let _ = tree.append_comment(NodeId::ROOT, "doctype stand-in");
    let html = el(&mut tree, NodeId::ROOT, "html", &[]);
    let body = el(&mut tree, html, "body", &[]);

    assert_eq!(run(&tree, ":root", NodeId::ROOT), vec![html]);
    assert_eq!(run(&tree, ":root > body", NodeId::ROOT), vec![body]);
    assert!(run(&tree, "body:root", NodeId::ROOT).is_empty());
}

#[test]
fn test_pseudo_names_are_case_insensitive() {
    let mut tree = DomTree::new();
    let list = el(&mut tree, NodeId::ROOT, "ul", &[]);
    let items = children(&mut tree, list, &["li", "li"]);

    assert_eq!(run(&tree, "li:FIRST-CHILD", list), vec![items[0]]);
    assert_eq!(run(&tree, "li:Nth-Child(2)", list), vec![items[1]]);
}
