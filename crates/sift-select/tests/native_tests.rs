//! Tests for native evaluator delegation and fallback.

use std::cell::RefCell;
use std::sync::Arc;

use sift_dom::{DomTree, ElementData, NodeId};
use sift_select::{
    CapabilityProfile, Engine, NativeError, NativeEvaluator, PseudoRegistry, SelectorCache,
    SelectorParser,
};

fn el(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let data = attrs
        .iter()
        .fold(ElementData::new(tag), |data, (name, value)| data.with_attr(*name, *value));
    tree.append_element(parent, data)
}

fn native_parser(native_evaluator: bool) -> SelectorParser {
    let profile = CapabilityProfile {
        native_evaluator,
        ..CapabilityProfile::manual()
    };
    SelectorParser::new(
        Arc::new(PseudoRegistry::standard()),
        Arc::new(profile),
        SelectorCache::default(),
    )
}

/// Rejects everything, remembering what it was asked.
#[derive(Default)]
struct Rejecting {
    calls: RefCell<Vec<String>>,
}

impl NativeEvaluator<DomTree> for Rejecting {
    fn query_all(
        &self,
        _tree: &DomTree,
        _scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, NativeError> {
        self.calls.borrow_mut().push(selector.to_owned());
        Err(NativeError {
            selector: selector.to_owned(),
            reason: "unsupported".to_owned(),
        })
    }
}

/// Answers correctly by running a manual engine, remembering what it was asked.
struct Recording {
    manual: SelectorParser,
    calls: RefCell<Vec<String>>,
}

impl Recording {
    fn new() -> Self {
        Self {
            manual: SelectorParser::default(),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl NativeEvaluator<DomTree> for Recording {
    fn query_all(
        &self,
        tree: &DomTree,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, NativeError> {
        self.calls.borrow_mut().push(selector.to_owned());
        Engine::new(tree, &self.manual)
            .query(selector, scope)
            .map_err(|err| NativeError {
                selector: selector.to_owned(),
                reason: err.to_string(),
            })
    }
}

/// Three `div`s, the first two with class `x`, each holding one `p`.
fn fixture() -> (DomTree, Vec<NodeId>) {
    let mut tree = DomTree::new();
    let mut divs = Vec::new();
    for class in ["x", "x", "y"] {
        let div = el(&mut tree, NodeId::ROOT, "div", &[("class", class)]);
        let _ = el(&mut tree, div, "p", &[("class", "x")]);
        divs.push(div);
    }
    (tree, divs)
}

#[test]
fn test_failed_native_falls_back_for_good() {
    let (tree, divs) = fixture();
    let parser = native_parser(true);
    let native = Rejecting::default();
    let engine = Engine::new(&tree, &parser).with_native(&native);

    assert_eq!(engine.query("div.x", NodeId::ROOT).unwrap(), vec![divs[0], divs[1]]);
    assert_eq!(engine.query("div.x", NodeId::ROOT).unwrap(), vec![divs[0], divs[1]]);
    assert_eq!(native.calls.borrow().len(), 1);

    let list = parser.parse("div.x").unwrap();
    assert!(list.selectors[0].native_failed());
}

#[test]
fn test_fallback_is_per_selector() {
    let (tree, _) = fixture();
    let parser = native_parser(true);
    let native = Rejecting::default();
    let engine = Engine::new(&tree, &parser).with_native(&native);

    let _ = engine.query("div.x", NodeId::ROOT).unwrap();
    let _ = engine.query("div.y", NodeId::ROOT).unwrap();
    let _ = engine.query("div.x, div.y", NodeId::ROOT).unwrap();
    assert_eq!(*native.calls.borrow(), vec!["div.x", "div.y", "div.x", "div.y"]);
}

#[test]
fn test_native_results_are_used() {
    let (tree, divs) = fixture();
    let parser = native_parser(true);
    let native = Recording::new();
    let engine = Engine::new(&tree, &parser).with_native(&native);

    assert_eq!(engine.query("div.x", NodeId::ROOT).unwrap(), vec![divs[0], divs[1]]);
    assert_eq!(native.calls(), vec!["div.x"]);
}

#[test]
fn test_partial_native_support_is_refiltered() {
    let mut tree = DomTree::new();
    let list = el(&mut tree, NodeId::ROOT, "ul", &[]);
    let first = el(&mut tree, list, "li", &[("class", "x")]);
    let _second = el(&mut tree, list, "li", &[("class", "x")]);

    let parser = native_parser(true);
    let native = Recording::new();
    let engine = Engine::new(&tree, &parser).with_native(&native);

    assert_eq!(engine.query("li.x:first-child", NodeId::ROOT).unwrap(), vec![first]);
    assert_eq!(native.calls(), vec!["li.x"]);
}

#[test]
fn test_multiple_origins_are_refiltered() {
    let (tree, divs) = fixture();
    let parser = native_parser(true);
    let native = Recording::new();
    let engine = Engine::new(&tree, &parser).with_native(&native);

    let found = engine.query("p.x", vec![divs[0], divs[2]]).unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|&p| {
        let parent = tree.parent(p).unwrap();
        parent == divs[0] || parent == divs[2]
    }));
    assert_eq!(native.calls(), vec!["p.x"]);
}

#[test]
fn test_native_skipped_when_not_worth_it() {
    let (tree, _) = fixture();
    let parser = native_parser(true);
    let native = Recording::new();
    let engine = Engine::new(&tree, &parser).with_native(&native);

    // Single direct lookups and getter-seeded anchors stay manual.
    let _ = engine.query("div", NodeId::ROOT).unwrap();
    let _ = engine.query(".x", NodeId::ROOT).unwrap();
    let _ = engine.query("div:root", NodeId::ROOT).unwrap();
    assert!(native.calls().is_empty());
}

#[test]
fn test_native_skipped_without_capability() {
    let (tree, divs) = fixture();
    let parser = native_parser(false);
    let native = Recording::new();
    let engine = Engine::new(&tree, &parser).with_native(&native);

    assert_eq!(engine.query("div.x", NodeId::ROOT).unwrap(), vec![divs[0], divs[1]]);
    assert!(native.calls().is_empty());
}
