//! Property tests: positional formulas and query/match agreement on random trees.

use std::collections::HashSet;

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use sift_dom::{DomTree, ElementData, NodeId, NodeType};
use sift_select::pseudo::nth::NthFormula;
use sift_select::{Engine, SelectorParser};

const TAGS: [&str; 3] = ["div", "p", "span"];
const CLASSES: [&str; 3] = ["a", "b", "a b"];
const SELECTORS: [&str; 20] = [
    "*",
    "div",
    "p.a",
    ".a.b",
    "div > p",
    "div p span",
    "p + span",
    "div ~ p",
    "> div",
    "span:first-child",
    "p:nth-child(2n+1)",
    "div:nth-last-of-type(2)",
    ":not(.b) > span",
    "p:matches(div > *)",
    "$div > span",
    ".a:nth-match(2), div:only-of-type",
    ":root",
    "div:root > p",
    ":matches(div p)",
    "span:matches(.a > *, p + *)",
];

/// Build a tree from `(parent, tag, class)` triples, each parent index taken
/// modulo the nodes created so far. With `detached`, everything hangs under
/// an unattached `div` instead of the document.
fn build(shape: &[(u8, u8, u8)], detached: bool) -> (DomTree, Vec<NodeId>) {
    let mut tree = DomTree::new();
    let base = if detached {
        tree.alloc(NodeType::Element(ElementData::new("div").with_attr("class", "a")))
    } else {
        NodeId::ROOT
    };
    let mut nodes = vec![base];
    for &(parent, tag, class) in shape.iter().take(40) {
        let parent = nodes[usize::from(parent) % nodes.len()];
        let data = ElementData::new(TAGS[usize::from(tag) % TAGS.len()])
            .with_attr("class", CLASSES[usize::from(class) % CLASSES.len()]);
        nodes.push(tree.append_element(parent, data));
    }
    (tree, nodes)
}

#[quickcheck]
fn nth_formula_agrees_with_enumeration(step: i8, offset: i8, position: u8) -> bool {
    let step = i32::from(step % 6);
    let offset = i32::from(offset % 12);
    let position = i32::from(position % 60) + 1;

    let expected = (0..=200).any(|k| step * k + offset == position);
    NthFormula::new(step, offset).matches(position) == expected
}

#[quickcheck]
fn nth_can_match_iff_some_position_matches(step: i8, offset: i8) -> bool {
    let formula = NthFormula::new(i32::from(step % 6), i32::from(offset % 12));
    formula.can_match() == (1..=200).any(|position| formula.matches(position))
}

#[quickcheck]
fn query_agrees_with_matches(
    shape: Vec<(u8, u8, u8)>,
    detached: bool,
    selector: u8,
    scope: u8,
) -> TestResult {
    let (tree, nodes) = build(&shape, detached);
    let scope = nodes[usize::from(scope) % nodes.len()];
    let selector = SELECTORS[usize::from(selector) % SELECTORS.len()];

    let parser = SelectorParser::default();
    let engine = Engine::new(&tree, &parser);
    let Ok(found) = engine.query(selector, scope) else {
        return TestResult::failed();
    };

    let unique: HashSet<NodeId> = found.iter().copied().collect();
    if unique.len() != found.len() {
        return TestResult::failed();
    }

    let expected: HashSet<NodeId> = tree
        .descendants(scope)
        .filter(|&node| engine.matches(selector, node, Some(&[scope])).unwrap_or(false))
        .collect();
    TestResult::from_bool(unique == expected)
}

#[quickcheck]
fn filter_is_order_preserving_subset(
    shape: Vec<(u8, u8, u8)>,
    detached: bool,
    selector: u8,
) -> bool {
    let (tree, mut nodes) = build(&shape, detached);
    nodes.reverse();
    let selector = SELECTORS[usize::from(selector) % SELECTORS.len()];

    let parser = SelectorParser::default();
    let engine = Engine::new(&tree, &parser);
    let Ok(kept) = engine.filter(selector, &nodes) else {
        return false;
    };

    let mut remaining = nodes.iter();
    kept.iter().all(|node| remaining.any(|candidate| candidate == node))
}
