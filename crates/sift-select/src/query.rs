//! Query orchestration.
//!
//! [`Engine`] is the public entry point. For every branch of a parsed
//! selector it decides between the host's native evaluator and manual
//! matching, picks the cheapest candidate source for manual matching (id
//! anchor, pseudo getter, class lookup, name lookup, tag scan), filters
//! candidates when needed and merges the per-branch results.

use std::collections::HashSet;

use tracing::{trace, warn};

use crate::adapter::{HostContext, NativeEvaluator, NoHost, NodeKind, TreeAdapter};
use crate::capability::CapabilityProfile;
use crate::error::Error;
use crate::parser::SelectorParser;
use crate::selector::{Combinator, Selector, SelectorList};

/// Where a query searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope<N> {
    /// Descendants of one element or document.
    Node(N),
    /// Descendants of any element or document in the list.
    Nodes(Vec<N>),
}

impl<N> From<Vec<N>> for Scope<N> {
    fn from(nodes: Vec<N>) -> Self {
        Self::Nodes(nodes)
    }
}

impl<N: Copy> From<&[N]> for Scope<N> {
    fn from(nodes: &[N]) -> Self {
        Self::Nodes(nodes.to_vec())
    }
}

impl<N: Copy> Scope<N> {
    fn nodes(&self) -> &[N] {
        match self {
            Self::Node(node) => std::slice::from_ref(node),
            Self::Nodes(nodes) => nodes,
        }
    }
}

/// Evaluates selectors against one tree.
///
/// ```
/// use sift_dom::{DomTree, ElementData, NodeId};
/// use sift_select::{Engine, SelectorParser};
///
/// let mut tree = DomTree::new();
/// let list = tree.append_element(NodeId::ROOT, ElementData::new("ul"));
/// let item = tree.append_element(list, ElementData::new("li").with_attr("class", "done"));
///
/// let parser = SelectorParser::default();
/// let engine = Engine::new(&tree, &parser);
/// assert_eq!(engine.query("ul > li.done", NodeId::ROOT).unwrap(), vec![item]);
/// ```
pub struct Engine<'a, T: TreeAdapter + ?Sized> {
    pub(crate) tree: &'a T,
    parser: &'a SelectorParser,
    pub(crate) host: &'a dyn HostContext<T::Node>,
    native: Option<&'a dyn NativeEvaluator<T>>,
}

impl<'a, T: TreeAdapter + ?Sized> Engine<'a, T> {
    /// Engine with no host state and no native evaluator.
    #[must_use]
    pub fn new(tree: &'a T, parser: &'a SelectorParser) -> Self {
        Self {
            tree,
            parser,
            host: &NoHost,
            native: None,
        }
    }

    /// Use `host` for focus, fragment and location queries.
    #[must_use]
    pub fn with_host(mut self, host: &'a dyn HostContext<T::Node>) -> Self {
        self.host = host;
        self
    }

    /// Offer `native` for branches the profile says it can evaluate.
    #[must_use]
    pub fn with_native(mut self, native: &'a dyn NativeEvaluator<T>) -> Self {
        self.native = Some(native);
        self
    }

    /// The tree being queried.
    #[must_use]
    pub const fn tree(&self) -> &'a T {
        self.tree
    }

    pub(crate) fn profile(&self) -> &CapabilityProfile {
        self.parser.profile()
    }

    fn check_nodes(&self, nodes: &[T::Node]) -> Result<(), Error> {
        match nodes.iter().find(|&&node| !self.tree.contains(node)) {
            Some(node) => Err(Error::UnknownNode(format!("{node:?}"))),
            None => Ok(()),
        }
    }

    /// Every node under `scope` matching `selector`, each exactly once.
    ///
    /// Within one comma branch results come in tree order; branches are
    /// concatenated without re-sorting.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] if a scope node is foreign to the tree,
    /// [`Error::Syntax`] if `selector` does not parse.
    pub fn query(
        &self,
        selector: &str,
        scope: impl Into<Scope<T::Node>>,
    ) -> Result<Vec<T::Node>, Error> {
        let scope = scope.into();
        self.check_nodes(scope.nodes())?;
        let list = self.parser.parse(selector)?;
        Ok(self.select(&list, &scope))
    }

    /// First result of [`Engine::query`].
    ///
    /// # Errors
    ///
    /// Same as [`Engine::query`].
    pub fn query_one(
        &self,
        selector: &str,
        scope: impl Into<Scope<T::Node>>,
    ) -> Result<Option<T::Node>, Error> {
        Ok(self.query(selector, scope)?.into_iter().next())
    }

    /// Whether `node` matches `selector`. With `origins`, the leftmost part
    /// must also relate to one of them (so `"> p"` means "a child of an origin").
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] for foreign nodes, [`Error::Syntax`] for bad selectors.
    pub fn matches(
        &self,
        selector: &str,
        node: T::Node,
        origins: Option<&[T::Node]>,
    ) -> Result<bool, Error> {
        self.check_nodes(&[node])?;
        if let Some(origins) = origins {
            self.check_nodes(origins)?;
        }
        let list = self.parser.parse(selector)?;
        Ok(self.match_list(&list, node, origins))
    }

    /// The nodes of `nodes` matching `selector`, in input order.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] for foreign nodes, [`Error::Syntax`] for bad selectors.
    pub fn filter(&self, selector: &str, nodes: &[T::Node]) -> Result<Vec<T::Node>, Error> {
        self.check_nodes(nodes)?;
        let list = self.parser.parse(selector)?;
        Ok(self.filter_list(&list, nodes, None))
    }

    /// The element nodes of `nodes`, in input order.
    #[must_use]
    pub fn filter_elements(&self, nodes: &[T::Node]) -> Vec<T::Node> {
        nodes
            .iter()
            .copied()
            .filter(|&node| self.tree.is_element(node))
            .collect()
    }

    /// Evaluate an already parsed list.
    #[must_use]
    pub fn select(&self, list: &SelectorList, scope: &Scope<T::Node>) -> Vec<T::Node> {
        let origins: Vec<T::Node> = scope
            .nodes()
            .iter()
            .copied()
            .filter(|&node| {
                matches!(self.tree.kind(node), NodeKind::Element | NodeKind::Document)
            })
            .collect();
        let search_on = match origins.as_slice() {
            [] => return Vec::new(),
            [only] => *only,
            [first, ..] => self.tree.root(*first),
        };

        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for selector in list {
            for node in self.select_selector(selector, search_on, &origins) {
                if seen.insert(node) {
                    results.push(node);
                }
            }
        }
        results
    }

    /// Whether any branch of `list` matches `node`.
    #[must_use]
    pub fn match_list(
        &self,
        list: &SelectorList,
        node: T::Node,
        origins: Option<&[T::Node]>,
    ) -> bool {
        list.iter()
            .any(|selector| self.match_parts(&selector.parts, node, origins))
    }

    /// The nodes of `nodes` matching `list`, in input order.
    #[must_use]
    pub fn filter_list(
        &self,
        list: &SelectorList,
        nodes: &[T::Node],
        origins: Option<&[T::Node]>,
    ) -> Vec<T::Node> {
        nodes
            .iter()
            .copied()
            .filter(|&node| self.match_list(list, node, origins))
            .collect()
    }

    fn select_selector(
        &self,
        selector: &Selector,
        search_on: T::Node,
        origins: &[T::Node],
    ) -> Vec<T::Node> {
        if let Some(found) = self.select_native(selector, search_on) {
            if origins.len() > 1 || !selector.full_support {
                return found
                    .into_iter()
                    .filter(|&node| self.match_parts(&selector.parts, node, Some(origins)))
                    .collect();
            }
            return found;
        }

        self.manual_candidates(selector, search_on, origins)
            .into_iter()
            .filter(|&node| self.match_parts(&selector.parts, node, Some(origins)))
            .collect()
    }

    fn select_native(&self, selector: &Selector, search_on: T::Node) -> Option<Vec<T::Node>> {
        let native = self.native?;
        if !self.profile().native_evaluator || !selector.use_native || selector.native_failed() {
            return None;
        }

        match native.query_all(self.tree, search_on, &selector.native) {
            Ok(found) => Some(found),
            Err(err) => {
                warn!(
                    selector = selector.native.as_str(),
                    error = %err,
                    "native evaluation failed, falling back to manual matching"
                );
                selector.mark_native_failed();
                None
            }
        }
    }

    /// Nodes that may match `selector`. Always a superset of the real matches
    /// under `search_on`, never the final answer.
    fn manual_candidates(
        &self,
        selector: &Selector,
        search_on: T::Node,
        origins: &[T::Node],
    ) -> Vec<T::Node> {
        let tree = self.tree;
        let Some(anchor) = selector.anchor() else {
            return Vec::new();
        };
        let root = tree.root(search_on);
        let mut search_on = search_on;

        let id_part = selector
            .id_anchor
            .filter(|_| tree.kind(root) == NodeKind::Document)
            .and_then(|index| Some((index, selector.parts.get(index)?.id.as_deref()?)));
        if let Some((index, id)) = id_part {
            trace!(id, "resolving id anchor");
            let Some(element) = tree.element_by_id(root, id) else {
                return Vec::new();
            };
            if !self.match_parts(&selector.parts[..=index], element, Some(origins)) {
                return Vec::new();
            }
            let Some(next) = selector.parts.get(index + 1) else {
                return vec![element];
            };
            search_on = match next.combinator {
                Some(Combinator::NextSibling | Combinator::SubsequentSibling) => {
                    let Some(parent) = tree.parent(element) else {
                        return Vec::new();
                    };
                    parent
                }
                _ => element,
            };
        }

        if let Some(getter) = &anchor.getter {
            trace!(pseudo = getter.kind.name(), "candidates from pseudo getter");
            return self.pseudo_candidates(getter, root, search_on);
        }
        if self.profile().class_lookup && !anchor.classes.is_empty() {
            trace!("candidates from class lookup");
            return tree.elements_by_class(search_on, &anchor.classes);
        }
        if let Some(name) = &anchor.search_name {
            trace!(name = name.as_str(), "candidates from name lookup");
            return tree.elements_by_name(root, name);
        }

        trace!(tag = anchor.tag_name.as_deref().unwrap_or("*"), "candidates from tag scan");
        let mut candidates = tree.elements_by_tag(search_on, anchor.tag_name.as_deref());
        if anchor.tag_name.is_none() && self.profile().wildcard_includes_non_elements {
            candidates.retain(|&node| tree.is_element(node));
        }
        candidates
    }
}
