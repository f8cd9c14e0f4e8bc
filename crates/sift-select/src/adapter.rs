//! Seams between the engine and its environment.
//!
//! The engine never assumes a concrete tree. It reads nodes through
//! [`TreeAdapter`], asks the host about focus and location through
//! [`HostContext`], and optionally hands whole selector strings to a
//! [`NativeEvaluator`].

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::NativeError;

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// The node kinds the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A document (tree root).
    Document,
    /// An element.
    Element,
    /// A text node.
    Text,
    /// A comment node.
    Comment,
    /// Anything else the tree may hold (doctype, processing instruction).
    Other,
}

/// Read-only view of a labeled node tree.
///
/// Implementors provide the raw accessors; everything else has a default
/// built on them. The candidate enumeration methods (`element_by_id`,
/// `elements_by_tag`, `elements_by_class`, `elements_by_name`) are the direct
/// lookups the query engine prefers over scanning, so indexed trees should
/// override them.
pub trait TreeAdapter {
    /// Cheap node handle.
    type Node: Copy + Eq + Hash + Debug;

    /// Whether `node` belongs to this tree.
    fn contains(&self, node: Self::Node) -> bool;

    /// The node's kind.
    fn kind(&self, node: Self::Node) -> NodeKind;

    /// Local name of an element; `None` for other kinds.
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    /// Value of an element attribute.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Parent node of any kind.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// First child of any kind.
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;

    /// Last child of any kind.
    fn last_child(&self, node: Self::Node) -> Option<Self::Node>;

    /// Following sibling of any kind.
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// Preceding sibling of any kind.
    fn prev_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// The `id` attribute.
    fn id(&self, node: Self::Node) -> Option<&str> {
        self.attribute(node, "id")
    }

    /// Whether `name` is one of the whitespace-separated tokens of `class`.
    fn has_class(&self, node: Self::Node, name: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == name))
    }

    /// Whether the node is an element.
    fn is_element(&self, node: Self::Node) -> bool {
        self.kind(node) == NodeKind::Element
    }

    /// Nearest preceding sibling that is an element.
    fn prev_element_sibling(&self, node: Self::Node) -> Option<Self::Node> {
        let mut current = self.prev_sibling(node);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.prev_sibling(sibling);
        }
        None
    }

    /// Nearest following sibling that is an element.
    fn next_element_sibling(&self, node: Self::Node) -> Option<Self::Node> {
        let mut current = self.next_sibling(node);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }

    /// First child that is an element.
    fn first_element_child(&self, node: Self::Node) -> Option<Self::Node> {
        let first = self.first_child(node)?;
        if self.is_element(first) {
            Some(first)
        } else {
            self.next_element_sibling(first)
        }
    }

    /// Last child that is an element.
    fn last_element_child(&self, node: Self::Node) -> Option<Self::Node> {
        let last = self.last_child(node)?;
        if self.is_element(last) {
            Some(last)
        } else {
            self.prev_element_sibling(last)
        }
    }

    /// Element children in order.
    fn element_children(&self, node: Self::Node) -> Vec<Self::Node> {
        let mut children = Vec::new();
        let mut current = self.first_element_child(node);
        while let Some(child) = current {
            children.push(child);
            current = self.next_element_sibling(child);
        }
        children
    }

    /// Topmost inclusive ancestor.
    fn root(&self, node: Self::Node) -> Self::Node {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    ///
    /// Detached subtrees (a `root` that is not a document) have none.
    fn document_element(&self, root: Self::Node) -> Option<Self::Node> {
        if self.kind(root) == NodeKind::Document {
            self.first_element_child(root)
        } else {
            None
        }
    }

    /// Every descendant of `scope` in tree order, `scope` excluded.
    fn descendants(&self, scope: Self::Node) -> Vec<Self::Node> {
        let mut out = Vec::new();
        let mut next = self.first_child(scope);
        while let Some(node) = next {
            out.push(node);
            next = self.first_child(node).or_else(|| {
                let mut cursor = node;
                loop {
                    if cursor == scope {
                        return None;
                    }
                    if let Some(sibling) = self.next_sibling(cursor) {
                        return Some(sibling);
                    }
                    cursor = self.parent(cursor)?;
                }
            });
        }
        out
    }

    /// First element under `root` whose id is `id`.
    fn element_by_id(&self, root: Self::Node, id: &str) -> Option<Self::Node> {
        self.descendants(root)
            .into_iter()
            .find(|&node| self.is_element(node) && self.id(node) == Some(id))
    }

    /// Elements under `scope` with the given local name (ASCII case-insensitive);
    /// `None` means every element.
    fn elements_by_tag(&self, scope: Self::Node, name: Option<&str>) -> Vec<Self::Node> {
        self.descendants(scope)
            .into_iter()
            .filter(|&node| {
                self.tag_name(node).is_some_and(|tag| {
                    name.is_none_or(|wanted| tag.eq_ignore_ascii_case(wanted))
                })
            })
            .collect()
    }

    /// Elements under `scope` carrying every class in `classes`.
    fn elements_by_class(&self, scope: Self::Node, classes: &[String]) -> Vec<Self::Node> {
        self.descendants(scope)
            .into_iter()
            .filter(|&node| {
                self.is_element(node) && classes.iter().all(|class| self.has_class(node, class))
            })
            .collect()
    }

    /// Elements under `root` whose `name` attribute equals `name`.
    fn elements_by_name(&self, root: Self::Node, name: &str) -> Vec<Self::Node> {
        self.descendants(root)
            .into_iter()
            .filter(|&node| self.is_element(node) && self.attribute(node, "name") == Some(name))
            .collect()
    }
}

/// Host state a handful of pseudo-classes depend on.
pub trait HostContext<N> {
    /// The focused element of the document rooted at `root`.
    fn active_element(&self, root: N) -> Option<N>;

    /// Current location fragment, without the leading `#`.
    fn fragment_id(&self) -> Option<String>;

    /// Whether the document currently has focus.
    fn has_focus(&self) -> bool {
        true
    }

    /// Current location, e.g. `https://example.com/a/b`.
    fn location(&self) -> Option<String> {
        None
    }
}

/// A host with nothing focused, no fragment and no location.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHost;

impl<N> HostContext<N> for NoHost {
    fn active_element(&self, _root: N) -> Option<N> {
        None
    }

    fn fragment_id(&self) -> Option<String> {
        None
    }
}

/// A host backed by plain values.
#[derive(Debug, Clone)]
pub struct StaticHost<N> {
    /// Focused element.
    pub active: Option<N>,
    /// Fragment without `#`.
    pub fragment: Option<String>,
    /// Whether the document has focus.
    pub focused: bool,
    /// Current location.
    pub location: Option<String>,
}

impl<N> Default for StaticHost<N> {
    fn default() -> Self {
        Self {
            active: None,
            fragment: None,
            focused: true,
            location: None,
        }
    }
}

impl<N: Copy> HostContext<N> for StaticHost<N> {
    fn active_element(&self, _root: N) -> Option<N> {
        self.active
    }

    fn fragment_id(&self) -> Option<String> {
        self.fragment.clone()
    }

    fn has_focus(&self) -> bool {
        self.focused
    }

    fn location(&self) -> Option<String> {
        self.location.clone()
    }
}

/// A host primitive that evaluates a selector string directly.
///
/// Only the canonical native string of a selector is ever passed in. Errors are
/// logged and the selector falls back to manual matching for good.
pub trait NativeEvaluator<T: TreeAdapter + ?Sized> {
    /// All elements under `scope` matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns a [`NativeError`] when the host rejects or fails to evaluate the string.
    fn query_all(
        &self,
        tree: &T,
        scope: T::Node,
        selector: &str,
    ) -> Result<Vec<T::Node>, NativeError>;
}
