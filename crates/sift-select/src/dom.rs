//! [`TreeAdapter`] for the arena tree in `sift-dom`.

use sift_dom::{DomTree, NodeId, NodeType};

use crate::adapter::{NodeKind, TreeAdapter};
use crate::query::Scope;

impl TreeAdapter for DomTree {
    type Node = NodeId;

    fn contains(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        match self.get(node).map(|n| &n.node_type) {
            Some(NodeType::Document) => NodeKind::Document,
            Some(NodeType::Element(_)) => NodeKind::Element,
            Some(NodeType::Text(_)) => NodeKind::Text,
            Some(NodeType::Comment(_)) => NodeKind::Comment,
            None => NodeKind::Other,
        }
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.as_element(node).map(|data| data.tag_name.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.as_element(node).and_then(|data| data.attr(name))
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Self::parent(self, node)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        Self::first_child(self, node)
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        Self::last_child(self, node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        Self::next_sibling(self, node)
    }

    fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        Self::prev_sibling(self, node)
    }

    fn has_class(&self, node: NodeId, name: &str) -> bool {
        self.as_element(node)
            .is_some_and(|data| data.classes().any(|class| class == name))
    }

    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        Self::descendants(self, scope).collect()
    }

    fn root(&self, node: NodeId) -> NodeId {
        self.ancestors(node).last().unwrap_or(node)
    }
}

impl From<NodeId> for Scope<NodeId> {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}
