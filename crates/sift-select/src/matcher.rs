//! Compound tests and combinator walks.
//!
//! [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
//!
//! A selector is matched right to left: the anchor part is tested against the
//! candidate, then each part's incoming combinator decides which relatives of
//! the current node are tried for the part before it. Descendant and
//! subsequent-sibling walks backtrack, so `a b c` matches whenever *some* chain
//! of ancestors fits, not just the nearest one.

use crate::adapter::TreeAdapter;
use crate::query::Engine;
use crate::selector::{Combinator, CompoundPart};

/// Nodes reachable from a start node through one combinator, nearest first.
struct Relatives<'t, T: TreeAdapter + ?Sized> {
    tree: &'t T,
    combinator: Combinator,
    next: Option<T::Node>,
}

impl<'t, T: TreeAdapter + ?Sized> Relatives<'t, T> {
    fn new(tree: &'t T, node: T::Node, combinator: Combinator) -> Self {
        let next = match combinator {
            Combinator::Descendant | Combinator::Child => tree.parent(node),
            Combinator::NextSibling | Combinator::SubsequentSibling => {
                tree.prev_element_sibling(node)
            }
        };
        Self {
            tree,
            combinator,
            next,
        }
    }
}

impl<T: TreeAdapter + ?Sized> Iterator for Relatives<'_, T> {
    type Item = T::Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = match self.combinator {
            Combinator::Descendant => self.tree.parent(current),
            Combinator::SubsequentSibling => self.tree.prev_element_sibling(current),
            Combinator::Child | Combinator::NextSibling => None,
        };
        Some(current)
    }
}

impl<T: TreeAdapter + ?Sized> Engine<'_, T> {
    /// Whether `node` satisfies every constraint of `part`. Combinators are
    /// not considered.
    pub(crate) fn test_part(&self, node: T::Node, part: &CompoundPart) -> bool {
        let tree = self.tree;
        if !tree.is_element(node) {
            return false;
        }

        if let Some(id) = &part.id
            && tree.id(node) != Some(id.as_str())
        {
            return false;
        }

        if let Some(tag) = &part.tag_name
            && !tree
                .tag_name(node)
                .is_some_and(|name| name.eq_ignore_ascii_case(tag))
        {
            return false;
        }

        if !part.classes.iter().all(|class| tree.has_class(node, class)) {
            return false;
        }

        for (name, matchers) in &part.attributes {
            let Some(value) = tree.attribute(node, name) else {
                return false;
            };
            if !matchers.iter().all(|matcher| matcher.matches(value)) {
                return false;
            }
        }

        for (&kind, arguments) in &part.pseudos {
            if !arguments
                .iter()
                .all(|argument| self.pseudo_matches(kind, node, &argument.value))
            {
                return false;
            }
        }

        if let Some(inner) = &part.containment {
            let origin = [node];
            let contains = tree
                .descendants(node)
                .into_iter()
                .any(|descendant| self.match_list(inner, descendant, Some(&origin)));
            if !contains {
                return false;
            }
        }

        true
    }

    /// Whether `node` matches the chain `parts`, anchored at its last part.
    ///
    /// With `origins`, the leftmost part must additionally relate to one of
    /// them through its own combinator (descendant when it has none).
    pub(crate) fn match_parts(
        &self,
        parts: &[CompoundPart],
        node: T::Node,
        origins: Option<&[T::Node]>,
    ) -> bool {
        let Some((anchor, rest)) = parts.split_last() else {
            return false;
        };
        self.test_part(node, anchor) && self.match_rest(rest, anchor.combinator, node, origins)
    }

    /// `link` relates the node matched last to the last part of `parts`.
    fn match_rest(
        &self,
        parts: &[CompoundPart],
        link: Option<Combinator>,
        node: T::Node,
        origins: Option<&[T::Node]>,
    ) -> bool {
        let link = link.unwrap_or(Combinator::Descendant);
        let mut relatives = Relatives::new(self.tree, node, link);

        let Some((part, rest)) = parts.split_last() else {
            return origins.is_none_or(|origins| {
                relatives.any(|relative| origins.contains(&relative))
            });
        };

        relatives.any(|relative| {
            self.test_part(relative, part)
                && self.match_rest(rest, part.combinator, relative, origins)
        })
    }
}
