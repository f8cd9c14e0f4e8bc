use crate::adapter::{NodeKind, TreeAdapter};
use crate::pseudo::PseudoKind;
use crate::pseudo::nth::{Direction, NthFormula, nth_check};
use crate::query::{Engine, Scope};
use crate::selector::{CompoundPart, Getter, PseudoArg, Selector};

/// Elements that can carry a navigable `href`.
const LINK_TAGS: [&str; 3] = ["a", "area", "link"];

impl<T: TreeAdapter + ?Sized> Engine<'_, T> {
    /// Per-element predicate for one pseudo occurrence.
    pub(crate) fn pseudo_matches(
        &self,
        kind: PseudoKind,
        node: T::Node,
        arg: &PseudoArg,
    ) -> bool {
        let tree = self.tree;
        match kind {
            PseudoKind::AnyLink => self.link_href(node).is_some(),
            PseudoKind::LocalLink => match arg {
                PseudoArg::LinkDepth(depth) => self.is_local_link(node, *depth),
                _ => false,
            },

            PseudoKind::FirstChild => tree.prev_element_sibling(node).is_none(),
            PseudoKind::LastChild => tree.next_element_sibling(node).is_none(),
            PseudoKind::OnlyChild => {
                tree.prev_element_sibling(node).is_none()
                    && tree.next_element_sibling(node).is_none()
            }
            PseudoKind::NthChild => self.nth(node, arg.nth(), Direction::Forward, |_| true),
            PseudoKind::NthLastChild => self.nth(node, arg.nth(), Direction::Backward, |_| true),

            PseudoKind::FirstOfType => !self.has_sibling_of_type(node, Direction::Backward),
            PseudoKind::LastOfType => !self.has_sibling_of_type(node, Direction::Forward),
            PseudoKind::OnlyOfType => {
                !self.has_sibling_of_type(node, Direction::Backward)
                    && !self.has_sibling_of_type(node, Direction::Forward)
            }
            PseudoKind::NthOfType => self.nth(node, arg.nth(), Direction::Forward, |other| {
                self.same_type(node, other)
            }),
            PseudoKind::NthLastOfType => self.nth(node, arg.nth(), Direction::Backward, |other| {
                self.same_type(node, other)
            }),

            PseudoKind::FirstMatch => arg
                .shape()
                .is_some_and(|shape| !self.has_sibling_like(node, shape, Direction::Backward)),
            PseudoKind::LastMatch => arg
                .shape()
                .is_some_and(|shape| !self.has_sibling_like(node, shape, Direction::Forward)),
            PseudoKind::OnlyMatch => arg.shape().is_some_and(|shape| {
                !self.has_sibling_like(node, shape, Direction::Backward)
                    && !self.has_sibling_like(node, shape, Direction::Forward)
            }),
            PseudoKind::NthMatch => arg.shape().is_some_and(|shape| {
                self.nth(node, arg.nth(), Direction::Forward, |other| {
                    self.test_part(other, shape)
                })
            }),
            PseudoKind::NthLastMatch => arg.shape().is_some_and(|shape| {
                self.nth(node, arg.nth(), Direction::Backward, |other| {
                    self.test_part(other, shape)
                })
            }),

            PseudoKind::Disabled => tree.attribute(node, "disabled").is_some(),
            PseudoKind::Enabled => tree.attribute(node, "disabled").is_none(),
            PseudoKind::Indeterminate => tree.attribute(node, "indeterminate").is_some(),
            PseudoKind::Checked => {
                tree.attribute(node, "checked").is_some()
                    || tree.attribute(node, "selected").is_some()
            }
            PseudoKind::Focus => self.focused(tree.root(node)) == Some(node),

            PseudoKind::Empty => self.is_empty_element(node),
            PseudoKind::Not => arg
                .nested()
                .is_none_or(|list| !self.match_list(list, node, None)),
            PseudoKind::Matches => arg
                .nested()
                .is_some_and(|list| self.match_list(list, node, None)),

            PseudoKind::Target => self.host.fragment_id().is_some_and(|fragment| {
                !fragment.is_empty() && tree.id(node) == Some(fragment.as_str())
            }),
            PseudoKind::Root => tree.document_element(tree.root(node)) == Some(node),
            PseudoKind::Lang => arg.text().is_some_and(|wanted| {
                self.inherited_attribute(node, "lang")
                    .is_some_and(|lang| lang_matches(lang, wanted))
            }),
            PseudoKind::Dir => arg.text().is_some_and(|wanted| {
                self.inherited_attribute(node, "dir")
                    .unwrap_or("ltr")
                    .eq_ignore_ascii_case(wanted)
            }),
        }
    }

    /// Candidates a getter pseudo can produce without scanning.
    pub(crate) fn pseudo_candidates(
        &self,
        getter: &Getter,
        root: T::Node,
        search_on: T::Node,
    ) -> Vec<T::Node> {
        let tree = self.tree;
        let found = match getter.kind {
            PseudoKind::Focus => self.focused(root),
            PseudoKind::Target => self
                .host
                .fragment_id()
                .filter(|fragment| !fragment.is_empty())
                .and_then(|fragment| tree.element_by_id(root, &fragment)),
            PseudoKind::Root => tree.document_element(root),
            // The nested list is matched without origins. Searching it from a
            // document root is equivalent; from an element root it would
            // confine the combinators below that element, so scan instead.
            PseudoKind::Matches => {
                return match getter.arg.nested() {
                    Some(list)
                        if tree.kind(root) == NodeKind::Document
                            && !list.iter().any(has_leading_combinator) =>
                    {
                        self.select(list, &Scope::Node(root))
                    }
                    _ => tree.elements_by_tag(search_on, None),
                };
            }
            _ => return tree.elements_by_tag(search_on, None),
        };
        found.into_iter().collect()
    }

    fn nth<F>(
        &self,
        node: T::Node,
        formula: Option<NthFormula>,
        direction: Direction,
        counts: F,
    ) -> bool
    where
        F: FnMut(T::Node) -> bool,
    {
        formula.is_some_and(|formula| nth_check(self.tree, node, formula, direction, counts))
    }

    fn same_type(&self, node: T::Node, other: T::Node) -> bool {
        match (self.tree.tag_name(node), self.tree.tag_name(other)) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }

    fn element_siblings(
        &self,
        node: T::Node,
        direction: Direction,
    ) -> impl Iterator<Item = T::Node> {
        let tree = self.tree;
        let step = move |current: &T::Node| match direction {
            Direction::Forward => tree.next_element_sibling(*current),
            Direction::Backward => tree.prev_element_sibling(*current),
        };
        std::iter::successors(step(&node), step)
    }

    fn has_sibling_of_type(&self, node: T::Node, direction: Direction) -> bool {
        self.element_siblings(node, direction)
            .any(|sibling| self.same_type(node, sibling))
    }

    fn has_sibling_like(&self, node: T::Node, shape: &CompoundPart, direction: Direction) -> bool {
        self.element_siblings(node, direction)
            .any(|sibling| self.test_part(sibling, shape))
    }

    /// The focused element of the document at `root`, if it can take focus.
    fn focused(&self, root: T::Node) -> Option<T::Node> {
        let active = self.host.active_element(root)?;
        let focusable = self.tree.attribute(active, "type").is_some()
            || self.tree.attribute(active, "href").is_some();
        (self.host.has_focus() && focusable).then_some(active)
    }

    fn is_empty_element(&self, node: T::Node) -> bool {
        let tree = self.tree;
        let mut child = tree.first_child(node);
        while let Some(current) = child {
            if matches!(tree.kind(current), NodeKind::Element | NodeKind::Text) {
                return false;
            }
            child = tree.next_sibling(current);
        }
        true
    }

    /// Nearest value of `name` on `node` or one of its ancestors.
    fn inherited_attribute(&self, node: T::Node, name: &str) -> Option<&str> {
        let tree = self.tree;
        let mut current = Some(node);
        while let Some(candidate) = current {
            if let Some(value) = tree.attribute(candidate, name) {
                return Some(value);
            }
            current = tree.parent(candidate);
        }
        None
    }

    fn link_href(&self, node: T::Node) -> Option<&str> {
        let tag = self.tree.tag_name(node)?;
        if LINK_TAGS.iter().any(|link| tag.eq_ignore_ascii_case(link)) {
            self.tree.attribute(node, "href")
        } else {
            None
        }
    }

    /// `:local-link(depth)`: the link's absolute target shares the first
    /// `depth` path segments (host included) with the current location.
    fn is_local_link(&self, node: T::Node, depth: Option<usize>) -> bool {
        let Some(href) = self.link_href(node).and_then(location_path) else {
            return false;
        };
        let Some(location) = self.host.location() else {
            return false;
        };
        let Some(current) = location_path(&location) else {
            return false;
        };

        let segments: Vec<&str> = current.split('/').collect();
        let depth = depth.unwrap_or(segments.len());
        if depth > segments.len() {
            return false;
        }
        href.starts_with(&segments[..depth].join("/"))
    }
}

fn has_leading_combinator(selector: &Selector) -> bool {
    selector
        .parts
        .first()
        .is_some_and(|part| part.combinator.is_some())
}

/// The part of a URL after `scheme://` and before any query or fragment.
fn location_path(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// `:lang()` matches the exact code or any of its subtags, ignoring ASCII case.
fn lang_matches(lang: &str, wanted: &str) -> bool {
    lang.get(..wanted.len()).is_some_and(|head| head.eq_ignore_ascii_case(wanted))
        && matches!(lang.as_bytes().get(wanted.len()), None | Some(b'-'))
}
