//! Pseudo-class registry.
//!
//! Every pseudo-class the engine understands is a [`PseudoKind`]. The
//! [`PseudoRegistry`] maps source names to [`PseudoEntry`] records carrying the
//! argument grammar used at parse time, whether the pseudo can seed candidates
//! directly, and the static metadata an external capability prober needs.
//!
//! Per-element predicates and candidate getters are dispatched by kind in
//! [`predicates`]; the positional grammar lives in [`nth`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Positional `An+B` formulas and sibling counting.
pub mod nth;
/// Per-element predicates and candidate getters.
pub mod predicates;

/// Every supported pseudo-class, named in source form via kebab-case.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PseudoKind {
    /// `:any-link`: a link element with an `href`.
    AnyLink,
    /// `:local-link(n)`: a link pointing inside the current location.
    LocalLink,
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
    /// `:only-child`
    OnlyChild,
    /// `:nth-child(An+B)`
    NthChild,
    /// `:nth-last-child(An+B)`
    NthLastChild,
    /// `:first-of-type`
    FirstOfType,
    /// `:last-of-type`
    LastOfType,
    /// `:only-of-type`
    OnlyOfType,
    /// `:nth-of-type(An+B)`
    NthOfType,
    /// `:nth-last-of-type(An+B)`
    NthLastOfType,
    /// `:first-match`: no preceding sibling has the same compound shape.
    FirstMatch,
    /// `:last-match`: no following sibling has the same compound shape.
    LastMatch,
    /// `:only-match`: no other sibling has the same compound shape.
    OnlyMatch,
    /// `:nth-match(An+B)`: position among same-shape siblings.
    NthMatch,
    /// `:nth-last-match(An+B)`: position among same-shape siblings, from the end.
    NthLastMatch,
    /// `:disabled`
    Disabled,
    /// `:enabled`
    Enabled,
    /// `:indeterminate`
    Indeterminate,
    /// `:checked`: checked or selected.
    Checked,
    /// `:focus`
    Focus,
    /// `:empty`: no element or text children.
    Empty,
    /// `:not(selector-list)`
    Not,
    /// `:matches(selector-list)`
    Matches,
    /// `:target`: the element whose id equals the current fragment.
    Target,
    /// `:root`
    Root,
    /// `:lang(code)`
    Lang,
    /// `:dir(ltr|rtl)`
    Dir,
}

impl PseudoKind {
    /// Relative match pseudos compare siblings against a copy of their own compound part.
    #[must_use]
    pub const fn is_relative(self) -> bool {
        matches!(
            self,
            Self::FirstMatch
                | Self::LastMatch
                | Self::OnlyMatch
                | Self::NthMatch
                | Self::NthLastMatch
        )
    }

    /// Pseudos whose argument is itself a selector list.
    #[must_use]
    pub const fn is_self_referential(self) -> bool {
        matches!(self, Self::Not | Self::Matches)
    }

    /// Source name, e.g. `"nth-last-of-type"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// How the text between a pseudo's parentheses is turned into an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentGrammar {
    /// No parentheses allowed.
    None,
    /// A literal, unquoted and unescaped.
    Text,
    /// An `An+B` formula.
    Nth,
    /// A full selector list.
    Nested,
    /// No argument; a copy of the enclosing compound is attached after parsing.
    Relative,
    /// An `An+B` formula plus a copy of the enclosing compound.
    RelativeNth,
    /// Optional non-negative segment count.
    LinkDepth,
}

/// Everything the parser and the capability prober need to know about one pseudo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudoEntry {
    /// Which pseudo this entry describes.
    pub kind: PseudoKind,
    /// Argument grammar applied at parse time.
    pub grammar: ArgumentGrammar,
    /// Whether the pseudo can enumerate its own candidates.
    pub has_getter: bool,
    /// Alternative native names a prober may try.
    pub vendor_names: &'static [&'static str],
    /// Arguments a prober tests, in increasing support-tier order.
    pub test_values: &'static [&'static str],
    /// Markup a prober should evaluate the pseudo against.
    pub probe_markup: Option<&'static str>,
    /// Selector for the single element the probe is expected to find.
    pub probe_result: Option<&'static str>,
}

impl PseudoEntry {
    /// Entry with no getter and no probe metadata.
    #[must_use]
    pub const fn new(kind: PseudoKind, grammar: ArgumentGrammar) -> Self {
        Self {
            kind,
            grammar,
            has_getter: false,
            vendor_names: &[],
            test_values: &[],
            probe_markup: None,
            probe_result: None,
        }
    }

    const fn getter(mut self) -> Self {
        self.has_getter = true;
        self
    }

    const fn vendor(mut self, names: &'static [&'static str]) -> Self {
        self.vendor_names = names;
        self
    }

    const fn tests(mut self, values: &'static [&'static str]) -> Self {
        self.test_values = values;
        self
    }

    const fn probe(mut self, markup: &'static str, result: Option<&'static str>) -> Self {
        self.probe_markup = Some(markup);
        self.probe_result = result;
        self
    }

    /// The built-in entry for `kind`.
    #[must_use]
    pub const fn standard(kind: PseudoKind) -> Self {
        use ArgumentGrammar as G;
        use PseudoKind as K;

        const NTH_TESTS: &[&str] = &["2n+1"];
        const FORM_PROBE: &str = "<input type='hidden'>";

        match kind {
            K::AnyLink => Self::new(kind, G::None).vendor(&["-moz-any-link", "-webkit-any-link"]),
            K::LocalLink => Self::new(kind, G::LinkDepth),
            K::NthChild | K::NthLastChild | K::NthOfType | K::NthLastOfType => {
                Self::new(kind, G::Nth).tests(NTH_TESTS)
            }
            K::FirstMatch | K::LastMatch | K::OnlyMatch => Self::new(kind, G::Relative),
            K::NthMatch | K::NthLastMatch => Self::new(kind, G::RelativeNth).tests(NTH_TESTS),
            // Some hosts report hidden inputs as disabled.
            K::Disabled => Self::new(kind, G::None).probe(FORM_PROBE, None),
            K::Enabled => Self::new(kind, G::None).probe(FORM_PROBE, Some("input")),
            K::Checked => Self::new(kind, G::None)
                .probe("<select><option selected></option></select>", Some("option")),
            K::Focus | K::Target | K::Root => Self::new(kind, G::None).getter(),
            K::Not => Self::new(kind, G::Nested).tests(&["a", "a,a", "a a", ":not(a)"]),
            K::Matches => Self::new(kind, G::Nested)
                .getter()
                .tests(&["a", "a,a", "a a", ":not(a)"])
                .vendor(&["-webkit-any", "-moz-any"]),
            K::Lang => Self::new(kind, G::Text).tests(&["de"]),
            K::Dir => Self::new(kind, G::Text).tests(&["ltr"]),
            K::FirstChild
            | K::LastChild
            | K::OnlyChild
            | K::FirstOfType
            | K::LastOfType
            | K::OnlyOfType
            | K::Indeterminate
            | K::Empty => Self::new(kind, G::None),
        }
    }
}

/// Name → entry table, built once and then shared read-only.
#[derive(Debug, Clone)]
pub struct PseudoRegistry {
    entries: HashMap<String, PseudoEntry>,
}

impl PseudoRegistry {
    /// Registry with every built-in pseudo under its source name.
    #[must_use]
    pub fn standard() -> Self {
        let entries = PseudoKind::iter()
            .map(|kind| (kind.name().to_owned(), PseudoEntry::standard(kind)))
            .collect();
        Self { entries }
    }

    /// Registry with no entries. Every pseudo is then an unknown name.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register (or replace) the entry for `name`, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, entry: PseudoEntry) -> Option<PseudoEntry> {
        self.entries.insert(name.into(), entry)
    }

    /// Look up a pseudo by source name. Names are matched ASCII case-insensitively.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&PseudoEntry> {
        self.entries
            .get(name)
            .or_else(|| self.entries.get(&name.to_ascii_lowercase()))
    }

    /// Iterate over every registered name and entry.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PseudoEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PseudoRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
