//! Parsed selector representation.
//!
//! A selector string compiles to a [`SelectorList`] (one [`Selector`] per
//! comma-separated branch). Each selector is a chain of [`CompoundPart`]s in
//! source order: index 0 is the leftmost part, the last part is the anchor
//! whose matches are the query results.
//!
//! Everything here is immutable once the parser hands it out, except the
//! per-selector native-failure flag, which only ever flips from `false` to `true`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::pseudo::PseudoKind;
use crate::pseudo::nth::NthFormula;

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// "A combinator is punctuation that represents a particular kind of
/// relationship between the selectors on either side."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Whitespace. `A B` is a `B` with some ancestor `A`.
    Descendant,
    /// `A > B` is a `B` whose parent is `A`.
    Child,
    /// `A + B` is a `B` immediately preceded by an element `A`.
    NextSibling,
    /// `A ~ B` is a `B` preceded, not necessarily immediately, by an element `A`.
    SubsequentSibling,
}

impl Combinator {
    /// Combinator for a punctuation character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Self::Child),
            '+' => Some(Self::NextSibling),
            '~' => Some(Self::SubsequentSibling),
            _ => None,
        }
    }

    /// Canonical spelling, padded with whitespace.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Descendant => " ",
            Self::Child => " > ",
            Self::NextSibling => " + ",
            Self::SubsequentSibling => " ~ ",
        }
    }
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// `[attr]`
    Exists,
    /// `[attr=value]`
    Equals,
    /// `[attr^=value]`
    Prefix,
    /// `[attr$=value]`
    Suffix,
    /// `[attr*=value]`
    Substring,
    /// `[attr~=value]`: one of the whitespace-separated words.
    Word,
    /// `[attr|=value]`: exactly `value` or `value-` followed by anything.
    LangPrefix,
}

impl Comparator {
    /// Operator for a prefix character in front of `=`; `None` means plain `=`.
    #[must_use]
    pub const fn from_operator(prefix: Option<char>) -> Option<Self> {
        match prefix {
            None => Some(Self::Equals),
            Some('^') => Some(Self::Prefix),
            Some('$') => Some(Self::Suffix),
            Some('*') => Some(Self::Substring),
            Some('~') => Some(Self::Word),
            Some('|') => Some(Self::LangPrefix),
            Some(_) => None,
        }
    }

    /// Source spelling of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exists => "",
            Self::Equals => "=",
            Self::Prefix => "^=",
            Self::Suffix => "$=",
            Self::Substring => "*=",
            Self::Word => "~=",
            Self::LangPrefix => "|=",
        }
    }

    /// Anchored comparators can never match an empty operand.
    #[must_use]
    pub const fn is_anchored(self) -> bool {
        matches!(self, Self::Prefix | Self::Suffix | Self::Substring)
    }
}

/// Compiled form of an attribute comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ValueRule {
    Present,
    Exact(Comparator, String),
    Folded(Comparator, String),
}

/// One `[...]` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatcher {
    /// Attribute name as written.
    pub name: String,
    /// Comparison operator.
    pub comparator: Comparator,
    /// Operand, unquoted and unescaped.
    pub operand: String,
    /// Whether the `i` flag was given.
    pub case_insensitive: bool,
    rule: ValueRule,
}

impl AttributeMatcher {
    /// Compile an attribute clause.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        comparator: Comparator,
        operand: impl Into<String>,
        case_insensitive: bool,
    ) -> Self {
        let operand = operand.into();
        let rule = match comparator {
            Comparator::Exists => ValueRule::Present,
            _ if case_insensitive => ValueRule::Folded(comparator, operand.to_lowercase()),
            _ => ValueRule::Exact(comparator, operand.clone()),
        };
        Self {
            name: name.into(),
            comparator,
            operand,
            case_insensitive,
            rule,
        }
    }

    /// `[attr]` clause.
    #[must_use]
    pub fn exists(name: impl Into<String>) -> Self {
        Self::new(name, Comparator::Exists, String::new(), false)
    }

    /// Test the current attribute value.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match &self.rule {
            ValueRule::Present => true,
            ValueRule::Exact(comparator, operand) => compare(*comparator, value, operand),
            ValueRule::Folded(comparator, operand) => {
                compare(*comparator, &value.to_lowercase(), operand)
            }
        }
    }
}

fn compare(comparator: Comparator, value: &str, operand: &str) -> bool {
    match comparator {
        Comparator::Exists => true,
        Comparator::Equals => value == operand,
        Comparator::Prefix => value.starts_with(operand),
        Comparator::Suffix => value.ends_with(operand),
        Comparator::Substring => value.contains(operand),
        Comparator::Word => value.split_ascii_whitespace().any(|word| word == operand),
        Comparator::LangPrefix => value
            .strip_prefix(operand)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('-')),
    }
}

/// Parsed argument of one pseudo-class occurrence.
#[derive(Debug, Clone)]
pub enum PseudoArg {
    /// No argument.
    None,
    /// Literal argument such as a language code or direction.
    Text(String),
    /// `An+B` formula.
    Nth(NthFormula),
    /// Nested selector list for `:not` and `:matches`.
    Nested(Arc<SelectorList>),
    /// Relative match pseudos: a copy of the enclosing compound, with every
    /// relative match pseudo stripped, plus an optional formula.
    Relative {
        /// Formula for the `nth-` variants.
        nth: Option<NthFormula>,
        /// The shape siblings are compared against.
        shape: Box<CompoundPart>,
    },
    /// `:local-link` depth; `None` means the full path.
    LinkDepth(Option<usize>),
}

impl PseudoArg {
    /// The formula, for positional pseudos.
    #[must_use]
    pub const fn nth(&self) -> Option<NthFormula> {
        match self {
            Self::Nth(formula) => Some(*formula),
            Self::Relative { nth, .. } => *nth,
            _ => None,
        }
    }

    /// The literal text, for `:lang` and `:dir`.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The nested list, for `:not` and `:matches`.
    #[must_use]
    pub const fn nested(&self) -> Option<&Arc<SelectorList>> {
        match self {
            Self::Nested(list) => Some(list),
            _ => None,
        }
    }

    /// The sibling shape, for relative match pseudos.
    #[must_use]
    pub fn shape(&self) -> Option<&CompoundPart> {
        match self {
            Self::Relative { shape, .. } => Some(shape),
            _ => None,
        }
    }
}

/// A pseudo argument with the native support tier it requires.
///
/// Higher tiers are harder to hand to a native evaluator.
#[derive(Debug, Clone)]
pub struct PseudoArgument {
    /// Required native support tier.
    pub tier: u8,
    /// The parsed value.
    pub value: PseudoArg,
}

/// A pseudo that seeds candidates for its part instead of testing every element.
#[derive(Debug, Clone)]
pub struct Getter {
    /// Which pseudo provides the candidates.
    pub kind: PseudoKind,
    /// Its parsed argument.
    pub arg: PseudoArg,
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// One non-combinator segment: element name, id, classes, attributes,
/// pseudo-classes and an optional containment assertion.
#[derive(Debug, Clone, Default)]
pub struct CompoundPart {
    /// Relation to the previous part. `None` only on the first part when no
    /// combinator was written; such a part relates to a scope as a descendant.
    pub combinator: Option<Combinator>,
    /// `$` prefix: this part is the result subject and owns [`Self::containment`].
    pub subject: bool,
    /// Element name; `None` is the universal selector.
    pub tag_name: Option<String>,
    /// Required id.
    pub id: Option<String>,
    /// Required classes.
    pub classes: Vec<String>,
    /// Attribute clauses grouped by attribute name.
    pub attributes: BTreeMap<String, Vec<AttributeMatcher>>,
    /// Pseudo clauses grouped by kind. Every argument must hold.
    pub pseudos: BTreeMap<PseudoKind, Vec<PseudoArgument>>,
    /// At least one descendant must match this list.
    pub containment: Option<Arc<SelectorList>>,
    /// Value of a plain `[name=value]` clause, usable for a name lookup.
    pub search_name: Option<String>,
    /// Pseudo able to enumerate this part's candidates directly.
    pub getter: Option<Getter>,
    /// How many constraints a direct lookup (id, classes, name) could serve.
    pub direct_lookup_count: u8,
    /// Whether this part on its own is better served natively.
    pub prefer_native: bool,
}

impl CompoundPart {
    /// Every argument recorded for `kind`.
    pub fn pseudo_args(&self, kind: PseudoKind) -> impl Iterator<Item = &PseudoArgument> {
        self.pseudos.get(&kind).into_iter().flatten()
    }

    /// Whether any relative match pseudo is present.
    #[must_use]
    pub fn has_relative_pseudo(&self) -> bool {
        self.pseudos.keys().any(|kind| kind.is_relative())
    }
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// One comma-separated branch.
#[derive(Debug)]
pub struct Selector {
    /// Parts in source order; the last one is the anchor.
    pub parts: Vec<CompoundPart>,
    /// Canonical string for a native evaluator; partial when `full_support` is false.
    pub native: String,
    /// Whether `native` expresses the whole selector.
    pub full_support: bool,
    /// Whether a native evaluator should be tried first.
    pub use_native: bool,
    /// Index of the last part carrying an id.
    pub id_anchor: Option<usize>,
    native_failed: AtomicBool,
}

impl Selector {
    /// Assemble a selector from parsed parts.
    #[must_use]
    pub const fn new(
        parts: Vec<CompoundPart>,
        native: String,
        full_support: bool,
        use_native: bool,
        id_anchor: Option<usize>,
    ) -> Self {
        Self {
            parts,
            native,
            full_support,
            use_native,
            id_anchor,
            native_failed: AtomicBool::new(false),
        }
    }

    /// The rightmost part.
    #[must_use]
    pub fn anchor(&self) -> Option<&CompoundPart> {
        self.parts.last()
    }

    /// Whether native evaluation of this selector has failed before.
    #[must_use]
    pub fn native_failed(&self) -> bool {
        self.native_failed.load(Ordering::Acquire)
    }

    /// Permanently route this selector to manual matching.
    pub fn mark_native_failed(&self) {
        self.native_failed.store(true, Ordering::Release);
    }
}

/// Every branch of one selector string.
#[derive(Debug, Default)]
pub struct SelectorList {
    /// Surviving branches in source order. Dead branches are absent.
    pub selectors: Vec<Selector>,
}

impl SelectorList {
    /// Number of surviving branches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Whether every branch died (or the input was empty).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Iterate over branches.
    pub fn iter(&self) -> std::slice::Iter<'_, Selector> {
        self.selectors.iter()
    }
}

impl<'a> IntoIterator for &'a SelectorList {
    type Item = &'a Selector;
    type IntoIter = std::slice::Iter<'a, Selector>;

    fn into_iter(self) -> Self::IntoIter {
        self.selectors.iter()
    }
}
