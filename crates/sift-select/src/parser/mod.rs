//! Selector string parser.
//!
//! A recursive-descent parser that turns a selector string into a
//! [`SelectorList`]. Each comma-separated branch is parsed on its own:
//! a structurally impossible branch (a second id on one part, `[a^=""]`, a
//! positional formula that can never select anything) is dropped and parsing
//! resumes after the next top-level comma, while malformed tokens and unknown
//! pseudo-class names abort the whole string with a [`SyntaxError`].
//!
//! While parsing, every branch also builds a canonical string for an optional
//! native evaluator. Constructs the [`CapabilityProfile`] says the host cannot
//! evaluate are left out of that string and the branch loses full support.

use std::sync::Arc;

use tracing::debug;

use crate::cache::SelectorCache;
use crate::capability::CapabilityProfile;
use crate::error::SyntaxError;
use crate::pseudo::nth::NthFormula;
use crate::pseudo::{ArgumentGrammar, PseudoEntry, PseudoRegistry};
use crate::selector::{
    AttributeMatcher, Combinator, Comparator, CompoundPart, Getter, PseudoArg, PseudoArgument,
    Selector, SelectorList,
};

mod cursor;

use cursor::Cursor;

/// Outcome of one clause parser.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ClauseError {
    /// The branch can never match anything; drop it.
    Dead,
    /// The input is malformed; abort the whole string.
    Fatal(String),
}

type ClauseResult<T = ()> = Result<T, ClauseError>;

/// Outcome of one comma-separated branch.
#[derive(Debug)]
enum BranchOutcome {
    Parsed(Selector),
    DeadBranch,
    FatalError(String),
}

fn fatal<T>(message: impl Into<String>) -> ClauseResult<T> {
    Err(ClauseError::Fatal(message.into()))
}

fn unexpected_message(cursor: &Cursor<'_>) -> String {
    match cursor.peek() {
        Some(c) => format!("unexpected character `{c}`"),
        None => "unexpected end of input".to_owned(),
    }
}

fn unexpected(cursor: &Cursor<'_>) -> ClauseError {
    ClauseError::Fatal(unexpected_message(cursor))
}

/// Running state of the branch being parsed.
#[derive(Debug)]
struct Branch {
    parts: Vec<CompoundPart>,
    native: String,
    full_support: bool,
    id_anchor: Option<usize>,
}

impl Branch {
    const fn new() -> Self {
        Self {
            parts: Vec::new(),
            native: String::new(),
            full_support: true,
            id_anchor: None,
        }
    }

    fn finish(self) -> Selector {
        let Self {
            parts,
            native,
            full_support,
            id_anchor,
        } = self;

        let lookup_cheaper = match parts.as_slice() {
            [only] => !only.prefer_native && only.direct_lookup_count < 2,
            _ => false,
        };
        let anchor_getter = parts.last().is_some_and(|part| part.getter.is_some());
        let use_native = !(lookup_cheaper || anchor_getter);

        Selector::new(parts, native, full_support, use_native, id_anchor)
    }
}

/// Parses selector strings against one pseudo registry and capability profile,
/// memoizing complete results in an owned [`SelectorCache`].
#[derive(Debug)]
pub struct SelectorParser {
    registry: Arc<PseudoRegistry>,
    profile: Arc<CapabilityProfile>,
    cache: SelectorCache,
}

impl Default for SelectorParser {
    fn default() -> Self {
        Self::new(
            Arc::new(PseudoRegistry::standard()),
            Arc::new(CapabilityProfile::default()),
            SelectorCache::default(),
        )
    }
}

impl SelectorParser {
    /// Parser over the given collaborators.
    #[must_use]
    pub const fn new(
        registry: Arc<PseudoRegistry>,
        profile: Arc<CapabilityProfile>,
        cache: SelectorCache,
    ) -> Self {
        Self {
            registry,
            profile,
            cache,
        }
    }

    /// The pseudo-class registry.
    #[must_use]
    pub fn registry(&self) -> &PseudoRegistry {
        &self.registry
    }

    /// The capability profile.
    #[must_use]
    pub fn profile(&self) -> &CapabilityProfile {
        &self.profile
    }

    /// The selector cache.
    #[must_use]
    pub const fn cache(&self) -> &SelectorCache {
        &self.cache
    }

    /// Parse `input`, returning the cached list when the exact string was seen before.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] for malformed input. Errors are never cached.
    pub fn parse(&self, input: &str) -> Result<Arc<SelectorList>, SyntaxError> {
        self.cache
            .get_or_try_insert(input, || self.parse_uncached(input))
    }

    /// Parse `input` without consulting or filling the cache.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] for malformed input.
    pub fn parse_uncached(&self, input: &str) -> Result<SelectorList, SyntaxError> {
        self.parse_list(input).map_err(|message| SyntaxError {
            message,
            selector: input.to_owned(),
        })
    }

    fn parse_list(&self, input: &str) -> Result<SelectorList, String> {
        let input = input.trim();
        let mut list = SelectorList::default();
        if input.is_empty() {
            return Ok(list);
        }

        let mut cursor = Cursor::new(input);
        loop {
            let _ = cursor.skip_whitespace();
            if cursor.at_separator() {
                return Err("empty selector".to_owned());
            }

            let start = cursor.pos();
            match self.parse_branch(&mut cursor) {
                BranchOutcome::Parsed(selector) => list.selectors.push(selector),
                BranchOutcome::DeadBranch => {
                    let _ = cursor.take_branch();
                    debug!(
                        branch = cursor.slice(start, cursor.pos()).trim(),
                        "dropping selector branch that can never match"
                    );
                }
                BranchOutcome::FatalError(message) => return Err(message),
            }

            let _ = cursor.skip_whitespace();
            if cursor.is_eof() {
                return Ok(list);
            }
            if !cursor.eat(',') {
                return Err(unexpected_message(&cursor));
            }
        }
    }

    fn parse_branch(&self, cursor: &mut Cursor<'_>) -> BranchOutcome {
        match self.branch(cursor) {
            Ok(selector) => BranchOutcome::Parsed(selector),
            Err(ClauseError::Dead) => BranchOutcome::DeadBranch,
            Err(ClauseError::Fatal(message)) => BranchOutcome::FatalError(message),
        }
    }

    fn branch(&self, cursor: &mut Cursor<'_>) -> ClauseResult<Selector> {
        let mut branch = Branch::new();

        loop {
            let spaced = cursor.skip_whitespace() > 0;
            if cursor.at_separator() {
                break;
            }

            let first = branch.parts.is_empty();
            let combinator = if let Some(explicit) = cursor.peek().and_then(Combinator::from_char)
            {
                let _ = cursor.bump();
                let _ = cursor.skip_whitespace();
                if cursor.at_separator() {
                    return fatal("dangling combinator");
                }
                Some(explicit)
            } else if first {
                None
            } else if spaced {
                Some(Combinator::Descendant)
            } else {
                return Err(unexpected(cursor));
            };

            match combinator {
                // A leading combinator relates to the query scope, which a
                // native string cannot express.
                Some(_) if first => branch.full_support = false,
                Some(combinator) => branch.native.push_str(combinator.as_str()),
                None => {}
            }

            let part = self.compound(cursor, &mut branch, combinator)?;
            branch.parts.push(part);
        }

        Ok(branch.finish())
    }

    fn compound(
        &self,
        cursor: &mut Cursor<'_>,
        branch: &mut Branch,
        combinator: Option<Combinator>,
    ) -> ClauseResult<CompoundPart> {
        let start = cursor.pos();
        let mut part = CompoundPart {
            combinator,
            ..CompoundPart::default()
        };

        if cursor.eat('$') {
            part.subject = true;
            if self.profile.containment_target {
                branch.native.push('$');
            }
        }

        if cursor.eat('*') {
            branch.native.push('*');
        } else if let Some(name) = cursor.ident() {
            branch.native.push_str(name.raw);
            part.tag_name = Some(name.value);
            part.direct_lookup_count += 1;
        } else {
            branch.native.push('*');
        }

        loop {
            match cursor.peek() {
                Some('#') => Self::id_clause(cursor, branch, &mut part)?,
                Some('.') => Self::class_clause(cursor, branch, &mut part)?,
                Some('[') => self.attribute_clause(cursor, branch, &mut part)?,
                Some(':') => self.pseudo_clause(cursor, branch, &mut part)?,
                _ => break,
            }
        }

        if part.subject {
            self.containment(cursor, branch, &mut part)?;
        }

        if cursor.pos() == start {
            return Err(unexpected(cursor));
        }

        if !part.classes.is_empty() {
            if self.profile.class_lookup {
                part.direct_lookup_count += 1;
            } else {
                part.prefer_native = true;
            }
        }

        attach_relative_shapes(&mut part);
        Ok(part)
    }

    /// `#id`
    fn id_clause(
        cursor: &mut Cursor<'_>,
        branch: &mut Branch,
        part: &mut CompoundPart,
    ) -> ClauseResult {
        if part.id.is_some() {
            return Err(ClauseError::Dead);
        }
        let _ = cursor.bump();
        let Some(id) = cursor.ident() else {
            return fatal("invalid id");
        };

        branch.native.push('#');
        branch.native.push_str(id.raw);
        branch.id_anchor = Some(branch.parts.len());
        part.id = Some(id.value);
        part.direct_lookup_count += 1;
        Ok(())
    }

    /// `.class`
    fn class_clause(
        cursor: &mut Cursor<'_>,
        branch: &mut Branch,
        part: &mut CompoundPart,
    ) -> ClauseResult {
        let _ = cursor.bump();
        let Some(class) = cursor.ident() else {
            return fatal("invalid class");
        };

        branch.native.push('.');
        branch.native.push_str(class.raw);
        part.classes.push(class.value);
        Ok(())
    }

    /// `[name]`, `[name op value]`, `[name op value i]`
    fn attribute_clause(
        &self,
        cursor: &mut Cursor<'_>,
        branch: &mut Branch,
        part: &mut CompoundPart,
    ) -> ClauseResult {
        let _ = cursor.bump();
        let _ = cursor.skip_whitespace();
        let Some(name) = cursor.ident() else {
            return fatal("invalid attribute");
        };
        let _ = cursor.skip_whitespace();

        let matcher = if cursor.eat(']') {
            AttributeMatcher::exists(name.value.clone())
        } else {
            let operator = match cursor.peek() {
                Some('=') => None,
                Some(_) => cursor.bump(),
                None => return fatal("invalid attribute"),
            };
            let Some(comparator) = Comparator::from_operator(operator) else {
                return fatal("invalid attribute");
            };
            if !cursor.eat('=') {
                return fatal("invalid attribute");
            }

            let _ = cursor.skip_whitespace();
            let operand = match cursor.quoted() {
                Some(quoted) => quoted,
                None => cursor.ident().map(|ident| ident.value).unwrap_or_default(),
            };
            let _ = cursor.skip_whitespace();
            let case_insensitive = cursor.eat('i') || cursor.eat('I');
            let _ = cursor.skip_whitespace();
            if !cursor.eat(']') {
                return fatal("invalid attribute");
            }

            if operand.is_empty() && comparator.is_anchored() {
                return Err(ClauseError::Dead);
            }
            AttributeMatcher::new(name.value.clone(), comparator, operand, case_insensitive)
        };

        if !matcher.case_insensitive || self.profile.attribute_case_insensitive {
            branch.native.push('[');
            branch.native.push_str(name.raw);
            if matcher.comparator != Comparator::Exists {
                branch.native.push_str(matcher.comparator.as_str());
                branch.native.push_str(&native_string_literal(&matcher.operand));
                if matcher.case_insensitive {
                    branch.native.push_str(" i");
                }
            }
            branch.native.push(']');
        } else {
            branch.full_support = false;
        }

        let plain_name = matcher.comparator == Comparator::Equals && !matcher.case_insensitive;
        if plain_name && name.value == "name" {
            part.search_name = Some(matcher.operand.clone());
            part.direct_lookup_count += 1;
        } else {
            part.prefer_native = true;
        }

        part.attributes.entry(name.value).or_default().push(matcher);
        Ok(())
    }

    /// `:name` or `:name(argument)`
    fn pseudo_clause(
        &self,
        cursor: &mut Cursor<'_>,
        branch: &mut Branch,
        part: &mut CompoundPart,
    ) -> ClauseResult {
        let _ = cursor.bump();
        let Some(name) = cursor.ident() else {
            return fatal("invalid pseudo");
        };
        if cursor.rest().trim_start().starts_with('(') {
            let _ = cursor.skip_whitespace();
        }
        let raw = if cursor.peek() == Some('(') {
            let Some(group) = cursor.balanced_group() else {
                return fatal("invalid pseudo");
            };
            Some(group)
        } else {
            None
        };

        let Some(entry) = self.registry.lookup(&name.value) else {
            return fatal(format!("unknown pseudo `:{}`", name.value));
        };
        let argument = self.pseudo_argument(entry, raw)?;
        let kind = entry.kind;

        if self.profile.support_tier(kind) >= argument.tier {
            branch.native.push(':');
            branch.native.push_str(self.profile.supported_name(kind));
            if let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) {
                branch.native.push('(');
                branch.native.push_str(raw);
                branch.native.push(')');
            }
            part.prefer_native = true;
        } else {
            branch.full_support = false;
            if entry.has_getter {
                part.getter = Some(Getter {
                    kind,
                    arg: argument.value.clone(),
                });
            }
        }

        part.pseudos.entry(kind).or_default().push(argument);
        Ok(())
    }

    fn pseudo_argument(
        &self,
        entry: &PseudoEntry,
        raw: Option<&str>,
    ) -> ClauseResult<PseudoArgument> {
        let name = entry.kind.name();
        let required = || match raw.map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text),
            _ => fatal(format!("missing argument for `:{name}`")),
        };
        let simple = |value| PseudoArgument { tier: 1, value };

        let argument = match entry.grammar {
            ArgumentGrammar::None | ArgumentGrammar::Relative if raw.is_some() => {
                return fatal(format!("unexpected argument for `:{name}`"));
            }
            ArgumentGrammar::None => simple(PseudoArg::None),
            ArgumentGrammar::Text => simple(PseudoArg::Text(unquote(required()?))),
            ArgumentGrammar::Nth => simple(PseudoArg::Nth(nth_formula(required()?)?)),
            ArgumentGrammar::Relative => simple(PseudoArg::Relative {
                nth: None,
                shape: Box::default(),
            }),
            ArgumentGrammar::RelativeNth => simple(PseudoArg::Relative {
                nth: Some(nth_formula(required()?)?),
                shape: Box::default(),
            }),
            ArgumentGrammar::LinkDepth => {
                let depth = match raw.map(str::trim).filter(|text| !text.is_empty()) {
                    None => None,
                    Some(text) => match text.parse::<usize>() {
                        Ok(depth) => Some(depth),
                        Err(_) => return fatal(format!("invalid link depth `{text}`")),
                    },
                };
                simple(PseudoArg::LinkDepth(depth))
            }
            ArgumentGrammar::Nested => {
                let list = self.parse_list(required()?).map_err(ClauseError::Fatal)?;
                PseudoArgument {
                    tier: nested_tier(&list),
                    value: PseudoArg::Nested(Arc::new(list)),
                }
            }
        };
        Ok(argument)
    }

    /// `$part rest`: the rest of the branch must match some descendant.
    fn containment(
        &self,
        cursor: &mut Cursor<'_>,
        branch: &mut Branch,
        part: &mut CompoundPart,
    ) -> ClauseResult {
        let rest = cursor.take_branch();
        if rest.trim().is_empty() {
            return Ok(());
        }

        let inner = self.parse_list(rest).map_err(ClauseError::Fatal)?;
        let Some(selector) = inner.selectors.into_iter().next() else {
            return Err(ClauseError::Dead);
        };

        if self.profile.containment_target && selector.full_support {
            branch.native.push(' ');
            branch.native.push_str(&selector.native);
        } else {
            branch.full_support = false;
        }
        part.containment = Some(Arc::new(SelectorList {
            selectors: vec![selector],
        }));
        Ok(())
    }
}

fn nth_formula(text: &str) -> ClauseResult<NthFormula> {
    let Some(formula) = NthFormula::parse(text) else {
        return fatal(format!("invalid nth value `{text}`"));
    };
    if formula.can_match() {
        Ok(formula)
    } else {
        Err(ClauseError::Dead)
    }
}

/// Native support tier a nested list needs.
fn nested_tier(list: &SelectorList) -> u8 {
    if list.is_empty() {
        return 5;
    }
    let mut tier = if list.len() > 1 { 2 } else { 1 };
    for selector in list {
        if !selector.full_support {
            return 5;
        }
        if selector.parts.len() > 1 {
            tier = tier.max(3);
        }
        let nests_self = selector
            .parts
            .iter()
            .any(|part| part.pseudos.keys().any(|kind| kind.is_self_referential()));
        if nests_self {
            tier = tier.max(4);
        }
    }
    tier
}

/// Copy the finished part, minus its relative match pseudos, into every
/// relative match argument it carries.
fn attach_relative_shapes(part: &mut CompoundPart) {
    if !part.has_relative_pseudo() {
        return;
    }

    let mut shape = part.clone();
    shape.pseudos.retain(|kind, _| !kind.is_relative());
    shape.combinator = None;
    shape.subject = false;
    shape.getter = None;

    for (_, arguments) in part.pseudos.iter_mut().filter(|(kind, _)| kind.is_relative()) {
        for argument in arguments {
            if let PseudoArg::Relative { shape: slot, .. } = &mut argument.value {
                *slot = Box::new(shape.clone());
            }
        }
    }
}

/// Strip surrounding quotes and resolve backslash escapes.
fn unquote(text: &str) -> String {
    let mut cursor = Cursor::new(text);
    if let Some(quoted) = cursor.quoted() {
        if cursor.is_eof() {
            return quoted;
        }
    }

    let mut value = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => value.extend(chars.next()),
            c => value.push(c),
        }
    }
    value
}

fn native_string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            literal.push('\\');
        }
        literal.push(c);
    }
    literal.push('"');
    literal
}
