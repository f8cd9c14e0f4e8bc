use crate::adapter::TreeAdapter;

/// A parsed `An+B` formula: `step` is A, `offset` is B.
///
/// A 1-based sibling position `p` matches when `p == step * k + offset` for
/// some integer `k >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NthFormula {
    /// Cycle length (A). Zero means "exactly `offset`".
    pub step: i32,
    /// Position of the first match (B).
    pub offset: i32,
}

impl NthFormula {
    /// Formula from its two coefficients.
    #[must_use]
    pub const fn new(step: i32, offset: i32) -> Self {
        Self { step, offset }
    }

    /// Parse `odd`, `even`, `B`, or `An+B` (with optional signs and whitespace around the sign).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().to_ascii_lowercase();
        match value.as_str() {
            "odd" => return Some(Self::new(2, 1)),
            "even" => return Some(Self::new(2, 0)),
            _ => {}
        }

        let Some((a, b)) = value.split_once('n') else {
            return parse_signed(&value).map(|offset| Self::new(0, offset));
        };

        let step = match a {
            "" | "+" => 1,
            "-" => -1,
            _ => parse_signed(a)?,
        };

        let b = b.trim_start();
        let offset = if b.is_empty() {
            0
        } else {
            let mut chars = b.chars();
            let sign = chars.next()?;
            let digits = chars.as_str().trim_start();
            if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let magnitude: i32 = digits.parse().ok()?;
            match sign {
                '+' => magnitude,
                '-' => -magnitude,
                _ => return None,
            }
        };

        Some(Self::new(step, offset))
    }

    /// Whether the 1-based `position` is selected.
    #[must_use]
    pub fn matches(self, position: i32) -> bool {
        let diff = i64::from(position) - i64::from(self.offset);
        let step = i64::from(self.step);
        if step == 0 {
            diff == 0
        } else {
            diff % step == 0 && diff / step >= 0
        }
    }

    /// Whether any position `>= 1` can ever match.
    #[must_use]
    pub const fn can_match(self) -> bool {
        self.step > 0 || self.offset >= 1
    }
}

fn parse_signed(text: &str) -> Option<i32> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Which end of the sibling list counting starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From the first element child towards the last.
    Forward,
    /// From the last element child towards the first.
    Backward,
}

/// Count `node`'s position among its element siblings that satisfy `counts`,
/// walking from one end, and test the position against `formula`.
///
/// Counting stops at `node`; siblings beyond it are never visited. A node that
/// does not itself satisfy `counts`, or has no parent, never matches.
pub fn nth_check<T, F>(
    tree: &T,
    node: T::Node,
    formula: NthFormula,
    direction: Direction,
    mut counts: F,
) -> bool
where
    T: TreeAdapter + ?Sized,
    F: FnMut(T::Node) -> bool,
{
    let Some(parent) = tree.parent(node) else {
        return false;
    };
    let mut child = match direction {
        Direction::Forward => tree.first_element_child(parent),
        Direction::Backward => tree.last_element_child(parent),
    };
    let mut count: i32 = 0;

    while let Some(current) = child {
        if counts(current) {
            count = count.saturating_add(1);
            if current == node {
                return formula.matches(count);
            }
        }
        child = match direction {
            Direction::Forward => tree.next_element_sibling(current),
            Direction::Backward => tree.prev_element_sibling(current),
        };
    }

    false
}
