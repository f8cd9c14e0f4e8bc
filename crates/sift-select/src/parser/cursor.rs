//! Character cursor over a selector string.

/// An identifier as written and with escapes resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident<'a> {
    /// Source text, escapes included.
    pub raw: &'a str,
    /// Value with every `\x` replaced by `x`.
    pub value: String,
}

/// Byte-position cursor. Never splits a character.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

impl<'a> Cursor<'a> {
    /// Cursor at the start of `input`.
    pub const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Current byte offset.
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Unconsumed input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Input between two earlier offsets.
    pub fn slice(&self, from: usize, to: usize) -> &'a str {
        &self.input[from..to]
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume and return the next character.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `expected` if it is next.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Skip whitespace, returning how many characters were skipped.
    pub fn skip_whitespace(&mut self) -> usize {
        let mut skipped = 0;
        while self.peek().is_some_and(char::is_whitespace) {
            let _ = self.bump();
            skipped += 1;
        }
        skipped
    }

    /// Whether the next non-whitespace character ends the current branch.
    pub fn at_separator(&self) -> bool {
        matches!(self.rest().trim_start().chars().next(), None | Some(','))
    }

    /// Consume `[\w-]` characters and `\`-escapes. `None` when nothing matched.
    pub fn ident(&mut self) -> Option<Ident<'a>> {
        let start = self.pos;
        let mut value = String::new();
        loop {
            match self.peek() {
                Some('\\') => {
                    let mut ahead = self.rest().chars();
                    let _ = ahead.next();
                    let Some(escaped) = ahead.next() else {
                        break;
                    };
                    self.pos += 1 + escaped.len_utf8();
                    value.push(escaped);
                }
                Some(c) if is_ident_char(c) => {
                    self.pos += c.len_utf8();
                    value.push(c);
                }
                _ => break,
            }
        }
        (self.pos > start).then(|| Ident {
            raw: self.slice(start, self.pos),
            value,
        })
    }

    /// Consume a `"..."` or `'...'` string and return its unescaped content.
    ///
    /// Leaves the cursor untouched and returns `None` when no quote is next or
    /// the string is unterminated.
    pub fn quoted(&mut self) -> Option<String> {
        let quote = self.peek().filter(|&c| c == '"' || c == '\'')?;
        let mut chars = self.rest().char_indices().skip(1);
        let mut value = String::new();
        while let Some((offset, c)) = chars.next() {
            match c {
                '\\' => value.push(chars.next()?.1),
                c if c == quote => {
                    self.pos += offset + c.len_utf8();
                    return Some(value);
                }
                c => value.push(c),
            }
        }
        None
    }

    /// Consume a parenthesized group and return the raw text between the
    /// outer parentheses. Nested groups, quoted strings and escapes are skipped
    /// over. `None` (cursor untouched) when unbalanced.
    pub fn balanced_group(&mut self) -> Option<&'a str> {
        if self.peek() != Some('(') {
            return None;
        }
        let rest = self.rest();
        let end = scan(rest, 1, |depth, c| depth == 0 && c == ')')?;
        self.pos += end + 1;
        Some(&rest[1..end])
    }

    /// Consume up to, not including, the next top-level comma.
    pub fn take_branch(&mut self) -> &'a str {
        let rest = self.rest();
        let end = scan(rest, 0, |depth, c| depth == 0 && c == ',').unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }
}

/// Byte offset in `text`, starting at `from`, of the first character for which
/// `stop(depth, c)` holds, where `depth` counts open `(`/`[` groups. Quoted
/// strings and escapes never stop the scan.
fn scan(text: &str, from: usize, stop: impl Fn(usize, char) -> bool) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = text.char_indices().skip_while(|&(i, _)| i < from);
    while let Some((offset, c)) = chars.next() {
        if let Some(open) = quote {
            match c {
                '\\' => {
                    let _ = chars.next();
                }
                c if c == open => quote = None,
                _ => {}
            }
            continue;
        }
        if stop(depth, c) {
            return Some(offset);
        }
        match c {
            '\\' => {
                let _ = chars.next();
            }
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}
