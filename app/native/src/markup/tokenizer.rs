//! Splits markup text into tag and text tokens.
//!
//! The tokenizer never fails. Constructs that are not terminated before the
//! end of input either swallow the rest of the input (comments, CDATA,
//! instructions) or fall back to plain text (tags).

/// A lexical unit of markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Raw text between tags, not yet trimmed or decoded.
    Text(&'a str),
    /// An opening tag. `body` is everything between `<` and `>`.
    Open { body: &'a str },
    /// A closing tag. `body` is everything between `</` and `>`.
    Close { body: &'a str },
    /// Content of a `<![CDATA[ ... ]]>` section.
    CData(&'a str),
    /// Content of a `<!-- ... -->` comment or any other `<! ... >` declaration.
    Comment(&'a str),
    /// Content of a `<? ... ?>` processing instruction.
    Instruction(&'a str),
}

/// Iterator over the tokens of a markup string.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub const fn new(input: &'a str) -> Self { Self { input, pos: 0 } }

    /// Returns the token starting at byte offset `lt` (a `<`) and the offset
    /// just past it, or `None` when the `<` does not start a tag.
    fn tag_at(&self, lt: usize) -> Option<(Token<'a>, usize)> {
        let rest = &self.input[lt..];

        if let Some(after) = rest.strip_prefix("<!--") {
            let start = lt + 4;
            return Some(match after.find("-->") {
                Some(end) => (Token::Comment(&after[..end]), start + end + 3),
                None => (Token::Comment(after), self.input.len()),
            });
        }

        if let Some(after) = rest.strip_prefix("<![CDATA[") {
            let start = lt + 9;
            return Some(match after.find("]]>") {
                Some(end) => (Token::CData(&after[..end]), start + end + 3),
                None => (Token::CData(after), self.input.len()),
            });
        }

        if let Some(after) = rest.strip_prefix("<!") {
            let end = declaration_end(after)?;
            return Some((Token::Comment(&after[..end]), lt + 2 + end + 1));
        }

        if let Some(after) = rest.strip_prefix("<?") {
            let start = lt + 2;
            return Some(match after.find("?>") {
                Some(end) => (Token::Instruction(&after[..end]), start + end + 2),
                None => (Token::Instruction(after), self.input.len()),
            });
        }

        if let Some(after) = rest.strip_prefix("</") {
            let end = tag_end(after)?;
            return Some((Token::Close { body: &after[..end] }, lt + 2 + end + 1));
        }

        let after = &rest[1..];
        let first = after.chars().next()?;
        if first.is_whitespace() || matches!(first, '<' | '>') {
            return None;
        }

        let end = tag_end(after)?;
        Some((Token::Open { body: &after[..end] }, lt + 1 + end + 1))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }

        let text_start = self.pos;
        let mut search_from = self.pos;

        loop {
            let Some(offset) = self.input[search_from..].find('<') else {
                self.pos = self.input.len();
                return Some(Token::Text(&self.input[text_start..]));
            };
            let lt = search_from + offset;

            match self.tag_at(lt) {
                Some(_) if lt > text_start => {
                    self.pos = lt;
                    return Some(Token::Text(&self.input[text_start..lt]));
                }
                Some((token, next)) => {
                    self.pos = next;
                    return Some(token);
                }
                // A stray `<` is ordinary text.
                None => search_from = lt + 1,
            }
        }
    }
}

/// Finds the `>` that closes a tag, skipping over quoted attribute values.
///
/// An unquoted `<` means the tag never closed.
fn tag_end(body: &str) -> Option<usize> {
    let mut quote: Option<char> = None;

    for (i, ch) in body.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '>') => return Some(i),
            (None, '<') => return None,
            (None, _) => {}
        }
    }

    None
}

/// Finds the `>` that closes a declaration such as `<!DOCTYPE ...>`,
/// skipping an internal subset in square brackets.
fn declaration_end(body: &str) -> Option<usize> {
    let mut depth = 0usize;

    for (i, ch) in body.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '>' if depth == 0 => return Some(i),
            _ => {}
        }
    }

    None
}
