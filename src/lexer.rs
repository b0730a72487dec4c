//! Tag lexer — turns a block's lines into a header kind and a directive tree.
//!
//! ```text
//! -- PKG                      header, consumed
//! @pkg handler                directive
//! @desc Handlers for the      directive ...
//!   user endpoints.           ... continued
//! @dep {                      directive with children
//!   @name Testify
//!   @link https://…
//! }
//! ```

use crate::error::LexError;
use crate::model::{Directive, EntityKind, TagBlock};

const HEADER_PREFIX: &str = "--";
const TAG_SIGIL: char = '@';
const BLOCK_OPEN: char = '{';
const BLOCK_CLOSE: &str = "}";

/// Lex one block's lines.
pub fn tokenize<S: AsRef<str>>(lines: &[S]) -> Result<TagBlock, LexError> {
    let first = lines.first().ok_or(LexError::EmptyBlock)?.as_ref().trim();

    let (kind, body) = match first.strip_prefix(HEADER_PREFIX) {
        Some(rest) => {
            let keyword = rest.split_whitespace().next().unwrap_or("");
            let kind = EntityKind::from_keyword(keyword).unwrap_or(EntityKind::Uncategorized);
            (kind, &lines[1..])
        }
        None => (EntityKind::Uncategorized, lines),
    };

    let mut lexer = Lexer { lines: body, pos: 0 };
    let mut preamble = String::new();
    let directives = lexer.directives(0, &mut preamble)?;

    Ok(TagBlock {
        kind,
        preamble,
        directives,
    })
}

struct Lexer<'a, S> {
    lines: &'a [S],
    pos: usize,
}

impl<'a, S: AsRef<str>> Lexer<'a, S> {
    fn next_line(&mut self) -> Option<&'a str> {
        let lines: &'a [S] = self.lines;
        let line = lines.get(self.pos)?;
        self.pos += 1;
        Some(line.as_ref().trim())
    }

    /// Read directives until the end of input (depth 0) or the `}` closing
    /// this level. Stray text before the first directive goes to `stray`.
    fn directives(&mut self, depth: usize, stray: &mut String) -> Result<Vec<Directive>, LexError> {
        let mut out: Vec<Directive> = Vec::new();

        while let Some(line) = self.next_line() {
            if line.is_empty() {
                continue;
            }
            if line == BLOCK_CLOSE {
                if depth == 0 {
                    return Err(LexError::MalformedTag {
                        message: "closing `}` without an open block".to_string(),
                    });
                }
                return Ok(out);
            }

            let Some(tag) = line.strip_prefix(TAG_SIGIL) else {
                match out.last_mut() {
                    Some(last) => join_line(&mut last.value, line),
                    None => join_line(stray, line),
                }
                continue;
            };

            let mut directive = tag_directive(tag);
            if let Some(head) = directive.value.strip_suffix(BLOCK_OPEN) {
                directive.value = head.trim_end().to_string();
                directive.children = self.directives(depth + 1, &mut directive.value)?;
            }
            out.push(directive);
        }

        if depth > 0 {
            return Err(LexError::MalformedTag {
                message: format!("unterminated `{{` block ({} level(s) open)", depth),
            });
        }
        Ok(out)
    }
}

/// Build a directive from the text after the sigil. A one-line
/// `{ @a x @b y }` value becomes children.
fn tag_directive(tag: &str) -> Directive {
    let (name, value) = split_tag(tag);
    let mut directive = Directive::new(name, value);

    if let Some(inner) = value
        .strip_prefix(BLOCK_OPEN)
        .and_then(|v| v.strip_suffix(BLOCK_CLOSE))
    {
        directive.value.clear();
        for piece in split_inline(inner) {
            match piece.strip_prefix(TAG_SIGIL) {
                Some(child) => directive.children.push(tag_directive(child)),
                None => join_line(&mut directive.value, piece),
            }
        }
    }
    directive
}

/// Split `name rest of value` at the first whitespace run.
fn split_tag(tag: &str) -> (&str, &str) {
    match tag.find(char::is_whitespace) {
        Some(i) => (&tag[..i], tag[i..].trim()),
        None => (tag, ""),
    }
}

/// Cut a one-line block body before every `@` that starts a word.
fn split_inline(body: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut prev_space = true;
    for (i, c) in body.char_indices() {
        if c == TAG_SIGIL && prev_space && i > start {
            pieces.push(body[start..i].trim());
            start = i;
        }
        prev_space = c.is_whitespace();
    }
    pieces.push(body[start..].trim());
    pieces.retain(|p| !p.is_empty());
    pieces
}

fn join_line(dest: &mut String, text: &str) {
    if !dest.is_empty() {
        dest.push(' ');
    }
    dest.push_str(text);
}
