//! Source scanner — byte cursor over one file's text.
//!
//! Finds the file's `package` clause and every `/*** … */` documentation
//! block. Ordinary `//` and `/* */` comments are stepped over whole so
//! their contents are never mistaken for markers.

use crate::error::ScanError;
use crate::model::RawCommentBlock;

/// Package name used when a file has no `package` clause.
pub const DEFAULT_PACKAGE: &str = "main";

const PACKAGE_KEYWORD: &[u8] = b"package";
const DOC_OPEN: &[u8] = b"/***";
// `/***/` is an ordinary empty comment whose closer overlaps the opener.
const DOC_OPEN_CLOSED: &[u8] = b"/***/";
const BLOCK_OPEN: &[u8] = b"/*";
const BLOCK_CLOSE: &[u8] = b"*/";
const LINE_COMMENT: &[u8] = b"//";

/// Result of scanning one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub package_name: String,
    pub blocks: Vec<RawCommentBlock>,
}

/// Scan `text` for its package name and documentation blocks.
pub fn scan(text: &str, path: &str) -> Result<ScannedFile, ScanError> {
    let mut cursor = Cursor::new(text);
    let package_name = cursor
        .find_package()
        .unwrap_or_else(|| DEFAULT_PACKAGE.to_string());

    cursor.rewind();
    let mut blocks = Vec::new();
    while !cursor.at_end() {
        if cursor.starts_with(DOC_OPEN) && !cursor.starts_with(DOC_OPEN_CLOSED) {
            let lines = cursor.read_doc_block()?;
            if !lines.is_empty() {
                blocks.push(RawCommentBlock {
                    file_path: path.to_string(),
                    package_name: package_name.clone(),
                    lines,
                });
            }
        } else if !cursor.skip_trivia() {
            cursor.bump();
        }
    }

    Ok(ScannedFile {
        package_name,
        blocks,
    })
}

struct Cursor<'a> {
    text: &'a str,
    src: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Cursor {
            text,
            src: text.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    fn rewind(&mut self) {
        self.pos = 0;
        self.line = 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Current byte, or 0 at end of input.
    fn current(&self) -> u8 {
        self.peek(0)
    }

    fn peek(&self, ahead: usize) -> u8 {
        self.src.get(self.pos + ahead).copied().unwrap_or(0)
    }

    fn starts_with(&self, needle: &[u8]) -> bool {
        self.src[self.pos.min(self.src.len())..].starts_with(needle)
    }

    fn bump(&mut self) {
        if let Some(&b) = self.src.get(self.pos) {
            if b == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), b' ' | b'\t' | b'\n' | b'\r') {
            self.bump();
        }
    }

    fn skip_line(&mut self) {
        while !self.at_end() && self.current() != b'\n' {
            self.bump();
        }
    }

    /// Skip an ordinary block comment. An unterminated one runs to EOF.
    fn skip_block_comment(&mut self) {
        self.advance_by(BLOCK_OPEN.len());
        while !self.at_end() && !self.starts_with(BLOCK_CLOSE) {
            self.bump();
        }
        self.advance_by(BLOCK_CLOSE.len());
    }

    /// Interpreted string or rune literal, bounded by the end of the line.
    fn skip_quoted(&mut self, quote: u8) {
        self.bump();
        while !self.at_end() {
            match self.current() {
                b'\\' => self.advance_by(2),
                c if c == quote => {
                    self.bump();
                    return;
                }
                b'\n' => return,
                _ => self.bump(),
            }
        }
    }

    /// Backquoted raw string. Spans lines and has no escapes.
    fn skip_raw_string(&mut self) {
        self.bump();
        while !self.at_end() && self.current() != b'`' {
            self.bump();
        }
        self.bump();
    }

    /// Length of a `*/` closer at the cursor, counting any extra leading
    /// stars as in `**/`.
    fn closer_len(&self) -> Option<usize> {
        let mut stars = 0;
        while self.peek(stars) == b'*' {
            stars += 1;
        }
        (stars > 0 && self.peek(stars) == b'/').then_some(stars + 1)
    }

    /// Step over a comment or string at the cursor. Returns false when the
    /// cursor is on ordinary code.
    fn skip_trivia(&mut self) -> bool {
        if self.starts_with(LINE_COMMENT) {
            self.skip_line();
        } else if self.starts_with(BLOCK_OPEN) {
            self.skip_block_comment();
        } else if matches!(self.current(), b'"' | b'\'') {
            self.skip_quoted(self.current());
        } else if self.current() == b'`' {
            self.skip_raw_string();
        } else {
            return false;
        }
        true
    }

    fn at_word_start(&self) -> bool {
        self.pos == 0 || !is_ident_byte(self.src[self.pos - 1])
    }

    /// Locate `package <name>` outside comments and return the name.
    fn find_package(&mut self) -> Option<String> {
        while !self.at_end() {
            if self.skip_trivia() {
                continue;
            }
            if self.at_word_start()
                && self.starts_with(PACKAGE_KEYWORD)
                && matches!(self.peek(PACKAGE_KEYWORD.len()), b' ' | b'\t')
            {
                self.advance_by(PACKAGE_KEYWORD.len());
                self.skip_whitespace();
                let start = self.pos;
                while !self.at_end() && is_ident_byte(self.current()) {
                    self.bump();
                }
                let name = &self.text[start..self.pos];
                if !name.is_empty() {
                    return Some(name.to_string());
                }
                continue;
            }
            self.bump();
        }
        None
    }

    /// Read a documentation block starting at its opening marker.
    fn read_doc_block(&mut self) -> Result<Vec<String>, ScanError> {
        let opened_at = self.line;
        self.advance_by(DOC_OPEN.len());
        // A longer run of stars still belongs to the opener.
        while self.current() == b'*' && self.peek(1) != b'/' {
            self.bump();
        }

        let mut lines = Vec::new();
        loop {
            self.skip_whitespace();
            if self.at_end() {
                return Err(ScanError::Unterminated { line: opened_at });
            }
            if let Some(len) = self.closer_len() {
                self.advance_by(len);
                return Ok(lines);
            }

            let start = self.pos;
            while !self.at_end() && self.current() != b'\n' && self.closer_len().is_none() {
                self.bump();
            }
            let line = self.text[start..self.pos].trim();
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_doc_blocks_is_empty() {
        let src = "package util\n\n// plain comment\n/* block */\n/** javadoc */\nfunc F() {}\n";
        let scanned = scan(src, "util.go").unwrap();
        assert_eq!(scanned.package_name, "util");
        assert!(scanned.blocks.is_empty());
    }

    #[test]
    fn extracts_trimmed_lines() {
        let src = "/***\n  -- FUNC\n\t@func Run\n\n   @desc Runs it.   \n*/\npackage app\n";
        let scanned = scan(src, "app.go").unwrap();
        assert_eq!(scanned.package_name, "app");
        assert_eq!(scanned.blocks.len(), 1);
        assert_eq!(
            scanned.blocks[0].lines,
            vec!["-- FUNC", "@func Run", "@desc Runs it."]
        );
        assert_eq!(scanned.blocks[0].package_name, "app");
        assert_eq!(scanned.blocks[0].file_path, "app.go");
    }

    #[test]
    fn package_keyword_in_comments_is_ignored() {
        let src = "// package wrong\n/* package alsowrong */\n/***\n@desc mentions package pkg\n*/\npackage right\n";
        let scanned = scan(src, "f.go").unwrap();
        assert_eq!(scanned.package_name, "right");
    }

    #[test]
    fn package_must_be_a_whole_word() {
        let src = "var subpackage = 1\npackage real\n";
        assert_eq!(scan(src, "f.go").unwrap().package_name, "real");
    }

    #[test]
    fn missing_package_defaults() {
        let src = "/***\n-- VAR\n@var X\n*/\n";
        let scanned = scan(src, "f.go").unwrap();
        assert_eq!(scanned.package_name, DEFAULT_PACKAGE);
        assert_eq!(scanned.blocks.len(), 1);
    }

    #[test]
    fn empty_block_is_dropped() {
        let src = "package a\n/***\n\n   \n*/\n/****/\n/***/\nvar x = 1\n";
        let scanned = scan(src, "a.go").unwrap();
        assert!(scanned.blocks.is_empty());
    }

    #[test]
    fn unterminated_block_is_an_error() {
        let src = "package a\n\n/***\n-- FUNC\n@func F\n";
        let err = scan(src, "a.go").unwrap_err();
        assert_eq!(err, ScanError::Unterminated { line: 3 });
    }

    #[test]
    fn first_close_ends_block() {
        let src = "package a\n/***\n@desc one /*** nested\n@desc two */ trailing\n*/\n";
        let scanned = scan(src, "a.go").unwrap();
        assert_eq!(scanned.blocks.len(), 1);
        assert_eq!(
            scanned.blocks[0].lines,
            vec!["@desc one /*** nested", "@desc two"]
        );
    }

    #[test]
    fn marker_inside_ordinary_comments_is_ignored() {
        let src = "package a\n// see /*** here\n/* also /*** here */\nx := \"/*** not doc\"\n";
        let scanned = scan(src, "a.go").unwrap();
        assert!(scanned.blocks.is_empty());
    }

    #[test]
    fn multiple_blocks_in_order() {
        let src = "/***\n-- FILE\n@file a.go\n*/\npackage a\n/***\n-- TYPE\n@type T\n*/\n/*****\n-- VAR\n@var V\n*/\n";
        let scanned = scan(src, "a.go").unwrap();
        let heads: Vec<_> = scanned.blocks.iter().map(|b| b.lines[0].as_str()).collect();
        assert_eq!(heads, vec!["-- FILE", "-- TYPE", "-- VAR"]);
    }

    #[test]
    fn comment_openers_inside_literals_are_ignored() {
        let src = "package a\nvar p = `src/*`\nvar q = '/'\nvar r = \"/*\"\n/***\n-- VAR\n@var V\n*/\nvar s = `multi\n/* line */ raw`\n/***\n-- VAR\n@var W\n*/\n";
        let scanned = scan(src, "a.go").unwrap();
        let lines: Vec<_> = scanned.blocks.iter().map(|b| b.lines.clone()).collect();
        assert_eq!(
            lines,
            vec![vec!["-- VAR", "@var V"], vec!["-- VAR", "@var W"]]
        );
    }

    #[test]
    fn starred_closer_ends_block() {
        let src = "package a\n/***\n-- VAR\n@var V\n**/\n/***\n-- VAR\n@var W ***/\n";
        let scanned = scan(src, "a.go").unwrap();
        assert_eq!(scanned.blocks[0].lines, vec!["-- VAR", "@var V"]);
        assert_eq!(scanned.blocks[1].lines, vec!["-- VAR", "@var W"]);
    }

    #[test]
    fn non_ascii_content_is_preserved() {
        let src = "package a\n/***\n@desc Grüße — ok\n*/\n";
        let scanned = scan(src, "a.go").unwrap();
        assert_eq!(scanned.blocks[0].lines, vec!["@desc Grüße — ok"]);
    }
}
