//! Lexical pre-pass run before the grammar
//!
//! Two jobs, both on a byte-for-byte copy of the source so pest offsets stay
//! valid against the original text:
//!
//! - A newline that ends a statement becomes `;`. A newline ends a statement
//!   when the last token on the line can end one (a name, a literal, a closing
//!   bracket, `break`, `continue` or `return`) and the line is not inside
//!   parentheses, brackets or a dict literal. A following line that starts
//!   with `else`, `catch` or `.` continues the statement.
//! - Nesting is bounded. Brackets, prefix operators, binary operators,
//!   postfix chains, `?` and `else` all deepen the tree the parser and the
//!   evaluator recurse over; past [`MAX_NESTING_DEPTH`] the input is rejected.
//!
//! Comments are blanked to spaces.

use super::{LineIndex, ParseError, ParseResult};

/// Deepest syntactic nesting accepted in one snippet
pub const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    TopLevel,
    Paren,
    Bracket,
    Block,
    Dict,
}

impl Group {
    fn separates_on_newline(self) -> bool {
        matches!(self, Group::TopLevel | Group::Block)
    }
}

#[derive(Debug)]
struct Frame {
    group: Group,
    /// Depth of everything enclosing this group
    outer: usize,
    /// Operator chain length inside the current statement or element
    chain: usize,
}

/// What the previous significant token allows next
#[derive(Debug, Clone, Copy, Default)]
struct Prev {
    /// A newline after it may end the statement
    ends_statement: bool,
    /// A `{` after it opens a block rather than a dict literal
    opens_block: bool,
}

impl Prev {
    const VALUE: Prev = Prev {
        ends_statement: true,
        opens_block: true,
    };
    const NONE: Prev = Prev {
        ends_statement: false,
        opens_block: false,
    };
}

struct Scanner<'a> {
    lines: &'a LineIndex<'a>,
    frames: Vec<Frame>,
    prev: Prev,
    pending_newline: Option<usize>,
    out: Vec<u8>,
}

/// Rewrite `source` for the grammar, or reject it as too deeply nested
pub(crate) fn prepare(lines: &LineIndex<'_>) -> ParseResult<String> {
    let source = lines.source();
    let bytes = source.as_bytes();
    let mut scanner = Scanner {
        lines,
        frames: vec![Frame {
            group: Group::TopLevel,
            outer: 0,
            chain: 0,
        }],
        prev: Prev::NONE,
        pending_newline: None,
        out: bytes.to_vec(),
    };

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\n' => {
                if scanner.prev.ends_statement
                    && scanner.top().group.separates_on_newline()
                    && scanner.pending_newline.is_none()
                {
                    scanner.pending_newline = Some(i);
                }
                i += 1;
            }
            b' ' | b'\t' | b'\r' => i += 1,
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    scanner.out[i] = b' ';
                    i += 1;
                }
            }
            b'"' | b'\'' => {
                scanner.before_token(false);
                i = skip_string(bytes, i);
                scanner.prev = Prev::VALUE;
            }
            b'0'..=b'9' => {
                scanner.before_token(false);
                i = skip_number(bytes, i);
                scanner.prev = Prev::VALUE;
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                scanner.word(&source[start..i], start)?;
            }
            _ => {
                let len = operator_len(bytes, i);
                scanner.punct(source.get(i..i + len).unwrap_or(""), i)?;
                i += len;
            }
        }
    }
    scanner.flush_newline();

    String::from_utf8(scanner.out).map_err(|err| {
        ParseError::BuildError(format!("Invalid source text: {}", err), None)
    })
}

impl Scanner<'_> {
    fn top(&self) -> &Frame {
        // The top-level frame is never popped
        &self.frames[self.frames.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn depth(&self) -> usize {
        let top = self.top();
        top.outer + top.chain
    }

    /// Settle a newline seen since the last token
    fn before_token(&mut self, continues_statement: bool) {
        if continues_statement {
            self.pending_newline = None;
        } else {
            self.flush_newline();
        }
    }

    fn flush_newline(&mut self) {
        if let Some(pos) = self.pending_newline.take() {
            self.out[pos] = b';';
            self.separator();
        }
    }

    fn separator(&mut self) {
        self.top_mut().chain = 0;
        self.prev = Prev::NONE;
    }

    fn deepen(&mut self, offset: usize) -> ParseResult<()> {
        self.top_mut().chain += 1;
        self.check(offset)
    }

    fn check(&self, offset: usize) -> ParseResult<()> {
        if self.depth() > MAX_NESTING_DEPTH {
            return Err(ParseError::BuildError(
                format!(
                    "Too many nested expressions (limit {})",
                    MAX_NESTING_DEPTH
                ),
                Some(self.lines.span(offset, offset + 1)),
            ));
        }
        Ok(())
    }

    fn word(&mut self, word: &str, offset: usize) -> ParseResult<()> {
        self.before_token(matches!(word, "else" | "catch"));
        match word {
            "true" | "false" | "null" => self.prev = Prev::VALUE,
            "break" | "continue" | "return" => {
                self.prev = Prev {
                    ends_statement: true,
                    opens_block: false,
                }
            }
            "else" => {
                self.deepen(offset)?;
                self.prev = Prev {
                    ends_statement: false,
                    opens_block: true,
                };
            }
            "try" => {
                self.prev = Prev {
                    ends_statement: false,
                    opens_block: true,
                }
            }
            "in" => {
                self.deepen(offset)?;
                self.prev = Prev::NONE;
            }
            "if" | "while" | "for" | "fn" | "throw" | "catch" => self.prev = Prev::NONE,
            _ => self.prev = Prev::VALUE,
        }
        Ok(())
    }

    fn punct(&mut self, op: &str, offset: usize) -> ParseResult<()> {
        self.before_token(op == ".");
        let after_value = self.prev.ends_statement;

        match op {
            "(" | "[" | "{" => {
                if after_value && op != "{" {
                    // Call or index suffix
                    self.deepen(offset)?;
                }
                let group = match op {
                    "(" => Group::Paren,
                    "[" => Group::Bracket,
                    _ if self.prev.opens_block => Group::Block,
                    _ => Group::Dict,
                };
                let outer = self.depth() + 1;
                self.frames.push(Frame {
                    group,
                    outer,
                    chain: 0,
                });
                self.check(offset)?;
                self.prev = Prev::NONE;
            }
            ")" | "]" | "}" => {
                if self.frames.len() > 1 {
                    self.frames.pop();
                }
                self.prev = Prev::VALUE;
            }
            ";" | "," => self.separator(),
            "=" | "+=" | "-=" | "*=" | "/=" | ":" => self.prev = Prev::NONE,
            _ => {
                // Binary, prefix, `?` and member access all add a level
                self.deepen(offset)?;
                self.prev = Prev::NONE;
            }
        }
        Ok(())
    }
}

/// Offset just past a string literal starting at `start`
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Offset just past a number literal (digits, fraction, exponent)
fn skip_number(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        let next_is_digit = bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
        if b.is_ascii_alphanumeric() || b == b'_' {
            if (b == b'e' || b == b'E')
                && matches!(bytes.get(i + 1), Some(b'+') | Some(b'-'))
                && bytes.get(i + 2).is_some_and(u8::is_ascii_digit)
            {
                i += 2;
            }
            i += 1;
        } else if b == b'.' && next_is_digit {
            i += 1;
        } else {
            break;
        }
    }
    i
}

/// Length of the operator or punctuation token at `i`
fn operator_len(bytes: &[u8], i: usize) -> usize {
    const TWO_CHAR: [&[u8; 2]; 12] = [
        b"**", b"//", b"==", b"!=", b"<=", b">=", b"&&", b"||", b"+=", b"-=", b"*=", b"/=",
    ];
    if let Some(pair) = bytes.get(i..i + 2) {
        if TWO_CHAR.iter().any(|op| &op[..] == pair) {
            return 2;
        }
    }
    // Keep multi-byte characters whole so slicing stays on char boundaries
    match bytes[i] {
        b if b < 0x80 => 1,
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        _ => 2,
    }
    .min(bytes.len() - i)
}
