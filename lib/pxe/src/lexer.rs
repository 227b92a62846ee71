//! Tokenizer for pxelinux-style configuration files.
//!
//! The format has no quoting, so the lexer cannot tell a keyword from a
//! literal by looking at the input alone. The caller says what it expects
//! through [LexState]: a keyword (one lower-cased word) or a string literal
//! (everything up to the end of the line).

use alloc::string::String;

/// Kinds of tokens the lexer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eol,
    String,
    Eof,
    Menu,
    Title,
    Timeout,
    Label,
    Kernel,
    Linux,
    Append,
    Initrd,
    Localboot,
    Default,
    Prompt,
    Include,
    Fdt,
    FdtDir,
    FdtOverlays,
    OnTimeout,
    IpAppend,
    Background,
    KaslrSeed,
    Invalid,
}

/// Keywords recognized in [LexState::Keyword] mode.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("menu", TokenKind::Menu),
    ("title", TokenKind::Title),
    ("timeout", TokenKind::Timeout),
    ("default", TokenKind::Default),
    ("prompt", TokenKind::Prompt),
    ("label", TokenKind::Label),
    ("kernel", TokenKind::Kernel),
    ("linux", TokenKind::Linux),
    ("localboot", TokenKind::Localboot),
    ("append", TokenKind::Append),
    ("initrd", TokenKind::Initrd),
    ("include", TokenKind::Include),
    ("devicetree", TokenKind::Fdt),
    ("fdt", TokenKind::Fdt),
    ("devicetreedir", TokenKind::FdtDir),
    ("fdtdir", TokenKind::FdtDir),
    ("fdtoverlays", TokenKind::FdtOverlays),
    ("ontimeout", TokenKind::OnTimeout),
    ("ipappend", TokenKind::IpAppend),
    ("background", TokenKind::Background),
    ("kaslrseed", TokenKind::KaslrSeed),
];

/// What the parser expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    /// Only line structure is recognized; any text is [TokenKind::Invalid].
    Normal,
    /// A whitespace-delimited word, matched against the keyword table.
    Keyword,
    /// Everything up to the end of the line, case preserved.
    StringLiteral,
}

/// A single token. `value` is empty for everything but words and literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    fn new(kind: TokenKind) -> Token {
        Token {
            kind,
            value: String::new(),
        }
    }
}

/// Cursor over a config buffer.
///
/// The buffer ends at its last byte or at the first NUL, whichever comes
/// first. Pushback is done by saving [Lexer::position] and handing it back
/// to [Lexer::rewind].
pub struct Lexer<'a> {
    buf: &'a [u8],
    cursor: usize,
}

/// Blanks separating tokens on a line. `\r` counts so CRLF files behave.
#[inline(always)]
fn is_blank(c: u8) -> bool {
    c == b' ' || c == b'\t' || c == b'\r'
}

impl<'a> Lexer<'a> {
    pub fn new(buf: &'a [u8]) -> Lexer<'a> {
        Lexer { buf, cursor: 0 }
    }

    /// Byte at `pos`, with NUL standing in for the end of the buffer.
    #[inline(always)]
    fn byte_at(&self, pos: usize) -> u8 {
        self.buf.get(pos).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn peek(&self) -> u8 {
        self.byte_at(self.cursor)
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn rewind(&mut self, position: usize) {
        self.cursor = position;
    }

    /// Text between `start` and the cursor, for diagnostics.
    pub fn snippet_since(&self, start: usize) -> String {
        let end = self.cursor.min(self.buf.len());
        let start = start.min(end);
        String::from_utf8_lossy(&self.buf[start..end]).into_owned()
    }

    /// Copy bytes up to a delimiter into a string token.
    ///
    /// With `delim == b' '` any whitespace ends the token. The cursor is left
    /// on the delimiter.
    fn read_string(&mut self, delim: u8, lower: bool) -> Token {
        let start = self.cursor;
        loop {
            let c = self.peek();
            if c == 0 || (delim == b' ' && c.is_ascii_whitespace()) || c == delim {
                break;
            }
            self.cursor += 1;
        }
        let mut raw = &self.buf[start..self.cursor];
        if delim == b'\n' {
            while let Some((last, rest)) = raw.split_last()
                && *last == b'\r'
            {
                raw = rest;
            }
        }
        let mut value = String::from_utf8_lossy(raw).into_owned();
        if lower {
            value.make_ascii_lowercase();
        }
        Token {
            kind: TokenKind::String,
            value,
        }
    }

    /// Produce the next token in `state`.
    pub fn next_token(&mut self, state: LexState) -> Token {
        while is_blank(self.peek()) {
            self.cursor += 1;
        }

        // A literal cannot start with '#', but may contain one later on.
        if self.peek() == b'#' {
            while !matches!(self.peek(), 0 | b'\n') {
                self.cursor += 1;
            }
        }

        match self.peek() {
            b'\n' => {
                self.cursor += 1;
                Token::new(TokenKind::Eol)
            }
            0 => {
                if self.cursor < self.buf.len() {
                    self.cursor += 1;
                }
                Token::new(TokenKind::Eof)
            }
            _ => match state {
                LexState::StringLiteral => self.read_string(b'\n', false),
                LexState::Keyword => {
                    let mut token = self.read_string(b' ', true);
                    if let Some((_, kind)) = KEYWORDS.iter().find(|(kw, _)| *kw == token.value) {
                        token.kind = *kind;
                    }
                    token
                }
                LexState::Normal => Token::new(TokenKind::Invalid),
            },
        }
    }

    /// Move the cursor to the end of the current line (onto the `\n`).
    pub fn skip_line(&mut self) {
        while !matches!(self.peek(), 0 | b'\n') {
            self.cursor += 1;
        }
    }
}
