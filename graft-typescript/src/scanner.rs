//! Tokenizer and unit splitter for TypeScript source.
//!
//! The scanner does not build an AST. It produces a flat token stream with
//! byte offsets and cuts a range of tokens into coarse units: top-level
//! statements, class members, or comma-separated enum and object members.
//! Everything the editors need is recovered from those units; all other
//! text is carried through verbatim.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Str,
    Template,
    Number,
    Regex,
    Punct,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    /// A line break separates this token from the previous one.
    pub newline_before: bool,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }

    pub fn is_punct(&self, src: &str, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text(src) == punct
    }

    pub fn is_ident(&self, src: &str, ident: &str) -> bool {
        self.kind == TokenKind::Ident && self.text(src) == ident
    }

    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }

    /// Contents of a string literal without its quotes.
    pub fn unquoted<'a>(&self, src: &'a str) -> &'a str {
        let text = self.text(src);
        if self.kind == TokenKind::Str && text.len() >= 2 {
            &text[1..text.len() - 1]
        } else {
            text
        }
    }
}

// Longest first. `>>` is left out so nested generics close one at a time.
const PUNCTUATORS: &[&str] = &[
    "...", "===", "!==", "**=", "<<=", "&&=", "||=", "??=", "=>", "==", "!=", "<=", ">=", "&&",
    "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "**", "<<",
];

// Keywords after which a `/` starts a regular expression.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "case",
    "do",
    "else",
    "in",
    "instanceof",
    "new",
    "delete",
    "void",
    "throw",
    "yield",
    "await",
    "of",
];

/// Split `src` into tokens, comments included.
pub fn tokenize(src: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(src);
    let mut tokens = Vec::new();
    let mut prev: Option<Token> = None;
    while let Some(token) = lexer.next_token(prev.as_ref())? {
        if !token.is_comment() {
            prev = Some(token);
        }
        tokens.push(token);
    }
    Ok(tokens)
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn error(&self, message: &str, start: usize) -> Box<Error> {
        let end = self.pos.min(self.src.len());
        Error::parse_shape(message, self.src, (start, end - start))
    }

    fn next_token(&mut self, prev: Option<&Token>) -> Result<Option<Token>> {
        let mut newline_before = false;
        while let Some(byte) = self.peek_at(0) {
            if byte == b'\n' {
                newline_before = true;
            } else if !byte.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }

        let start = self.pos;
        let Some(byte) = self.peek_at(0) else {
            return Ok(None);
        };

        let kind = match byte {
            b'/' if self.peek_at(1) == Some(b'/') => {
                while self.peek_at(0).is_some_and(|b| b != b'\n') {
                    self.pos += 1;
                }
                TokenKind::Comment
            }
            b'/' if self.peek_at(1) == Some(b'*') => {
                self.pos += 2;
                loop {
                    match self.peek_at(0) {
                        None => return Err(self.error("unterminated comment", start)),
                        Some(b'*') if self.peek_at(1) == Some(b'/') => {
                            self.pos += 2;
                            break;
                        }
                        Some(_) => self.pos += 1,
                    }
                }
                TokenKind::Comment
            }
            b'/' if regex_allowed(self.src, prev) => {
                self.lex_regex(start)?;
                TokenKind::Regex
            }
            b'\'' | b'"' => {
                self.lex_string(byte, start)?;
                TokenKind::Str
            }
            b'`' => {
                self.lex_template(start)?;
                TokenKind::Template
            }
            b'0'..=b'9' => {
                self.lex_number();
                TokenKind::Number
            }
            b'.' if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => {
                self.lex_number();
                TokenKind::Number
            }
            b'#' if self.peek_at(1).is_some_and(is_ident_start) => {
                self.pos += 1;
                self.lex_ident();
                TokenKind::Ident
            }
            b if is_ident_start(b) => {
                self.lex_ident();
                TokenKind::Ident
            }
            _ => {
                let rest = &self.src[self.pos..];
                let len = PUNCTUATORS
                    .iter()
                    .find(|p| rest.starts_with(**p))
                    .map_or(1, |p| p.len());
                self.pos += len;
                TokenKind::Punct
            }
        };

        Ok(Some(Token {
            kind,
            start,
            end: self.pos,
            newline_before,
        }))
    }

    fn lex_ident(&mut self) {
        while self.peek_at(0).is_some_and(is_ident_continue) {
            self.pos += 1;
        }
    }

    fn lex_number(&mut self) {
        let hex = self.peek_at(0) == Some(b'0') && matches!(self.peek_at(1), Some(b'x' | b'X'));
        self.pos += 1;
        while let Some(byte) = self.peek_at(0) {
            let exponent_sign = !hex
                && matches!(byte, b'+' | b'-')
                && matches!(self.bytes[self.pos - 1], b'e' | b'E');
            if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'.' || exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn lex_string(&mut self, quote: u8, start: usize) -> Result<()> {
        self.pos += 1;
        loop {
            match self.peek_at(0) {
                None | Some(b'\n') => return Err(self.error("unterminated string literal", start)),
                Some(b'\\') => self.pos += 2,
                Some(b) if b == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn lex_template(&mut self, start: usize) -> Result<()> {
        self.pos += 1;
        loop {
            match self.peek_at(0) {
                None => return Err(self.error("unterminated template literal", start)),
                Some(b'\\') => self.pos += 2,
                Some(b'`') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'$') if self.peek_at(1) == Some(b'{') => {
                    self.pos += 2;
                    self.skip_substitution(start)?;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Skip a `${ ... }` expression up to and including its closing brace.
    fn skip_substitution(&mut self, start: usize) -> Result<()> {
        let mut depth = 0usize;
        let mut prev: Option<Token> = None;
        loop {
            let Some(token) = self.next_token(prev.as_ref())? else {
                return Err(self.error("unterminated template literal", start));
            };
            if token.kind == TokenKind::Punct {
                match token.text(self.src) {
                    "{" => depth += 1,
                    "}" if depth == 0 => return Ok(()),
                    "}" => depth -= 1,
                    _ => {}
                }
            }
            if !token.is_comment() {
                prev = Some(token);
            }
        }
    }

    fn lex_regex(&mut self, start: usize) -> Result<()> {
        self.pos += 1;
        let mut in_class = false;
        loop {
            match self.peek_at(0) {
                None | Some(b'\n') => {
                    return Err(self.error("unterminated regular expression", start));
                }
                Some(b'\\') => self.pos += 2,
                Some(b'[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some(b'/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        self.lex_ident();
        Ok(())
    }
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$' || byte >= 0x80
}

fn is_ident_continue(byte: u8) -> bool {
    is_ident_start(byte) || byte.is_ascii_digit()
}

fn regex_allowed(src: &str, prev: Option<&Token>) -> bool {
    let Some(prev) = prev else {
        return true;
    };
    match prev.kind {
        TokenKind::Punct => !matches!(prev.text(src), ")" | "]" | "}"),
        TokenKind::Ident => REGEX_PREFIX_KEYWORDS.contains(&prev.text(src)),
        _ => false,
    }
}

/// How a token range is cut into units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// Statements of a module.
    TopLevel,
    /// Members of a class body.
    ClassBody,
    /// Comma separated members of an enum or object literal.
    Commas,
}

/// A statement or member together with the comments attached to it.
#[derive(Debug, Clone)]
pub struct Unit {
    pub leading: Vec<Token>,
    /// Significant tokens. Never empty. Separating commas are not included.
    pub tokens: Vec<Token>,
    pub trailing: Option<Token>,
}

impl Unit {
    pub fn start(&self) -> usize {
        self.tokens[0].start
    }

    pub fn end(&self) -> usize {
        self.tokens[self.tokens.len() - 1].end
    }
}

#[derive(Debug, Clone, Default)]
pub struct Split {
    pub units: Vec<Unit>,
    /// Comments after the last unit.
    pub dangling: Vec<Token>,
}

// Modifiers that may precede a block declaration at the top level.
const DECLARATION_MODIFIERS: &[&str] =
    &["export", "default", "declare", "abstract", "async", "const"];

const BLOCK_KEYWORDS: &[&str] = &[
    "function",
    "class",
    "enum",
    "interface",
    "namespace",
    "module",
];

// Identifiers that cannot end a statement.
const CONTINUATION_END_KEYWORDS: &[&str] = &[
    "extends",
    "implements",
    "as",
    "satisfies",
    "new",
    "typeof",
    "keyof",
    "in",
    "instanceof",
    "export",
    "default",
    "declare",
    "abstract",
    "async",
    "public",
    "private",
    "protected",
    "static",
    "readonly",
    "override",
    "accessor",
    "const",
    "let",
    "var",
    "import",
    "from",
    "class",
    "enum",
    "interface",
    "function",
    "namespace",
];

// Identifiers that cannot start a statement.
const CONTINUATION_START_KEYWORDS: &[&str] = &[
    "else",
    "catch",
    "finally",
    "from",
    "as",
    "satisfies",
    "extends",
    "implements",
    "in",
    "instanceof",
];

const CONTINUATION_START_PUNCTS: &[&str] = &[
    ".", "?.", "=", "=>", ":", "?", "|", "&", "&&", "||", "??", "+", "-", "*", "/", "%", ",", ")",
    "]", ">", "(", "{", "==", "===", "!=", "!==", "<=", ">=", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "**=", "&&=", "||=", "??=", "<<", "<<=",
];

const STATEMENT_END_PUNCTS: &[&str] = &[")", "]", "}", "++", "--", "!", ">", ";"];

/// Cut `tokens` into units according to `mode`.
pub fn split_units(src: &str, tokens: &[Token], mode: SplitMode) -> Split {
    let mut splitter = Splitter {
        src,
        mode,
        split: Split::default(),
        pending: Vec::new(),
        current: Vec::new(),
        tail: Vec::new(),
        depth: 0,
        body_open: false,
        just_closed: false,
    };
    for token in tokens {
        splitter.push(*token);
    }
    splitter.finish()
}

struct Splitter<'a> {
    src: &'a str,
    mode: SplitMode,
    split: Split,
    /// Comments waiting for the next unit.
    pending: Vec<Token>,
    current: Vec<Token>,
    /// Comments after the last significant token of `current`.
    tail: Vec<Token>,
    depth: usize,
    /// The brace that opened the current depth-0 block looks like a body.
    body_open: bool,
    /// A unit ended and nothing but whitespace followed on its line so far.
    just_closed: bool,
}

impl Splitter<'_> {
    fn push(&mut self, token: Token) {
        if token.is_comment() {
            self.push_comment(token);
            return;
        }
        self.just_closed = false;

        if self.mode != SplitMode::Commas
            && !self.current.is_empty()
            && self.depth == 0
            && token.newline_before
            && self.inserts_semicolon(&token)
        {
            self.close_unit();
        }

        if self.mode == SplitMode::Commas && self.depth == 0 && token.is_punct(self.src, ",") {
            self.close_unit();
            return;
        }

        self.tail.clear();
        if token.kind == TokenKind::Punct {
            match token.text(self.src) {
                "{" => {
                    if self.depth == 0 {
                        self.body_open = self.opens_body();
                    }
                    self.depth += 1;
                }
                "(" | "[" => self.depth += 1,
                "}" | ")" | "]" => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
        }
        self.current.push(token);

        if self.mode == SplitMode::Commas || self.depth != 0 {
            return;
        }
        if token.is_punct(self.src, ";") {
            self.close_unit();
        } else if token.is_punct(self.src, "}") && self.body_open && self.is_block_unit() {
            self.close_unit();
        }
    }

    fn push_comment(&mut self, token: Token) {
        if !self.current.is_empty() {
            self.tail.push(token);
            return;
        }
        if self.just_closed
            && !token.newline_before
            && let Some(last) = self.split.units.last_mut()
            && last.trailing.is_none()
        {
            last.trailing = Some(token);
            self.just_closed = false;
            return;
        }
        self.just_closed = false;
        self.pending.push(token);
    }

    fn close_unit(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut tail = std::mem::take(&mut self.tail).into_iter();
        let mut trailing = None;
        let mut carried = Vec::new();
        if let Some(first) = tail.next() {
            if first.newline_before {
                carried.push(first);
            } else {
                trailing = Some(first);
            }
        }
        carried.extend(tail);

        self.split.units.push(Unit {
            leading: std::mem::take(&mut self.pending),
            tokens: std::mem::take(&mut self.current),
            trailing,
        });
        self.pending = carried;
        self.depth = 0;
        self.body_open = false;
        self.just_closed = trailing.is_none() && self.pending.is_empty();
    }

    fn finish(mut self) -> Split {
        self.close_unit();
        self.split.dangling = std::mem::take(&mut self.pending);
        self.split
    }

    fn opens_body(&self) -> bool {
        let Some(prev) = self.current.last() else {
            return false;
        };
        match prev.kind {
            TokenKind::Punct => matches!(prev.text(self.src), ")" | ">"),
            TokenKind::Ident => !matches!(
                prev.text(self.src),
                "import" | "export" | "type" | "return" | "from" | "as" | "satisfies" | "default"
                    | "extends"
            ),
            TokenKind::Str => true,
            _ => false,
        }
    }

    fn is_block_unit(&self) -> bool {
        match self.mode {
            SplitMode::TopLevel => {
                let start = skip_decorators(self.src, &self.current, 0);
                self.current[start..]
                    .iter()
                    .find(|t| !DECLARATION_MODIFIERS.contains(&t.text(self.src)))
                    .is_some_and(|t| {
                        t.kind == TokenKind::Ident && BLOCK_KEYWORDS.contains(&t.text(self.src))
                    })
            }
            SplitMode::ClassBody => {
                let mut depth = 0usize;
                for token in &self.current {
                    match token.text(self.src) {
                        "{" | "(" | "[" => depth += 1,
                        "}" | ")" | "]" => depth = depth.saturating_sub(1),
                        "=" if depth == 0 && token.kind == TokenKind::Punct => return false,
                        _ => {}
                    }
                }
                true
            }
            SplitMode::Commas => false,
        }
    }

    /// Whether a line break before `next` ends the current unit.
    fn inserts_semicolon(&self, next: &Token) -> bool {
        let src = self.src;
        if skip_decorators(src, &self.current, 0) == self.current.len() {
            return false;
        }
        if let Some(last) = self.current.last() {
            let text = last.text(src);
            match last.kind {
                TokenKind::Punct if !STATEMENT_END_PUNCTS.contains(&text) => return false,
                TokenKind::Ident if CONTINUATION_END_KEYWORDS.contains(&text) => return false,
                _ => {}
            }
        }
        let text = next.text(src);
        match next.kind {
            TokenKind::Punct => !CONTINUATION_START_PUNCTS.contains(&text),
            TokenKind::Ident => !CONTINUATION_START_KEYWORDS.contains(&text),
            TokenKind::Template => false,
            _ => true,
        }
    }
}

/// Index of the first token after any decorators starting at `index`.
pub fn skip_decorators(src: &str, tokens: &[Token], mut index: usize) -> usize {
    while index < tokens.len() && tokens[index].is_punct(src, "@") {
        index += 1;
        if index < tokens.len() && tokens[index].kind == TokenKind::Ident {
            index += 1;
        }
        while index + 1 < tokens.len()
            && tokens[index].is_punct(src, ".")
            && tokens[index + 1].kind == TokenKind::Ident
        {
            index += 2;
        }
        if index < tokens.len() && tokens[index].is_punct(src, "(") {
            index = matching_close(src, tokens, index).map_or(tokens.len(), |close| close + 1);
        }
    }
    index
}

/// Index of the bracket closing the one at `open`.
pub fn matching_close(src: &str, tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        if token.kind != TokenKind::Punct {
            continue;
        }
        match token.text(src) {
            "{" | "(" | "[" => depth += 1,
            "}" | ")" | "]" => {
                if depth <= 1 {
                    return (depth == 1).then_some(index);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}
