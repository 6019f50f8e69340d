//! Tokenizer for Python cell source
//!
//! Produces the token stream the statement scanner and expression parser
//! work on. Newlines inside brackets, comments and backslash continuations
//! are consumed here, so a `Newline` token always ends a logical line.

use crate::bail_syntax;
use crate::error::Result;

/// Source position (1-based line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Decoded string literal contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrValue {
    Text(String),
    Bytes(Vec<u8>),
}

/// A single string literal token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrLit {
    pub value: StrValue,
    /// f-string; never a literal
    pub formatted: bool,
    /// Holds a `\N{...}` escape, kept undecoded in `value`
    pub named_escape: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Name(String),
    /// Raw numeric text, decoded by the parser
    Number(String),
    Str(StrLit),
    Op(&'static str),
    Newline,
    EndMarker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

impl Token {
    pub fn is_op(&self, op: &str) -> bool {
        matches!(self.kind, TokenKind::Op(o) if o == op)
    }

    pub fn is_name(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Name(n) if n == name)
    }

    /// Short rendering used in error messages
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Name(n) => format!("'{}'", n),
            TokenKind::Number(n) => format!("'{}'", n),
            TokenKind::Str(_) => "string".to_string(),
            TokenKind::Op(op) => format!("'{}'", op),
            TokenKind::Newline => "newline".to_string(),
            TokenKind::EndMarker => "end of input".to_string(),
        }
    }
}

/// Operators, longest first so that greedy matching picks `**=` over `**`
const OPERATORS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...", "!=", "%=", "&=", "**", "*=", "+=", "-=", "->", "//",
    "/=", ":=", "<<", "<=", "==", ">=", ">>", "@=", "^=", "|=", "!", "%", "&", "(", ")", "*",
    "+", ",", "-", ".", "/", ":", ";", "<", "=", ">", "@", "[", "]", "^", "{", "|", "}", "~",
];

const STRING_PREFIXES: &[&str] = &["r", "u", "b", "f", "br", "rb", "fr", "rf"];

/// Tokenize Python source text
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    idx: usize,
    line: usize,
    column: usize,
    brackets: Vec<(char, Pos)>,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        let normalized = source.replace("\r\n", "\n").replace('\r', "\n");
        Self {
            chars: normalized.chars().collect(),
            idx: 0,
            line: 1,
            column: 1,
            brackets: Vec::new(),
            tokens: Vec::new(),
        }
    }

    fn pos(&self) -> Pos {
        Pos::new(self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.idx).copied()?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, pos: Pos) {
        self.tokens.push(Token { kind, pos });
    }

    fn at_logical_line_start(&self) -> bool {
        matches!(
            self.tokens.last().map(|t| &t.kind),
            None | Some(TokenKind::Newline)
        )
    }

    fn run(mut self) -> Result<Vec<Token>> {
        loop {
            while matches!(self.peek(), Some(' ' | '\t' | '\x0c')) {
                self.bump();
            }

            let pos = self.pos();
            let Some(c) = self.peek() else {
                break;
            };

            match c {
                '#' => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.bump();
                    }
                }
                '\\' => {
                    self.bump();
                    if self.bump() != Some('\n') {
                        bail_syntax!(pos, "unexpected character after line continuation character");
                    }
                }
                '\n' => {
                    self.bump();
                    if self.brackets.is_empty() && !self.at_logical_line_start() {
                        self.push(TokenKind::Newline, pos);
                    }
                }
                c if c.is_ascii_digit() => self.number(pos),
                '.' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => self.number(pos),
                '\'' | '"' => {
                    let lit = self.string("", pos)?;
                    self.push(TokenKind::Str(lit), pos);
                }
                c if c == '_' || c.is_alphabetic() => self.name_or_string(pos)?,
                '(' | '[' | '{' => {
                    self.bump();
                    self.brackets.push((c, pos));
                    self.push(TokenKind::Op(bracket_op(c)), pos);
                }
                ')' | ']' | '}' => {
                    self.bump();
                    match self.brackets.pop() {
                        Some((open, _)) if closing_for(open) == c => {}
                        Some((open, _)) => bail_syntax!(
                            pos,
                            "closing parenthesis '{}' does not match opening parenthesis '{}'",
                            c,
                            open
                        ),
                        None => bail_syntax!(pos, "unmatched '{}'", c),
                    }
                    self.push(TokenKind::Op(bracket_op(c)), pos);
                }
                _ => self.operator(pos)?,
            }
        }

        if let Some(&(open, pos)) = self.brackets.last() {
            bail_syntax!(pos, "'{}' was never closed", open);
        }

        let end = self.pos();
        if !self.at_logical_line_start() {
            self.push(TokenKind::Newline, end);
        }
        self.push(TokenKind::EndMarker, end);
        Ok(self.tokens)
    }

    fn operator(&mut self, pos: Pos) -> Result<()> {
        let rest = &self.chars[self.idx..];
        let matched = OPERATORS.iter().copied().find(|op| {
            op.chars().count() <= rest.len() && op.chars().zip(rest.iter()).all(|(a, &b)| a == b)
        });

        match matched {
            Some(op) => {
                for _ in 0..op.chars().count() {
                    self.bump();
                }
                self.push(TokenKind::Op(op), pos);
                Ok(())
            }
            None => {
                let c = rest.first().copied().unwrap_or(' ');
                bail_syntax!(pos, "invalid character '{}' (U+{:04X})", c, c as u32)
            }
        }
    }

    fn name_or_string(&mut self, pos: Pos) -> Result<()> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c == '_' || c.is_alphanumeric() {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }

        let lowered = name.to_ascii_lowercase();
        if matches!(self.peek(), Some('\'' | '"')) && STRING_PREFIXES.contains(&lowered.as_str()) {
            let lit = self.string(&lowered, pos)?;
            self.push(TokenKind::Str(lit), pos);
        } else {
            self.push(TokenKind::Name(name), pos);
        }
        Ok(())
    }

    fn number(&mut self, pos: Pos) {
        let mut text = String::new();
        let radix_prefix = self.peek() == Some('0')
            && matches!(self.peek_at(1), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'));

        if radix_prefix {
            text.extend(self.bump());
            text.extend(self.bump());
            while let Some(c) = self.peek() {
                if c.is_ascii_hexdigit() || c == '_' {
                    text.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
        } else {
            self.digits(&mut text);
            if self.peek() == Some('.') {
                text.extend(self.bump());
                self.digits(&mut text);
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                let signed = matches!(self.peek_at(1), Some('+' | '-'));
                let digit_at = if signed { 2 } else { 1 };
                if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                    text.extend(self.bump());
                    if signed {
                        text.extend(self.bump());
                    }
                    self.digits(&mut text);
                }
            }
            if matches!(self.peek(), Some('j' | 'J')) {
                text.extend(self.bump());
            }
        }

        self.push(TokenKind::Number(text), pos);
    }

    fn digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
    }

    fn string(&mut self, prefix: &str, pos: Pos) -> Result<StrLit> {
        let raw = prefix.contains('r');
        let bytes = prefix.contains('b');
        let formatted = prefix.contains('f');

        let Some(quote) = self.bump() else {
            bail_syntax!(pos, "unterminated string literal");
        };
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }

        let mut out = String::new();
        let mut named_escape = false;
        loop {
            let Some(c) = self.bump() else {
                if triple {
                    bail_syntax!(pos, "unterminated triple-quoted string literal");
                }
                bail_syntax!(pos, "unterminated string literal");
            };

            match c {
                '\n' if !triple => bail_syntax!(pos, "unterminated string literal"),
                '\\' => {
                    let Some(next) = self.bump() else {
                        bail_syntax!(pos, "unterminated string literal");
                    };
                    if raw {
                        out.push('\\');
                        out.push(next);
                    } else {
                        named_escape |= self.escape(next, bytes, &mut out, pos)?;
                    }
                }
                c if c == quote => {
                    if !triple {
                        break;
                    }
                    if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                        self.bump();
                        self.bump();
                        break;
                    }
                    out.push(c);
                }
                c => {
                    if bytes && !c.is_ascii() {
                        bail_syntax!(pos, "bytes can only contain ASCII literal characters");
                    }
                    out.push(c);
                }
            }
        }

        let value = if bytes {
            let mut buf = Vec::with_capacity(out.len());
            for c in out.chars() {
                match u8::try_from(c as u32) {
                    Ok(b) => buf.push(b),
                    Err(_) => bail_syntax!(pos, "byte value out of range in bytes literal"),
                }
            }
            StrValue::Bytes(buf)
        } else {
            StrValue::Text(out)
        };

        Ok(StrLit {
            value,
            formatted,
            named_escape,
        })
    }

    /// Decode one escape into `out`. Returns true for a `\N{...}` escape,
    /// which is copied through verbatim.
    fn escape(&mut self, c: char, bytes: bool, out: &mut String, pos: Pos) -> Result<bool> {
        match c {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(c),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut value = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            self.bump();
                        }
                        None => break,
                    }
                }
                out.push(self.code_point(value, pos)?);
            }
            'x' => {
                let value = self.hex_digits(2, "\\xXX", pos)?;
                out.push(self.code_point(value, pos)?);
            }
            'u' | 'U' if !bytes => {
                let (width, label) = if c == 'u' {
                    (4, "\\uXXXX")
                } else {
                    (8, "\\UXXXXXXXX")
                };
                let value = self.hex_digits(width, label, pos)?;
                out.push(self.code_point(value, pos)?);
            }
            'N' if !bytes => {
                if self.peek() != Some('{') {
                    bail_syntax!(pos, "malformed \\N character escape");
                }
                self.bump();
                out.push_str("\\N{");
                loop {
                    match self.bump() {
                        Some('}') => break,
                        Some(ch) if ch.is_ascii_alphanumeric() || ch == ' ' || ch == '-' => {
                            out.push(ch)
                        }
                        _ => bail_syntax!(pos, "malformed \\N character escape"),
                    }
                }
                if out.ends_with('{') {
                    bail_syntax!(pos, "malformed \\N character escape");
                }
                out.push('}');
                return Ok(true);
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(false)
    }

    fn hex_digits(&mut self, width: usize, label: &str, pos: Pos) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..width {
            match self.peek().and_then(|d| d.to_digit(16)) {
                Some(d) => {
                    value = value * 16 + d;
                    self.bump();
                }
                None => bail_syntax!(pos, "truncated {} escape", label),
            }
        }
        Ok(value)
    }

    fn code_point(&self, value: u32, pos: Pos) -> Result<char> {
        match char::from_u32(value) {
            Some(c) => Ok(c),
            None => bail_syntax!(pos, "illegal Unicode character U+{:X}", value),
        }
    }
}

fn bracket_op(c: char) -> &'static str {
    match c {
        '(' => "(",
        ')' => ")",
        '[' => "[",
        ']' => "]",
        '{' => "{",
        _ => "}",
    }
}

fn closing_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NbError;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn text(s: &str) -> TokenKind {
        TokenKind::Str(StrLit {
            value: StrValue::Text(s.to_string()),
            formatted: false,
            named_escape: false,
        })
    }

    #[test]
    fn test_simple_assignment() {
        assert_eq!(
            kinds("x = [1, 'a']"),
            vec![
                TokenKind::Name("x".into()),
                TokenKind::Op("="),
                TokenKind::Op("["),
                TokenKind::Number("1".into()),
                TokenKind::Op(","),
                text("a"),
                TokenKind::Op("]"),
                TokenKind::Newline,
                TokenKind::EndMarker,
            ]
        );
    }

    #[test]
    fn test_newlines_inside_brackets_are_joined() {
        let tokens = kinds("x = [\n  1,\n  2,\n]\ny = 3\n");
        let newlines = tokens
            .iter()
            .filter(|k| **k == TokenKind::Newline)
            .count();
        assert_eq!(newlines, 2);
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        assert_eq!(
            kinds("# header\n\n   \nx = 1  # trailing\n"),
            vec![
                TokenKind::Name("x".into()),
                TokenKind::Op("="),
                TokenKind::Number("1".into()),
                TokenKind::Newline,
                TokenKind::EndMarker,
            ]
        );
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = tokenize("a = 1\n  b").unwrap();
        assert_eq!(tokens[0].pos, Pos::new(1, 1));
        assert_eq!(tokens[2].pos, Pos::new(1, 5));
        assert_eq!(tokens[4].pos, Pos::new(2, 3));
    }

    #[test]
    fn test_backslash_continuation() {
        let tokens = kinds("x = 1 + \\\n    2\n");
        assert_eq!(
            tokens.iter().filter(|k| **k == TokenKind::Newline).count(),
            1
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(kinds(r#""a\tb\n\x41é\101""#)[0], text("a\tb\nAéA"));
        assert_eq!(kinds(r"'it\'s'")[0], text("it's"));
        assert_eq!(kinds(r"'\d'")[0], text("\\d"));
    }

    #[test]
    fn test_named_escape_is_kept_verbatim() {
        match &kinds(r"'a \N{EM DASH} b'")[0] {
            TokenKind::Str(lit) => {
                assert!(lit.named_escape);
                assert_eq!(lit.value, StrValue::Text(r"a \N{EM DASH} b".to_string()));
            }
            other => panic!("expected string, got {:?}", other),
        }
        assert!(tokenize(r"'\N'").is_err());
        assert!(tokenize(r"'\N{}'").is_err());
        assert!(tokenize(r"'\N{EM DASH'").is_err());
    }

    #[test]
    fn test_raw_string_keeps_backslashes() {
        assert_eq!(kinds(r"r'\n\d'")[0], text("\\n\\d"));
    }

    #[test]
    fn test_triple_quoted_string() {
        assert_eq!(kinds("'''a\n'b'\nc'''")[0], text("a\n'b'\nc"));
    }

    #[test]
    fn test_bytes_and_fstring_prefixes() {
        assert_eq!(
            kinds(r"b'\x00a'")[0],
            TokenKind::Str(StrLit {
                value: StrValue::Bytes(vec![0, b'a']),
                formatted: false,
                named_escape: false,
            })
        );
        match &kinds("f'{x}'")[0] {
            TokenKind::Str(lit) => assert!(lit.formatted),
            other => panic!("expected string, got {:?}", other),
        }
    }

    #[test]
    fn test_prefix_like_name_is_name() {
        assert_eq!(kinds("rb + 1")[0], TokenKind::Name("rb".into()));
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds("0x1F 1_000 3.5e-2 .5 2j 1.");
        let numbers: Vec<String> = tokens
            .into_iter()
            .filter_map(|k| match k {
                TokenKind::Number(n) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(numbers, vec!["0x1F", "1_000", "3.5e-2", ".5", "2j", "1."]);
    }

    #[test]
    fn test_greedy_operators() {
        assert_eq!(
            kinds("a **= b == c"),
            vec![
                TokenKind::Name("a".into()),
                TokenKind::Op("**="),
                TokenKind::Name("b".into()),
                TokenKind::Op("=="),
                TokenKind::Name("c".into()),
                TokenKind::Newline,
                TokenKind::EndMarker,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_is_syntax_error() {
        let err = tokenize("x = 'abc\ny = 1").unwrap_err();
        assert!(matches!(err, NbError::SourceSyntax { line: 1, column: 5, .. }));
    }

    #[test]
    fn test_unclosed_bracket_is_syntax_error() {
        let err = tokenize("x = [1, 2\n").unwrap_err();
        assert!(err.to_string().contains("'[' was never closed"));
    }

    #[test]
    fn test_mismatched_bracket_is_syntax_error() {
        let err = tokenize("x = [1, 2)").unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_invalid_character() {
        assert!(tokenize("x = 1 $ 2").is_err());
    }
}
