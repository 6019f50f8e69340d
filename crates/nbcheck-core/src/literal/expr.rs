//! Expression syntax tree and parser
//!
//! The parser accepts more than literals: names, attribute access, calls,
//! subscripts and arithmetic are parsed into nodes so the evaluator can
//! reject them by kind. Constructs outside this subset (lambda,
//! comprehensions, boolean and conditional expressions) are reported as
//! non-literal syntax.

use num_bigint::BigInt;

use super::lexer::{Pos, StrLit, Token, TokenKind};
use crate::bail_literal;
use crate::error::{NbError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    None,
    Bool(bool),
    Ellipsis,
    Int(BigInt),
    Float(f64),
    Imaginary(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DictEntry {
    Pair(Expr, Expr),
    /// `**mapping`
    Unpack(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Constant(Constant),
    /// Adjacent string literals, concatenated on evaluation
    Str(Vec<StrLit>),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Set(Vec<Expr>),
    Dict(Vec<DictEntry>),
    Starred(Box<Expr>),
    Name(String),
    Attribute(Box<Expr>, String),
    Call(Box<Expr>, Vec<Expr>),
    Subscript(Box<Expr>, Box<Expr>),
    Slice(Vec<Option<Expr>>),
    Unary(UnaryOp, Box<Expr>),
    Binary(Box<Expr>, BinOp, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Pos,
}

impl Expr {
    fn new(kind: ExprKind, pos: Pos) -> Self {
        Self { kind, pos }
    }
}

/// Keywords that cannot start or continue a supported expression
const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

/// Binary operator precedence levels, loosest first
const BINARY_LEVELS: &[&[(&str, BinOp)]] = &[
    &[("|", BinOp::BitOr)],
    &[("^", BinOp::BitXor)],
    &[("&", BinOp::BitAnd)],
    &[("<<", BinOp::LShift), (">>", BinOp::RShift)],
    &[("+", BinOp::Add), ("-", BinOp::Sub)],
    &[
        ("*", BinOp::Mult),
        ("@", BinOp::MatMult),
        ("/", BinOp::Div),
        ("//", BinOp::FloorDiv),
        ("%", BinOp::Mod),
    ],
];

/// Parse the right-hand side of an assignment.
///
/// A bare comma-separated list (`a = 1, 2`) parses as a tuple, matching the
/// assignment grammar.
pub fn parse_value(tokens: &[Token]) -> Result<Expr> {
    let mut parser = Parser { tokens, idx: 0 };
    let Some(first) = tokens.first() else {
        return Err(NbError::syntax(0, 0, "expected an expression"));
    };
    let start = first.pos;

    let expr = parser.expr_list(start)?;
    if let Some(token) = parser.peek() {
        bail_literal!(token.pos, "unsupported syntax near {}", token.describe());
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    idx: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.idx)
    }

    fn peek_op(&self, op: &str) -> bool {
        self.peek().is_some_and(|t| t.is_op(op))
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if self.peek_op(op) {
            self.idx += 1;
            true
        } else {
            false
        }
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.idx)?;
        self.idx += 1;
        Some(token)
    }

    fn end_pos(&self) -> Pos {
        self.tokens.last().map(|t| t.pos).unwrap_or(Pos::new(0, 0))
    }

    fn expect_op(&mut self, op: &str) -> Result<()> {
        if self.eat_op(op) {
            return Ok(());
        }
        match self.peek() {
            Some(token) => bail_literal!(
                token.pos,
                "unsupported syntax near {} (expected '{}')",
                token.describe(),
                op
            ),
            None => bail_literal!(self.end_pos(), "unexpected end of expression"),
        }
    }

    /// `expr (',' expr)* [',']`; more than one element (or a trailing comma) is a tuple
    fn expr_list(&mut self, start: Pos) -> Result<Expr> {
        let first = self.item()?;
        if !self.peek_op(",") {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.eat_op(",") {
            if self.at_list_end() {
                break;
            }
            items.push(self.item()?);
        }
        Ok(Expr::new(ExprKind::Tuple(items), start))
    }

    fn at_list_end(&self) -> bool {
        match self.peek() {
            None => true,
            Some(token) => [")", "]", "}", ":"].iter().any(|op| token.is_op(op)),
        }
    }

    /// A container element: an expression or `*expr`
    fn item(&mut self) -> Result<Expr> {
        if let Some(token) = self.peek() {
            if token.is_op("*") {
                self.idx += 1;
                let inner = self.expr()?;
                return Ok(Expr::new(ExprKind::Starred(Box::new(inner)), token.pos));
            }
        }
        self.expr()
    }

    fn expr(&mut self) -> Result<Expr> {
        self.binary(0)
    }

    fn binary(&mut self, level: usize) -> Result<Expr> {
        let Some(ops) = BINARY_LEVELS.get(level) else {
            return self.unary();
        };

        let mut left = self.binary(level + 1)?;
        loop {
            let matched = self
                .peek()
                .and_then(|t| ops.iter().find(|(sym, _)| t.is_op(sym)));
            let Some(&(_, op)) = matched else {
                break;
            };
            self.idx += 1;
            let right = self.binary(level + 1)?;
            let pos = left.pos;
            left = Expr::new(ExprKind::Binary(Box::new(left), op, Box::new(right)), pos);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr> {
        let Some(token) = self.peek() else {
            bail_literal!(self.end_pos(), "unexpected end of expression");
        };
        let op = match &token.kind {
            TokenKind::Op("+") => UnaryOp::Plus,
            TokenKind::Op("-") => UnaryOp::Minus,
            TokenKind::Op("~") => UnaryOp::Invert,
            _ => return self.power(),
        };
        self.idx += 1;
        let operand = self.unary()?;
        Ok(Expr::new(ExprKind::Unary(op, Box::new(operand)), token.pos))
    }

    fn power(&mut self) -> Result<Expr> {
        let base = self.postfix()?;
        if self.eat_op("**") {
            let exponent = self.unary()?;
            let pos = base.pos;
            return Ok(Expr::new(
                ExprKind::Binary(Box::new(base), BinOp::Pow, Box::new(exponent)),
                pos,
            ));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.atom()?;
        loop {
            if self.eat_op("(") {
                let args = self.call_args()?;
                let pos = expr.pos;
                expr = Expr::new(ExprKind::Call(Box::new(expr), args), pos);
            } else if self.eat_op(".") {
                let attr = match self.next() {
                    Some(Token {
                        kind: TokenKind::Name(name),
                        ..
                    }) => name.clone(),
                    Some(token) => {
                        bail_literal!(token.pos, "unsupported syntax near {}", token.describe())
                    }
                    None => bail_literal!(self.end_pos(), "unexpected end of expression"),
                };
                let pos = expr.pos;
                expr = Expr::new(ExprKind::Attribute(Box::new(expr), attr), pos);
            } else if self.peek_op("[") {
                let open = self.peek().map(|t| t.pos).unwrap_or(expr.pos);
                self.idx += 1;
                let index = self.subscript(open)?;
                let pos = expr.pos;
                expr = Expr::new(ExprKind::Subscript(Box::new(expr), Box::new(index)), pos);
            } else {
                return Ok(expr);
            }
        }
    }

    fn call_args(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        while !self.eat_op(")") {
            if self.eat_op("**") {
                args.push(self.expr()?);
            } else if matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Name(_)))
                && self.tokens.get(self.idx + 1).is_some_and(|t| t.is_op("="))
            {
                // keyword argument: keep only the value
                self.idx += 2;
                args.push(self.expr()?);
            } else {
                args.push(self.item()?);
            }
            if !self.eat_op(",") {
                self.expect_op(")")?;
                break;
            }
        }
        Ok(args)
    }

    fn subscript(&mut self, open: Pos) -> Result<Expr> {
        let mut parts = Vec::new();
        let mut current = None;
        let mut sliced = false;
        loop {
            if self.eat_op("]") {
                break;
            }
            if self.eat_op(":") {
                parts.push(current.take());
                sliced = true;
                continue;
            }
            if current.is_some() {
                self.expect_op("]")?;
                break;
            }
            current = Some(self.expr_list(open)?);
        }

        if !sliced {
            return match current {
                Some(index) => Ok(index),
                None => bail_literal!(open, "empty subscript"),
            };
        }
        parts.push(current);
        Ok(Expr::new(ExprKind::Slice(parts), open))
    }

    fn atom(&mut self) -> Result<Expr> {
        let Some(token) = self.next() else {
            bail_literal!(self.end_pos(), "unexpected end of expression");
        };
        let pos = token.pos;

        match &token.kind {
            TokenKind::Name(name) => match name.as_str() {
                "None" => Ok(Expr::new(ExprKind::Constant(Constant::None), pos)),
                "True" => Ok(Expr::new(ExprKind::Constant(Constant::Bool(true)), pos)),
                "False" => Ok(Expr::new(ExprKind::Constant(Constant::Bool(false)), pos)),
                kw if KEYWORDS.contains(&kw) => {
                    bail_literal!(pos, "unsupported syntax near '{}'", kw)
                }
                _ => Ok(Expr::new(ExprKind::Name(name.clone()), pos)),
            },
            TokenKind::Number(raw) => Ok(Expr::new(
                ExprKind::Constant(parse_number(raw, pos)?),
                pos,
            )),
            TokenKind::Str(first) => {
                let mut parts = vec![first.clone()];
                while let Some(Token {
                    kind: TokenKind::Str(next),
                    ..
                }) = self.peek()
                {
                    if std::mem::discriminant(&next.value) != std::mem::discriminant(&first.value)
                    {
                        return Err(NbError::syntax(
                            pos.line,
                            pos.column,
                            "cannot mix bytes and nonbytes literals",
                        ));
                    }
                    parts.push(next.clone());
                    self.idx += 1;
                }
                Ok(Expr::new(ExprKind::Str(parts), pos))
            }
            TokenKind::Op("...") => Ok(Expr::new(ExprKind::Constant(Constant::Ellipsis), pos)),
            TokenKind::Op("(") => self.parenthesized(pos),
            TokenKind::Op("[") => {
                let items = self.sequence("]")?;
                Ok(Expr::new(ExprKind::List(items), pos))
            }
            TokenKind::Op("{") => self.braced(pos),
            _ => bail_literal!(pos, "unsupported syntax near {}", token.describe()),
        }
    }

    fn parenthesized(&mut self, pos: Pos) -> Result<Expr> {
        if self.eat_op(")") {
            return Ok(Expr::new(ExprKind::Tuple(Vec::new()), pos));
        }
        let inner = self.expr_list(pos)?;
        self.expect_op(")")?;
        match inner.kind {
            // `(x)` is just x; `(x,)` keeps the paren position
            ExprKind::Tuple(items) => Ok(Expr::new(ExprKind::Tuple(items), pos)),
            _ => Ok(inner),
        }
    }

    /// Comma-separated items up to `close`, trailing comma allowed
    fn sequence(&mut self, close: &str) -> Result<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.eat_op(close) {
            items.push(self.item()?);
            if !self.eat_op(",") {
                self.expect_op(close)?;
                break;
            }
        }
        Ok(items)
    }

    fn braced(&mut self, pos: Pos) -> Result<Expr> {
        if self.eat_op("}") {
            return Ok(Expr::new(ExprKind::Dict(Vec::new()), pos));
        }

        let first_is_pair = self.peek_op("**") || {
            let save = self.idx;
            let is_pair = match self.peek() {
                Some(t) if t.is_op("*") => false,
                _ => {
                    self.expr()?;
                    self.peek_op(":")
                }
            };
            self.idx = save;
            is_pair
        };

        if !first_is_pair {
            let items = self.sequence("}")?;
            return Ok(Expr::new(ExprKind::Set(items), pos));
        }

        let mut entries = Vec::new();
        while !self.eat_op("}") {
            if self.eat_op("**") {
                entries.push(DictEntry::Unpack(self.expr()?));
            } else {
                let key = self.expr()?;
                self.expect_op(":")?;
                let value = self.expr()?;
                entries.push(DictEntry::Pair(key, value));
            }
            if !self.eat_op(",") {
                self.expect_op("}")?;
                break;
            }
        }
        Ok(Expr::new(ExprKind::Dict(entries), pos))
    }
}

/// Decode a numeric token
fn parse_number(raw: &str, pos: Pos) -> Result<Constant> {
    let text: String = raw
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();

    let invalid = || NbError::syntax(pos.line, pos.column, format!("invalid number literal '{}'", raw));

    if let Some(imag) = text.strip_suffix('j') {
        return imag
            .parse::<f64>()
            .map(Constant::Imaginary)
            .map_err(|_| invalid());
    }

    let radix = match text.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_int(&text[2..], radix, raw, pos);
    }

    if text.contains(['.', 'e']) {
        return text.parse::<f64>().map(Constant::Float).map_err(|_| invalid());
    }

    parse_int(&text, 10, raw, pos)
}

fn parse_int(digits: &str, radix: u32, raw: &str, pos: Pos) -> Result<Constant> {
    match BigInt::parse_bytes(digits.as_bytes(), radix) {
        Some(value) => Ok(Constant::Int(value)),
        None => Err(NbError::syntax(
            pos.line,
            pos.column,
            format!("invalid number literal '{}'", raw),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::lexer::{tokenize, StrValue};

    fn parse(source: &str) -> Result<Expr> {
        let tokens = tokenize(source)?;
        let body: Vec<Token> = tokens
            .into_iter()
            .filter(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::EndMarker))
            .collect();
        parse_value(&body)
    }

    fn kind(source: &str) -> ExprKind {
        parse(source).unwrap().kind
    }

    fn int(value: i64) -> ExprKind {
        ExprKind::Constant(Constant::Int(BigInt::from(value)))
    }

    fn strip(expr: &Expr) -> ExprKind {
        expr.kind.clone()
    }

    #[test]
    fn test_constants() {
        assert_eq!(kind("None"), ExprKind::Constant(Constant::None));
        assert_eq!(kind("True"), ExprKind::Constant(Constant::Bool(true)));
        assert_eq!(kind("0x1f"), int(31));
        assert_eq!(kind("0b101"), int(5));
        assert_eq!(kind("1_000"), int(1000));
        assert_eq!(kind("2.5e1"), ExprKind::Constant(Constant::Float(25.0)));
        assert_eq!(kind("3j"), ExprKind::Constant(Constant::Imaginary(3.0)));
        assert_eq!(kind("..."), ExprKind::Constant(Constant::Ellipsis));
    }

    #[test]
    fn test_adjacent_strings() {
        match kind("'a' \"b\"") {
            ExprKind::Str(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[1].value, StrValue::Text("b".into()));
            }
            other => panic!("expected string, got {:?}", other),
        }
    }

    #[test]
    fn test_mixed_bytes_and_text_is_syntax_error() {
        assert!(matches!(
            parse("b'a' 'b'"),
            Err(NbError::SourceSyntax { .. })
        ));
    }

    #[test]
    fn test_containers() {
        match kind("[1, (2,), {3}, {'k': 4}, (), {}]") {
            ExprKind::List(items) => {
                assert_eq!(strip(&items[0]), int(1));
                assert!(matches!(&items[1].kind, ExprKind::Tuple(t) if t.len() == 1));
                assert!(matches!(&items[2].kind, ExprKind::Set(s) if s.len() == 1));
                assert!(matches!(&items[3].kind, ExprKind::Dict(d) if d.len() == 1));
                assert!(matches!(&items[4].kind, ExprKind::Tuple(t) if t.is_empty()));
                assert!(matches!(&items[5].kind, ExprKind::Dict(d) if d.is_empty()));
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_commas() {
        assert!(matches!(kind("[1, 2,]"), ExprKind::List(items) if items.len() == 2));
        assert!(matches!(kind("{'a': 1,}"), ExprKind::Dict(items) if items.len() == 1));
    }

    #[test]
    fn test_bare_tuple() {
        assert!(matches!(kind("1, 2"), ExprKind::Tuple(items) if items.len() == 2));
        assert!(matches!(kind("1,"), ExprKind::Tuple(items) if items.len() == 1));
    }

    #[test]
    fn test_parenthesized_expression_is_not_tuple() {
        assert_eq!(kind("(7)"), int(7));
    }

    #[test]
    fn test_calls_and_attributes() {
        match kind("os.system('x')") {
            ExprKind::Call(func, args) => {
                assert!(matches!(func.kind, ExprKind::Attribute(_, ref a) if a == "system"));
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected call, got {:?}", other),
        }
        assert!(matches!(kind("f(a, b=2, *c, **d)"), ExprKind::Call(_, args) if args.len() == 4));
    }

    #[test]
    fn test_subscript_and_slice() {
        assert!(matches!(kind("a[0]"), ExprKind::Subscript(..)));
        match kind("a[1:2]") {
            ExprKind::Subscript(_, index) => {
                assert!(matches!(index.kind, ExprKind::Slice(ref parts) if parts.len() == 2))
            }
            other => panic!("expected subscript, got {:?}", other),
        }
    }

    #[test]
    fn test_operator_precedence() {
        match kind("1 + 2 * 3") {
            ExprKind::Binary(left, BinOp::Add, right) => {
                assert_eq!(left.kind, int(1));
                assert!(matches!(right.kind, ExprKind::Binary(_, BinOp::Mult, _)));
            }
            other => panic!("unexpected {:?}", other),
        }
        // unary minus binds looser than **
        assert!(matches!(kind("-2 ** 2"), ExprKind::Unary(UnaryOp::Minus, _)));
    }

    #[test]
    fn test_starred_and_unpack() {
        assert!(matches!(kind("[*a]"), ExprKind::List(items) if matches!(items[0].kind, ExprKind::Starred(_))));
        assert!(matches!(kind("{**a}"), ExprKind::Dict(items) if matches!(items[0], DictEntry::Unpack(_))));
    }

    #[test]
    fn test_unsupported_constructs_are_literal_errors() {
        for source in [
            "[x for x in y]",
            "lambda: 1",
            "a if b else c",
            "not a",
            "a and b",
            "a < b",
        ] {
            assert!(
                matches!(parse(source), Err(NbError::UnsafeLiteral { .. })),
                "{} should be rejected",
                source
            );
        }
    }

    #[test]
    fn test_integers_beyond_64_bits() {
        let big: BigInt = "99999999999999999999".parse().unwrap();
        assert_eq!(kind("99999999999999999999"), ExprKind::Constant(Constant::Int(big)));
        assert!(matches!(parse("0x"), Err(NbError::SourceSyntax { .. })));
    }
}
