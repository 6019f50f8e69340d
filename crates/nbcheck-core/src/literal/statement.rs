//! Top-level statement scanning
//!
//! A statement is top-level when its logical line starts in the first
//! column; anything indented belongs to a block body and is ignored.

use super::lexer::{Token, TokenKind};

/// Split a token stream into top-level simple statements.
///
/// Logical lines are split on `;` outside brackets. The returned slices never
/// contain `Newline`, `;` or `EndMarker` tokens.
pub fn top_level_statements(tokens: &[Token]) -> Vec<&[Token]> {
    let mut statements = Vec::new();
    let mut line_start = 0;

    for (i, token) in tokens.iter().enumerate() {
        if !matches!(token.kind, TokenKind::Newline | TokenKind::EndMarker) {
            continue;
        }

        let line = &tokens[line_start..i];
        line_start = i + 1;

        let Some(first) = line.first() else {
            continue;
        };
        if first.pos.column != 1 {
            continue;
        }

        statements.extend(split_at_depth_zero(line, ";").into_iter().filter(|s| !s.is_empty()));
    }

    statements
}

/// A plain assignment statement: `t1 = t2 = ... = value`
#[derive(Debug, Clone)]
pub struct Assignment<'a> {
    pub targets: Vec<&'a [Token]>,
    pub value: &'a [Token],
}

impl<'a> Assignment<'a> {
    /// Split a statement at `=` outside brackets; `None` if it is not an assignment
    pub fn parse(statement: &'a [Token]) -> Option<Self> {
        let mut segments = split_at_depth_zero(statement, "=");
        if segments.len() < 2 {
            return None;
        }
        let value = segments.pop()?;
        Some(Self {
            targets: segments,
            value,
        })
    }

    /// True if one of the targets is exactly the given name
    pub fn targets_name(&self, name: &str) -> bool {
        self.targets
            .iter()
            .any(|target| is_single_name(strip_parens(target), name))
    }
}

fn is_single_name(tokens: &[Token], name: &str) -> bool {
    matches!(tokens, [token] if token.is_name(name))
}

/// Remove redundant parentheses wrapping a whole target, e.g. `(x)`
fn strip_parens(mut tokens: &[Token]) -> &[Token] {
    while tokens.len() >= 2
        && tokens[0].is_op("(")
        && tokens[tokens.len() - 1].is_op(")")
        && closing_index(tokens) == Some(tokens.len() - 1)
    {
        tokens = &tokens[1..tokens.len() - 1];
    }
    tokens
}

fn closing_index(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        if is_opener(token) {
            depth += 1;
        } else if is_closer(token) {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

fn split_at_depth_zero<'a>(tokens: &'a [Token], op: &str) -> Vec<&'a [Token]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, token) in tokens.iter().enumerate() {
        if is_opener(token) {
            depth += 1;
        } else if is_closer(token) {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token.is_op(op) {
            parts.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    parts.push(&tokens[start..]);
    parts
}

fn is_opener(token: &Token) -> bool {
    token.is_op("(") || token.is_op("[") || token.is_op("{")
}

fn is_closer(token: &Token) -> bool {
    token.is_op(")") || token.is_op("]") || token.is_op("}")
}
