//! Safe extraction of literal assignments from Python source
//!
//! Cell text is tokenized, split into top-level statements, and the
//! right-hand side of a matching `name = <literal>` assignment is parsed and
//! evaluated with a literal-only evaluator. No code is ever executed.

pub mod eval;
pub mod expr;
pub mod lexer;
pub mod statement;
pub mod value;

pub use eval::literal_eval;
pub use value::Value;

use crate::error::{NbError, Result};
use lexer::tokenize;
use statement::{top_level_statements, Assignment};

/// Evaluate the value assigned to `name` at the top level of `source`.
///
/// Every matching assignment is evaluated in order and the last one wins,
/// so a later rebinding overrides an earlier one. Returns `Ok(None)` when no
/// top-level assignment targets `name`.
pub fn extract_assignment(source: &str, name: &str) -> Result<Option<Value>> {
    let tokens = tokenize(source)?;
    let mut found = None;

    for stmt in top_level_statements(&tokens) {
        let Some(assignment) = Assignment::parse(stmt) else {
            continue;
        };
        if !assignment.targets_name(name) {
            continue;
        }

        let Some(first) = assignment.value.first() else {
            let eq = stmt.last().map(|t| t.pos).unwrap_or(lexer::Pos::new(0, 0));
            return Err(NbError::syntax(eq.line, eq.column, "expected an expression after '='"));
        };
        tracing::trace!(line = first.pos.line, variable = name, "assignment_found");

        let expr = expr::parse_value(assignment.value)?;
        found = Some(literal_eval(&expr)?);
    }

    Ok(found)
}

/// True if `source` contains a top-level plain assignment to `name`
pub fn has_assignment(source: &str, name: &str) -> Result<bool> {
    let tokens = tokenize(source)?;
    Ok(top_level_statements(&tokens)
        .into_iter()
        .filter_map(Assignment::parse)
        .any(|a| a.targets_name(name)))
}
