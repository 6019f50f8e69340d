//! Literal-only evaluation
//!
//! Accepts constants, strings, and list/tuple/set/dict displays built from
//! them, plus signed numbers and `real +/- imaginary` complex literals.
//! Every other node is rejected; nothing is ever looked up or called.

use num_traits::ToPrimitive;

use super::expr::{BinOp, Constant, DictEntry, Expr, ExprKind, UnaryOp};
use super::lexer::{StrLit, StrValue};
use super::value::Value;
use crate::bail_literal;
use crate::bail_syntax;
use crate::error::Result;

/// Evaluate an expression that must consist only of literals
pub fn literal_eval(expr: &Expr) -> Result<Value> {
    match &expr.kind {
        ExprKind::Constant(constant) => constant_value(constant, expr),
        ExprKind::Str(parts) => concat_strings(parts, expr),
        ExprKind::List(items) => Ok(Value::List(eval_items(items)?)),
        ExprKind::Tuple(items) => Ok(Value::Tuple(eval_items(items)?)),
        ExprKind::Set(items) => {
            let mut members: Vec<Value> = Vec::with_capacity(items.len());
            for (item, value) in items.iter().zip(eval_items(items)?) {
                require_hashable(&value, item)?;
                if !members.iter().any(|m| m.key_eq(&value)) {
                    members.push(value);
                }
            }
            Ok(Value::Set(members))
        }
        ExprKind::Dict(entries) => {
            let mut pairs: Vec<(Value, Value)> = Vec::with_capacity(entries.len());
            for entry in entries {
                let (key_expr, value_expr) = match entry {
                    DictEntry::Pair(k, v) => (k, v),
                    DictEntry::Unpack(inner) => {
                        bail_literal!(inner.pos, "dict unpacking (**) is not a literal")
                    }
                };
                let key = literal_eval(key_expr)?;
                require_hashable(&key, key_expr)?;
                let value = literal_eval(value_expr)?;
                match pairs.iter_mut().find(|(k, _)| k.key_eq(&key)) {
                    Some(existing) => existing.1 = value,
                    None => pairs.push((key, value)),
                }
            }
            Ok(Value::Dict(pairs))
        }
        ExprKind::Unary(UnaryOp::Plus | UnaryOp::Minus, _) => signed_number(expr),
        ExprKind::Binary(left, op @ (BinOp::Add | BinOp::Sub), right) => {
            let real = signed_number(left)?;
            let imag = match &right.kind {
                ExprKind::Constant(Constant::Imaginary(im)) => *im,
                _ => bail_literal!(right.pos, "{} is not a literal", describe(right)),
            };
            let re = match real {
                Value::Int(i) => match i.to_f64() {
                    Some(f) if f.is_finite() => f,
                    _ => bail_literal!(left.pos, "int too large to convert to float"),
                },
                Value::Float(f) => f,
                _ => bail_literal!(left.pos, "complex literal needs a real left operand"),
            };
            let im = if *op == BinOp::Add { imag } else { -imag };
            Ok(Value::Complex { re, im })
        }
        _ => bail_literal!(expr.pos, "{} is not a literal", describe(expr)),
    }
}

fn constant_value(constant: &Constant, expr: &Expr) -> Result<Value> {
    Ok(match constant {
        Constant::None => Value::None,
        Constant::Bool(b) => Value::Bool(*b),
        Constant::Int(i) => Value::Int(i.clone()),
        Constant::Float(f) => Value::Float(*f),
        Constant::Imaginary(im) => Value::Complex { re: 0.0, im: *im },
        Constant::Ellipsis => bail_literal!(expr.pos, "Ellipsis has no literal value here"),
    })
}

fn eval_items(items: &[Expr]) -> Result<Vec<Value>> {
    items.iter().map(literal_eval).collect()
}

fn require_hashable(value: &Value, expr: &Expr) -> Result<()> {
    if !value.is_hashable() {
        bail_literal!(expr.pos, "unhashable type: '{}'", value.type_name());
    }
    Ok(())
}

fn concat_strings(parts: &[StrLit], expr: &Expr) -> Result<Value> {
    if parts.iter().any(|p| p.formatted) {
        bail_literal!(expr.pos, "f-string is not a literal");
    }
    if parts.iter().any(|p| p.named_escape) {
        bail_syntax!(expr.pos, "named unicode escapes are not supported");
    }

    match parts.first().map(|p| &p.value) {
        Some(StrValue::Bytes(_)) => {
            let mut out = Vec::new();
            for part in parts {
                if let StrValue::Bytes(bytes) = &part.value {
                    out.extend_from_slice(bytes);
                }
            }
            Ok(Value::Bytes(out))
        }
        _ => {
            let mut out = String::new();
            for part in parts {
                if let StrValue::Text(text) = &part.value {
                    out.push_str(text);
                }
            }
            Ok(Value::Str(out))
        }
    }
}

/// A number constant, optionally with a single leading `+` or `-`
fn signed_number(expr: &Expr) -> Result<Value> {
    match &expr.kind {
        ExprKind::Unary(op @ (UnaryOp::Plus | UnaryOp::Minus), operand) => {
            let value = plain_number(operand)?;
            if *op == UnaryOp::Plus {
                return Ok(value);
            }
            Ok(match value {
                Value::Int(i) => Value::Int(-i),
                Value::Float(f) => Value::Float(-f),
                Value::Complex { re, im } => Value::Complex { re: -re, im: -im },
                other => other,
            })
        }
        _ => plain_number(expr),
    }
}

fn plain_number(expr: &Expr) -> Result<Value> {
    match &expr.kind {
        ExprKind::Constant(
            c @ (Constant::Int(_) | Constant::Float(_) | Constant::Imaginary(_)),
        ) => constant_value(c, expr),
        _ => bail_literal!(expr.pos, "{} is not a literal", describe(expr)),
    }
}

/// Human description of a non-literal node
fn describe(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Name(name) => format!("name reference '{}'", name),
        ExprKind::Attribute(_, attr) => format!("attribute access '.{}'", attr),
        ExprKind::Call(func, _) => match &func.kind {
            ExprKind::Name(name) => format!("function call '{}()'", name),
            ExprKind::Attribute(_, attr) => format!("function call '.{}()'", attr),
            _ => "function call".to_string(),
        },
        ExprKind::Subscript(..) => "subscript".to_string(),
        ExprKind::Slice(_) => "slice".to_string(),
        ExprKind::Starred(_) => "starred expression".to_string(),
        ExprKind::Unary(UnaryOp::Invert, _) => "operator '~'".to_string(),
        ExprKind::Unary(..) => "nested sign".to_string(),
        ExprKind::Binary(..) => "arithmetic expression".to_string(),
        ExprKind::Constant(Constant::Bool(_)) => "bool operand".to_string(),
        ExprKind::Constant(Constant::None) => "None operand".to_string(),
        ExprKind::Constant(_) => "constant".to_string(),
        ExprKind::Str(_) => "string operand".to_string(),
        ExprKind::List(_) | ExprKind::Tuple(_) | ExprKind::Set(_) | ExprKind::Dict(_) => {
            "container operand".to_string()
        }
    }
}
