//! Values produced by literal evaluation

use std::fmt;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number};

/// A literal value: the result of evaluating a constant expression
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    /// Arbitrary precision, like Python's `int`
    Int(BigInt),
    Float(f64),
    Complex { re: f64, im: f64 },
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Set(Vec<Value>),
    /// Insertion-ordered entries with unique keys
    Dict(Vec<(Value, Value)>),
}

impl Value {
    /// Python type name, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Complex { .. } => "complex",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Set(_) => "set",
            Value::Dict(_) => "dict",
        }
    }

    /// Whether the value may be used as a dict key or set member
    pub fn is_hashable(&self) -> bool {
        match self {
            Value::List(_) | Value::Set(_) | Value::Dict(_) => false,
            Value::Tuple(items) => items.iter().all(Value::is_hashable),
            _ => true,
        }
    }

    /// Key equality: `True`, `1` and `1.0` are the same key.
    ///
    /// Integral operands compare exactly, so `2**53 + 1` and `2**53` stay
    /// distinct keys.
    pub fn key_eq(&self, other: &Value) -> bool {
        match (self.as_real(), other.as_real()) {
            (Some(a), Some(b)) => match (self.as_exact_int(), other.as_exact_int()) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            },
            _ => match (self, other) {
                (Value::Tuple(a), Value::Tuple(b)) => {
                    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.key_eq(y))
                }
                _ => self == other,
            },
        }
    }

    fn as_real(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => i.to_f64().filter(|f| f.is_finite()),
            Value::Float(f) => Some(*f),
            Value::Complex { re, im } if *im == 0.0 => Some(*re),
            _ => None,
        }
    }

    fn as_exact_int(&self) -> Option<BigInt> {
        match self {
            Value::Bool(b) => Some(BigInt::from(u8::from(*b))),
            Value::Int(i) => Some(i.clone()),
            Value::Float(f) if f.fract() == 0.0 => BigInt::from_f64(*f),
            Value::Complex { re, im } if *im == 0.0 && re.fract() == 0.0 => BigInt::from_f64(*re),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a string key in a dict value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dict()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Text for display: strings unquoted, everything else as its repr
    pub fn display_text(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Convert to JSON for machine-readable output.
    ///
    /// Tuples and sets become arrays and bytes become arrays of numbers.
    /// Complex numbers, non-finite floats and integers outside the 64-bit
    /// range become their repr. Non-string dict keys use their repr.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::None => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => match (i.to_i64(), i.to_u64()) {
                (Some(n), _) => serde_json::Value::Number(n.into()),
                (None, Some(n)) => serde_json::Value::Number(n.into()),
                (None, None) => serde_json::Value::String(i.to_string()),
            },
            Value::Float(f) => match Number::from_f64(*f) {
                Some(n) => serde_json::Value::Number(n),
                None => serde_json::Value::String(self.to_string()),
            },
            Value::Complex { .. } => serde_json::Value::String(self.to_string()),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(bytes) => {
                serde_json::Value::Array(bytes.iter().map(|b| (*b).into()).collect())
            }
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Dict(entries) => {
                let mut map = Map::new();
                for (k, v) in entries {
                    map.insert(k.display_text(), v.to_json());
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Python-style repr
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write_float(f, *x),
            Value::Complex { re, im } => {
                if *re == 0.0 {
                    write_imag(f, *im)
                } else {
                    write!(f, "(")?;
                    write_float(f, *re)?;
                    if *im >= 0.0 {
                        write!(f, "+")?;
                    }
                    write_imag(f, *im)?;
                    write!(f, ")")
                }
            }
            Value::Str(s) => write_str_repr(f, s),
            Value::Bytes(bytes) => {
                write!(f, "b'")?;
                for b in bytes {
                    match b {
                        b'\\' => write!(f, "\\\\")?,
                        b'\'' => write!(f, "\\'")?,
                        b'\n' => write!(f, "\\n")?,
                        b'\t' => write!(f, "\\t")?,
                        b'\r' => write!(f, "\\r")?,
                        0x20..=0x7e => write!(f, "{}", *b as char)?,
                        _ => write!(f, "\\x{:02x}", b)?,
                    }
                }
                write!(f, "'")
            }
            Value::List(items) => write_seq(f, "[", items, "]"),
            Value::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0]),
            Value::Tuple(items) => write_seq(f, "(", items, ")"),
            Value::Set(items) if items.is_empty() => write!(f, "set()"),
            Value::Set(items) => write_seq(f, "{", items, "}"),
            Value::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        write!(f, "nan")
    } else if x.is_infinite() {
        write!(f, "{}", if x > 0.0 { "inf" } else { "-inf" })
    } else {
        write!(f, "{:?}", x)
    }
}

fn write_imag(f: &mut fmt::Formatter<'_>, im: f64) -> fmt::Result {
    if im.fract() == 0.0 && im.abs() < 1e16 {
        write!(f, "{}j", im as i64)
    } else {
        write_float(f, im)?;
        write!(f, "j")
    }
}

fn write_str_repr(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    write!(f, "{}", quote)?;
    for c in s.chars() {
        match c {
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            c if c == quote => write!(f, "\\{}", c)?,
            c if c.is_control() => write!(f, "\\x{:02x}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "{}", quote)
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}
