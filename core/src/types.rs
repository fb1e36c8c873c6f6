//! Primitive types shared by the schema model and the parsing engine.
//!
//! [`ParseMode`] decides what a command's children are, [`NArgs`] describes
//! how many argument tokens an option or operand consumes, [`Value`] is the
//! typed value that flows through conversion, reducers, and the result
//! [`Namespace`], and [`Converter`] turns raw tokens into values.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Namespace;

/// What the non-option children of a command are.
///
/// # Examples
///
/// ```
/// use argkit_core::ParseMode;
///
/// assert_eq!(ParseMode::default(), ParseMode::Command);
/// assert_eq!(ParseMode::Operand.to_string(), "OPERAND");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Non-option tokens name subcommands (the default).
    #[default]
    Command,
    /// Non-option tokens fill positional operands.
    Operand,
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => f.write_str("COMMAND"),
            Self::Operand => f.write_str("OPERAND"),
        }
    }
}

/// Arity of an option or operand.
///
/// Serializes as an integer for [`NArgs::Exact`] and as `"?"`, `"*"`, or
/// `"+"` for the symbolic kinds.
///
/// # Examples
///
/// ```
/// use argkit_core::NArgs;
///
/// assert!(NArgs::Exact(2).is_satisfied(2));
/// assert!(!NArgs::Exact(2).is_satisfied(1));
/// assert!(!NArgs::OneOrMore.is_satisfied(0));
/// assert!(NArgs::ZeroOrMore.is_satisfied(0));
/// assert_eq!("+".parse::<NArgs>(), Ok(NArgs::OneOrMore));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "NArgsRepr", into = "NArgsRepr")]
pub enum NArgs {
    /// Exactly this many arguments.
    Exact(usize),
    /// Zero or one argument (`?`).
    Optional,
    /// Any number of arguments (`*`).
    ZeroOrMore,
    /// At least one argument (`+`).
    OneOrMore,
}

impl NArgs {
    /// Returns `true` for the symbolic kinds (`?`, `*`, `+`).
    pub fn is_symbolic(self) -> bool {
        !matches!(self, Self::Exact(_))
    }

    /// Returns `true` if `count` consumed arguments satisfy this arity.
    pub fn is_satisfied(self, count: usize) -> bool {
        match self {
            Self::Exact(n) => count >= n,
            Self::OneOrMore => count >= 1,
            Self::Optional | Self::ZeroOrMore => true,
        }
    }
}

impl fmt::Display for NArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Optional => f.write_str("?"),
            Self::ZeroOrMore => f.write_str("*"),
            Self::OneOrMore => f.write_str("+"),
        }
    }
}

/// Error returned when a string is not a valid [`NArgs`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid nargs value: {0:?} (expected an integer, \"?\", \"*\" or \"+\")")]
pub struct InvalidNArgs(pub String);

impl FromStr for NArgs {
    type Err = InvalidNArgs;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "?" => Ok(Self::Optional),
            "*" => Ok(Self::ZeroOrMore),
            "+" => Ok(Self::OneOrMore),
            other => other
                .parse::<usize>()
                .map(Self::Exact)
                .map_err(|_| InvalidNArgs(s.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum NArgsRepr {
    Count(usize),
    Symbol(String),
}

impl TryFrom<NArgsRepr> for NArgs {
    type Error = InvalidNArgs;

    fn try_from(repr: NArgsRepr) -> Result<Self, Self::Error> {
        match repr {
            NArgsRepr::Count(n) => Ok(Self::Exact(n)),
            NArgsRepr::Symbol(symbol) => symbol.parse(),
        }
    }
}

impl From<NArgs> for NArgsRepr {
    fn from(nargs: NArgs) -> Self {
        match nargs {
            NArgs::Exact(n) => Self::Count(n),
            symbolic => Self::Symbol(symbolic.to_string()),
        }
    }
}

/// A parsed, typed value.
///
/// Serialized untagged, so a namespace renders as plain JSON/YAML
/// (`Value::None` becomes `null`).
///
/// # Examples
///
/// ```
/// use argkit_core::Value;
///
/// let value = Value::from(vec![Value::from("a"), Value::from(3)]);
/// assert_eq!(value.to_string(), "[a, 3]");
/// assert_eq!(Value::from(true).as_bool(), Some(true));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value.
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// Nested result of a subcommand.
    Namespace(Namespace),
}

impl Value {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&Namespace> {
        match self {
            Self::Namespace(ns) => Some(ns),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Namespace(ns) => write!(f, "{ns}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Namespace> for Value {
    fn from(ns: Namespace) -> Self {
        Self::Namespace(ns)
    }
}

/// Signature of a custom [`Converter`].
pub type ConvertFn = dyn Fn(&str) -> Result<Value, String> + Send + Sync;

/// Turns a raw argument token into a [`Value`].
///
/// The error string of a failed conversion becomes the `reason` of
/// [`ParseError::InvalidValue`](crate::ParseError::InvalidValue).
///
/// # Examples
///
/// ```
/// use argkit_core::{Converter, Value};
///
/// assert_eq!(Converter::String.convert("42"), Ok(Value::from("42")));
/// assert_eq!(Converter::Integer.convert("42"), Ok(Value::Int(42)));
/// assert!(Converter::Integer.convert("forty-two").is_err());
///
/// let upper = Converter::custom(|raw| Ok(Value::from(raw.to_uppercase())));
/// assert_eq!(upper.convert("x"), Ok(Value::from("X")));
/// ```
#[derive(Clone, Default)]
pub enum Converter {
    /// Keep the token as a string (the default).
    #[default]
    String,
    /// Parse a signed 64-bit integer.
    Integer,
    /// Parse a 64-bit float.
    Float,
    /// Parse `true/false`, `yes/no`, `on/off`, `1/0` (case-insensitive).
    Boolean,
    /// Application-supplied conversion.
    Custom(Arc<ConvertFn>),
}

impl Converter {
    /// Wraps a closure as a [`Converter::Custom`].
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Converts one raw token.
    pub fn convert(&self, raw: &str) -> Result<Value, String> {
        match self {
            Self::String => Ok(Value::Str(raw.to_string())),
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| e.to_string()),
            Self::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| e.to_string()),
            Self::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err("expected a boolean".to_string()),
            },
            Self::Custom(f) => f(raw),
        }
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Integer => f.write_str("Integer"),
            Self::Float => f.write_str("Float"),
            Self::Boolean => f.write_str("Boolean"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
