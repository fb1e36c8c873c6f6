//! Reducer actions that fold parsed values into the namespace.
//!
//! Every matched option or operand calls [`Action::reduce`] with the freshly
//! converted values and whatever was already stored under its key; the
//! returned value replaces the stored one. Repeated flags accumulate
//! (`AppendValue`, `ExtendValue`, `CountPresence`) or overwrite
//! (`StoreValue`) depending on the action.

use std::fmt;
use std::sync::Arc;

use crate::{NArgs, OperandSchema, OptionSchema, Value};

/// The schema entity an action is reducing for.
#[derive(Debug, Clone, Copy)]
pub enum Argument<'a> {
    Option(&'a OptionSchema),
    Operand(&'a OperandSchema),
}

impl<'a> Argument<'a> {
    /// Result key: the option's store-name or the operand's name.
    pub fn key(&self) -> &'a str {
        match self {
            Self::Option(option) => option.store_name(),
            Self::Operand(operand) => operand.name(),
        }
    }

    /// The option's present sentinel. Operands never have one.
    pub fn present(&self) -> Option<&'a Value> {
        match self {
            Self::Option(option) => option.present(),
            Self::Operand(_) => None,
        }
    }
}

/// Signature of a custom reducer.
pub type ReduceFn = dyn Fn(Argument<'_>, Vec<Value>, Option<Value>) -> Value + Send + Sync;

/// Value-folding behavior of an option or operand.
///
/// # Examples
///
/// ```
/// use argkit_core::{Action, Argument, OperandSchema, Value};
///
/// let operand = OperandSchema::new("file");
/// let arg = Argument::Operand(&operand);
///
/// let first = Action::ExtendValue.reduce(arg, vec![Value::from("a")], None);
/// let next = Action::ExtendValue.reduce(arg, vec![Value::from("b")], Some(first));
/// assert_eq!(next, Value::List(vec![Value::from("a"), Value::from("b")]));
///
/// let count = Action::CountPresence.reduce(arg, vec![], Some(Value::Int(2)));
/// assert_eq!(count, Value::Int(3));
/// ```
#[derive(Clone, Default)]
pub enum Action {
    /// Store the first value, or `None` when no value was parsed.
    #[default]
    StoreValue,
    /// Store the option's present sentinel.
    StorePresent,
    StoreTrue,
    StoreFalse,
    /// Append the present sentinel to a list.
    AppendPresent,
    /// Append the whole group of values as one list element.
    AppendValue,
    /// Extend a list with each value.
    ExtendValue,
    /// Count occurrences, starting at 1.
    CountPresence,
    /// Application-supplied reducer.
    Custom(Arc<ReduceFn>),
}

impl Action {
    /// Wraps a closure as an [`Action::Custom`].
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Argument<'_>, Vec<Value>, Option<Value>) -> Value + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::StoreValue => "store_value",
            Self::StorePresent => "store_present",
            Self::StoreTrue => "store_true",
            Self::StoreFalse => "store_false",
            Self::AppendPresent => "append_present",
            Self::AppendValue => "append_value",
            Self::ExtendValue => "extend_value",
            Self::CountPresence => "count_presence",
            Self::Custom(_) => "custom",
        }
    }

    /// Presence-style actions ignore values, so they take no arguments.
    pub fn is_presence(&self) -> bool {
        matches!(
            self,
            Self::StorePresent
                | Self::StoreTrue
                | Self::StoreFalse
                | Self::AppendPresent
                | Self::CountPresence
        )
    }

    /// Arity an option gets when none is given explicitly.
    pub fn default_nargs(&self) -> NArgs {
        if self.is_presence() {
            NArgs::Exact(0)
        } else {
            NArgs::Exact(1)
        }
    }

    /// Folds `values` into `previous` and returns the value to store.
    pub fn reduce(&self, argument: Argument<'_>, values: Vec<Value>, previous: Option<Value>) -> Value {
        match self {
            Self::StoreValue => values.into_iter().next().unwrap_or_default(),
            Self::StorePresent => argument.present().cloned().unwrap_or_default(),
            Self::StoreTrue => Value::Bool(true),
            Self::StoreFalse => Value::Bool(false),
            Self::AppendPresent => {
                let mut items = into_list(previous);
                items.push(argument.present().cloned().unwrap_or_default());
                Value::List(items)
            }
            Self::AppendValue => {
                let mut items = into_list(previous);
                if !values.is_empty() {
                    items.push(Value::List(values));
                }
                Value::List(items)
            }
            Self::ExtendValue => {
                let mut items = into_list(previous);
                items.extend(values);
                Value::List(items)
            }
            Self::CountPresence => match previous {
                Some(Value::Int(n)) => Value::Int(n.saturating_add(1)),
                _ => Value::Int(1),
            },
            Self::Custom(f) => f(argument, values, previous),
        }
    }
}

fn into_list(previous: Option<Value>) -> Vec<Value> {
    match previous {
        None | Some(Value::None) => Vec::new(),
        Some(Value::List(items)) => items,
        Some(other) => vec![other],
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.name()),
        }
    }
}
