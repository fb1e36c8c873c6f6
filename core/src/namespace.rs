//! Ordered result mapping produced by a parse call.

use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Iter;
use serde::{Deserialize, Serialize};

use crate::Value;

/// Ordered mapping from store-name, operand name, or subcommand name to the
/// accumulated [`Value`].
///
/// Keys keep their first-insertion order. Subcommand results are nested
/// namespaces stored under the subcommand's primary name.
///
/// # Examples
///
/// ```
/// use argkit_core::{Namespace, Value};
///
/// let mut ns = Namespace::new();
/// ns.insert("verbose", Value::Bool(true));
/// ns.insert("output", Value::from("out.txt"));
///
/// assert_eq!(ns.keys().collect::<Vec<_>>(), vec!["verbose", "output"]);
/// assert_eq!(ns.get("output").and_then(Value::as_str), Some("out.txt"));
/// assert_eq!(ns.to_string(), "Namespace(verbose=true, output=out.txt)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(IndexMap<String, Value>);

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the nested namespace stored under a subcommand name.
    pub fn get_namespace(&self, key: &str) -> Option<&Namespace> {
        self.get(key).and_then(Value::as_namespace)
    }

    /// Inserts or replaces a value; a replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Replaces the value under `key` with `f(previous)`.
    ///
    /// The previous value is moved out rather than cloned, and an existing
    /// key keeps its position.
    pub(crate) fn fold(&mut self, key: &str, f: impl FnOnce(Option<Value>) -> Value) {
        match self.0.get_mut(key) {
            Some(slot) => {
                let previous = std::mem::take(slot);
                *slot = f(Some(previous));
            }
            None => {
                self.0.insert(key.to_string(), f(None));
            }
        }
    }
}

impl<'a> IntoIterator for &'a Namespace {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Namespace {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Namespace(")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str(")")
    }
}
