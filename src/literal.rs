//! The dynamic attribute store.
//!
//! [`Literal`] is the tagged value type attached to nodes and edges;
//! [`DynamicAttributes`] is the string-keyed map of them. Both nodes and
//! edges embed one, so the type lives at the bottom of the module graph
//! with no dependency on `graph` or the edge-kind modules.

use derive_more::From;
use indexmap::IndexMap;

/// A dynamic attribute value.
///
/// Closed sum type standing in for reflection/duck-typing: adding a new
/// variant is a schema change, not a runtime discovery.
#[derive(Debug, Clone, PartialEq, From)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    #[from]
    Str(String),
}

impl Literal {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Literal::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Str(value.to_owned())
    }
}

/// String-keyed map of [`Literal`]s attached to a node or edge.
///
/// Backed by `IndexMap` rather than `HashMap` so that `iterate()` is
/// insertion-ordered, matching the insertion-order-stable contract the rest
/// of the graph substrate holds to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicAttributes {
    values: IndexMap<String, Literal>,
}

impl DynamicAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `key`. Returns the previous value, if any.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Literal>) -> Option<Literal> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Literal> {
        self.values.get(key)
    }

    /// Removes `key`. Returns `false` if it was not present; missing keys
    /// are not an error.
    pub fn delete(&mut self, key: &str) -> bool {
        self.values.shift_remove(key).is_some()
    }

    pub fn iterate(&self) -> impl Iterator<Item = (&str, &Literal)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Deep-copies every key/value into `destination`, overwriting any
    /// colliding keys already there.
    pub fn clone_into(&self, destination: &mut DynamicAttributes) {
        for (key, value) in self.values.iter() {
            destination.values.insert(key.clone(), value.clone());
        }
    }
}

impl FromIterator<(String, Literal)> for DynamicAttributes {
    fn from_iter<T: IntoIterator<Item = (String, Literal)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
