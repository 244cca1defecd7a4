//! Attribute containers.
//!
//! Call nodes carry an [`Attrs`] object: a typed record whose fields are
//! reflected by name and read back as dynamically-kinded [`RetValue`]s.
//! Functions carry a [`DictAttrs`] dictionary of literal [`Object`]s.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::{Object, RetValue};

/// Reflective attribute record attached to a call.
///
/// # Examples
///
/// ```rust
/// # use dfpat_ir::attrs::Attrs;
/// let attrs = Attrs::new("Conv2DAttrs").with("groups", 1i64).with("data_layout", "NCHW");
/// assert_eq!(attrs.list_attr_names(), vec!["groups", "data_layout"]);
/// ```
#[derive(Debug, Clone)]
pub struct Attrs {
    type_key: String,
    fields: Vec<(String, RetValue)>,
}

impl Attrs {
    pub fn new(type_key: impl Into<String>) -> Self {
        Self { type_key: type_key.into(), fields: Vec::new() }
    }

    /// Add or replace a field, keeping declaration order for new fields.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RetValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    /// Field names in declaration order.
    pub fn list_attr_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get_attr(&self, name: &str) -> Option<&RetValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &RetValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Attrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.type_key)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        write!(f, "}}")
    }
}

/// Literal attribute dictionary attached to a function.
#[derive(Debug, Clone, Default)]
pub struct DictAttrs {
    dict: BTreeMap<String, Object>,
}

impl DictAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Object>) -> Self {
        self.dict.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Object> {
        self.dict.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dict.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Object)> {
        self.dict.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }
}

impl FromIterator<(String, Object)> for DictAttrs {
    fn from_iter<I: IntoIterator<Item = (String, Object)>>(iter: I) -> Self {
        Self { dict: iter.into_iter().collect() }
    }
}
