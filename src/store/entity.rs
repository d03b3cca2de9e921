//! A single entity: an insertion-ordered set of case-insensitive fields.
//!
//! Entities are small (a handful to a few dozen fields), so fields live in a
//! `Vec` and lookups scan it. Order matters: it is the parse order, the row
//! order of field nodes in the tree, and the order fields are re-encoded in.

use serde::{Deserialize, Serialize};

use crate::error::{EntityError, Result};
use crate::store::istring::IString;

/// Result of a single field write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWriteOp {
    /// The field did not exist and was appended.
    Inserted,
    /// An existing field's value was replaced in place.
    Updated,
}

/// Result of a rename request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOp {
    /// The field now carries the new name.
    Renamed,
    /// The new name equals the current one; nothing changed.
    Unchanged,
}

/// One entity's named string fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    fields: Vec<(IString, String)>,
}

impl Entity {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Build from ordered pairs. A repeated key keeps the position of its
    /// first occurrence and the value of its last.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut entity = Self::new();
        for (key, value) in pairs {
            let key: String = key.into();
            if entity.set(&key, value) == FieldWriteOp::Updated {
                tracing::warn!("duplicate entity key '{}' collapsed, last value kept", key);
            }
        }
        entity
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|(k, _)| k.matches(key))
    }

    /// Case-insensitive value lookup. A missing field is `None`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|i| self.fields[i].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Stored key (original case) for a case-insensitive name.
    pub fn key(&self, key: &str) -> Option<&IString> {
        self.position(key).map(|i| &self.fields[i].0)
    }

    /// Field at a position in insertion order.
    pub fn field_at(&self, index: usize) -> Option<(&IString, &str)> {
        self.fields.get(index).map(|(k, v)| (k, v.as_str()))
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&IString, &str)> {
        self.fields.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &IString> {
        self.fields.iter().map(|(k, _)| k)
    }

    /// Set a field value. Upsert: overwrites an existing field in place,
    /// otherwise appends.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> FieldWriteOp {
        let value = value.into();
        match self.position(key) {
            Some(i) => {
                self.fields[i].1 = value;
                FieldWriteOp::Updated
            }
            None => {
                self.fields.push((IString::new(key), value));
                FieldWriteOp::Inserted
            }
        }
    }

    /// Rename a field, keeping its value and position.
    ///
    /// The key is swapped in a single assignment, so the entity never holds
    /// both names. Renaming to a case-variant of the current name is a no-op.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<RenameOp> {
        let i = self
            .position(old)
            .ok_or_else(|| EntityError::FieldNotFound(old.to_string()))?;
        if self.fields[i].0.matches(new) {
            return Ok(RenameOp::Unchanged);
        }
        if self.contains_key(new) {
            return Err(EntityError::NameCollision(new.to_string()));
        }
        self.fields[i].0 = IString::new(new);
        Ok(RenameOp::Renamed)
    }

    /// Searchable digest: every name and value, each followed by one space.
    pub fn digest(&self) -> String {
        let capacity = self.fields.iter().map(|(k, v)| k.len() + v.len() + 2).sum();
        let mut out = String::with_capacity(capacity);
        for (key, value) in &self.fields {
            out.push_str(key.as_str());
            out.push(' ');
            out.push_str(value);
            out.push(' ');
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Entity {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
