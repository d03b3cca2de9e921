//! Flat entity storage shared by the tree model and lump providers.
//!
//! The store is built once from the decoded entities lump and never changes
//! shape: no entity is inserted, removed or reordered, so an entity's index is
//! a stable identifier for the lifetime of the store. Field writes go through
//! the crate-private mutators, which only the tree's edit gateway calls.

pub mod entity;
pub mod istring;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub use entity::{Entity, FieldWriteOp, RenameOp};
pub use istring::IString;

use crate::error::{EntityError, Result};

/// Store handle shared between the tree model and outstanding providers.
pub type SharedStore = Rc<RefCell<EntityStore>>;

/// Ordered collection of all entities from one loaded map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStore {
    entities: Vec<Entity>,
}

impl EntityStore {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Wrap into a shared handle.
    pub fn into_shared(self) -> SharedStore {
        Rc::new(RefCell::new(self))
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity by index. O(1).
    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    /// Iterator over all entities in store order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Total number of fields across all entities.
    pub fn field_count(&self) -> usize {
        self.entities.iter().map(Entity::len).sum()
    }

    /// Case-insensitive field lookup. A missing entity or field is `None`.
    pub fn value(&self, index: usize, key: &str) -> Option<&str> {
        self.get(index)?.get(key)
    }

    /// Count entities by the value of `class_field`.
    ///
    /// Values group case-insensitively and are reported in the case of their
    /// first occurrence, sorted. Entities lacking the field count under
    /// `missing_label`.
    pub fn class_histogram(&self, class_field: &str, missing_label: &str) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<IString, usize> = BTreeMap::new();
        for entity in &self.entities {
            let class = entity.get(class_field).unwrap_or(missing_label);
            *counts.entry(IString::new(class)).or_insert(0) += 1;
        }
        counts.into_iter().map(|(k, v)| (String::from(k), v)).collect()
    }

    // -- Mutators (edit gateway only) ---------------------------------------

    fn entity_mut(&mut self, index: usize) -> Result<&mut Entity> {
        self.entities
            .get_mut(index)
            .ok_or(EntityError::EntityNotFound(index))
    }

    /// Set a field value, creating the field if absent.
    pub(crate) fn set_value(&mut self, index: usize, key: &str, value: &str) -> Result<FieldWriteOp> {
        Ok(self.entity_mut(index)?.set(key, value))
    }

    /// Rename a field in place. Fails with `NameCollision` when `new` already
    /// names another field of the same entity.
    pub(crate) fn rename_field(&mut self, index: usize, old: &str, new: &str) -> Result<RenameOp> {
        self.entity_mut(index)?.rename(old, new)
    }
}

impl From<Vec<Entity>> for EntityStore {
    fn from(entities: Vec<Entity>) -> Self {
        Self::new(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EntityStore {
        EntityStore::new(vec![
            Entity::from_pairs([("classname", "worldspawn"), ("message", "Arena")]),
            Entity::from_pairs([("classname", "light"), ("targetname", "light1")]),
            Entity::from_pairs([("classname", "Light"), ("origin", "0 0 0")]),
            Entity::from_pairs([("origin", "1 2 3")]),
        ])
    }

    #[test]
    fn test_empty_store() {
        let store = EntityStore::default();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.get(0), None);
        assert_eq!(store.field_count(), 0);
    }

    #[test]
    fn test_lookup() {
        let store = sample();
        assert_eq!(store.len(), 4);
        assert_eq!(store.field_count(), 7);
        assert_eq!(store.value(1, "TargetName"), Some("light1"));
        assert_eq!(store.value(1, "target"), None);
        assert_eq!(store.value(9, "classname"), None);
    }

    #[test]
    fn test_set_value() {
        let mut store = sample();
        assert_eq!(store.set_value(3, "classname", "info_null").unwrap(), FieldWriteOp::Inserted);
        assert_eq!(store.set_value(3, "classname", "info_notnull").unwrap(), FieldWriteOp::Updated);
        assert_eq!(store.value(3, "classname"), Some("info_notnull"));

        let err = store.set_value(4, "classname", "x").unwrap_err();
        assert!(matches!(err, EntityError::EntityNotFound(4)));
    }

    #[test]
    fn test_rename_field() {
        let mut store = sample();
        assert_eq!(store.rename_field(0, "message", "music").unwrap(), RenameOp::Renamed);
        assert_eq!(store.value(0, "music"), Some("Arena"));
        assert_eq!(store.value(0, "message"), None);

        let before = store.clone();
        let err = store.rename_field(1, "targetname", "classname").unwrap_err();
        assert!(matches!(err, EntityError::NameCollision(_)));
        assert_eq!(store, before);
    }

    #[test]
    fn test_class_histogram() {
        let store = sample();
        let hist = store.class_histogram("classname", "<no classname>");
        assert_eq!(hist.len(), 3);
        assert_eq!(hist.get("light"), Some(&2));
        assert_eq!(hist.get("worldspawn"), Some(&1));
        assert_eq!(hist.get("<no classname>"), Some(&1));
    }

    #[test]
    fn test_shared_handle_sees_writes() {
        let shared = sample().into_shared();
        let other = Rc::clone(&shared);
        shared.borrow_mut().set_value(0, "message", "Edited").unwrap();
        assert_eq!(other.borrow().value(0, "message"), Some("Edited"));
    }
}
