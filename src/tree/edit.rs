//! Edit gateway: the only write path into the entity store.
//!
//! An edit addresses a field node cell. Column 0 renames the field, column 1
//! replaces its value. Nodes are never reallocated by an edit: a rename
//! rewrites the name the existing field node denotes, in the same call that
//! rewrites the stored key, so every address taken before the edit (the
//! edited one, its siblings, its parent) still resolves afterwards.

use crate::error::{EntityError, Result};
use crate::store::{IString, RenameOp};
use crate::tree::model::EntityTreeModel;
use crate::tree::node::NodeKind;
use crate::tree::ModelIndex;

/// Outcome of an accepted edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The field was renamed.
    Renamed,
    /// The field's value was replaced.
    Updated,
    /// The new name equals the current one; nothing was written.
    Unchanged,
}

/// Receives a notification for each cell changed by an edit.
pub trait ChangeObserver {
    fn data_changed(&mut self, index: &ModelIndex);
}

impl<F: FnMut(&ModelIndex)> ChangeObserver for F {
    fn data_changed(&mut self, index: &ModelIndex) {
        self(index)
    }
}

impl EntityTreeModel {
    /// Register an observer for edit notifications.
    pub fn add_observer(&mut self, observer: Box<dyn ChangeObserver>) {
        self.observers.push(observer);
    }

    /// Apply `value` to the cell at `index`.
    ///
    /// Refusals leave the store untouched:
    /// - `EmptyValue` for an empty `value`
    /// - `InvalidAddress` for stale addresses and non-field nodes
    /// - `NameCollision` when renaming onto another field of the same entity
    /// - `ColumnNotEditable` for columns other than 0 and 1
    /// - `StoreBusy` while another handle holds a borrow of the store
    pub fn apply_edit(&mut self, index: &ModelIndex, value: &str) -> Result<EditOutcome> {
        if value.is_empty() {
            return Err(EntityError::EmptyValue);
        }
        let (node_id, node) = self
            .resolve(Some(index))
            .ok_or_else(|| EntityError::InvalidAddress(format!("{:?}", index)))?;
        let NodeKind::Field { entity_index, key } = &node.kind else {
            return Err(EntityError::InvalidAddress(format!(
                "row {} column {} is not a field",
                index.row(),
                index.column()
            )));
        };
        let entity_index = *entity_index;
        let key = key.clone();

        let outcome = match index.column() {
            0 => {
                let renamed = self
                    .store
                    .try_borrow_mut()
                    .map_err(|_| EntityError::StoreBusy)?
                    .rename_field(entity_index, key.as_str(), value);
                match renamed {
                    Ok(RenameOp::Unchanged) => EditOutcome::Unchanged,
                    Ok(RenameOp::Renamed) => {
                        if let NodeKind::Field { key, .. } = &mut self.nodes[node_id.index()].kind {
                            *key = IString::new(value);
                        }
                        tracing::debug!("entity {}: renamed field '{}' to '{}'", entity_index, key, value);
                        EditOutcome::Renamed
                    }
                    Err(e) => {
                        if matches!(e, EntityError::NameCollision(_)) {
                            tracing::warn!(
                                "entity {}: cannot rename '{}' to '{}', field already exists",
                                entity_index,
                                key,
                                value
                            );
                        }
                        return Err(e);
                    }
                }
            }
            1 => {
                self.store
                    .try_borrow_mut()
                    .map_err(|_| EntityError::StoreBusy)?
                    .set_value(entity_index, key.as_str(), value)?;
                tracing::debug!("entity {}: set '{}' = '{}'", entity_index, key, value);
                EditOutcome::Updated
            }
            column => return Err(EntityError::ColumnNotEditable(column)),
        };

        if outcome != EditOutcome::Unchanged {
            for observer in &mut self.observers {
                observer.data_changed(index);
            }
        }
        Ok(outcome)
    }
}
