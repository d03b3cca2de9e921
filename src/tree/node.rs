//! Arena nodes of the entity tree and the per-kind cell dispatch.

use crate::store::{EntityStore, IString};
use crate::tree::{CellValue, ItemFlags, ItemRole};

/// Handle into the model's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The three node kinds. Closed set: the tree is always root → entity → field.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Root {
        children: Vec<NodeId>,
    },
    Entity {
        entity_index: usize,
        children: Vec<NodeId>,
    },
    Field {
        entity_index: usize,
        /// Field name this node addresses. Kept equal to the stored key by
        /// the edit gateway.
        key: IString,
    },
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub(crate) parent: Option<NodeId>,
    /// Row under `parent`, cached at construction.
    pub(crate) child_index: usize,
    pub(crate) kind: NodeKind,
}

impl TreeNode {
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Root { children } | NodeKind::Entity { children, .. } => children,
            NodeKind::Field { .. } => &[],
        }
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, NodeKind::Field { .. })
    }

    /// Cell contents for this node at `column` under `role`.
    pub(crate) fn data(&self, store: &EntityStore, column: usize, role: ItemRole, class_field: &str) -> CellValue {
        match &self.kind {
            NodeKind::Root { .. } => CellValue::Empty,
            NodeKind::Entity { entity_index, .. } => {
                let Some(entity) = store.get(*entity_index) else {
                    return CellValue::Empty;
                };
                match (role, column) {
                    (ItemRole::Display | ItemRole::Edit, 0) => CellValue::Index(*entity_index),
                    (ItemRole::Display | ItemRole::Edit, 1) => entity
                        .get(class_field)
                        .map_or(CellValue::Empty, |v| CellValue::Text(v.to_string())),
                    (ItemRole::SortKey, 2) => CellValue::Text(entity.digest()),
                    _ => CellValue::Empty,
                }
            }
            NodeKind::Field { entity_index, key } => {
                let Some(entity) = store.get(*entity_index) else {
                    return CellValue::Empty;
                };
                match (role, column) {
                    (ItemRole::Display | ItemRole::Edit, 0) => CellValue::Text(key.as_str().to_string()),
                    (ItemRole::Display | ItemRole::Edit, 1) => entity
                        .get(key.as_str())
                        .map_or(CellValue::Empty, |v| CellValue::Text(v.to_string())),
                    (ItemRole::SortKey, 2) => CellValue::Text(entity.digest()),
                    _ => CellValue::Empty,
                }
            }
        }
    }

    /// Interaction flags for this node at `column`.
    pub(crate) fn flags(&self, column: usize) -> ItemFlags {
        match &self.kind {
            NodeKind::Root { .. } => ItemFlags::NONE,
            NodeKind::Entity { .. } => {
                if column == 0 {
                    ItemFlags::ENABLED
                } else {
                    ItemFlags::NONE
                }
            }
            NodeKind::Field { .. } => match column {
                0 | 1 => {
                    ItemFlags::ENABLED
                        | ItemFlags::SELECTABLE
                        | ItemFlags::EDITABLE
                        | ItemFlags::NEVER_HAS_CHILDREN
                }
                _ => ItemFlags::NEVER_HAS_CHILDREN,
            },
        }
    }
}
