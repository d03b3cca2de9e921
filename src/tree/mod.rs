//! Three-level tree projection over the entity store.
//!
//! ```text
//! root (hidden)
//! +-- entity 0        [ordinal] [classname] [digest*]
//! |   +-- field       [name]    [value]     [digest*]
//! |   +-- field
//! +-- entity 1
//!     +-- field
//! ```
//! `*` column 2 only answers the `SortKey` role.
//!
//! Nodes live in an arena and are addressed by `NodeId`; consumers hold
//! `ModelIndex` values (row, column, node). Nodes are never reallocated after
//! construction, so an address stays valid across every edit.

pub mod edit;
pub mod model;
pub mod node;

use std::ops::BitOr;

pub use edit::{ChangeObserver, EditOutcome};
pub use model::EntityTreeModel;
pub use node::{NodeId, NodeKind, TreeNode};

/// Number of columns exposed at every level.
pub const COLUMN_COUNT: usize = 3;

/// Address of one cell in the tree.
///
/// The hidden root and "no such cell" are both expressed as `None` by the
/// model's navigation methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelIndex {
    row: usize,
    column: usize,
    node: NodeId,
}

impl ModelIndex {
    pub(crate) fn new(row: usize, column: usize, node: NodeId) -> Self {
        Self { row, column, node }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

/// What a cell read is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    Display,
    Edit,
    /// Filter/sort key; only column 2 answers it.
    SortKey,
}

/// Contents of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    /// Entity ordinal.
    Index(usize),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            CellValue::Index(i) => Some(*i),
            _ => None,
        }
    }
}

/// Interaction flags for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ItemFlags(u8);

impl ItemFlags {
    pub const NONE: ItemFlags = ItemFlags(0);
    pub const ENABLED: ItemFlags = ItemFlags(1);
    pub const SELECTABLE: ItemFlags = ItemFlags(1 << 1);
    pub const EDITABLE: ItemFlags = ItemFlags(1 << 2);
    pub const NEVER_HAS_CHILDREN: ItemFlags = ItemFlags(1 << 3);

    pub fn contains(self, other: ItemFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for ItemFlags {
    type Output = ItemFlags;

    fn bitor(self, rhs: ItemFlags) -> ItemFlags {
        ItemFlags(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_contains() {
        let f = ItemFlags::ENABLED | ItemFlags::EDITABLE;
        assert!(f.contains(ItemFlags::ENABLED));
        assert!(f.contains(ItemFlags::EDITABLE));
        assert!(!f.contains(ItemFlags::SELECTABLE));
        assert!(f.contains(ItemFlags::NONE));
        assert!(ItemFlags::NONE.is_empty());
        assert_eq!(f.bits(), 0b101);
    }

    #[test]
    fn test_cell_value_accessors() {
        assert!(CellValue::default().is_empty());
        assert_eq!(CellValue::Index(3).as_index(), Some(3));
        assert_eq!(CellValue::Text("light".into()).as_text(), Some("light"));
        assert_eq!(CellValue::Index(3).as_text(), None);
    }
}
