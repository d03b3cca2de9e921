//! entity-tree: an editable tree projection over BSP entity lumps.
//!
//! A map's entities lump is a flat list of entities, each a set of
//! case-insensitive string fields. This crate exposes it as a navigable
//! three-level tree (root → entity → field) with stable cell addresses,
//! edits through a single gateway, and a deferred lump provider that
//! re-encodes the edited entities when the container is written.
//!
//! ```
//! use entity_tree::{EntityTreeModel, ItemRole, LumpProvider, TextEntityCodec};
//!
//! let entities = TextEntityCodec.parse(b"{\n\"classname\" \"light\"\n\"targetname\" \"light1\"\n}\n\0").unwrap();
//! let mut model = EntityTreeModel::new(entities);
//! let provider = model.generate_provider();
//!
//! let name = model.find_field(0, "targetname", 0).unwrap();
//! model.apply_edit(&name, "target").unwrap();
//! assert_eq!(model.value_at(&name, ItemRole::Display).as_text(), Some("target"));
//!
//! let bytes = provider.generate().unwrap();
//! assert!(String::from_utf8_lossy(&bytes).contains("\"target\" \"light1\""));
//! ```

pub mod config;
pub mod error;
pub mod lump;
pub mod store;
pub mod tree;

pub use config::TreeConfig;
pub use error::{EntityError, Result};
pub use lump::{
    EntityEncoder, EntityLumpProvider, LumpId, LumpProvider, LumpProviderPtr, ProviderSink,
    ProviderTable, TextEntityCodec,
};
pub use store::{Entity, EntityStore, FieldWriteOp, IString, RenameOp, SharedStore};
pub use tree::{
    CellValue, ChangeObserver, EditOutcome, EntityTreeModel, ItemFlags, ItemRole, ModelIndex,
    NodeId, COLUMN_COUNT,
};
