//! `EntityTreeModel` - navigation and cell reads over the entity store.

use std::cell::Ref;
use std::rc::Rc;

use crate::config::TreeConfig;
use crate::lump::{EntityEncoder, EntityLumpProvider, LumpId, LumpProviderPtr, ProviderSink};
use crate::store::{Entity, EntityStore, SharedStore};
use crate::tree::edit::ChangeObserver;
use crate::tree::node::{NodeId, NodeKind, TreeNode};
use crate::tree::{CellValue, ItemFlags, ItemRole, ModelIndex, COLUMN_COUNT};

/// Editable tree view over a shared entity store.
///
/// Built once; the node arena is never resized, so `ModelIndex` values stay
/// valid for the model's lifetime. The store outlives the model because the
/// model holds a strong reference to it.
pub struct EntityTreeModel {
    pub(crate) store: SharedStore,
    pub(crate) nodes: Vec<TreeNode>,
    pub(crate) config: TreeConfig,
    pub(crate) observers: Vec<Box<dyn ChangeObserver>>,
}

impl EntityTreeModel {
    // -- Construction ---------------------------------------------------------

    /// Build a model over freshly parsed entities with the default config.
    pub fn new(entities: Vec<Entity>) -> Self {
        Self::with_config(entities, TreeConfig::default())
    }

    pub fn with_config(entities: Vec<Entity>, config: TreeConfig) -> Self {
        Self::from_store(EntityStore::new(entities).into_shared(), config)
    }

    /// Build a model over an existing shared store.
    pub fn from_store(store: SharedStore, config: TreeConfig) -> Self {
        let nodes = build_nodes(&store.borrow());
        tracing::debug!(
            "entity tree built: {} entities, {} nodes",
            nodes[NodeId::ROOT.index()].children().len(),
            nodes.len()
        );
        Self {
            store,
            nodes,
            config,
            observers: Vec::new(),
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// Read access to the backing store.
    ///
    /// # Panics
    ///
    /// Panics if a `shared_store` handle holds a mutable borrow.
    pub fn store(&self) -> Ref<'_, EntityStore> {
        self.store.borrow()
    }

    /// Another handle to the backing store. Writes still go through
    /// `apply_edit`; the store's mutators are not public.
    pub fn shared_store(&self) -> SharedStore {
        Rc::clone(&self.store)
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.index())
    }

    /// Resolve an address to its node. `None` names the root. Addresses whose
    /// node is out of range or whose row disagrees with the node's cached row
    /// are rejected.
    pub(crate) fn resolve(&self, index: Option<&ModelIndex>) -> Option<(NodeId, &TreeNode)> {
        match index {
            None => Some((NodeId::ROOT, &self.nodes[NodeId::ROOT.index()])),
            Some(index) => {
                let node = self.nodes.get(index.node().index())?;
                if node.parent.is_none() || node.child_index != index.row() || index.column() >= COLUMN_COUNT {
                    return None;
                }
                Some((index.node(), node))
            }
        }
    }

    // -- Navigation -----------------------------------------------------------

    /// Address of child `row` at `column` under `parent` (`None` = root).
    ///
    /// Out-of-range rows or columns, stale parents, and parents addressed at
    /// a column other than 0 all yield `None`.
    pub fn child_at(&self, parent: Option<&ModelIndex>, row: usize, column: usize) -> Option<ModelIndex> {
        if column >= COLUMN_COUNT || parent.is_some_and(|p| p.column() != 0) {
            return None;
        }
        let (_, node) = self.resolve(parent)?;
        let child = *node.children().get(row)?;
        Some(ModelIndex::new(row, column, child))
    }

    /// Parent address of `index`.
    ///
    /// Entity nodes report no parent: the visible hierarchy is two levels
    /// (entity, field) even though the root exists internally.
    pub fn parent_of(&self, index: &ModelIndex) -> Option<ModelIndex> {
        let (_, node) = self.resolve(Some(index))?;
        let parent_id = node.parent?;
        if parent_id == NodeId::ROOT {
            return None;
        }
        let parent = self.node(parent_id)?;
        Some(ModelIndex::new(parent.child_index, 0, parent_id))
    }

    /// Number of children under `parent` (`None` = root). Only column 0 has
    /// children.
    pub fn child_count(&self, parent: Option<&ModelIndex>) -> usize {
        if parent.is_some_and(|p| p.column() != 0) {
            return 0;
        }
        self.resolve(parent).map_or(0, |(_, node)| node.children().len())
    }

    pub fn column_count(&self) -> usize {
        COLUMN_COUNT
    }

    /// Same node, different column.
    pub fn sibling(&self, index: &ModelIndex, column: usize) -> Option<ModelIndex> {
        if column >= COLUMN_COUNT {
            return None;
        }
        self.resolve(Some(index))?;
        Some(ModelIndex::new(index.row(), column, index.node()))
    }

    /// Address (column 0) of entity `entity_index`.
    pub fn entity_at(&self, entity_index: usize) -> Option<ModelIndex> {
        self.child_at(None, entity_index, 0)
    }

    /// Address of the field node naming `key` in entity `entity_index`, at
    /// `column`. Lookup is case-insensitive; a missing field is `None`.
    pub fn find_field(&self, entity_index: usize, key: &str, column: usize) -> Option<ModelIndex> {
        let entity = self.entity_at(entity_index)?;
        let (_, node) = self.resolve(Some(&entity))?;
        node.children().iter().enumerate().find_map(|(row, &id)| match &self.node(id)?.kind {
            NodeKind::Field { key: k, .. } if k.matches(key) => self.child_at(Some(&entity), row, column),
            _ => None,
        })
    }

    /// Entity index an address belongs to (the root has none).
    pub fn entity_index_of(&self, index: &ModelIndex) -> Option<usize> {
        let (_, node) = self.resolve(Some(index))?;
        match node.kind {
            NodeKind::Root { .. } => None,
            NodeKind::Entity { entity_index, .. } | NodeKind::Field { entity_index, .. } => Some(entity_index),
        }
    }

    // -- Cells ----------------------------------------------------------------

    /// Cell contents at `index` for `role`. Stale addresses, and any address
    /// while the store is mutably borrowed elsewhere, read as empty.
    pub fn value_at(&self, index: &ModelIndex, role: ItemRole) -> CellValue {
        let (Some((_, node)), Ok(store)) = (self.resolve(Some(index)), self.store.try_borrow()) else {
            return CellValue::Empty;
        };
        node.data(&store, index.column(), role, &self.config.class_field)
    }

    /// Flags for `index` (`None` = root).
    pub fn flags(&self, index: Option<&ModelIndex>) -> ItemFlags {
        match (index, self.resolve(index)) {
            (_, None) => ItemFlags::NONE,
            (None, Some((_, node))) => node.flags(0),
            (Some(index), Some((_, node))) => node.flags(index.column()),
        }
    }

    /// Columns of `index`'s row that accept edits.
    pub fn editable_columns(&self, index: &ModelIndex) -> Vec<usize> {
        (0..COLUMN_COUNT)
            .filter(|&column| {
                self.sibling(index, column)
                    .is_some_and(|cell| self.flags(Some(&cell)).contains(ItemFlags::EDITABLE))
            })
            .collect()
    }

    /// Case-insensitive substring match of `needle` against the row's
    /// whole-entity digest. An empty needle matches every valid address.
    pub fn matches_filter(&self, index: &ModelIndex, needle: &str) -> bool {
        let Some(cell) = self.sibling(index, 2) else {
            return false;
        };
        match self.value_at(&cell, ItemRole::SortKey) {
            CellValue::Text(digest) => digest.to_lowercase().contains(&needle.to_lowercase()),
            _ => needle.is_empty(),
        }
    }

    /// Entity counts per class, using the configured class field and label.
    pub fn class_histogram(&self) -> std::collections::BTreeMap<String, usize> {
        self.store
            .borrow()
            .class_histogram(&self.config.class_field, &self.config.missing_class_label)
    }

    // -- Lump providers -------------------------------------------------------

    /// Provider for the entities lump, bound to the live store.
    ///
    /// The provider encodes whatever the store holds when it is invoked, so
    /// edits made after this call still reach the output.
    pub fn generate_provider(&self) -> LumpProviderPtr {
        Rc::new(EntityLumpProvider::new(self.shared_store()))
    }

    /// Like `generate_provider`, with a caller-chosen encoder.
    pub fn generate_provider_with<C: EntityEncoder + 'static>(&self, codec: C) -> LumpProviderPtr {
        Rc::new(EntityLumpProvider::with_codec(self.shared_store(), codec))
    }

    /// Install a fresh entities-lump provider into `sink`, returning the
    /// provider it replaced.
    pub fn install_provider(&self, sink: &mut dyn ProviderSink) -> Option<LumpProviderPtr> {
        sink.install(LumpId::Entities, self.generate_provider())
    }
}

fn build_nodes(store: &EntityStore) -> Vec<TreeNode> {
    let mut nodes = Vec::with_capacity(1 + store.len() + store.field_count());
    nodes.push(TreeNode {
        parent: None,
        child_index: 0,
        kind: NodeKind::Root { children: Vec::with_capacity(store.len()) },
    });

    for (entity_index, entity) in store.iter().enumerate() {
        let entity_id = NodeId(nodes.len() as u32);
        nodes.push(TreeNode {
            parent: Some(NodeId::ROOT),
            child_index: entity_index,
            kind: NodeKind::Entity { entity_index, children: Vec::with_capacity(entity.len()) },
        });

        let mut field_ids = Vec::with_capacity(entity.len());
        for (field_index, key) in entity.keys().enumerate() {
            field_ids.push(NodeId(nodes.len() as u32));
            nodes.push(TreeNode {
                parent: Some(entity_id),
                child_index: field_index,
                kind: NodeKind::Field { entity_index, key: key.clone() },
            });
        }

        if let NodeKind::Entity { children, .. } = &mut nodes[entity_id.index()].kind {
            *children = field_ids;
        }
        if let NodeKind::Root { children } = &mut nodes[NodeId::ROOT.index()].kind {
            children.push(entity_id);
        }
    }

    nodes
}
