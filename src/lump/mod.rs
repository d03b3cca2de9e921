//! Lump providers: deferred generators for container sections.
//!
//! The container writer assembles a map file from one provider per lump and
//! pulls each provider's bytes only at save time. This module defines the
//! provider contract, the registration point providers are installed into,
//! and the entities-lump provider backed by the live entity store.

pub mod codec;
pub mod provider;

use std::collections::BTreeMap;
use std::io::Write;
use std::rc::Rc;

pub use codec::{EntityEncoder, TextEntityCodec};
pub use provider::EntityLumpProvider;

use crate::error::Result;

/// Lumps of the map container, in directory order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum LumpId {
    Entities = 0,
    Shaders = 1,
    Planes = 2,
    Nodes = 3,
    Leafs = 4,
    LeafSurfaces = 5,
    LeafBrushes = 6,
    Models = 7,
    Brushes = 8,
    BrushSides = 9,
    DrawVerts = 10,
    DrawIndexes = 11,
    Fogs = 12,
    Surfaces = 13,
    Lightmaps = 14,
    LightGrid = 15,
    Visibility = 16,
    LightArray = 17,
}

impl LumpId {
    pub const COUNT: usize = 18;

    pub fn from_u8(v: u8) -> Option<Self> {
        use LumpId::*;
        const ALL: [LumpId; LumpId::COUNT] = [
            Entities, Shaders, Planes, Nodes, Leafs, LeafSurfaces, LeafBrushes, Models, Brushes,
            BrushSides, DrawVerts, DrawIndexes, Fogs, Surfaces, Lightmaps, LightGrid, Visibility,
            LightArray,
        ];
        ALL.get(v as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            LumpId::Entities => "entities",
            LumpId::Shaders => "shaders",
            LumpId::Planes => "planes",
            LumpId::Nodes => "nodes",
            LumpId::Leafs => "leafs",
            LumpId::LeafSurfaces => "leafsurfaces",
            LumpId::LeafBrushes => "leafbrushes",
            LumpId::Models => "models",
            LumpId::Brushes => "brushes",
            LumpId::BrushSides => "brushsides",
            LumpId::DrawVerts => "drawverts",
            LumpId::DrawIndexes => "drawindexes",
            LumpId::Fogs => "fogs",
            LumpId::Surfaces => "surfaces",
            LumpId::Lightmaps => "lightmaps",
            LumpId::LightGrid => "lightgrid",
            LumpId::Visibility => "visibility",
            LumpId::LightArray => "lightarray",
        }
    }
}

/// Deferred byte generator for one lump.
pub trait LumpProvider {
    fn lump_id(&self) -> LumpId;

    /// Write the lump's current bytes.
    fn write_to(&self, writer: &mut dyn Write) -> Result<()>;

    /// Size `write_to` would produce right now, if known without encoding.
    fn size_hint(&self) -> Option<usize> {
        None
    }

    /// Encode into a fresh buffer.
    fn generate(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.size_hint().unwrap_or(0));
        self.write_to(&mut buf)?;
        Ok(buf)
    }
}

pub type LumpProviderPtr = Rc<dyn LumpProvider>;

/// Registration point keyed by lump, owned by the container writer.
pub trait ProviderSink {
    /// Install `provider` for `id`, returning the provider it replaces.
    fn install(&mut self, id: LumpId, provider: LumpProviderPtr) -> Option<LumpProviderPtr>;
}

/// In-memory provider registry.
#[derive(Default)]
pub struct ProviderTable {
    providers: BTreeMap<LumpId, LumpProviderPtr>,
}

impl ProviderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: LumpId) -> Option<&LumpProviderPtr> {
        self.providers.get(&id)
    }

    pub fn contains(&self, id: LumpId) -> bool {
        self.providers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn remove(&mut self, id: LumpId) -> Option<LumpProviderPtr> {
        self.providers.remove(&id)
    }

    /// Invoke the provider for `id`. `Ok(None)` if none is registered.
    pub fn generate(&self, id: LumpId) -> Result<Option<Vec<u8>>> {
        match self.providers.get(&id) {
            Some(provider) => provider.generate().map(Some),
            None => Ok(None),
        }
    }
}

impl ProviderSink for ProviderTable {
    fn install(&mut self, id: LumpId, provider: LumpProviderPtr) -> Option<LumpProviderPtr> {
        if provider.lump_id() != id {
            tracing::warn!(
                "provider for lump '{}' installed under '{}'",
                provider.lump_id().name(),
                id.name()
            );
        }
        self.providers.insert(id, provider)
    }
}
