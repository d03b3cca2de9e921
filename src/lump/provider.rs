//! Entities-lump provider bound to the live entity store.

use std::io::Write;

use crate::error::{EntityError, Result};
use crate::lump::codec::{EntityEncoder, TextEntityCodec};
use crate::lump::{LumpId, LumpProvider};
use crate::store::SharedStore;

/// Encodes the store's entities at invocation time, not at creation time.
pub struct EntityLumpProvider<C: EntityEncoder = TextEntityCodec> {
    store: SharedStore,
    codec: C,
}

impl EntityLumpProvider<TextEntityCodec> {
    pub fn new(store: SharedStore) -> Self {
        Self::with_codec(store, TextEntityCodec)
    }
}

impl<C: EntityEncoder> EntityLumpProvider<C> {
    pub fn with_codec(store: SharedStore, codec: C) -> Self {
        Self { store, codec }
    }
}

impl<C: EntityEncoder> LumpProvider for EntityLumpProvider<C> {
    fn lump_id(&self) -> LumpId {
        LumpId::Entities
    }

    fn write_to(&self, writer: &mut dyn Write) -> Result<()> {
        let store = self.store.try_borrow().map_err(|_| EntityError::StoreBusy)?;
        tracing::debug!("encoding entities lump: {} entities", store.len());
        self.codec.encode(store.entities(), writer)
    }

    fn size_hint(&self) -> Option<usize> {
        self.codec.encoded_size(self.store.try_borrow().ok()?.entities())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::store::{Entity, EntityStore};

    #[test]
    fn test_reads_store_at_invocation() {
        let store = EntityStore::new(vec![Entity::from_pairs([("classname", "worldspawn")])]).into_shared();
        let provider = EntityLumpProvider::new(Rc::clone(&store));
        let before = provider.generate().unwrap();

        store.borrow_mut().set_value(0, "message", "Edited").unwrap();
        let after = provider.generate().unwrap();

        assert_ne!(before, after);
        assert_eq!(
            after,
            b"{\n\"classname\" \"worldspawn\"\n\"message\" \"Edited\"\n}\n\0".to_vec()
        );
        assert_eq!(provider.size_hint(), Some(after.len()));
    }

    #[test]
    fn test_refuses_while_store_mutably_borrowed() {
        let store = EntityStore::new(vec![Entity::from_pairs([("classname", "worldspawn")])]).into_shared();
        let provider = EntityLumpProvider::new(Rc::clone(&store));
        {
            let _writer = store.borrow_mut();
            assert!(matches!(provider.generate(), Err(EntityError::StoreBusy)));
            assert_eq!(provider.size_hint(), None);
        }
        assert!(provider.generate().is_ok());
    }

    #[test]
    fn test_custom_codec() {
        struct CountCodec;
        impl EntityEncoder for CountCodec {
            fn encode(&self, entities: &[Entity], writer: &mut dyn Write) -> Result<()> {
                writer.write_all(entities.len().to_string().as_bytes())?;
                Ok(())
            }
        }

        let store = EntityStore::new(vec![Entity::new(), Entity::new()]).into_shared();
        let provider = EntityLumpProvider::with_codec(store, CountCodec);
        assert_eq!(provider.lump_id(), LumpId::Entities);
        assert_eq!(provider.generate().unwrap(), b"2");
        assert_eq!(provider.size_hint(), None);
    }
}
