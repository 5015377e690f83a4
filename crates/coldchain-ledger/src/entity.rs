//! # Entity Registry
//!
//! Participants of the cold chain, keyed by address. An entity's mode is
//! fixed at registration; entities are never removed.

use std::collections::BTreeMap;

use coldchain_core::{Address, LedgerError, Mode, RecordKind};
use serde::{Deserialize, Serialize};

/// A registered participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    /// The participant's address.
    pub id: Address,
    /// The role the participant was registered with.
    pub mode: Mode,
}

impl Entity {
    /// Create an entity record.
    pub fn new(id: Address, mode: Mode) -> Self {
        Self { id, mode }
    }
}

/// Address-keyed table of entities.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<Address, Entity>,
}

impl EntityRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` with `mode`.
    ///
    /// Fails with `DuplicateEntity` if the address is already registered.
    pub fn add(&mut self, id: Address, mode: Mode) -> Result<Entity, LedgerError> {
        if self.entities.contains_key(&id) {
            return Err(LedgerError::DuplicateEntity { id });
        }
        let entity = Entity::new(id, mode);
        self.entities.insert(id, entity);
        Ok(entity)
    }

    /// Look up an entity.
    pub fn get(&self, id: &Address) -> Result<Entity, LedgerError> {
        self.entities
            .get(id)
            .copied()
            .ok_or_else(|| LedgerError::not_found(RecordKind::Entity, id))
    }

    /// Registered entities in address order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
