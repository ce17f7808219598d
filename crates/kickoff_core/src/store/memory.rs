use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use super::{GameStore, Versioned};
use crate::error::StoreError;
use crate::models::{PlayerId, PlayerRecord};

type Slot = Arc<Mutex<Versioned<PlayerRecord>>>;

/// In-process store: one mutex per player record behind a map lock.
///
/// The map lock is only held to look up slots; record mutexes are always
/// taken in ascending id order, which is what keeps two overlapping commits
/// from deadlocking.
#[derive(Debug)]
pub struct MemoryStore {
    players: RwLock<BTreeMap<PlayerId, Slot>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { players: RwLock::new(BTreeMap::new()), next_id: AtomicU64::new(1) }
    }

    pub fn len(&self) -> usize {
        self.players.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slots(&self, ids: &[PlayerId]) -> Result<Vec<Slot>, StoreError> {
        let players = self.players.read().map_err(|_| StoreError::Poisoned)?;
        ids.iter()
            .map(|id| players.get(id).cloned().ok_or(StoreError::PlayerNotFound(*id)))
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(slot: &Slot) -> Result<MutexGuard<'_, Versioned<PlayerRecord>>, StoreError> {
    slot.lock().map_err(|_| StoreError::Poisoned)
}

impl GameStore for MemoryStore {
    fn next_player_id(&self) -> Result<PlayerId, StoreError> {
        Ok(PlayerId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    fn insert_player(&self, record: PlayerRecord) -> Result<(), StoreError> {
        let id = record.id();
        let mut players = self.players.write().map_err(|_| StoreError::Poisoned)?;
        if players.contains_key(&id) {
            return Err(StoreError::DuplicatePlayer(id));
        }
        players.insert(id, Arc::new(Mutex::new(Versioned::new(0, record))));
        log::debug!("Inserted player {}", id);
        Ok(())
    }

    fn load(&self, id: PlayerId) -> Result<Versioned<PlayerRecord>, StoreError> {
        let slot = self.slots(&[id])?.remove(0);
        let guard = lock(&slot)?;
        Ok(guard.clone())
    }

    fn load_all(&self) -> Result<Vec<PlayerRecord>, StoreError> {
        let slots: Vec<Slot> = {
            let players = self.players.read().map_err(|_| StoreError::Poisoned)?;
            players.values().cloned().collect()
        };

        // BTreeMap order is ascending id order, same as commit.
        let guards = slots.iter().map(lock).collect::<Result<Vec<_>, _>>()?;
        Ok(guards.iter().map(|g| g.value.clone()).collect())
    }

    fn commit(&self, mut writes: Vec<Versioned<PlayerRecord>>) -> Result<(), StoreError> {
        writes.sort_by_key(|w| w.value.id());
        let ids: Vec<PlayerId> = writes.iter().map(|w| w.value.id()).collect();
        if ids.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(StoreError::Conflict);
        }

        let slots = self.slots(&ids)?;
        let mut guards = slots.iter().map(lock).collect::<Result<Vec<_>, _>>()?;

        for (guard, write) in guards.iter().zip(&writes) {
            if guard.version != write.version {
                log::debug!(
                    "Commit conflict on player {}: read v{}, stored v{}",
                    write.value.id(),
                    write.version,
                    guard.version
                );
                return Err(StoreError::Conflict);
            }
        }

        for (guard, write) in guards.iter_mut().zip(writes) {
            **guard = Versioned::new(write.version + 1, write.value);
        }

        Ok(())
    }
}
