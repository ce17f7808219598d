//! Persistence collaborator
//!
//! The engine only needs versioned reads and an all-or-nothing commit over a
//! set of player records. Anything that can offer those (a SQL table with a
//! version column, a KV store with CAS) can back the engine.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::models::{PlayerId, PlayerRecord};

/// A value together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

impl<T> Versioned<T> {
    pub fn new(version: u64, value: T) -> Self {
        Self { version, value }
    }
}

pub trait GameStore: Send + Sync {
    /// Reserve a fresh player id.
    fn next_player_id(&self) -> Result<PlayerId, StoreError>;

    fn insert_player(&self, record: PlayerRecord) -> Result<(), StoreError>;

    fn load(&self, id: PlayerId) -> Result<Versioned<PlayerRecord>, StoreError>;

    /// Consistent snapshot of every player, in ascending id order.
    fn load_all(&self) -> Result<Vec<PlayerRecord>, StoreError>;

    /// Write every record in `writes` if, for each one, the stored version
    /// still equals `version`. Otherwise write nothing and return
    /// [`StoreError::Conflict`]. Committed records get `version + 1`.
    ///
    /// Implementations must acquire records in ascending [`PlayerId`] order.
    fn commit(&self, writes: Vec<Versioned<PlayerRecord>>) -> Result<(), StoreError>;
}
