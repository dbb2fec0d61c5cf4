// src/storage/memory.rs
use parking_lot::Mutex;

use super::{StateStore, StorageResult};

/// In-memory [`StateStore`] substitute.
///
/// Tests and embedded callers inject this instead of the file-backed store
/// to run the engine without touching durable files.
pub struct MemoryStore<T> {
    slot: Mutex<Option<T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send> StateStore<T> for MemoryStore<T> {
    fn load(&self) -> StorageResult<Option<T>> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, state: &T) -> StorageResult<()> {
        *self.slot.lock() = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_keeps_last_save() {
        let store = MemoryStore::new();
        assert_eq!(StateStore::<u32>::load(&store).unwrap(), None);

        store.save(&1u32).unwrap();
        store.save(&2u32).unwrap();
        assert_eq!(store.load().unwrap(), Some(2));
    }
}
