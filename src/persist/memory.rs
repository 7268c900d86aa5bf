use super::{GameStore, PersistError};
use crate::sim::game::{GameKey, GameState};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    games: Mutex<HashMap<GameKey, GameState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.games.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GameStore for MemoryStore {
    fn load(&self, key: &GameKey) -> Result<GameState, PersistError> {
        self.games
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .ok_or(PersistError::NotFound)
    }

    fn save(&self, state: &GameState) -> Result<(), PersistError> {
        self.games
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(state.key.clone(), state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_copies_by_key() {
        let store = MemoryStore::new();
        let key = GameKey::new("alice", "main");
        assert!(matches!(store.load(&key), Err(PersistError::NotFound)));

        let mut state = GameState::fresh(key.clone(), 0);
        store.save(&state).expect("save");
        state.balance = 99;

        assert_eq!(store.load(&key).expect("load").balance, 0);
        assert_eq!(store.len(), 1);
    }
}
