mod load;
mod memory;
mod save;

use crate::sim::game::{GameKey, GameState};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use memory::MemoryStore;

pub const SAVE_DIR: &str = "saves";
const SAVE_EXTENSION: &str = "ron";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("no saved game")]
    NotFound,
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode save: {0}")]
    Encode(#[from] ron::Error),
    #[error("failed to decode save: {0}")]
    Decode(#[from] ron::error::SpannedError),
}

/// Durable home of game states. `save` is an idempotent upsert per key.
pub trait GameStore: Send + Sync {
    fn load(&self, key: &GameKey) -> Result<GameState, PersistError>;
    fn save(&self, state: &GameState) -> Result<(), PersistError>;
}

#[derive(Debug, Clone)]
pub struct RonStore {
    root: PathBuf,
}

impl RonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &GameKey) -> PathBuf {
        self.root
            .join(hex_component(&key.user_id))
            .join(hex_component(&key.game_id))
            .with_extension(SAVE_EXTENSION)
    }
}

impl GameStore for RonStore {
    fn load(&self, key: &GameKey) -> Result<GameState, PersistError> {
        load::load_game(&self.path_for(key), key)
    }

    fn save(&self, state: &GameState) -> Result<(), PersistError> {
        save::save_game(&self.path_for(&state.key), state)
    }
}

// Ids are caller-supplied; hex keeps them from escaping the root or colliding
// once joined into a path.
fn hex_component(raw: &str) -> String {
    if raw.is_empty() {
        return "_".to_string();
    }
    raw.bytes().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::miners::MinerClass;

    #[test]
    fn missing_save_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RonStore::new(dir.path());
        let result = store.load(&GameKey::new("nobody", "none"));
        assert!(matches!(result, Err(PersistError::NotFound)));
    }

    #[test]
    fn saved_game_loads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RonStore::new(dir.path());
        let key = GameKey::new("alice", "main");
        let mut state = GameState::fresh(key.clone(), 500);
        state.balance = 77;
        state.add_equipment("3");
        let miner = state.add_miner(MinerClass::Normal, 500);

        store.save(&state).expect("first save");
        state.balance = 78;
        store.save(&state).expect("save is an upsert");

        let loaded = store.load(&key).expect("load");
        assert_eq!(loaded.key, key);
        assert_eq!(loaded.balance, 78);
        assert_eq!(loaded.last_update_at, 500);
        assert!(loaded.owns_equipment("3"));
        assert_eq!(loaded.miners.get(&miner), state.miners.get(&miner));
        assert!(!loaded.is_retired());
    }

    #[test]
    fn path_components_cannot_escape_root() {
        let store = RonStore::new("/data");
        let path = store.path_for(&GameKey::new("../etc", "passwd"));
        assert!(path.starts_with("/data"));
        assert_ne!(
            store.path_for(&GameKey::new("a/b", "c")),
            store.path_for(&GameKey::new("a", "b/c"))
        );
    }

    #[test]
    fn corrupt_save_is_a_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RonStore::new(dir.path());
        let key = GameKey::new("bob", "g");
        let path = store.path_for(&key);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, "not ron at all (").expect("write");

        assert!(matches!(store.load(&key), Err(PersistError::Decode(_))));
    }
}
