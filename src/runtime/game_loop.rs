use super::{SharedGame, read, write};
use crate::sim::game::GameKey;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
pub struct GameLoop {
    games: RwLock<HashMap<GameKey, SharedGame>>,
}

impl GameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, key: &GameKey, game: SharedGame) {
        write(&self.games).insert(key.clone(), game);
        debug!(user_id = %key.user_id, game_id = %key.game_id, "game registered in loop");
    }

    pub fn unregister(&self, key: &GameKey) -> bool {
        let removed = write(&self.games).remove(key).is_some();
        if removed {
            debug!(user_id = %key.user_id, game_id = %key.game_id, "game unregistered from loop");
        }
        removed
    }

    pub fn is_registered(&self, key: &GameKey) -> bool {
        read(&self.games).contains_key(key)
    }

    // Only the registry's read lock is held; each game is locked on its own.
    pub fn tick(&self, now: i64) -> usize {
        let games = read(&self.games);
        games
            .values()
            .filter(|game| write(game).tick(now))
            .count()
    }

    pub fn len(&self) -> usize {
        read(&self.games).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
