use super::PersistError;
use crate::sim::game::{GameKey, GameState};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub fn load_game(path: &Path, key: &GameKey) -> Result<GameState, PersistError> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let mut state: GameState = ron::from_str(&content)?;
            state.key = key.clone();
            Ok(state)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Err(PersistError::NotFound),
        Err(err) => Err(err.into()),
    }
}
