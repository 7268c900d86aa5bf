use super::PersistError;
use crate::sim::game::GameState;
use ron::ser::PrettyConfig;
use std::fs;
use std::path::Path;

pub fn save_game(path: &Path, state: &GameState) -> Result<(), PersistError> {
    let pretty = PrettyConfig::new();
    let serialized = ron::ser::to_string_pretty(state, pretty)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    // Write beside the target and rename so a crash never leaves half a save.
    let staging = path.with_extension("ron.tmp");
    fs::write(&staging, serialized)?;
    fs::rename(&staging, path)?;
    Ok(())
}
