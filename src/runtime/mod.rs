pub mod game_loop;
pub mod manager;
pub mod metrics;
pub mod sessions;
pub mod tasks;

use crate::sim::game::GameState;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub type SharedGame = Arc<RwLock<GameState>>;

// Poisoned locks are taken over, not propagated.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
