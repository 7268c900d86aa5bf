use super::game_loop::GameLoop;
use super::metrics::PurchaseMetrics;
use super::sessions::SessionTracker;
use super::{SharedGame, read, write};
use crate::error::{GameError, PurchaseRejection};
use crate::persist::{GameStore, PersistError};
use crate::sim::catalog::{Item, ItemKind};
use crate::sim::game::{GameKey, GameState};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub balance: u64,
    pub income_per_sec: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub evicted: usize,
    /// Claimed keys that were no longer resident or had come back to life.
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub saved: usize,
    pub failed: usize,
}

pub struct GameManager {
    store: Arc<dyn GameStore>,
    game_loop: Arc<GameLoop>,
    sessions: Arc<SessionTracker>,
    metrics: PurchaseMetrics,
    games: RwLock<HashMap<GameKey, SharedGame>>,
    grace_secs: i64,
}

impl GameManager {
    pub fn new(
        store: Arc<dyn GameStore>,
        game_loop: Arc<GameLoop>,
        sessions: Arc<SessionTracker>,
        metrics: PurchaseMetrics,
        grace_secs: i64,
    ) -> Self {
        Self {
            store,
            game_loop,
            sessions,
            metrics,
            games: RwLock::new(HashMap::new()),
            grace_secs,
        }
    }

    pub fn enter_game(&self, key: &GameKey, now: i64) -> Result<SharedGame, GameError> {
        if let Some(game) = self.resident(key) {
            // Marked before the retired check: a sweep decides under the state
            // lock, so it either sees this activity or has already retired.
            self.sessions.mark_active(key, now);
            if !read(&game).is_retired() {
                return Ok(game);
            }
        }

        let mut state = match self.store.load(key) {
            Ok(mut state) => {
                state.reconcile_catalogs();
                state
            }
            Err(PersistError::NotFound) => {
                let state = GameState::fresh(key.clone(), now);
                if let Err(err) = self.store.save(&state) {
                    warn!(user_id = %key.user_id, game_id = %key.game_id, %err, "failed to persist new game");
                }
                info!(user_id = %key.user_id, game_id = %key.game_id, "new game created");
                state
            }
            Err(err) => return Err(err.into()),
        };

        // Coming back after a long absence restarts the clock instead of
        // paying out the whole gap in one tick.
        if now - state.last_update_at > self.grace_secs {
            state.last_update_at = now;
        }

        let game = match write(&self.games).entry(key.clone()) {
            Entry::Occupied(mut existing) => {
                if read(existing.get()).is_retired() {
                    existing.insert(Arc::new(RwLock::new(state)));
                }
                existing.get().clone()
            }
            Entry::Vacant(slot) => slot.insert(Arc::new(RwLock::new(state))).clone(),
        };
        self.game_loop.register(key, game.clone());
        self.sessions.mark_active(key, now);

        info!(user_id = %key.user_id, game_id = %key.game_id, "game entered");
        Ok(game)
    }

    pub fn buy(
        &self,
        key: &GameKey,
        kind: ItemKind,
        name: &str,
        now: i64,
    ) -> Result<(), PurchaseRejection> {
        let outcome = self.try_buy(key, kind, name, now);
        self.metrics.record(&outcome);
        outcome
    }

    fn try_buy(
        &self,
        key: &GameKey,
        kind: ItemKind,
        name: &str,
        now: i64,
    ) -> Result<(), PurchaseRejection> {
        let game = self.live_game(key, now).map_err(PurchaseRejection::bare)?;
        let item = Item::resolve(kind, name).ok_or_else(|| {
            PurchaseRejection::bare(GameError::UnknownItem {
                kind,
                name: name.to_string(),
            })
        })?;

        let mut state = write(&game);
        if state.is_retired() {
            return Err(PurchaseRejection::bare(GameError::GameNotFound));
        }
        let already_owned = match item {
            Item::Miner(_) => false,
            Item::Equipment(entry) => state.owns_equipment(entry.name),
            Item::Upgrade(entry) => state.owns_upgrade(entry.name),
        };
        if already_owned {
            let error = GameError::AlreadyOwned {
                kind,
                name: item.name().to_string(),
            };
            return Err(PurchaseRejection::with_card(item.card(), error));
        }
        if let Err(error) = state.spend_balance(item.price()) {
            return Err(PurchaseRejection::with_card(item.card(), error));
        }
        match item {
            Item::Miner(class) => {
                state.add_miner(class, now);
            }
            Item::Equipment(entry) => {
                state.add_equipment(entry.name);
            }
            Item::Upgrade(entry) => {
                state.add_upgrade(entry.name);
            }
        }
        debug!(user_id = %key.user_id, game_id = %key.game_id, %kind, name, "item bought");
        Ok(())
    }

    pub fn hud(&self, key: &GameKey, now: i64) -> Result<Hud, GameError> {
        let game = self.enter_game(key, now)?;
        let hud = {
            let state = read(&game);
            Hud {
                balance: state.balance,
                income_per_sec: state.income_per_sec,
            }
        };
        self.sessions.mark_active(key, now);
        Ok(hud)
    }

    pub fn current_upgrade(&self, key: &GameKey, now: i64) -> Result<Option<String>, GameError> {
        let game = self.live_game(key, now)?;
        let state = read(&game);
        Ok(state.max_upgrade().map(str::to_string))
    }

    /// Flushes and evicts every game whose session timed out. A game whose
    /// save fails stays resident and is retried on the next sweep.
    pub fn sweep_expired_sessions(&self, now: i64) -> SweepReport {
        let mut report = SweepReport::default();
        for key in self.sessions.check_expired(now) {
            let Some(game) = self.resident(&key) else {
                report.skipped += 1;
                continue;
            };

            // Out of the loop first: the loop holds its registry while it
            // waits on game locks, so it must not be touched under one.
            self.game_loop.unregister(&key);
            let evicted = {
                let mut state = write(&game);
                if self.sessions.is_active(&key, now) {
                    None
                } else {
                    match self.store.save(&state) {
                        Ok(()) => {
                            state.retire();
                            Some(Ok(()))
                        }
                        Err(err) => Some(Err(err)),
                    }
                }
            };

            match evicted {
                Some(Ok(())) => {
                    // The cache lock is only ever taken before a state lock.
                    self.forget(&key, &game);
                    report.evicted += 1;
                    debug!(user_id = %key.user_id, game_id = %key.game_id, "game evicted");
                }
                Some(Err(err)) => {
                    report.failed += 1;
                    warn!(user_id = %key.user_id, game_id = %key.game_id, %err, "failed to save expired game");
                    self.game_loop.register(&key, game);
                    self.sessions.requeue(&key, now);
                }
                None => {
                    report.skipped += 1;
                    self.game_loop.register(&key, game);
                }
            }
        }
        if report.evicted > 0 || report.failed > 0 {
            info!(
                evicted = report.evicted,
                failed = report.failed,
                "expired sessions swept"
            );
        }
        report
    }

    pub fn flush_all(&self) -> FlushReport {
        let games: Vec<(GameKey, SharedGame)> = read(&self.games)
            .iter()
            .map(|(key, game)| (key.clone(), game.clone()))
            .collect();

        let mut report = FlushReport::default();
        for (key, game) in games {
            let state = read(&game);
            if state.is_retired() {
                continue;
            }
            match self.store.save(&state) {
                Ok(()) => report.saved += 1,
                Err(err) => {
                    report.failed += 1;
                    warn!(user_id = %key.user_id, game_id = %key.game_id, %err, "failed to save game");
                }
            }
        }
        if report.saved > 0 || report.failed > 0 {
            info!(saved = report.saved, failed = report.failed, "saved all games");
        }
        report
    }

    pub fn is_resident(&self, key: &GameKey) -> bool {
        read(&self.games).contains_key(key)
    }

    pub fn resident_count(&self) -> usize {
        read(&self.games).len()
    }

    fn resident(&self, key: &GameKey) -> Option<SharedGame> {
        read(&self.games).get(key).cloned()
    }

    fn live_game(&self, key: &GameKey, now: i64) -> Result<SharedGame, GameError> {
        if !self.sessions.is_active(key, now) {
            return Err(GameError::SessionNotActive);
        }
        self.resident(key).ok_or(GameError::GameNotFound)
    }

    fn forget(&self, key: &GameKey, game: &SharedGame) {
        let mut games = write(&self.games);
        if games.get(key).is_some_and(|current| Arc::ptr_eq(current, game)) {
            games.remove(key);
        }
    }
}
