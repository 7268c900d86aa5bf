use super::{read, write};
use crate::sim::game::GameKey;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;

#[derive(Debug)]
pub struct SessionTracker {
    last_seen: RwLock<HashMap<GameKey, i64>>,
    timeout: i64,
}

impl SessionTracker {
    pub fn new(timeout_secs: i64) -> Self {
        Self {
            last_seen: RwLock::new(HashMap::new()),
            timeout: timeout_secs,
        }
    }

    pub fn mark_active(&self, key: &GameKey, now: i64) {
        let mut sessions = write(&self.last_seen);
        match sessions.get_mut(key) {
            Some(seen) => *seen = (*seen).max(now),
            None => {
                sessions.insert(key.clone(), now);
            }
        }
    }

    pub fn is_active(&self, key: &GameKey, now: i64) -> bool {
        read(&self.last_seen)
            .get(key)
            .is_some_and(|seen| now.saturating_sub(*seen) <= self.timeout)
    }

    /// Removes and returns every session idle for at least the timeout.
    /// Each key is handed out once; whoever receives it owns the eviction.
    pub fn check_expired(&self, now: i64) -> Vec<GameKey> {
        let mut sessions = write(&self.last_seen);
        let mut expired = Vec::new();
        sessions.retain(|key, seen| {
            if now.saturating_sub(*seen) >= self.timeout {
                expired.push(key.clone());
                false
            } else {
                true
            }
        });
        drop(sessions);
        if !expired.is_empty() {
            info!(count = expired.len(), "expired sessions cleaned");
        }
        expired
    }

    /// Puts back a claimed key as already expired so the next sweep retries
    /// it. A newer record from fresh activity wins.
    pub fn requeue(&self, key: &GameKey, now: i64) {
        write(&self.last_seen)
            .entry(key.clone())
            .or_insert(now.saturating_sub(self.timeout));
    }

    pub fn len(&self) -> usize {
        read(&self.last_seen).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> SessionTracker {
        SessionTracker::new(60)
    }

    #[test]
    fn unknown_key_is_inactive() {
        assert!(!tracker().is_active(&GameKey::new("a", "b"), 0));
    }

    #[test]
    fn expired_key_is_claimed_exactly_once() {
        let sessions = tracker();
        let key = GameKey::new("alice", "main");
        sessions.mark_active(&key, 1_000);
        assert!(sessions.is_active(&key, 1_059));
        assert!(sessions.check_expired(1_059).is_empty());

        let expired = sessions.check_expired(1_061);
        assert_eq!(expired, vec![key.clone()]);
        assert!(sessions.check_expired(1_062).is_empty());
        assert!(!sessions.is_active(&key, 1_062));
        assert!(sessions.is_empty());
    }

    #[test]
    fn activity_refreshes_last_seen() {
        let sessions = tracker();
        let key = GameKey::new("alice", "main");
        sessions.mark_active(&key, 0);
        sessions.mark_active(&key, 50);
        assert!(sessions.check_expired(100).is_empty());
        assert!(sessions.is_active(&key, 100));
    }

    #[test]
    fn very_long_timeout_keeps_sessions_alive() {
        let sessions = SessionTracker::new(i64::MAX);
        let key = GameKey::new("alice", "main");
        sessions.mark_active(&key, 1_000);

        assert!(sessions.is_active(&key, 1_000_000_000));
        assert!(sessions.check_expired(1_000_000_000).is_empty());
        sessions.requeue(&key, -5);
        assert!(sessions.is_active(&key, 2_000));
    }

    #[test]
    fn requeued_key_expires_on_next_sweep_unless_reactivated() {
        let sessions = tracker();
        let idle = GameKey::new("idle", "g");
        let back = GameKey::new("back", "g");

        sessions.requeue(&idle, 500);
        sessions.mark_active(&back, 500);
        sessions.requeue(&back, 500);

        assert_eq!(sessions.check_expired(500), vec![idle]);
        assert!(sessions.is_active(&back, 500));
    }
}
