use super::catalog::{self, CatalogEntry};
use super::miners::{Miner, MinerClass};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Passive income per second every game earns with nothing bought.
pub const BASE_INCOME_RATE: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameKey {
    pub user_id: String,
    pub game_id: String,
}

impl GameKey {
    pub fn new(user_id: impl Into<String>, game_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            game_id: game_id.into(),
        }
    }
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.game_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    pub name: String,
    pub own: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub key: GameKey,
    pub balance: u64,
    pub income_per_sec: u64,
    pub last_update_at: i64,
    #[serde(default)]
    pub miners: BTreeMap<Uuid, Miner>,
    #[serde(default = "default_equipments")]
    pub equipments: Vec<Ownership>,
    #[serde(default = "default_upgrades")]
    pub upgrades: Vec<Ownership>,
    /// Set once the state has been flushed and dropped from memory; holders of
    /// a stale pointer must not mutate it afterwards.
    #[serde(skip)]
    retired: bool,
}

fn unowned(entries: &[CatalogEntry]) -> Vec<Ownership> {
    entries
        .iter()
        .map(|entry| Ownership {
            name: entry.name.to_string(),
            own: false,
        })
        .collect()
}

fn default_equipments() -> Vec<Ownership> {
    unowned(&catalog::EQUIPMENT)
}

fn default_upgrades() -> Vec<Ownership> {
    unowned(&catalog::UPGRADES)
}

impl GameState {
    pub fn fresh(key: GameKey, now: i64) -> Self {
        Self {
            key,
            balance: 0,
            income_per_sec: BASE_INCOME_RATE,
            last_update_at: now,
            miners: BTreeMap::new(),
            equipments: default_equipments(),
            upgrades: default_upgrades(),
            retired: false,
        }
    }

    /// Appends catalog entries a save predates so every current item can be
    /// owned. Unknown saved entries are left alone.
    pub fn reconcile_catalogs(&mut self) {
        for (owned, entries) in [
            (&mut self.equipments, &catalog::EQUIPMENT),
            (&mut self.upgrades, &catalog::UPGRADES),
        ] {
            for entry in entries.iter() {
                if !owned.iter().any(|item| item.name == entry.name) {
                    owned.push(Ownership {
                        name: entry.name.to_string(),
                        own: false,
                    });
                }
            }
        }
    }

    pub fn add_miner(&mut self, class: MinerClass, now: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.miners.insert(id, Miner::hire(class, now));
        id
    }

    pub fn add_equipment(&mut self, name: &str) -> bool {
        set_owned(&mut self.equipments, name)
    }

    pub fn add_upgrade(&mut self, name: &str) -> bool {
        set_owned(&mut self.upgrades, name)
    }

    pub fn owns_equipment(&self, name: &str) -> bool {
        is_owned(&self.equipments, name)
    }

    pub fn owns_upgrade(&self, name: &str) -> bool {
        is_owned(&self.upgrades, name)
    }

    pub fn max_upgrade(&self) -> Option<&str> {
        self.upgrades
            .iter()
            .filter(|item| item.own)
            .max_by_key(|item| item.name.parse::<u32>().unwrap_or(0))
            .map(|item| item.name.as_str())
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub(crate) fn retire(&mut self) {
        self.retired = true;
    }
}

fn set_owned(items: &mut [Ownership], name: &str) -> bool {
    match items.iter_mut().find(|item| item.name == name) {
        Some(item) => {
            item.own = true;
            true
        }
        None => false,
    }
}

fn is_owned(items: &[Ownership], name: &str) -> bool {
    items.iter().any(|item| item.name == name && item.own)
}
