use super::miners::MinerClass;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Miner,
    Equipment,
    Upgrade,
}

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [ItemKind::Miner, ItemKind::Equipment, ItemKind::Upgrade];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Miner => "miner",
            ItemKind::Equipment => "equipment",
            ItemKind::Upgrade => "upgrade",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown item kind {0}")]
pub struct UnknownItemKind(pub String);

impl FromStr for ItemKind {
    type Err = UnknownItemKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownItemKind(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub price: u64,
    pub bonus_percent: u64,
}

pub static EQUIPMENT: [CatalogEntry; 3] = [
    CatalogEntry {
        name: "1",
        price: 450,
        bonus_percent: 110,
    },
    CatalogEntry {
        name: "2",
        price: 450,
        bonus_percent: 130,
    },
    CatalogEntry {
        name: "3",
        price: 450,
        bonus_percent: 200,
    },
];

pub static UPGRADES: [CatalogEntry; 3] = [
    CatalogEntry {
        name: "1",
        price: 450,
        bonus_percent: 200,
    },
    CatalogEntry {
        name: "2",
        price: 450,
        bonus_percent: 200,
    },
    CatalogEntry {
        name: "3",
        price: 450,
        bonus_percent: 200,
    },
];

pub fn equipment(name: &str) -> Option<&'static CatalogEntry> {
    EQUIPMENT.iter().find(|entry| entry.name == name)
}

pub fn upgrade(name: &str) -> Option<&'static CatalogEntry> {
    UPGRADES.iter().find(|entry| entry.name == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    Miner(MinerClass),
    Equipment(&'static CatalogEntry),
    Upgrade(&'static CatalogEntry),
}

impl Item {
    pub fn resolve(kind: ItemKind, name: &str) -> Option<Self> {
        match kind {
            ItemKind::Miner => name.parse().ok().map(Item::Miner),
            ItemKind::Equipment => equipment(name).map(Item::Equipment),
            ItemKind::Upgrade => upgrade(name).map(Item::Upgrade),
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Miner(_) => ItemKind::Miner,
            Item::Equipment(_) => ItemKind::Equipment,
            Item::Upgrade(_) => ItemKind::Upgrade,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Item::Miner(class) => class.as_str(),
            Item::Equipment(entry) | Item::Upgrade(entry) => entry.name,
        }
    }

    pub fn price(&self) -> u64 {
        match self {
            Item::Miner(class) => class.spec().price,
            Item::Equipment(entry) | Item::Upgrade(entry) => entry.price,
        }
    }

    pub fn card(&self) -> ShopCard {
        let kind = self.kind();
        let name = self.name();
        let id = format!("{kind}-{name}");
        let (title, income, duration) = match self {
            Item::Miner(class) => {
                let spec = class.spec();
                (
                    spec.title.to_string(),
                    format!("+{}.0/sec", spec.power),
                    Some(format!("{} sec", spec.lifetime)),
                )
            }
            Item::Equipment(entry) | Item::Upgrade(entry) => {
                (entry.name.to_string(), format!("+{}%", entry.bonus_percent), None)
            }
        };
        ShopCard {
            icon: format!("/public/icons/shop/{id}.png"),
            id,
            title,
            income,
            duration,
            price: self.price(),
            name: name.to_string(),
            kind,
            disabled: false,
            reason: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopCard {
    pub id: String,
    pub title: String,
    pub income: String,
    pub duration: Option<String>,
    pub price: u64,
    pub name: String,
    pub kind: ItemKind,
    pub icon: String,
    pub disabled: bool,
    pub reason: Option<String>,
}

impl ShopCard {
    pub fn rejected(mut self, reason: impl Into<String>) -> Self {
        self.disabled = true;
        self.reason = Some(reason.into());
        self
    }
}

pub fn shop_cards_for(kind: ItemKind) -> Vec<ShopCard> {
    let items: Vec<Item> = match kind {
        ItemKind::Miner => MinerClass::ALL.into_iter().map(Item::Miner).collect(),
        ItemKind::Equipment => EQUIPMENT.iter().map(Item::Equipment).collect(),
        ItemKind::Upgrade => UPGRADES.iter().map(Item::Upgrade).collect(),
    };
    let mut cards: Vec<ShopCard> = items.iter().map(Item::card).collect();
    cards.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.name.cmp(&b.name)));
    cards
}

pub fn shop_card_for(kind: ItemKind, name: &str) -> Option<ShopCard> {
    Item::resolve(kind, name).map(|item| item.card())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miner_cards_are_sorted_by_price() {
        let cards = shop_cards_for(ItemKind::Miner);
        let prices: Vec<u64> = cards.iter().map(|card| card.price).collect();
        assert_eq!(prices, vec![5, 50, 450]);
        assert_eq!(cards[0].id, "miner-small");
        assert_eq!(cards[0].icon, "/public/icons/shop/miner-small.png");
        assert_eq!(cards[0].duration.as_deref(), Some("30 sec"));
    }

    #[test]
    fn looks_up_single_card() {
        let card = shop_card_for(ItemKind::Equipment, "2").expect("equipment 2 exists");
        assert_eq!(card.income, "+130%");
        assert_eq!(card.kind, ItemKind::Equipment);
        assert!(shop_card_for(ItemKind::Upgrade, "9").is_none());
    }

    #[test]
    fn rejected_card_carries_reason() {
        let card = shop_card_for(ItemKind::Upgrade, "1")
            .expect("upgrade 1 exists")
            .rejected("already owned");
        assert!(card.disabled);
        assert_eq!(card.reason.as_deref(), Some("already owned"));
    }

    #[test]
    fn item_kind_round_trips_through_text() {
        for kind in ItemKind::ALL {
            assert_eq!(kind.to_string().parse::<ItemKind>().ok(), Some(kind));
        }
        assert!("gadget".parse::<ItemKind>().is_err());
    }
}
