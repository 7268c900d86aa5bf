use super::catalog;
use super::game::{BASE_INCOME_RATE, GameState, Ownership};
use crate::error::GameError;

impl GameState {
    /// Income earned over the half-open interval `[from, to)`, scaled once by
    /// the rise and floored.
    pub fn calc_income(&self, from: i64, to: i64) -> u64 {
        if to <= from {
            return 0;
        }
        let passive = BASE_INCOME_RATE * (to - from) as u64;
        let mined: u64 = self.miners.values().map(|miner| miner.income(from, to)).sum();
        let scaled = u128::from(passive + mined) * u128::from(self.rise_percent()) / 100;
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }

    pub fn rise_percent(&self) -> u64 {
        100 + owned_bonus(&self.equipments, catalog::equipment)
            + owned_bonus(&self.upgrades, catalog::upgrade)
    }

    pub fn tick(&mut self, now: i64) -> bool {
        if now <= self.last_update_at {
            return false;
        }
        let earned = self.calc_income(self.last_update_at, now);
        self.balance = self.balance.saturating_add(earned);
        self.income_per_sec = self.calc_income(now - 1, now);
        self.last_update_at = now;
        self.miners.retain(|_, miner| !miner.is_expired(now));
        true
    }

    pub fn spend_balance(&mut self, price: u64) -> Result<(), GameError> {
        if self.balance < price {
            return Err(GameError::InsufficientBalance {
                price,
                balance: self.balance,
            });
        }
        self.balance -= price;
        Ok(())
    }
}

fn owned_bonus(
    items: &[Ownership],
    lookup: fn(&str) -> Option<&'static catalog::CatalogEntry>,
) -> u64 {
    items
        .iter()
        .filter(|item| item.own)
        .filter_map(|item| lookup(&item.name))
        .map(|entry| entry.bonus_percent)
        .sum()
}
