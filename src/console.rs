use crate::runtime::manager::GameManager;
use crate::sim::catalog::{self, ItemKind};
use crate::sim::game::GameKey;
use thiserror::Error;

pub const USAGE: &str = "commands: enter <user> <game> | hud <user> <game> | \
buy <user> <game> <miner|equipment|upgrade> <name> | upgrade <user> <game> | \
shop <kind> | flush | sweep | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Enter(GameKey),
    Hud(GameKey),
    Buy {
        key: GameKey,
        kind: ItemKind,
        name: String,
    },
    Upgrade(GameKey),
    Shop(ItemKind),
    Flush,
    Sweep,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0}, try help")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0}")]
    Kind(String),
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, rest)) = words.split_first() else {
        return Err(CommandError::Empty);
    };
    match (verb, rest) {
        ("enter", [user, game]) => Ok(Command::Enter(GameKey::new(*user, *game))),
        ("enter", _) => Err(CommandError::Usage("enter <user> <game>")),
        ("hud", [user, game]) => Ok(Command::Hud(GameKey::new(*user, *game))),
        ("hud", _) => Err(CommandError::Usage("hud <user> <game>")),
        ("buy", [user, game, kind, name]) => Ok(Command::Buy {
            key: GameKey::new(*user, *game),
            kind: parse_kind(kind)?,
            name: (*name).to_string(),
        }),
        ("buy", _) => Err(CommandError::Usage("buy <user> <game> <kind> <name>")),
        ("upgrade", [user, game]) => Ok(Command::Upgrade(GameKey::new(*user, *game))),
        ("upgrade", _) => Err(CommandError::Usage("upgrade <user> <game>")),
        ("shop", [kind]) => Ok(Command::Shop(parse_kind(kind)?)),
        ("shop", _) => Err(CommandError::Usage("shop <kind>")),
        ("flush", []) => Ok(Command::Flush),
        ("sweep", []) => Ok(Command::Sweep),
        ("help", _) => Ok(Command::Help),
        ("quit" | "exit", []) => Ok(Command::Quit),
        (other, _) => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_kind(raw: &str) -> Result<ItemKind, CommandError> {
    raw.parse().map_err(|err: catalog::UnknownItemKind| CommandError::Kind(err.to_string()))
}

pub fn execute(manager: &GameManager, command: &Command, now: i64) -> String {
    match command {
        Command::Enter(key) => match manager.enter_game(key, now) {
            Ok(_) => format!("{key}: entered"),
            Err(err) => format!("{key}: {err}"),
        },
        Command::Hud(key) => match manager.hud(key, now) {
            Ok(hud) => format!(
                "{key}: balance {} (+{}/sec)",
                hud.balance, hud.income_per_sec
            ),
            Err(err) => format!("{key}: {err}"),
        },
        Command::Buy { key, kind, name } => match manager.buy(key, *kind, name, now) {
            Ok(()) => format!("{key}: bought {kind} {name}"),
            Err(rejection) => format!("{key}: {}", rejection.error),
        },
        Command::Upgrade(key) => match manager.current_upgrade(key, now) {
            Ok(Some(name)) => format!("{key}: upgrade {name}"),
            Ok(None) => format!("{key}: no upgrades"),
            Err(err) => format!("{key}: {err}"),
        },
        Command::Shop(kind) => catalog::shop_cards_for(*kind)
            .iter()
            .map(|card| {
                let duration = card.duration.as_deref().unwrap_or("-");
                format!(
                    "{:<16} {:<10} {:>6}  {:<10} {}",
                    card.id, card.title, card.price, card.income, duration
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Command::Flush => {
            let report = manager.flush_all();
            format!("flushed {} games ({} failed)", report.saved, report.failed)
        }
        Command::Sweep => {
            let report = manager.sweep_expired_sessions(now);
            format!(
                "evicted {} games ({} skipped, {} failed)",
                report.evicted, report.skipped, report.failed
            )
        }
        Command::Help => USAGE.to_string(),
        Command::Quit => "bye".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;
    use crate::runtime::game_loop::GameLoop;
    use crate::runtime::metrics::PurchaseMetrics;
    use crate::runtime::sessions::SessionTracker;
    use std::sync::Arc;

    #[test]
    fn parses_buy() {
        assert_eq!(
            parse_command("buy alice main miner small"),
            Ok(Command::Buy {
                key: GameKey::new("alice", "main"),
                kind: ItemKind::Miner,
                name: "small".to_string(),
            })
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert!(matches!(parse_command("enter alice"), Err(CommandError::Usage(_))));
        assert!(matches!(parse_command("shop robots"), Err(CommandError::Kind(_))));
        assert!(matches!(parse_command("dance"), Err(CommandError::Unknown(_))));
    }

    #[test]
    fn drives_a_session() {
        let manager = GameManager::new(
            Arc::new(MemoryStore::new()),
            Arc::new(GameLoop::new()),
            Arc::new(SessionTracker::new(60)),
            PurchaseMetrics::new(),
            5,
        );
        let key = GameKey::new("alice", "main");

        let reply = execute(&manager, &Command::Hud(key.clone()), 10);
        assert_eq!(reply, "alice/main: balance 0 (+1/sec)");

        let buy = Command::Buy {
            key,
            kind: ItemKind::Miner,
            name: "small".to_string(),
        };
        assert!(execute(&manager, &buy, 10).contains("insufficient balance"));
        assert!(execute(&manager, &Command::Shop(ItemKind::Miner), 10).contains("miner-small"));
    }
}
