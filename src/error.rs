use crate::persist::PersistError;
use crate::sim::catalog::{ItemKind, ShopCard};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("game not found")]
    GameNotFound,
    #[error("insufficient balance (requires {price}, have {balance})")]
    InsufficientBalance { price: u64, balance: u64 },
    #[error("{kind} {name} already owned")]
    AlreadyOwned { kind: ItemKind, name: String },
    #[error("session is not active")]
    SessionNotActive,
    #[error("unknown {kind} {name}")]
    UnknownItem { kind: ItemKind, name: String },
    #[error("server error: {0}")]
    Server(#[from] PersistError),
}

#[derive(Debug, Error)]
#[error("purchase rejected: {error}")]
pub struct PurchaseRejection {
    pub card: Option<ShopCard>,
    #[source]
    pub error: GameError,
}

impl PurchaseRejection {
    pub fn bare(error: GameError) -> Self {
        Self { card: None, error }
    }

    pub fn with_card(card: ShopCard, error: GameError) -> Self {
        let card = card.rejected(error.to_string());
        Self {
            card: Some(card),
            error,
        }
    }
}
