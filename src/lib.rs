pub mod config;
pub mod console;
pub mod error;
pub mod persist;
pub mod runtime;
pub mod sim;

pub use error::{GameError, PurchaseRejection};
pub use runtime::manager::GameManager;
pub use sim::game::{GameKey, GameState};
