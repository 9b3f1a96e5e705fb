//! Game catalog port
//!
//! Source of games, per-game form schemas, packages and payment methods.

use async_trait::async_trait;
use topup_domain::{Game, GameConfig, GameId, GamePackage, PaymentMethod};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameCatalogPort: Send + Sync {
    async fn game(&self, game_id: GameId) -> Option<Game>;

    /// The game's schema, falling back to the generic one owned by `game_id`.
    async fn game_config(&self, game_id: GameId) -> GameConfig;

    async fn packages(&self, game_id: GameId) -> Vec<GamePackage>;

    async fn payment_methods(&self) -> Vec<PaymentMethod>;
}
