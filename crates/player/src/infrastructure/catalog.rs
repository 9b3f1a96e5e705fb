//! In-process catalog adapter
//!
//! Serves the storefront from a [`GameCatalog`] held in memory (the built-in
//! one or a JSON document loaded at startup).

use async_trait::async_trait;
use topup_domain::{Game, GameConfig, GameId, GamePackage, PaymentMethod};
use topup_shared::GameCatalog;

use crate::ports::outbound::GameCatalogPort;

#[async_trait]
impl GameCatalogPort for GameCatalog {
    async fn game(&self, game_id: GameId) -> Option<Game> {
        GameCatalog::game(self, game_id).cloned()
    }

    async fn game_config(&self, game_id: GameId) -> GameConfig {
        GameCatalog::game_config(self, game_id)
    }

    async fn packages(&self, game_id: GameId) -> Vec<GamePackage> {
        GameCatalog::packages(self, game_id).to_vec()
    }

    async fn payment_methods(&self) -> Vec<PaymentMethod> {
        GameCatalog::payment_methods(self).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_builtin_catalog() {
        let catalog = GameCatalog::builtin();
        let port: &dyn GameCatalogPort = &catalog;

        assert_eq!(port.game(GameId::new(2)).await.unwrap().game_name, "崩壞：星穹鐵道");
        assert!(port.game(GameId::new(3)).await.is_none());
        assert_eq!(port.packages(GameId::new(2)).await.len(), 2);
        assert_eq!(port.payment_methods().await.len(), 3);

        let fallback = port.game_config(GameId::new(5)).await;
        assert_eq!(fallback.game_id, GameId::new(5));
        assert_eq!(fallback.fields.len(), 3);
    }
}
