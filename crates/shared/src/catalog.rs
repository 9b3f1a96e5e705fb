//! Game catalog: form schemas, games, packages and payment methods.
//!
//! The storefront ships with a built-in catalog ([`GameCatalog::builtin`]) and
//! can load a replacement from a JSON document with the same shape as
//! [`CatalogDocument`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use topup_domain::{
    FieldDefinition, FieldId, FieldType, Game, GameConfig, GameId, GamePackage, PackageId,
    PaymentMethod, PaymentMethodId, ValidationRules,
};

/// Game id of the fallback schema.
pub const DEFAULT_CONFIG_GAME_ID: GameId = GameId::new(0);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog config for game {game_id} contains a field owned by game {field_game_id}")]
    MismatchedField { game_id: GameId, field_game_id: GameId },

    #[error("Package {package_id} references unknown game {game_id}")]
    UnknownGame { package_id: PackageId, game_id: GameId },
}

/// Serialized form of a catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub configs: Vec<GameConfig>,
    /// Schema used for games without their own config
    pub default_config: GameConfig,
    #[serde(default)]
    pub packages: Vec<GamePackage>,
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
}

#[derive(Debug, Clone)]
pub struct GameCatalog {
    games: BTreeMap<GameId, Game>,
    configs: BTreeMap<GameId, GameConfig>,
    default_config: GameConfig,
    packages: BTreeMap<GameId, Vec<GamePackage>>,
    payment_methods: Vec<PaymentMethod>,
}

impl GameCatalog {
    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        for config in document.configs.iter().chain([&document.default_config]) {
            if let Some(field) = config.fields.iter().find(|f| f.game_id != config.game_id) {
                return Err(CatalogError::MismatchedField {
                    game_id: config.game_id,
                    field_game_id: field.game_id,
                });
            }
        }

        let games: BTreeMap<GameId, Game> = document
            .games
            .into_iter()
            .map(|game| (game.game_id, game))
            .collect();

        let mut packages: BTreeMap<GameId, Vec<GamePackage>> = BTreeMap::new();
        for package in document.packages {
            if !games.contains_key(&package.game_id) {
                return Err(CatalogError::UnknownGame {
                    package_id: package.package_id,
                    game_id: package.game_id,
                });
            }
            packages.entry(package.game_id).or_default().push(package);
        }

        Ok(Self {
            games,
            configs: document
                .configs
                .into_iter()
                .map(|config| (config.game_id, config))
                .collect(),
            default_config: document.default_config,
            packages,
            payment_methods: document.payment_methods,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Self::from_document(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            games = catalog.games.len(),
            "Loaded game catalog"
        );
        Ok(catalog)
    }

    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            games: self.games.values().cloned().collect(),
            configs: self.configs.values().cloned().collect(),
            default_config: self.default_config.clone(),
            packages: self.packages.values().flatten().cloned().collect(),
            payment_methods: self.payment_methods.clone(),
        }
    }

    /// The game's own schema, or the fallback schema owned by `game_id`.
    pub fn game_config(&self, game_id: GameId) -> GameConfig {
        match self.configs.get(&game_id) {
            Some(config) => config.clone(),
            None => {
                tracing::debug!(game_id = %game_id, "No game config, using default schema");
                self.default_config.for_game(game_id)
            }
        }
    }

    pub fn has_own_config(&self, game_id: GameId) -> bool {
        self.configs.contains_key(&game_id)
    }

    pub fn game(&self, game_id: GameId) -> Option<&Game> {
        self.games.get(&game_id)
    }

    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.games.values()
    }

    /// Packages on sale for a game; empty when it has none.
    pub fn packages(&self, game_id: GameId) -> &[GamePackage] {
        self.packages
            .get(&game_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn package(&self, package_id: PackageId) -> Option<&GamePackage> {
        self.packages
            .values()
            .flatten()
            .find(|package| package.package_id == package_id)
    }

    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    /// Replaces (or adds) a game's schema, as the admin console does on save.
    pub fn set_game_config(&mut self, config: GameConfig) {
        self.configs.insert(config.game_id, config);
    }

    /// The catalog the storefront ships with.
    pub fn builtin() -> Self {
        let genshin = GameId::new(1);
        let star_rail = GameId::new(2);

        let games = [
            Game {
                game_id: genshin,
                game_name: "原神".to_string(),
                category: Some("RPG".to_string()),
                icon: Some(
                    "https://via.placeholder.com/200x200/4F46E5/FFFFFF?text=原神".to_string(),
                ),
                is_active: true,
                description: Some(
                    "在璃月和蒙德的世界中展開冒險，與各種元素力量戰鬥，體驗開放世界的魅力。"
                        .to_string(),
                ),
            },
            Game {
                game_id: star_rail,
                game_name: "崩壞：星穹鐵道".to_string(),
                category: Some("RPG".to_string()),
                icon: Some(
                    "https://via.placeholder.com/200x200/7C3AED/FFFFFF?text=星鐵".to_string(),
                ),
                is_active: true,
                description: Some(
                    "搭乘星穹列車，在銀河中展開冒險旅程，體驗回合制戰鬥的策略樂趣。".to_string(),
                ),
            },
        ];

        let configs = [
            GameConfig::new(
                genshin,
                vec![
                    uid_field(genshin, "genshin_uid", "遊戲 UID")
                        .with_placeholder("請輸入您的遊戲 UID（9 位數字）"),
                    FieldDefinition::new(genshin, FieldType::Select, "game_server", "伺服器")
                        .with_id(FieldId::from_name("genshin_server"))
                        .with_options(["亞洲伺服器", "美洲伺服器", "歐洲伺服器", "TW,HK,MO伺服器"])
                        .with_order(2)
                        .required(),
                    nickname_field(genshin, "genshin_username", "角色暱稱"),
                    level_field(genshin, "genshin_level", "character_level", "冒險等級", 60.0),
                ],
            ),
            GameConfig::new(
                star_rail,
                vec![
                    uid_field(star_rail, "hsr_uid", "開拓者 UID")
                        .with_placeholder("請輸入您的開拓者 UID（9 位數字）"),
                    FieldDefinition::new(star_rail, FieldType::Select, "game_server", "伺服器")
                        .with_id(FieldId::from_name("hsr_server"))
                        .with_options(["亞洲伺服器", "美洲伺服器", "歐洲伺服器"])
                        .with_order(2)
                        .required(),
                    nickname_field(star_rail, "hsr_username", "開拓者暱稱"),
                    level_field(star_rail, "hsr_level", "trailblazer_level", "開拓等級", 70.0),
                ],
            ),
        ];

        let fallback = DEFAULT_CONFIG_GAME_ID;
        let default_config = GameConfig::new(
            fallback,
            vec![
                FieldDefinition::text(fallback, "game_uid", "遊戲角色 ID")
                    .with_id(FieldId::from_name("default_uid"))
                    .with_placeholder("請輸入您的遊戲角色 ID")
                    .with_order(1)
                    .required()
                    .with_validation(ValidationRules::length(3, 50)),
                FieldDefinition::text(fallback, "game_server", "伺服器")
                    .with_id(FieldId::from_name("default_server"))
                    .with_placeholder("請輸入您的伺服器名稱")
                    .with_order(2)
                    .required()
                    .with_validation(ValidationRules::length(1, 30)),
                nickname_field(fallback, "default_username", "角色暱稱"),
            ],
        );

        let package = |id: i64, game_id: GameId, name: &str, description: &str, price: u64| {
            GamePackage {
                package_id: PackageId::new(id),
                game_id,
                name: name.to_string(),
                description: Some(description.to_string()),
                price,
                is_active: true,
            }
        };
        let packages = vec![
            package(1, genshin, "小額儲值", "適合新手玩家", 100),
            package(2, genshin, "標準儲值", "推薦選擇", 500),
            package(3, genshin, "大額儲值", "最划算選擇", 1000),
            package(4, star_rail, "Express Supply", "Honkai Star Rail package", 300),
            package(5, star_rail, "Nameless Honor", "Premium package", 600),
        ];

        let payment_methods = [(1, "銀行轉帳"), (2, "超商代碼"), (3, "線上支付")]
            .into_iter()
            .map(|(id, method)| PaymentMethod {
                payment_method_id: PaymentMethodId::new(id),
                method: method.to_string(),
            })
            .collect();

        let mut grouped: BTreeMap<GameId, Vec<GamePackage>> = BTreeMap::new();
        for package in packages {
            grouped.entry(package.game_id).or_default().push(package);
        }

        Self {
            games: games.into_iter().map(|game| (game.game_id, game)).collect(),
            configs: configs
                .into_iter()
                .map(|config| (config.game_id, config))
                .collect(),
            default_config,
            packages: grouped,
            payment_methods,
        }
    }
}

impl Default for GameCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn uid_field(game_id: GameId, id: &str, label: &str) -> FieldDefinition {
    FieldDefinition::text(game_id, "game_uid", label)
        .with_id(FieldId::from_name(id))
        .with_order(1)
        .required()
        .with_validation(ValidationRules::length(9, 9).with_pattern("^[0-9]{9}$"))
}

fn nickname_field(game_id: GameId, id: &str, label: &str) -> FieldDefinition {
    FieldDefinition::text(game_id, "game_username", label)
        .with_id(FieldId::from_name(id))
        .with_placeholder(format!("請輸入您的{label}"))
        .with_order(3)
        .required()
        .with_validation(ValidationRules::length(1, 20))
}

fn level_field(game_id: GameId, id: &str, key: &str, label: &str, max: f64) -> FieldDefinition {
    FieldDefinition::new(game_id, FieldType::Number, key, label)
        .with_id(FieldId::from_name(id))
        .with_placeholder(format!("請輸入您的{label}"))
        .with_order(4)
        .with_validation(ValidationRules::range(1.0, max))
}
