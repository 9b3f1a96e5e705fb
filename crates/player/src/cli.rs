//! Command line of the `topup-player` binary.
//!
//! ```bash
//! topup-player show 1
//! topup-player validate 1 game_uid=123456789 game_server=亞洲伺服器
//! topup-player order 1 --package 2 --qty 3 game_uid=123456789 game_username=旅行者
//! ```

use clap::{Parser, Subcommand};
use topup_domain::{FormValue, FormValueMap, GameConfig, GameId, PackageId, PaymentMethodId};

use crate::ui::presentation::{handle_event, FieldEvent};

#[derive(Debug, Parser)]
#[command(name = "topup-player")]
#[command(about = "Game top-up storefront client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a game's order form
    Show { game_id: GameId },
    /// Check account details against a game's form, printing the result as JSON
    Validate {
        game_id: GameId,
        /// Field values as key=value (a,b for checkbox fields)
        #[arg(value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },
    /// Place an order through the order API
    Order {
        game_id: GameId,
        /// Package id (defaults to the game's first package)
        #[arg(long)]
        package: Option<PackageId>,
        /// Payment method id (defaults to the first method)
        #[arg(long)]
        payment: Option<PaymentMethodId>,
        #[arg(long, default_value_t = 1)]
        qty: u32,
        /// Field values as key=value (a,b for checkbox fields)
        #[arg(value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },
}

/// Splits `key=value` at the first `=`.
pub fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got `{arg}`")),
    }
}

/// Converts raw command line text into form values the way the form controls
/// would: numbers for number fields, lists for checkbox fields. Keys the schema
/// does not know are kept as text.
pub fn form_values(config: &GameConfig, assignments: &[(String, String)]) -> FormValueMap {
    assignments
        .iter()
        .map(|(key, raw)| {
            config
                .field(key)
                .and_then(|field| handle_event(field, None, FieldEvent::Input(raw.clone())))
                .unwrap_or_else(|| (key.clone(), FormValue::text(raw.as_str())))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use topup_domain::{FieldDefinition, FieldType};

    #[test]
    fn parses_order_command() {
        let cli = Cli::try_parse_from([
            "topup-player",
            "order",
            "1",
            "--package",
            "2",
            "--qty",
            "3",
            "game_uid=123456789",
            "note=a=b",
        ])
        .unwrap();

        let Command::Order {
            game_id,
            package,
            payment,
            qty,
            values,
        } = cli.command
        else {
            panic!("expected order command");
        };
        assert_eq!(game_id, GameId::new(1));
        assert_eq!(package, Some(PackageId::new(2)));
        assert_eq!(payment, None);
        assert_eq!(qty, 3);
        assert_eq!(
            values,
            vec![
                ("game_uid".to_string(), "123456789".to_string()),
                ("note".to_string(), "a=b".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_malformed_arguments() {
        assert!(Cli::try_parse_from(["topup-player", "show", "one"]).is_err());
        assert!(Cli::try_parse_from(["topup-player", "validate", "1", "game_uid"]).is_err());
        assert_eq!(
            parse_assignment("=x"),
            Err("expected key=value, got `=x`".to_string())
        );
    }

    #[test]
    fn values_follow_field_types() {
        let game_id = GameId::new(1);
        let config = GameConfig::new(
            game_id,
            vec![
                FieldDefinition::text(game_id, "uid", "UID"),
                FieldDefinition::new(game_id, FieldType::Number, "level", "等級"),
                FieldDefinition::new(game_id, FieldType::Checkbox, "servers", "伺服器")
                    .with_options(["A", "B"]),
            ],
        );
        let values = form_values(
            &config,
            &[
                ("uid".into(), "007".into()),
                ("level".into(), "30".into()),
                ("servers".into(), "A,B".into()),
                ("extra".into(), "x".into()),
            ],
        );

        assert_eq!(values["uid"], FormValue::text("007"));
        assert_eq!(values["level"], FormValue::Number(30.0));
        assert_eq!(
            values["servers"],
            FormValue::List(vec!["A".to_string(), "B".to_string()])
        );
        assert_eq!(values["extra"], FormValue::text("x"));
    }
}
