//! Topup Player - command line composition root.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use topup_domain::{validate_form, FormValueMap, GameId, PackageId, PaymentMethodId};
use topup_player::cli::{form_values, Cli, Command};
use topup_player::infrastructure::{create_platform, HttpOrderGateway};
use topup_player::ui::DynamicGameOptions;
use topup_player::{PlayerConfig, SubmitOutcome, TopupError, TopupForm};
use topup_shared::GameCatalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries command output, logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "topup_player=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = PlayerConfig::from_env().context("loading configuration")?;

    let catalog = match &config.catalog_path {
        Some(path) => GameCatalog::from_json_file(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => GameCatalog::builtin(),
    };

    match cli.command {
        Command::Show { game_id } => show(&catalog, game_id),
        Command::Validate { game_id, values } => validate(&catalog, game_id, &values),
        Command::Order {
            game_id,
            package,
            payment,
            qty,
            values,
        } => {
            let order = OrderArgs {
                game_id,
                package,
                payment,
                quantity: qty,
                values,
            };
            place_order(&catalog, &config, order).await
        }
    }
}

fn show(catalog: &GameCatalog, game_id: GameId) -> anyhow::Result<()> {
    let game = catalog.game(game_id).ok_or(TopupError::GameNotFound(game_id))?;
    let config = catalog.game_config(game_id);
    let values = FormValueMap::new();
    let errors = BTreeMap::new();
    let fields = DynamicGameOptions::new(&config.fields, &values, &errors).render();

    let output = serde_json::json!({
        "game": game,
        "fields": fields,
        "packages": catalog.packages(game_id),
        "paymentMethods": catalog.payment_methods(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn validate(
    catalog: &GameCatalog,
    game_id: GameId,
    assignments: &[(String, String)],
) -> anyhow::Result<()> {
    if catalog.game(game_id).is_none() {
        return Err(TopupError::GameNotFound(game_id).into());
    }
    let config = catalog.game_config(game_id);
    let values = form_values(&config, assignments);
    let result = validate_form(&config.fields, &values);

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.is_valid {
        anyhow::bail!("{} field(s) failed validation", result.errors.len());
    }
    Ok(())
}

struct OrderArgs {
    game_id: GameId,
    package: Option<PackageId>,
    payment: Option<PaymentMethodId>,
    quantity: u32,
    values: Vec<(String, String)>,
}

async fn place_order(
    catalog: &GameCatalog,
    config: &PlayerConfig,
    args: OrderArgs,
) -> anyhow::Result<()> {
    let platform = create_platform(config.storage_path.clone());
    let orders = Arc::new(HttpOrderGateway::new(&config.api_base_url));
    let mut form = TopupForm::load(
        args.game_id,
        catalog,
        orders,
        platform,
        config.form_options(),
    )
    .await?;

    if form.has_draft() {
        let info = form.draft_info();
        tracing::info!(last_saved = ?info.last_saved, "Restoring saved draft");
        form.restore_draft();
    }

    for (key, value) in form_values(form.config(), &args.values) {
        form.on_field_change(&key, value);
    }
    if let Some(package_id) = args.package {
        form.select_package(package_id)?;
    }
    if let Some(payment_method_id) = args.payment {
        form.select_payment_method(payment_method_id)?;
    }
    form.set_quantity(args.quantity);
    form.flush_draft();

    let total = form.total();
    match form.submit().await {
        SubmitOutcome::Submitted => {
            println!("訂單已送出，總金額 NT$ {total}");
            Ok(())
        }
        SubmitOutcome::Rejected(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            anyhow::bail!("order was not sent: {} field(s) failed validation", result.errors.len())
        }
        SubmitOutcome::Failed(message) => anyhow::bail!(message),
    }
}
