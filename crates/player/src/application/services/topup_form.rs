//! Top-up form use case.
//!
//! Ties one game's form schema to the customer's entries: inline validation on
//! every change, a debounced local draft of the account details, package and
//! payment selection, and the final hand-off to the order API.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use topup_domain::{
    is_blank, sort_fields, validate_field_realtime, validate_for_submission, FieldDefinition,
    FormValue, FormValueMap, Game, GameConfig, GameId, GamePackage, OrderFormData, PackageId,
    PaymentMethod, PaymentMethodId, SubmissionValidators, ValidationResult,
};

use crate::application::draft::{
    DraftInfo, DraftOptions, DraftSaver, DEFAULT_AUTOSAVE_DELAY, DEFAULT_EXPIRE_AFTER,
};
use crate::application::error::TopupError;
use crate::ports::outbound::{GameCatalogPort, OrderSubmissionPort};
use crate::state::Platform;

/// Key of the non-field error shown when the order API fails.
pub const SUBMIT_ERROR_KEY: &str = "submit";
pub const SUBMIT_FAILED_MESSAGE: &str = "訂單提交失敗，請重試";

pub const PACKAGE_KEY: &str = "package";
pub const PAYMENT_METHOD_KEY: &str = "payment_method";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopupFormOptions {
    pub draft_expiry: Duration,
    pub autosave_delay: Duration,
}

impl Default for TopupFormOptions {
    fn default() -> Self {
        Self {
            draft_expiry: DEFAULT_EXPIRE_AFTER,
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Editing,
    Submitting,
    /// The order was accepted; the form was reset
    Succeeded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; the order API was not called
    Rejected(ValidationResult),
    Submitted,
    /// The order API failed; the draft is kept
    Failed(String),
}

/// Draft storage key of a game's order form.
pub fn draft_key(game_id: GameId) -> String {
    format!("game_{game_id}_order")
}

pub struct TopupForm {
    game: Game,
    config: GameConfig,
    packages: Vec<GamePackage>,
    payment_methods: Vec<PaymentMethod>,
    selected_package: Option<PackageId>,
    selected_payment_method: Option<PaymentMethodId>,
    quantity: u32,
    errors: BTreeMap<String, String>,
    status: FormStatus,
    /// Account details typed by the customer
    draft: DraftSaver<FormValueMap>,
    orders: Arc<dyn OrderSubmissionPort>,
}

impl TopupForm {
    pub async fn load(
        game_id: GameId,
        catalog: &dyn GameCatalogPort,
        orders: Arc<dyn OrderSubmissionPort>,
        platform: Platform,
        options: TopupFormOptions,
    ) -> Result<Self, TopupError> {
        let game = catalog
            .game(game_id)
            .await
            .ok_or(TopupError::GameNotFound(game_id))?;
        if !game.is_active {
            tracing::info!(game_id = %game_id, "Game is inactive");
            return Err(TopupError::GameInactive(game_id));
        }

        let config = catalog.game_config(game_id).await;
        let packages: Vec<GamePackage> = catalog
            .packages(game_id)
            .await
            .into_iter()
            .filter(|package| package.is_active)
            .collect();
        let payment_methods = catalog.payment_methods().await;

        let draft = DraftSaver::new(
            FormValueMap::new(),
            DraftOptions::new(draft_key(game_id))
                .with_expire_after(options.draft_expiry)
                .with_autosave_delay(options.autosave_delay),
            platform,
        );

        tracing::debug!(
            game_id = %game_id,
            fields = config.fields.len(),
            packages = packages.len(),
            has_draft = draft.has_draft(),
            "Top-up form loaded"
        );

        Ok(Self {
            selected_package: packages.first().map(|p| p.package_id),
            selected_payment_method: payment_methods.first().map(|m| m.payment_method_id),
            game,
            config,
            packages,
            payment_methods,
            quantity: 1,
            errors: BTreeMap::new(),
            status: FormStatus::Editing,
            draft,
            orders,
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Fields in presentation order.
    pub fn fields(&self) -> Vec<&FieldDefinition> {
        sort_fields(&self.config.fields)
    }

    pub fn packages(&self) -> &[GamePackage] {
        &self.packages
    }

    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    pub fn values(&self) -> FormValueMap {
        self.draft.data()
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    // =========================================================================
    // Draft
    // =========================================================================

    pub fn has_draft(&self) -> bool {
        self.draft.has_draft()
    }

    pub fn draft_info(&self) -> DraftInfo {
        self.draft.draft_info()
    }

    pub fn is_auto_saving(&self) -> bool {
        self.draft.is_auto_saving()
    }

    /// Accepts the stored draft offered at load.
    pub fn restore_draft(&mut self) -> bool {
        let restored = self.draft.restore_draft();
        if restored {
            self.errors.clear();
        }
        restored
    }

    pub fn discard_draft(&mut self) {
        self.draft.clear_draft();
    }

    /// Writes a pending draft save now (page unload).
    pub fn flush_draft(&self) -> bool {
        self.draft.flush_pending()
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Records a new value and refreshes that field's inline error.
    pub fn on_field_change(&mut self, key: &str, value: FormValue) {
        let error = self
            .config
            .field(key)
            .and_then(|field| validate_field_realtime(field, Some(&value)));
        match error {
            Some(message) => {
                self.errors.insert(key.to_string(), message);
            }
            None => {
                self.errors.remove(key);
            }
        }

        self.draft.update_data(|values| {
            values.insert(key.to_string(), value);
        });
    }

    pub fn selected_package(&self) -> Option<&GamePackage> {
        self.selected_package
            .and_then(|id| self.packages.iter().find(|p| p.package_id == id))
    }

    pub fn selected_payment_method(&self) -> Option<&PaymentMethod> {
        self.selected_payment_method.and_then(|id| {
            self.payment_methods
                .iter()
                .find(|m| m.payment_method_id == id)
        })
    }

    pub fn select_package(&mut self, package_id: PackageId) -> Result<(), TopupError> {
        if !self.packages.iter().any(|p| p.package_id == package_id) {
            return Err(TopupError::UnknownPackage(package_id));
        }
        self.selected_package = Some(package_id);
        self.errors.remove(PACKAGE_KEY);
        Ok(())
    }

    pub fn select_payment_method(
        &mut self,
        payment_method_id: PaymentMethodId,
    ) -> Result<(), TopupError> {
        if !self
            .payment_methods
            .iter()
            .any(|m| m.payment_method_id == payment_method_id)
        {
            return Err(TopupError::UnknownPaymentMethod(payment_method_id));
        }
        self.selected_payment_method = Some(payment_method_id);
        self.errors.remove(PAYMENT_METHOD_KEY);
        Ok(())
    }

    pub fn increment_quantity(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    /// Never goes below 1.
    pub fn decrement_quantity(&mut self) {
        self.quantity = self.quantity.saturating_sub(1).max(1);
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(1);
    }

    /// Price of the selected package times the quantity; 0 without a package.
    pub fn total(&self) -> u64 {
        self.selected_package()
            .map_or(0, |package| package.total(self.quantity))
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Validates strictly and, if everything passes, sends the order.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let values = self.draft.data();
        let has_package = self.selected_package.is_some();
        let has_payment_method = self.selected_payment_method.is_some();

        let extra = SubmissionValidators::new()
            .with(PACKAGE_KEY, move |_, _| {
                (!has_package).then(|| "請選擇儲值套餐".to_string())
            })
            .with(PAYMENT_METHOD_KEY, move |_, _| {
                (!has_payment_method).then(|| "請選擇付款方式".to_string())
            });

        let result = validate_for_submission(&self.config.fields, &values, &extra);
        let (Some(package_id), Some(payment_method_id), true) = (
            self.selected_package,
            self.selected_payment_method,
            result.is_valid,
        ) else {
            tracing::debug!(
                game_id = %self.game.game_id,
                errors = result.errors.len(),
                "Order rejected by validation"
            );
            self.errors = result.field_errors.clone();
            return SubmitOutcome::Rejected(result);
        };

        let order = OrderFormData {
            package_id,
            payment_method_id,
            game_data: values
                .into_iter()
                .filter(|(_, value)| !is_blank(Some(value)))
                .collect(),
            quantity: self.quantity,
        };

        self.status = FormStatus::Submitting;
        self.errors.clear();

        match self.orders.submit_order(&order).await {
            Ok(()) => {
                tracing::info!(
                    game_id = %self.game.game_id,
                    package_id = %package_id,
                    quantity = order.quantity,
                    "Order submitted"
                );
                self.draft.clear_draft();
                self.reset();
                self.status = FormStatus::Succeeded;
                SubmitOutcome::Submitted
            }
            Err(error) => {
                tracing::error!(game_id = %self.game.game_id, error = %error, "Order submission failed");
                self.errors
                    .insert(SUBMIT_ERROR_KEY.to_string(), SUBMIT_FAILED_MESSAGE.to_string());
                self.status = FormStatus::Editing;
                SubmitOutcome::Failed(SUBMIT_FAILED_MESSAGE.to_string())
            }
        }
    }

    /// Leaves the success screen for a fresh form.
    pub fn continue_shopping(&mut self) {
        if self.status == FormStatus::Succeeded {
            self.status = FormStatus::Editing;
        }
    }

    fn reset(&mut self) {
        self.draft.replace_data(FormValueMap::new());
        self.selected_package = self.packages.first().map(|p| p.package_id);
        self.selected_payment_method = self.payment_methods.first().map(|m| m.payment_method_id);
        self.quantity = 1;
        self.errors.clear();
    }
}

impl std::fmt::Debug for TopupForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopupForm")
            .field("game_id", &self.game.game_id)
            .field("status", &self.status)
            .field("quantity", &self.quantity)
            .finish_non_exhaustive()
    }
}
