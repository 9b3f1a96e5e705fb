//! Template preview
//!
//! What the admin console shows next to the field editor: the game's form as a
//! customer would see it, driven by throwaway values. Nothing is validated and
//! nothing is saved.

use std::collections::BTreeMap;

use topup_domain::{
    FormValue, FormValueMap, GameConfig, GamePackage, PackageId, PaymentMethod, PaymentMethodId,
};

use super::dynamic_options::{DynamicGameOptions, FieldView};

#[derive(Debug, Clone)]
pub struct PreviewSession {
    config: GameConfig,
    packages: Vec<GamePackage>,
    payment_methods: Vec<PaymentMethod>,
    values: FormValueMap,
    selected_package: Option<PackageId>,
    selected_payment_method: Option<PaymentMethodId>,
    quantity: u32,
}

impl PreviewSession {
    pub fn new(
        config: GameConfig,
        packages: Vec<GamePackage>,
        payment_methods: Vec<PaymentMethod>,
    ) -> Self {
        Self {
            selected_package: packages.first().map(|p| p.package_id),
            selected_payment_method: payment_methods.first().map(|m| m.payment_method_id),
            config,
            packages,
            payment_methods,
            values: FormValueMap::new(),
            quantity: 1,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Swaps in the edited schema; preview values are kept.
    pub fn set_config(&mut self, config: GameConfig) {
        self.config = config;
    }

    pub fn values(&self) -> &FormValueMap {
        &self.values
    }

    pub fn handle_field_change(&mut self, key: &str, value: FormValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Ignored when the package is not on offer.
    pub fn select_package(&mut self, package_id: PackageId) {
        if self.packages.iter().any(|p| p.package_id == package_id) {
            self.selected_package = Some(package_id);
        }
    }

    pub fn select_payment_method(&mut self, payment_method_id: PaymentMethodId) {
        if self
            .payment_methods
            .iter()
            .any(|m| m.payment_method_id == payment_method_id)
        {
            self.selected_payment_method = Some(payment_method_id);
        }
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

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(1);
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Field views without any inline errors.
    pub fn render(&self) -> Vec<FieldView> {
        let no_errors = BTreeMap::new();
        DynamicGameOptions::new(&self.config.fields, &self.values, &no_errors).render()
    }

    pub fn total(&self) -> u64 {
        self.selected_package()
            .map_or(0, |package| package.total(self.quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topup_domain::GameId;
    use topup_shared::GameCatalog;

    fn session() -> PreviewSession {
        let catalog = GameCatalog::builtin();
        let game_id = GameId::new(1);
        PreviewSession::new(
            catalog.game_config(game_id),
            catalog.packages(game_id).to_vec(),
            catalog.payment_methods().to_vec(),
        )
    }

    #[test]
    fn defaults_to_first_choices() {
        let preview = session();
        assert_eq!(preview.selected_package().unwrap().price, 100);
        assert_eq!(preview.selected_payment_method().unwrap().method, "銀行轉帳");
        assert_eq!(preview.total(), 100);
    }

    #[test]
    fn invalid_values_show_no_errors() {
        let mut preview = session();
        preview.handle_field_change("game_uid", FormValue::text("abc"));
        preview.handle_field_change("character_level", FormValue::Number(999.0));

        let views = preview.render();
        assert_eq!(views.len(), 4);
        assert!(views.iter().all(|view| view.error.is_none()));
        assert_eq!(preview.values().len(), 2);
    }

    #[test]
    fn total_follows_selection_and_quantity() {
        let mut preview = session();
        preview.select_package(PackageId::new(3));
        preview.set_quantity(3);
        assert_eq!(preview.total(), 3000);

        preview.select_package(PackageId::new(4));
        assert_eq!(preview.selected_package().unwrap().package_id, PackageId::new(3));

        preview.set_quantity(0);
        assert_eq!(preview.quantity(), 1);
    }

    #[test]
    fn empty_catalog_has_zero_total() {
        let preview = PreviewSession::new(
            GameConfig::new(GameId::new(9), Vec::new()),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(preview.total(), 0);
        assert!(preview.render().is_empty());
        assert!(preview.selected_payment_method().is_none());
    }
}
