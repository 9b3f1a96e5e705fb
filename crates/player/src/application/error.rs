//! Storefront form errors.

use topup_domain::{GameId, PackageId, PaymentMethodId};

/// Errors that stop the top-up form from loading or accepting a selection.
///
/// Messages are shown to customers as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopupError {
    #[error("遊戲不存在")]
    GameNotFound(GameId),

    #[error("此遊戲目前暫停服務")]
    GameInactive(GameId),

    #[error("找不到儲值套餐 {0}")]
    UnknownPackage(PackageId),

    #[error("找不到付款方式 {0}")]
    UnknownPaymentMethod(PaymentMethodId),
}
