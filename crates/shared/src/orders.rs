//! Wire payloads exchanged with the order API.
//!
//! Ids travel as strings, matching what the storefront form posts.

use serde::{Deserialize, Serialize};
use topup_domain::{DomainError, FormValueMap, OrderFormData};

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub package_id: String,
    pub payment_method_id: String,
    pub game_data: FormValueMap,
    pub quantity: u32,
}

impl From<&OrderFormData> for CreateOrderRequest {
    fn from(order: &OrderFormData) -> Self {
        Self {
            package_id: order.package_id.to_string(),
            payment_method_id: order.payment_method_id.to_string(),
            game_data: order.game_data.clone(),
            quantity: order.quantity,
        }
    }
}

impl TryFrom<CreateOrderRequest> for OrderFormData {
    type Error = DomainError;

    fn try_from(request: CreateOrderRequest) -> Result<Self, Self::Error> {
        if request.quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        Ok(Self {
            package_id: request.package_id.parse()?,
            payment_method_id: request.payment_method_id.parse()?,
            game_data: request.game_data,
            quantity: request.quantity,
        })
    }
}

/// Successful response of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: i64,
}

/// Error body returned by the order API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use topup_domain::{FormValue, PackageId, PaymentMethodId};

    fn order() -> OrderFormData {
        let mut game_data = FormValueMap::new();
        game_data.insert("game_uid".into(), FormValue::text("123456789"));
        OrderFormData {
            package_id: PackageId::new(2),
            payment_method_id: PaymentMethodId::new(3),
            game_data,
            quantity: 2,
        }
    }

    #[test]
    fn request_carries_ids_as_strings() {
        let json = serde_json::to_value(CreateOrderRequest::from(&order())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "package_id": "2",
                "payment_method_id": "3",
                "game_data": {"game_uid": "123456789"},
                "quantity": 2
            })
        );
    }

    #[test]
    fn request_converts_back_to_order() {
        let request = CreateOrderRequest::from(&order());
        assert_eq!(OrderFormData::try_from(request).unwrap(), order());

        let bad = CreateOrderRequest {
            package_id: "abc".into(),
            ..CreateOrderRequest::from(&order())
        };
        assert!(matches!(
            OrderFormData::try_from(bad),
            Err(DomainError::InvalidId(_))
        ));

        let empty = CreateOrderRequest {
            quantity: 0,
            ..CreateOrderRequest::from(&order())
        };
        assert!(OrderFormData::try_from(empty).is_err());
    }

    #[test]
    fn error_body_shape() {
        let body: ApiErrorBody = serde_json::from_str(r#"{"error": "Forbidden"}"#).unwrap();
        assert_eq!(body.error, "Forbidden");
    }
}
