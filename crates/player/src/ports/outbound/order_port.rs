//! Order submission port
//!
//! The order API is an external collaborator: the storefront hands it a
//! validated order and only cares whether it was accepted.

use async_trait::async_trait;
use thiserror::Error;
use topup_domain::OrderFormData;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderSubmitError {
    #[error("Order request failed: {0}")]
    Network(String),

    #[error("Order rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid order response: {0}")]
    InvalidResponse(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderSubmissionPort: Send + Sync {
    async fn submit_order(&self, order: &OrderFormData) -> Result<(), OrderSubmitError>;
}
