use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Insufficient stock for product: {0}")]
    InsufficientStock(String),
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Invalid or inactive coupon code")]
    InvalidCoupon,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
