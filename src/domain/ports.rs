use uuid::Uuid;

use super::cart::CartLineView;
use super::errors::DomainError;
use super::order::OrderView;

/// Persistence contract for cart lines. Stock is only validated here, never
/// reserved; checkout re-validates against live stock inside its own
/// transaction.
pub trait CartRepository: Send + Sync + 'static {
    fn list(&self, user_id: Uuid) -> Result<Vec<CartLineView>, DomainError>;
    fn add(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartLineView, DomainError>;
    fn update_quantity(
        &self,
        line_id: Uuid,
        quantity: i32,
        user_id: Uuid,
    ) -> Result<CartLineView, DomainError>;
    fn remove(&self, line_id: Uuid, user_id: Uuid) -> Result<(), DomainError>;
    fn clear(&self, user_id: Uuid) -> Result<(), DomainError>;
}

/// Persistence contract for orders. `checkout` runs the whole cart-to-order
/// conversion (validation, pricing, stock decrement, cart clearing) as one
/// atomic unit; either the order exists with stock decremented and the cart
/// empty, or nothing changed.
pub trait OrderRepository: Send + Sync + 'static {
    fn checkout(&self, user_id: Uuid, coupon_code: Option<&str>) -> Result<OrderView, DomainError>;
    fn find_by_id(&self, order_id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn find_by_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError>;
}
