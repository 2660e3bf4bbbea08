use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One pending-purchase line of a user's cart. A user holds at most one line
/// per product; adding the same product again increments the quantity.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}
