use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lifecycle of an order. Checkout always produces `Completed`; `Pending`
/// and `Cancelled` are representable for future transitions but nothing in
/// the checkout workflow writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(OrderStatus::Pending),
            "COMPLETED" => Some(OrderStatus::Completed),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// Purchase-time snapshot of a cart line. Carries the product name and unit
/// price as of checkout so later catalog edits never alter order history.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: BigDecimal,
    pub coupon_code: Option<String>,
    pub discount: BigDecimal,
    pub final_amount: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
}

/// Sum of `unit_price * quantity` over `(unit_price, quantity)` pairs.
pub fn cart_total<'a, I>(lines: I) -> BigDecimal
where
    I: IntoIterator<Item = (&'a BigDecimal, i32)>,
{
    lines
        .into_iter()
        .fold(BigDecimal::zero(), |acc, (price, quantity)| {
            acc + price * BigDecimal::from(quantity)
        })
}

/// The amount actually charged: total minus discount, floored at zero so a
/// coupon larger than the cart never produces a negative charge.
pub fn final_amount(total_amount: &BigDecimal, discount: &BigDecimal) -> BigDecimal {
    let amount = total_amount - discount;
    if amount < BigDecimal::zero() {
        BigDecimal::zero()
    } else {
        amount
    }
}
