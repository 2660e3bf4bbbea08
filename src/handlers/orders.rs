use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::auth::AuthenticatedUser;
use crate::domain::order::{OrderLineView, OrderView};
use crate::errors::AppError;
use crate::infrastructure::order_repo::DieselOrderRepository;

pub type Orders = OrderService<DieselOrderRepository>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Optional discount code; blank is treated as absent.
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: String,
    pub coupon_code: Option<String>,
    pub discount: String,
    pub final_amount: String,
    pub status: String,
    pub created_at: String,
    pub lines: Vec<OrderLineResponse>,
}

impl From<OrderLineView> for OrderLineResponse {
    fn from(line: OrderLineView) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            unit_price: line.unit_price.to_string(),
        }
    }
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            total_amount: order.total_amount.to_string(),
            coupon_code: order.coupon_code,
            discount: order.discount.to_string(),
            final_amount: order.final_amount.to_string(),
            status: order.status.as_str().to_string(),
            created_at: order.created_at.to_rfc3339(),
            lines: order.lines.into_iter().map(Into::into).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders/checkout
///
/// Converts the caller's cart into an order. Stock validation, pricing,
/// coupon application, stock decrement, and cart clearing all happen in a
/// single database transaction; a failure at any step persists nothing.
#[utoipa::path(
    post,
    path = "/api/orders/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Empty cart or invalid coupon"),
        (status = 404, description = "A cart line references a deleted product"),
        (status = 409, description = "A line's quantity exceeds current stock"),
    ),
    tag = "orders"
)]
pub async fn checkout(
    service: web::Data<Orders>,
    user: AuthenticatedUser,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.require_buyer()?;
    let body = body.into_inner();

    let order = web::block(move || service.checkout(user_id, body.coupon_code.as_deref()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "The caller's orders, most recent first", body = [OrderResponse]),
    ),
    tag = "orders"
)]
pub async fn order_history(
    service: web::Data<Orders>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user_id = user.require_buyer()?;

    let orders = web::block(move || service.order_history(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order does not exist"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<Orders>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.require_buyer()?;
    let order_id = path.into_inner();

    let order = web::block(move || service.order_by_id(order_id, user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
