use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::cart_service::CartService;
use crate::auth::AuthenticatedUser;
use crate::domain::cart::CartLineView;
use crate::errors::AppError;
use crate::infrastructure::cart_repo::DieselCartRepository;

pub type Cart = CartService<DieselCartRepository>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: String,
}

impl From<CartLineView> for CartLineResponse {
    fn from(line: CartLineView) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            quantity: line.quantity,
            created_at: line.created_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/cart
#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "The caller's cart lines", body = [CartLineResponse]),
        (status = 401, description = "Missing or malformed identity headers"),
        (status = 403, description = "Caller is not a buyer"),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    service: web::Data<Cart>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user_id = user.require_buyer()?;

    let lines = web::block(move || service.get_cart(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<CartLineResponse> = lines.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/cart
///
/// Adds a product to the caller's cart, incrementing the existing line if
/// the product is already present.
#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "The created or incremented line", body = CartLineResponse),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Product does not exist"),
        (status = 409, description = "Requested quantity exceeds stock"),
    ),
    tag = "cart"
)]
pub async fn add_to_cart(
    service: web::Data<Cart>,
    user: AuthenticatedUser,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.require_buyer()?;
    let body = body.into_inner();

    let line = web::block(move || service.add_to_cart(user_id, body.product_id, body.quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartLineResponse::from(line)))
}

/// PUT /api/cart/{id}
#[utoipa::path(
    put,
    path = "/api/cart/{id}",
    params(("id" = Uuid, Path, description = "Cart line UUID")),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "The updated line", body = CartLineResponse),
        (status = 403, description = "Line belongs to another user"),
        (status = 404, description = "Line or product does not exist"),
        (status = 409, description = "Requested quantity exceeds stock"),
    ),
    tag = "cart"
)]
pub async fn update_quantity(
    service: web::Data<Cart>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateQuantityRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.require_buyer()?;
    let line_id = path.into_inner();
    let quantity = body.into_inner().quantity;

    let line = web::block(move || service.update_quantity(line_id, quantity, user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartLineResponse::from(line)))
}

/// DELETE /api/cart/{id}
#[utoipa::path(
    delete,
    path = "/api/cart/{id}",
    params(("id" = Uuid, Path, description = "Cart line UUID")),
    responses(
        (status = 204, description = "Line removed"),
        (status = 403, description = "Line belongs to another user"),
        (status = 404, description = "Line does not exist"),
    ),
    tag = "cart"
)]
pub async fn remove_from_cart(
    service: web::Data<Cart>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.require_buyer()?;
    let line_id = path.into_inner();

    web::block(move || service.remove_from_cart(line_id, user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
