//! Request identity. Authentication itself happens upstream (gateway or
//! session layer); this crate only consumes the resolved identity headers
//! and enforces role and ownership rules.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Buyer,
    Seller,
}

impl Role {
    fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("BUYER") {
            Some(Role::Buyer)
        } else if s.eq_ignore_ascii_case("SELLER") {
            Some(Role::Seller)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Cart and order endpoints are buyer-only. Returns the caller's id so
    /// handlers thread it into every core operation explicitly.
    pub fn require_buyer(&self) -> Result<Uuid, AppError> {
        if self.role == Role::Buyer {
            Ok(self.id)
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_identity(req))
    }
}

fn extract_identity(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let id = header_value(req, USER_ID_HEADER)?;
    let id = Uuid::parse_str(id).map_err(|_| AppError::Unauthenticated)?;
    let role = Role::parse(header_value(req, USER_ROLE_HEADER)?).ok_or(AppError::Unauthenticated)?;
    Ok(AuthenticatedUser { id, role })
}

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str, AppError> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthenticated)
}
