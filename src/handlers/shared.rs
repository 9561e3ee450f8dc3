use actix_web::{HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::services::Actor;

/// Standard response envelope for every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> HttpResponse {
        HttpResponse::Ok().json(Self {
            success: true,
            data: Some(data),
            message: None,
        })
    }

    pub fn created(data: T) -> HttpResponse {
        HttpResponse::Created().json(Self {
            success: true,
            data: Some(data),
            message: None,
        })
    }
}

impl ApiResponse<()> {
    pub fn success_message(message: &str) -> HttpResponse {
        HttpResponse::Ok().json(Self {
            success: true,
            data: None,
            message: Some(message.to_string()),
        })
    }

    // Body only; error_response in error.rs picks the status code.
    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

/// Resolves the acting user from the `X-Actor-Id` header against the
/// user directory. Credential verification happens upstream; this layer
/// only refuses unknown or deactivated identities.
pub async fn resolve_actor(
    req: &HttpRequest,
    users: &UserRepository,
) -> Result<Actor, AppError> {
    let header = req
        .headers()
        .get("X-Actor-Id")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let id = Uuid::parse_str(header).map_err(|_| AppError::Unauthorized)?;

    let user = users
        .find_by_id(id)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::Unauthorized)?;

    Ok(Actor::from(user))
}
