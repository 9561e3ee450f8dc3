use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::database::repositories::{NotificationRepository, UserRepository};
use crate::error::AppError;
use crate::handlers::shared::{resolve_actor, ApiResponse};

pub async fn get_notifications(
    notifications: web::Data<NotificationRepository>,
    users: web::Data<UserRepository>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    let list = notifications.list_for_user(actor.id).await?;
    Ok(ApiResponse::success(list))
}

pub async fn mark_read(
    notifications: web::Data<NotificationRepository>,
    users: web::Data<UserRepository>,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    let updated = notifications.mark_read(path.into_inner(), actor.id).await?;
    if !updated {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }
    Ok(ApiResponse::success_message("Notification marked as read"))
}
