use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::database::models::{ShiftInput, ShiftPatch, ShiftQuery};
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::handlers::shared::{resolve_actor, ApiResponse};
use crate::services::ShiftService;

pub async fn create_shift(
    shifts: web::Data<ShiftService>,
    users: web::Data<UserRepository>,
    input: web::Json<ShiftInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    let detail = shifts.create(&actor, input.into_inner()).await?;
    Ok(ApiResponse::created(detail))
}

pub async fn get_shifts(
    shifts: web::Data<ShiftService>,
    users: web::Data<UserRepository>,
    query: web::Query<ShiftQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    let details = shifts.query(&actor, query.into_inner()).await?;
    Ok(ApiResponse::success(details))
}

pub async fn get_week(
    shifts: web::Data<ShiftService>,
    users: web::Data<UserRepository>,
    path: web::Path<NaiveDate>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    let view = shifts.week_view(&actor, path.into_inner()).await?;
    Ok(ApiResponse::success(view))
}

pub async fn get_shift(
    shifts: web::Data<ShiftService>,
    users: web::Data<UserRepository>,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    let detail = shifts.get(&actor, path.into_inner()).await?;
    Ok(ApiResponse::success(detail))
}

pub async fn update_shift(
    shifts: web::Data<ShiftService>,
    users: web::Data<UserRepository>,
    path: web::Path<Uuid>,
    patch: web::Json<ShiftPatch>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    let detail = shifts
        .update(&actor, path.into_inner(), patch.into_inner())
        .await?;
    Ok(ApiResponse::success(detail))
}

pub async fn delete_shift(
    shifts: web::Data<ShiftService>,
    users: web::Data<UserRepository>,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    shifts.delete(&actor, path.into_inner()).await?;
    Ok(ApiResponse::success_message("Shift deleted"))
}

pub async fn confirm_shift(
    shifts: web::Data<ShiftService>,
    users: web::Data<UserRepository>,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    let assignment = shifts.confirm(&actor, path.into_inner()).await?;
    Ok(ApiResponse::success(assignment))
}
