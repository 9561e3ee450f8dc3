use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{RequestQuery, ShiftRequestInput};
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::handlers::shared::{resolve_actor, ApiResponse};
use crate::services::{ReplacementService, RequestService};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequestBody {
    pub replacement_employee_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectRequestBody {
    pub reason: Option<String>,
}

pub async fn create_request(
    requests: web::Data<RequestService>,
    users: web::Data<UserRepository>,
    input: web::Json<ShiftRequestInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    let request = requests.create(&actor, input.into_inner()).await?;
    Ok(ApiResponse::created(request))
}

pub async fn get_requests(
    requests: web::Data<RequestService>,
    users: web::Data<UserRepository>,
    query: web::Query<RequestQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    let list = requests.list(&actor, query.into_inner()).await?;
    Ok(ApiResponse::success(list))
}

pub async fn available_replacements(
    replacements: web::Data<ReplacementService>,
    users: web::Data<UserRepository>,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    let candidates = replacements
        .available_replacements(&actor, path.into_inner())
        .await?;
    Ok(ApiResponse::success(candidates))
}

pub async fn approve_request(
    requests: web::Data<RequestService>,
    users: web::Data<UserRepository>,
    path: web::Path<Uuid>,
    body: Option<web::Json<ApproveRequestBody>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    let body = body.map(|b| b.into_inner()).unwrap_or_default();
    let request = requests
        .approve(&actor, path.into_inner(), body.replacement_employee_id)
        .await?;
    Ok(ApiResponse::success(request))
}

pub async fn reject_request(
    requests: web::Data<RequestService>,
    users: web::Data<UserRepository>,
    path: web::Path<Uuid>,
    body: Option<web::Json<RejectRequestBody>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    let body = body.map(|b| b.into_inner()).unwrap_or_default();
    let request = requests
        .reject(&actor, path.into_inner(), body.reason)
        .await?;
    Ok(ApiResponse::success(request))
}

pub async fn cancel_request(
    requests: web::Data<RequestService>,
    users: web::Data<UserRepository>,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let actor = resolve_actor(&req, &users).await?;
    let request = requests.cancel(&actor, path.into_inner()).await?;
    Ok(ApiResponse::success(request))
}
