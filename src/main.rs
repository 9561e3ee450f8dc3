use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use shiftboard::database::{
    init_database,
    repositories::{
        AuditRepository, NotificationRepository, RequestRepository, ShiftRepository,
        UserRepository,
    },
};
use shiftboard::handlers::{notifications, requests, shifts};
use shiftboard::services::{ReplacementService, RequestService, ShiftService};
use shiftboard::Config;

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    let user_repository = UserRepository::new(pool.clone());
    let shift_repository = ShiftRepository::new(pool.clone());
    let request_repository = RequestRepository::new(pool.clone());
    let notification_repository = NotificationRepository::new(pool.clone());
    let audit_repository = AuditRepository::new(pool.clone());

    let shift_service = ShiftService::new(shift_repository.clone(), user_repository.clone());
    let replacement_service =
        ReplacementService::new(shift_repository.clone(), user_repository.clone());
    let request_service = RequestService::new(
        pool.clone(),
        request_repository,
        shift_repository,
        user_repository.clone(),
        notification_repository.clone(),
        audit_repository,
    );

    let user_repo_data = web::Data::new(user_repository);
    let notification_repo_data = web::Data::new(notification_repository);
    let shift_service_data = web::Data::new(shift_service);
    let replacement_service_data = web::Data::new(replacement_service);
    let request_service_data = web::Data::new(request_service);

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(user_repo_data.clone())
            .app_data(notification_repo_data.clone())
            .app_data(shift_service_data.clone())
            .app_data(replacement_service_data.clone())
            .app_data(request_service_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type", "Accept", "X-Actor-Id"])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health)
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/shifts")
                            .route("", web::post().to(shifts::create_shift))
                            .route("", web::get().to(shifts::get_shifts))
                            .route("/week/{date}", web::get().to(shifts::get_week))
                            .route("/{id}", web::get().to(shifts::get_shift))
                            .route("/{id}", web::put().to(shifts::update_shift))
                            .route("/{id}", web::delete().to(shifts::delete_shift))
                            .route("/{id}/confirm", web::post().to(shifts::confirm_shift)),
                    )
                    .service(
                        web::scope("/requests")
                            .route("", web::post().to(requests::create_request))
                            .route("", web::get().to(requests::get_requests))
                            .route(
                                "/shift/{shift_id}/available",
                                web::get().to(requests::available_replacements),
                            )
                            .route("/{id}/approve", web::post().to(requests::approve_request))
                            .route("/{id}/reject", web::post().to(requests::reject_request))
                            .route("/{id}/cancel", web::post().to(requests::cancel_request)),
                    )
                    .service(
                        web::scope("/notifications")
                            .route("", web::get().to(notifications::get_notifications))
                            .route("/{id}/read", web::post().to(notifications::mark_read)),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await?;

    Ok(())
}
