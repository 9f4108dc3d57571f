use actix_web::{web, HttpResponse};
use chrono::Utc;
use shared::dto::host::{AlertTriggerResponse, HeartbeatPayload};
use std::sync::Arc;
use validator::Validate;

use crate::alerts::notifier::AlertTrigger;
use crate::auth::ApiKeyMiddleware;
use crate::error::ApiError;
use crate::host::usecase::HostUseCase;

#[utoipa::path(
    post,
    path = "/api/heartbeat",
    tag = "hosts",
    params(("X-API-KEY" = String, Header, description = "Shared agent API key")),
    responses(
        (status = 200, description = "Heartbeat recorded; returns the stored host"),
        (status = 400, description = "Invalid payload", body = ApiError),
        (status = 403, description = "Missing or invalid API key")
    )
)]
pub async fn receive_heartbeat(
    payload: web::Json<HeartbeatPayload>,
    usecase: web::Data<Arc<HostUseCase>>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;
    let host = usecase.record_heartbeat(payload.into_inner(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(host))
}

#[utoipa::path(
    get,
    path = "/api/hosts",
    tag = "hosts",
    responses(
        (status = 200, description = "Known hosts ordered by hostname")
    )
)]
pub async fn list_hosts(usecase: web::Data<Arc<HostUseCase>>) -> Result<HttpResponse, ApiError> {
    let hosts = usecase.list_hosts().await?;
    Ok(HttpResponse::Ok().json(hosts))
}

#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "hosts",
    responses(
        (status = 200, description = "Alert timeout and recipient")
    )
)]
pub async fn get_settings(usecase: web::Data<Arc<HostUseCase>>) -> HttpResponse {
    HttpResponse::Ok().json(usecase.settings())
}

#[utoipa::path(
    post,
    path = "/api/alerts/trigger",
    tag = "alerts",
    params(("X-API-KEY" = String, Header, description = "Shared agent API key")),
    responses(
        (status = 200, description = "Alert check ran; returns the alerted host count"),
        (status = 403, description = "Missing or invalid API key")
    )
)]
pub async fn trigger_alert(usecase: web::Data<Arc<HostUseCase>>) -> Result<HttpResponse, ApiError> {
    let outcome = usecase.run_alert_check(AlertTrigger::Manual, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(AlertTriggerResponse {
        alerted_hosts: outcome.alerted_hosts,
        sent: outcome.sent,
    }))
}

/// Mount the `/api` routes; write endpoints require the API key.
pub fn configure_routes(cfg: &mut web::ServiceConfig, api_key: &str) {
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/heartbeat")
                    .wrap(ApiKeyMiddleware::new(api_key))
                    .route(web::post().to(receive_heartbeat)),
            )
            .service(web::resource("/hosts").route(web::get().to(list_hosts)))
            .service(web::resource("/settings").route(web::get().to(get_settings)))
            .service(
                web::resource("/alerts/trigger")
                    .wrap(ApiKeyMiddleware::new(api_key))
                    .route(web::post().to(trigger_alert)),
            ),
    );
}
