use actix_web::{get, HttpResponse, Responder};
use utoipa::OpenApi;

use crate::error::ApiError;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health::health_check,
        crate::health::detailed_health_check,
        crate::health::version_info,
        crate::host::controller::receive_heartbeat,
        crate::host::controller::list_hosts,
        crate::host::controller::get_settings,
        crate::host::controller::trigger_alert,
    ),
    components(schemas(
        crate::health::HealthResponse,
        crate::health::VersionInfo,
        crate::alerts::scheduler::SchedulerStatus,
        ApiError,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "version", description = "Build information"),
        (name = "hosts", description = "Agent heartbeats and host inventory"),
        (name = "alerts", description = "Alert e-mails for silent or unprotected hosts"),
    ),
    info(
        title = "FirewallWatch API",
        description = "Receives firewall heartbeats from Windows agents and e-mails an aggregated alert when hosts go silent or report their firewall disabled.\n\n## Authentication\n\nWrite endpoints require the shared agent key:\n\n```\nX-API-KEY: <key>\n```",
        version = "0.3.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Development server"),
    )
)]
pub struct ApiDoc;

#[get("/api-docs/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
