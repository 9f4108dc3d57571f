use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::timeout;

use crate::alerts::scheduler::{AlertScheduler, SchedulerStatus};
use crate::host::usecase::HostUseCase;

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: unix_timestamp(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct ServiceHealthStatus {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_time_ms: Option<u64>,
}

impl ServiceHealthStatus {
    fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            message: None,
            response_time_ms: None,
        }
    }

    fn unhealthy(message: String) -> Self {
        Self {
            status: "unhealthy".to_string(),
            message: Some(message),
            response_time_ms: None,
        }
    }

    fn with_response_time(mut self, ms: u64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Check database connectivity
async fn check_database(usecase: &HostUseCase) -> ServiceHealthStatus {
    let start = std::time::Instant::now();

    match timeout(Duration::from_secs(5), usecase.ping()).await {
        Ok(Ok(())) => {
            let elapsed = start.elapsed().as_millis() as u64;
            ServiceHealthStatus::healthy().with_response_time(elapsed)
        }
        Ok(Err(e)) => ServiceHealthStatus::unhealthy(format!("Database query failed: {}", e)),
        Err(_) => ServiceHealthStatus::unhealthy("Database connection timeout".to_string()),
    }
}

fn check_scheduler(status: &SchedulerStatus) -> ServiceHealthStatus {
    if !status.is_running {
        ServiceHealthStatus::unhealthy("Alert scheduler is not running".to_string())
    } else if let Some(error) = &status.last_error {
        ServiceHealthStatus::unhealthy(format!("Last alert check failed: {}", error))
    } else {
        ServiceHealthStatus::healthy()
    }
}

#[derive(Serialize)]
struct DetailedHealthResponse {
    status: String,
    timestamp: u64,
    version: &'static str,
    services: ServicesHealth,
    scheduler: SchedulerStatus,
}

#[derive(Serialize)]
struct ServicesHealth {
    database: ServiceHealthStatus,
    scheduler: ServiceHealthStatus,
}

#[utoipa::path(
    get,
    path = "/health/detailed",
    tag = "health",
    responses(
        (status = 200, description = "All services are healthy"),
        (status = 503, description = "One or more services are unhealthy")
    )
)]
#[get("/health/detailed")]
pub async fn detailed_health_check(
    usecase: web::Data<Arc<HostUseCase>>,
    scheduler: web::Data<AlertScheduler>,
) -> impl Responder {
    let database = check_database(usecase.get_ref()).await;
    let scheduler_status = scheduler.status();
    let scheduler_health = check_scheduler(&scheduler_status);

    let overall_status = if database.is_healthy() && scheduler_health.is_healthy() {
        "ok"
    } else {
        "degraded"
    };

    let response = DetailedHealthResponse {
        status: overall_status.to_string(),
        timestamp: unix_timestamp(),
        version: env!("CARGO_PKG_VERSION"),
        services: ServicesHealth {
            database,
            scheduler: scheduler_health,
        },
        scheduler: scheduler_status,
    };

    if overall_status == "ok" {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[derive(Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct VersionInfo {
    pub version: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
    pub environment: String,
}

#[utoipa::path(
    get,
    path = "/api/version",
    tag = "version",
    responses(
        (status = 200, description = "Version information", body = VersionInfo)
    )
)]
#[get("/api/version")]
pub async fn version_info() -> impl Responder {
    HttpResponse::Ok().json(VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        build_date: option_env!("BUILD_DATE").map(|s| s.to_string()),
        git_commit: option_env!("GIT_COMMIT").map(|s| s.to_string()),
        environment: std::env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()),
    })
}
