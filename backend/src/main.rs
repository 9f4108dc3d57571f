use actix_web::{web, App, HttpServer};
use anyhow::Context;
use backend::alerts::{AlertNotifier, AlertScheduler, SmtpNotifier};
use backend::config::Config;
use backend::host::{HostRepository, HostUseCase, SqliteHostRepository};
use backend::metrics::Metrics;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    let repo = SqliteHostRepository::connect(&config.database)
        .await
        .with_context(|| format!("Failed to open host database at {}", config.database.url))?;
    let repo: Arc<dyn HostRepository> = Arc::new(repo);

    let notifier: Arc<dyn AlertNotifier> = Arc::new(
        SmtpNotifier::new(&config.smtp, &config.alerts).context("Failed to configure SMTP notifier")?,
    );
    let metrics = Arc::new(Metrics::new().context("Failed to register metrics")?);

    let usecase = Arc::new(HostUseCase::new(
        repo,
        notifier,
        config.alerts.clone(),
        metrics.clone(),
    ));

    let scheduler = AlertScheduler::new(usecase.clone(), metrics.clone(), config.alerts.check_interval());
    scheduler.start();

    let usecase_data = web::Data::new(usecase);
    let scheduler_data = web::Data::new(scheduler.clone());
    let metrics_data = web::Data::from(metrics);
    let api_key = config.security.api_key.clone();

    log::info!("Starting server on {}:{}", config.server.host, config.server.port);

    HttpServer::new(move || {
        let api_key = api_key.clone();
        App::new()
            .wrap(backend::middleware::SecurityHeaders)
            .wrap(backend::middleware::cors_middleware())
            .wrap(backend::middleware::Logger)
            .app_data(web::JsonConfig::default().limit(64 * 1024))
            .app_data(usecase_data.clone())
            .app_data(scheduler_data.clone())
            .app_data(metrics_data.clone())
            .service(backend::health::health_check)
            .service(backend::health::detailed_health_check)
            .service(backend::health::version_info)
            .service(backend::metrics::metrics_handler)
            .service(backend::openapi::openapi_json)
            .configure(move |cfg| backend::host::configure_routes(cfg, &api_key))
    })
    .workers(config.server.workers)
    .bind((config.server.host.as_str(), config.server.port))
    .with_context(|| format!("Failed to bind {}:{}", config.server.host, config.server.port))?
    .run()
    .await?;

    scheduler.stop();
    Ok(())
}
