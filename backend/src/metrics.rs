use actix_web::{get, web, HttpResponse, Responder};
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Prometheus metrics for the monitoring API.
///
/// Each instance owns its registry so tests can build as many as they like.
pub struct Metrics {
    registry: Registry,
    /// Total HTTP requests by method and status code
    pub http_requests: IntCounterVec,
    /// Heartbeats received by reported firewall state
    pub heartbeats: IntCounterVec,
    /// Alert e-mails by trigger and outcome
    pub alerts: IntCounterVec,
    /// Alert checks by outcome
    pub scheduler_runs: IntCounterVec,
    /// Hosts currently known to the service
    pub monitored_hosts: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("firewallwatch".to_string()), None)?;

        let http_requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "status_code"],
        )?;
        let heartbeats = IntCounterVec::new(
            Opts::new("heartbeats_total", "Heartbeats received by reported firewall state"),
            &["firewall"],
        )?;
        let alerts = IntCounterVec::new(
            Opts::new("alerts_total", "Alert e-mails by trigger and outcome"),
            &["trigger", "outcome"],
        )?;
        let scheduler_runs = IntCounterVec::new(
            Opts::new("alert_checks_total", "Periodic alert checks by outcome"),
            &["status"],
        )?;
        let monitored_hosts = IntGauge::new("monitored_hosts", "Hosts currently known")?;

        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(heartbeats.clone()))?;
        registry.register(Box::new(alerts.clone()))?;
        registry.register(Box::new(scheduler_runs.clone()))?;
        registry.register(Box::new(monitored_hosts.clone()))?;

        Ok(Self {
            registry,
            http_requests,
            heartbeats,
            alerts,
            scheduler_runs,
            monitored_hosts,
        })
    }

    pub fn record_http_request(&self, method: &str, status_code: u16) {
        self.http_requests
            .with_label_values(&[method, &status_code.to_string()])
            .inc();
    }

    pub fn record_heartbeat(&self, firewall_ok: bool) {
        let label = if firewall_ok { "ok" } else { "at_risk" };
        self.heartbeats.with_label_values(&[label]).inc();
    }

    pub fn record_alert(&self, trigger: &str, sent: bool) {
        let outcome = if sent { "sent" } else { "failed" };
        self.alerts.with_label_values(&[trigger, outcome]).inc();
    }

    pub fn record_scheduler_run(&self, status: &str) {
        self.scheduler_runs.with_label_values(&[status]).inc();
    }

    /// Text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[get("/metrics")]
pub async fn metrics_handler(metrics: web::Data<Metrics>) -> impl Responder {
    match metrics.render() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            log::error!("Failed to encode metrics: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
