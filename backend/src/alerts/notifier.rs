use chrono::{DateTime, Utc};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use shared::models::host::{Host, HostStatus};
use shared::{Result, SharedError};

use crate::config::{AlertConfig, SmtpConfig};

/// What caused an alert to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTrigger {
    Scheduled,
    Manual,
}

impl AlertTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertTrigger::Scheduled => "scheduled",
            AlertTrigger::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertEntry {
    pub hostname: String,
    pub ip_address: String,
    pub status: HostStatus,
    pub last_seen: DateTime<Utc>,
}

impl AlertEntry {
    pub fn new(host: &Host, status: HostStatus) -> Self {
        Self {
            hostname: host.hostname.clone(),
            ip_address: host.ip_address.clone(),
            status,
            last_seen: host.last_seen,
        }
    }
}

/// One aggregated alert covering every problematic host.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertReport {
    pub entries: Vec<AlertEntry>,
    pub trigger: AlertTrigger,
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl AlertReport {
    pub fn new(entries: Vec<AlertEntry>, trigger: AlertTrigger) -> Self {
        Self { entries, trigger }
    }

    pub fn subject(&self) -> String {
        format!("FirewallWatch - {} host(s) en alerta", self.entries.len())
    }

    fn reason(&self) -> &'static str {
        match self.trigger {
            AlertTrigger::Manual => "Manual alert trigger",
            AlertTrigger::Scheduled => "Automatic alert based on monitoring rules",
        }
    }

    pub fn plain_body(&self) -> String {
        let mut lines = vec![
            "FirewallWatch - Alert Report".to_string(),
            String::new(),
            format!("Total problematic hosts: {}", self.entries.len()),
            String::new(),
        ];
        for entry in &self.entries {
            lines.push(format!(
                "- {} ({}) - {} - last seen {}",
                entry.hostname,
                entry.ip_address,
                entry.status,
                entry.last_seen.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        lines.push(String::new());
        lines.push(self.reason().to_string());
        lines.join("\n")
    }

    pub fn html_body(&self) -> String {
        let rows: String = self
            .entries
            .iter()
            .map(|entry| {
                let (label, color) = match entry.status {
                    HostStatus::AtRisk => ("At Risk", "#f97373"),
                    _ => ("Silent", "#facc15"),
                };
                format!(
                    "<tr><td>{}</td><td style='font-family:monospace;'>{}</td>\
                     <td style='color:{};font-weight:600;'>{}</td><td>{}</td></tr>",
                    escape_html(&entry.hostname),
                    escape_html(&entry.ip_address),
                    color,
                    label,
                    entry.last_seen.format("%Y-%m-%d %H:%M:%S UTC")
                )
            })
            .collect();

        format!(
            "<html><body style='background-color:#030712;color:#e5e7eb;font-family:sans-serif;padding:24px;'>\
             <h1 style='font-size:18px;'>FirewallWatch Alerts</h1>\
             <p style='font-size:12px;'>{}</p>\
             <p>Se detectaron los siguientes hosts con posibles problemas de firewall o sin reportar actividad:</p>\
             <table style='width:100%;border-collapse:collapse;font-size:13px;'>\
             <thead><tr><th>Host</th><th>IP</th><th>Estado</th><th>Último heartbeat</th></tr></thead>\
             <tbody>{}</tbody></table></body></html>",
            self.reason(),
            rows
        )
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn send(&self, report: &AlertReport) -> Result<()>;
}

/// Sends alert reports over SMTP with STARTTLS.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipient: Mailbox,
}

impl SmtpNotifier {
    pub fn new(smtp: &SmtpConfig, alerts: &AlertConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.hostname)
            .map_err(|e| SharedError::Notification(format!("Invalid SMTP relay {}: {}", smtp.hostname, e)))?
            .port(smtp.port)
            .credentials(Credentials::new(smtp.username.clone(), smtp.password.clone()))
            .build();

        let sender = alerts
            .sender_email
            .parse::<Mailbox>()
            .map_err(|e| SharedError::Validation(format!("Invalid sender address: {}", e)))?;
        let recipient = alerts
            .recipient_email
            .parse::<Mailbox>()
            .map_err(|e| SharedError::Validation(format!("Invalid recipient address: {}", e)))?;

        Ok(Self {
            transport,
            sender,
            recipient,
        })
    }

    pub fn build_message(&self, report: &AlertReport) -> Result<Message> {
        Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(report.subject())
            .multipart(MultiPart::alternative_plain_html(
                report.plain_body(),
                report.html_body(),
            ))
            .map_err(|e| SharedError::Notification(format!("Failed to build alert e-mail: {}", e)))
    }
}

#[async_trait::async_trait]
impl AlertNotifier for SmtpNotifier {
    async fn send(&self, report: &AlertReport) -> Result<()> {
        if report.entries.is_empty() {
            return Ok(());
        }

        let message = self.build_message(report)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| SharedError::Notification(format!("Failed to send alert e-mail: {}", e)))?;

        log::info!("Alert email sent for {} host(s)", report.entries.len());
        Ok(())
    }
}
