use chrono::{DateTime, Utc};
use shared::models::host::{Host, ProfilesStatus};
use shared::{Result, SharedError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::DatabaseConfig;

const CREATE_HOSTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS hosts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    hostname TEXT NOT NULL UNIQUE,
    ip_address TEXT NOT NULL,
    firewall_status BOOLEAN NOT NULL,
    profiles_status TEXT NOT NULL DEFAULT '{}',
    last_seen TEXT NOT NULL,
    is_alerting BOOLEAN NOT NULL DEFAULT 0
)
"#;

const HOST_COLUMNS: &str =
    "id, hostname, ip_address, firewall_status, profiles_status, last_seen, is_alerting";

/// Host fields as first reported, before the database assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHost {
    pub hostname: String,
    pub ip_address: String,
    pub firewall_status: bool,
    pub profiles_status: ProfilesStatus,
    pub last_seen: DateTime<Utc>,
}

/// The host state an alert was sent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertedHost {
    pub id: i64,
    pub last_seen: DateTime<Utc>,
}

impl From<&Host> for AlertedHost {
    fn from(host: &Host) -> Self {
        Self {
            id: host.id,
            last_seen: host.last_seen,
        }
    }
}

#[async_trait::async_trait]
pub trait HostRepository: Send + Sync {
    async fn find_by_hostname(&self, hostname: &str) -> Result<Option<Host>>;
    async fn insert(&self, host: NewHost) -> Result<Host>;
    async fn update(&self, host: &Host) -> Result<Host>;
    /// All hosts ordered by hostname.
    async fn list_all(&self) -> Result<Vec<Host>>;
    /// Flag hosts as alerted, skipping any that reported since the alert was
    /// built. Returns how many were flagged.
    async fn mark_alerting(&self, hosts: &[AlertedHost]) -> Result<usize>;
    async fn ping(&self) -> Result<()>;
}

// Database row; profiles are stored as JSON text.
#[derive(Debug, sqlx::FromRow)]
struct HostRow {
    id: i64,
    hostname: String,
    ip_address: String,
    firewall_status: bool,
    profiles_status: String,
    last_seen: DateTime<Utc>,
    is_alerting: bool,
}

impl TryFrom<HostRow> for Host {
    type Error = SharedError;

    fn try_from(row: HostRow) -> Result<Self> {
        let profiles_status = serde_json::from_str(&row.profiles_status)?;
        Ok(Host {
            id: row.id,
            hostname: row.hostname,
            ip_address: row.ip_address,
            firewall_status: row.firewall_status,
            profiles_status,
            last_seen: row.last_seen,
            is_alerting: row.is_alerting,
        })
    }
}

fn db_error(err: sqlx::Error) -> SharedError {
    SharedError::Database(err.to_string())
}

#[derive(Clone)]
pub struct SqliteHostRepository {
    pub pool: SqlitePool,
}

impl SqliteHostRepository {
    pub async fn connect(config: &DatabaseConfig) -> std::result::Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        // Every connection to an in-memory database sees its own empty database,
        // so keep exactly one alive for the lifetime of the pool.
        let in_memory = config.url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        log::info!("Connected to host database at {}", config.url);
        Ok(repo)
    }

    pub async fn ensure_schema(&self) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(CREATE_HOSTS_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl HostRepository for SqliteHostRepository {
    async fn find_by_hostname(&self, hostname: &str) -> Result<Option<Host>> {
        let row = sqlx::query_as::<_, HostRow>(&format!(
            "SELECT {} FROM hosts WHERE hostname = ?",
            HOST_COLUMNS
        ))
        .bind(hostname)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Host::try_from).transpose()
    }

    async fn insert(&self, host: NewHost) -> Result<Host> {
        let profiles = serde_json::to_string(&host.profiles_status)?;
        let row = sqlx::query_as::<_, HostRow>(&format!(
            "INSERT INTO hosts (hostname, ip_address, firewall_status, profiles_status, last_seen, is_alerting) \
             VALUES (?, ?, ?, ?, ?, 0) RETURNING {}",
            HOST_COLUMNS
        ))
        .bind(&host.hostname)
        .bind(&host.ip_address)
        .bind(host.firewall_status)
        .bind(profiles)
        .bind(host.last_seen)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        log::debug!("Registered new host {}", row.hostname);
        Host::try_from(row)
    }

    async fn update(&self, host: &Host) -> Result<Host> {
        let profiles = serde_json::to_string(&host.profiles_status)?;
        let row = sqlx::query_as::<_, HostRow>(&format!(
            "UPDATE hosts SET ip_address = ?, firewall_status = ?, profiles_status = ?, \
             last_seen = ?, is_alerting = ? WHERE id = ? RETURNING {}",
            HOST_COLUMNS
        ))
        .bind(&host.ip_address)
        .bind(host.firewall_status)
        .bind(profiles)
        .bind(host.last_seen)
        .bind(host.is_alerting)
        .bind(host.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or_else(|| SharedError::NotFound(format!("Host {} not found", host.id)))?;

        Host::try_from(row)
    }

    async fn list_all(&self) -> Result<Vec<Host>> {
        let rows = sqlx::query_as::<_, HostRow>(&format!(
            "SELECT {} FROM hosts ORDER BY hostname",
            HOST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(Host::try_from).collect()
    }

    async fn mark_alerting(&self, hosts: &[AlertedHost]) -> Result<usize> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let mut marked = 0;
        for host in hosts {
            let result = sqlx::query("UPDATE hosts SET is_alerting = 1 WHERE id = ? AND last_seen = ?")
                .bind(host.id)
                .bind(host.last_seen)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
            marked += result.rows_affected() as usize;
        }
        tx.commit().await.map_err(db_error)?;
        Ok(marked)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(db_error)
    }
}
