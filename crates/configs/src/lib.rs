use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub marketplace: MarketplaceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Empty means "no database": the server starts on mock data when allowed.
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            run_migrations: true,
        }
    }
}

/// Dual-write storage routing.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// `postgres` or `file`
    #[serde(default = "default_primary")]
    pub primary: String,
    #[serde(default = "default_true")]
    pub dual_write: bool,
    #[serde(default = "default_true")]
    pub fallback_reads: bool,
    #[serde(default = "default_file_path")]
    pub file_path: String,
    #[serde(default = "default_max_sync_errors")]
    pub max_sync_errors: usize,
    #[serde(default = "default_true")]
    pub mock_fallback: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            dual_write: true,
            fallback_reads: true,
            file_path: default_file_path(),
            max_sync_errors: default_max_sync_errors(),
            mock_fallback: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
    #[serde(default = "default_fee_percent")]
    pub platform_fee_percent: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self { platform_fee_percent: default_fee_percent(), currency: default_currency() }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_true() -> bool { true }
fn default_primary() -> String { "postgres".into() }
fn default_file_path() -> String { "data/mirror.json".into() }
fn default_max_sync_errors() -> usize { 1000 }
fn default_fee_percent() -> f64 { 10.0 }
fn default_currency() -> String { "NGN".into() }

pub const STORE_KINDS: [&str; 2] = ["postgres", "file"];

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Defaults plus environment variables, for running without a config file.
    pub fn from_env() -> Result<Self> {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        cfg.server.worker_threads = std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.storage.normalize_from_env();
        self.storage.validate()?;
        self.marketplace.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_configured() {
            let lower = self.url.to_lowercase();
            if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
                return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
            }
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(primary) = std::env::var("STORAGE_PRIMARY") {
            self.primary = primary;
        }
        self.primary = self.primary.trim().to_ascii_lowercase();
    }

    pub fn validate(&self) -> Result<()> {
        if !STORE_KINDS.contains(&self.primary.as_str()) {
            return Err(anyhow!("storage.primary must be one of {:?}, got '{}'", STORE_KINDS, self.primary));
        }
        if self.file_path.trim().is_empty() {
            return Err(anyhow!("storage.file_path must not be empty"));
        }
        if self.max_sync_errors == 0 {
            return Err(anyhow!("storage.max_sync_errors must be >= 1"));
        }
        Ok(())
    }
}

impl MarketplaceConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.platform_fee_percent) {
            return Err(anyhow!("marketplace.platform_fee_percent must be within 0..=100"));
        }
        if self.currency.trim().len() != 3 {
            return Err(anyhow!("marketplace.currency must be a 3-letter code"));
        }
        Ok(())
    }
}
