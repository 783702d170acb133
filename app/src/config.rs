use crate::error::ConfigError;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::env;
use std::net::SocketAddr;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 8000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_DB_ACQUIRE_TIMEOUT_MS: u64 = 5000;

pub struct Config {
    inner: RwLock<InnerConfig>,
}

struct InnerConfig {
    database_url: Option<String>,
    bind_addr: String,
    server_port: u16,
    db_max_connections: u32,
    db_acquire_timeout_ms: u64,
}

impl Config {
    pub fn database_url(&self) -> Result<String, ConfigError> {
        let inner = self.inner.read();
        inner
            .database_url
            .clone()
            .ok_or(ConfigError::MissingVar("DATABASE_URL"))
    }

    pub fn server_addr(&self) -> Result<SocketAddr, ConfigError> {
        let inner = self.inner.read();
        let addr = format!("{}:{}", inner.bind_addr, inner.server_port);
        addr.parse().map_err(|_| ConfigError::InvalidAddr(addr))
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner.read().db_max_connections
    }

    pub fn db_acquire_timeout_ms(&self) -> u64 {
        self.inner.read().db_acquire_timeout_ms
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {}={}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv::dotenv().ok();

    let database_url = env::var("DATABASE_URL").ok();
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned());
    let server_port = parse_or("SERVER_PORT", DEFAULT_SERVER_PORT);
    let db_max_connections = parse_or("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
    let db_acquire_timeout_ms = parse_or("DB_ACQUIRE_TIMEOUT_MS", DEFAULT_DB_ACQUIRE_TIMEOUT_MS);

    Config {
        inner: RwLock::new(InnerConfig {
            database_url,
            bind_addr,
            server_port,
            db_max_connections,
            db_acquire_timeout_ms,
        }),
    }
});
