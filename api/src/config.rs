//! Process configuration read from environment variables.
//!
//! Unset or unparsable values fall back to their defaults.

use log::LevelFilter;
use std::env;

const DEFAULT_LOG_FILE: &str = "players-api.log";
const DEFAULT_KEYDB_URL: &str = "redis://127.0.0.1:5556/";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Where player records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    KeyDb,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub log_level: LevelFilter,
    pub log_file: Option<String>,
    pub store: StoreKind,
    pub keydb_url: String,
    pub bind_addr: String,
    pub port: u16,
    pub tls: Option<TlsPaths>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let tls = match (lookup("PLAYERS_TLS_CERT"), lookup("PLAYERS_TLS_KEY")) {
            (Some(cert), Some(key)) => Some(TlsPaths { cert, key }),
            _ => None,
        };

        Self {
            log_level: resolve_log_level(lookup("PLAYERS_LOG_LEVEL")),
            log_file: resolve_log_file(lookup("PLAYERS_LOG_FILE")),
            store: resolve_store(lookup("PLAYERS_STORE")),
            keydb_url: lookup("PLAYERS_KEYDB_URL").unwrap_or_else(|| DEFAULT_KEYDB_URL.to_string()),
            bind_addr: lookup("PLAYERS_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port: lookup("PLAYERS_PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            tls,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_log_level(value: &str) -> Option<LevelFilter> {
    match value.to_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

fn resolve_log_level(value: Option<String>) -> LevelFilter {
    value
        .as_deref()
        .and_then(parse_log_level)
        .unwrap_or(LevelFilter::Info)
}

fn resolve_log_file(value: Option<String>) -> Option<String> {
    match value {
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        None => Some(DEFAULT_LOG_FILE.to_string()),
    }
}

fn resolve_store(value: Option<String>) -> StoreKind {
    match value.as_deref().map(str::trim) {
        Some(kind) if kind.eq_ignore_ascii_case("memory") => StoreKind::Memory,
        _ => StoreKind::KeyDb,
    }
}
