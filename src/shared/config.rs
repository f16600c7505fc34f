use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_GATEWAY_URL: &str = "http://localhost:8080";
const DEFAULT_HEALTH_PATH: &str = "/api/health";
const DATA_DIR_NAME: &str = "travel-sync";
const DATABASE_FILE: &str = "offline.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub gateway: GatewayConfig,
    pub connectivity: ConnectivityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Transport-level timeout applied per request; the drain itself has none.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    pub probe_enabled: bool,
    pub probe_interval_secs: u64,
    pub health_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: default_database_url(),
                max_connections: 5,
            },
            gateway: GatewayConfig {
                base_url: DEFAULT_GATEWAY_URL.to_string(),
                request_timeout_secs: 30,
            },
            connectivity: ConnectivityConfig {
                probe_enabled: true,
                probe_interval_secs: 15,
                health_path: DEFAULT_HEALTH_PATH.to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from defaults overridden by whatever `lookup` yields.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("TRAVEL_SYNC_DATABASE_URL")
            && !v.trim().is_empty()
        {
            cfg.database.url = v.trim().to_string();
        }
        if let Some(v) = lookup("TRAVEL_SYNC_DB_MAX_CONNECTIONS")
            && let Some(value) = parse_u32(&v)
        {
            cfg.database.max_connections = value;
        }

        if let Some(v) = lookup("TRAVEL_SYNC_GATEWAY_URL")
            && !v.trim().is_empty()
        {
            cfg.gateway.base_url = v.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("TRAVEL_SYNC_GATEWAY_TIMEOUT_SECS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.gateway.request_timeout_secs = value;
        }

        if let Some(v) = lookup("TRAVEL_SYNC_PROBE_ENABLED") {
            cfg.connectivity.probe_enabled = parse_bool(&v, cfg.connectivity.probe_enabled);
        }
        if let Some(v) = lookup("TRAVEL_SYNC_PROBE_INTERVAL_SECS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.connectivity.probe_interval_secs = value.max(1);
        }
        if let Some(v) = lookup("TRAVEL_SYNC_HEALTH_PATH")
            && !v.trim().is_empty()
        {
            cfg.connectivity.health_path = v.trim().to_string();
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if !(self.gateway.base_url.starts_with("http://")
            || self.gateway.base_url.starts_with("https://"))
        {
            return Err(format!(
                "Gateway base_url must be an http(s) url: {}",
                self.gateway.base_url
            ));
        }
        if self.gateway.request_timeout_secs == 0 {
            return Err("Gateway request_timeout_secs must be greater than 0".to_string());
        }
        if self.connectivity.probe_enabled && self.connectivity.probe_interval_secs == 0 {
            return Err("Connectivity probe_interval_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_database_url() -> String {
    let dir = dirs::data_dir()
        .map(|base| base.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./data"));
    format!("sqlite://{}?mode=rwc", dir.join(DATABASE_FILE).display())
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(cfg.database.url.starts_with("sqlite://"));
    }

    #[test]
    fn env_overrides_are_applied() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("TRAVEL_SYNC_DATABASE_URL", "sqlite::memory:"),
            ("TRAVEL_SYNC_GATEWAY_URL", "https://orders.example.gov/"),
            ("TRAVEL_SYNC_GATEWAY_TIMEOUT_SECS", "5"),
            ("TRAVEL_SYNC_PROBE_ENABLED", "off"),
            ("TRAVEL_SYNC_PROBE_INTERVAL_SECS", "0"),
        ]));

        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert_eq!(cfg.gateway.base_url, "https://orders.example.gov");
        assert_eq!(cfg.gateway.request_timeout_secs, 5);
        assert!(!cfg.connectivity.probe_enabled);
        assert_eq!(cfg.connectivity.probe_interval_secs, 1);
    }

    #[test]
    fn unparsable_values_keep_defaults() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("TRAVEL_SYNC_DB_MAX_CONNECTIONS", "many"),
            ("TRAVEL_SYNC_PROBE_ENABLED", "maybe"),
        ]));
        assert_eq!(cfg.database.max_connections, 5);
        assert!(cfg.connectivity.probe_enabled);
    }

    #[test]
    fn validate_rejects_non_http_gateway() {
        let mut cfg = AppConfig::default();
        cfg.gateway.base_url = "ftp://orders".into();
        assert!(cfg.validate().is_err());
    }
}
