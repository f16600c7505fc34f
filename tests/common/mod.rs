#![allow(dead_code)]

use std::path::Path;
use travel_sync_lib::AppConfig;

/// File-backed config pointing at `gateway_url`, with the probe disabled.
pub fn file_config(dir: &Path, gateway_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = format!("sqlite://{}?mode=rwc", dir.join("offline.db").display());
    config.gateway.base_url = gateway_url.trim_end_matches('/').to_string();
    config.gateway.request_timeout_secs = 5;
    config.connectivity.probe_enabled = false;
    config
}

pub async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while !condition().await {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
