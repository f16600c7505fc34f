use super::monitor::ConnectivityMonitor;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Periodically checks the gateway's health endpoint and feeds the monitor.
pub struct HealthProbe {
    client: reqwest::Client,
    url: String,
    interval: Duration,
    monitor: Arc<ConnectivityMonitor>,
}

impl HealthProbe {
    pub fn new(
        url: impl Into<String>,
        interval: Duration,
        timeout: Duration,
        monitor: Arc<ConnectivityMonitor>,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            interval,
            monitor,
        })
    }

    pub fn from_config(
        config: &AppConfig,
        monitor: Arc<ConnectivityMonitor>,
    ) -> Result<Self, AppError> {
        let url = format!(
            "{}/{}",
            config.gateway.base_url.trim_end_matches('/'),
            config.connectivity.health_path.trim_start_matches('/')
        );
        let interval = Duration::from_secs(config.connectivity.probe_interval_secs.max(1));
        // a probe should give up well before the next tick
        let timeout = interval.min(Duration::from_secs(config.gateway.request_timeout_secs));
        Self::new(url, interval, timeout, monitor)
    }

    pub async fn probe_once(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!(
                    target: "offline::connectivity",
                    url = %self.url,
                    error = %err,
                    "health probe failed"
                );
                false
            }
        }
    }

    /// First probe reports app start; later probes report transitions.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let online = self.probe_once().await;
            self.monitor.app_started(online);

            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let online = self.probe_once().await;
                self.monitor.set_online(online);
            }
        })
    }
}
