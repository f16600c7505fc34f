use crate::application::ports::mutation_gateway::{
    CreatedDocument, GatewayAck, GatewayError, MutationGateway,
};
use crate::domain::value_objects::offline::{DocumentKind, EntityId, MutationPayload};
use crate::shared::config::GatewayConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Only `success` is load-bearing; the other fields are read leniently.
#[derive(Debug, Deserialize)]
struct RemoteResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
}

fn default_success() -> bool {
    true
}

impl RemoteResponse {
    fn empty() -> Self {
        Self {
            success: true,
            message: None,
            id: None,
        }
    }

    fn message(&self) -> Option<String> {
        match &self.message {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    fn remote_id(&self) -> Option<EntityId> {
        let raw = match self.id.as_ref()? {
            Value::String(id) => id.clone(),
            Value::Number(id) => id.to_string(),
            _ => return None,
        };
        EntityId::new(raw).ok()
    }
}

/// `MutationGateway` over the document service's REST API.
pub struct HttpMutationGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpMutationGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url).map_err(|err| {
            AppError::ConfigurationError(format!("Invalid gateway url {base_url}: {err}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::ConfigurationError(format!(
                "Gateway url cannot carry a path: {base_url}"
            )));
        }
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, AppError> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Method and path segments for `kind`. The create-mode kind ignores `id`; it travels in the body.
    pub fn endpoint(kind: DocumentKind, id: &EntityId) -> (Method, Vec<&str>) {
        let id = id.as_str();
        match kind {
            DocumentKind::TravelOrder => (Method::POST, vec!["api", "travel-orders"]),
            DocumentKind::TravelOrderDraft => {
                (Method::PUT, vec!["api", "travel-orders", id, "draft"])
            }
            DocumentKind::PersonnelRoster => (Method::PUT, vec!["api", "personnel", id]),
            DocumentKind::Report => (Method::PUT, vec!["api", "reports", id]),
            DocumentKind::Receipt => (Method::PUT, vec!["api", "receipts", id]),
            DocumentKind::TravelOrderAssignment => (Method::PUT, vec!["api", "assignments", id]),
        }
    }

    /// Each segment is percent-encoded on its own, so an id always addresses exactly one resource.
    fn url_for(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::Transport(format!("gateway url {} has no path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        kind: DocumentKind,
        id: &EntityId,
        payload: &MutationPayload,
    ) -> Result<RemoteResponse, GatewayError> {
        let (method, segments) = Self::endpoint(kind, id);
        let url = self.url_for(&segments)?;

        tracing::debug!(
            target: "offline::gateway",
            %method,
            %url,
            id = %id,
            kind = %kind,
            "delivering mutation"
        );

        let response = self
            .client
            .request(method, url)
            .json(&payload.with_id(id.as_str()))
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        classify(status, &body)
    }
}

fn classify(status: StatusCode, body: &str) -> Result<RemoteResponse, GatewayError> {
    let parsed = if body.trim().is_empty() {
        None
    } else {
        serde_json::from_str::<RemoteResponse>(body).ok()
    };

    if status.is_success() {
        return match parsed {
            Some(response) if response.success => Ok(response),
            Some(response) => Err(GatewayError::Rejected {
                status: Some(status.as_u16()),
                message: response
                    .message()
                    .unwrap_or_else(|| "remote reported failure".to_string()),
            }),
            None if body.trim().is_empty() => Ok(RemoteResponse::empty()),
            // a non-JSON 2xx is usually a proxy or captive portal, not the service
            None => Err(GatewayError::Transport(format!(
                "unexpected non-JSON response with status {status}"
            ))),
        };
    }

    let message = parsed
        .and_then(|response| response.message())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        Err(GatewayError::Transport(format!("HTTP {status}: {message}")))
    } else {
        Err(GatewayError::Rejected {
            status: Some(status.as_u16()),
            message,
        })
    }
}

#[async_trait]
impl MutationGateway for HttpMutationGateway {
    async fn upsert(
        &self,
        kind: DocumentKind,
        id: &EntityId,
        payload: &MutationPayload,
    ) -> Result<GatewayAck, GatewayError> {
        let response = self.send(kind, id, payload).await?;
        Ok(GatewayAck {
            message: response.message(),
        })
    }

    async fn create(
        &self,
        id: &EntityId,
        payload: &MutationPayload,
    ) -> Result<CreatedDocument, GatewayError> {
        let response = self.send(DocumentKind::TravelOrder, id, payload).await?;
        // the write already succeeded; an odd id in the reply must not undo that
        let created_id = response.remote_id().unwrap_or_else(|| {
            if response.id.is_some() {
                tracing::debug!(
                    target: "offline::gateway",
                    id = %id,
                    remote_id = ?response.id,
                    "ignoring unusable remote id"
                );
            }
            id.clone()
        });
        Ok(CreatedDocument {
            id: created_id,
            message: response.message(),
        })
    }
}
