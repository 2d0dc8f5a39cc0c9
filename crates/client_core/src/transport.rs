use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{workflow_route, ErrorBody, GestureEvent, WorkflowResult};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("workflow request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server rejected workflow ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Carries one gesture snapshot to the proxy and back.
#[async_trait]
pub trait WorkflowTransport: Send + Sync {
    async fn submit(&self, event: &GestureEvent) -> Result<WorkflowResult, TransportError>;
}

pub struct HttpWorkflowTransport {
    http: Client,
    endpoint: Url,
}

impl HttpWorkflowTransport {
    pub fn new(server_url: &str) -> Result<Self, TransportError> {
        let endpoint = Url::parse(server_url)?.join(workflow_route())?;
        Ok(Self {
            http: Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl WorkflowTransport for HttpWorkflowTransport {
    async fn submit(&self, event: &GestureEvent) -> Result<WorkflowResult, TransportError> {
        let res = self
            .http
            .post(self.endpoint.clone())
            .json(event)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let raw = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&raw)
                .map(|body| body.error)
                .unwrap_or(raw);
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(res.json().await?)
    }
}
