//! HTTP transport: `POST` the request, hand back the streaming body.

use super::{Body, Transport};
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::protocol::GenerateRequest;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::debug;

/// Blocking HTTP client for the generation endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// Build a transport from the client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

impl Transport for HttpTransport {
    fn open(&self, request: &GenerateRequest) -> Result<Body, TransportError> {
        debug!(endpoint = %self.endpoint, "opening generation stream");

        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(Box::new(response))
    }
}
