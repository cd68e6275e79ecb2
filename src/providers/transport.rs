use crate::core::error::ChatError;
use crate::providers::{PreparedRequest, Transport, TransportResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// `Transport` backed by a shared reqwest client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// A zero timeout disables the bound.
    pub fn new(timeout: Duration) -> Result<Self, ChatError> {
        let mut builder = Client::builder();
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: &PreparedRequest) -> Result<TransportResponse, ChatError> {
        let mut builder = self.client.post(&request.endpoint).json(&request.body);

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let body = if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                ChatError::Serialization(format!("Malformed response body: {}", e))
            })?
        } else {
            // Error bodies are not always JSON; keep them readable either way.
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}
