//! HttpDeliverySink - sink の HTTP エンドポイントに JSON を POST する
//!
//! 2xx なら成功。それ以外のステータスは `SinkError::Rejected`。
//! リトライはしない（Dispatcher の方針と同じ）。

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::SinkConfig;
use crate::ports::{DeliverySink, SinkError, SinkMessage};

pub struct HttpDeliverySink {
    name: String,
    endpoint: String,
    headers: HashMap<String, String>,
    client: reqwest::Client,
}

impl HttpDeliverySink {
    pub fn new(
        endpoint: impl Into<String>,
        headers: HashMap<String, String>,
        timeout: Duration,
    ) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        Ok(Self {
            name: "http".to_string(),
            endpoint: endpoint.into(),
            headers,
            client,
        })
    }

    pub fn from_config(config: &SinkConfig) -> Result<Self, SinkError> {
        Self::new(config.endpoint(), config.headers.clone(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DeliverySink for HttpDeliverySink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, message: &SinkMessage) -> Result<(), SinkError> {
        let body = serde_json::to_vec(message)?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request.body(body).send().await.map_err(|e| {
            if e.is_timeout() {
                SinkError::Timeout
            } else {
                SinkError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(
            sink = %self.name,
            channel = %message.channel,
            status = %status,
            "notification accepted by sink"
        );
        Ok(())
    }
}
