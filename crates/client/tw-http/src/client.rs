//! HTTP implementation of the consumer client.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use tw_error::{ConfigError, TransportError, TransportResult};
use tw_traits::ConsumerClient;
use tw_types::{Message, ReceiveParams};

use crate::config::HttpClientConfig;
use crate::wire::{self, AckRequest, DataEnvelope, ReceivedMessage};

/// Consumer client backed by the broker's HTTP API.
///
/// Cheap to clone is not a goal; wrap in `Arc` to share. Safe for concurrent
/// calls: `reqwest::Client` multiplexes connections internally.
pub struct HttpConsumerClient {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpConsumerClient {
    /// Create a client from the given configuration.
    pub fn new(config: HttpClientConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        debug!(base_url = %config.base_url, "broker client created");

        Ok(Self { client, config })
    }

    /// Receive a single message, or None when the group has nothing pending.
    pub async fn receive_one(&self, group: &str) -> TransportResult<Option<Message>> {
        let messages = self.receive(group, &ReceiveParams::batch(1)).await?;
        Ok(messages.into_iter().next())
    }

    /// Acknowledge a single delivery.
    pub async fn ack_one(&self, group: &str, ack_id: &str) -> TransportResult<()> {
        self.ack(group, &[ack_id.to_string()]).await
    }

    /// Negatively acknowledge a single delivery.
    pub async fn nack_one(&self, group: &str, ack_id: &str) -> TransportResult<()> {
        self.nack(group, &[ack_id.to_string()]).await
    }

    fn group_url(&self, group: &str, operation: &str) -> String {
        format!(
            "{}/api/consumer_groups/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            group,
            operation
        )
    }

    /// POSTs a JSON body and returns the response bytes, mapping non-success
    /// statuses through the broker's error envelope.
    async fn post_json<B: Serialize>(&self, url: &str, body: &B) -> TransportResult<bytes::Bytes> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(wire::error_from_response(status.as_u16(), &body));
        }

        Ok(body)
    }
}

#[async_trait]
impl ConsumerClient for HttpConsumerClient {
    async fn receive(&self, group: &str, params: &ReceiveParams) -> TransportResult<Vec<Message>> {
        let url = self.group_url(group, "receive");
        let body = self.post_json(&url, params).await?;

        let envelope: DataEnvelope<Vec<ReceivedMessage>> = serde_json::from_slice(&body)
            .map_err(|e| TransportError::Request(format!("decoding receive response: {e}")))?;

        debug!(group, count = envelope.data.len(), "received messages");
        Ok(envelope.data.into_iter().map(Message::from).collect())
    }

    async fn ack(&self, group: &str, ack_ids: &[String]) -> TransportResult<()> {
        let url = self.group_url(group, "ack");
        self.post_json(&url, &AckRequest { ack_ids }).await?;
        debug!(group, count = ack_ids.len(), "acknowledged messages");
        Ok(())
    }

    async fn nack(&self, group: &str, ack_ids: &[String]) -> TransportResult<()> {
        let url = self.group_url(group, "nack");
        self.post_json(&url, &AckRequest { ack_ids }).await?;
        debug!(group, count = ack_ids.len(), "negatively acknowledged messages");
        Ok(())
    }
}
