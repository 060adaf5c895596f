//! RabbitMQ management API client.
//!
//! Talks to the broker's HTTP control plane only; the AMQP data plane is
//! never used. Two operations exist: fetching messages off a queue, and
//! publishing a message to an exchange or queue. Both carry a Basic-auth
//! header derived from the resolved credentials.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::config::Settings;
use crate::core::TransferError;

/// Outcome of a single successful publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// The broker's HTTP status (synthetic 200 in simulate mode).
    pub status: u16,
    /// True when simulate mode skipped the network call.
    pub simulated: bool,
}

/// The publish operation as seen by the batch publisher.
#[async_trait]
pub trait Publish: Send + Sync {
    async fn publish(
        &self,
        message: &Value,
        destination: &str,
    ) -> Result<PublishOutcome, TransferError>;
}

pub struct BrokerClient {
    http: reqwest::Client,
    host: String,
    port: u16,
    vhost: String,
    auth_header: String,
    simulate: bool,
}

impl BrokerClient {
    /// Creates a client over a reusable connection pool. One client is
    /// shared by all batch workers.
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: reqwest::Client::new(),
            host: settings.host.clone(),
            port: settings.port,
            vhost: settings.vhost.clone(),
            auth_header: settings.auth_header(),
            simulate: settings.simulate,
        }
    }

    fn get_url(&self, queue: &str) -> String {
        format!(
            "{}:{}/api/queues/{}/{}/get",
            self.host, self.port, self.vhost, queue
        )
    }

    fn publish_url(&self, destination: &str) -> String {
        format!(
            "{}:{}/api/exchanges/{}/{}/publish",
            self.host, self.port, self.vhost, destination
        )
    }

    /// Fetches up to `count` messages from a queue.
    ///
    /// With `requeue` the messages stay on the queue (non-destructive
    /// inspection); without it the fetch removes them, which is what the
    /// transfer flows want before republishing. Fetching is never
    /// simulated; only writes are.
    pub async fn fetch(
        &self,
        queue: &str,
        count: u32,
        requeue: bool,
    ) -> Result<Vec<Value>, TransferError> {
        let url = self.get_url(queue);
        tracing::info!("Getting messages from {}...", queue);
        tracing::debug!("The RabbitMQ URL is {}", url);

        // The management API expects requeue as a string, not a boolean.
        let body = serde_json::json!({
            "count": count,
            "requeue": if requeue { "true" } else { "false" },
            "encoding": "auto",
        });

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, &self.auth_header)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| TransferError::BrokerUnreachable {
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::BrokerRequestFailed { status, body });
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| TransferError::BrokerRequestFailed {
                status,
                body: format!("the response body was not a JSON message list: {}", e),
            })
    }
}

#[async_trait]
impl Publish for BrokerClient {
    /// Publishes one message document. In simulate mode no network call is
    /// made and a synthetic success is reported.
    async fn publish(
        &self,
        message: &Value,
        destination: &str,
    ) -> Result<PublishOutcome, TransferError> {
        let url = self.publish_url(destination);
        tracing::debug!("The RabbitMQ URL is {}", url);

        if self.simulate {
            tracing::info!("[simulated] [200] Success!");
            return Ok(PublishOutcome {
                status: 200,
                simulated: true,
            });
        }

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, &self.auth_header)
            .header(CONTENT_TYPE, "application/json")
            .json(message)
            .send()
            .await
            .map_err(|e| TransferError::BrokerUnreachable {
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::BrokerRequestFailed { status, body });
        }

        tracing::debug!("[{}] Success!", status);
        Ok(PublishOutcome {
            status,
            simulated: false,
        })
    }
}
