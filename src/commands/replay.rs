//! The replay command: moves messages from one queue onto another.
//!
//! The fetch removes the messages from the source queue; each one is then
//! scrubbed of its runtime/diagnostic headers and republished to the
//! destination. Best-effort: a failed publish after a destructive fetch
//! means the message only survives in the broker's unacked state.

use crate::broker::{BrokerClient, Publish};
use crate::config::Settings;
use crate::core::{document, message};

pub async fn run(
    settings: &Settings,
    queue: &str,
    count: u32,
    destination: &str,
) -> anyhow::Result<()> {
    tracing::debug!(
        "Replaying {} message(s) from {} to {}",
        count,
        queue,
        destination
    );

    let client = BrokerClient::new(settings);
    let messages = client.fetch(queue, count, false).await?;

    if messages.is_empty() {
        tracing::warn!("No messages to process!");
        return Ok(());
    }

    let total = messages.len();
    for (index, mut msg) in messages.into_iter().enumerate() {
        let target =
            message::resolve_destination(&msg, Some(destination), &settings.source_queue_fields)?;
        document::remove_fields(&mut msg, &settings.remove_fields);

        tracing::info!("{} of {} - Publishing message to {}", index + 1, total, target);
        client.publish(&msg, &target).await?;
    }

    Ok(())
}
