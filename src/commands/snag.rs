//! The snag command: saves messages from a queue to a JSON file.
//!
//! Snagging is non-destructive: messages are requeued as they are read, so
//! the queue is left exactly as it was.

use std::path::Path;

use crate::broker::BrokerClient;
use crate::config::Settings;
use crate::store;

pub async fn run(
    settings: &Settings,
    queue: &str,
    count: u32,
    file: &Path,
) -> anyhow::Result<()> {
    tracing::debug!(
        "Snagging {} message(s) from {} into {}",
        count,
        queue,
        file.display()
    );

    let client = BrokerClient::new(settings);
    let messages = client.fetch(queue, count, true).await?;

    store::save(&messages, file)?;
    Ok(())
}
