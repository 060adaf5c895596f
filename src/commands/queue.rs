//! The queue command: publishes saved messages from a file or a folder.
//!
//! A single file goes through the direct flow; a folder fans out through
//! the batch publisher with the configured worker count and failure policy.

use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;

use crate::batch::{self, BatchPublisher};
use crate::broker::BrokerClient;
use crate::config::Settings;
use crate::store;

pub async fn run(
    settings: &Settings,
    source: &Path,
    destination: Option<&str>,
) -> anyhow::Result<()> {
    let client = Arc::new(BrokerClient::new(settings));

    if source.is_file() {
        let published = batch::publish_file_messages(
            client.as_ref(),
            source,
            destination,
            &settings.source_queue_fields,
            &settings.remove_fields,
        )
        .await?;

        tracing::info!(
            "Published {} message(s) from {}",
            published,
            source.display()
        );
        return Ok(());
    }

    if source.is_dir() {
        let files = store::list_directory(source)?;

        tracing::debug!(
            "Source folder {} holds {} file(s); publishing with up to {} worker(s)",
            source.display(),
            files.len(),
            settings.max_workers
        );

        let publisher = BatchPublisher::new(client, settings);
        let report = publisher
            .publish_files(files, destination.map(String::from))
            .await;

        if report.is_success() {
            tracing::info!(
                "Published {} message(s) from {} file(s)",
                report.published,
                report.attempted_files
            );
            return Ok(());
        }

        return Err(anyhow!(
            "{} of {} attempted file(s) failed; {} message(s) were published",
            report.failures.len(),
            report.attempted_files,
            report.published
        ));
    }

    Err(anyhow!("{} is not a file or a folder!", source.display()))
}
