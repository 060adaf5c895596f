//! Bounded worker pool that publishes a folder of message files.
//!
//! The driver partitions the file list into a bounded MPMC work queue and
//! starts a fixed number of workers. Each worker repeatedly takes one file,
//! loads its message(s), resolves the destination, scrubs the headers and
//! publishes. Files race against each other, but the messages inside one
//! file are always published in document order by the single worker that
//! claimed it. The driver joins every worker before reporting, which is
//! the drain barrier.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;

use crate::broker::Publish;
use crate::config::{FailurePolicy, Settings};
use crate::core::{document, message};
use crate::store;

/// Result of one file's worth of publishes.
#[derive(Debug)]
pub struct ItemOutcome {
    pub path: PathBuf,
    /// Messages published from this file before any failure.
    pub published: usize,
    pub error: Option<anyhow::Error>,
}

/// Aggregate result of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// Total messages published across all files.
    pub published: usize,
    /// Files a worker actually took off the queue.
    pub attempted_files: usize,
    /// Outcomes for the files that failed.
    pub failures: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Shared, read-only state every worker needs, plus the stop flag that
/// implements the orderly fail-fast shutdown.
struct WorkerContext {
    publisher: Arc<dyn Publish>,
    destination: Option<String>,
    source_queue_fields: Vec<String>,
    remove_fields: Vec<String>,
    fail_fast: bool,
    stop: AtomicBool,
}

pub struct BatchPublisher {
    publisher: Arc<dyn Publish>,
    max_workers: usize,
    failure_policy: FailurePolicy,
    source_queue_fields: Vec<String>,
    remove_fields: Vec<String>,
}

impl BatchPublisher {
    /// The work queue is created per `publish_files` call and owned by it;
    /// nothing here is process-global.
    pub fn new(publisher: Arc<dyn Publish>, settings: &Settings) -> Self {
        Self {
            publisher,
            max_workers: settings.max_workers,
            failure_policy: settings.failure_policy,
            source_queue_fields: settings.source_queue_fields.clone(),
            remove_fields: settings.remove_fields.clone(),
        }
    }

    fn worker_count(&self, items: usize) -> usize {
        self.max_workers.min(items).max(1)
    }

    /// Publishes every file in the list, bounded by the configured worker
    /// count, and reports aggregate counts and failures.
    pub async fn publish_files(
        &self,
        files: Vec<PathBuf>,
        destination: Option<String>,
    ) -> BatchReport {
        let file_count = files.len();
        if file_count == 0 {
            tracing::warn!("No message files to process!");
            return BatchReport {
                published: 0,
                attempted_files: 0,
                failures: Vec::new(),
            };
        }

        let worker_count = self.worker_count(file_count);
        tracing::info!(
            "Publishing {} message files with {} worker(s)",
            file_count,
            worker_count
        );

        // Sized for the whole batch so enqueueing never blocks.
        let (tx, rx) = flume::bounded(file_count);
        for file in files {
            tx.send(file).expect("the work queue holds the whole batch");
        }
        drop(tx);

        let context = Arc::new(WorkerContext {
            publisher: self.publisher.clone(),
            destination,
            source_queue_fields: self.source_queue_fields.clone(),
            remove_fields: self.remove_fields.clone(),
            fail_fast: self.failure_policy == FailurePolicy::FailFast,
            stop: AtomicBool::new(false),
        });

        let workers: Vec<_> = (0..worker_count)
            .map(|id| {
                let context = context.clone();
                let rx = rx.clone();
                tokio::spawn(worker_loop(id, context, rx))
            })
            .collect();

        let mut outcomes = Vec::new();
        for handle in join_all(workers).await {
            match handle {
                Ok(worker_outcomes) => outcomes.extend(worker_outcomes),
                Err(e) => tracing::error!("A batch worker panicked: {}", e),
            }
        }

        let published = outcomes.iter().map(|outcome| outcome.published).sum();
        let attempted_files = outcomes.len();
        let failures: Vec<ItemOutcome> = outcomes
            .into_iter()
            .filter(|outcome| outcome.error.is_some())
            .collect();

        BatchReport {
            published,
            attempted_files,
            failures,
        }
    }
}

/// Takes files off the shared queue until it drains or the stop flag trips.
/// The flag is checked before taking another item, never mid-item, so an
/// in-flight file always finishes.
async fn worker_loop(
    id: usize,
    context: Arc<WorkerContext>,
    rx: flume::Receiver<PathBuf>,
) -> Vec<ItemOutcome> {
    let mut outcomes = Vec::new();

    loop {
        if context.stop.load(Ordering::SeqCst) {
            tracing::debug!("Worker {} stopping early", id);
            break;
        }

        let Ok(path) = rx.recv_async().await else {
            break;
        };

        let mut published = 0;
        let result = publish_counted(
            context.publisher.as_ref(),
            &path,
            context.destination.as_deref(),
            &context.source_queue_fields,
            &context.remove_fields,
            &mut published,
        )
        .await;

        let failed = result.is_err();
        if let Some(error) = result.as_ref().err() {
            tracing::error!("{}: {:#}", path.display(), error);
        }

        outcomes.push(ItemOutcome {
            path,
            published,
            error: result.err(),
        });

        if failed && context.fail_fast {
            context.stop.store(true, Ordering::SeqCst);
            break;
        }
    }

    outcomes
}

/// Publishes every message in one file, in document order. Used by the
/// batch workers and by the single-file queue flow.
pub async fn publish_file_messages(
    publisher: &dyn Publish,
    path: &Path,
    destination: Option<&str>,
    source_queue_fields: &[String],
    remove_fields: &[String],
) -> anyhow::Result<usize> {
    let mut published = 0;
    publish_counted(
        publisher,
        path,
        destination,
        source_queue_fields,
        remove_fields,
        &mut published,
    )
    .await?;
    Ok(published)
}

async fn publish_counted(
    publisher: &dyn Publish,
    path: &Path,
    destination: Option<&str>,
    source_queue_fields: &[String],
    remove_fields: &[String],
    published: &mut usize,
) -> anyhow::Result<()> {
    let messages = store::load(path)?;
    tracing::debug!(
        "There were {} messages in {}",
        messages.len(),
        path.display()
    );

    let total = messages.len();
    for (index, mut msg) in messages.into_iter().enumerate() {
        let destination = message::resolve_destination(&msg, destination, source_queue_fields)?;
        document::remove_fields(&mut msg, remove_fields);

        tracing::debug!(
            "{} of {} - Publishing message to {}",
            index + 1,
            total,
            destination
        );
        publisher.publish(&msg, &destination).await?;
        *published += 1;
    }

    Ok(())
}
