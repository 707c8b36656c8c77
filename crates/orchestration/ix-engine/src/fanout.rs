//! Bounded fan-out over part-files with a single merge at the end.

use crate::config::EngineConfig;
use futures::{StreamExt, stream};
use ix_aggregate::{Aggregator, Mergeable};
use ix_error::{IxError, Result};
use ix_reader_csv::{PartReaderConfig, read_chunks};
use ix_traits::ObjectGateway;
use ix_types::{PartFailure, PartFileDescriptor, ScanStats};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One part-file to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartTask {
    /// Bucket holding the part-file
    pub bucket: String,

    /// Part-file and its provenance tag
    pub part: PartFileDescriptor,
}

impl PartTask {
    pub fn new(bucket: impl Into<String>, part: PartFileDescriptor) -> Self {
        Self {
            bucket: bucket.into(),
            part,
        }
    }
}

/// Merged result of a fan-out, with the parts that did not contribute.
#[derive(Debug)]
pub struct FanOutReport<P> {
    /// Merge of every successful part's partial
    pub merged: P,

    /// Parts excluded after a failure, in completion order
    pub failures: Vec<PartFailure>,

    /// Counters for the run
    pub stats: ScanStats,
}

impl<P> FanOutReport<P> {
    /// True when every part contributed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

struct PartOutput<P> {
    partial: P,
    chunks: u64,
    rows: u64,
}

/// Runs an aggregator over many part-files with bounded concurrency.
///
/// Each part is processed on its own task into an independent partial; no
/// aggregation state is shared between tasks. Once every task has finished
/// the partials are merged in one place. A part that fails is logged and
/// left out of the merge; the run as a whole still succeeds.
#[derive(Clone)]
pub struct FanOut {
    gateway: Arc<dyn ObjectGateway>,
    config: EngineConfig,
}

impl FanOut {
    pub fn new(gateway: Arc<dyn ObjectGateway>, config: EngineConfig) -> Self {
        Self { gateway, config }
    }

    /// Processes `tasks` and merges their partials.
    ///
    /// Cancelling `cancel` abandons outstanding tasks, discards anything
    /// already collected and returns [`IxError::Cancelled`].
    pub async fn run<A: Aggregator>(
        &self,
        aggregator: Arc<A>,
        tasks: Vec<PartTask>,
        cancel: &CancellationToken,
    ) -> Result<FanOutReport<A::Partial>> {
        let started = Instant::now();
        let parts_total = tasks.len();

        if cancel.is_cancelled() {
            return Err(IxError::Cancelled);
        }

        debug!(
            aggregator = aggregator.name(),
            parts = parts_total,
            max_concurrent = self.config.max_concurrent_parts,
            "Starting fan-out"
        );

        let part_futures = tasks.into_iter().map(|task| {
            let gateway = Arc::clone(&self.gateway);
            let aggregator = Arc::clone(&aggregator);
            let reader = self.config.reader.clone();
            let cancel = cancel.clone();

            async move {
                let key = task.part.key.clone();
                let handle = tokio::spawn(async move {
                    tokio::select! {
                        _ = cancel.cancelled() => Err(IxError::Cancelled),
                        result = process_part(
                            gateway.as_ref(),
                            aggregator.as_ref(),
                            &task,
                            &reader,
                        ) => result,
                    }
                });

                let result = match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(IxError::Other(anyhow::anyhow!("Part task failed: {e}"))),
                };
                (key, result)
            }
        });

        let mut outcomes =
            stream::iter(part_futures).buffer_unordered(self.config.max_concurrent_parts);
        let mut collected = Vec::with_capacity(parts_total);

        // Fan-in barrier: wait for every task before merging anything
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(
                        completed = collected.len(),
                        parts = parts_total,
                        "Fan-out cancelled, discarding partial results"
                    );
                    return Err(IxError::Cancelled);
                }
                next = outcomes.next() => match next {
                    Some(outcome) => collected.push(outcome),
                    None => break,
                },
            }
        }

        let mut merged = A::Partial::default();
        let mut failures = Vec::new();
        let mut stats = ScanStats {
            parts_total: parts_total as u64,
            ..Default::default()
        };

        for (key, result) in collected {
            match result {
                Ok(output) => {
                    stats.parts_succeeded += 1;
                    stats.chunks_scanned += output.chunks;
                    stats.rows_scanned += output.rows;
                    merged.merge(output.partial);
                }
                Err(IxError::Cancelled) => return Err(IxError::Cancelled),
                Err(e) => {
                    warn!(part_key = %key, error = %e, "Part-file failed, excluded from result");
                    stats.parts_failed += 1;
                    failures.push(PartFailure {
                        key,
                        error: e.to_string(),
                    });
                }
            }
        }

        stats.duration = started.elapsed();

        info!(
            aggregator = aggregator.name(),
            parts = parts_total,
            failed = stats.parts_failed,
            rows = stats.rows_scanned,
            groups = merged.len(),
            duration_ms = stats.duration.as_millis() as u64,
            "Fan-out complete"
        );

        Ok(FanOutReport {
            merged,
            failures,
            stats,
        })
    }
}

async fn process_part<A: Aggregator>(
    gateway: &dyn ObjectGateway,
    aggregator: &A,
    task: &PartTask,
    reader: &PartReaderConfig,
) -> Result<PartOutput<A::Partial>> {
    let body = gateway.get_object(&task.bucket, &task.part.key).await?;
    let mut chunks = read_chunks(body, &task.part.key, reader);
    let source = task.part.source_or_empty();

    let mut output = PartOutput {
        partial: A::Partial::default(),
        chunks: 0,
        rows: 0,
    };

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        output.chunks += 1;
        output.rows += chunk.num_rows() as u64;
        aggregator.aggregate_chunk(&chunk, source, &mut output.partial);
    }

    debug!(
        part_key = %task.part.key,
        chunks = output.chunks,
        rows = output.rows,
        "Processed part-file"
    );

    Ok(output)
}
