use crate::pipeline::process_event;
use ach_config::WorkerConfig;
use ach_render::ObjectStore;
use anyhow::Result;
use sqlx::PgPool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const MAX_ERROR_BACKOFF_MS: u64 = 30_000;

/// The single cooperative worker loop. Owns no intra-process parallelism
/// over events: everything in one claimed batch is processed sequentially,
/// one event at a time: claim, run the pipeline, mark done or retry.
pub struct Supervisor {
    pool: PgPool,
    object_store: Arc<dyn ObjectStore>,
    config: WorkerConfig,
}

impl Supervisor {
    pub fn new(pool: PgPool, object_store: Arc<dyn ObjectStore>, config: WorkerConfig) -> Self {
        Self {
            pool,
            object_store,
            config,
        }
    }

    /// Run until `cancel` is set. The flag is only checked between
    /// iterations; an in-flight event always finishes before the loop exits.
    pub async fn run(&self, cancel: Arc<AtomicBool>) -> Result<()> {
        while !cancel.load(Ordering::SeqCst) {
            if let Err(e) = self.run_iteration().await {
                error!(error = %e, "supervisor iteration failed, backing off");
                let backoff = Duration::from_millis(
                    (5 * self.config.poll_interval_ms).min(MAX_ERROR_BACKOFF_MS),
                );
                tokio::time::sleep(backoff).await;
            }
        }
        info!("supervisor loop exiting on cancellation");
        Ok(())
    }

    async fn run_iteration(&self) -> Result<()> {
        let batch = ach_db::claim_batch(&self.pool, self.config.batch_size).await?;

        if batch.is_empty() {
            tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
            return Ok(());
        }

        let event_ids: Vec<String> = {
            let mut ids: Vec<String> = batch.iter().map(|item| item.event_id.clone()).collect();
            ids.sort();
            ids.dedup();
            ids
        };
        let events = ach_db::load_events(&self.pool, &event_ids).await?;

        let mut done_ids = Vec::with_capacity(batch.len());

        for item in &batch {
            match events.get(&item.event_id) {
                None => {
                    warn!(queue_id = item.queue_id, event_id = %item.event_id, "event missing");
                    ach_db::mark_retry(
                        &self.pool,
                        item.queue_id,
                        "event missing",
                        self.config.max_attempts,
                    )
                    .await?;
                }
                Some(event) => {
                    match process_event(
                        &self.pool,
                        self.object_store.as_ref(),
                        &self.config.public_base_url,
                        event,
                    )
                    .await
                    {
                        Ok(()) => done_ids.push(item.queue_id),
                        Err(e) => {
                            warn!(queue_id = item.queue_id, event_id = %item.event_id, error = %e, "event processing failed, retrying");
                            ach_db::mark_retry(
                                &self.pool,
                                item.queue_id,
                                &e.to_string(),
                                self.config.max_attempts,
                            )
                            .await?;
                        }
                    }
                }
            }
        }

        ach_db::mark_done(&self.pool, &done_ids).await?;
        Ok(())
    }
}
