// src/cms/fetcher.rs
// =============================================================================
// Fetches many WordPress posts at once with a fixed pool of workers.
//
// How it works:
// 1. All URLs go into one shared queue
// 2. min(max_workers, urls.len()) worker tasks each pop a URL, resolve it
//    (posts, then pages), and send the outcome down a channel
// 3. The caller collects outcomes in the order they finish
//
// A failed URL becomes a Failed outcome and the worker moves on to the next
// one. Nothing is retried. If a worker task dies outright, whatever URLs it
// never reported on are filled in as failures, so the output always has one
// entry per input URL.
// =============================================================================

use crate::cms::{FetchOutcome, WordPressClient};
use crate::error::{Error, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

const PROGRESS_EVERY: usize = 10;
const NOT_FOUND: &str = "Post not found";
const WORKER_ABORTED: &str = "worker aborted";

impl WordPressClient {
    /// Fetches every URL in `urls` using up to `max_workers` workers.
    ///
    /// Returns exactly one outcome per input URL, in completion order.
    /// The only error is a zero `max_workers`, which is a caller bug.
    pub async fn fetch_all(&self, urls: &[String], max_workers: usize) -> Result<Vec<FetchOutcome>> {
        if max_workers == 0 {
            return Err(Error::InvalidArgument("max_workers must be greater than zero".to_string()));
        }
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let total = urls.len();
        let worker_count = max_workers.min(total);
        tracing::info!(total, workers = worker_count, "Fetching posts concurrently");

        let queue = Arc::new(Mutex::new(urls.iter().cloned().collect::<VecDeque<String>>()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut workers = JoinSet::new();

        for worker_id in 0..worker_count {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let client = self.clone();

            workers.spawn(async move {
                loop {
                    let next = queue.lock().await.pop_front();
                    let Some(url) = next else {
                        break;
                    };

                    let outcome = client.fetch_one(&url).await;
                    if tx.send(outcome).is_err() {
                        break;
                    }
                }
                tracing::debug!(worker_id, "Fetch worker finished");
            });
        }

        // Only the workers hold senders now, so the channel closes when the
        // last of them exits
        drop(tx);

        let started = Instant::now();
        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);

            let completed = outcomes.len();
            if completed % PROGRESS_EVERY == 0 || completed == total {
                tracing::info!(
                    "[Progress] {}/{} posts ({:.1}s)",
                    completed,
                    total,
                    started.elapsed().as_secs_f64()
                );
            }
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Fetch worker stopped unexpectedly");
            }
        }

        fill_missing(urls, &mut outcomes);

        let failed = outcomes.iter().filter(|o| o.is_error()).count();
        tracing::info!(
            fetched = outcomes.len() - failed,
            failed,
            "[Completed] Fetched {} posts in {:.1}s",
            outcomes.len(),
            started.elapsed().as_secs_f64()
        );

        Ok(outcomes)
    }

    // One URL, one outcome. Never returns an error.
    async fn fetch_one(&self, url: &str) -> FetchOutcome {
        match self.fetch_post_by_url(url).await {
            Ok(Some(post)) => FetchOutcome::Fetched(post),
            Ok(None) => {
                tracing::warn!(url, "Post not found");
                FetchOutcome::failed(url, NOT_FOUND)
            }
            Err(e) => {
                tracing::error!(url, error = %e, "Error fetching post");
                FetchOutcome::failed(url, e.to_string())
            }
        }
    }
}

// Adds a failure for every input URL that has no outcome yet. Counts matter:
// a URL listed twice needs two outcomes.
fn fill_missing(urls: &[String], outcomes: &mut Vec<FetchOutcome>) {
    let mut pending: HashMap<&str, usize> = HashMap::new();
    for url in urls {
        *pending.entry(url.as_str()).or_default() += 1;
    }
    for outcome in outcomes.iter() {
        if let Some(count) = pending.get_mut(outcome.url()) {
            *count = count.saturating_sub(1);
        }
    }

    for (url, missing) in pending {
        for _ in 0..missing {
            tracing::warn!(url, "No outcome recorded for URL");
            outcomes.push(FetchOutcome::failed(url, WORKER_ABORTED));
        }
    }
}
