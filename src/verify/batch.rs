// src/verify/batch.rs
// =============================================================================
// Runs index checks for a whole list of URLs.
//
// The list is cut into consecutive batches of `batch_size`. Batches run one
// after another, so at most `batch_size` Serper calls are ever in flight;
// inside a batch every call runs at once and results are collected in the
// order they finish. A slow call only holds up its own batch.
//
// Rust concepts:
// - slice::chunks: consecutive sub-slices, the last one possibly shorter
// - buffer_unordered: run N futures at once, yield results as they complete
// =============================================================================

use crate::error::{Error, Result};
use crate::verify::{SerperClient, VerificationOutcome};
use futures::stream::{self, StreamExt};

/// Verifies every URL in `urls`, `batch_size` at a time.
///
/// Returns exactly one outcome per input URL, in no particular order.
/// The only error is a zero `batch_size`, which is a caller bug.
pub async fn verify_all(
    client: &SerperClient,
    urls: &[String],
    batch_size: usize,
) -> Result<Vec<VerificationOutcome>> {
    if batch_size == 0 {
        return Err(Error::InvalidArgument("batch_size must be greater than zero".to_string()));
    }

    let total_batches = urls.len().div_ceil(batch_size);
    let mut outcomes = Vec::with_capacity(urls.len());

    for (index, batch) in urls.chunks(batch_size).enumerate() {
        tracing::info!("Batch {}/{}: {} URLs", index + 1, total_batches, batch.len());

        let batch_outcomes: Vec<VerificationOutcome> = stream::iter(batch)
            .map(|url| client.check(url))
            .buffer_unordered(batch.len())
            .collect()
            .await;

        outcomes.extend(batch_outcomes);
    }

    let failed = outcomes.iter().filter(|o| o.is_error()).count();
    tracing::info!(total = outcomes.len(), failed, "Index verification finished");

    Ok(outcomes)
}
