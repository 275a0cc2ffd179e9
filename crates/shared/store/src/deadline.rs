//! Time budget and cancellation for store calls.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{StoreError, StoreResult};

/// Run a store call under an optional wall-clock budget and cancellation token.
///
/// Cancellation wins over completion when both are ready. Neither outcome is
/// retried.
pub async fn bounded<F, T>(
    timeout: Option<Duration>,
    cancellation: Option<&CancellationToken>,
    call: F,
) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    let timed = async {
        match timeout {
            Some(budget) => match tokio::time::timeout(budget, call).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout(budget)),
            },
            None => call.await,
        }
    };

    match cancellation {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(StoreError::Cancelled),
                result = timed => result,
            }
        }
        None => timed.await,
    }
}
