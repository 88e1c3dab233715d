use crate::error::{Error, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run a collaborator call, giving up as soon as `cancel` fires.
///
/// A token that is already cancelled never starts the call.
pub(crate) async fn cancellable<F, T>(
    cancel: &CancellationToken,
    operation: &'static str,
    call: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(Error::Cancelled { operation });
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!(operation, "cancelled while waiting on collaborator");
            Err(Error::Cancelled { operation })
        }
        result = call => result,
    }
}
