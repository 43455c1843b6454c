//! Command execution helpers
//!
//! Wraps a command body with timing and outcome logging so every command
//! reports the same structured fields.

use std::future::Future;
use std::time::Instant;

use talkreport_domain::Result as DomainResult;

use crate::utils::logging::log_command_execution;

/// Run `command_fn`, then log how long it took and whether it failed.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn history(ctx: &AppContext, limit: usize) -> DomainResult<Vec<SendHistoryEntry>> {
///     execute_logged("send::history", || ctx.delivery.history(limit)).await
/// }
/// ```
pub async fn execute_logged<F, Fut, T>(command_name: &str, command_fn: F) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command_fn().await;
    log_command_execution(command_name, start.elapsed(), result.as_ref().err());
    result
}

#[cfg(test)]
mod tests {
    use talkreport_domain::TalkReportError;

    use super::*;

    #[tokio::test]
    async fn passes_the_result_through() {
        let ok = execute_logged("test::ok", || async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));

        let err: DomainResult<()> =
            execute_logged("test::err", || async { Err(TalkReportError::Internal("boom".into())) })
                .await;
        assert_eq!(err, Err(TalkReportError::Internal("boom".into())));
    }
}
