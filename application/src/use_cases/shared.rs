//! Shared utilities for use cases.

use crate::use_cases::run_query::RunError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), RunError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(RunError::Cancelled);
    }
    Ok(())
}

/// Await `fut` unless the token fires first.
pub(crate) async fn cancellable<F: Future>(
    token: &Option<CancellationToken>,
    fut: F,
) -> Result<F::Output, RunError> {
    match token {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(RunError::Cancelled),
            output = fut => Ok(output),
        },
        None => Ok(fut.await),
    }
}

/// Shorten `s` to at most `max_chars` characters for log and progress output.
pub fn preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_keeps_short_strings() {
        assert_eq!(preview("sum: 5", 10), "sum: 5");
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("ééééé", 3), "éé…");
    }

    #[test]
    fn test_check_cancelled() {
        assert!(check_cancelled(&None).is_ok());
        let token = CancellationToken::new();
        assert!(check_cancelled(&Some(token.clone())).is_ok());
        token.cancel();
        assert!(matches!(
            check_cancelled(&Some(token)),
            Err(RunError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_cancellable_prefers_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let result = cancellable(&Some(token), async { 1 }).await;
        assert!(matches!(result, Err(RunError::Cancelled)));

        let result = cancellable(&None, async { 1 }).await;
        assert!(matches!(result, Ok(1)));
    }
}
