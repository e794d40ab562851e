//! Bounded retry of transiently-failing database work.
//!
//! Write paths that hit the remote database can fail on network blips that
//! are not worth surfacing to the user. `with_retries` re-runs the operation
//! a capped number of times when the failure is classified as transient, then
//! surfaces the final error unchanged. Read paths and constraint violations
//! are never retried.

use std::future::Future;
use std::time::Duration;

use crate::db::errors::DbError;

/// Maximum number of attempts (initial try included).
pub const MAX_ATTEMPTS: u32 = 3;

/// Delay between attempts.
const BACKOFF: Duration = Duration::from_millis(200);

/// Whether an error is worth another attempt.
///
/// Only infrastructure-level failures qualify: I/O errors, pool timeouts,
/// and closed connections. Constraint violations and missing rows are
/// deterministic and retrying them would just repeat the failure.
pub fn is_transient(err: &DbError) -> bool {
    let DbError::Other(inner) = err else {
        return false;
    };
    let Some(sqlx_err) = inner.downcast_ref::<sqlx::Error>() else {
        return false;
    };
    matches!(
        sqlx_err,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed
    )
}

/// Run `op` up to [`MAX_ATTEMPTS`] times, retrying transient failures.
pub async fn with_retries<T, F, Fut>(operation: &str, mut op: F) -> Result<T, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < MAX_ATTEMPTS && is_transient(&err) => {
                tracing::warn!(operation, attempt, error = %err, "Transient database error, retrying");
                attempt += 1;
                tokio::time::sleep(BACKOFF).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient() -> DbError {
        DbError::Other(anyhow::Error::from(sqlx::Error::PoolTimedOut))
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = with_retries("test op", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err(transient()) } else { Ok(42) } }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retries("test op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(transient()) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn does_not_retry_constraint_violations() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retries("test op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(DbError::UniqueViolation {
                    constraint: None,
                    table: None,
                    message: "duplicate".into(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn not_found_is_not_transient() {
        assert!(!is_transient(&DbError::NotFound));
        assert!(is_transient(&transient()));
    }
}
