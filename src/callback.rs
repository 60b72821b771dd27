//! Completion-callback invocation for store operations.
//!
//! Every [`CacheStore`](crate::CacheStore) operation is an `async fn`. The
//! `*_with_callback` variants run that same future on the Tokio runtime and
//! hand its outcome to a callback instead of returning it.

use crate::error::Result;
use std::future::Future;
use tokio::task::JoinHandle;

/// Run `operation` on the current Tokio runtime and pass its outcome to `callback`.
///
/// The callback receives exactly one `Result`: either the value or the error,
/// never both, and it runs at most once (it is `FnOnce`). It does not run if
/// the returned task is aborted before the operation finishes.
///
/// # Panics
///
/// Panics when called outside a Tokio runtime, like `tokio::spawn`.
///
/// # Example
///
/// ```
/// use redis_cache_store::callback::spawn_with_callback;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (tx, rx) = tokio::sync::oneshot::channel();
/// spawn_with_callback(async { Ok(42) }, move |result| {
///     let _ = tx.send(result);
/// });
/// assert_eq!(rx.await.unwrap().unwrap(), 42);
/// # }
/// ```
pub fn spawn_with_callback<T, Fut, F>(operation: Fut, callback: F) -> JoinHandle<()>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    F: FnOnce(Result<T>) + Send + 'static,
{
    tokio::spawn(async move {
        let outcome = operation.await;
        callback(outcome);
    })
}
