//! Single-flight, memoized database connection.
//!
//! [`ConnectionManager`] hands out one shared handle for the life of the
//! value. The first caller starts a connection attempt; callers that arrive
//! while it is in flight await the same attempt and observe the same
//! handle or the same error. A failed attempt is never cached: the pending
//! marker is cleared so the next call starts over.
//!
//! The attempt runs on its own task and settles the cache itself, so it
//! keeps going when every caller awaiting it has been dropped.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::Mutex;

use crate::error::ConnectionError;

/// Opens connections to a backing store.
pub trait Connector: Send + Sync + 'static {
    /// Handle returned by a successful connection. Cloning it must be cheap
    /// and every clone must refer to the same underlying connection.
    type Handle: Clone + Send + Sync + 'static;

    /// Starts one connection attempt.
    fn connect(&self) -> BoxFuture<'static, Result<Self::Handle, ConnectionError>>;
}

type PendingConnect<H> = Shared<BoxFuture<'static, Result<H, ConnectionError>>>;

struct ConnectionCache<H> {
    conn: Option<H>,
    pending: Option<(u64, PendingConnect<H>)>,
    next_attempt: u64,
}

/// Lazily connects through a [`Connector`] and memoizes the handle.
///
/// The cache lock is only held to inspect or update state, never across the
/// connection attempt itself.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    connect_timeout: Duration,
    cache: Arc<Mutex<ConnectionCache<C::Handle>>>,
}

impl<C: Connector> ConnectionManager<C> {
    /// Creates an empty manager. No I/O happens until [`Self::get`].
    #[must_use]
    pub fn new(connector: C, connect_timeout: Duration) -> Self {
        Self {
            connector,
            connect_timeout,
            cache: Arc::new(Mutex::new(ConnectionCache {
                conn: None,
                pending: None,
                next_attempt: 0,
            })),
        }
    }

    /// Returns a ready handle, connecting first if needed.
    ///
    /// # Errors
    ///
    /// Returns the [`ConnectionError`] of the attempt this call awaited.
    /// Every caller that awaited the same attempt receives the same error.
    pub async fn get(&self) -> Result<C::Handle, ConnectionError> {
        let attempt = {
            let mut cache = self.cache.lock().await;
            if let Some(conn) = &cache.conn {
                return Ok(conn.clone());
            }
            match &cache.pending {
                Some((id, pending)) => {
                    tracing::debug!(attempt = id, "awaiting in-flight connection attempt");
                    pending.clone()
                }
                None => {
                    let id = cache.next_attempt;
                    cache.next_attempt += 1;
                    let pending = self.start_attempt(id);
                    cache.pending = Some((id, pending.clone()));
                    pending
                }
            }
        };

        attempt.await
    }

    /// Returns `true` once a handle has been cached.
    pub async fn is_connected(&self) -> bool {
        self.cache.lock().await.conn.is_some()
    }

    fn start_attempt(&self, id: u64) -> PendingConnect<C::Handle> {
        tracing::info!(attempt = id, "connecting to database");
        let timeout = self.connect_timeout;
        let connect = self.connector.connect();
        let cache = Arc::clone(&self.cache);
        let task = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move {
                let result = match tokio::time::timeout(timeout, connect).await {
                    Ok(result) => result,
                    Err(_) => Err(ConnectionError::Timeout(timeout)),
                };
                settle(&cache, id, &result).await;
                result
            }
        });
        async move {
            match task.await {
                Ok(result) => result,
                Err(join_err) => {
                    let result = Err(ConnectionError::Connect(join_err.to_string()));
                    settle(&cache, id, &result).await;
                    result
                }
            }
        }
        .boxed()
        .shared()
    }
}

/// Records the outcome of attempt `id`, unless a newer attempt replaced it.
async fn settle<H: Clone>(
    cache: &Mutex<ConnectionCache<H>>,
    id: u64,
    result: &Result<H, ConnectionError>,
) {
    let mut cache = cache.lock().await;
    let still_pending = cache
        .pending
        .as_ref()
        .is_some_and(|(pending_id, _)| *pending_id == id);
    if !still_pending {
        return;
    }
    cache.pending = None;
    match result {
        Ok(handle) => {
            cache.conn = Some(handle.clone());
            tracing::info!(attempt = id, "database connection established");
        }
        Err(err) => {
            tracing::warn!(attempt = id, error = %err, "database connection failed");
        }
    }
}

impl<C: Connector + fmt::Debug> fmt::Debug for ConnectionManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connector", &self.connector)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::persistence::memory::MemoryConnector;

    const TIMEOUT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn sequential_calls_connect_once() {
        let connector = MemoryConnector::new();
        let manager = ConnectionManager::new(connector.clone(), TIMEOUT);

        let Ok(first) = manager.get().await else {
            panic!("first connection failed");
        };
        for _ in 0..5 {
            let Ok(next) = manager.get().await else {
                panic!("cached connection failed");
            };
            assert!(next.same_store(&first));
        }
        assert_eq!(connector.attempts(), 1);
        assert!(manager.is_connected().await);
    }

    #[tokio::test]
    async fn concurrent_calls_share_one_attempt() {
        let connector = MemoryConnector::new().with_delay(Duration::from_millis(50));
        let manager = ConnectionManager::new(connector.clone(), TIMEOUT);

        let (a, b) = tokio::join!(manager.get(), manager.get());
        let (Ok(a), Ok(b)) = (a, b) else {
            panic!("both callers should connect");
        };
        assert!(a.same_store(&b));
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_failure_then_retry() {
        let connector = MemoryConnector::new()
            .with_delay(Duration::from_millis(50))
            .failing(1);
        let manager = Arc::new(ConnectionManager::new(connector.clone(), TIMEOUT));

        let first = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { manager.get().await }
        });
        let second = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { manager.get().await }
        });
        let (Ok(first), Ok(second)) = (first.await, second.await) else {
            panic!("tasks panicked");
        };
        let (Err(e1), Err(e2)) = (first, second) else {
            panic!("both callers should observe the failure");
        };
        assert_eq!(e1, e2);
        assert_eq!(connector.attempts(), 1);
        assert!(!manager.is_connected().await);

        assert!(manager.get().await.is_ok());
        assert_eq!(connector.attempts(), 2);
    }

    #[tokio::test]
    async fn hung_attempt_times_out_and_is_cleared() {
        let connector = MemoryConnector::new().with_delay(Duration::from_millis(500));
        let manager = ConnectionManager::new(connector.clone(), Duration::from_millis(20));

        let Err(err) = manager.get().await else {
            panic!("attempt should time out");
        };
        assert_eq!(err, ConnectionError::Timeout(Duration::from_millis(20)));
        assert!(manager.cache.lock().await.pending.is_none());

        assert!(manager.get().await.is_err());
        assert_eq!(connector.attempts(), 2);
    }

    #[tokio::test]
    async fn abandoned_attempt_keeps_connecting() {
        let connector = MemoryConnector::new().with_delay(Duration::from_millis(100));
        let manager = ConnectionManager::new(connector.clone(), Duration::from_millis(150));

        let gave_up = tokio::time::timeout(Duration::from_millis(10), manager.get()).await;
        assert!(gave_up.is_err());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(manager.is_connected().await);

        let Ok(store) = manager.get().await else {
            panic!("later caller should receive the handle");
        };
        assert!(store.same_store(&connector.store()));
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test]
    async fn abandoned_failed_attempt_is_cleared() {
        let connector = MemoryConnector::new()
            .with_delay(Duration::from_millis(20))
            .failing(1);
        let manager = ConnectionManager::new(connector.clone(), TIMEOUT);

        let gave_up = tokio::time::timeout(Duration::from_millis(5), manager.get()).await;
        assert!(gave_up.is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(manager.cache.lock().await.pending.is_none());

        assert!(manager.get().await.is_ok());
        assert_eq!(connector.attempts(), 2);
    }
}
