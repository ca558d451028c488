//! Single-flight memoization of async producers
//!
//! Wraps a zero-argument async producer so that it runs at most once per
//! [`SingleFlight`] instance. Callers arriving while the producer is still
//! running wait for it; callers arriving later get the stored outcome.
//! Failures are stored too and never retried: every caller receives the
//! same `Arc` of the first error.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::OnceCell;

type Producer<T, E> = Box<dyn Fn() -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

pub struct SingleFlight<T, E> {
    producer: Producer<T, E>,
    outcome: OnceCell<Result<T, Arc<E>>>,
}

impl<T, E> SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub fn new<F, Fut>(producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            producer: Box::new(move || Box::pin(producer())),
            outcome: OnceCell::new(),
        }
    }

    /// Run the producer on first use and return its shared outcome
    pub async fn get(&self) -> Result<T, Arc<E>> {
        self.outcome
            .get_or_init(|| async { (self.producer)().await.map_err(Arc::new) })
            .await
            .clone()
    }

    /// Whether the producer has finished
    pub fn is_settled(&self) -> bool {
        self.outcome.initialized()
    }
}
