//! Minimum spacing between calls to a remote source.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

use refdata_core::places::{Country, Place};
use refdata_core::storage::{CountrySource, PlaceSource, Result};

/// Enforces a minimum interval between calls.
///
/// The interval is measured from the moment the previous call returned, so
/// a slow call never lets the next one start early. Calls are serialised:
/// the lock is held for the whole call.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_return: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter. The first call runs immediately.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_return: Mutex::new(None),
        }
    }

    /// Returns the configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs `f` once the interval since the previous call has elapsed.
    ///
    /// The return instant is recorded whatever `f` returns, and also when
    /// the caller drops the future while `f` is still running.
    pub async fn run<F, Fut, T>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let last_return = self.last_return.lock().await;

        if let Some(previous) = *last_return {
            let ready_at = previous + self.interval;
            let now = Instant::now();
            if ready_at > now {
                tracing::debug!(
                    wait_ms = (ready_at - now).as_millis() as u64,
                    "Rate limit reached, waiting"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }

        let _stamp = ReturnStamp(last_return);
        f().await
    }
}

/// Records the end of an attempt when dropped, on completion or cancellation.
struct ReturnStamp<'a>(MutexGuard<'a, Option<Instant>>);

impl Drop for ReturnStamp<'_> {
    fn drop(&mut self) {
        *self.0 = Some(Instant::now());
    }
}

/// Routes every call to the wrapped source through a [`RateLimiter`].
pub struct RateLimited<S> {
    inner: S,
    limiter: RateLimiter,
}

impl<S> RateLimited<S> {
    pub fn new(inner: S, interval: Duration) -> Self {
        Self {
            inner,
            limiter: RateLimiter::new(interval),
        }
    }

    /// Returns the wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: CountrySource> CountrySource for RateLimited<S> {
    async fn get_country_by_qid(&self, qid: &str) -> Result<Option<Country>> {
        self.limiter
            .run(|| self.inner.get_country_by_qid(qid))
            .await
    }

    async fn get_country_by_code(&self, code: &str) -> Result<Option<Country>> {
        self.limiter
            .run(|| self.inner.get_country_by_code(code))
            .await
    }
}

#[async_trait]
impl<S: PlaceSource> PlaceSource for RateLimited<S> {
    async fn get_place_by_qid(&self, qid: &str) -> Result<Option<Place>> {
        self.limiter.run(|| self.inner.get_place_by_qid(qid)).await
    }
}
