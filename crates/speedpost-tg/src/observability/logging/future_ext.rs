use crate::prelude::*;
use async_trait::async_trait;
use easy_ext::ext;
use std::future::Future;
use std::time::{Duration, Instant};

#[ext(FutureExt)]
#[async_trait]
pub(crate) impl<T, E, F> F
where
    F: Future<Output = Result<T, E>> + Send,
{
    /// Await the fallible future and log the time it took together with the
    /// given message
    async fn with_duration_log(self, msg: &'static str) -> F::Output {
        let (result, duration) = self.with_duration().await;
        let duration = tracing_duration(duration);
        match &result {
            Ok(_) => info!(result = "ok", duration, "{msg}"),
            Err(_) => warn!(result = "err", duration, "{msg}"),
        }
        result
    }

    /// Await the fallible future and measure the wall-clock time it took
    /// regardless of its outcome.
    async fn with_duration(self) -> (F::Output, Duration) {
        let start = Instant::now();
        let result = self.await;
        (result, start.elapsed())
    }
}
