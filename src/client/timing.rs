//! Single-shot debounce timer

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs a future once `delay` has passed without another `schedule` call.
/// Each call cancels the pending one; dropping the debouncer cancels it too.
///
/// Only the wait is cancellable. Once the delay elapses the future runs on its
/// own task and is no longer owned by the debouncer.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Must be called from within a tokio runtime
    pub fn schedule<Fut>(&mut self, fut: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(fut);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
