//! Cancellable background requests: debounced suggestion lookups and a
//! scope that aborts everything it spawned when dropped.
//!
//! Cancellation is cooperative plus forced: the task's [`AbortSignal`] is
//! raised and its tokio task is aborted. Results are published through
//! [`AbortSignal::run_unless_aborted`], which holds the same lock as
//! [`AbortSignal::abort`], so a superseded request can never publish after
//! its successor was issued.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

use resiply_client::SuggestBackend;
use resiply_types::SuggestConfig;

/// Result of a request that may have been cancelled. Aborting is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome<T> {
    Completed(T),
    Aborted,
}

impl<T> RequestOutcome<T> {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Aborted => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    aborted: Arc<Mutex<bool>>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        let mut aborted = self.aborted.lock().unwrap_or_else(|e| e.into_inner());
        *aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        *self.aborted.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` only if the signal has not fired; `abort` waits for it.
    pub fn run_unless_aborted<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let aborted = self.aborted.lock().unwrap_or_else(|e| e.into_inner());
        if *aborted {
            None
        } else {
            Some(f())
        }
    }
}

/// Handle to one spawned request.
pub struct PendingRequest<T> {
    signal: AbortSignal,
    handle: JoinHandle<RequestOutcome<T>>,
}

impl<T> PendingRequest<T> {
    pub fn signal(&self) -> &AbortSignal {
        &self.signal
    }

    pub fn abort(&self) {
        self.signal.abort();
        self.handle.abort();
    }

    pub async fn outcome(self) -> RequestOutcome<T> {
        match self.handle.await {
            Ok(_) if self.signal.is_aborted() => RequestOutcome::Aborted,
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => RequestOutcome::Aborted,
            Err(e) => {
                tracing::error!(error = %e, "Background request panicked");
                RequestOutcome::Aborted
            }
        }
    }
}

/// Must be called from within a tokio runtime.
fn spawn_request<F, Fut, T>(delay: Option<Duration>, make: F) -> (PendingRequest<T>, AbortHandle)
where
    F: FnOnce(AbortSignal) -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let signal = AbortSignal::new();
    let task_signal = signal.clone();
    let handle = tokio::spawn(async move {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if task_signal.is_aborted() {
            return RequestOutcome::Aborted;
        }
        let value = make(task_signal.clone()).await;
        if task_signal.is_aborted() {
            RequestOutcome::Aborted
        } else {
            RequestOutcome::Completed(value)
        }
    });
    let abort = handle.abort_handle();
    (PendingRequest { signal, handle }, abort)
}

/// Single-owner timer for one input stream: scheduling a new request
/// cancels the previous one unconditionally.
pub struct Debouncer {
    delay: Duration,
    current: Option<(AbortSignal, AbortHandle)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            current: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule<F, Fut, T>(&mut self, make: F) -> PendingRequest<T>
    where
        F: FnOnce(AbortSignal) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.cancel();
        let (pending, abort) = spawn_request(Some(self.delay), make);
        self.current = Some((pending.signal.clone(), abort));
        pending
    }

    pub fn cancel(&mut self) {
        if let Some((signal, abort)) = self.current.take() {
            signal.abort();
            abort.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Owner of outstanding requests for one screen; dropping it cancels them.
#[derive(Default)]
pub struct RequestScope {
    tasks: Vec<(AbortSignal, AbortHandle)>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F, Fut, T>(&mut self, make: F) -> PendingRequest<T>
    where
        F: FnOnce(AbortSignal) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.tasks.retain(|(_, abort)| !abort.is_finished());
        let (pending, abort) = spawn_request(None, make);
        self.tasks.push((pending.signal.clone(), abort));
        pending
    }

    /// Requests that have not finished yet.
    pub fn outstanding(&self) -> usize {
        self.tasks.iter().filter(|(_, a)| !a.is_finished()).count()
    }

    pub fn cancel_all(&mut self) {
        let cancelled = self.tasks.len();
        for (signal, abort) in self.tasks.drain(..) {
            signal.abort();
            abort.abort();
        }
        if cancelled > 0 {
            tracing::debug!(cancelled, "Cancelled outstanding requests");
        }
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Debounced search-as-you-type suggestions.
///
/// The latest results are observable through [`subscribe`](Self::subscribe);
/// only the newest input can ever publish.
pub struct SuggestionFeed {
    backend: Arc<dyn SuggestBackend>,
    limit: usize,
    debouncer: Debouncer,
    tx: Arc<watch::Sender<Vec<String>>>,
}

impl SuggestionFeed {
    pub fn new(backend: Arc<dyn SuggestBackend>, config: &SuggestConfig) -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            backend,
            limit: config.limit,
            debouncer: Debouncer::new(config.debounce()),
            tx: Arc::new(tx),
        }
    }

    /// Feed the current input. Blank input clears the results, cancels any
    /// request in flight and returns `None`.
    pub fn input(&mut self, text: &str) -> Option<PendingRequest<Vec<String>>> {
        let query = text.trim().to_string();
        if query.is_empty() {
            self.clear();
            return None;
        }

        let backend = Arc::clone(&self.backend);
        let tx = Arc::clone(&self.tx);
        let limit = self.limit;
        Some(self.debouncer.schedule(move |signal| async move {
            let mut results = match backend.suggest(&query, limit).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::error!(query = %query, error = %e, "Suggestion lookup failed");
                    Vec::new()
                }
            };
            results.truncate(limit);
            signal.run_unless_aborted(|| tx.send_replace(results.clone()));
            results
        }))
    }

    pub fn clear(&mut self) {
        self.debouncer.cancel();
        self.tx.send_replace(Vec::new());
    }

    pub fn current(&self) -> Vec<String> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.tx.subscribe()
    }
}
