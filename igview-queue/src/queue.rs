//! Rate-limited FIFO request queue.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::QueueError;

/// A deferred upstream call. Consumed exactly once by the drain loop.
type QueuedRequest = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

struct QueueState {
    pending: VecDeque<QueuedRequest>,
    last_dispatch: Option<Instant>,
    draining: bool,
}

struct Inner {
    min_interval: Duration,
    state: Mutex<QueueState>,
}

/// Rate-limited FIFO queue shared by every upstream operation.
///
/// Cloning is cheap and yields a handle to the same queue.
#[derive(Clone)]
pub struct RequestQueue {
    inner: Arc<Inner>,
}

impl RequestQueue {
    /// Creates a queue that spaces dispatches at least `min_interval` apart.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                min_interval,
                state: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    last_dispatch: None,
                    draining: false,
                }),
            }),
        }
    }

    /// Minimum spacing between two dispatches.
    pub fn min_interval(&self) -> Duration {
        self.inner.min_interval
    }

    /// Number of requests waiting for their turn.
    pub fn pending(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Appends a deferred call and waits for its outcome.
    ///
    /// `execute` is invoked once the request reaches the head of the queue and
    /// the pacing interval has elapsed. Whatever it returns, including an error
    /// value, is handed back to this caller only.
    pub async fn enqueue<F, Fut, T>(&self, execute: F) -> Result<T, QueueError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let request: QueuedRequest = Box::new(move || {
            async move {
                let outcome = execute().await;
                // The caller may have stopped waiting; nothing to do then.
                let _ = tx.send(outcome);
            }
            .boxed()
        });

        let start_worker = {
            let mut state = self.inner.state.lock();
            state.pending.push_back(request);
            trace!(pending = state.pending.len(), "request enqueued");
            if state.draining {
                false
            } else {
                state.draining = true;
                true
            }
        };

        if start_worker {
            tokio::spawn(drain(Arc::clone(&self.inner)));
        }

        rx.await.map_err(|_| QueueError::Dropped)
    }
}

/// Worker loop. Only one runs at a time, guarded by `QueueState::draining`.
async fn drain(inner: Arc<Inner>) {
    debug!("queue worker started");
    loop {
        let wait = {
            let mut state = inner.state.lock();
            if state.pending.is_empty() {
                state.draining = false;
                debug!("queue worker idle");
                return;
            }
            state
                .last_dispatch
                .map(|last| (last + inner.min_interval).saturating_duration_since(Instant::now()))
                .unwrap_or_default()
        };

        if !wait.is_zero() {
            trace!(wait_ms = wait.as_millis() as u64, "pacing upstream dispatch");
            tokio::time::sleep(wait).await;
        }

        let request = {
            let mut state = inner.state.lock();
            match state.pending.pop_front() {
                Some(request) => {
                    state.last_dispatch = Some(Instant::now());
                    request
                }
                None => {
                    state.draining = false;
                    return;
                }
            }
        };

        // Dispatch order is what the queue guarantees; the call itself runs on
        // its own task so a slow upstream does not hold back pacing.
        tokio::spawn(request());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(200);

    fn recorder() -> Arc<Mutex<Vec<(usize, Instant)>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_request_dispatches_immediately() {
        let queue = RequestQueue::new(INTERVAL);
        let start = Instant::now();
        let out = queue.enqueue(|| async { Instant::now() }).await.unwrap();
        assert!(out - start < INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_is_fifo_and_paced() {
        let queue = RequestQueue::new(INTERVAL);
        let log = recorder();

        let calls = (0..5).map(|i| {
            let queue = queue.clone();
            let log = Arc::clone(&log);
            async move {
                queue
                    .enqueue(move || async move {
                        log.lock().push((i, Instant::now()));
                        i
                    })
                    .await
            }
        });
        let results = futures::future::join_all(calls).await;
        assert_eq!(results.into_iter().map(|r| r.unwrap()).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);

        let log = log.lock();
        let order: Vec<usize> = log.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);

        let first = log[0].1;
        for (n, (_, at)) in log.iter().enumerate() {
            assert!(*at - first >= INTERVAL * n as u32, "dispatch {} too early", n);
        }
        for pair in log.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= INTERVAL);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_only_rejects_its_own_request() {
        let queue = RequestQueue::new(INTERVAL);

        let ok_before = queue.enqueue(|| async { Ok::<_, String>(1) });
        let failing = queue.enqueue(|| async { Err::<u32, _>("boom".to_string()) });
        let ok_after = queue.enqueue(|| async { Ok::<_, String>(3) });

        let (a, b, c) = tokio::join!(ok_before, failing, ok_after);
        assert_eq!(a.unwrap(), Ok(1));
        assert_eq!(b.unwrap(), Err("boom".to_string()));
        assert_eq!(c.unwrap(), Ok(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_request_does_not_stall_queue() {
        let queue = RequestQueue::new(INTERVAL);

        let panicking = queue.enqueue(|| async {
            if true {
                panic!("request blew up");
            }
            0u32
        });
        let healthy = queue.enqueue(|| async { 7u32 });

        let (p, h) = tokio::join!(panicking, healthy);
        assert_eq!(p, Err(QueueError::Dropped));
        assert_eq!(h, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_order_may_differ_from_dispatch_order() {
        let queue = RequestQueue::new(Duration::from_millis(10));
        let done = Arc::new(Mutex::new(Vec::new()));

        let slow = {
            let done = Arc::clone(&done);
            queue.enqueue(move || async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                done.lock().push("slow");
            })
        };
        let fast = {
            let done = Arc::clone(&done);
            queue.enqueue(move || async move {
                done.lock().push("fast");
            })
        };

        let _ = tokio::join!(slow, fast);
        assert_eq!(*done.lock(), vec!["fast", "slow"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueue_while_draining_is_picked_up() {
        let queue = RequestQueue::new(INTERVAL);
        let log = recorder();

        let enqueue = |i: usize| {
            let queue = queue.clone();
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                queue
                    .enqueue(move || async move {
                        log.lock().push((i, Instant::now()));
                    })
                    .await
            })
        };

        let first = enqueue(0);
        let second = enqueue(1);
        // The worker dispatches request 0 and is now pacing before request 1.
        tokio::time::advance(Duration::from_millis(50)).await;
        tokio::task::yield_now().await;
        let third = enqueue(2);

        for handle in [first, second, third] {
            handle.await.unwrap().unwrap();
        }

        let log = log.lock();
        let order: Vec<usize> = log.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!(log[2].1 - log[0].1 >= INTERVAL * 2);
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_restarts_after_idle() {
        let queue = RequestQueue::new(INTERVAL);
        assert_eq!(queue.enqueue(|| async { 1 }).await, Ok(1));

        tokio::time::sleep(Duration::from_secs(5)).await;
        let start = Instant::now();
        let at = queue.enqueue(|| async { Instant::now() }).await.unwrap();
        // The interval since the last dispatch has long passed.
        assert!(at - start < INTERVAL);
    }
}
