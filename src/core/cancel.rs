//! Cancellation groups.
//!
//! A group tracks every task spawned through it and tears them all down
//! together. Each teardown bumps the group's generation; tokens minted
//! before the bump report themselves cancelled from that moment on, which
//! is what the output channel uses to drop late writes.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default)]
pub struct GenerationCounter(Arc<AtomicU64>);

impl GenerationCounter {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }

    fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    generation: u64,
    counter: GenerationCounter,
    shutdown_rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        !self.counter.is_current(self.generation) || *self.shutdown_rx.borrow()
    }

    pub async fn cancelled(&self) {
        let mut shutdown_rx = self.shutdown_rx.clone();
        loop {
            if *shutdown_rx.borrow() || !self.counter.is_current(self.generation) {
                return;
            }
            if shutdown_rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[derive(Debug)]
struct GroupState {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

#[derive(Debug)]
pub struct CancellationGroup {
    name: &'static str,
    counter: GenerationCounter,
    state: Mutex<GroupState>,
}

impl CancellationGroup {
    pub fn new(name: &'static str) -> Self {
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);
        Self {
            name,
            counter: GenerationCounter::default(),
            state: Mutex::new(GroupState {
                shutdown_tx,
                handles: Vec::new(),
            }),
        }
    }

    pub fn generation_counter(&self) -> GenerationCounter {
        self.counter.clone()
    }

    pub fn token(&self) -> CancelToken {
        let state = self.state.lock();
        Self::token_locked(&self.counter, &state)
    }

    fn token_locked(counter: &GenerationCounter, state: &GroupState) -> CancelToken {
        CancelToken {
            generation: counter.current(),
            counter: counter.clone(),
            shutdown_rx: state.shutdown_tx.subscribe(),
        }
    }

    /// Spawns `f(token)` as a member of the group. The task stops at its next
    /// await point once the group is cancelled.
    pub fn spawn<F, Fut>(&self, f: F)
    where
        F: FnOnce(CancelToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = self.token();
        let watcher = token.clone();
        let fut = f(token);

        // 若在此期間被取消，watcher 會立即結束任務
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = watcher.cancelled() => {}
                _ = fut => {}
            }
        });

        let mut state = self.state.lock();
        state.handles.retain(|h| !h.is_finished());
        state.handles.push(handle);
    }

    /// Cancels every member spawned so far and returns how many were still running.
    pub fn cancel_all(&self) -> usize {
        let mut state = self.state.lock();
        let generation = self.counter.bump();

        let _ = state.shutdown_tx.send(true);
        let (fresh_tx, _fresh_rx) = watch::channel(false);
        state.shutdown_tx = fresh_tx;

        let mut running = 0;
        for handle in state.handles.drain(..) {
            if !handle.is_finished() {
                running += 1;
            }
            handle.abort();
        }

        if running > 0 {
            tracing::debug!(group = self.name, generation, running, "cancelled group members");
        }
        running
    }

    pub fn active_count(&self) -> usize {
        self.state.lock().handles.iter().filter(|h| !h.is_finished()).count()
    }
}

impl Drop for CancellationGroup {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        let _ = state.shutdown_tx.send(true);
        for handle in state.handles.drain(..) {
            handle.abort();
        }
    }
}
