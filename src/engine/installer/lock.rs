// Paw Extension Installer — FIFO install lock
//
// An async mutex with exactly two states, free and held, plus a queue of
// suspended acquirers. Release hands ownership straight to the oldest waiter
// that is still listening, so the lock never reads as free while anyone is
// queued and nobody can jump the queue.
//
// Guards own a handle to the lock state, so a guard can be moved into a
// spawned task and outlive the future that acquired it.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::oneshot;

#[derive(Default)]
struct LockState {
    held: bool,
    waiters: VecDeque<oneshot::Sender<()>>,
}

fn release(state: &Mutex<LockState>) {
    let mut state = state.lock();
    while let Some(next) = state.waiters.pop_front() {
        // A failed send means that waiter was dropped; try the next one.
        if next.send(()).is_ok() {
            return;
        }
    }
    state.held = false;
}

/// Process-wide install serialization point.
#[derive(Default)]
pub struct InstallLock {
    state: Arc<Mutex<LockState>>,
}

impl InstallLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspend until the lock is granted. Never fails.
    ///
    /// The returned guard releases the lock when dropped, including while
    /// unwinding from a panic.
    pub async fn acquire(&self) -> InstallGuard {
        let rx = {
            let mut state = self.state.lock();
            if !state.held {
                state.held = true;
                return InstallGuard { state: Arc::clone(&self.state) };
            }
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            rx
        };

        let mut waiter = Waiter { state: &self.state, rx, granted: false };
        // Senders are only consumed by `release`, which always sends.
        let _ = (&mut waiter.rx).await;
        waiter.granted = true;
        InstallGuard { state: Arc::clone(&self.state) }
    }

    /// `true` while an install holds the lock.
    pub fn is_held(&self) -> bool {
        self.state.lock().held
    }

    /// Number of queued acquirers, including ones whose callers already gave up.
    pub fn queued(&self) -> usize {
        self.state.lock().waiters.len()
    }
}

/// Ownership of the [`InstallLock`]. `'static`, so it can travel with the
/// work it protects.
#[must_use = "the install lock is released as soon as the guard is dropped"]
pub struct InstallGuard {
    state: Arc<Mutex<LockState>>,
}

impl Drop for InstallGuard {
    fn drop(&mut self) {
        release(&self.state);
    }
}

/// A queued acquisition. If the acquiring future is dropped after ownership
/// was already handed over, the lock is passed on instead of leaking.
struct Waiter<'a> {
    state: &'a Mutex<LockState>,
    rx: oneshot::Receiver<()>,
    granted: bool,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        if self.granted {
            return;
        }
        self.rx.close();
        if self.rx.try_recv().is_ok() {
            release(self.state);
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
