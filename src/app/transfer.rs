//! Cancellable background transfers.
//!
//! A [`Transfer`] is one time-driven liquid move (source → mash,
//! mash → boil) running on its own thread.  The handle exposes exactly
//! two things: whether the task is still running, and a one-shot cancel.
//!
//! ```text
//!   ledger ──spawn──▶ [thread: block_on(task(cancellation))]
//!      │                        ▲
//!      └──cancel(): signal ─────┘ then join
//! ```
//!
//! The cancel signal is latched, so a cancel issued before the task
//! reaches its first wait is not lost, and cancelling a task that has
//! already finished neither blocks nor errors.

use core::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::warn;

use crate::error::{Error, Result};

type CancelSignal = Signal<CriticalSectionRawMutex, ()>;

/// The task-side view of a transfer's cancel signal.
#[derive(Clone)]
pub struct Cancellation(Arc<CancelSignal>);

impl Cancellation {
    /// Resolves once the owning handle cancels.
    pub async fn cancelled(&self) {
        self.0.wait().await;
    }
}

/// Handle to a running (or finished) transfer task.
pub struct Transfer {
    name: &'static str,
    cancel: Arc<CancelSignal>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

/// Clears the running flag when the task body exits, panics included.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Transfer {
    /// Start `task` on a dedicated thread named `name`.
    ///
    /// The future is built and polled on that thread, so it need not be
    /// `Send`; only the closure producing it crosses threads.
    pub fn spawn<F, Fut>(name: &'static str, task: F) -> Result<Self>
    where
        F: FnOnce(Cancellation) -> Fut + Send + 'static,
        Fut: Future<Output = ()>,
    {
        let cancel = Arc::new(Signal::new());
        let running = Arc::new(AtomicBool::new(true));

        let token = Cancellation(Arc::clone(&cancel));
        let guard = RunningGuard(Arc::clone(&running));
        let thread = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                let _guard = guard;
                futures_lite::future::block_on(task(token));
            })
            .map_err(|_| Error::Task("failed to spawn transfer thread"))?;

        Ok(Self {
            name,
            cancel,
            running,
            thread: Some(thread),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Cancel the task and wait for it to wind down.
    ///
    /// Returns `true` if the task was still running.  Only a running task
    /// is signalled; a finished one is simply reaped.
    pub fn cancel(mut self) -> bool {
        let was_running = self.is_running();
        if was_running {
            self.cancel.signal(());
        }
        self.join();
        was_running
    }

    fn join(&mut self) {
        let Some(handle) = self.thread.take() else {
            return;
        };
        // A listener running on the transfer thread may close its own
        // valve; joining ourselves would never return.
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            warn!("{}: transfer task panicked", self.name);
        }
    }
}
