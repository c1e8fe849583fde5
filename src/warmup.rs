//! The warmup worker pool: pre-scans input on background threads with
//! allocation suppressed, purely to prime CPU caches before the real
//! decode runs.
//!
//! Grounded on the `Executor`/`Promise` worker-pool pattern (a bounded
//! work queue serviced by `N` long-lived threads, paired with a
//! `Mutex`+`Condvar` completion handle) rather than on anything in the
//! source engine, which this crate's teacher doesn't itself need (it has
//! no background work). `std::sync::mpsc::sync_channel` stands in for that
//! pattern's `Mutex<BinaryHeap<Job>>` since warmup jobs have no priority to
//! sort by — a plain bounded FIFO queue is the channel's native shape.

use std::sync::mpsc::{sync_channel, SyncSender, TrySendError};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

type Job = Box<dyn FnOnce() + Send>;

/// A one-shot handle a warmup caller waits on to know its background scan
/// has finished.
pub struct CompletionSignal {
    done: Mutex<bool>,
    condvar: Condvar,
}

impl CompletionSignal {
    pub(crate) fn new() -> Self {
        CompletionSignal {
            done: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    pub fn mark_done(&self) {
        *self.done.lock().unwrap() = true;
        self.condvar.notify_all();
    }

    pub fn wait(&self) {
        let mut done = self.done.lock().unwrap();
        while !*done {
            done = self.condvar.wait(done).unwrap();
        }
    }
}

/// Marks a [`CompletionSignal`] done when dropped, including during a panic
/// unwind. A warmup job runs arbitrary `skip` logic on a pooled thread; if
/// that ever panics, the job closure returns control to the caller of
/// `mark_done()` only via this guard's `Drop`, so `unmarshal`'s blocking
/// wait (which has no other way to learn the job is gone) is never left
/// waiting on a job that died mid-scan.
pub struct CompletionGuard {
    signal: Arc<CompletionSignal>,
}

impl CompletionGuard {
    pub fn new(signal: Arc<CompletionSignal>) -> Self {
        CompletionGuard { signal }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.signal.mark_done();
    }
}

/// `N = available_parallelism()` long-lived worker threads reading from a
/// bounded channel of capacity `N`. Submission is non-blocking
/// (`try_send`): per spec.md §4.10, if the channel is full the caller skips
/// warmup for that call rather than blocking.
pub struct WarmupPool {
    sender: SyncSender<Job>,
}

impl WarmupPool {
    pub fn new() -> Arc<Self> {
        let workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let (sender, receiver) = sync_channel::<Job>(workers);
        let receiver = Arc::new(Mutex::new(receiver));

        for _ in 0..workers {
            let receiver = receiver.clone();
            thread::spawn(move || loop {
                let job = {
                    let rx = receiver.lock().unwrap();
                    rx.recv()
                };
                match job {
                    Ok(job) => job(),
                    Err(_) => break,
                }
            });
        }

        Arc::new(WarmupPool { sender })
    }

    /// Attempts to enqueue `job`. Returns `true` if accepted, `false` if
    /// the channel is currently full (warmup skipped for this call, never
    /// a correctness dependency — see spec.md §4.10).
    pub fn try_warm(&self, job: Job) -> bool {
        match self.sender.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}
