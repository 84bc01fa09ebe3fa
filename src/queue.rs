//! Deferred-invocation queue that drives promise reactions.
//!
//! The promise core never runs a continuation synchronously inside the call
//! that registers it. Instead, every reaction is pushed onto this
//! thread-local FIFO and runs when the queue is drained. For a single
//! settled promise, reactions therefore fire in registration order.
//!
//! The queue is deliberately minimal: it is the seam where a real event
//! loop would plug in. Tests and examples drive it with
//! [`run_until_idle`].

use std::cell::RefCell;
use std::collections::VecDeque;

type Job = Box<dyn FnOnce()>;

thread_local! {
    static QUEUE: RefCell<VecDeque<Job>> = const { RefCell::new(VecDeque::new()) };
}

/// Pushes a job onto the current thread's queue.
///
/// The job runs during the next [`run_until_idle`] drain, after every job
/// enqueued before it.
pub fn enqueue(job: impl FnOnce() + 'static) {
    QUEUE.with(|queue| {
        let mut queue = queue.borrow_mut();
        queue.push_back(Box::new(job));
        tracing::trace!(depth = queue.len(), "job enqueued");
    });
}

/// Runs queued jobs until the queue is empty.
///
/// Jobs may enqueue further jobs; those run within the same drain, in FIFO
/// order. The queue borrow is released before each job runs, so jobs are
/// free to enqueue (settling a promise from inside a reaction is the
/// normal case).
pub fn run_until_idle() {
    let mut ran = 0usize;
    loop {
        let job = QUEUE.with(|queue| queue.borrow_mut().pop_front());
        match job {
            Some(job) => {
                job();
                ran += 1;
            }
            None => break,
        }
    }
    tracing::trace!(jobs = ran, "queue drained");
}

/// Returns the number of jobs currently queued on this thread.
#[must_use]
pub fn depth() -> usize {
    QUEUE.with(|queue| queue.borrow().len())
}
