//! Settlement capability paired with a promise.
//!
//! A [`Deferred`] is held by whoever produces the value; the promise it
//! owns is handed to consumers and may outlive it.

use super::{Canceller, Input, Promise};

/// Owns exactly one promise and the capability to settle it.
///
/// # Example
///
/// ```
/// use settle::{Deferred, queue};
///
/// let deferred: Deferred<i32, &'static str> = Deferred::new();
/// let doubled = deferred.promise().then(|n| n * 2);
/// deferred.resolve(21);
/// queue::run_until_idle();
/// assert_eq!(doubled.settlement(), Some(Ok(42)));
/// ```
pub struct Deferred<T, E> {
    promise: Promise<T, E>,
}

impl<T, E> Deferred<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Creates a deferred whose promise has no canceller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            promise: Promise::pending(),
        }
    }

    /// Creates a deferred whose promise runs `on_cancel` when cancelled
    /// while still pending.
    ///
    /// The canceller receives the deferred itself, so it may settle the
    /// promise (typically to rejected) or decline, in which case the
    /// promise stays pending. The promise holds the canceller through a
    /// weak handle; an unsettled deferred does not leak through a
    /// self-cycle.
    #[must_use]
    pub fn with_canceller(on_cancel: impl FnOnce(&Self) + 'static) -> Self {
        let promise = Promise::pending();
        let weak = promise.downgrade();
        let canceller: Canceller = Box::new(move || {
            if let Some(promise) = weak.upgrade() {
                on_cancel(&Self { promise });
            }
        });
        promise.install_canceller(canceller);
        Self { promise }
    }

    /// Returns a consumer handle to the owned promise.
    #[must_use]
    pub fn promise(&self) -> Promise<T, E> {
        self.promise.clone()
    }

    /// Fulfills the owned promise, adopting a promise argument.
    ///
    /// Passing an [`Input::Eventual`] forwards whichever settlement that
    /// promise eventually reaches. Settling an already-settled promise
    /// has no observable effect.
    pub fn resolve(&self, value: impl Into<Input<T, E>>) {
        self.promise.settle_from(value.into());
    }

    /// Rejects the owned promise. No-op if already settled.
    pub fn reject(&self, reason: E) {
        self.promise.settle(Err(reason));
    }
}

impl<T, E> Default for Deferred<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promise::PromiseState;
    use crate::queue;
    use std::cell::Cell;
    use std::rc::Rc;

    type TestDeferred = Deferred<i32, &'static str>;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn resolve_then_reject_keeps_first_settlement() {
        init_test("resolve_then_reject_keeps_first_settlement");
        let deferred = TestDeferred::new();
        deferred.resolve(1);
        deferred.reject("late");
        deferred.resolve(2);
        let outcome = deferred.promise().settlement();
        crate::assert_with_log!(
            outcome == Some(Ok(1)),
            "first settlement wins",
            Some(Ok::<i32, &str>(1)),
            outcome
        );
        crate::test_complete!("resolve_then_reject_keeps_first_settlement");
    }

    #[test]
    fn resolve_adopts_a_promise_argument() {
        init_test("resolve_adopts_a_promise_argument");
        let inner = TestDeferred::new();
        let outer = TestDeferred::new();
        outer.resolve(inner.promise());
        assert!(outer.promise().is_pending());
        inner.reject("inner failed");
        queue::run_until_idle();
        assert_eq!(outer.promise().settlement(), Some(Err("inner failed")));
        crate::test_complete!("resolve_adopts_a_promise_argument");
    }

    #[test]
    fn canceller_may_settle_the_promise() {
        init_test("canceller_may_settle_the_promise");
        let deferred = TestDeferred::with_canceller(|d| d.reject("cancelled"));
        let promise = deferred.promise();
        promise.cancel();
        assert_eq!(promise.settlement(), Some(Err("cancelled")));
        crate::test_complete!("canceller_may_settle_the_promise");
    }

    #[test]
    fn canceller_may_decline_and_leave_promise_pending() {
        init_test("canceller_may_decline_and_leave_promise_pending");
        let asked = Rc::new(Cell::new(false));
        let deferred = {
            let asked = asked.clone();
            TestDeferred::with_canceller(move |_| asked.set(true))
        };
        let promise = deferred.promise();
        promise.cancel();
        assert!(asked.get());
        assert_eq!(promise.state(), PromiseState::Pending);
        crate::test_complete!("canceller_may_decline_and_leave_promise_pending");
    }

    #[test]
    fn settled_deferred_never_runs_its_canceller() {
        init_test("settled_deferred_never_runs_its_canceller");
        let asked = Rc::new(Cell::new(false));
        let deferred = {
            let asked = asked.clone();
            TestDeferred::with_canceller(move |_| asked.set(true))
        };
        deferred.resolve(3);
        deferred.promise().cancel();
        queue::run_until_idle();
        assert!(!asked.get());
        crate::test_complete!("settled_deferred_never_runs_its_canceller");
    }
}
