//! Promise state machine, chaining, and cancellation.
//!
//! A [`Promise`] is a one-shot container for a value or a failure reason
//! that becomes available later. Handles are cheap clones sharing one
//! state cell; the transition out of `Pending` happens at most once, and
//! a second settlement attempt is a silent no-op.
//!
//! Reactions registered while pending are dispatched through the
//! [`queue`](crate::queue) when the promise settles, in registration
//! order. Reactions registered after settlement are queued immediately;
//! they never run synchronously inside the registering call.

pub mod deferred;

pub use deferred::Deferred;

use crate::queue;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Reaction<T, E> = Box<dyn FnOnce(Result<T, E>)>;

pub(crate) type Canceller = Box<dyn FnOnce()>;

/// Observable lifecycle stage of a promise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromiseState {
    /// Not yet settled; reactions accumulate.
    Pending,
    /// Settled with a value.
    Fulfilled,
    /// Settled with a failure reason.
    Rejected,
}

impl PromiseState {
    /// Returns the state name as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fulfilled => "fulfilled",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PromiseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A plain value or a promise of one.
///
/// This is the adoption union: combinators and handlers accept either
/// variant and normalize through [`resolve`], so call sites never
/// duck-type "is this a promise?". Plain values convert with `From`, as
/// do promises, so most call sites just write the value.
#[derive(Debug)]
pub enum Input<T, E> {
    /// A value available now.
    Immediate(T),
    /// A promise whose eventual state is adopted.
    Eventual(Promise<T, E>),
}

impl<T, E> From<T> for Input<T, E> {
    fn from(value: T) -> Self {
        Self::Immediate(value)
    }
}

impl<T, E> From<Promise<T, E>> for Input<T, E> {
    fn from(promise: Promise<T, E>) -> Self {
        Self::Eventual(promise)
    }
}

enum State<T, E> {
    Pending {
        reactions: SmallVec<[Reaction<T, E>; 2]>,
        canceller: Option<Canceller>,
        /// Derived promises currently interested in this one.
        consumers: usize,
        /// Derived promises that have requested cancellation.
        cancel_requests: usize,
    },
    Fulfilled(T),
    Rejected(E),
}

struct Inner<T, E> {
    state: State<T, E>,
}

/// A one-shot, cancel-aware container for an eventual value or failure.
///
/// `Promise` handles are `Clone`; all clones observe the same settlement.
/// Values fan out to reactions by `Clone`, which is why `T` and `E` carry
/// `Clone` bounds on the methods that read them.
pub struct Promise<T, E> {
    inner: Rc<RefCell<Inner<T, E>>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("state", &self.state().as_str())
            .finish()
    }
}

/// A weak promise handle, used inside cancellers to avoid reference
/// cycles between a promise and the closure it stores.
pub(crate) struct WeakPromise<T, E> {
    inner: Weak<RefCell<Inner<T, E>>>,
}

impl<T, E> WeakPromise<T, E> {
    pub(crate) fn upgrade(&self) -> Option<Promise<T, E>> {
        self.inner.upgrade().map(|inner| Promise { inner })
    }
}

impl<T, E> Promise<T, E> {
    /// Creates a pending promise with no canceller installed.
    pub(crate) fn pending() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                state: State::Pending {
                    reactions: SmallVec::new(),
                    canceller: None,
                    consumers: 0,
                    cancel_requests: 0,
                },
            })),
        }
    }

    /// Installs a canceller on a still-pending promise.
    ///
    /// Replaces any previous canceller; callers install at construction
    /// time only. No-op once settled.
    pub(crate) fn install_canceller(&self, canceller: Canceller) {
        let mut inner = self.inner.borrow_mut();
        if let State::Pending {
            canceller: slot, ..
        } = &mut inner.state
        {
            *slot = Some(canceller);
        }
    }

    pub(crate) fn downgrade(&self) -> WeakPromise<T, E> {
        WeakPromise {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Returns the current lifecycle stage.
    #[must_use]
    pub fn state(&self) -> PromiseState {
        match self.inner.borrow().state {
            State::Pending { .. } => PromiseState::Pending,
            State::Fulfilled(_) => PromiseState::Fulfilled,
            State::Rejected(_) => PromiseState::Rejected,
        }
    }

    /// Returns true while the promise has not settled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state() == PromiseState::Pending
    }

    /// Requests cancellation.
    ///
    /// If the promise is pending, its canceller (if any) runs exactly
    /// once; the canceller may settle the promise or decline to, in which
    /// case the promise stays pending. If the promise has already
    /// settled this is a no-op. Cancellation never forces a state
    /// transition by itself.
    pub fn cancel(&self) {
        let canceller = {
            let mut inner = self.inner.borrow_mut();
            match &mut inner.state {
                State::Pending { canceller, .. } => canceller.take(),
                _ => None,
            }
        };
        if let Some(cancel) = canceller {
            tracing::trace!("running canceller");
            cancel();
        }
    }

    /// Records that one derived consumer lost interest; cancels this
    /// promise once every consumer has.
    pub(crate) fn request_cancel(&self) {
        let all_consumers_gone = {
            let mut inner = self.inner.borrow_mut();
            match &mut inner.state {
                State::Pending {
                    consumers,
                    cancel_requests,
                    ..
                } => {
                    *cancel_requests += 1;
                    *cancel_requests >= *consumers
                }
                _ => false,
            }
        };
        if all_consumers_gone {
            self.cancel();
        }
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Creates an already-fulfilled promise.
    #[must_use]
    pub fn fulfilled(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                state: State::Fulfilled(value),
            })),
        }
    }

    /// Creates an already-rejected promise.
    #[must_use]
    pub fn rejected(reason: E) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                state: State::Rejected(reason),
            })),
        }
    }

    /// Returns a snapshot of the settlement, if any.
    #[must_use]
    pub fn settlement(&self) -> Option<Result<T, E>> {
        match &self.inner.borrow().state {
            State::Pending { .. } => None,
            State::Fulfilled(value) => Some(Ok(value.clone())),
            State::Rejected(reason) => Some(Err(reason.clone())),
        }
    }

    /// Settles the promise. Silent no-op if already settled.
    ///
    /// Reactions registered while pending are handed to the queue here,
    /// in registration order; the canceller is dropped unrun.
    pub(crate) fn settle(&self, outcome: Result<T, E>) {
        let (reactions, canceller) = {
            let mut inner = self.inner.borrow_mut();
            let next = match &outcome {
                Ok(value) => State::Fulfilled(value.clone()),
                Err(reason) => State::Rejected(reason.clone()),
            };
            let previous = std::mem::replace(&mut inner.state, next);
            match previous {
                State::Pending {
                    reactions,
                    canceller,
                    ..
                } => (reactions, canceller),
                settled => {
                    // One-way transition: restore and ignore the attempt.
                    inner.state = settled;
                    return;
                }
            }
        };
        drop(canceller);
        tracing::trace!(
            fulfilled = outcome.is_ok(),
            reactions = reactions.len(),
            "promise settled"
        );
        for reaction in reactions {
            let outcome = outcome.clone();
            queue::enqueue(move || reaction(outcome));
        }
    }

    /// Registers a reaction to run (via the queue) once the promise
    /// settles. If the promise has already settled, the reaction is
    /// queued immediately, preserving attachment order across calls.
    pub(crate) fn subscribe(&self, reaction: impl FnOnce(Result<T, E>) + 'static) {
        let outcome = {
            let mut inner = self.inner.borrow_mut();
            match &mut inner.state {
                State::Pending { reactions, .. } => {
                    reactions.push(Box::new(reaction));
                    return;
                }
                State::Fulfilled(value) => Ok(value.clone()),
                State::Rejected(reason) => Err(reason.clone()),
            }
        };
        queue::enqueue(move || reaction(outcome));
    }

    /// Settles this promise from an adoption union: an immediate value
    /// fulfills directly; an eventual value forwards whichever settlement
    /// its promise eventually reaches (unbounded flattening).
    pub(crate) fn settle_from(&self, input: Input<T, E>) {
        match input {
            Input::Immediate(value) => self.settle(Ok(value)),
            Input::Eventual(source) => {
                let target = self.clone();
                source.subscribe(move |outcome| target.settle(outcome));
            }
        }
    }

    /// Creates the derived promise for `then`/`catch`, wiring
    /// reference-counted cancellation interest back to this promise.
    fn derived<U>(&self) -> Promise<U, E>
    where
        U: Clone + 'static,
    {
        {
            let mut inner = self.inner.borrow_mut();
            if let State::Pending { consumers, .. } = &mut inner.state {
                *consumers += 1;
            }
        }
        let parent = self.downgrade();
        let child = Promise::pending();
        child.install_canceller(Box::new(move || {
            if let Some(parent) = parent.upgrade() {
                parent.request_cancel();
            }
        }));
        child
    }

    /// Chains a fulfillment handler, returning a derived promise.
    ///
    /// The handler may return a plain value or a promise; a returned
    /// promise is adopted, so the derived promise tracks its eventual
    /// state rather than treating it as a final value. A rejection of
    /// this promise bypasses the handler and rejects the derived promise
    /// with the same reason.
    ///
    /// Cancelling the derived promise cancels this one only once every
    /// derived consumer has requested cancellation.
    pub fn then<U, R, F>(&self, on_fulfilled: F) -> Promise<U, E>
    where
        U: Clone + 'static,
        R: Into<Input<U, E>>,
        F: FnOnce(T) -> R + 'static,
    {
        let derived = self.derived::<U>();
        let target = derived.clone();
        self.subscribe(move |outcome| match outcome {
            Ok(value) => target.settle_from(on_fulfilled(value).into()),
            Err(reason) => target.settle(Err(reason)),
        });
        derived
    }

    /// Chains a rejection handler, returning a derived promise.
    ///
    /// The handler may recover (return a value or promise that the
    /// derived promise adopts). A fulfillment of this promise bypasses
    /// the handler and fulfills the derived promise with the same value.
    pub fn catch<R, F>(&self, on_rejected: F) -> Promise<T, E>
    where
        R: Into<Input<T, E>>,
        F: FnOnce(E) -> R + 'static,
    {
        let derived = self.derived::<T>();
        let target = derived.clone();
        self.subscribe(move |outcome| match outcome {
            Ok(value) => target.settle(Ok(value)),
            Err(reason) => target.settle_from(on_rejected(reason).into()),
        });
        derived
    }
}

/// Adopts a plain value or promise into the uniform promise interface.
///
/// A promise argument is returned as-is (its eventual state is the
/// result); a plain value becomes an already-fulfilled promise.
pub fn resolve<T, E, I>(input: I) -> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
    I: Into<Input<T, E>>,
{
    match input.into() {
        Input::Immediate(value) => Promise::fulfilled(value),
        Input::Eventual(promise) => promise,
    }
}

/// Creates an already-rejected promise. No adoption is performed on the
/// reason.
pub fn reject<T, E>(reason: E) -> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    Promise::rejected(reason)
}
