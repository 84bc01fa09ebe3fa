//! Coordination combinators over collections of values and promises.
//!
//! This module provides the core combinators:
//!
//! - [`fold`] / [`reduce`]: ordered, strictly sequential fold over mixed
//!   values/promises
//! - [`some`]: quota race — succeed once N of M inputs fulfill, fail once
//!   that becomes provably unreachable
//! - [`all`]: every input must fulfill (`some` with quota = length)
//! - [`any`]: first fulfillment wins (`some` with quota = 1)
//! - [`race`]: first settlement, either way, wins verbatim
//! - [`map`]: concurrent element-wise map preserving input order
//!
//! Every combinator normalizes its inputs through adoption
//! ([`Input`](crate::promise::Input)), never assumes anything about the
//! settlement order of independent inputs, and wires cancellation of its
//! result directly to the original promise inputs (plain values are
//! skipped).

pub mod all;
pub mod any;
pub mod map;
pub mod race;
pub mod reduce;
pub mod some;

pub use all::all;
pub use any::any;
pub use map::map;
pub use race::race;
pub use reduce::{fold, reduce};
pub use some::some;

use crate::promise::{Input, Promise, WeakPromise};

/// Normalizes every element through adoption.
///
/// Returns the adopted promises in input order plus weak handles to the
/// subset of inputs that were already promises — the only ones a
/// combinator's cancellation fans out to. The handles are weak so that
/// the cancel wiring of an aggregate that never settles does not keep
/// its inputs alive through a reference cycle.
pub(crate) fn adopt_all<T, E, I>(inputs: I) -> (Vec<Promise<T, E>>, Vec<WeakPromise<T, E>>)
where
    T: Clone + 'static,
    E: Clone + 'static,
    I: IntoIterator,
    I::Item: Into<Input<T, E>>,
{
    let mut elements = Vec::new();
    let mut cancel_targets = Vec::new();
    for item in inputs {
        match item.into() {
            Input::Immediate(value) => elements.push(Promise::fulfilled(value)),
            Input::Eventual(promise) => {
                cancel_targets.push(promise.downgrade());
                elements.push(promise);
            }
        }
    }
    (elements, cancel_targets)
}

/// Requests cancellation of every still-live promise in the slice.
///
/// Best-effort fan-out: settled promises ignore the request, promises
/// with no remaining handles are skipped, and nothing waits for a
/// canceller to take effect.
pub(crate) fn cancel_all<T, E>(promises: &[WeakPromise<T, E>]) {
    for promise in promises {
        if let Some(promise) = promise.upgrade() {
            promise.cancel();
        }
    }
}
