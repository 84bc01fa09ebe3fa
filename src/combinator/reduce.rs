//! Sequential indexed fold over mixed values and promises.
//!
//! The fold is strictly sequential in input-index order: the reducer for
//! index `i` never runs before the reducer for index `i - 1` has
//! completed, no matter which underlying inputs settle first. A
//! rejection at any step — from the input itself or from the reducer —
//! becomes the rejection of the final result, and no further reducer
//! calls occur.

use super::{adopt_all, cancel_all};
use crate::promise::{Input, Promise, WeakPromise, resolve};
use std::cell::RefCell;
use std::rc::Rc;

/// Folds `inputs` left-to-right onto the supplied seed.
///
/// Each element may be a plain value or a promise of one, as may the
/// seed and each reducer return. The reducer receives the accumulator,
/// the element value, and the element's original index, and runs once
/// per element in ascending index order.
///
/// Cancelling the result requests cancellation of every input that was a
/// promise, exactly once each; plain values are skipped.
pub fn fold<T, U, E, I, S, R, F>(inputs: I, reducer: F, initial: S) -> Promise<U, E>
where
    T: Clone + 'static,
    U: Clone + 'static,
    E: Clone + 'static,
    I: IntoIterator,
    I::Item: Into<Input<T, E>>,
    S: Into<Input<U, E>>,
    R: Into<Input<U, E>>,
    F: FnMut(U, T, usize) -> R + 'static,
{
    let (elements, cancel_targets) = adopt_all(inputs);
    run_fold(elements, cancel_targets, reducer, resolve(initial), 0)
}

/// Folds `inputs` left-to-right, seeding from the first element.
///
/// The first element becomes the accumulator without a reducer call; the
/// reducer then runs for indices `1..n`. An empty input resolves to
/// `None` — deliberately a success, not an error — mirroring folds that
/// treat "nothing to fold" as the absence of a value.
pub fn reduce<T, E, I, R, F>(inputs: I, reducer: F) -> Promise<Option<T>, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
    I: IntoIterator,
    I::Item: Into<Input<T, E>>,
    R: Into<Input<T, E>>,
    F: FnMut(T, T, usize) -> R + 'static,
{
    let (mut elements, cancel_targets) = adopt_all(inputs);
    if elements.is_empty() {
        tracing::debug!("seedless fold over empty input resolves to the no-value placeholder");
        return Promise::fulfilled(None);
    }
    let seed = elements.remove(0);
    run_fold(elements, cancel_targets, reducer, seed, 1).then(Some)
}

fn run_fold<T, U, E, R, F>(
    elements: Vec<Promise<T, E>>,
    cancel_targets: Vec<WeakPromise<T, E>>,
    reducer: F,
    seed: Promise<U, E>,
    first_index: usize,
) -> Promise<U, E>
where
    T: Clone + 'static,
    U: Clone + 'static,
    E: Clone + 'static,
    R: Into<Input<U, E>>,
    F: FnMut(U, T, usize) -> R + 'static,
{
    tracing::debug!(steps = elements.len(), first_index, "starting sequential fold");
    let result = Promise::pending();
    result.install_canceller(Box::new(move || cancel_all(&cancel_targets)));

    // Each step gates on the previous accumulator before it even looks
    // at its own input, which pins reducer calls to ascending index
    // order regardless of settlement timing.
    let reducer = Rc::new(RefCell::new(reducer));
    let mut acc = seed;
    for (offset, element) in elements.into_iter().enumerate() {
        let index = first_index + offset;
        let reducer = Rc::clone(&reducer);
        acc = acc.then(move |acc_value| {
            Input::Eventual(
                element.then(move |value| (&mut *reducer.borrow_mut())(acc_value, value, index)),
            )
        });
    }

    let target = result.clone();
    acc.subscribe(move |outcome| target.settle(outcome));
    result
}
