//! Concurrent element-wise map preserving input order.

use super::{adopt_all, cancel_all};
use crate::promise::{Input, Promise};
use std::cell::RefCell;
use std::rc::Rc;

/// Applies `mapper` to every input value and resolves with the mapped
/// values in input order.
///
/// Elements settle concurrently; nothing waits for an earlier index
/// before mapping a later one. The mapper receives the value and its
/// original index and may return a plain value or a promise of one; a
/// returned promise is adopted, and the slot holds its eventual value.
/// The first rejection, from an input or from an adopted mapper result,
/// rejects the result verbatim and later outcomes are ignored; inputs
/// still pending are left running. Cancelling the result before it
/// settles requests cancellation of every input that was a promise.
pub fn map<T, U, E, I, R, F>(inputs: I, mapper: F) -> Promise<Vec<U>, E>
where
    T: Clone + 'static,
    U: Clone + 'static,
    E: Clone + 'static,
    I: IntoIterator,
    I::Item: Into<Input<T, E>>,
    R: Into<Input<U, E>>,
    F: FnMut(T, usize) -> R + 'static,
{
    let (elements, cancel_targets) = adopt_all(inputs.into_iter().map(Into::into));
    if elements.is_empty() {
        return Promise::fulfilled(Vec::new());
    }

    let result = Promise::pending();
    result.install_canceller(Box::new(move || cancel_all(&cancel_targets)));

    let state = Rc::new(RefCell::new(MapState {
        slots: vec![None; elements.len()],
        remaining: elements.len(),
        settled: false,
    }));
    let mapper = Rc::new(RefCell::new(mapper));
    for (index, element) in elements.iter().enumerate() {
        let state = Rc::clone(&state);
        let mapper = Rc::clone(&mapper);
        let target = result.clone();
        let mapped = element.then(move |value| (&mut *mapper.borrow_mut())(value, index));
        mapped.subscribe(move |outcome| {
            let mut state = state.borrow_mut();
            if state.settled {
                return;
            }
            match outcome {
                Ok(value) => {
                    state.slots[index] = Some(value);
                    state.remaining -= 1;
                    if state.remaining == 0 {
                        state.settled = true;
                        let slots = std::mem::take(&mut state.slots);
                        drop(state);
                        target.settle(Ok(slots.into_iter().flatten().collect()));
                    }
                }
                Err(reason) => {
                    state.settled = true;
                    drop(state);
                    target.settle(Err(reason));
                }
            }
        });
    }
    result
}

struct MapState<U> {
    slots: Vec<Option<U>>,
    remaining: usize,
    settled: bool,
}
