//! First settlement wins, fulfillment or rejection alike.

use super::{adopt_all, cancel_all};
use crate::promise::{Input, Promise};
use std::cell::Cell;
use std::rc::Rc;

/// Settles exactly like the first input to settle.
///
/// Unlike [`any`](super::any::any), a rejection can win: whichever input
/// settles first hands its outcome to the result verbatim, and every
/// other input still pending is cancelled. An empty collection yields a
/// promise that never settles.
///
/// Cancelling the result before it settles requests cancellation of
/// every input that was a promise.
pub fn race<T, E, I>(inputs: I) -> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
    I: IntoIterator,
    I::Item: Into<Input<T, E>>,
{
    let (elements, cancel_targets) = adopt_all(inputs.into_iter().map(Into::into));
    let cancel_targets = Rc::new(cancel_targets);
    let result = Promise::pending();
    {
        let targets = Rc::clone(&cancel_targets);
        result.install_canceller(Box::new(move || cancel_all(&targets)));
    }

    let won = Rc::new(Cell::new(false));
    for element in &elements {
        let won = Rc::clone(&won);
        let target = result.clone();
        let targets = Rc::clone(&cancel_targets);
        element.subscribe(move |outcome| {
            if won.replace(true) {
                return;
            }
            let polarity = if outcome.is_ok() { "fulfillment" } else { "rejection" };
            tracing::debug!(winner = polarity, "race decided, releasing losers");
            target.settle(outcome);
            cancel_all(&targets);
        });
    }
    result
}
