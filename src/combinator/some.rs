//! Quota race: succeed once N of M inputs fulfill, fail once success
//! becomes provably unreachable.
//!
//! The race keeps dual bookkeeping — fulfillments and rejections, each
//! tagged with the original input index — guarded by a settled flag, so
//! exactly one settlement path runs no matter how the inputs interleave.

use super::{adopt_all, cancel_all};
use crate::error::{CompositeError, LengthError, QuotaError};
use crate::promise::{Input, Promise};
use std::cell::RefCell;
use std::rc::Rc;

/// Resolves with the first `how_many` values to fulfill, in ascending
/// original-index order.
///
/// Validation happens before any input is touched: a quota larger than
/// the input length rejects immediately with a [`LengthError`]; a quota
/// of zero resolves immediately with an empty collection.
///
/// Once the quota is reached, every other input promise still pending is
/// cancelled — work that can no longer affect the outcome is released.
/// Once enough inputs have rejected that the quota is unreachable, the
/// race rejects with a [`CompositeError`] carrying every rejection
/// keyed by original index; that path cancels nothing. Reactions
/// arriving after the race settled are ignored.
///
/// Cancelling the result before it settles requests cancellation of
/// every input that was a promise.
///
/// # Example
///
/// ```
/// use settle::{queue, some, Input, Promise, QuotaError};
///
/// let first_two: Promise<Vec<i32>, QuotaError<&'static str>> =
///     some([Input::Immediate(1), 2.into(), 3.into()], 2);
/// queue::run_until_idle();
/// assert_eq!(first_two.settlement(), Some(Ok(vec![1, 2])));
/// ```
pub fn some<T, E, I>(inputs: I, how_many: usize) -> Promise<Vec<T>, QuotaError<E>>
where
    T: Clone + 'static,
    E: Clone + 'static,
    I: IntoIterator,
    I::Item: Into<Input<T, E>>,
{
    let items: Vec<Input<T, E>> = inputs.into_iter().map(Into::into).collect();
    let total = items.len();
    if total < how_many {
        tracing::debug!(required = how_many, actual = total, "quota exceeds input length");
        return Promise::rejected(QuotaError::Length(LengthError::new(how_many, total)));
    }
    if how_many == 0 {
        return Promise::fulfilled(Vec::new());
    }

    let (elements, cancel_targets) = adopt_all(items);
    let cancel_targets = Rc::new(cancel_targets);
    let result = Promise::pending();
    {
        let targets = Rc::clone(&cancel_targets);
        result.install_canceller(Box::new(move || cancel_all(&targets)));
    }

    let tally = Rc::new(RefCell::new(Tally::new(total, how_many)));
    for (index, element) in elements.iter().enumerate() {
        let tally = Rc::clone(&tally);
        let target = result.clone();
        let targets = Rc::clone(&cancel_targets);
        element.subscribe(move |outcome| match outcome {
            Ok(value) => {
                let quota_reached = tally.borrow_mut().record_fulfilled(index, value);
                if let Some(values) = quota_reached {
                    tracing::debug!(quota = how_many, "quota reached, short-circuiting siblings");
                    target.settle(Ok(values));
                    cancel_all(&targets);
                }
            }
            Err(reason) => {
                let quota_unreachable = tally.borrow_mut().record_rejected(index, reason);
                if let Some(composite) = quota_unreachable {
                    tracing::debug!(
                        rejected = composite.len(),
                        quota = how_many,
                        "quota unreachable, rejecting"
                    );
                    // A rejection-triggered failure leaves sibling work
                    // running; only quota success short-circuits it.
                    target.settle(Err(QuotaError::Composite(composite)));
                }
            }
        });
    }
    result
}

/// Per-invocation bookkeeping for a quota race.
///
/// Single-writer by construction: only the reaction currently executing
/// mutates it, and nothing mutates it after settlement.
struct Tally<T, E> {
    total: usize,
    quota: usize,
    fulfilled: Vec<(usize, T)>,
    rejected: Vec<(usize, E)>,
    settled: bool,
}

impl<T, E> Tally<T, E> {
    fn new(total: usize, quota: usize) -> Self {
        Self {
            total,
            quota,
            fulfilled: Vec::new(),
            rejected: Vec::new(),
            settled: false,
        }
    }

    /// Records a fulfillment; returns the winning values, in ascending
    /// original-index order, when this one reaches the quota.
    fn record_fulfilled(&mut self, index: usize, value: T) -> Option<Vec<T>> {
        if self.settled {
            tracing::trace!(index, "fulfillment after settlement ignored");
            return None;
        }
        self.fulfilled.push((index, value));
        if self.fulfilled.len() < self.quota {
            return None;
        }
        self.settled = true;
        let mut winners = std::mem::take(&mut self.fulfilled);
        winners.sort_by_key(|(i, _)| *i);
        Some(winners.into_iter().map(|(_, value)| value).collect())
    }

    /// Records a rejection; returns the composite failure when the
    /// remaining inputs can no longer reach the quota.
    fn record_rejected(&mut self, index: usize, reason: E) -> Option<CompositeError<E>> {
        if self.settled {
            tracing::trace!(index, "rejection after settlement ignored");
            return None;
        }
        self.rejected.push((index, reason));
        if self.total - self.rejected.len() >= self.quota {
            return None;
        }
        self.settled = true;
        let reasons = std::mem::take(&mut self.rejected);
        Some(CompositeError::too_many_rejected(reasons))
    }
}
