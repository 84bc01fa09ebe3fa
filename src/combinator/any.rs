//! First fulfillment wins.

use super::some::some;
use crate::error::QuotaError;
use crate::promise::{Input, Promise};

/// Resolves with the value of the first input to fulfill.
///
/// This is a quota race with a quota of one: as soon as any input
/// fulfills, the result fulfills with that value and every other input
/// still pending is cancelled. If every input rejects, the result
/// rejects with a [`QuotaError::Composite`] carrying all the rejections.
/// An empty collection rejects with a [`QuotaError::Length`], since a
/// quota of one can never be met.
pub fn any<T, E, I>(inputs: I) -> Promise<T, QuotaError<E>>
where
    T: Clone + 'static,
    E: Clone + 'static,
    I: IntoIterator,
    I::Item: Into<Input<T, E>>,
{
    some(inputs, 1).then(|mut values: Vec<T>| match values.pop() {
        Some(value) => value,
        None => unreachable!("a quota of one settled without a value"),
    })
}
