//! Conjunction over a collection of inputs.

use super::some::some;
use crate::error::QuotaError;
use crate::promise::{Input, Promise};

/// Resolves with every input's value, in input order, once all of them
/// fulfill.
///
/// A conjunction is a quota race where the quota is the whole
/// collection: the first rejection makes the quota unreachable, so the
/// result rejects with a [`QuotaError::Composite`] carrying that
/// rejection. An empty collection resolves with an empty `Vec`.
///
/// # Example
///
/// ```
/// use settle::{all, queue, Promise, QuotaError};
///
/// let everything: Promise<Vec<i32>, QuotaError<&'static str>> = all([1, 2, 3]);
/// queue::run_until_idle();
/// assert_eq!(everything.settlement(), Some(Ok(vec![1, 2, 3])));
/// ```
pub fn all<T, E, I>(inputs: I) -> Promise<Vec<T>, QuotaError<E>>
where
    T: Clone + 'static,
    E: Clone + 'static,
    I: IntoIterator,
    I::Item: Into<Input<T, E>>,
{
    let items: Vec<Input<T, E>> = inputs.into_iter().map(Into::into).collect();
    let quota = items.len();
    some(items, quota)
}
