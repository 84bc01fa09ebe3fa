//! Settle: single-threaded promises with cooperative dispatch and
//! cancel-correct coordination combinators.
//!
//! # Overview
//!
//! Settle is a promise library built on the principle that settlement is
//! a one-way door. A promise moves from pending to fulfilled or rejected
//! exactly once; a second settlement attempt is a silent no-op. Every
//! reaction runs from a shared FIFO job queue, never inline from the call
//! that settled the promise, so observers always see consistent ordering
//! no matter when they attached.
//!
//! # Core Guarantees
//!
//! - **At-most-once settlement**: The first settlement wins; later attempts are ignored
//! - **Queued dispatch**: Reactions never run inside `settle`; they run when the queue drains
//! - **Registration order**: Reactions on one promise fire in the order they attached
//! - **Unbounded adoption**: A handler returning a promise chains it, to any depth
//! - **Interest-counted cancellation**: A parent cancels only when every derived consumer asked
//! - **Short-circuit release**: Combinators cancel inputs that can no longer affect the outcome
//!
//! # Module Structure
//!
//! - [`promise`]: The promise state machine, [`Deferred`], and adoption via [`Input`]
//! - [`queue`]: The thread-local FIFO job queue that runs every reaction
//! - [`combinator`]: Coordination over collections (`fold`/`reduce`, `some`, `all`, `any`, `race`, `map`)
//! - [`error`](mod@error): Aggregate failure types with contractual messages
//!
//! # Example
//!
//! ```
//! use settle::{queue, some, Deferred, Input, Promise, QuotaError};
//!
//! let slow: Deferred<i32, &str> = Deferred::new();
//! let first_two = some([Input::Eventual(slow.promise()), 1.into(), 2.into()], 2);
//! queue::run_until_idle();
//!
//! // The quota was met without the pending input, which got cancelled.
//! assert_eq!(first_two.settlement(), Some(Ok(vec![1, 2])));
//! let _: &Promise<Vec<i32>, QuotaError<&str>> = &first_two;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod combinator;
pub mod error;
pub mod promise;
pub mod queue;
#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

pub use combinator::{all, any, fold, map, race, reduce, some};
pub use error::{CompositeError, LengthError, QuotaError};
pub use promise::{Deferred, Input, Promise, PromiseState, reject, resolve};
