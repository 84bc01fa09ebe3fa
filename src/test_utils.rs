//! Shared helpers for unit and integration tests.
//!
//! This module provides:
//! - Consistent tracing-based logging initialization
//! - Phase/section macros for readable test output
//! - Settlement probes for observing promise outcomes
//! - Cancellation probes for counting canceller invocations
//!
//! # Example
//! ```
//! use settle::test_utils::{init_test_logging, Probe};
//! use settle::{queue, Promise};
//!
//! init_test_logging();
//! let promise: Promise<i32, &str> = Promise::fulfilled(42);
//! let probe = Probe::attach(&promise);
//! queue::run_until_idle();
//! assert_eq!(probe.value(), Some(42));
//! ```

use crate::promise::{Deferred, Promise};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Once;
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
///
/// The first call wins; later calls are no-ops.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .try_init();
    });
}

/// Records every settlement delivered to a promise.
///
/// A settled promise delivers exactly once, so `settlements() > 1` is
/// itself a failure worth asserting on.
pub struct Probe<T, E> {
    outcome: Rc<RefCell<Option<Result<T, E>>>>,
    settlements: Rc<Cell<usize>>,
}

impl<T, E> Probe<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Subscribes to `promise` and records what it delivers.
    #[must_use]
    pub fn attach(promise: &Promise<T, E>) -> Self {
        let outcome = Rc::new(RefCell::new(None));
        let settlements = Rc::new(Cell::new(0));
        {
            let outcome = Rc::clone(&outcome);
            let settlements = Rc::clone(&settlements);
            promise.subscribe(move |delivered| {
                settlements.set(settlements.get() + 1);
                *outcome.borrow_mut() = Some(delivered);
            });
        }
        Self {
            outcome,
            settlements,
        }
    }

    /// How many settlements have been delivered so far.
    #[must_use]
    pub fn settlements(&self) -> usize {
        self.settlements.get()
    }

    /// Whether any settlement has been delivered.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settlements.get() > 0
    }

    /// The delivered value, if the settlement was a fulfillment.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        match &*self.outcome.borrow() {
            Some(Ok(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// The delivered reason, if the settlement was a rejection.
    #[must_use]
    pub fn reason(&self) -> Option<E> {
        match &*self.outcome.borrow() {
            Some(Err(reason)) => Some(reason.clone()),
            _ => None,
        }
    }
}

/// Counts how many times a canceller fires.
#[derive(Clone, Default)]
pub struct CancelProbe {
    count: Rc<Cell<usize>>,
}

impl CancelProbe {
    /// Creates a probe with a zero count.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A canceller suitable for [`Deferred::with_canceller`] that bumps
    /// this probe's count.
    #[must_use]
    pub fn canceller<T, E>(&self) -> impl FnOnce(&Deferred<T, E>) + 'static
    where
        T: Clone + 'static,
        E: Clone + 'static,
    {
        let count = Rc::clone(&self.count);
        move |_deferred| count.set(count.get() + 1)
    }

    /// How many times the canceller has fired.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// Whether the canceller fired at least once.
    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.count.get() > 0
    }
}

/// A pending promise paired with a probe counting cancellations of it.
#[must_use]
pub fn cancellable_pending<T, E>() -> (Promise<T, E>, CancelProbe)
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    let probe = CancelProbe::new();
    let promise = Promise::pending();
    {
        let count = Rc::clone(&probe.count);
        promise.install_canceller(Box::new(move || count.set(count.get() + 1)));
    }
    (promise, probe)
}

/// Log a test phase with a visible separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log a section within a test phase.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        tracing::debug!(section = %$name, "--- {} ---", $name);
    };
}

/// Log test completion with summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info!(
            test = %$name,
            $($key = %$value,)*
            "test completed successfully: {}",
            $name
        );
    };
}

/// Log before assertions for context.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            "Asserting: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}
