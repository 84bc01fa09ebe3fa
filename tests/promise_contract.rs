//! Integration coverage for the core promise contract: at-most-once
//! settlement, queued dispatch, adoption, and interest-counted
//! cancellation.

use settle::test_utils::{init_test_logging, CancelProbe, Probe};
use settle::{queue, reject, resolve, Deferred, PromiseState};
use settle::{assert_with_log, test_complete, test_phase, test_section};

type TestErr = &'static str;

fn init_test(name: &str) {
    init_test_logging();
    test_phase!(name);
}

#[test]
fn the_first_settlement_wins() {
    init_test("the_first_settlement_wins");
    let deferred: Deferred<i32, TestErr> = Deferred::new();
    let observer = Probe::attach(&deferred.promise());

    deferred.resolve(1);
    deferred.resolve(2);
    deferred.reject("too late");
    queue::run_until_idle();

    assert_with_log!(
        observer.value() == Some(1),
        "later settlement attempts are no-ops",
        Some(1),
        observer.value()
    );
    assert_eq!(observer.settlements(), 1);
    test_complete!("the_first_settlement_wins");
}

#[test]
fn reactions_never_run_inline() {
    init_test("reactions_never_run_inline");
    let deferred: Deferred<i32, TestErr> = Deferred::new();
    let observer = Probe::attach(&deferred.promise());

    deferred.resolve(5);
    assert!(!observer.is_settled(), "delivery waits for the queue");
    queue::run_until_idle();
    assert_eq!(observer.value(), Some(5));
    test_complete!("reactions_never_run_inline");
}

#[test]
fn reactions_fire_in_attachment_order() {
    init_test("reactions_fire_in_attachment_order");
    use std::cell::RefCell;
    use std::rc::Rc;

    let deferred: Deferred<&'static str, TestErr> = Deferred::new();
    let seen: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    for label in ["first", "second", "third"] {
        let seen = Rc::clone(&seen);
        let _ = deferred
            .promise()
            .then(move |_| {
                seen.borrow_mut().push(label);
                label
            });
    }
    deferred.resolve("go");
    queue::run_until_idle();
    assert_eq!(*seen.borrow(), vec!["first", "second", "third"]);
    test_complete!("reactions_fire_in_attachment_order");
}

#[test]
fn a_handler_returning_a_promise_is_adopted() {
    init_test("a_handler_returning_a_promise_is_adopted");
    let inner: Deferred<i32, TestErr> = Deferred::new();
    let chained = resolve::<i32, TestErr, _>(1).then({
        let inner = inner.promise();
        move |base| inner.then(move |extra| base + extra)
    });
    queue::run_until_idle();
    assert!(chained.is_pending(), "adoption waits for the inner promise");

    test_section!("inner settles");
    inner.resolve(41);
    queue::run_until_idle();
    assert_eq!(chained.settlement(), Some(Ok(42)));
    test_complete!("a_handler_returning_a_promise_is_adopted");
}

#[test]
fn rejections_bypass_then_and_reach_catch() {
    init_test("rejections_bypass_then_and_reach_catch");
    let recovered = reject::<i32, TestErr>("boom")
        .then(|value| -> i32 {
            panic!("fulfillment handler must not run, got {value}");
        })
        .catch(|reason| {
            assert_eq!(reason, "boom");
            7
        });
    queue::run_until_idle();
    assert_eq!(recovered.settlement(), Some(Ok(7)));
    test_complete!("rejections_bypass_then_and_reach_catch");
}

#[test]
fn catch_passes_fulfillments_through_untouched() {
    init_test("catch_passes_fulfillments_through_untouched");
    let passed = resolve::<i32, TestErr, _>(3).catch(|_| -> i32 {
        panic!("rejection handler must not run");
    });
    queue::run_until_idle();
    assert_eq!(passed.settlement(), Some(Ok(3)));
    test_complete!("catch_passes_fulfillments_through_untouched");
}

#[test]
fn the_canceller_fires_at_most_once() {
    init_test("the_canceller_fires_at_most_once");
    let probe = CancelProbe::new();
    let deferred: Deferred<i32, TestErr> = Deferred::with_canceller(probe.canceller());
    let promise = deferred.promise();

    promise.cancel();
    promise.cancel();
    assert_eq!(probe.count(), 1);
    test_complete!("the_canceller_fires_at_most_once");
}

#[test]
fn cancelling_a_settled_promise_is_a_no_op() {
    init_test("cancelling_a_settled_promise_is_a_no_op");
    let probe = CancelProbe::new();
    let deferred: Deferred<i32, TestErr> = Deferred::with_canceller(probe.canceller());
    deferred.resolve(1);
    deferred.promise().cancel();
    assert_eq!(probe.count(), 0);
    assert_eq!(deferred.promise().settlement(), Some(Ok(1)));
    test_complete!("cancelling_a_settled_promise_is_a_no_op");
}

#[test]
fn a_parent_cancels_only_when_every_consumer_asked() {
    init_test("a_parent_cancels_only_when_every_consumer_asked");
    let probe = CancelProbe::new();
    let parent: Deferred<i32, TestErr> = Deferred::with_canceller(probe.canceller());
    let first_child = parent.promise().then(|value| value + 1);
    let second_child = parent.promise().then(|value| value + 2);

    test_section!("one of two consumers loses interest");
    first_child.cancel();
    assert_eq!(probe.count(), 0, "one remaining consumer keeps it alive");

    test_section!("the last consumer loses interest");
    second_child.cancel();
    assert_eq!(probe.count(), 1);
    test_complete!("a_parent_cancels_only_when_every_consumer_asked");
}

#[test]
fn a_cancelled_canceller_can_still_reject() {
    init_test("a_cancelled_canceller_can_still_reject");
    let deferred: Deferred<i32, TestErr> =
        Deferred::with_canceller(|d| d.reject("cancelled"));
    let observer = Probe::attach(&deferred.promise());
    deferred.promise().cancel();
    queue::run_until_idle();
    assert_eq!(observer.reason(), Some("cancelled"));
    test_complete!("a_cancelled_canceller_can_still_reject");
}

#[test]
fn deferred_resolve_adopts_a_promise() {
    init_test("deferred_resolve_adopts_a_promise");
    let outer: Deferred<i32, TestErr> = Deferred::new();
    let inner: Deferred<i32, TestErr> = Deferred::new();
    outer.resolve(inner.promise());
    queue::run_until_idle();
    assert!(outer.promise().is_pending());

    inner.resolve(11);
    queue::run_until_idle();
    assert_eq!(outer.promise().settlement(), Some(Ok(11)));
    test_complete!("deferred_resolve_adopts_a_promise");
}

#[test]
fn state_reports_the_lifecycle() {
    init_test("state_reports_the_lifecycle");
    let deferred: Deferred<i32, TestErr> = Deferred::new();
    assert_eq!(deferred.promise().state(), PromiseState::Pending);
    deferred.resolve(1);
    assert_eq!(deferred.promise().state(), PromiseState::Fulfilled);
    assert_eq!(deferred.promise().state().to_string(), "fulfilled");

    let failed = reject::<i32, TestErr>("no");
    assert_eq!(failed.state(), PromiseState::Rejected);
    test_complete!("state_reports_the_lifecycle");
}
