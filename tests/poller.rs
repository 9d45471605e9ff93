mod common;
use crate::common::builders::poll_context;
use crate::common::fakes::{FakeFetcher, RecordingAlertSink};
use crate::common::{init_tracing, wait_until, with_timeout};

use std::time::Duration;

use sitewatch::engine::Poller;
use sitewatch::types::{Fingerprint, PollerState};
use sitewatch::watch::WatchList;

const A: &str = "http://a.test/";
const B: &str = "http://b.test/";

#[tokio::test]
async fn start_runs_first_cycle_immediately() {
    init_tracing();

    let list = WatchList::new();
    list.add(A, "a");
    let fetcher = FakeFetcher::new();
    fetcher.respond(A, "a1");
    let sink = RecordingAlertSink::new();
    // Long interval: only the immediate cycle can run within the test.
    let mut poller = Poller::new(poll_context(&list, &fetcher, &sink, Duration::from_secs(3600)));

    assert_eq!(poller.state(), PollerState::Idle);
    assert!(poller.start());
    assert_eq!(poller.state(), PollerState::Running);

    wait_until("first cycle", || poller.cycles_completed() == 1).await;
    assert_eq!(fetcher.call_count(A), 1);

    assert!(with_timeout(poller.stop()).await);
    assert_eq!(poller.state(), PollerState::Idle);
}

#[tokio::test]
async fn start_while_running_is_a_no_op() {
    init_tracing();

    let list = WatchList::new();
    let fetcher = FakeFetcher::new();
    let sink = RecordingAlertSink::new();
    let mut poller = Poller::new(poll_context(&list, &fetcher, &sink, Duration::from_secs(3600)));

    assert!(poller.start());
    assert!(!poller.start());
    assert!(poller.is_running());

    with_timeout(poller.stop()).await;
}

#[tokio::test]
async fn stop_while_idle_reports_false() {
    init_tracing();

    let list = WatchList::new();
    let fetcher = FakeFetcher::new();
    let sink = RecordingAlertSink::new();
    let mut poller = Poller::new(poll_context(&list, &fetcher, &sink, Duration::from_secs(1)));

    assert!(!with_timeout(poller.stop()).await);
    assert_eq!(poller.state(), PollerState::Idle);
}

#[tokio::test]
async fn repeats_cycles_on_interval_and_alerts_on_change() {
    init_tracing();

    let list = WatchList::new();
    list.add(A, "A changed");
    let fetcher = FakeFetcher::new();
    fetcher.respond(A, "one");
    fetcher.respond(A, "two");
    let sink = RecordingAlertSink::new();
    let mut poller = Poller::new(poll_context(&list, &fetcher, &sink, Duration::from_millis(10)));

    poller.start();
    wait_until("alert delivered", || !sink.delivered().is_empty()).await;
    with_timeout(poller.stop()).await;

    assert!(poller.cycles_completed() >= 2);
    // Content stays at "two" after the change, so only one alert.
    assert_eq!(sink.delivered(), vec!["A changed".to_string()]);
    let snap = list.snapshot();
    assert_eq!(
        snap.get(A).and_then(|t| t.fingerprint.clone()),
        Some(Fingerprint::of_content("two"))
    );
}

#[tokio::test]
async fn stop_waits_for_in_flight_fetch() {
    init_tracing();

    let list = WatchList::new();
    list.add(A, "a");
    list.add(B, "b");
    let fetcher = FakeFetcher::new();
    fetcher.respond(A, "a1");
    fetcher.respond(B, "b1");
    let hold = fetcher.hold(A);
    let sink = RecordingAlertSink::new();
    let mut poller = Poller::new(poll_context(&list, &fetcher, &sink, Duration::from_secs(3600)));

    poller.start();
    with_timeout(hold.entered()).await;

    // Release the parked fetch shortly after stop has been requested.
    let releaser = tokio::spawn({
        let hold = hold.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            hold.release();
        }
    });

    assert!(with_timeout(poller.stop()).await);
    releaser.await.expect("releaser task");

    assert_eq!(poller.state(), PollerState::Idle);
    // The in-flight fetch finished and was stored; B was never polled.
    assert!(list.snapshot().get(A).and_then(|t| t.fingerprint.clone()).is_some());
    assert_eq!(fetcher.call_count(B), 0);
    assert_eq!(poller.cycles_completed(), 0);
}

#[tokio::test]
async fn restart_after_stop_runs_a_fresh_full_cycle() {
    init_tracing();

    let list = WatchList::new();
    list.add(A, "a");
    list.add(B, "b");
    let fetcher = FakeFetcher::new();
    fetcher.respond(A, "a1");
    fetcher.respond(B, "b1");
    let sink = RecordingAlertSink::new();
    let mut poller = Poller::new(poll_context(&list, &fetcher, &sink, Duration::from_secs(3600)));

    poller.start();
    wait_until("first cycle", || poller.cycles_completed() == 1).await;
    with_timeout(poller.stop()).await;

    // A stale cancellation must not leak into the new run.
    assert!(poller.start());
    wait_until("second cycle", || poller.cycles_completed() == 2).await;
    with_timeout(poller.stop()).await;

    assert_eq!(fetcher.call_count(A), 2);
    assert_eq!(fetcher.call_count(B), 2);
    assert!(sink.attempts().is_empty());
}
