mod common;
use crate::common::builders::poll_context;
use crate::common::fakes::{FakeFetcher, RecordingAlertSink, RecordingStatusSink};
use crate::common::{init_tracing, wait_until, with_timeout};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use sitewatch::controller::Controller;
use sitewatch::engine::{Poller, StatusReporter};
use sitewatch::errors::SitewatchError;
use sitewatch::types::PollerState;
use sitewatch::watch::WatchList;

type TestResult = Result<(), Box<dyn Error>>;

struct Harness {
    controller: Controller,
    fetcher: Arc<FakeFetcher>,
}

fn harness() -> Harness {
    let list = WatchList::new();
    let fetcher = FakeFetcher::new();
    let sink = RecordingAlertSink::new();
    let poller = Poller::new(poll_context(&list, &fetcher, &sink, Duration::from_secs(3600)));
    Harness {
        controller: Controller::new(list, poller, None),
        fetcher,
    }
}

#[tokio::test]
async fn add_reports_added_then_replaced() -> TestResult {
    init_tracing();
    let h = harness();

    let reply = h.controller.add("http://a.test/", "A changed")?;
    assert_eq!(reply, "http://a.test/ added with custom alert: A changed");

    let reply = h.controller.add("  http://a.test/  ", "A again")?;
    assert_eq!(reply, "http://a.test/ replaced with custom alert: A again");
    assert_eq!(h.controller.watchlist().len(), 1);
    Ok(())
}

#[tokio::test]
async fn add_rejects_bad_urls_without_touching_state() {
    init_tracing();
    let h = harness();

    for bad in ["", "   ", "not a url", "ftp://files.test/"] {
        match h.controller.add(bad, "msg") {
            Err(SitewatchError::InvalidUrl(_)) => {}
            other => panic!("expected InvalidUrl for {bad:?}, got {other:?}"),
        }
    }
    assert!(h.controller.watchlist().is_empty());
}

#[tokio::test]
async fn remove_unknown_url_is_not_found() -> TestResult {
    init_tracing();
    let h = harness();
    h.controller.add("http://a.test/", "A")?;

    let err = h.controller.remove("http://b.test/").unwrap_err();
    assert_eq!(
        err.to_string(),
        "http://b.test/ not found in the list of monitored websites"
    );

    assert_eq!(h.controller.remove("http://a.test/")?, "http://a.test/ removed.");
    assert!(h.controller.watchlist().is_empty());
    Ok(())
}

#[tokio::test]
async fn start_stop_replies_follow_poller_state() -> TestResult {
    init_tracing();
    let mut h = harness();
    h.controller.add("http://a.test/", "A")?;
    h.fetcher.respond("http://a.test/", "a1");

    assert!(h.controller.status().ends_with("Monitoring is stopped."));
    assert_eq!(with_timeout(h.controller.stop()).await?, "Monitoring is not running.");

    assert_eq!(h.controller.start()?, "Monitoring started.");
    assert_eq!(h.controller.start()?, "Monitoring is already running.");
    assert_eq!(h.controller.poller_state(), PollerState::Running);

    wait_until("first cycle", || h.controller.poller().cycles_completed() == 1).await;
    let status = h.controller.status();
    assert!(status.contains("Current status of monitored websites:"));
    assert!(status.ends_with("Monitoring is running (1 cycles completed)."));

    assert_eq!(with_timeout(h.controller.stop()).await?, "Monitoring stopped.");
    assert_eq!(h.controller.poller_state(), PollerState::Idle);
    Ok(())
}

#[tokio::test]
async fn quit_stops_poller_and_reporter() -> TestResult {
    init_tracing();

    let list = WatchList::new();
    list.add("http://a.test/", "A");
    let fetcher = FakeFetcher::new();
    fetcher.respond("http://a.test/", "a1");
    let sink = RecordingAlertSink::new();
    let status = RecordingStatusSink::new();

    let mut poller = Poller::new(poll_context(&list, &fetcher, &sink, Duration::from_millis(10)));
    poller.start();
    let reporter = StatusReporter::spawn(list.clone(), Duration::from_millis(10), status.clone());
    let controller = Controller::new(list, poller, Some(reporter));

    wait_until("some polling", || fetcher.call_count("http://a.test/") >= 2).await;
    with_timeout(controller.quit()).await;

    let calls = fetcher.call_count("http://a.test/");
    let listings = status.listings().len();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(fetcher.call_count("http://a.test/"), calls);
    assert_eq!(status.listings().len(), listings);
    Ok(())
}
