mod common;
use crate::common::fakes::RecordingStatusSink;
use crate::common::{init_tracing, wait_until, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use sitewatch::engine::StatusReporter;
use sitewatch::watch::WatchList;

#[tokio::test]
async fn emits_immediately_then_periodically() {
    init_tracing();

    let list = WatchList::new();
    list.add("http://a.test/", "A changed");
    let sink = RecordingStatusSink::new();

    let reporter = StatusReporter::spawn(list.clone(), Duration::from_millis(10), sink.clone());
    wait_until("three listings", || sink.listings().len() >= 3).await;
    assert!(reporter.is_running());
    with_timeout(reporter.stop()).await;

    let listings = sink.listings();
    assert!(
        listings
            .iter()
            .all(|l| l.contains("http://a.test/: -, Custom alert: A changed"))
    );
}

#[tokio::test]
async fn listing_reflects_latest_watch_list() {
    init_tracing();

    let list = WatchList::new();
    let sink = RecordingStatusSink::new();

    let reporter = StatusReporter::spawn(list.clone(), Duration::from_millis(10), sink.clone());
    wait_until("first listing", || !sink.listings().is_empty()).await;
    assert!(sink.listings()[0].contains("(no websites are being monitored)"));

    list.add("http://b.test/", "B changed");
    wait_until("listing with b", || {
        sink.listings()
            .iter()
            .any(|l| l.contains("http://b.test/"))
    })
    .await;

    with_timeout(reporter.stop()).await;
}

#[tokio::test]
async fn stop_ends_emission() {
    init_tracing();

    let list = WatchList::new();
    let sink = RecordingStatusSink::new();
    let as_dyn: Arc<dyn sitewatch::engine::StatusSink> = sink.clone();

    let reporter = StatusReporter::spawn(list, Duration::from_secs(3600), as_dyn);
    wait_until("first listing", || sink.listings().len() == 1).await;
    with_timeout(reporter.stop()).await;

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(sink.listings().len(), 1);
}
