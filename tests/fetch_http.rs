use std::time::Duration;

use sitewatch::fetch::{
    FailureKind, FetchSettings, Fetcher, ReqwestFetcher, normalize_body, normalize_html,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(server: &MockServer, route: &str, body: &str, content_type: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), content_type))
        .mount(server)
        .await;
}

fn fetcher() -> ReqwestFetcher {
    ReqwestFetcher::new(FetchSettings::default()).expect("client builds")
}

#[tokio::test]
async fn formatting_only_differences_share_a_fingerprint() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/compact",
        "<html><body><h1>Hello</h1><p class=\"a b\" id=\"x\">World</p></body></html>",
        "text/html; charset=utf-8",
    )
    .await;
    serve(
        &server,
        "/pretty",
        "<html>\n  <body>\n    <h1>  Hello </h1>\n    <p id=\"x\" class=\"a   b\">\n      World\n    </p>\n  </body>\n</html>\n",
        "text/html",
    )
    .await;

    let fetcher = fetcher();
    let compact = fetcher
        .fetch(&format!("{}/compact", server.uri()))
        .await
        .expect("fetch ok");
    let pretty = fetcher
        .fetch(&format!("{}/pretty", server.uri()))
        .await
        .expect("fetch ok");

    assert_eq!(compact, pretty);
}

#[tokio::test]
async fn scripts_and_nonces_do_not_affect_fingerprint() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/one",
        "<body><script nonce=\"abc\">var t = 1;</script><p>Same</p></body>",
        "text/html",
    )
    .await;
    serve(
        &server,
        "/two",
        "<body><script nonce=\"xyz\">var t = 2;</script><p>Same</p><!-- rendered 12:00 --></body>",
        "text/html",
    )
    .await;

    let fetcher = fetcher();
    let one = fetcher.fetch(&format!("{}/one", server.uri())).await.expect("ok");
    let two = fetcher.fetch(&format!("{}/two", server.uri())).await.expect("ok");
    assert_eq!(one, two);
}

#[tokio::test]
async fn content_change_changes_fingerprint() {
    let server = MockServer::start().await;
    serve(&server, "/v1", "<body><p>Price: 10</p></body>", "text/html").await;
    serve(&server, "/v2", "<body><p>Price: 12</p></body>", "text/html").await;

    let fetcher = fetcher();
    let v1 = fetcher.fetch(&format!("{}/v1", server.uri())).await.expect("ok");
    let v2 = fetcher.fetch(&format!("{}/v2", server.uri())).await.expect("ok");
    assert_ne!(v1, v2);
}

#[tokio::test]
async fn non_success_status_is_http_status_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = fetcher()
        .fetch(&format!("{}/missing", server.uri()))
        .await
        .expect_err("404 must fail");
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        request_timeout: Duration::from_millis(200),
        ..FetchSettings::default()
    })
    .expect("client builds");

    let err = fetcher
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .expect_err("should time out");
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    serve(&server, "/big", &"x".repeat(4096), "text/plain").await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        max_bytes: 1024,
        ..FetchSettings::default()
    })
    .expect("client builds");

    let err = fetcher
        .fetch(&format!("{}/big", server.uri()))
        .await
        .expect_err("should be too large");
    assert_eq!(err.kind, FailureKind::TooLarge { max_bytes: 1024 });
}

#[tokio::test]
async fn invalid_utf8_is_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/binary"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0xff, 0xfe, 0x00], "text/html"))
        .mount(&server)
        .await;

    let err = fetcher()
        .fetch(&format!("{}/binary", server.uri()))
        .await
        .expect_err("should fail");
    assert_eq!(err.kind, FailureKind::ParseFailure);
}

#[tokio::test]
async fn malformed_url_and_refused_connection() {
    let fetcher = fetcher();

    let err = fetcher.fetch("not a url").await.expect_err("bad url");
    assert_eq!(err.kind, FailureKind::InvalidUrl);

    // Port 1 is reserved and nothing listens there.
    let err = fetcher.fetch("http://127.0.0.1:1/").await.expect_err("refused");
    assert!(err.is_network());
}

#[test]
fn plain_text_is_whitespace_normalized() {
    assert_eq!(
        normalize_body("  a\n\tb   c  ", Some("text/plain; charset=utf-8")),
        "a b c"
    );
}

#[test]
fn html_normalization_keeps_structure() {
    let a = normalize_html("<body><p>one</p><p>two</p></body>");
    let b = normalize_html("<body><p>one two</p></body>");
    assert_ne!(a, b);

    let with_style = normalize_html("<body><style>p{color:red}</style><p>x</p></body>");
    let without = normalize_html("<body><p>x</p></body>");
    assert_eq!(with_style, without);
}
