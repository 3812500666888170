use std::time::Duration;

use checker_engine::{ProbeFailure, ProbeSettings, Prober, ReqwestProber};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn prober() -> ReqwestProber {
    ReqwestProber::new(ProbeSettings::default()).expect("client")
}

#[tokio::test]
async fn head_ok_is_alive_without_get() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = prober().probe(&format!("{}/ok", server.uri()), TIMEOUT).await;

    assert!(outcome.alive);
    assert_eq!(outcome.status_code, Some(200));
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn rejected_head_falls_back_to_get() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = prober()
        .probe(&format!("{}/no-head", server.uri()), TIMEOUT)
        .await;

    assert!(outcome.alive);
    assert_eq!(outcome.status_code, Some(200));
}

#[tokio::test]
async fn missing_page_reports_get_status_and_is_not_alive() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let outcome = prober()
        .probe(&format!("{}/missing", server.uri()), TIMEOUT)
        .await;

    assert!(!outcome.alive);
    assert_eq!(outcome.status_code, Some(410));
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn redirects_are_followed() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let outcome = prober().probe(&format!("{}/old", server.uri()), TIMEOUT).await;

    assert!(outcome.alive);
    assert_eq!(outcome.status_code, Some(200));
}

#[tokio::test]
async fn slow_server_yields_timeout_without_status() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let outcome = prober()
        .probe(&format!("{}/slow", server.uri()), Duration::from_millis(50))
        .await;

    assert!(!outcome.alive);
    assert_eq!(outcome.status_code, None);
    let error = outcome.error.expect("timeout error");
    assert_eq!(error.kind, ProbeFailure::Timeout);
    assert!(error.message.contains("timed out"));
}

#[tokio::test]
async fn slow_get_after_rejected_head_yields_timeout_without_status() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = prober()
        .probe(&format!("{}/flaky", server.uri()), Duration::from_millis(100))
        .await;

    assert!(!outcome.alive);
    assert_eq!(outcome.status_code, None);
    let error = outcome.error.expect("timeout error");
    assert_eq!(error.kind, ProbeFailure::Timeout);
}

#[tokio::test]
async fn refused_connection_is_a_transport_failure() {
    // Bind then drop a listener to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let outcome = prober()
        .probe(&format!("http://127.0.0.1:{port}/"), TIMEOUT)
        .await;

    assert!(!outcome.alive);
    assert_eq!(outcome.status_code, None);
    assert_eq!(outcome.error.unwrap().kind, ProbeFailure::Transport);
}

#[tokio::test]
async fn unparseable_url_is_reported_not_raised() {
    let outcome = prober().probe("not a url", TIMEOUT).await;

    assert!(!outcome.alive);
    assert_eq!(outcome.status_code, None);
    assert_eq!(outcome.error.unwrap().kind, ProbeFailure::InvalidUrl);
}

#[tokio::test]
async fn accepted_status_codes_are_configurable() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    let url = format!("{}/empty", server.uri());

    let default_outcome = prober().probe(&url, TIMEOUT).await;
    assert!(!default_outcome.alive);
    assert_eq!(default_outcome.status_code, Some(204));

    let lenient = ReqwestProber::new(ProbeSettings {
        accepted_status_codes: vec![200, 204],
        ..ProbeSettings::default()
    })
    .unwrap();
    assert!(lenient.probe(&url, TIMEOUT).await.alive);
}
