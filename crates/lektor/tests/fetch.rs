mod common;

use std::{sync::Mutex, time::Duration};

use common::{client, CHALLENGE_PAGE};
use lektor::{
    fetch::{retry_challenged, ChallengeFetcher, FetchOptions},
    BrowserHeaders, LektorError, LektorResult,
};
use reqwest::header::HeaderMap;
use tokio::time::Instant;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn fast_fetcher() -> ChallengeFetcher {
    ChallengeFetcher::new(client()).with_options(FetchOptions {
        max_attempts: 2,
        retry_delay: Duration::from_millis(10),
    })
}

#[tokio::test]
async fn test_challenge_fails_after_two_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(403).set_body_string(CHALLENGE_PAGE))
        .expect(2)
        .mount(&server)
        .await;

    let result = fast_fetcher()
        .get(&format!("{}/embed", server.uri()), HeaderMap::new())
        .await;
    assert!(matches!(result, Err(LektorError::ChallengeDetected)));
}

#[tokio::test]
async fn test_gateway_timeout_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lesson"))
        .respond_with(ResponseTemplate::new(524).set_body_string("error code: 524"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lesson"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Lesson 1</h1>"))
        .with_priority(2)
        .expect(1)
        .mount(&server)
        .await;

    let body = fast_fetcher()
        .get(&format!("{}/lesson", server.uri()), HeaderMap::new())
        .await
        .unwrap();
    assert_eq!(&body[..], b"<h1>Lesson 1</h1>");
}

#[tokio::test]
async fn test_status_code_is_not_inspected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .expect(1)
        .mount(&server)
        .await;

    let body = fast_fetcher()
        .get(&format!("{}/missing", server.uri()), HeaderMap::new())
        .await
        .unwrap();
    assert_eq!(&body[..], b"not here");
}

#[tokio::test]
async fn test_browser_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/embed"))
        .and(header("user-agent", "Mozilla/5.0 (X11; Linux x86_64)"))
        .and(header("sec-ch-ua-platform", "\"Linux\""))
        .respond_with(ResponseTemplate::new(200).set_body_string("player"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(403).set_body_string(CHALLENGE_PAGE))
        .with_priority(2)
        .mount(&server)
        .await;

    let url = format!("{}/embed", server.uri());
    let headers = BrowserHeaders::new("Mozilla/5.0 (X11; Linux x86_64)", "\"Linux\"")
        .to_header_map()
        .unwrap();
    let body = fast_fetcher().get(&url, headers).await.unwrap();
    assert_eq!(&body[..], b"player");

    let result = fast_fetcher().get(&url, HeaderMap::new()).await;
    assert!(matches!(result, Err(LektorError::ChallengeDetected)));
}

#[tokio::test(start_paused = true)]
async fn test_retry_waits_between_attempts() {
    let calls = Mutex::new(Vec::new());
    let result: LektorResult<()> = retry_challenged(&FetchOptions::default(), || {
        calls.lock().unwrap().push(Instant::now());
        async { Err(LektorError::ChallengeDetected) }
    })
    .await;

    assert!(matches!(result, Err(LektorError::ChallengeDetected)));
    let calls = calls.into_inner().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(calls[1] - calls[0] >= Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn test_other_errors_are_not_retried() {
    let calls = Mutex::new(0);
    let result: LektorResult<()> = retry_challenged(&FetchOptions::default(), || {
        *calls.lock().unwrap() += 1;
        async { Err(LektorError::ManifestParseError("broken".to_string())) }
    })
    .await;

    assert!(matches!(result, Err(LektorError::ManifestParseError(_))));
    assert_eq!(calls.into_inner().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_last_challenge_error_is_returned() {
    let calls = Mutex::new(0);
    let options = FetchOptions {
        max_attempts: 3,
        retry_delay: Duration::from_secs(7),
    };
    let result: LektorResult<()> = retry_challenged(&options, || {
        let mut calls = calls.lock().unwrap();
        *calls += 1;
        let error = if *calls < 3 {
            LektorError::ChallengeDetected
        } else {
            LektorError::Transient524
        };
        async move { Err(error) }
    })
    .await;

    assert!(matches!(result, Err(LektorError::Transient524)));
    assert_eq!(calls.into_inner().unwrap(), 3);
}
