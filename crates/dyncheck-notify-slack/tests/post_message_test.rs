//! Integration tests for Slack delivery
//!
//! Uses wiremock to stand in for the Slack Web API.

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dyncheck_core::traits::Reporter;
use dyncheck_core::Error;
use dyncheck_notify_slack::SlackReporter;

fn reporter(server: &MockServer) -> SlackReporter {
    SlackReporter::new("xoxb-test", "C0123", Some(format!("{}/api", server.uri()))).unwrap()
}

#[tokio::test]
async fn test_posts_report_to_channel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .and(header("Authorization", "Bearer xoxb-test"))
        .and(body_json(serde_json::json!({
            "channel": "C0123",
            "text": "Those records have TTLs lower than 300\nwww.example.com (ttl 60)"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "channel": "C0123",
            "ts": "1700000000.000100"
        })))
        .expect(1)
        .mount(&server)
        .await;

    reporter(&server)
        .deliver("Those records have TTLs lower than 300\nwww.example.com (ttl 60)")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_api_error_is_report_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": false,
            "error": "channel_not_found"
        })))
        .mount(&server)
        .await;

    let err = reporter(&server).deliver("report").await.unwrap_err();

    assert!(matches!(err, Error::Report(_)));
    assert!(err.to_string().contains("channel_not_found"));
}

#[tokio::test]
async fn test_http_error_is_report_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = reporter(&server).deliver("report").await.unwrap_err();

    assert!(matches!(err, Error::Report(_)));
    assert!(!err.to_string().contains("xoxb-test"));
}
