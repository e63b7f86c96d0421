use std::collections::HashMap;
use std::time::Duration;

use hmac::{Hmac, Mac};
use keyward_auth::notify::{AddressChangeNotice, SessionNotifier};
use keyward_notifications::{NotificationError, SIGNATURE_HEADER, WebhookConfig, WebhookNotifier};
use sha2::Sha256;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, secret: Option<&str>) -> WebhookConfig {
    WebhookConfig {
        webhook_url: Some(format!("{}/hooks/keyward", server.uri())),
        webhook_secret: secret.map(str::to_string),
        webhook_headers: HashMap::from([("X-Source".to_string(), "keyward".to_string())]),
        timeout: Duration::from_secs(2),
    }
}

fn notice() -> AddressChangeNotice {
    AddressChangeNotice::new("0b7c6c1e-guid", 42, "203.0.113.7", "198.51.100.23")
}

#[tokio::test]
async fn test_delivers_signed_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/keyward"))
        .and(header("X-Source", "keyward"))
        .and(header_exists(SIGNATURE_HEADER))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(&config(&server, Some("hook-secret"))).unwrap();
    notifier.notify_address_change(&notice()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["old_ip"], "203.0.113.7");
    assert_eq!(body["new_ip"], "198.51.100.23");
    assert_eq!(body["identity"], "0b7c6c1e-guid");
    assert_eq!(body["session_id"], 42);

    let mut mac = Hmac::<Sha256>::new_from_slice(b"hook-secret").unwrap();
    mac.update(&request.body);
    let expected = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));
    let signature = request
        .headers
        .get(SIGNATURE_HEADER)
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(signature, expected);
}

#[tokio::test]
async fn test_unsigned_without_secret() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(&config(&server, None)).unwrap();
    notifier.deliver(&notice()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get(SIGNATURE_HEADER).is_none());
}

#[tokio::test]
async fn test_non_success_status_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(&config(&server, None)).unwrap();
    let err = notifier.deliver(&notice()).await.unwrap_err();
    match err {
        NotificationError::Rejected { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = notifier.notify_address_change(&notice()).await.unwrap_err();
    assert!(err.is_server_error());
}
