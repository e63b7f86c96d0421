use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use keyward_auth::storage::{
    InMemoryIdentityStorage, InMemoryRevokedTokenStorage, InMemorySessionStorage,
};
use keyward_auth::{AuthConfig, SessionService};
use keyward_notifications::{WebhookConfig, WebhookNotifier};
use keyward_server::build_app;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn start_server(
    webhook_url: String,
) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let notifier = WebhookNotifier::new(&WebhookConfig {
        webhook_url: Some(webhook_url),
        ..WebhookConfig::default()
    })
    .expect("notifier");
    let service = SessionService::from_config(
        &AuthConfig::with_secret("webhook-test-secret-0123456789abcdef"),
        Arc::new(InMemoryIdentityStorage::new()),
        Arc::new(InMemorySessionStorage::new()),
        Arc::new(InMemoryRevokedTokenStorage::new()),
    )
    .with_notifier(Arc::new(notifier));
    let app = build_app(service, Duration::from_secs(5));

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = rx.await;
        })
        .await;
    });

    (format!("http://{addr}"), tx, server)
}

async fn wait_for_requests(receiver: &MockServer, count: usize) -> Vec<wiremock::Request> {
    for _ in 0..50 {
        let received = receiver.received_requests().await.unwrap_or_default();
        if received.len() >= count {
            return received;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    receiver.received_requests().await.unwrap_or_default()
}

#[tokio::test]
async fn address_change_posts_notice() {
    let receiver = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/address-change"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&receiver)
        .await;

    let (base, shutdown_tx, handle) =
        start_server(format!("{}/hooks/address-change", receiver.uri())).await;
    let client = reqwest::Client::new();

    let resp = client.post(format!("{base}/v1/users")).send().await.unwrap();
    let guid = resp.json::<Value>().await.unwrap()["guid"]
        .as_str()
        .unwrap()
        .to_string();

    // Peer address (127.0.0.1) becomes the session's source address.
    let resp = client
        .post(format!("{base}/v1/tokens"))
        .header("user-agent", "keyward-tests/1.0")
        .json(&json!({"guid": guid}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let pair: Value = resp.json().await.unwrap();
    let access = pair["access"].as_str().unwrap();
    let refresh = pair["refresh"].as_str().unwrap();

    let resp = client
        .post(format!("{base}/v1/tokens/refresh"))
        .header("user-agent", "keyward-tests/1.0")
        .header("x-forwarded-for", "198.51.100.23")
        .bearer_auth(access)
        .json(&json!({"refresh": refresh}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let received = wait_for_requests(&receiver, 1).await;
    assert_eq!(received.len(), 1);
    let notice: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(notice["identity"], guid.as_str());
    assert_eq!(notice["old_ip"], "127.0.0.1");
    assert_eq!(notice["new_ip"], "198.51.100.23");
    assert!(notice["session_id"].is_i64());

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn failing_receiver_does_not_block_rotation() {
    let receiver = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&receiver)
        .await;

    let (base, shutdown_tx, handle) = start_server(receiver.uri()).await;
    let client = reqwest::Client::new();

    let guid = client
        .post(format!("{base}/v1/users"))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap()["guid"]
        .as_str()
        .unwrap()
        .to_string();
    let pair: Value = client
        .post(format!("{base}/v1/tokens"))
        .header("user-agent", "keyward-tests/1.0")
        .header("x-forwarded-for", "192.0.2.1")
        .json(&json!({"guid": guid}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let resp = client
        .post(format!("{base}/v1/tokens/refresh"))
        .header("user-agent", "keyward-tests/1.0")
        .header("x-forwarded-for", "192.0.2.2")
        .bearer_auth(pair["access"].as_str().unwrap())
        .json(&json!({"refresh": pair["refresh"]}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(wait_for_requests(&receiver, 1).await.len(), 1);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
