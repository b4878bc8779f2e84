use std::net::TcpListener;
use std::sync::Arc;

use serde_json::Value;

use streamhub_auth::configuration::TokenSettings;
use streamhub_auth::media::MediaStore;
use streamhub_auth::startup::run;
use streamhub_auth::store::InMemoryUserStore;

struct NoMedia;

#[async_trait::async_trait]
impl MediaStore for NoMedia {
    async fn upload(&self, _local_path: &str) -> Option<String> {
        None
    }
}

fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let tokens = TokenSettings {
        access_token_secret: "health-access-secret".to_string(),
        refresh_token_secret: "health-refresh-secret".to_string(),
        access_token_expiry_seconds: 900,
        refresh_token_expiry_seconds: 864_000,
    };

    let server = run(
        listener,
        Arc::new(InMemoryUserStore::new()),
        Arc::new(NoMedia),
        tokens,
    )
    .expect("Failed to create server");

    let _ = tokio::spawn(server);

    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn unknown_routes_get_the_failure_envelope() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/definitely-not-a-route", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(404, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(404, body["statusCode"]);
    assert_eq!(false, body["success"]);
    assert_eq!("Resource not found", body["message"]);
    assert!(body["errors"].as_array().is_some());
}
