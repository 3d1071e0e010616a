use storyreel_common::config::SpeechConfig;
use storyreel_speech::{SpeechClient, SpeechService, SpeechSynthesizer};
use wiremock::matchers::{bearer_token, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> SpeechConfig {
    SpeechConfig {
        base_url: server.uri(),
        api_key: "secret-token".to_string(),
        ..SpeechConfig::default()
    }
}

#[tokio::test]
async fn synthesize_posts_json_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .and(bearer_token("secret-token"))
        .and(body_json(serde_json::json!({
            "model": "kokoro",
            "voice": "af_sky",
            "input": "A fox at dawn",
            "format": "mp3",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3fake-mp3".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = SpeechClient::new(&config_for(&server)).unwrap();
    let audio = client.synthesize("A fox at dawn", "af_sky").await.unwrap();
    assert_eq!(audio, b"ID3fake-mp3");
}

#[tokio::test]
async fn non_success_status_names_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
        .mount(&server)
        .await;

    let client = SpeechClient::new(&config_for(&server)).unwrap();
    let err = client.synthesize("text", "af_bella").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains(&format!("{}/v1/audio/speech", server.uri())));
    assert!(message.contains("HTTP 503"));
    assert!(message.contains("model loading"));
}

#[tokio::test]
async fn empty_audio_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = SpeechClient::new(&config_for(&server)).unwrap();
    let err = client.synthesize("text", "af_bella").await.unwrap_err();
    assert!(err.to_string().contains("empty audio"));
}

#[tokio::test]
async fn unreachable_service_fails_synthesis_and_liveness() {
    let config = SpeechConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        ..SpeechConfig::default()
    };
    let client = SpeechClient::new(&config).unwrap();
    assert!(!client.is_alive().await);

    let err = client.synthesize("text", "af_bella").await.unwrap_err();
    assert!(err.to_string().contains("unreachable"));
}

#[tokio::test]
async fn liveness_follows_health_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .mount(&server)
        .await;

    let client = SpeechClient::new(&config_for(&server)).unwrap();
    assert!(client.is_alive().await);
}

#[tokio::test]
async fn service_start_is_noop_when_already_running() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut service = SpeechService::new(&config_for(&server));
    service.start().await.unwrap();
    assert!(service.is_alive().await);
    assert!(!service.is_managed());
    service.stop().await.unwrap();
}
