//! Provider HTTP clients against a local mock server.

use audioscribe::error::AudioscribeError;
use audioscribe::provider::groq::GroqProvider;
use audioscribe::provider::openai::OpenAiProvider;
use audioscribe::provider::transcriber::{SpeechProvider, TranscribeOptions};
use axum::Router;
use axum::response::IntoResponse;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

async fn start_mock_server(
    response_status: u16,
    response_body: &'static str,
) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new().route(
        "/audio/transcriptions",
        post(move || async move {
            let status = axum::http::StatusCode::from_u16(response_status).unwrap();
            (status, response_body).into_response()
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let endpoint = format!("http://{}/audio/transcriptions", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (endpoint, shutdown_tx)
}

#[tokio::test]
async fn groq_returns_trimmed_text_on_success() {
    let (endpoint, shutdown_tx) = start_mock_server(200, r#"{"text": " Hello from Groq "}"#).await;

    let provider = GroqProvider::new(Some("gsk-test".to_string())).with_endpoint(&endpoint);
    let result = provider
        .transcribe(b"fake audio bytes", &TranscribeOptions::default())
        .await;

    assert_eq!(result.unwrap().text, "Hello from Groq");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn groq_parses_word_timestamps_from_verbose_response() {
    let body = r#"{
        "text": "hello world",
        "words": [
            {"word": "hello", "start": 1.0, "end": 1.4},
            {"word": "world", "start": 1.5, "end": 1.9}
        ]
    }"#;
    let (endpoint, shutdown_tx) = start_mock_server(200, body).await;

    let provider = GroqProvider::new(Some("gsk-test".to_string())).with_endpoint(&endpoint);
    let options = TranscribeOptions {
        word_timestamps: true,
        ..TranscribeOptions::default()
    };
    let transcription = provider.transcribe(b"fake audio", &options).await.unwrap();

    assert_eq!(transcription.text, "hello world");
    assert_eq!(transcription.words.len(), 2);
    assert_eq!(transcription.words[0].word, "hello");
    assert_eq!(transcription.words[0].start, 1.0);
    assert_eq!(transcription.words[1].end, 1.9);
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn groq_surfaces_error_status_for_fallback_decisions() {
    let (endpoint, shutdown_tx) = start_mock_server(429, "rate limit exceeded").await;

    let provider = GroqProvider::new(Some("gsk-test".to_string())).with_endpoint(&endpoint);
    let result = provider
        .transcribe(b"fake audio", &TranscribeOptions::default())
        .await;

    match result {
        Err(AudioscribeError::Provider {
            provider,
            status,
            message,
        }) => {
            assert_eq!(provider, "groq");
            assert_eq!(status, Some(429));
            assert!(message.contains("rate limit"));
        }
        other => panic!("Expected Provider error, got {other:?}"),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn groq_error_response_is_transient_for_5xx() {
    let (endpoint, shutdown_tx) = start_mock_server(503, "upstream overloaded").await;

    let provider = GroqProvider::new(Some("gsk-test".to_string())).with_endpoint(&endpoint);
    let error = provider
        .transcribe(b"fake audio", &TranscribeOptions::default())
        .await
        .unwrap_err();

    assert!(error.is_transient());
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn groq_unparsable_body_is_a_provider_error() {
    let (endpoint, shutdown_tx) = start_mock_server(200, "not json at all").await;

    let provider = GroqProvider::new(Some("gsk-test".to_string())).with_endpoint(&endpoint);
    let result = provider
        .transcribe(b"fake audio", &TranscribeOptions::default())
        .await;

    assert!(matches!(
        result,
        Err(AudioscribeError::Provider { status: None, .. })
    ));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn openai_returns_text_on_success() {
    let (endpoint, shutdown_tx) =
        start_mock_server(200, r#"{"text": "Hello from OpenAI"}"#).await;

    let provider = OpenAiProvider::new(Some("sk-test".to_string())).with_endpoint(&endpoint);
    let result = provider
        .transcribe(b"fake audio bytes", &TranscribeOptions::default())
        .await;

    assert_eq!(result.unwrap().text, "Hello from OpenAI");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn openai_surfaces_error_status() {
    let (endpoint, shutdown_tx) = start_mock_server(401, "invalid api key").await;

    let provider = OpenAiProvider::new(Some("sk-bad".to_string())).with_endpoint(&endpoint);
    let result = provider
        .transcribe(b"fake audio", &TranscribeOptions::default())
        .await;

    match result {
        Err(AudioscribeError::Provider { status, .. }) => assert_eq!(status, Some(401)),
        other => panic!("Expected Provider error, got {other:?}"),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn missing_credentials_never_reach_the_network() {
    // Endpoint intentionally unroutable: without a key the client must fail
    // before any request is attempted.
    let provider = GroqProvider::new(None).with_endpoint("http://127.0.0.1:1/never");
    let result = provider
        .transcribe(b"fake audio", &TranscribeOptions::default())
        .await;

    assert!(matches!(
        result,
        Err(AudioscribeError::Provider { status: None, .. })
    ));
}
