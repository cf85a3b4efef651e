use crate::support::{chat_text, compatible, config, gemini};
use answer_relay::AnswerService;
use answer_relay::llm::FormatHint;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn handshake_probes_once_within_ttl_and_reorders() {
    let google = MockServer::start().await;
    let groq = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&google)
        .await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .expect(1)
        .mount(&groq)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_text("Groq first.")))
        .expect(1)
        .mount(&groq)
        .await;

    let service = AnswerService::from_config(&config(vec![
        gemini(&google, &["gemini-2.5-pro"]),
        compatible("groq", &groq, "llama-3.1-8b-instant"),
    ]))
    .unwrap();
    let handshake = service.handshake().unwrap();

    let snapshot = handshake.refresh().await;
    assert!(snapshot.any_available);
    assert!(!snapshot.is_available("gemini"));
    assert!(snapshot.is_available("groq"));

    // Cached: no second round of probes.
    handshake.refresh().await;

    let reply = service.answer("Who goes first?", None, &[], FormatHint::Plain).await;
    assert_eq!(reply.provider_used.as_deref(), Some("groq"));
}

#[tokio::test]
async fn slow_probe_counts_as_unavailable() {
    let google = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(3))
                .set_body_json(serde_json::json!({"models": []})),
        )
        .mount(&google)
        .await;

    let service =
        AnswerService::from_config(&config(vec![gemini(&google, &["gemini-2.5-pro"])])).unwrap();
    let started = std::time::Instant::now();
    let snapshot = service.handshake().unwrap().refresh().await;

    assert!(!snapshot.any_available);
    assert!(started.elapsed() < Duration::from_secs(2));
}
