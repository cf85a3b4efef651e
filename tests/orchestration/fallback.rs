use crate::support::{chat_text, compatible, config, gemini, gemini_error, gemini_text};
use answer_relay::AnswerService;
use answer_relay::llm::{ErrorKind, FormatHint, GenerationOutcome, SAFE_DEFAULT_ANSWER};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn missing_model_falls_through_to_next_tier() {
    let google = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(404).set_body_json(gemini_error(
            404,
            "NOT_FOUND",
            "models/gemini-2.5-pro is not found for API version v1beta",
        )))
        .expect(1)
        .mount(&google)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("Refunds take 5 days.")))
        .expect(1)
        .mount(&google)
        .await;

    let service = AnswerService::from_config(&config(vec![gemini(
        &google,
        &["gemini-2.5-pro", "gemini-1.5-pro", "gemini-pro"],
    )]))
    .unwrap();
    let reply = service
        .answer("How long do refunds take?", None, &[], FormatHint::Plain)
        .await;

    assert!(reply.success);
    assert_eq!(reply.text, "Refunds take 5 days.");
    assert_eq!(reply.model_used.as_deref(), Some("gemini-1.5-pro"));
    assert_eq!(reply.failures.len(), 1);
}

#[tokio::test]
async fn quota_exhaustion_moves_to_secondary_provider() {
    let google = MockServer::start().await;
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(gemini_error(
            429,
            "RESOURCE_EXHAUSTED",
            "Quota exceeded for quota metric 'Generate Content API requests per minute'",
        )))
        .expect(3)
        .mount(&google)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_text("From the fallback.")))
        .expect(1)
        .mount(&openai)
        .await;

    let service = AnswerService::from_config(&config(vec![
        gemini(&google, &["gemini-2.5-pro", "gemini-1.5-pro"]),
        compatible("openai", &openai, "gpt-4o-mini"),
    ]))
    .unwrap();
    let reply = service.answer("Status of my claim?", None, &[], FormatHint::Plain).await;

    assert!(reply.success);
    assert_eq!(reply.provider_used.as_deref(), Some("openai"));
    assert!(matches!(
        reply.failures.as_slice(),
        [GenerationOutcome::Failure { kind: ErrorKind::QuotaExceeded, .. }]
    ));
}

#[tokio::test]
async fn absurd_retry_hint_does_not_break_the_answer() {
    let google = MockServer::start().await;
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(gemini_error(
            429,
            "RESOURCE_EXHAUSTED",
            "Please retry in 99999999999999999999999s.",
        )))
        .mount(&google)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_text("Still answered.")))
        .expect(1)
        .mount(&openai)
        .await;

    let service = AnswerService::from_config(&config(vec![
        gemini(&google, &["gemini-2.5-pro"]),
        compatible("openai", &openai, "gpt-4o-mini"),
    ]))
    .unwrap();
    let reply = tokio::spawn(async move {
        service.answer("Is my order late?", None, &[], FormatHint::Plain).await
    })
    .await
    .unwrap();

    assert!(reply.success);
    assert_eq!(reply.text, "Still answered.");
}

#[tokio::test]
async fn long_retry_after_moves_on_instead_of_sleeping() {
    let openai = MockServer::start().await;
    let groq = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "86400")
                .set_body_json(serde_json::json!({
                    "error": {"message": "Rate limit reached", "code": "rate_limit_exceeded"}
                })),
        )
        .expect(1)
        .mount(&openai)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_text("Groq took it.")))
        .expect(1)
        .mount(&groq)
        .await;

    let service = AnswerService::from_config(&config(vec![
        compatible("openai", &openai, "gpt-4o-mini"),
        compatible("groq", &groq, "llama-3.1-8b-instant"),
    ]))
    .unwrap();
    let reply = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        service.answer("Where is my refund?", None, &[], FormatHint::Plain),
    )
    .await
    .unwrap();

    assert_eq!(reply.provider_used.as_deref(), Some("groq"));
}

#[tokio::test]
async fn rejected_key_is_not_retried_on_later_questions() {
    let google = MockServer::start().await;
    let groq = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(gemini_error(
            403,
            "PERMISSION_DENIED",
            "Method doesn't allow unregistered callers",
        )))
        .expect(1)
        .mount(&google)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_text("Groq answer.")))
        .expect(2)
        .mount(&groq)
        .await;

    let service = AnswerService::from_config(&config(vec![
        gemini(&google, &["gemini-2.5-pro"]),
        compatible("groq", &groq, "llama-3.1-8b-instant"),
    ]))
    .unwrap();
    for question in ["first?", "second?"] {
        let reply = service.answer(question, None, &[], FormatHint::Plain).await;
        assert_eq!(reply.provider_used.as_deref(), Some("groq"));
    }
    assert!(service.registry().get("gemini").unwrap().is_revoked());
}

#[tokio::test]
async fn everything_down_yields_safe_default() {
    let google = MockServer::start().await;
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&google)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_text("   ")))
        .mount(&openai)
        .await;

    let service = AnswerService::from_config(&config(vec![
        gemini(&google, &["gemini-2.5-pro"]),
        compatible("openai", &openai, "gpt-4o-mini"),
    ]))
    .unwrap();
    let reply = service.answer("Anything?", None, &[], FormatHint::Plain).await;

    assert!(!reply.success);
    assert_eq!(reply.text, SAFE_DEFAULT_ANSWER);
    assert_eq!(reply.failures.len(), 2);
}

#[tokio::test]
async fn placeholder_keys_never_reach_the_network() {
    let google = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("unused")))
        .expect(0)
        .mount(&google)
        .await;

    let mut provider = gemini(&google, &["gemini-2.5-pro"]);
    provider.api_key = Some("your_gemini_api_key_here".into());
    let service = AnswerService::from_config(&config(vec![provider])).unwrap();
    let reply = service.answer("hello?", None, &[], FormatHint::Plain).await;

    assert!(!reply.success);
    assert!(reply.failures.is_empty());
}
