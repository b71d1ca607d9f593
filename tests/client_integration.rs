//! Integration tests for the analyze client against a mock service.
//!
//! These tests cover:
//! - Wire request shape (path, version query, auth, JSON body)
//! - Response decoding and presence semantics
//! - Error classification for 4xx, 5xx, malformed bodies and transport failures
//! - Timeouts, cancellation and concurrent use of one client

use nlu_analyze::{
    AnalyzeClient, AnalyzeOptions, AnalyzeRequest, Credentials, Error, FeatureKind, FeatureSet,
    FeatureToggle, Features, KeywordsOptions, RelationsOptions, SemanticRolesOptions,
    VERSION_DATE_2017_02_27,
};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{
    basic_auth, bearer_token, body_json, body_partial_json, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Test Utilities
// =============================================================================

const TEXT: &str = "In 2009, Elliot Turner launched AlchemyAPI to process the written word, \
                    with all of its quirks and nuances, and got immediate traction.";

fn client_for(server: &MockServer) -> AnalyzeClient {
    AnalyzeClient::configure(
        server.uri(),
        Some(Credentials::basic("user", "secret")),
        VERSION_DATE_2017_02_27,
    )
    .expect("should build client")
}

fn relations_request() -> AnalyzeRequest {
    let features = FeatureSet::new()
        .with(FeatureToggle::default_for(FeatureKind::Relations))
        .unwrap();
    AnalyzeRequest::new(AnalyzeOptions {
        text: Some(TEXT.to_string()),
        features,
        return_analyzed_text: true,
        ..Default::default()
    })
    .unwrap()
}

fn analyze_mock() -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/v1/analyze"))
        .and(query_param("version", VERSION_DATE_2017_02_27))
}

// =============================================================================
// Success paths
// =============================================================================

#[tokio::test]
async fn test_relations_scenario() {
    let server = MockServer::start().await;
    analyze_mock()
        .and(basic_auth("user", "secret"))
        .and(body_json(json!({
            "text": TEXT,
            "features": { "relations": {} },
            "return_analyzed_text": true,
            "clean": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analyzed_text": TEXT,
            "language": "en",
            "relations": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .execute(&relations_request())
        .await
        .expect("analyze should succeed");

    assert_eq!(result.analyzed_text.as_deref(), Some(TEXT));
    assert_eq!(result.language.as_deref(), Some("en"));
    assert_eq!(result.relations, Some(Vec::new()));
    assert!(result.keywords.is_none());
}

#[tokio::test]
async fn test_keywords_and_relations_body() {
    let server = MockServer::start().await;
    analyze_mock()
        .and(body_partial_json(json!({
            "features": {
                "keywords": { "sentiment": true, "emotion": true, "limit": 3 },
                "relations": {}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "language": "en",
            "keywords": [
                {
                    "text": "natural language understanding",
                    "relevance": 0.95,
                    "sentiment": { "score": 0.0 },
                    "emotion": { "anger": 0.05, "disgust": 0.02, "fear": 0.04, "joy": 0.5, "sadness": 0.1 }
                },
                { "text": "artificial intelligence", "relevance": 0.71 }
            ],
            "relations": [{
                "type": "founderOf",
                "sentence": TEXT,
                "score": 0.68,
                "arguments": [
                    { "text": "Elliot Turner", "entities": [{ "text": "Elliot Turner", "type": "Person" }] },
                    { "text": "AlchemyAPI", "entities": [{ "text": "AlchemyAPI", "type": "Organization" }] }
                ]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let features = FeatureSet::try_from(Features {
        keywords: Some(KeywordsOptions {
            sentiment: Some(true),
            emotion: Some(true),
            limit: Some(3),
        }),
        relations: Some(RelationsOptions::default()),
        ..Default::default()
    })
    .unwrap();
    let request = AnalyzeRequest::text(TEXT, features).unwrap();

    let result = client_for(&server).execute(&request).await.unwrap();

    let keywords = result.keywords.expect("keywords requested");
    assert_eq!(keywords.len(), 2);
    assert!(keywords[0].emotion.is_some());
    assert!(keywords[1].sentiment.is_none());

    let relations = result.relations.expect("relations requested");
    assert_eq!(relations[0].relation_type.as_deref(), Some("founderOf"));
    assert_eq!(
        relations[0].arguments[1].entities[0].entity_type.as_deref(),
        Some("Organization")
    );
}

#[tokio::test]
async fn test_semantic_roles_decoding() {
    let server = MockServer::start().await;
    analyze_mock()
        .and(body_partial_json(json!({
            "features": { "semantic_roles": { "limit": 7, "keywords": true, "entities": true } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analyzed_text": TEXT,
            "language": "en",
            "semantic_roles": [
                {
                    "sentence": TEXT,
                    "subject": { "text": "Elliot Turner" },
                    "action": { "text": "launched", "normalized": "launch", "verb": { "text": "launch", "tense": "past" } },
                    "object": { "text": "AlchemyAPI" }
                },
                {
                    "sentence": TEXT,
                    "subject": { "text": "Elliot Turner" },
                    "action": { "text": "got", "normalized": "get", "verb": { "text": "get", "tense": "past" } },
                    "object": { "text": "immediate traction" }
                }
            ]
        })))
        .mount(&server)
        .await;

    let features = FeatureSet::new()
        .with(
            FeatureToggle::semantic_roles(SemanticRolesOptions {
                limit: Some(7),
                keywords: Some(true),
                entities: Some(true),
            })
            .unwrap(),
        )
        .unwrap();
    let request = AnalyzeRequest::new(AnalyzeOptions {
        text: Some(TEXT.to_string()),
        features,
        return_analyzed_text: true,
        ..Default::default()
    })
    .unwrap();

    let result = client_for(&server).execute(&request).await.unwrap();
    let roles = result.semantic_roles.expect("semantic roles requested");
    assert_eq!(roles.len(), 2);
    for role in &roles {
        // Single-sentence input, so every role points at the whole text
        assert_eq!(role.sentence.as_deref(), Some(TEXT));
        if let Some(subject) = &role.subject {
            assert!(subject.text.is_some());
        }
        if let Some(action) = &role.action {
            assert!(action.text.is_some());
        }
        if let Some(object) = &role.object {
            assert!(object.text.is_some());
        }
    }
}

#[tokio::test]
async fn test_bearer_token_and_default_headers() {
    let server = MockServer::start().await;
    analyze_mock()
        .and(bearer_token("tok-123"))
        .and(header("x-watson-learning-opt-out", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "language": "en",
            "relations": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnalyzeClient::configure(
        format!("{}/", server.uri()),
        Some(Credentials::bearer("tok-123")),
        VERSION_DATE_2017_02_27,
    )
    .unwrap()
    .with_default_header("X-Watson-Learning-Opt-Out", "true")
    .unwrap();

    let result = client.execute(&relations_request()).await.unwrap();
    assert_eq!(result.relations, Some(Vec::new()));
}

// =============================================================================
// Failure classification
// =============================================================================

#[tokio::test]
async fn test_unauthorized_is_client_error() {
    let server = MockServer::start().await;
    analyze_mock()
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 401,
            "error": "invalid credentials"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute(&relations_request())
        .await
        .unwrap_err();

    match &err {
        Error::ClientError { code, message } => {
            assert_eq!(*code, 401);
            assert_eq!(message, "invalid credentials");
        }
        other => panic!("expected ClientError, got {other:?}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_client_error_without_json_body() {
    let server = MockServer::start().await;
    analyze_mock()
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute(&relations_request())
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::ClientError { code: 400, ref message } if message == "bad request")
    );
}

#[tokio::test]
async fn test_server_error_is_retryable() {
    let server = MockServer::start().await;
    analyze_mock()
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "code": 503,
            "error": "service is overloaded"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute(&relations_request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable(ref msg) if msg.contains("overloaded")));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    analyze_mock()
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string("{\"language\": \"en\", \"relations\": "),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute(&relations_request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_wrong_shape_is_decode_error() {
    let server = MockServer::start().await;
    analyze_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "language": "en",
            "relations": { "type": "founderOf" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute(&relations_request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_connection_refused_is_service_unavailable() {
    // Bind and drop a listener to get a port nothing listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = AnalyzeClient::configure(
        format!("http://127.0.0.1:{port}"),
        Some(Credentials::basic("user", "secret")),
        VERSION_DATE_2017_02_27,
    )
    .unwrap();

    let err = client.execute(&relations_request()).await.unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable(_)));
}

// =============================================================================
// Timeouts, cancellation, concurrency
// =============================================================================

#[tokio::test]
async fn test_timeout_is_service_unavailable_and_client_stays_usable() {
    let server = MockServer::start().await;
    analyze_mock()
        .and(body_partial_json(json!({ "text": "slow" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "language": "en", "relations": [] }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    analyze_mock()
        .and(body_partial_json(json!({ "text": TEXT })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "language": "en",
            "relations": []
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).with_timeout(Duration::from_millis(200));
    let slow = AnalyzeRequest::text("slow", relations_request().features().clone()).unwrap();

    let started = Instant::now();
    let err = client.execute(&slow).await.unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable(ref msg) if msg.contains("timed out")));
    assert!(err.is_retryable());
    assert!(started.elapsed() < Duration::from_secs(4));

    // The timed-out connection must not poison the pool
    let result = client.execute(&relations_request()).await.unwrap();
    assert_eq!(result.relations, Some(Vec::new()));
}

#[tokio::test]
async fn test_cancellation_returns_cancelled() {
    let server = MockServer::start().await;
    analyze_mock()
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "language": "en", "relations": [] }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        }
    });

    let started = Instant::now();
    let err = client
        .execute_with_cancel(&relations_request(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_already_cancelled_token_sends_nothing() {
    let server = MockServer::start().await;
    analyze_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "language": "en" })))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = client_for(&server)
        .execute_with_cancel(&relations_request(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn test_concurrent_calls_share_one_client() {
    let server = MockServer::start().await;
    analyze_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analyzed_text": TEXT,
            "language": "en",
            "relations": []
        })))
        .expect(8)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = relations_request();

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let client = client.clone();
        let request = request.clone();
        tasks.spawn(async move { client.execute(&request).await });
    }

    let mut completed = 0;
    while let Some(joined) = tasks.join_next().await {
        let result = joined.expect("task panicked").expect("analyze should succeed");
        assert_eq!(result.analyzed_text.as_deref(), Some(TEXT));
        completed += 1;
    }
    assert_eq!(completed, 8);
}
