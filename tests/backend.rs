use mcp_console::backend::{BackendClient, CommandBackend};
use mcp_console::config::BackendConfig;
use mcp_console::console::{CREATE_ERROR_FALLBACK, Console, RESEND_ERROR_FALLBACK};
use mcp_console::error::BackendError;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(&BackendConfig {
        base_url: server.uri(),
        request_timeout_secs: Some(5),
    })
    .expect("valid mock server url")
}

#[tokio::test]
async fn submit_posts_text_and_records_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/command"))
        .and(body_json(json!({"text": "הדלק את האור"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "llm_result": {"action": "turn_on_light"},
            "api_result": {"status": "ok"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = client_for(&server);
    let mut console = Console::new();
    console.set_input("הדלק את האור");
    console.submit(&backend).await;

    let entry = console.history().latest().expect("entry recorded");
    assert_eq!(entry.command, "הדלק את האור");
    assert_eq!(entry.llm_result, json!({"action": "turn_on_light"}));
    assert_eq!(entry.api_result, json!({"status": "ok"}));
    assert_eq!(entry.error, None);
    assert_eq!(entry.id, None);
    assert_eq!(console.input(), "");
    assert!(!console.is_loading());
}

#[tokio::test]
async fn submit_failure_uses_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/command"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "Failed LLM interaction: timeout"})),
        )
        .mount(&server)
        .await;

    let backend = client_for(&server);
    let mut console = Console::new();
    console.set_input("מחק את הפריט בשם קפה");
    console.submit(&backend).await;

    assert_eq!(console.error(), Some("Failed LLM interaction: timeout"));
    let entry = console.history().latest().expect("failed entry recorded");
    assert_eq!(entry.llm_result, Value::Null);
    assert_eq!(entry.api_result, Value::Null);
    assert_eq!(entry.error.as_deref(), Some("Failed LLM interaction: timeout"));
    assert_eq!(console.input(), "");
}

#[tokio::test]
async fn submit_failure_without_detail_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/command"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let backend = client_for(&server);
    let mut console = Console::new();
    console.set_input("x");
    console.submit(&backend).await;

    assert_eq!(console.error(), Some(CREATE_ERROR_FALLBACK));
    assert_eq!(console.history().len(), 1);
}

#[tokio::test]
async fn unreachable_backend_is_a_recorded_failure() {
    let server = MockServer::start().await;
    let backend = client_for(&server);
    drop(server);

    let mut console = Console::new();
    console.set_input("x");
    console.submit(&backend).await;

    assert_eq!(console.error(), Some(CREATE_ERROR_FALLBACK));
    assert!(console.history().latest().unwrap().is_error());
    assert!(!console.is_loading());
}

#[tokio::test]
async fn resend_hits_id_path_and_labels_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/resend/7f1c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "original_id": "7f1c",
            "llm_result": {"action": "add", "name": "גלידה"},
            "api_result": {"message": "Item added"},
            "resend": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = client_for(&server);
    let mut console = Console::new();
    console.resend(&backend, Some("7f1c")).await;

    let entry = console.history().latest().expect("resend entry");
    assert_eq!(entry.command, "🔁 7f1c");
    assert_eq!(entry.api_result, json!({"message": "Item added"}));
    assert_eq!(entry.error, None);
    assert!(console.error().is_none());
}

#[tokio::test]
async fn resend_failure_only_sets_banner() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/resend/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Command not found"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/resend/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let backend = client_for(&server);
    let mut console = Console::new();

    console.resend(&backend, Some("missing")).await;
    assert_eq!(console.error(), Some("Command not found"));
    assert!(console.history().is_empty());

    console.resend(&backend, Some("broken")).await;
    assert_eq!(console.error(), Some(RESEND_ERROR_FALLBACK));
    assert!(console.history().is_empty());
    assert!(!console.is_loading());
}

#[tokio::test]
async fn blank_input_and_missing_id_send_nothing() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = client_for(&server);
    let mut console = Console::new();
    console.set_input("  ");
    console.submit(&backend).await;
    console.resend(&backend, None).await;

    assert!(console.history().is_empty());
    assert_eq!(console.error(), None);
}

#[tokio::test]
async fn success_with_garbage_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/command"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let backend = client_for(&server);
    let err = backend.create_command("x").await.unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)));
    assert_eq!(err.detail(), None);
}

#[tokio::test]
async fn recent_commands_reads_server_log() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "b2",
                "text": "הצג את הפריט בשם תפוזים",
                "llm_result": {"action": "retrieve", "name": "תפוזים"},
                "api_result": {"error": "Item not found", "error_code": "not_found"},
                "timestamp": "2026-10-18T09:00:00"
            },
            {
                "id": "a1",
                "text": "תוסיף פריט בשם גלידה",
                "llm_result": {"action": "add", "name": "גלידה"},
                "api_result": {"message": "Item added"},
                "timestamp": "2026-10-18T08:59:00"
            }
        ])))
        .mount(&server)
        .await;

    let backend = client_for(&server);
    let records = backend.recent_commands().await.expect("history loads");

    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["b2", "a1"]);
    assert_eq!(records[1].api_result, json!({"message": "Item added"}));
}
