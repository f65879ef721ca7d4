//! HTTP surface tests driven through the router without binding a socket.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use common::{credentials, FakeChatFactory, FakeConnector, FakeDatabase, ScriptedChatClient};
use dusturia_chat::connector::web::{build_router, AppState, SessionStore};
use dusturia_chat::{Container, ContainerConfig, PipelineProfile, QueryResult, SqlValue};

const CONNECT_FORM: &str = "host=localhost&port=3306&user=root&password=secret&database=dusturia";

fn app(profile: PipelineProfile, client: Arc<ScriptedChatClient>) -> axum::Router {
    app_with_sessions(profile, client, SessionStore::default())
}

fn app_with_sessions(
    profile: PipelineProfile,
    client: Arc<ScriptedChatClient>,
    sessions: SessionStore,
) -> axum::Router {
    let database = FakeDatabase::returning(QueryResult::new(
        vec!["COUNT(*)".into()],
        vec![vec![SqlValue::Int(14)]],
    ));
    let container = Container::with_components(
        ContainerConfig {
            profile,
            ..ContainerConfig::default()
        },
        FakeConnector::new(database),
        FakeChatFactory::new(client),
        credentials(),
    );
    let state = AppState::new(Arc::new(container), sessions).unwrap();
    build_router(Arc::new(state))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn new_session(app: &axum::Router) -> String {
    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_health_reports_ok() {
    let app = app(PipelineProfile::Decisions, ScriptedChatClient::replies(&[]));
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["profile"], "decisions");
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let app = app(PipelineProfile::Decisions, ScriptedChatClient::replies(&[]));

    let response = app
        .clone()
        .oneshot(get("/sessions/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/sessions/not-a-uuid/messages")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_shows_greeting_and_connect_prompt() {
    let app = app(PipelineProfile::Decisions, ScriptedChatClient::replies(&[]));
    let location = new_session(&app).await;

    let response = app.oneshot(get(&location)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Hello! I&#x27;m a SQL assistant."));
    assert!(html.contains("Please connect to the database first."));
    assert!(!html.contains("name=\"api_key\""));
}

#[tokio::test]
async fn test_dusturia_page_asks_for_api_key() {
    let app = app(PipelineProfile::Dusturia, ScriptedChatClient::replies(&[]));
    let location = new_session(&app).await;

    let html = body_text(app.oneshot(get(&location)).await.unwrap()).await;
    assert!(html.contains("name=\"api_key\""));
    assert!(html.contains("name=\"provider\""));
}

#[tokio::test]
async fn test_connect_then_ask_through_forms() {
    let client = ScriptedChatClient::replies(&[
        "SELECT COUNT(*) FROM dusturia_records;",
    ]);
    let app = app(PipelineProfile::Dusturia, client.clone());
    let location = new_session(&app).await;

    let response = app
        .clone()
        .oneshot(post_form(&format!("{location}/connect"), CONNECT_FORM))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let html = body_text(app.clone().oneshot(get(&location)).await.unwrap()).await;
    assert!(html.contains("Connected to database!"));
    // The notice is shown once.
    let html = body_text(app.clone().oneshot(get(&location)).await.unwrap()).await;
    assert!(!html.contains("Connected to database!"));

    let response = app
        .clone()
        .oneshot(post_form(
            &format!("{location}/messages"),
            "question=How+many+decisions%3F",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let json: Value = serde_json::from_str(
        &body_text(
            app.oneshot(get(&format!("{location}/messages")))
                .await
                .unwrap(),
        )
        .await,
    )
    .unwrap();
    assert_eq!(json["connected"], true);
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1]["role"], "human");
    assert_eq!(messages[1]["content"], "How many decisions?");
    assert_eq!(messages[2]["content"], "There were 14 decisions.");
    assert_eq!(json["last_sql"], "SELECT COUNT(*) FROM dusturia_records;");
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_failed_connect_shows_error_notice() {
    let app = app(PipelineProfile::Decisions, ScriptedChatClient::replies(&[]));
    let location = new_session(&app).await;

    let form = "host=&port=3306&user=root&password=secret&database=dusturia";
    app.clone()
        .oneshot(post_form(&format!("{location}/connect"), form))
        .await
        .unwrap();

    let html = body_text(app.oneshot(get(&location)).await.unwrap()).await;
    assert!(html.contains("Failed to connect to the database"));
    assert!(html.contains("Please connect to the database first."));
}

#[tokio::test]
async fn test_question_before_connect_warns_and_keeps_history() {
    let client = ScriptedChatClient::replies(&[]);
    let app = app(PipelineProfile::Decisions, client.clone());
    let location = new_session(&app).await;

    app.clone()
        .oneshot(post_form(&format!("{location}/messages"), "question=hello"))
        .await
        .unwrap();

    let json: Value = serde_json::from_str(
        &body_text(
            app.oneshot(get(&format!("{location}/messages")))
                .await
                .unwrap(),
        )
        .await,
    )
    .unwrap();
    assert_eq!(json["connected"], false);
    assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_ending_a_session_discards_it() {
    let app = app(PipelineProfile::Decisions, ScriptedChatClient::replies(&[]));
    let location = new_session(&app).await;

    let response = app
        .clone()
        .oneshot(post_form(&format!("{location}/end"), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let response = app.oneshot(get(&location)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn test_idle_sessions_are_reclaimed() {
    let app = app_with_sessions(
        PipelineProfile::Decisions,
        ScriptedChatClient::replies(&[]),
        SessionStore::new(Duration::from_secs(600), 64),
    );

    let abandoned = new_session(&app).await;
    for _ in 0..20 {
        new_session(&app).await;
    }
    tokio::time::advance(Duration::from_secs(601)).await;

    let active = new_session(&app).await;
    let json: Value = serde_json::from_str(
        &body_text(app.clone().oneshot(get("/health")).await.unwrap()).await,
    )
    .unwrap();
    assert_eq!(json["sessions"], 1);

    let response = app.clone().oneshot(get(&abandoned)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.oneshot(get(&active)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
