use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::{ChatSession, NoticeLevel};
use crate::domain::{ChatMessage, ConnectionConfig, DomainError, LlmCredentials, LlmProvider};

use super::error::WebError;
use super::AppState;

#[derive(Deserialize)]
pub struct ConnectForm {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ConnectForm {
    fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::new(
            self.host.as_str(),
            self.port.as_str(),
            self.user.as_str(),
            self.password.as_str(),
            self.database.as_str(),
        )
    }

    /// Provider and key typed in the sidebar, if the form carried them.
    fn credentials(&self) -> Result<Option<LlmCredentials>, WebError> {
        let provider = match self.provider.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(name) => LlmProvider::parse(name)
                .ok_or_else(|| WebError::BadRequest(format!("unknown provider '{name}'")))?,
            None if self.api_key.is_some() => LlmProvider::default(),
            None => return Ok(None),
        };
        let api_key = self.api_key.as_deref().unwrap_or_default().trim();
        Ok(Some(LlmCredentials::new(provider, api_key)))
    }
}

#[derive(Deserialize)]
pub struct MessageForm {
    pub question: String,
}

#[derive(Serialize)]
pub struct MessagesResponse<'a> {
    pub connected: bool,
    pub messages: &'a [ChatMessage],
    pub last_sql: Option<&'a str>,
}

fn session_url(id: &Uuid) -> String {
    format!("/sessions/{id}")
}

async fn find_session(
    state: &AppState,
    raw_id: &str,
) -> Result<(Uuid, Arc<Mutex<ChatSession>>), WebError> {
    let id = Uuid::parse_str(raw_id)
        .map_err(|_| WebError::NotFound(format!("session {raw_id} not found")))?;
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| WebError::NotFound(format!("session {id} not found")))?;
    Ok((id, session))
}

/// Start a fresh session and send the browser to it.
pub async fn index(State(state): State<Arc<AppState>>) -> Redirect {
    let id = state.sessions.insert(state.container.new_session()).await;
    info!("Started chat session {}", id);
    Redirect::to(&session_url(&id))
}

pub async fn show_session(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, WebError> {
    let (id, session) = find_session(&state, &raw_id).await?;
    let mut session = session.lock().await;
    let notice = session.take_notice();

    let page = state.renderer.render_chat(
        &id.to_string(),
        &session,
        notice,
        state.container.profile(),
        state.container.env_provider(),
        state.container.form_defaults(),
    )?;
    Ok(Html(page))
}

pub async fn connect(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    Form(form): Form<ConnectForm>,
) -> Result<Redirect, WebError> {
    let (id, session) = find_session(&state, &raw_id).await?;
    let credentials = state.container.credentials_for(form.credentials()?);
    let config = form.connection_config();

    let mut session = session.lock().await;
    match session.connect(&config, credentials).await {
        Ok(()) => session.set_notice(NoticeLevel::Success, "Connected to database!"),
        Err(e) => session.set_notice(
            NoticeLevel::Error,
            format!("Failed to connect to the database: {e}"),
        ),
    }

    Ok(Redirect::to(&session_url(&id)))
}

pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    Form(form): Form<MessageForm>,
) -> Result<Redirect, WebError> {
    let (id, session) = find_session(&state, &raw_id).await?;
    let mut session = session.lock().await;

    match session.submit(&form.question).await {
        Ok(_) => {}
        // Blank input is ignored, like an empty chat box.
        Err(DomainError::InvalidInput(_)) => {}
        Err(DomainError::NotConnected) => {
            session.set_notice(NoticeLevel::Warning, DomainError::NotConnected.to_string())
        }
        Err(DomainError::Execution(message)) => {
            warn!("Session {}: generated SQL failed: {}", id, message);
            session.set_notice(
                NoticeLevel::Error,
                format!("The generated SQL query could not be executed: {message}"),
            )
        }
        Err(e) => {
            warn!("Session {}: question failed: {}", id, e);
            session.set_notice(NoticeLevel::Error, e.to_string())
        }
    }

    Ok(Redirect::to(&session_url(&id)))
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<serde_json::Value>, WebError> {
    let (_, session) = find_session(&state, &raw_id).await?;
    let session = session.lock().await;

    let response = MessagesResponse {
        connected: session.is_connected(),
        messages: session.messages(),
        last_sql: session.last_sql(),
    };
    let body = serde_json::to_value(&response)
        .map_err(|e| WebError::Domain(DomainError::internal(e.to_string())))?;
    Ok(Json(body))
}

/// Discard the session and its conversation, then start over.
pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Redirect, WebError> {
    let (id, _) = find_session(&state, &raw_id).await?;
    state.sessions.remove(&id).await;
    info!("Ended chat session {}", id);
    Ok(Redirect::to("/"))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "profile": state.container.profile().as_str(),
        "sessions": state.sessions.len().await,
    }))
}
