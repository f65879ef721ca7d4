use minijinja::{context, Environment};
use serde::Serialize;

use crate::application::{ChatSession, Notice};
use crate::domain::{ChatMessage, ConnectionConfig, LlmProvider, PipelineProfile};

const CHAT_TEMPLATE_NAME: &str = "chat.html";

const CHAT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Chat with MySQL</title>
  <style>
    body { margin: 0; font-family: sans-serif; display: flex; min-height: 100vh; }
    aside { width: 18rem; padding: 1rem; background: #f0f2f6; }
    aside label { display: block; margin-top: .6rem; font-size: .85rem; }
    aside input, aside select { width: 100%; box-sizing: border-box; padding: .35rem; }
    main { flex: 1; padding: 1rem 2rem; display: flex; flex-direction: column; }
    .messages { flex: 1; overflow-y: auto; }
    .message { margin: .5rem 0; padding: .6rem .8rem; border-radius: .5rem; white-space: pre-wrap; }
    .message.ai { background: #f7f7f9; }
    .message.human { background: #e8f0fe; }
    .role { font-weight: bold; font-size: .75rem; display: block; }
    .notice { padding: .6rem; border-radius: .4rem; margin-bottom: .6rem; }
    .notice.success { background: #dff5e3; }
    .notice.warning { background: #fff4d6; }
    .notice.error { background: #fde2e1; }
    .sql { font-family: monospace; font-size: .8rem; color: #555; }
    form.ask { display: flex; gap: .5rem; }
    form.ask input { flex: 1; padding: .5rem; }
  </style>
</head>
<body>
  <aside>
    <h3>Settings</h3>
    <p>This is a simple chat application using MySQL. Connect to the database and start chatting.</p>
    <form method="post" action="/sessions/{{ session_id }}/connect">
      <label>Host <input name="host" value="{{ defaults.host }}" required></label>
      <label>Port <input name="port" value="{{ defaults.port }}" required></label>
      <label>User <input name="user" value="{{ defaults.user }}" required></label>
      <label>Password <input name="password" type="password" required></label>
      <label>Database <input name="database" value="{{ defaults.database }}" required></label>
      {% if prompts_for_api_key %}
      <label>Provider
        <select name="provider">
          {% for p in providers %}
          <option value="{{ p.value }}"{% if p.selected %} selected{% endif %}>{{ p.label }}</option>
          {% endfor %}
        </select>
      </label>
      <label>API Key <input name="api_key" type="password"></label>
      {% endif %}
      <p><button type="submit">Connect</button></p>
    </form>
    {% if connection %}<p>Connected: {{ connection }}</p>{% endif %}
    <form method="post" action="/sessions/{{ session_id }}/end">
      <button type="submit">New chat</button>
    </form>
  </aside>
  <main>
    <h1>Chat with MySQL</h1>
    {% if notice %}<div class="notice {{ notice.level }}">{{ notice.text }}</div>{% endif %}
    <div class="messages">
      {% for m in messages %}
      <div class="message {{ m.role }}"><span class="role">{{ "AI" if m.role == "ai" else "Human" }}</span>{{ m.content }}</div>
      {% endfor %}
      {% if last_sql %}<p class="sql">Last SQL: {{ last_sql }}</p>{% endif %}
    </div>
    {% if connected %}
    <form class="ask" method="post" action="/sessions/{{ session_id }}/messages">
      <input name="question" placeholder="Type a message..." autofocus>
      <button type="submit">Send</button>
    </form>
    {% else %}
    <div class="notice warning">Please connect to the database first.</div>
    {% endif %}
  </main>
</body>
</html>
"#;

#[derive(Serialize)]
struct ProviderOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Serialize)]
struct FormDefaults<'a> {
    host: &'a str,
    port: &'a str,
    user: &'a str,
    database: &'a str,
}

/// Renders the chat page. Values are HTML-escaped by the template engine.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(CHAT_TEMPLATE_NAME, CHAT_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render_chat(
        &self,
        session_id: &str,
        session: &ChatSession,
        notice: Option<Notice>,
        profile: PipelineProfile,
        selected_provider: Option<LlmProvider>,
        defaults: &ConnectionConfig,
    ) -> Result<String, minijinja::Error> {
        let selected = selected_provider.unwrap_or_default();
        let providers: Vec<ProviderOption> = LlmProvider::all()
            .into_iter()
            .map(|p| ProviderOption {
                value: p.as_str(),
                label: p.display_name(),
                selected: p == selected,
            })
            .collect();

        let messages: &[ChatMessage] = session.messages();

        self.env.get_template(CHAT_TEMPLATE_NAME)?.render(context! {
            session_id => session_id,
            messages => messages,
            notice => notice,
            connected => session.is_connected(),
            connection => session.connection_label(),
            last_sql => session.last_sql(),
            prompts_for_api_key => profile.prompts_for_api_key(),
            providers => providers,
            defaults => FormDefaults {
                host: &defaults.host,
                port: &defaults.port,
                user: &defaults.user,
                database: &defaults.database,
            },
        })
    }
}
