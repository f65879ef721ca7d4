use serde::{Deserialize, Serialize};

/// Opening message of every new conversation.
pub const GREETING: &str = "Hello! I'm a SQL assistant. Ask me anything about your database.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Ai,
    Human,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Ai => "AI",
            Role::Human => "Human",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Role,
    content: String,
}

impl ChatMessage {
    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_human(&self) -> bool {
        self.role == Role::Human
    }
}

/// Ordered chat history of one session. Messages are only ever appended.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Start a conversation with the assistant greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::ai(GREETING)],
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// History as prompt context, one `Role: content` line per message.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role(), m.content()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_conversation_starts_with_greeting() {
        let conversation = Conversation::new();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].role(), Role::Ai);
        assert_eq!(conversation.messages()[0].content(), GREETING);
    }

    #[test]
    fn messages_keep_insertion_order() {
        let mut conversation = Conversation::new();
        conversation.push(ChatMessage::human("first"));
        conversation.push(ChatMessage::ai("second"));
        conversation.push(ChatMessage::human("third"));

        let contents: Vec<&str> = conversation.messages()[1..]
            .iter()
            .map(|m| m.content())
            .collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert!(conversation.last().is_some_and(|m| m.is_human()));
    }

    #[test]
    fn transcript_tags_each_line_with_role() {
        let mut conversation = Conversation::new();
        conversation.push(ChatMessage::human("How many decisions in 2022?"));

        let transcript = conversation.transcript();
        let lines: Vec<&str> = transcript.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("AI: Hello!"));
        assert_eq!(lines[1], "Human: How many decisions in 2022?");
    }
}
