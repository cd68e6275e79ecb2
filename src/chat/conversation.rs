use super::message::Message;
use super::title::{self, NEW_CONVERSATION};

pub type ConversationId = u64;

/// An independently titled thread of messages.
///
/// Updates never mutate in place: `appended` and `renamed` return a new
/// value that replaces the old one in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    id: ConversationId,
    title: String,
    messages: Vec<Message>,
    title_locked: bool,
}

impl Conversation {
    pub fn new(id: ConversationId) -> Self {
        Self {
            id,
            title: NEW_CONVERSATION.to_string(),
            messages: Vec::new(),
            title_locked: false,
        }
    }

    /// A conversation opened with a greeting, e.g. a provider switch notice.
    /// The title stays at the placeholder until the first dispatched turn.
    pub fn with_greeting(id: ConversationId, greeting: Message) -> Self {
        Self {
            messages: vec![greeting],
            ..Self::new(id)
        }
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_title_locked(&self) -> bool {
        self.title_locked
    }

    pub fn appended(&self, message: Message) -> Self {
        let mut next = self.clone();
        next.messages.push(message);
        if !next.title_locked {
            next.title = title::summarize(&next.messages);
        }
        next
    }

    /// Pins a manual title; automatic titles never apply again.
    pub fn renamed(&self, new_title: &str) -> Self {
        Self {
            title: title::manual_title(new_title),
            title_locked: true,
            ..self.clone()
        }
    }

    /// Plain-text export, one `sender: text` line per message.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.sender, m.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
