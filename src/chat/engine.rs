//! Dispatch engine: turns user input into provider calls and conversation
//! updates.

use super::conversation::{Conversation, ConversationId};
use super::message::Message;
use super::selection::ProviderSelection;
use super::store::ConversationStore;
use crate::core::clock::Clock;
use crate::core::error::{ChatError, ProviderError};
use crate::providers::registry::{self, ProviderEntry};
use crate::providers::{Adapters, Transport, Tuning, TuningField, send_prompt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Result of one `send_message` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Blank input or nothing to dispatch to; nothing was appended.
    Skipped,
    Replied {
        conversation_id: ConversationId,
        message: Message,
    },
    /// The provider call failed; the error was appended as a message.
    Failed {
        conversation_id: ConversationId,
        message: Message,
        error: ProviderError,
    },
}

impl SendOutcome {
    /// The assistant message appended for this turn, if any.
    pub fn reply(&self) -> Option<&Message> {
        match self {
            SendOutcome::Skipped => None,
            SendOutcome::Replied { message, .. } | SendOutcome::Failed { message, .. } => {
                Some(message)
            }
        }
    }
}

struct EngineState {
    store: ConversationStore,
    selection: ProviderSelection,
    /// In-flight calls per conversation; a conversation is awaiting a reply
    /// while its count is non-zero.
    in_flight: HashMap<ConversationId, usize>,
    initial_message_sent: bool,
}

impl EngineState {
    /// Opens the announcement conversation if the provider changed since the
    /// last check. Returns the new conversation's id.
    fn reconcile_provider_switch(&mut self, clock: &dyn Clock) -> Option<ConversationId> {
        if !self.selection.has_pending_switch() {
            return None;
        }
        let entry = self.selection.current();
        let greeting = Message::assistant(switch_announcement(entry), clock.now())
            .with_debug_info(debug_info(entry));
        let id = self.store.create_with_greeting(greeting);
        self.selection.acknowledge_switch();
        tracing::info!(provider = entry.id, conversation = id, "provider switched");
        Some(id)
    }

    fn finish_call(&mut self, id: ConversationId) {
        if let Some(count) = self.in_flight.get_mut(&id) {
            *count -= 1;
            if *count == 0 {
                self.in_flight.remove(&id);
            }
        }
    }
}

fn switch_announcement(entry: &ProviderEntry) -> String {
    format!(
        "You are now chatting with {}.\n\nCapabilities: {}",
        entry.label,
        registry::capabilities_of(entry.id)
    )
}

fn debug_info(entry: &ProviderEntry) -> String {
    format!("Model: {}\n{}", entry.id, registry::capabilities_of(entry.id))
}

/// Owns the conversations and provider selection, and dispatches messages.
///
/// All methods take `&self`; state lives behind a mutex that is never held
/// across the network call, so several sends may be in flight at once.
pub struct ChatEngine {
    state: Mutex<EngineState>,
    adapters: Adapters,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl ChatEngine {
    pub fn new(
        adapters: Adapters,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        provider_id: &str,
        tuning: Tuning,
    ) -> Result<Self, ChatError> {
        let selection = ProviderSelection::new(provider_id, tuning)?;
        Ok(Self {
            state: Mutex::new(EngineState {
                store: ConversationStore::new(),
                selection,
                in_flight: HashMap::new(),
                initial_message_sent: false,
            }),
            adapters,
            transport,
            clock,
        })
    }

    pub fn conversations(&self) -> Vec<Arc<Conversation>> {
        self.state.lock().store.conversations()
    }

    pub fn active_conversation(&self) -> Arc<Conversation> {
        self.state.lock().store.active()
    }

    pub fn conversation(&self, id: ConversationId) -> Option<Arc<Conversation>> {
        self.state.lock().store.get(id)
    }

    pub fn select_conversation(&self, id: ConversationId) -> Result<(), ChatError> {
        self.state.lock().store.select(id)
    }

    pub fn create_conversation(&self) -> ConversationId {
        let id = self.state.lock().store.create();
        tracing::info!(conversation = id, "conversation created");
        id
    }

    pub fn rename_conversation(&self, id: ConversationId, title: &str) -> Result<(), ChatError> {
        self.state.lock().store.rename(id, title)
    }

    pub fn current_provider(&self) -> &'static ProviderEntry {
        self.state.lock().selection.current()
    }

    /// Selects a model. A change of model opens and activates a new
    /// conversation announcing it; its id is returned.
    pub fn select_provider(&self, provider_id: &str) -> Result<Option<ConversationId>, ChatError> {
        let mut state = self.state.lock();
        state.selection.select(provider_id)?;
        Ok(state.reconcile_provider_switch(self.clock.as_ref()))
    }

    /// Tuning that would accompany a request to the current provider.
    pub fn tuning(&self) -> Option<Tuning> {
        let state = self.state.lock();
        let family = state.selection.current().family;
        state.selection.tuning_for(family)
    }

    pub fn set_tuning(&self, field: TuningField, value: f32) -> Result<Tuning, ChatError> {
        self.state.lock().selection.set_tuning(field, value)
    }

    /// Whether the active conversation is waiting on a provider.
    pub fn is_awaiting_reply(&self) -> bool {
        let state = self.state.lock();
        state.in_flight.contains_key(&state.store.active_id())
    }

    pub fn is_conversation_awaiting(&self, id: ConversationId) -> bool {
        self.state.lock().in_flight.contains_key(&id)
    }

    /// Dispatches the landing message. Only the first non-blank call per
    /// engine sends anything; later calls are skipped.
    pub async fn send_initial_message(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Skipped;
        }
        {
            let mut state = self.state.lock();
            if state.initial_message_sent {
                tracing::debug!("initial message already dispatched");
                return SendOutcome::Skipped;
            }
            state.initial_message_sent = true;
        }
        self.send_message(text).await
    }

    /// Sends `text` to the current provider in the active conversation.
    ///
    /// The reply (or the error) is appended to the conversation that was
    /// active when the call started, even if another one is active by the
    /// time it completes.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            tracing::debug!("skipping blank message");
            return SendOutcome::Skipped;
        }

        let (conversation_id, entry, tuning) = {
            let mut state = self.state.lock();
            state.reconcile_provider_switch(self.clock.as_ref());

            let entry = state.selection.current();
            if !entry.selectable {
                tracing::debug!(provider = entry.id, "skipping message for group header");
                return SendOutcome::Skipped;
            }

            let id = state.store.active_id();
            let user_message = Message::user(text, self.clock.now());
            if let Err(e) = state.store.append(id, user_message) {
                tracing::debug!("skipping message: {}", e);
                return SendOutcome::Skipped;
            }
            *state.in_flight.entry(id).or_insert(0) += 1;
            (id, entry, state.selection.tuning_for(entry.family))
        };

        let result = match self.adapters.get(entry.family) {
            Some(adapter) => {
                send_prompt(
                    adapter,
                    self.transport.as_ref(),
                    entry.id,
                    text,
                    tuning.as_ref(),
                )
                .await
            }
            None => Err(ProviderError::new(
                entry.id,
                format!("no adapter configured for {} models", entry.family),
            )),
        };

        let mut state = self.state.lock();
        let outcome = match result {
            Ok(reply) => {
                let message =
                    Message::assistant(reply, self.clock.now()).with_debug_info(debug_info(entry));
                SendOutcome::Replied {
                    conversation_id,
                    message,
                }
            }
            Err(error) => {
                tracing::warn!(provider = %error.provider_id, "provider call failed: {}", error);
                let message =
                    Message::assistant(format!("Error calling API: {}", error), self.clock.now());
                SendOutcome::Failed {
                    conversation_id,
                    message,
                    error,
                }
            }
        };

        if let Some(message) = outcome.reply() {
            // The conversation was present at call start and is never removed.
            if let Err(e) = state.store.append(conversation_id, message.clone()) {
                tracing::warn!("dropping reply: {}", e);
            }
        }
        state.finish_call(conversation_id);
        outcome
    }
}
