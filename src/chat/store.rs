use super::conversation::{Conversation, ConversationId};
use super::message::Message;
use crate::core::error::ChatError;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory conversations, most recent first, with one active entry.
///
/// Entries are shared snapshots. Every update swaps in a new `Arc`, so a
/// reader holding a snapshot never sees a half-applied change.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    entries: HashMap<ConversationId, Arc<Conversation>>,
    order: Vec<ConversationId>,
    active: ConversationId,
}

impl ConversationStore {
    /// A store seeded with one empty conversation.
    pub fn new() -> Self {
        let seed = Conversation::new(1);
        Self {
            entries: HashMap::from([(seed.id(), Arc::new(seed))]),
            order: vec![1],
            active: 1,
        }
    }

    fn next_id(&self) -> ConversationId {
        self.entries.keys().max().map_or(1, |max| max + 1)
    }

    fn insert_front(&mut self, conversation: Conversation) -> ConversationId {
        let id = conversation.id();
        self.entries.insert(id, Arc::new(conversation));
        self.order.insert(0, id);
        self.active = id;
        id
    }

    /// Creates an empty conversation and makes it active.
    pub fn create(&mut self) -> ConversationId {
        let id = self.next_id();
        self.insert_front(Conversation::new(id))
    }

    /// Creates a conversation opened by `greeting` and makes it active.
    pub fn create_with_greeting(&mut self, greeting: Message) -> ConversationId {
        let id = self.next_id();
        self.insert_front(Conversation::with_greeting(id, greeting))
    }

    pub fn select(&mut self, id: ConversationId) -> Result<(), ChatError> {
        if !self.entries.contains_key(&id) {
            return Err(ChatError::UnknownConversation(id));
        }
        self.active = id;
        Ok(())
    }

    fn replace(
        &mut self,
        id: ConversationId,
        update: impl FnOnce(&Conversation) -> Conversation,
    ) -> Result<(), ChatError> {
        let current = self
            .entries
            .get(&id)
            .ok_or(ChatError::UnknownConversation(id))?;
        let next = Arc::new(update(current));
        self.entries.insert(id, next);
        Ok(())
    }

    pub fn rename(&mut self, id: ConversationId, title: &str) -> Result<(), ChatError> {
        self.replace(id, |c| c.renamed(title))
    }

    pub fn append(&mut self, id: ConversationId, message: Message) -> Result<(), ChatError> {
        self.replace(id, |c| c.appended(message))
    }

    pub fn get(&self, id: ConversationId) -> Option<Arc<Conversation>> {
        self.entries.get(&id).cloned()
    }

    pub fn active_id(&self) -> ConversationId {
        self.active
    }

    pub fn active(&self) -> Arc<Conversation> {
        // `active` always names an entry: the store is seeded and never shrinks.
        Arc::clone(&self.entries[&self.active])
    }

    /// Snapshots in display order (most recent first).
    pub fn conversations(&self) -> Vec<Arc<Conversation>> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn starts_with_one_active_conversation() {
        let store = ConversationStore::new();
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_id(), 1);
        assert_eq!(store.active().title(), "New Conversation");
    }

    #[test]
    fn new_conversations_go_first_and_become_active() {
        let mut store = ConversationStore::new();
        let second = store.create();
        let third = store.create();

        assert_eq!((second, third), (2, 3));
        assert_eq!(store.active_id(), 3);
        let ids: Vec<_> = store.conversations().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn ids_follow_the_maximum_not_the_count() {
        let mut store = ConversationStore::new();
        store.create();
        store.select(1).unwrap();
        // Selecting an older conversation doesn't affect numbering.
        assert_eq!(store.create(), 3);
    }

    #[test]
    fn select_rejects_unknown_ids() {
        let mut store = ConversationStore::new();
        assert!(matches!(
            store.select(42),
            Err(ChatError::UnknownConversation(42))
        ));
        assert_eq!(store.active_id(), 1);
    }

    #[test]
    fn append_replaces_snapshot() {
        let mut store = ConversationStore::new();
        let before = store.active();
        store.append(1, Message::user("hi", Utc::now())).unwrap();

        assert!(before.messages().is_empty());
        assert_eq!(store.active().messages().len(), 1);
        assert!(!Arc::ptr_eq(&before, &store.active()));
    }
}
