//! Conversation history storage.
//!
//! The agent only talks to the [`ConversationStore`] trait, so the in-memory
//! map can be swapped for a persistent or shared store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::types::{ConversationContext, Message};

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Start an empty conversation and return its id.
    async fn create(&self) -> String;

    /// History of a conversation, or `None` if it does not exist.
    async fn get(&self, id: &str) -> Option<ConversationContext>;

    /// Append turns, creating the conversation if needed.
    async fn append(&self, id: &str, messages: Vec<Message>);

    /// Returns whether the conversation existed.
    async fn delete(&self, id: &str) -> bool;
}

pub fn new_conversation_id() -> String {
    format!("conv_{}", Uuid::new_v4().simple())
}

/// Process-local store; history is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<String, ConversationContext>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(&self) -> String {
        let id = new_conversation_id();
        self.conversations
            .write()
            .await
            .insert(id.clone(), Vec::new());
        id
    }

    async fn get(&self, id: &str) -> Option<ConversationContext> {
        self.conversations.read().await.get(id).cloned()
    }

    async fn append(&self, id: &str, messages: Vec<Message>) {
        self.conversations
            .write()
            .await
            .entry(id.to_string())
            .or_default()
            .extend(messages);
    }

    async fn delete(&self, id: &str) -> bool {
        self.conversations.write().await.remove(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_append_get_delete() {
        let store = InMemoryConversationStore::new();
        let id = store.create().await;
        assert!(id.starts_with("conv_"));
        assert_eq!(store.get(&id).await, Some(vec![]));

        store
            .append(&id, vec![Message::user("hi"), Message::assistant("hello")])
            .await;
        let history = store.get(&id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1], Message::assistant("hello"));

        assert!(store.delete(&id).await);
        assert!(!store.delete(&id).await);
        assert_eq!(store.get(&id).await, None);
    }

    #[tokio::test]
    async fn append_creates_missing_conversation() {
        let store = InMemoryConversationStore::new();
        store.append("conv_x", vec![Message::user("a")]).await;
        assert_eq!(store.get("conv_x").await.unwrap().len(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(new_conversation_id(), new_conversation_id());
    }
}
