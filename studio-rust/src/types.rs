use forge_llm::{ChatMessage, ChatRole};
use serde::{Deserialize, Serialize};

/// One generated component: its Svelte source plus the prompt that produced
/// it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: String,
    #[serde(alias = "code")]
    pub source_text: String,
    pub prompt: String,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timestamp")]
    pub created_at: u64,
}

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl From<Role> for ChatRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

/// A message in the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timestamp")]
    pub created_at: u64,
}

impl Message {
    /// The turn as it is replayed to the language model.
    #[must_use]
    pub fn to_chat_message(&self) -> ChatMessage {
        ChatMessage {
            role: self.role.into(),
            content: self.content.clone(),
        }
    }
}

/// The full session snapshot. This is the document written to storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    #[serde(default)]
    pub api_key: String,
    #[serde(default, alias = "components")]
    pub artifacts: Vec<Artifact>,
    #[serde(default, alias = "currentComponentId")]
    pub current_artifact_id: Option<String>,
    #[serde(default)]
    pub conversation: Vec<Message>,
}

impl ApplicationState {
    pub fn find_artifact(&self, id: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|artifact| artifact.id == id)
    }

    /// The artifact the current pointer references, if any.
    pub fn current_artifact(&self) -> Option<&Artifact> {
        let id = self.current_artifact_id.as_deref()?;
        self.find_artifact(id)
    }

    /// The artifact inserted immediately before the current one.
    pub fn previous_artifact(&self) -> Option<&Artifact> {
        let id = self.current_artifact_id.as_deref()?;
        if self.artifacts.len() < 2 {
            return None;
        }
        let index = self.artifacts.iter().position(|artifact| artifact.id == id)?;
        index.checked_sub(1).map(|previous| &self.artifacts[previous])
    }

    /// The conversation as completion-request turns, oldest first.
    pub fn conversation_history(&self) -> Vec<ChatMessage> {
        self.conversation
            .iter()
            .map(Message::to_chat_message)
            .collect()
    }
}
