use crate::{
    errors::StudioError,
    generation::GenerationService,
    store::Store,
    types::Artifact,
};
use std::sync::Arc;

/// A prompt-to-component session: reads the credential and conversation from
/// the store, generates, and records the result.
pub struct Studio {
    store: Arc<Store>,
    generator: Arc<GenerationService>,
}

impl Studio {
    pub fn new(store: Arc<Store>, generator: Arc<GenerationService>) -> Self {
        Self { store, generator }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    #[must_use]
    pub fn generator(&self) -> &Arc<GenerationService> {
        &self.generator
    }

    /// Generate a component for `prompt` and record it as the new current
    /// artifact, followed by the user and assistant turns.
    ///
    /// The three records are written together; nothing is recorded when
    /// generation or the write fails. Concurrent submissions are independent
    /// and each records its result when it completes.
    pub async fn submit(&self, prompt: &str) -> Result<Artifact, StudioError> {
        let credential = self.store.credential();
        let history = self.store.conversation_history();

        let source = self
            .generator
            .generate(&credential, prompt, &history)
            .await?;

        let artifact = self.store.record_generation(source, prompt)?;

        tracing::info!(artifact_id = %artifact.id, "component generated");
        Ok(artifact)
    }
}
