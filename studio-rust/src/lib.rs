mod compiler;
mod config;
mod errors;
mod generation;
mod id;
mod prompt;
mod storage;
mod store;
mod studio;
mod types;

pub use compiler::{CompiledComponent, ComponentCompiler, HttpCompiler};
pub use config::StudioConfig;
pub use errors::*;
pub use generation::{
    strip_code_fence, GenerationService, GenerationSettings, ModelProvider, OpenAIProvider,
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL_ID, DEFAULT_TEMPERATURE,
};
pub use prompt::SYSTEM_PROMPT;
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage};
pub use store::{Store, DEFAULT_STORAGE_KEY};
pub use studio::Studio;
pub use types::*;
