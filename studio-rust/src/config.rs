use crate::{
    compiler::HttpCompiler,
    errors::{ConfigError, StoreResult},
    generation::{
        GenerationService, GenerationSettings, OpenAIProvider, DEFAULT_MAX_TOKENS,
        DEFAULT_MODEL_ID, DEFAULT_TEMPERATURE,
    },
    storage::FileStorage,
    store::{Store, DEFAULT_STORAGE_KEY},
    studio::Studio,
};
use std::{path::PathBuf, str::FromStr, sync::Arc};

const DEFAULT_DATA_DIR: &str = ".component-forge";

/// Deployment settings, read from the environment.
///
/// | Variable             | Default               |
/// |----------------------|-----------------------|
/// | `FORGE_DATA_DIR`     | `.component-forge`    |
/// | `FORGE_STORAGE_KEY`  | `componentForgeState` |
/// | `FORGE_MODEL`        | `gpt-3.5-turbo`       |
/// | `FORGE_TEMPERATURE`  | `0.7`                 |
/// | `FORGE_MAX_TOKENS`   | `2000`                |
/// | `FORGE_COMPILE_URL`  | unset                 |
/// | `OPENAI_BASE_URL`    | `OpenAI` public API   |
/// | `OPENAI_API_KEY`     | unset                 |
#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub model_id: String,
    pub base_url: Option<String>,
    pub settings: GenerationSettings,
    pub compile_url: Option<String>,
    /// Seeds the stored credential when the session has none.
    pub api_key: Option<String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            base_url: None,
            settings: GenerationSettings {
                temperature: DEFAULT_TEMPERATURE,
                max_tokens: DEFAULT_MAX_TOKENS,
            },
            compile_url: None,
            api_key: None,
        }
    }
}

impl StudioConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source. Empty values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            data_dir: var("FORGE_DATA_DIR").map_or(defaults.data_dir, PathBuf::from),
            storage_key: var("FORGE_STORAGE_KEY").unwrap_or(defaults.storage_key),
            model_id: var("FORGE_MODEL").unwrap_or(defaults.model_id),
            base_url: var("OPENAI_BASE_URL"),
            settings: GenerationSettings {
                temperature: parse_var("FORGE_TEMPERATURE", var("FORGE_TEMPERATURE"))?
                    .unwrap_or(defaults.settings.temperature),
                max_tokens: parse_var("FORGE_MAX_TOKENS", var("FORGE_MAX_TOKENS"))?
                    .unwrap_or(defaults.settings.max_tokens),
            },
            compile_url: var("FORGE_COMPILE_URL"),
            api_key: var("OPENAI_API_KEY"),
        })
    }

    #[must_use]
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(self.data_dir.clone())
    }

    #[must_use]
    pub fn provider(&self) -> OpenAIProvider {
        let provider = OpenAIProvider::new(&self.model_id);
        match &self.base_url {
            Some(base_url) => provider.with_base_url(base_url),
            None => provider,
        }
    }

    #[must_use]
    pub fn generation_service(&self) -> GenerationService {
        GenerationService::new(Arc::new(self.provider())).with_settings(self.settings)
    }

    #[must_use]
    pub fn compiler(&self) -> Option<HttpCompiler> {
        self.compile_url.as_deref().map(HttpCompiler::new)
    }

    /// Open the file-backed store and seed the credential from
    /// `OPENAI_API_KEY` when none is saved.
    pub fn open_store(&self) -> StoreResult<Store> {
        let store = Store::open_with_key(Arc::new(self.storage()), &self.storage_key);
        if let Some(api_key) = &self.api_key {
            if store.credential().is_empty() {
                store.set_credential(api_key)?;
            }
        }
        Ok(store)
    }

    pub fn studio(&self) -> StoreResult<Studio> {
        Ok(Studio::new(
            Arc::new(self.open_store()?),
            Arc::new(self.generation_service()),
        ))
    }
}

fn parse_var<T: FromStr>(
    name: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.trim().parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::InvalidValue { name, value }),
    }
}
