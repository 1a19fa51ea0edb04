use crate::{LanguageModelInput, LanguageModelResult, ModelResponse};
use futures::future::BoxFuture;

pub trait LanguageModel: Send + Sync {
    fn provider(&self) -> &'static str;
    fn model_id(&self) -> String;
    fn generate(
        &self,
        input: LanguageModelInput,
    ) -> BoxFuture<'_, LanguageModelResult<ModelResponse>>;
}
