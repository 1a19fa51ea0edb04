use crate::errors::CompileError;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// Browser-ready module produced from a component's source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledComponent {
    pub js: String,
}

/// Turns Svelte component source into a runnable module.
pub trait ComponentCompiler: Send + Sync {
    fn compile<'a>(
        &'a self,
        source_text: &'a str,
    ) -> BoxFuture<'a, Result<CompiledComponent, CompileError>>;
}

#[derive(Serialize)]
struct CompileRequest<'a> {
    code: &'a str,
}

#[derive(Deserialize)]
struct CompileResponse {
    #[serde(default)]
    js: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for a compilation endpoint that accepts `{code}` and answers with
/// `{js}` or, with a non-200 status, `{error}`.
#[derive(Debug, Clone)]
pub struct HttpCompiler {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpCompiler {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, source_text: &str) -> Result<CompiledComponent, CompileError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&CompileRequest { code: source_text })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<CompileResponse>(&body) {
            Ok(CompileResponse {
                error: Some(error), ..
            }) => Err(CompileError::Rejected(error)),
            Ok(CompileResponse { js: Some(js), .. }) if status.is_success() => {
                Ok(CompiledComponent { js })
            }
            _ => Err(CompileError::InvalidResponse(status, body)),
        }
    }
}

impl ComponentCompiler for HttpCompiler {
    fn compile<'a>(
        &'a self,
        source_text: &'a str,
    ) -> BoxFuture<'a, Result<CompiledComponent, CompileError>> {
        Box::pin(async move {
            let result = self.send(source_text).await;
            if let Err(error) = &result {
                tracing::warn!(%error, endpoint = %self.endpoint, "component compilation failed");
            }
            result
        })
    }
}
