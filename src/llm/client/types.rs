use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LLMProvider;

/// 文本生成服务的错误，已按调用方关心的类别归类
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("authentication failed for {0}")]
    Auth(String),

    #[error("rate limit or quota exceeded for {0}")]
    RateLimit(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("provider error: {0}")]
    Provider(String),
}

/// 调用方持有的一次生成请求配置，流水线只读
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub provider: LLMProvider,
    /// 覆盖 provider 默认模型
    #[serde(default)]
    pub model_name: Option<String>,
    /// API KEY；Ollama 不需要凭证，但允许在此填写服务地址
    #[serde(default)]
    pub credential: String,
    /// Ollama 服务地址
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl GenerationRequest {
    pub fn new(provider: LLMProvider, credential: impl Into<String>) -> Self {
        Self {
            provider,
            model_name: None,
            credential: credential.into(),
            endpoint: None,
        }
    }

    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// 文本生成接口，结构生成流水线只依赖这一层
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
        prompt: &str,
    ) -> Result<String, ProviderError>;
}
