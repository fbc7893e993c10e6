//! LLM客户端 - 提供统一的文本生成服务接口

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::LLMConfig;

mod providers;
pub mod types;
pub mod utils;

pub use providers::ollama_base_url;
pub use types::{GenerationRequest, ProviderError, TextGenerator};

use providers::ProviderClient;

const SYSTEM_PROMPT: &str = "You are an expert chemist assisting with research proposals. \
Follow the requested output format exactly and never add commentary outside it.";

/// LLM客户端 - 基于 rig 的 [`TextGenerator`] 实现
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Self {
        Self { config }
    }

    /// 配置中的默认请求（provider、凭证、模型、Ollama 地址）
    pub fn default_request(&self) -> GenerationRequest {
        GenerationRequest {
            provider: self.config.provider,
            model_name: self.config.model_name.clone(),
            credential: self.config.api_key.clone(),
            endpoint: None,
        }
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self, request: &GenerationRequest) -> Result<(), ProviderError> {
        println!("🔄 正在检查模型连接...");
        // 使用一个简单的prompt来测试连接
        match self.generate(request, "Reply with the single word: ok").await {
            Ok(_) => {
                println!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ 模型连接失败: {}", e);
                Err(e)
            }
        }
    }

    fn resolve_model<'a>(&'a self, request: &'a GenerationRequest) -> &'a str {
        request
            .model_name
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.config.default_model(request.provider))
    }
}

#[async_trait]
impl TextGenerator for LLMClient {
    async fn generate(
        &self,
        request: &GenerationRequest,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let model = self.resolve_model(request);
        let timeout = self.config.timeout_for(request.provider);
        debug!(provider = %request.provider, model, "sending prompt");

        let client = ProviderClient::new(request, &self.config)?;
        let agent = client.create_agent(model, SYSTEM_PROMPT, &self.config)?;

        match tokio::time::timeout(timeout, agent.prompt(prompt)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => {
                warn!(provider = %request.provider, error = %e, "text generation failed");
                Err(e)
            }
            Err(_) => {
                warn!(provider = %request.provider, timeout_secs = timeout.as_secs(), "text generation timed out");
                Err(ProviderError::Timeout(timeout.as_secs()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LLMProvider;

    #[test]
    fn default_request_mirrors_config() {
        let config = LLMConfig {
            provider: LLMProvider::Gemini,
            api_key: "key-123".to_string(),
            model_name: Some("gemini-2.0-pro".to_string()),
            ..LLMConfig::default()
        };
        let request = LLMClient::new(config).default_request();

        assert_eq!(request.provider, LLMProvider::Gemini);
        assert_eq!(request.credential, "key-123");
        assert_eq!(request.model_name.as_deref(), Some("gemini-2.0-pro"));
    }

    #[test]
    fn model_override_wins_over_provider_default() {
        let client = LLMClient::new(LLMConfig::default());

        let request = GenerationRequest::new(LLMProvider::Ollama, "");
        assert_eq!(client.resolve_model(&request), "llama3.1:latest");

        let request = request.with_model("qwen2.5:7b");
        assert_eq!(client.resolve_model(&request), "qwen2.5:7b");
    }

    #[tokio::test]
    async fn empty_openai_key_fails_before_network() {
        let client = LLMClient::new(LLMConfig::default());
        let request = GenerationRequest::new(LLMProvider::OpenAI, "");

        let err = client.generate(&request, "hello").await.unwrap_err();
        assert!(matches!(err, ProviderError::Auth(_)));
    }
}
