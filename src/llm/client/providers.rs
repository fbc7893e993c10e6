//! LLM Provider支持模块

use rig::{
    agent::Agent,
    client::CompletionClient,
    completion::Prompt,
    providers::gemini::completion::gemini_api_types::{AdditionalParameters, GenerationConfig},
};

use crate::config::{LLMConfig, LLMProvider};
use crate::llm::client::types::{GenerationRequest, ProviderError};
use crate::llm::client::utils::{classify_provider_error, normalize_ollama_url};

/// 统一的Provider客户端枚举，每次请求按请求中的 provider 与凭证构建
#[derive(Clone)]
pub enum ProviderClient {
    OpenAI(rig::providers::openai::Client),
    Gemini(rig::providers::gemini::Client),
    Ollama(rig::providers::ollama::Client),
}

impl ProviderClient {
    /// 根据请求创建相应的provider客户端
    pub fn new(request: &GenerationRequest, config: &LLMConfig) -> Result<Self, ProviderError> {
        match request.provider {
            LLMProvider::OpenAI => {
                let api_key = required_credential(request)?;
                let client = rig::providers::openai::Client::builder(api_key).build();
                Ok(ProviderClient::OpenAI(client))
            }
            LLMProvider::Gemini => {
                let api_key = required_credential(request)?;
                let client = rig::providers::gemini::Client::builder(api_key)
                    .build()
                    .map_err(|e| ProviderError::Provider(format!("gemini: {e}")))?;
                Ok(ProviderClient::Gemini(client))
            }
            LLMProvider::Ollama => {
                let base_url = ollama_base_url(request, config);
                let client = rig::providers::ollama::Client::builder()
                    .base_url(&base_url)
                    .build();
                Ok(ProviderClient::Ollama(client))
            }
        }
    }

    /// 创建Agent
    pub fn create_agent(
        &self,
        model: &str,
        system_prompt: &str,
        config: &LLMConfig,
    ) -> Result<ProviderAgent, ProviderError> {
        match self {
            ProviderClient::OpenAI(client) => {
                let agent = client
                    .completion_model(model)
                    .completions_api()
                    .into_agent_builder()
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .temperature(config.temperature)
                    .build();
                Ok(ProviderAgent::OpenAI(agent))
            }
            ProviderClient::Gemini(client) => {
                let gen_cfg = GenerationConfig::default();
                let cfg = AdditionalParameters::default().with_config(gen_cfg);
                let params = serde_json::to_value(cfg)
                    .map_err(|e| ProviderError::Provider(format!("gemini: {e}")))?;

                let agent = client
                    .agent(model)
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .temperature(config.temperature)
                    .additional_params(params)
                    .build();
                Ok(ProviderAgent::Gemini(agent))
            }
            ProviderClient::Ollama(client) => {
                let agent = client
                    .agent(model)
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .temperature(config.temperature)
                    .build();
                Ok(ProviderAgent::Ollama(agent))
            }
        }
    }
}

/// OpenAI 与 Gemini 在发出请求之前就拒绝空凭证
fn required_credential(request: &GenerationRequest) -> Result<&str, ProviderError> {
    let credential = request.credential.trim();
    if credential.is_empty() {
        return Err(ProviderError::Auth(format!(
            "{} (no API key provided)",
            request.provider
        )));
    }
    Ok(credential)
}

/// Ollama 地址：请求中的 endpoint 优先，其次是凭证字段中的地址，最后是配置
pub fn ollama_base_url(request: &GenerationRequest, config: &LLMConfig) -> String {
    let raw = request
        .endpoint
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .or_else(|| Some(request.credential.as_str()).filter(|c| !c.trim().is_empty()))
        .unwrap_or(config.ollama_base_url.as_str());
    normalize_ollama_url(raw)
}

/// 统一的Agent枚举
pub enum ProviderAgent {
    OpenAI(Agent<rig::providers::openai::CompletionModel>),
    Gemini(Agent<rig::providers::gemini::completion::CompletionModel>),
    Ollama(Agent<rig::providers::ollama::CompletionModel<reqwest::Client>>),
}

impl ProviderAgent {
    fn provider_name(&self) -> &'static str {
        match self {
            ProviderAgent::OpenAI(_) => "openai",
            ProviderAgent::Gemini(_) => "gemini",
            ProviderAgent::Ollama(_) => "ollama",
        }
    }

    /// 执行prompt
    pub async fn prompt(&self, prompt: &str) -> Result<String, ProviderError> {
        let result = match self {
            ProviderAgent::OpenAI(agent) => agent.prompt(prompt).await,
            ProviderAgent::Gemini(agent) => agent.prompt(prompt).await,
            ProviderAgent::Ollama(agent) => agent.prompt(prompt).await,
        };
        result.map_err(|e| classify_provider_error(self.provider_name(), &e.to_string()))
    }
}
