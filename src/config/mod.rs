use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 工作目录下自动读取的配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "chem-assistant.toml";

/// 读取默认 API KEY 的环境变量
pub const API_KEY_ENV: &str = "CHEM_ASSISTANT_API_KEY";

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Gemini => write!(f, "gemini"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "gemini" | "google" => Ok(LLMProvider::Gemini),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// 是否启用详细日志
    pub verbose: bool,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 结构生成流水线配置
    pub structure: StructureConfig,

    /// 化学品信息查询配置
    pub chemical_info: ChemicalInfoConfig,

    /// 历史记录配置
    pub history: HistoryConfig,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// 指定模型，为空时使用各 provider 的默认模型
    pub model_name: Option<String>,

    pub openai_model: String,

    pub gemini_model: String,

    pub ollama_model: String,

    /// Ollama 服务地址
    pub ollama_base_url: String,

    /// 云端 provider 的请求超时（秒）
    pub request_timeout_secs: u64,

    /// 本地模型推理较慢，单独设置超时（秒）
    pub ollama_timeout_secs: u64,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,
}

impl LLMConfig {
    /// provider 的默认模型
    pub fn default_model(&self, provider: LLMProvider) -> &str {
        match provider {
            LLMProvider::OpenAI => &self.openai_model,
            LLMProvider::Gemini => &self.gemini_model,
            LLMProvider::Ollama => &self.ollama_model,
        }
    }

    pub fn timeout_for(&self, provider: LLMProvider) -> Duration {
        match provider {
            LLMProvider::Ollama => Duration::from_secs(self.ollama_timeout_secs),
            _ => Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// 结构生成流水线配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct StructureConfig {
    /// 主尝试次数（不含兜底）
    pub max_retries: u32,

    /// 结构图边长（像素）
    pub image_size: u32,

    /// 相似化合物搜索的相似度阈值（0-1）
    pub similarity_threshold: f64,

    /// 可得性评分低于该值时搜索相似化合物
    pub availability_threshold: u32,

    /// 是否计算性质并查询可得性
    pub enrich: bool,
}

/// 化学品信息查询配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ChemicalInfoConfig {
    pub pubchem_base_url: String,

    pub cactus_base_url: String,

    /// 单次查询超时（秒）
    pub timeout_secs: u64,

    /// 相似性搜索超时（秒）
    pub similar_timeout_secs: u64,

    /// 返回的相似化合物上限
    pub max_similar: usize,
}

/// 历史记录配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    /// 是否启用历史记录
    pub enabled: bool,

    /// 历史记录目录
    pub history_dir: PathBuf,

    /// 最多保留的会话数
    pub max_sessions: usize,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 指定路径优先，其次是工作目录下的默认配置文件，都没有则使用默认配置
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var(API_KEY_ENV).unwrap_or_default(),
            model_name: None,
            openai_model: String::from("gpt-4"),
            gemini_model: String::from("gemini-2.5-flash"),
            ollama_model: String::from("llama3.1:latest"),
            ollama_base_url: String::from("http://localhost:11434"),
            request_timeout_secs: 30,
            ollama_timeout_secs: 120,
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            image_size: 400,
            similarity_threshold: 0.8,
            availability_threshold: 50,
            enrich: true,
        }
    }
}

impl Default for ChemicalInfoConfig {
    fn default() -> Self {
        Self {
            pubchem_base_url: String::from("https://pubchem.ncbi.nlm.nih.gov/rest/pug"),
            cactus_base_url: String::from("https://cactus.nci.nih.gov/chemical/structure"),
            timeout_secs: 10,
            similar_timeout_secs: 15,
            max_similar: 5,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            history_dir: PathBuf::from("data/history"),
            max_sessions: 100,
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
