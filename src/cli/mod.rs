use crate::chem::MAX_IMAGE_SIZE;
use crate::config::{Config, LLMProvider};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// chem-research-assistant - 由大模型提出候选化合物，并在本地完成 SMILES 校验、性质计算与结构图渲染
#[derive(Parser, Debug)]
#[command(name = "chem-research-assistant")]
#[command(
    about = "Drafts the chemistry side of a research proposal: proposes a compound with an LLM, validates and renders its structure, and checks commercial availability."
)]
#[command(version)]
pub struct Args {
    /// 配置文件路径
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 是否启用详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// LLM Provider (openai, gemini, ollama)
    #[arg(long, global = true)]
    pub llm_provider: Option<String>,

    /// LLM API KEY
    #[arg(long, global = true)]
    pub llm_api_key: Option<String>,

    /// 覆盖 provider 的默认模型
    #[arg(long, global = true)]
    pub model_name: Option<String>,

    /// Ollama 服务地址
    #[arg(long, global = true)]
    pub ollama_url: Option<String>,

    /// 主尝试次数（不含兜底）
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// 是否禁用历史记录
    #[arg(long, global = true)]
    pub no_history: bool,

    /// 历史记录目录
    #[arg(long, global = true)]
    pub history_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// 根据研究背景生成候选结构
    Generate {
        /// 研究背景文本
        #[arg(long, conflicts_with = "context_file", required_unless_present = "context_file")]
        context: Option<String>,

        /// 从文件读取研究背景
        #[arg(long)]
        context_file: Option<PathBuf>,

        /// 将完整结果写入 JSON 文件
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 跳过性质计算与可得性查询
        #[arg(long)]
        no_enrich: bool,
    },

    /// 根据研究材料生成摘要、研究提案与选择理由
    Propose {
        /// 研究主题
        #[arg(long)]
        topic: String,

        /// 研究材料（笔记、摘要等）
        #[arg(long, conflicts_with = "context_file", required_unless_present = "context_file")]
        context: Option<String>,

        /// 从文件读取研究材料
        #[arg(long)]
        context_file: Option<PathBuf>,

        /// 将提案写入 JSON 文件
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 按反馈修改已有提案
    Refine {
        /// 提案文件：propose 输出的 JSON 或纯文本
        #[arg(long)]
        proposal_file: PathBuf,

        /// 修改意见
        #[arg(long)]
        feedback: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 为候选分子生成设计依据
    Rationale {
        smiles: String,

        /// 化合物名称
        #[arg(long, default_value = "")]
        name: String,

        /// 研究背景
        #[arg(long, conflicts_with = "context_file", required_unless_present = "context_file")]
        context: Option<String>,

        #[arg(long)]
        context_file: Option<PathBuf>,

        /// 不查询可得性
        #[arg(long)]
        offline: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 校验 SMILES（不做清洗）
    Validate { smiles: String },

    /// 计算分子描述符
    Properties { smiles: String },

    /// 渲染结构图为 PNG
    Render {
        smiles: String,

        #[arg(short, long)]
        output: PathBuf,

        /// 图片边长（像素），默认取配置
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_IMAGE_SIZE as i64))]
        size: Option<u32>,
    },

    /// 检查模型连接
    Check,

    /// 会话历史
    #[command(subcommand)]
    History(HistoryCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum HistoryCommand {
    /// 列出最近的会话
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// 按主题或标签过滤
        #[arg(long)]
        filter: Option<String>,
    },
    /// 查看会话详情
    Show { id: String },
    /// 删除会话
    Delete { id: String },
    /// 统计信息
    Stats,
    /// 导出历史 (json, csv)
    Export {
        #[arg(long, default_value = "json")]
        format: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Args {
    /// 将CLI参数转换为配置：先加载配置文件，再用命令行参数覆盖
    pub fn into_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref()).with_context(|| match &self.config {
            Some(path) => format!("⚠️ 无法读取配置文件 {:?}", path),
            None => "⚠️ 无法读取默认配置文件".to_string(),
        })?;

        // 覆盖LLM配置
        if let Some(provider_str) = &self.llm_provider {
            match provider_str.parse::<LLMProvider>() {
                Ok(provider) => config.llm.provider = provider,
                Err(_) => eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用 {}",
                    provider_str, config.llm.provider
                ),
            }
        }
        if let Some(api_key) = &self.llm_api_key {
            config.llm.api_key = api_key.clone();
        }
        if let Some(model_name) = &self.model_name {
            config.llm.model_name = Some(model_name.clone());
        }
        if let Some(ollama_url) = &self.ollama_url {
            config.llm.ollama_base_url = ollama_url.clone();
        }

        if let Some(max_retries) = self.max_retries {
            config.structure.max_retries = max_retries;
        }
        if let Command::Generate { no_enrich: true, .. } = self.command {
            config.structure.enrich = false;
        }

        // 历史记录配置
        if self.no_history {
            config.history.enabled = false;
        }
        if let Some(history_dir) = &self.history_dir {
            config.history.history_dir = history_dir.clone();
        }

        config.verbose = config.verbose || self.verbose;

        Ok(config)
    }
}

// Include tests
#[cfg(test)]
mod tests;
