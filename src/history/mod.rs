//! 结构生成会话历史，保存在单个 JSON 文件中

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::HistoryConfig;
use crate::llm::client::GenerationRequest;
use crate::structure::PipelineOutcome;

const HISTORY_FILE: &str = "structure_history.json";
const MAX_TOPIC_CHARS: usize = 200;
const MAX_TAGS: usize = 10;
const TOP_TAGS: usize = 10;

const CHEMISTRY_TERMS: [&str; 24] = [
    "synthesis",
    "catalysis",
    "polymer",
    "organic",
    "inorganic",
    "materials",
    "nanomaterials",
    "drug",
    "pharmaceutical",
    "battery",
    "solar",
    "energy",
    "environmental",
    "green",
    "sustainable",
    "mof",
    "cof",
    "metal",
    "oxide",
    "carbon",
    "graphene",
    "photochemistry",
    "electrochemistry",
    "biochemistry",
];

const CSV_HEADERS: [&str; 11] = [
    "session_id",
    "topic",
    "timestamp",
    "api_provider",
    "model_name",
    "status",
    "smiles",
    "name",
    "attempts",
    "used_fallback",
    "duration_seconds",
];

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
}

pub type HistoryResult<T> = Result<T, HistoryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Started,
    Completed,
    Failed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Started => write!(f, "started"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// 一次结构生成会话
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub topic: String,
    pub api_provider: String,
    #[serde(default)]
    pub model_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: SessionStatus,
    #[serde(default)]
    pub smiles: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub used_fallback: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SessionRecord {
    fn csv_field(&self, header: &str) -> String {
        match header {
            "session_id" => self.session_id.clone(),
            "topic" => self.topic.clone(),
            "timestamp" => self.timestamp.to_rfc3339(),
            "api_provider" => self.api_provider.clone(),
            "model_name" => self.model_name.clone().unwrap_or_default(),
            "status" => self.status.to_string(),
            "smiles" => self.smiles.clone().unwrap_or_default(),
            "name" => self.name.clone().unwrap_or_default(),
            "attempts" => self.attempts.to_string(),
            "used_fallback" => self.used_fallback.to_string(),
            "duration_seconds" => self
                .duration_seconds
                .map(|d| format!("{d:.1}"))
                .unwrap_or_default(),
            _ => String::new(),
        }
    }
}

/// 历史统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStatistics {
    pub total_sessions: usize,
    pub completed_sessions: usize,
    pub failed_sessions: usize,
    pub providers_used: BTreeMap<String, usize>,
    pub most_common_tags: Vec<(String, usize)>,
    pub avg_session_duration: f64,
    pub avg_attempts: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(HistoryError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// 历史记录存储。所有读-改-写都在同一把锁内完成。
pub struct HistoryStore {
    config: HistoryConfig,
    lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            lock: Mutex::new(()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn path(&self) -> PathBuf {
        self.config.history_dir.join(HISTORY_FILE)
    }

    async fn load(&self) -> HistoryResult<Vec<SessionRecord>> {
        let path = self.path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str(&content) {
            Ok(sessions) => Ok(sessions),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "history file is corrupt, starting empty");
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, sessions: &[SessionRecord]) -> HistoryResult<()> {
        fs::create_dir_all(&self.config.history_dir).await?;
        let content = serde_json::to_string_pretty(sessions)?;
        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// 新建会话并返回其 ID；禁用时返回 None
    pub async fn create_session(
        &self,
        context: &str,
        request: &GenerationRequest,
    ) -> HistoryResult<Option<String>> {
        if !self.config.enabled {
            return Ok(None);
        }

        let timestamp = Utc::now();
        let session_id = session_id(context, &timestamp);
        let record = SessionRecord {
            session_id: session_id.clone(),
            topic: context.chars().take(MAX_TOPIC_CHARS).collect(),
            api_provider: request.provider.to_string(),
            model_name: request.model_name.clone(),
            timestamp,
            status: SessionStatus::Started,
            smiles: None,
            name: None,
            attempts: 0,
            used_fallback: false,
            error: None,
            last_updated: None,
            duration_seconds: None,
            tags: extract_tags(context),
        };

        let _guard = self.lock.lock().await;
        let mut sessions = self.load().await?;
        sessions.insert(0, record);
        sessions.truncate(self.config.max_sessions.max(1));
        self.save(&sessions).await?;

        debug!(session_id, "history session created");
        Ok(Some(session_id))
    }

    async fn update<F>(&self, session_id: &str, apply: F) -> HistoryResult<bool>
    where
        F: FnOnce(&mut SessionRecord),
    {
        if !self.config.enabled {
            return Ok(false);
        }

        let _guard = self.lock.lock().await;
        let mut sessions = self.load().await?;
        let Some(record) = sessions.iter_mut().find(|s| s.session_id == session_id) else {
            return Ok(false);
        };

        apply(record);
        let now = Utc::now();
        record.last_updated = Some(now);
        if record.status != SessionStatus::Started {
            let elapsed = (now - record.timestamp).num_milliseconds().max(0) as f64 / 1000.0;
            record.duration_seconds = Some(elapsed);
        }

        self.save(&sessions).await?;
        Ok(true)
    }

    pub async fn complete_session(
        &self,
        session_id: &str,
        outcome: &PipelineOutcome,
    ) -> HistoryResult<bool> {
        self.update(session_id, |record| {
            record.status = SessionStatus::Completed;
            record.smiles = Some(outcome.result.smiles.clone());
            record.name = Some(outcome.result.name.clone());
            record.attempts = outcome.attempts;
            record.used_fallback = outcome.used_fallback;
            record.error = None;
        })
        .await
    }

    pub async fn fail_session(
        &self,
        session_id: &str,
        error: &str,
        attempts: u32,
    ) -> HistoryResult<bool> {
        self.update(session_id, |record| {
            record.status = SessionStatus::Failed;
            record.error = Some(error.to_string());
            record.attempts = attempts;
        })
        .await
    }

    /// 最新的在前；filter 对主题和标签做不区分大小写的包含匹配
    pub async fn list(&self, limit: usize, filter: Option<&str>) -> HistoryResult<Vec<SessionRecord>> {
        if !self.config.enabled {
            return Ok(Vec::new());
        }
        let _guard = self.lock.lock().await;
        let sessions = self.load().await?;

        let needle = filter
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_lowercase);
        Ok(sessions
            .into_iter()
            .filter(|s| match &needle {
                Some(n) => {
                    s.topic.to_lowercase().contains(n)
                        || s.tags.iter().any(|t| t.to_lowercase().contains(n))
                }
                None => true,
            })
            .take(limit)
            .collect())
    }

    pub async fn get(&self, session_id: &str) -> HistoryResult<Option<SessionRecord>> {
        if !self.config.enabled {
            return Ok(None);
        }
        let _guard = self.lock.lock().await;
        let sessions = self.load().await?;
        Ok(sessions.into_iter().find(|s| s.session_id == session_id))
    }

    pub async fn delete(&self, session_id: &str) -> HistoryResult<bool> {
        if !self.config.enabled {
            return Ok(false);
        }
        let _guard = self.lock.lock().await;
        let mut sessions = self.load().await?;
        let before = sessions.len();
        sessions.retain(|s| s.session_id != session_id);
        if sessions.len() == before {
            return Ok(false);
        }
        self.save(&sessions).await?;
        Ok(true)
    }

    pub async fn statistics(&self) -> HistoryResult<HistoryStatistics> {
        if !self.config.enabled {
            return Ok(HistoryStatistics::default());
        }
        let _guard = self.lock.lock().await;
        let sessions = self.load().await?;
        Ok(compute_statistics(&sessions))
    }

    pub async fn export(&self, format: ExportFormat) -> HistoryResult<String> {
        let sessions = if self.config.enabled {
            let _guard = self.lock.lock().await;
            self.load().await?
        } else {
            Vec::new()
        };

        match format {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(&sessions)?),
            ExportFormat::Csv => Ok(to_csv(&sessions)),
        }
    }
}

/// MD5(`context_timestamp`) 的前 12 位十六进制
pub fn session_id(context: &str, timestamp: &DateTime<Utc>) -> String {
    let mut hasher = Md5::new();
    hasher.update(format!("{}_{}", context, timestamp.to_rfc3339()).as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..12].to_string()
}

/// 从研究背景中提取标签：化学领域词汇、含数字的词、较长的纯字母词
pub fn extract_tags(context: &str) -> Vec<String> {
    let lower = context.to_lowercase();
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: &str| {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    };

    for term in CHEMISTRY_TERMS {
        if lower.contains(term) {
            push(term);
        }
    }

    for word in lower.split_whitespace() {
        let word = word.trim_matches(|c: char| c.is_ascii_punctuation());
        let has_digit = word.chars().any(|c| c.is_ascii_digit());
        let has_alpha = word.chars().any(char::is_alphabetic);
        let long_alpha = word.chars().count() > 6 && word.chars().all(char::is_alphabetic);
        if (has_digit && has_alpha) || long_alpha {
            push(word);
        }
    }

    tags.truncate(MAX_TAGS);
    tags
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn compute_statistics(sessions: &[SessionRecord]) -> HistoryStatistics {
    let mut stats = HistoryStatistics {
        total_sessions: sessions.len(),
        ..HistoryStatistics::default()
    };
    if sessions.is_empty() {
        return stats;
    }

    let mut tag_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut durations = Vec::new();
    let mut attempts = Vec::new();

    for session in sessions {
        match session.status {
            SessionStatus::Completed => stats.completed_sessions += 1,
            SessionStatus::Failed => stats.failed_sessions += 1,
            SessionStatus::Started => {}
        }
        *stats
            .providers_used
            .entry(session.api_provider.clone())
            .or_default() += 1;
        for tag in &session.tags {
            *tag_counts.entry(tag.as_str()).or_default() += 1;
        }
        if let Some(d) = session.duration_seconds.filter(|d| *d > 0.0) {
            durations.push(d);
        }
        if session.attempts > 0 {
            attempts.push(session.attempts as f64);
        }
    }

    let mut tags: Vec<(String, usize)> = tag_counts
        .into_iter()
        .map(|(tag, n)| (tag.to_string(), n))
        .collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    tags.truncate(TOP_TAGS);
    stats.most_common_tags = tags;

    if !durations.is_empty() {
        stats.avg_session_duration = round1(durations.iter().sum::<f64>() / durations.len() as f64);
    }
    if !attempts.is_empty() {
        stats.avg_attempts = round1(attempts.iter().sum::<f64>() / attempts.len() as f64);
    }
    stats
}

fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn to_csv(sessions: &[SessionRecord]) -> String {
    let mut lines = vec![CSV_HEADERS.join(",")];
    for session in sessions {
        let row: Vec<String> = CSV_HEADERS
            .iter()
            .map(|h| escape_csv(&session.csv_field(h)))
            .collect();
        lines.push(row.join(","));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests;
