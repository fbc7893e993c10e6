use thiserror::Error;

use crate::llm::client::ProviderError;

/// 面向调用方的错误类别：输入/化学问题 vs 基础设施问题
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    ClientError,
    ServerError,
}

impl StatusClass {
    pub fn is_client_error(self) -> bool {
        self == StatusClass::ClientError
    }
}

/// 结构生成流水线的错误
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("research context is empty")]
    EmptyContext,

    #[error("text generation failed: {0}")]
    Generation(#[from] ProviderError),

    #[error("could not parse model response: {0}")]
    Parse(String),

    #[error("structure failed validation: {0}")]
    StructuralValidation(String),

    #[error("failed to render structure image: {0}")]
    ImageGeneration(String),

    #[error("failed to generate a valid structure after {attempts} attempts: {last}")]
    ExhaustedRetries {
        attempts: u32,
        last: Box<StructureError>,
    },
}

impl StructureError {
    pub fn status_class(&self) -> StatusClass {
        match self {
            StructureError::EmptyContext
            | StructureError::Parse(_)
            | StructureError::StructuralValidation(_) => StatusClass::ClientError,
            StructureError::Generation(_) | StructureError::ImageGeneration(_) => {
                StatusClass::ServerError
            }
            StructureError::ExhaustedRetries { last, .. } => last.status_class(),
        }
    }

    /// 对应的 HTTP 状态码，供外层服务使用
    pub fn http_status(&self) -> u16 {
        match self {
            StructureError::Generation(ProviderError::Auth(_)) => 401,
            StructureError::Generation(ProviderError::RateLimit(_)) => 429,
            StructureError::Generation(ProviderError::Timeout(_)) => 504,
            StructureError::ExhaustedRetries { last, .. } => match last.status_class() {
                StatusClass::ClientError => 400,
                StatusClass::ServerError => last.http_status(),
            },
            other => match other.status_class() {
                StatusClass::ClientError => 400,
                StatusClass::ServerError => 500,
            },
        }
    }

    /// 在重试预算内是否应当继续尝试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StructureError::Generation(_)
                | StructureError::Parse(_)
                | StructureError::StructuralValidation(_)
        )
    }
}
