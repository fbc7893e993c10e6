use std::sync::LazyLock;

use regex::Regex;

use crate::llm::client::types::ProviderError;

static AUTH_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b401\b|unauthori[sz]ed|invalid[ _-]?api[ _-]?key|api_key_invalid|incorrect api key|authentication")
        .ok()
});

static RATE_LIMIT_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b429\b|rate[ _-]?limit|quota|resource_exhausted|too many requests").ok()
});

fn matches(pattern: &Option<Regex>, message: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(message))
}

/// 根据错误信息把底层错误归类
pub fn classify_provider_error(provider: &str, message: &str) -> ProviderError {
    if matches(&AUTH_PATTERN, message) {
        ProviderError::Auth(provider.to_string())
    } else if matches(&RATE_LIMIT_PATTERN, message) {
        ProviderError::RateLimit(provider.to_string())
    } else {
        ProviderError::Provider(format!("{provider}: {message}"))
    }
}

/// 规范化 Ollama 地址：补全协议，去掉末尾的 `/api/generate` 与 `/`
pub fn normalize_ollama_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut url = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    while url.ends_with('/') {
        url.pop();
    }
    if let Some(stripped) = url.strip_suffix("/api/generate") {
        url = stripped.trim_end_matches('/').to_string();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_auth_errors() {
        for message in [
            "HTTP 401 Unauthorized",
            "Incorrect API key provided",
            "API_KEY_INVALID: API key not valid",
        ] {
            assert_eq!(
                classify_provider_error("openai", message),
                ProviderError::Auth("openai".into()),
                "{message}"
            );
        }
    }

    #[test]
    fn classifies_rate_limit_errors() {
        for message in ["status 429", "Rate limit reached", "QUOTA_EXCEEDED"] {
            assert_eq!(
                classify_provider_error("gemini", message),
                ProviderError::RateLimit("gemini".into()),
                "{message}"
            );
        }
    }

    #[test]
    fn other_errors_are_generic() {
        assert!(matches!(
            classify_provider_error("ollama", "connection refused"),
            ProviderError::Provider(m) if m.contains("connection refused")
        ));
        // 4010 不是 401
        assert!(matches!(
            classify_provider_error("ollama", "error code 4010"),
            ProviderError::Provider(_)
        ));
    }

    #[test]
    fn normalizes_ollama_urls() {
        assert_eq!(normalize_ollama_url("localhost:11434"), "http://localhost:11434");
        assert_eq!(
            normalize_ollama_url("http://gpu-box:11434/api/generate"),
            "http://gpu-box:11434"
        );
        assert_eq!(
            normalize_ollama_url("https://ollama.example.org/"),
            "https://ollama.example.org"
        );
        assert_eq!(normalize_ollama_url(" 10.0.0.5:11434/api/generate/ "), "http://10.0.0.5:11434");
    }
}
