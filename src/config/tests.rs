#[cfg(test)]
mod tests {
    use crate::config::{
        ChemicalInfoConfig, Config, HistoryConfig, LLMConfig, LLMProvider, StructureConfig,
    };
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert!(!config.verbose);
        assert_eq!(config.structure.max_retries, 3);
        assert!(config.history.enabled);
    }

    #[test]
    fn test_llm_provider_default() {
        let provider = LLMProvider::default();
        assert_eq!(provider, LLMProvider::OpenAI);
    }

    #[test]
    fn test_llm_provider_from_str() {
        assert_eq!(
            "openai".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenAI
        );
        assert_eq!(
            "gemini".parse::<LLMProvider>().unwrap(),
            LLMProvider::Gemini
        );
        assert_eq!(
            "Google".parse::<LLMProvider>().unwrap(),
            LLMProvider::Gemini
        );
        assert_eq!(
            "OLLAMA".parse::<LLMProvider>().unwrap(),
            LLMProvider::Ollama
        );

        assert!("invalid".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_llm_provider_display() {
        assert_eq!(LLMProvider::OpenAI.to_string(), "openai");
        assert_eq!(LLMProvider::Gemini.to_string(), "gemini");
        assert_eq!(LLMProvider::Ollama.to_string(), "ollama");
    }

    #[test]
    fn test_llm_config_default() {
        let config = LLMConfig::default();

        assert_eq!(config.provider, LLMProvider::OpenAI);
        // api_key may be empty if env var is not set
        assert!(config.model_name.is_none());
        assert_eq!(config.default_model(LLMProvider::OpenAI), "gpt-4");
        assert_eq!(config.default_model(LLMProvider::Gemini), "gemini-2.5-flash");
        assert_eq!(config.default_model(LLMProvider::Ollama), "llama3.1:latest");
        assert_eq!(config.ollama_base_url, "http://localhost:11434");
    }

    #[test]
    fn test_timeouts_per_provider() {
        let config = LLMConfig::default();

        assert_eq!(config.timeout_for(LLMProvider::OpenAI), Duration::from_secs(30));
        assert_eq!(config.timeout_for(LLMProvider::Gemini), Duration::from_secs(30));
        assert_eq!(config.timeout_for(LLMProvider::Ollama), Duration::from_secs(120));
    }

    #[test]
    fn test_structure_config_default() {
        let config = StructureConfig::default();

        assert_eq!(config.max_retries, 3);
        assert_eq!(config.image_size, 400);
        assert_eq!(config.similarity_threshold, 0.8);
        assert_eq!(config.availability_threshold, 50);
        assert!(config.enrich);
    }

    #[test]
    fn test_chemical_info_and_history_defaults() {
        let info = ChemicalInfoConfig::default();
        assert!(info.pubchem_base_url.starts_with("https://pubchem.ncbi.nlm.nih.gov"));
        assert_eq!(info.timeout_secs, 10);
        assert_eq!(info.max_similar, 5);

        let history = HistoryConfig::default();
        assert_eq!(history.history_dir, PathBuf::from("data/history"));
        assert_eq!(history.max_sessions, 100);
    }

    #[test]
    fn test_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("chem-assistant.toml");

        let content = r#"
verbose = true

[llm]
provider = "ollama"
api_key = "unused"
model_name = "mistral:7b"
ollama_base_url = "gpu-box:11434"

[structure]
max_retries = 5
enrich = false

[history]
enabled = false
history_dir = "/tmp/chem-history"
"#;
        std::fs::write(&config_path, content).unwrap();

        let config = Config::from_file(&config_path).unwrap();

        assert!(config.verbose);
        assert_eq!(config.llm.provider, LLMProvider::Ollama);
        assert_eq!(config.llm.model_name.as_deref(), Some("mistral:7b"));
        assert_eq!(config.llm.ollama_base_url, "gpu-box:11434");
        // 未写出的字段取默认值
        assert_eq!(config.llm.request_timeout_secs, 30);
        assert_eq!(config.structure.max_retries, 5);
        assert_eq!(config.structure.image_size, 400);
        assert!(!config.structure.enrich);
        assert!(!config.history.enabled);
        assert_eq!(config.history.history_dir, PathBuf::from("/tmp/chem-history"));
        assert_eq!(config.chemical_info.max_similar, 5);
    }

    #[test]
    fn test_config_from_file_rejects_unknown_provider() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        std::fs::write(&config_path, "[llm]\nprovider = \"nope\"\n").unwrap();

        assert!(Config::from_file(&config_path).is_err());
    }

    #[test]
    fn test_config_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");

        assert!(Config::from_file(&missing).is_err());
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_config_roundtrips_through_toml() {
        let mut config = Config::default();
        config.llm.provider = LLMProvider::Gemini;
        config.structure.max_retries = 2;

        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.llm.provider, LLMProvider::Gemini);
        assert_eq!(parsed.structure.max_retries, 2);
    }
}
