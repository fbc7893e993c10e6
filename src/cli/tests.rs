#[cfg(test)]
mod tests {
    use crate::cli::{Args, Command, HistoryCommand};
    use crate::config::LLMProvider;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_generate_with_inline_context() {
        let args = Args::try_parse_from([
            "chem-research-assistant",
            "generate",
            "--context",
            "Biodegradable polymers for packaging",
        ])
        .unwrap();

        assert!(!args.verbose);
        assert!(!args.no_history);
        assert_eq!(
            args.command,
            Command::Generate {
                context: Some("Biodegradable polymers for packaging".to_string()),
                context_file: None,
                output: None,
                no_enrich: false,
            }
        );
    }

    #[test]
    fn test_generate_requires_exactly_one_context_source() {
        assert!(Args::try_parse_from(["chem-research-assistant", "generate"]).is_err());
        assert!(
            Args::try_parse_from([
                "chem-research-assistant",
                "generate",
                "--context",
                "x",
                "--context-file",
                "ctx.txt",
            ])
            .is_err()
        );
        assert!(
            Args::try_parse_from(["chem-research-assistant", "generate", "--context-file", "ctx.txt"])
                .is_ok()
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "chem-research-assistant",
            "validate",
            "CCO",
            "-v",
            "--llm-provider",
            "ollama",
        ])
        .unwrap();

        assert!(args.verbose);
        assert_eq!(args.llm_provider.as_deref(), Some("ollama"));
        assert_eq!(
            args.command,
            Command::Validate {
                smiles: "CCO".to_string()
            }
        );
    }

    #[test]
    fn test_render_and_history_subcommands() {
        let args = Args::try_parse_from([
            "chem-research-assistant",
            "render",
            "c1ccccc1",
            "-o",
            "benzene.png",
            "--size",
            "256",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            Command::Render {
                smiles: "c1ccccc1".to_string(),
                output: PathBuf::from("benzene.png"),
                size: Some(256),
            }
        );

        let args = Args::try_parse_from(["chem-research-assistant", "history", "list"]).unwrap();
        assert_eq!(
            args.command,
            Command::History(HistoryCommand::List {
                limit: 20,
                filter: None
            })
        );

        let args = Args::try_parse_from([
            "chem-research-assistant",
            "history",
            "export",
            "--format",
            "csv",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            Command::History(HistoryCommand::Export {
                format: "csv".to_string(),
                output: None
            })
        );
    }

    #[test]
    fn test_proposal_subcommands() {
        let args = Args::try_parse_from([
            "chem-research-assistant",
            "propose",
            "--topic",
            "perovskite stability",
            "--context-file",
            "notes.txt",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            Command::Propose {
                topic: "perovskite stability".to_string(),
                context: None,
                context_file: Some(PathBuf::from("notes.txt")),
                output: None,
            }
        );
        assert!(Args::try_parse_from(["chem-research-assistant", "propose", "--context", "x"]).is_err());

        let args = Args::try_parse_from([
            "chem-research-assistant",
            "refine",
            "--proposal-file",
            "proposal.json",
            "--feedback",
            "cheaper reagents",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            Command::Refine {
                proposal_file: PathBuf::from("proposal.json"),
                feedback: "cheaper reagents".to_string(),
                output: None,
            }
        );

        let args = Args::try_parse_from([
            "chem-research-assistant",
            "rationale",
            "CCO",
            "--context",
            "green solvents",
            "--offline",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            Command::Rationale {
                smiles: "CCO".to_string(),
                name: String::new(),
                context: Some("green solvents".to_string()),
                context_file: None,
                offline: true,
                output: None,
            }
        );
    }

    #[test]
    fn test_render_size_is_bounded() {
        for size in ["0", "4097", "100000"] {
            assert!(
                Args::try_parse_from(["chem-research-assistant", "render", "C", "-o", "a.png", "--size", size])
                    .is_err(),
                "{size}"
            );
        }
        assert!(
            Args::try_parse_from(["chem-research-assistant", "render", "C", "-o", "a.png", "--size", "4096"])
                .is_ok()
        );
    }

    #[test]
    fn test_into_config_overrides_file_values() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("chem.toml");
        std::fs::write(
            &config_path,
            r#"
[llm]
provider = "gemini"
api_key = "from-file"

[structure]
max_retries = 5
"#,
        )
        .unwrap();

        let args = Args::try_parse_from([
            "chem-research-assistant",
            "--config",
            config_path.to_str().unwrap(),
            "--llm-api-key",
            "from-cli",
            "--model-name",
            "gemini-2.0-pro",
            "--max-retries",
            "2",
            "--no-history",
            "generate",
            "--context",
            "x",
            "--no-enrich",
        ])
        .unwrap();
        let config = args.into_config().unwrap();

        assert_eq!(config.llm.provider, LLMProvider::Gemini);
        assert_eq!(config.llm.api_key, "from-cli");
        assert_eq!(config.llm.model_name.as_deref(), Some("gemini-2.0-pro"));
        assert_eq!(config.structure.max_retries, 2);
        assert!(!config.structure.enrich);
        assert!(!config.history.enabled);
    }

    #[test]
    fn test_unknown_provider_keeps_configured_one() {
        let args = Args::try_parse_from([
            "chem-research-assistant",
            "--llm-provider",
            "anthropic",
            "--ollama-url",
            "gpu-box:11434",
            "--history-dir",
            "/tmp/history",
            "check",
        ])
        .unwrap();
        let config = args.into_config().unwrap();

        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
        assert_eq!(config.llm.ollama_base_url, "gpu-box:11434");
        assert_eq!(config.history.history_dir, PathBuf::from("/tmp/history"));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = Args::try_parse_from([
            "chem-research-assistant",
            "--config",
            "/definitely/not/here.toml",
            "check",
        ])
        .unwrap();
        assert!(args.into_config().is_err());
    }
}
