#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::config::{HistoryConfig, LLMProvider};
    use crate::history::*;
    use crate::llm::client::GenerationRequest;
    use crate::structure::{PipelineOutcome, StructureResult};

    fn store(dir: &TempDir, max_sessions: usize) -> HistoryStore {
        HistoryStore::new(HistoryConfig {
            enabled: true,
            history_dir: dir.path().join("history"),
            max_sessions,
        })
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(LLMProvider::Gemini, "key").with_model("gemini-2.5-flash")
    }

    fn outcome(smiles: &str, attempts: u32) -> PipelineOutcome {
        PipelineOutcome {
            result: StructureResult {
                smiles: smiles.to_string(),
                name: "compound".to_string(),
                image_base64: String::new(),
            },
            attempts,
            used_fallback: false,
        }
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 100);

        let id = store
            .create_session("Graphene oxide membranes for water treatment", &request())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(id.len(), 12);
        assert!(store.path().exists());

        let record = store.get(&id).await.unwrap().unwrap();
        assert_eq!(record.status, SessionStatus::Started);
        assert_eq!(record.api_provider, "gemini");
        assert_eq!(record.model_name.as_deref(), Some("gemini-2.5-flash"));

        assert!(store.complete_session(&id, &outcome("O=C=O", 2)).await.unwrap());
        let record = store.get(&id).await.unwrap().unwrap();
        assert_eq!(record.status, SessionStatus::Completed);
        assert_eq!(record.smiles.as_deref(), Some("O=C=O"));
        assert_eq!(record.attempts, 2);
        assert!(record.last_updated.is_some());
        assert!(record.duration_seconds.is_some());

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert!(store.get(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_session_updates_are_ignored() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 100);
        assert!(!store.fail_session("missing", "boom", 1).await.unwrap());
    }

    #[tokio::test]
    async fn newest_first_and_capped() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 3);

        for i in 0..5 {
            store
                .create_session(&format!("topic number {i}"), &request())
                .await
                .unwrap();
        }

        let sessions = store.list(10, None).await.unwrap();
        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions[0].topic, "topic number 4");
        assert_eq!(sessions[2].topic, "topic number 2");

        assert_eq!(store.list(1, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn filter_matches_topic_and_tags() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 100);
        store
            .create_session("Porous MOF sorbents for CO2 capture", &request())
            .await
            .unwrap();
        store
            .create_session("Perovskite solar absorbers", &request())
            .await
            .unwrap();

        let mof = store.list(10, Some("mof")).await.unwrap();
        assert_eq!(mof.len(), 1);
        assert!(mof[0].tags.contains(&"co2".to_string()));

        let solar = store.list(10, Some("SOLAR")).await.unwrap();
        assert_eq!(solar.len(), 1);
        assert_eq!(store.list(10, Some("  ")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn statistics_and_export() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 100);

        let a = store
            .create_session("catalysis with palladium, \"green\" route", &request())
            .await
            .unwrap()
            .unwrap();
        let b = store
            .create_session("polymer catalysis", &GenerationRequest::new(LLMProvider::Ollama, ""))
            .await
            .unwrap()
            .unwrap();
        store.complete_session(&a, &outcome("CCO", 1)).await.unwrap();
        store.fail_session(&b, "exhausted", 4).await.unwrap();

        let stats = store.statistics().await.unwrap();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.completed_sessions, 1);
        assert_eq!(stats.failed_sessions, 1);
        assert_eq!(stats.providers_used["gemini"], 1);
        assert_eq!(stats.providers_used["ollama"], 1);
        assert_eq!(stats.most_common_tags[0], ("catalysis".to_string(), 2));
        assert_eq!(stats.avg_attempts, 2.5);

        let csv = store.export(ExportFormat::Csv).await.unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("session_id,topic,timestamp"));
        assert!(csv.contains("\"catalysis with palladium, \"\"green\"\" route\""));

        let json = store.export(ExportFormat::Json).await.unwrap();
        let parsed: Vec<SessionRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[tokio::test]
    async fn disabled_store_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(HistoryConfig {
            enabled: false,
            history_dir: dir.path().join("history"),
            max_sessions: 100,
        });

        assert!(store.create_session("anything", &request()).await.unwrap().is_none());
        assert!(store.list(10, None).await.unwrap().is_empty());
        assert_eq!(store.statistics().await.unwrap().total_sessions, 0);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 100);
        std::fs::create_dir_all(dir.path().join("history")).unwrap();
        std::fs::write(store.path(), "{not json").unwrap();

        assert!(store.list(10, None).await.unwrap().is_empty());
        store.create_session("recovery", &request()).await.unwrap();
        assert_eq!(store.list(10, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_sessions_are_all_recorded() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(store(&dir, 100));

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create_session(&format!("parallel topic {i}"), &request())
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.list(100, None).await.unwrap().len(), 8);
    }

    #[test]
    fn tag_extraction() {
        let tags = extract_tags("Synthesis of TiO2 nanoparticles for photocatalysis, a sustainable route");
        assert!(tags.contains(&"synthesis".to_string()));
        assert!(tags.contains(&"sustainable".to_string()));
        assert!(tags.contains(&"tio2".to_string()));
        assert!(tags.contains(&"nanoparticles".to_string()));
        assert!(tags.contains(&"photocatalysis".to_string()));
        assert!(!tags.contains(&"route".to_string()));

        let mut deduped = tags.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), tags.len());

        let long = "alphabetical ".repeat(5) + &(0..20).map(|i| format!("x{i} ")).collect::<String>();
        assert!(extract_tags(&long).len() <= 10);
    }

    #[test]
    fn session_ids_are_stable() {
        let ts = chrono::DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        assert_eq!(session_id("ctx", &ts), session_id("ctx", &ts));
        assert_ne!(session_id("ctx", &ts), session_id("other", &ts));
    }

    #[test]
    fn export_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!(matches!(
            "xml".parse::<ExportFormat>(),
            Err(HistoryError::UnsupportedFormat(_))
        ));
    }
}
