#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::chemical_info::{AvailabilityInfo, CompoundRecord, score_availability};
    use crate::config::LLMProvider;
    use crate::llm::client::{GenerationRequest, ProviderError, TextGenerator};
    use crate::proposal::{
        ProposalError, ProposalWriter, build_rationale_prompt, build_summary_prompt,
    };

    /// 依次返回给定回复，并记录收到的提示词
    struct ScriptedGenerator {
        replies: Mutex<Vec<Result<String, ProviderError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn replying(replies: &[&str]) -> Arc<Self> {
            Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            _request: &GenerationRequest,
            prompt: &str,
        ) -> Result<String, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(LLMProvider::Gemini, "test-key")
    }

    fn availability(score: u32) -> AvailabilityInfo {
        let mut info = score_availability(
            Some(CompoundRecord {
                cid: "702".into(),
                ..CompoundRecord::default()
            }),
            None,
        );
        info.availability_score = score;
        info
    }

    #[tokio::test]
    async fn draft_chains_summary_proposal_and_reason() {
        let generator = ScriptedGenerator::replying(&[
            "  Perovskite films degrade under humidity.  ",
            "Study hydrophobic ammonium additives.",
            "Phenethylammonium iodide passivates grain boundaries.",
        ]);
        let writer = ProposalWriter::new(generator.clone());

        let proposal = writer
            .draft(&request(), " perovskite stability ", "Notes on moisture-induced degradation")
            .await
            .unwrap();

        assert_eq!(proposal.topic, "perovskite stability");
        assert_eq!(proposal.summary, "Perovskite films degrade under humidity.");
        assert_eq!(proposal.proposal, "Study hydrophobic ammonium additives.");
        assert_eq!(proposal.reason, "Phenethylammonium iodide passivates grain boundaries.");

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains("'perovskite stability'"));
        assert!(prompts[0].contains("Notes on moisture-induced degradation"));
        // 提案以摘要为输入，理由同时引用摘要与提案
        assert!(prompts[1].contains("Perovskite films degrade under humidity."));
        assert!(prompts[1].contains("2-3 paragraphs"));
        assert!(prompts[2].contains("Perovskite films degrade under humidity."));
        assert!(prompts[2].contains("Study hydrophobic ammonium additives."));
    }

    #[tokio::test]
    async fn draft_rejects_empty_input_without_calling_the_model() {
        let generator = ScriptedGenerator::replying(&["unused"]);
        let writer = ProposalWriter::new(generator.clone());

        let err = writer.draft(&request(), "  ", "material").await.unwrap_err();
        assert!(matches!(err, ProposalError::EmptyInput("research topic")));
        let err = writer.draft(&request(), "topic", "\n").await.unwrap_err();
        assert!(matches!(err, ProposalError::EmptyInput("research material")));
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn draft_stops_at_the_first_failure() {
        let generator = ScriptedGenerator::new(vec![
            Ok("summary".into()),
            Err(ProviderError::RateLimit("gemini".into())),
        ]);
        let writer = ProposalWriter::new(generator.clone());

        let err = writer.draft(&request(), "topic", "material").await.unwrap_err();
        assert!(matches!(err, ProposalError::Generation(ProviderError::RateLimit(_))));
        assert_eq!(generator.prompts().len(), 2);

        let generator = ScriptedGenerator::replying(&["   "]);
        let err = ProposalWriter::new(generator)
            .draft(&request(), "topic", "material")
            .await
            .unwrap_err();
        assert!(matches!(err, ProposalError::EmptyResponse("summary")));
    }

    #[tokio::test]
    async fn refine_keeps_feedback_as_reason() {
        let generator = ScriptedGenerator::replying(&["Use a greener solvent system."]);
        let writer = ProposalWriter::new(generator.clone());

        let refined = writer
            .refine(&request(), "Original plan in DMF.", "  avoid DMF  ")
            .await
            .unwrap();

        assert_eq!(refined.new_proposal, "Use a greener solvent system.");
        assert_eq!(refined.refinement_reason, "avoid DMF");
        let prompt = &generator.prompts()[0];
        assert!(prompt.contains("Original Proposal:\nOriginal plan in DMF."));
        assert!(prompt.contains("User Feedback:\navoid DMF"));

        assert!(matches!(
            writer.refine(&request(), "plan", "").await,
            Err(ProposalError::EmptyInput("feedback"))
        ));
    }

    #[tokio::test]
    async fn rationale_uses_availability_section() {
        let generator = ScriptedGenerator::replying(&["SAR discussion"]);
        let writer = ProposalWriter::new(generator.clone());

        let text = writer
            .design_rationale(&request(), "CCO", "", "green solvents", Some(&availability(80)))
            .await
            .unwrap();

        assert_eq!(text, "SAR discussion");
        let prompt = &generator.prompts()[0];
        // 没有名称时用 SMILES 代替
        assert!(prompt.contains("Target Molecule: CCO"));
        assert!(prompt.contains("High commercial availability (score: 80/100)"));
    }

    #[test]
    fn commercial_section_follows_score_bands() {
        let prompt = |info: Option<&AvailabilityInfo>| build_rationale_prompt("CCO", "ethanol", "ctx", info);

        assert!(prompt(Some(&availability(70))).contains("High commercial availability (score: 70/100)"));
        assert!(prompt(Some(&availability(69))).contains("Moderate commercial availability (score: 69/100)"));
        assert!(prompt(Some(&availability(40))).contains("Moderate commercial availability"));
        assert!(prompt(Some(&availability(39))).contains("Low commercial availability (score: 39/100)"));
        assert!(prompt(None).contains("Commercial availability assessment needed"));

        let full = prompt(None);
        for section in [
            "Structure-Activity Relationships",
            "Computational Predictions",
            "Synthetic Feasibility",
            "Commercial Considerations",
            "Safety and Handling",
            "Alternative Considerations",
        ] {
            assert!(full.contains(section), "{section}");
        }
    }

    #[test]
    fn summary_prompt_names_topic_and_material() {
        let prompt = build_summary_prompt("MOF catalysts", "abstract text");
        assert!(prompt.contains("'MOF catalysts'"));
        assert!(prompt.ends_with("Material:\nabstract text"));
    }
}
