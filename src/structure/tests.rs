#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use proptest::prelude::*;

    use crate::config::{LLMProvider, StructureConfig};
    use crate::llm::client::{GenerationRequest, ProviderError, TextGenerator};
    use crate::structure::candidate::parse_candidate_response;
    use crate::structure::*;

    /// 按顺序返回预设回复，并记录收到的提示词
    struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, ProviderError>>>,
        repeat_last: Option<Result<String, ProviderError>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                repeat_last: None,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn always(reply: Result<String, ProviderError>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(VecDeque::new()),
                repeat_last: Some(reply),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
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
            if let Some(reply) = self.replies.lock().unwrap().pop_front() {
                return reply;
            }
            self.repeat_last
                .clone()
                .unwrap_or_else(|| Err(ProviderError::Provider("script exhausted".into())))
        }
    }

    fn reply(smiles: &str, name: &str) -> Result<String, ProviderError> {
        Ok(format!("SMILES: {smiles}\nNAME: {name}\nSOURCE: PubChem"))
    }

    fn pipeline(generator: Arc<ScriptedGenerator>, max_retries: u32) -> StructurePipeline {
        let config = StructureConfig {
            max_retries,
            image_size: 200,
            ..StructureConfig::default()
        };
        StructurePipeline::new(generator, &config)
    }

    fn request(context: &str) -> StructureRequest {
        StructureRequest::new(context, GenerationRequest::new(LLMProvider::OpenAI, "sk-test"))
    }

    #[tokio::test]
    async fn first_valid_candidate_succeeds_without_fallback() {
        let generator = ScriptedGenerator::new(vec![reply("Oc1ccc(cc1)C(C)(C)C", "4-tert-butylphenol")]);
        let pipeline = pipeline(generator.clone(), 3);

        let outcome = pipeline
            .run(&request("Research on a common antioxidant for polymer stabilisation"))
            .await
            .unwrap();

        assert_eq!(outcome.attempts, 1);
        assert!(!outcome.used_fallback);
        assert_eq!(outcome.result.smiles, "Oc1ccc(cc1)C(C)(C)C");
        assert_eq!(outcome.result.name, "4-tert-butylphenol");
        assert!(!outcome.result.image_base64.is_empty());
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn unfixable_candidates_fall_back_to_simple_structure() {
        let generator = ScriptedGenerator::new(vec![
            reply("c1ccccc(", "broken"),
            reply("c1ccccc(", "broken"),
            reply("c1ccccc(", "broken"),
            reply("c1ccccc1", "benzene"),
        ]);
        let pipeline = pipeline(generator.clone(), 3);

        let outcome = pipeline.run(&request("aromatic solvents")).await.unwrap();

        assert!(outcome.used_fallback);
        assert_eq!(outcome.attempts, 4);
        assert_eq!(outcome.result.smiles, "c1ccccc1");
        assert_eq!(outcome.result.name, "benzene");

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 4);
        assert!(!prompts[0].contains("structurally simpler"));
        assert!(prompts[1].contains("structurally simpler"));
        assert!(prompts[3].contains("SIMPLEST"));
    }

    #[tokio::test]
    async fn exhausted_attempts_report_count_and_last_cause() {
        let generator = ScriptedGenerator::always(reply("c1ccccc(", "broken"));
        let pipeline = pipeline(generator.clone(), 3);

        let err = pipeline.run(&request("anything")).await.unwrap_err();

        match &err {
            StructureError::ExhaustedRetries { attempts, last } => {
                assert_eq!(*attempts, 4);
                assert!(matches!(**last, StructureError::StructuralValidation(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.status_class(), StatusClass::ClientError);
        assert_eq!(err.http_status(), 400);
        assert!(err.to_string().contains("4 attempts"));
        assert_eq!(generator.calls(), 4);
    }

    #[tokio::test]
    async fn provider_failures_are_retried_then_classified_as_server_errors() {
        let generator = ScriptedGenerator::always(Err(ProviderError::Auth("invalid key".into())));
        let pipeline = pipeline(generator.clone(), 2);

        let err = pipeline.run(&request("catalysis")).await.unwrap_err();

        assert!(matches!(err, StructureError::ExhaustedRetries { attempts: 3, .. }));
        assert_eq!(err.status_class(), StatusClass::ServerError);
        assert_eq!(err.http_status(), 401);
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test]
    async fn malformed_responses_count_against_the_budget() {
        let generator = ScriptedGenerator::new(vec![
            Ok("I would suggest aspirin.".to_string()),
            Err(ProviderError::Timeout(30)),
            reply("CC(=O)Oc1ccccc1C(=O)O", "aspirin"),
        ]);
        let pipeline = pipeline(generator.clone(), 3);

        let outcome = pipeline.run(&request("analgesics")).await.unwrap();
        assert_eq!(outcome.attempts, 3);
        assert!(!outcome.used_fallback);
    }

    #[tokio::test]
    async fn retry_bound_holds_for_any_budget() {
        for max_retries in 0..6 {
            let generator = ScriptedGenerator::always(Ok("nothing useful".to_string()));
            let pipeline = pipeline(generator.clone(), max_retries);

            let err = pipeline.run(&request("polymers")).await.unwrap_err();

            assert_eq!(generator.calls(), max_retries as usize + 1);
            assert!(matches!(
                err,
                StructureError::ExhaustedRetries { attempts, .. } if attempts == max_retries + 1
            ));
        }
    }

    #[tokio::test]
    async fn empty_context_is_rejected_before_any_call() {
        let generator = ScriptedGenerator::always(reply("CCO", "ethanol"));
        let pipeline = pipeline(generator.clone(), 3);

        let err = pipeline.run(&request("   \n")).await.unwrap_err();

        assert!(matches!(err, StructureError::EmptyContext));
        assert_eq!(err.status_class(), StatusClass::ClientError);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn render_failure_is_not_retried() {
        let generator = ScriptedGenerator::always(reply("CCO", "ethanol"));
        let config = StructureConfig {
            image_size: 0,
            ..StructureConfig::default()
        };
        let pipeline = StructurePipeline::new(generator.clone(), &config);

        let err = pipeline.run(&request("solvents")).await.unwrap_err();

        assert!(matches!(err, StructureError::ImageGeneration(_)));
        assert_eq!(err.status_class(), StatusClass::ServerError);
        assert_eq!(generator.calls(), 1);
    }

    #[test]
    fn validate_candidate_returns_sanitized_smiles() {
        let candidate = Candidate {
            smiles: " CC(=O)O(".to_string(),
            name: "acetic acid".to_string(),
        };
        // 补齐后为 CC(=O)O()，空分支不可解析
        assert!(matches!(
            validate_candidate(candidate),
            Err(StructureError::StructuralValidation(_))
        ));

        let candidate = Candidate {
            smiles: "CC(=O)O\t".to_string(),
            name: "acetic acid".to_string(),
        };
        assert_eq!(validate_candidate(candidate).unwrap().smiles, "CC(=O)O");
    }

    #[test]
    fn ring_mismatch_is_reported_with_labels() {
        let candidate = Candidate {
            smiles: "C1CC2CC1".to_string(),
            name: "x".to_string(),
        };
        match validate_candidate(candidate) {
            Err(StructureError::StructuralValidation(msg)) => assert!(msg.contains('2')),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn response_parsing() {
        let candidate =
            parse_candidate_response("Here you go\nNAME: phenol\n  SMILES: `Oc1ccccc1`\n").unwrap();
        assert_eq!(candidate.smiles, "Oc1ccccc1");
        assert_eq!(candidate.name, "phenol");

        let candidate = parse_candidate_response("SMILES: \"C C O\"\nNAME: ethanol").unwrap();
        assert_eq!(candidate.smiles, "CCO");

        assert!(matches!(
            parse_candidate_response("NAME: ethanol"),
            Err(StructureError::Parse(_))
        ));
        assert!(matches!(
            parse_candidate_response("SMILES: CCO"),
            Err(StructureError::Parse(_))
        ));
        assert!(matches!(
            parse_candidate_response("SMILES: ```\nNAME: nothing"),
            Err(StructureError::Parse(_))
        ));
        // 标记区分大小写
        assert!(parse_candidate_response("smiles: CCO\nname: ethanol").is_err());
    }

    #[test]
    fn report_omits_missing_enrichment() {
        let report = StructureReport::from(StructureResult {
            smiles: "CCO".into(),
            name: "ethanol".into(),
            image_base64: "AAAA".into(),
        });
        let json = serde_json::to_value(&report).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(!obj.contains_key("availability_info"));
    }

    proptest! {
        #[test]
        fn sanitizer_is_idempotent(raw in "\\PC{0,40}") {
            let once = sanitize_smiles(&raw);
            prop_assert_eq!(sanitize_smiles(&once), once);
        }

        #[test]
        fn sanitizer_balances_parentheses(raw in "[CNO()=#1-9\\[\\] ]{0,40}") {
            let out = sanitize_smiles(&raw);
            prop_assert_eq!(out.matches('(').count(), out.matches(')').count());
        }

        #[test]
        fn accepted_ring_labels_appear_twice(raw in "[CNOc=()1-4]{0,30}") {
            if ring_closures_paired(&raw) {
                for digit in '0'..='9' {
                    let n = raw.chars().filter(|&c| c == digit).count();
                    prop_assert!(n == 0 || n == 2, "label {} appears {} times", digit, n);
                }
            }
        }

        #[test]
        fn validation_implies_paired_ring_closures(raw in "[CNOc=()1-3]{1,20}") {
            let candidate = Candidate { smiles: raw, name: "x".into() };
            if let Ok(valid) = validate_candidate(candidate) {
                prop_assert!(ring_closures_paired(&valid.smiles));
                prop_assert!(crate::chem::validate_smiles(&valid.smiles));
            }
        }
    }
}
