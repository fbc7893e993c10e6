//! 结构生成流水线：候选生成 -> 清洗 -> 环闭合预检 -> 解析校验 -> 渲染，
//! 带有限次重试与一次兜底请求。

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::chem::{parse_smiles, render_png_base64};
use crate::config::StructureConfig;
use crate::llm::client::TextGenerator;

pub mod candidate;
pub mod error;
pub mod sanitizer;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

pub use candidate::{Candidate, CandidateGenerator};
pub use error::{StatusClass, StructureError};
pub use sanitizer::{ring_closures_paired, sanitize_smiles};
pub use state::{AttemptOutcome, PipelineState};
pub use types::{PipelineOutcome, StructureReport, StructureRequest, StructureResult};

use sanitizer::unpaired_ring_labels;
use state::{initial_state, transition};

#[derive(Clone)]
pub struct StructurePipeline {
    candidates: CandidateGenerator,
    max_retries: u32,
    image_size: u32,
}

impl StructurePipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &StructureConfig) -> Self {
        Self {
            candidates: CandidateGenerator::new(generator),
            max_retries: config.max_retries,
            image_size: config.image_size,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// 生成一个通过校验的结构
    pub async fn generate(
        &self,
        request: &StructureRequest,
    ) -> Result<StructureResult, StructureError> {
        self.run(request).await.map(|outcome| outcome.result)
    }

    /// 与 [`generate`](Self::generate) 相同，但同时返回尝试次数与是否使用了兜底
    pub async fn run(&self, request: &StructureRequest) -> Result<PipelineOutcome, StructureError> {
        if request.context.trim().is_empty() {
            return Err(StructureError::EmptyContext);
        }

        let mut state = initial_state(self.max_retries);
        let mut attempts = 0u32;
        let mut last_error = None;

        while !state.is_terminal() {
            let generated = match state {
                PipelineState::Attempting(i) => {
                    debug!(attempt = i, "requesting candidate structure");
                    self.candidates
                        .generate(&request.generation, &request.context, i)
                        .await
                }
                PipelineState::FallbackAttempting => {
                    info!(attempts, "primary attempts exhausted, requesting fallback structure");
                    self.candidates
                        .generate_fallback(&request.generation, &request.context)
                        .await
                }
                PipelineState::Succeeded | PipelineState::Failed => break,
            };
            attempts += 1;

            match generated.and_then(validate_candidate) {
                Ok(candidate) => {
                    let used_fallback = state == PipelineState::FallbackAttempting;
                    let image_base64 = render_png_base64(&candidate.smiles, self.image_size)
                        .map_err(|e| StructureError::ImageGeneration(e.to_string()))?;
                    state = transition(state, AttemptOutcome::Validated, self.max_retries);
                    info!(
                        smiles = %candidate.smiles,
                        name = %candidate.name,
                        attempts,
                        used_fallback,
                        ?state,
                        "structure generated"
                    );
                    return Ok(PipelineOutcome {
                        result: StructureResult {
                            smiles: candidate.smiles,
                            name: candidate.name,
                            image_base64,
                        },
                        attempts,
                        used_fallback,
                    });
                }
                Err(e) if e.is_retryable() => {
                    warn!(attempt = attempts, error = %e, "candidate rejected");
                    last_error = Some(e);
                    state = transition(state, AttemptOutcome::Rejected, self.max_retries);
                }
                Err(e) => return Err(e),
            }
        }

        let last = last_error.unwrap_or_else(|| {
            StructureError::StructuralValidation("no candidate was produced".into())
        });
        Err(StructureError::ExhaustedRetries {
            attempts,
            last: Box::new(last),
        })
    }
}

/// 清洗并校验候选结构，返回带有清洗后 SMILES 的候选
pub fn validate_candidate(candidate: Candidate) -> Result<Candidate, StructureError> {
    let smiles = sanitize_smiles(&candidate.smiles);
    if smiles != candidate.smiles {
        debug!(raw = %candidate.smiles, sanitized = %smiles, "sanitized candidate SMILES");
    }

    if !ring_closures_paired(&smiles) {
        return Err(StructureError::StructuralValidation(format!(
            "ring-closure labels not paired in '{}': {}",
            smiles,
            unpaired_ring_labels(&smiles).join(", ")
        )));
    }

    parse_smiles(&smiles)
        .map_err(|e| StructureError::StructuralValidation(format!("'{smiles}': {e}")))?;

    Ok(Candidate {
        smiles,
        name: candidate.name,
    })
}
