//! 候选结构生成：提示词构造与模型回复解析

use std::sync::Arc;

use crate::llm::client::{GenerationRequest, TextGenerator};
use crate::structure::error::StructureError;
use crate::structure::sanitizer::filter_allowed;

pub const SMILES_MARKER: &str = "SMILES:";
pub const NAME_MARKER: &str = "NAME:";

/// 一次尝试得到的 (SMILES, 名称)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub smiles: String,
    pub name: String,
}

const RESPONSE_FORMAT: &str = "Respond ONLY in this exact format:
SMILES: [valid SMILES string]
NAME: [chemical name - IUPAC or common name]
SOURCE: [e.g., PubChem CID, Sigma-Aldrich catalog number, DOI of a relevant paper]";

/// 构造第 attempt 次（从 0 开始）尝试的提示词
pub fn build_candidate_prompt(context: &str, attempt: u32) -> String {
    let mut prompt = format!(
        "Based on the following research proposal, identify a commercially available or well-documented chemical compound relevant to the research goals.

{RESPONSE_FORMAT}

Requirements:
- The compound must be commercially available or have a published, reproducible synthesis.
- Provide a specific source (e.g., PubChem CID, catalog number, or DOI) to verify the compound's existence and availability.
- The compound's function must be directly relevant to the stated research proposal.
- Prioritize compounds with established safety and handling protocols.
- The SMILES must be syntactically valid: balanced parentheses, paired ring-closure digits, and standard valences.
"
    );

    if attempt > 0 {
        prompt.push_str(&format!(
            "
Note: {attempt} previous proposal(s) could not be parsed as valid structures. Choose a structurally simpler compound this time:
- Prefer a single ring system or an acyclic scaffold; avoid fused polycyclic cores.
- Use common functional groups (hydroxyl, carbonyl, carboxylic acid, amine, ether, halide).
- Avoid stereochemistry markers, charges and bracket atoms unless strictly necessary.
"
        ));
    }

    prompt.push_str(&format!("\nResearch Proposal:\n{context}"));
    prompt
}

/// 兜底提示词：请求结构简单、确定可解析的化合物
pub fn build_fallback_prompt(context: &str) -> String {
    format!(
        "Previous attempts to propose a compound for the research proposal below produced invalid SMILES.
Propose the SIMPLEST well-known compound that is relevant to the research theme, such as a basic aromatic (benzene, phenol, aniline, benzoic acid), a simple alcohol, ketone or carboxylic acid, or a standard laboratory reagent.
The SMILES must contain at most one ring, no bracket atoms and no stereochemistry.

{RESPONSE_FORMAT}

Research Proposal:
{context}"
    )
}

/// 从模型回复中解析候选结构
pub fn parse_candidate_response(response: &str) -> Result<Candidate, StructureError> {
    let mut smiles = None;
    let mut name = None;

    for line in response.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if smiles.is_none()
            && let Some(rest) = line.strip_prefix(SMILES_MARKER)
        {
            smiles = Some(rest.trim().to_string());
        } else if name.is_none()
            && let Some(rest) = line.strip_prefix(NAME_MARKER)
        {
            name = Some(rest.trim().to_string());
        }
    }

    let raw_smiles = smiles
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StructureError::Parse("no SMILES string found in model response".into()))?;
    let name = name
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StructureError::Parse("no chemical name found in model response".into()))?;

    let unquoted: String = raw_smiles
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '`'))
        .collect();
    let smiles = filter_allowed(&unquoted);
    if smiles.is_empty() {
        return Err(StructureError::Parse(format!(
            "SMILES '{raw_smiles}' is empty after cleaning"
        )));
    }

    Ok(Candidate { smiles, name })
}

/// 通过文本生成服务产出候选结构；本层不做重试
#[derive(Clone)]
pub struct CandidateGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl CandidateGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
        context: &str,
        attempt: u32,
    ) -> Result<Candidate, StructureError> {
        if context.trim().is_empty() {
            return Err(StructureError::EmptyContext);
        }
        let prompt = build_candidate_prompt(context, attempt);
        let response = self.generator.generate(request, &prompt).await?;
        parse_candidate_response(&response)
    }

    pub async fn generate_fallback(
        &self,
        request: &GenerationRequest,
        context: &str,
    ) -> Result<Candidate, StructureError> {
        if context.trim().is_empty() {
            return Err(StructureError::EmptyContext);
        }
        let prompt = build_fallback_prompt(context);
        let response = self.generator.generate(request, &prompt).await?;
        parse_candidate_response(&response)
    }
}
