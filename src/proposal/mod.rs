//! 研究提案文本：文献摘要、研究方向、选择理由、按反馈修改以及候选分子的设计依据
//!
//! 文献内容由调用方提供（笔记、摘要或论文片段），这里只负责组织提示词并调用模型。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::chemical_info::AvailabilityInfo;
use crate::llm::client::{GenerationRequest, ProviderError, TextGenerator};

#[derive(Debug, Error)]
pub enum ProposalError {
    #[error("{0} is empty")]
    EmptyInput(&'static str),

    #[error("model returned an empty {0}")]
    EmptyResponse(&'static str),

    #[error("text generation failed: {0}")]
    Generation(#[from] ProviderError),
}

/// 摘要、提案与选择理由
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchProposal {
    pub topic: String,
    pub summary: String,
    pub proposal: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinedProposal {
    pub new_proposal: String,
    /// 用户反馈原文
    pub refinement_reason: String,
}

pub fn build_summary_prompt(topic: &str, material: &str) -> String {
    format!(
        "Summarize the key findings and themes from the following material for a chemist. The user is interested in the topic: '{topic}'.

Focus on:
- Current state of the field and main research themes
- Key methodologies mentioned
- Important chemical compounds or materials
- Research gaps or opportunities

Material:
{material}"
    )
}

pub fn build_proposal_prompt(summary: &str) -> String {
    format!(
        "Based on the following literature summary, propose a novel and feasible research direction that addresses identified gaps or builds upon current findings.

Your proposal should:
- Be scientifically innovative but achievable
- Address a clear research need
- Suggest specific materials or compounds to investigate
- Be suitable for academic or industrial research

Literature Summary:
{summary}

Generate a compelling research proposal (2-3 paragraphs) that a chemist could pursue."
    )
}

pub fn build_reason_prompt(summary: &str, proposal: &str) -> String {
    format!(
        "Based on the following literature summary and research proposal, provide a concise (1-2 paragraphs) justification for why the proposed chemical or material is a good choice for the research topic.

Focus on how it addresses the identified research gaps or builds upon existing work.

Literature Summary:
{summary}

Research Proposal:
{proposal}

Provide a clear and compelling reason for selecting the proposed material."
    )
}

pub fn build_refine_prompt(original: &str, feedback: &str) -> String {
    format!(
        "A user has provided feedback on a research proposal. Generate an improved version that addresses their concerns.

Original Proposal:
{original}

User Feedback:
{feedback}

Instructions:
- Address the specific concerns raised in the feedback
- Maintain scientific rigor and feasibility
- Keep the core research direction but modify based on feedback
- Ensure the new proposal is compelling and well-structured

Generate an improved research proposal that incorporates the user's feedback."
    )
}

/// 商业可得性一节随评分变化：>=70 高，>=40 中等，其余为低；没有评分时要求补充评估
fn commercial_section(availability: Option<&AvailabilityInfo>) -> String {
    let Some(info) = availability else {
        return "   - Commercial availability assessment needed
   - Recommend database searches and supplier queries
   - Evaluate purchase vs. synthesis economics"
            .to_string();
    };
    let score = info.availability_score;
    if score >= 70 {
        format!(
            "   - High commercial availability (score: {score}/100)
   - Recommend supplier verification and quality assessment
   - Cost-effectiveness analysis vs. in-house synthesis"
        )
    } else if score >= 40 {
        format!(
            "   - Moderate commercial availability (score: {score}/100)
   - Should evaluate both purchase and synthesis options
   - Risk assessment for supply chain reliability"
        )
    } else {
        format!(
            "   - Low commercial availability (score: {score}/100)
   - Synthesis route development required
   - Opportunity for method development and optimization"
        )
    }
}

pub fn build_rationale_prompt(
    smiles: &str,
    name: &str,
    context: &str,
    availability: Option<&AvailabilityInfo>,
) -> String {
    let commercial = commercial_section(availability);
    format!(
        "As an expert medicinal/synthetic chemist, provide a detailed scientific rationale for the selection of this specific molecular target.

Target Molecule: {name}
SMILES: {smiles}
Research Context: {context}

Provide a comprehensive analysis covering:

1. **Structure-Activity Relationships (SAR)**
   - Key structural features and their predicted functions
   - How the molecular architecture relates to the intended application
   - Comparison with known active compounds in this space

2. **Computational Predictions**
   - Expected physical and chemical properties
   - ADMET considerations if relevant
   - Stability and reactivity predictions

3. **Synthetic Feasibility**
   - Assessment of synthetic accessibility
   - Key synthetic challenges and solutions
   - Scalability considerations

4. **Commercial Considerations**
{commercial}

5. **Safety and Handling**
   - Predicted hazards and safety classification
   - Special handling or storage requirements
   - Waste disposal considerations

6. **Alternative Considerations**
   - Brief discussion of alternative molecular targets
   - Why this specific compound was selected over alternatives
   - Risk mitigation if this compound proves problematic

Provide a scientifically rigorous analysis that demonstrates deep understanding of the molecular design principles."
    )
}

fn require(value: &str, what: &'static str) -> Result<(), ProposalError> {
    if value.trim().is_empty() {
        return Err(ProposalError::EmptyInput(what));
    }
    Ok(())
}

/// 依次调用模型完成提案相关的文本
#[derive(Clone)]
pub struct ProposalWriter {
    generator: Arc<dyn TextGenerator>,
}

impl ProposalWriter {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    async fn ask(
        &self,
        request: &GenerationRequest,
        prompt: &str,
        what: &'static str,
    ) -> Result<String, ProposalError> {
        debug!(what, prompt_len = prompt.len(), "requesting proposal text");
        let text = self.generator.generate(request, prompt).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ProposalError::EmptyResponse(what));
        }
        Ok(text.to_string())
    }

    /// 摘要 -> 提案 -> 选择理由，后一步以前一步的输出为输入
    pub async fn draft(
        &self,
        request: &GenerationRequest,
        topic: &str,
        material: &str,
    ) -> Result<ResearchProposal, ProposalError> {
        require(topic, "research topic")?;
        require(material, "research material")?;

        let summary = self
            .ask(request, &build_summary_prompt(topic.trim(), material.trim()), "summary")
            .await?;
        let proposal = self
            .ask(request, &build_proposal_prompt(&summary), "proposal")
            .await?;
        let reason = self
            .ask(request, &build_reason_prompt(&summary, &proposal), "selection reason")
            .await?;

        info!(topic = topic.trim(), provider = %request.provider, "research proposal drafted");
        Ok(ResearchProposal {
            topic: topic.trim().to_string(),
            summary,
            proposal,
            reason,
        })
    }

    pub async fn refine(
        &self,
        request: &GenerationRequest,
        original: &str,
        feedback: &str,
    ) -> Result<RefinedProposal, ProposalError> {
        require(original, "original proposal")?;
        require(feedback, "feedback")?;
        let feedback = feedback.trim();

        let new_proposal = self
            .ask(request, &build_refine_prompt(original.trim(), feedback), "refined proposal")
            .await?;
        Ok(RefinedProposal {
            new_proposal,
            refinement_reason: feedback.to_string(),
        })
    }

    pub async fn design_rationale(
        &self,
        request: &GenerationRequest,
        smiles: &str,
        name: &str,
        context: &str,
        availability: Option<&AvailabilityInfo>,
    ) -> Result<String, ProposalError> {
        require(smiles, "SMILES")?;
        let name = match name.trim() {
            "" => smiles.trim(),
            name => name,
        };
        let prompt = build_rationale_prompt(smiles.trim(), name, context.trim(), availability);
        self.ask(request, &prompt, "design rationale").await
    }
}

// Include tests
#[cfg(test)]
mod tests;
