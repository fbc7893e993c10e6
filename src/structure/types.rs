use serde::{Deserialize, Serialize};

use crate::chem::MoleculeProperties;
use crate::chemical_info::{AvailabilityInfo, CompoundRecord};
use crate::llm::client::GenerationRequest;

/// 流水线输入：研究背景文本与调用方持有的生成请求配置
#[derive(Debug, Clone)]
pub struct StructureRequest {
    pub context: String,
    pub generation: GenerationRequest,
}

impl StructureRequest {
    pub fn new(context: impl Into<String>, generation: GenerationRequest) -> Self {
        Self {
            context: context.into(),
            generation,
        }
    }
}

/// 流水线产物。smiles 一定可以被解析器接受。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureResult {
    pub smiles: String,
    pub name: String,
    /// base64 编码的 PNG
    pub image_base64: String,
}

/// 结果以及产生它的过程信息
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub result: StructureResult,
    /// 发出的生成请求数（含兜底）
    pub attempts: u32,
    pub used_fallback: bool,
}

/// 面向调用方的完整结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureReport {
    pub smiles: String,
    pub name: String,
    pub image_base64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_info: Option<AvailabilityInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<MoleculeProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similar_compounds: Option<Vec<CompoundRecord>>,
}

impl From<StructureResult> for StructureReport {
    fn from(result: StructureResult) -> Self {
        Self {
            smiles: result.smiles,
            name: result.name,
            image_base64: result.image_base64,
            availability_info: None,
            properties: None,
            similar_compounds: None,
        }
    }
}
