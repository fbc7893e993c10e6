use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 可得性判断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityLabel {
    ReadilyAvailable,
    PossiblyAvailable,
    SynthesisRequired,
}

impl AvailabilityLabel {
    pub fn from_score(score: u32) -> Self {
        if score >= 70 {
            AvailabilityLabel::ReadilyAvailable
        } else if score >= 40 {
            AvailabilityLabel::PossiblyAvailable
        } else {
            AvailabilityLabel::SynthesisRequired
        }
    }
}

impl std::fmt::Display for AvailabilityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvailabilityLabel::ReadilyAvailable => write!(f, "readily_available"),
            AvailabilityLabel::PossiblyAvailable => write!(f, "possibly_available"),
            AvailabilityLabel::SynthesisRequired => write!(f, "synthesis_required"),
        }
    }
}

/// PubChem 化合物性质
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompoundProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecular_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecular_formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inchi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inchi_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_smiles: Option<String>,
}

/// PubChem 中的一个化合物
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompoundRecord {
    pub cid: String,
    #[serde(default)]
    pub properties: CompoundProperties,
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// 同义词中出现了试剂供应商
    #[serde(default)]
    pub commercial_sources: bool,
}

/// Cactus 解析结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CactusRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iupac_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecular_formula: Option<String>,
}

impl CactusRecord {
    pub fn is_empty(&self) -> bool {
        self.iupac_name.is_none() && self.molecular_formula.is_none()
    }
}

/// 可得性查询结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityInfo {
    /// 0-100
    pub availability_score: u32,
    pub sources: Vec<String>,
    pub pubchem_data: Option<CompoundRecord>,
    pub cactus_data: Option<CactusRecord>,
    pub commercial_availability: AvailabilityLabel,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl AvailabilityInfo {
    /// 两个数据源都没有结果时的结论
    pub fn unknown() -> Self {
        Self {
            availability_score: 0,
            sources: Vec::new(),
            pubchem_data: None,
            cactus_data: None,
            commercial_availability: AvailabilityLabel::SynthesisRequired,
            properties: BTreeMap::new(),
        }
    }
}

// PubChem PUG REST 原始响应

#[derive(Debug, Deserialize)]
pub(crate) struct IdentifierListResponse {
    #[serde(rename = "IdentifierList")]
    pub identifier_list: IdentifierList,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdentifierList {
    #[serde(rename = "CID", default)]
    pub cid: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PropertyTableResponse {
    #[serde(rename = "PropertyTable")]
    pub property_table: PropertyTable,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PropertyTable {
    #[serde(rename = "Properties", default)]
    pub properties: Vec<RawProperties>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawProperties {
    #[serde(rename = "MolecularWeight")]
    pub molecular_weight: Option<Value>,
    #[serde(rename = "MolecularFormula")]
    pub molecular_formula: Option<String>,
    #[serde(rename = "InChI")]
    pub inchi: Option<String>,
    #[serde(rename = "InChIKey")]
    pub inchi_key: Option<String>,
    #[serde(rename = "CanonicalSMILES", alias = "ConnectivitySMILES")]
    pub canonical_smiles: Option<String>,
}

impl From<RawProperties> for CompoundProperties {
    fn from(raw: RawProperties) -> Self {
        let molecular_weight = raw.molecular_weight.map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        });
        Self {
            molecular_weight,
            molecular_formula: raw.molecular_formula,
            inchi: raw.inchi,
            inchi_key: raw.inchi_key,
            canonical_smiles: raw.canonical_smiles,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SynonymsResponse {
    #[serde(rename = "InformationList")]
    pub information_list: InformationList,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InformationList {
    #[serde(rename = "Information", default)]
    pub information: Vec<Information>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Information {
    #[serde(rename = "Synonym", default)]
    pub synonym: Vec<String>,
}
