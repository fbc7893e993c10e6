//! 化学品可得性查询：PubChem 与 Cactus

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ChemicalInfoConfig;

mod types;

pub use types::{
    AvailabilityInfo, AvailabilityLabel, CactusRecord, CompoundProperties, CompoundRecord,
};
use types::{IdentifierListResponse, PropertyTableResponse, SynonymsResponse};

/// 同义词中表示商业供应商的关键字
const COMMERCIAL_INDICATORS: [&str; 7] =
    ["sigma", "aldrich", "fisher", "merck", "thermo", "acros", "tci"];

const MAX_SYNONYMS: usize = 10;
const SIMILARITY_MAX_RECORDS: usize = 10;

const PUBCHEM_PROPERTIES: &str =
    "MolecularWeight,MolecularFormula,InChI,InChIKey,CanonicalSMILES";

#[derive(Debug, Error)]
pub enum ChemicalInfoError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// 可得性查询接口
#[async_trait]
pub trait AvailabilityLookup: Send + Sync {
    async fn verify_availability(
        &self,
        smiles: &str,
        name: &str,
    ) -> Result<AvailabilityInfo, ChemicalInfoError>;

    /// threshold 为 0-1 的相似度
    async fn search_similar(
        &self,
        smiles: &str,
        threshold: f64,
    ) -> Result<Vec<CompoundRecord>, ChemicalInfoError>;
}

/// 根据两个数据源的结果计算可得性评分
pub fn score_availability(
    pubchem: Option<CompoundRecord>,
    cactus: Option<CactusRecord>,
) -> AvailabilityInfo {
    let mut info = AvailabilityInfo::unknown();

    if let Some(record) = pubchem {
        info.sources.push("PubChem".to_string());
        info.availability_score += 50;
        if record.commercial_sources {
            info.availability_score += 30;
        }
        let props = &record.properties;
        for (key, value) in [
            ("molecular_weight", &props.molecular_weight),
            ("molecular_formula", &props.molecular_formula),
            ("inchi", &props.inchi),
            ("inchi_key", &props.inchi_key),
            ("canonical_smiles", &props.canonical_smiles),
        ] {
            if let Some(v) = value {
                info.properties.insert(key.to_string(), Value::String(v.clone()));
            }
        }
        info.pubchem_data = Some(record);
    }

    if let Some(record) = cactus.filter(|c| !c.is_empty()) {
        info.sources.push("Cactus".to_string());
        info.availability_score += 20;
        if let Some(name) = &record.iupac_name {
            info.properties
                .insert("iupac_name".to_string(), Value::String(name.clone()));
        }
        if let Some(formula) = &record.molecular_formula {
            info.properties.insert(
                "molecular_formula_cactus".to_string(),
                Value::String(formula.clone()),
            );
        }
        info.cactus_data = Some(record);
    }

    info.commercial_availability = AvailabilityLabel::from_score(info.availability_score);
    info
}

pub fn has_commercial_indicator(synonyms: &[String]) -> bool {
    synonyms.iter().any(|s| {
        let lower = s.to_lowercase();
        COMMERCIAL_INDICATORS.iter().any(|ind| lower.contains(ind))
    })
}

/// 基于 reqwest 的查询客户端
#[derive(Clone)]
pub struct ChemicalInfoClient {
    http: Client,
    config: ChemicalInfoConfig,
}

impl ChemicalInfoClient {
    pub fn new(config: ChemicalInfoConfig) -> Result<Self, ChemicalInfoError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("chem-research-assistant/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    /// 拼接 URL，每个路径段都会被正确转义（SMILES 中的 `/`、`#` 等）
    fn endpoint(&self, base: &str, segments: &[&str]) -> Result<Url, ChemicalInfoError> {
        let mut url =
            Url::parse(base).map_err(|e| ChemicalInfoError::InvalidUrl(format!("{base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ChemicalInfoError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn pubchem_url(&self, segments: &[&str]) -> Result<Url, ChemicalInfoError> {
        self.endpoint(&self.config.pubchem_base_url, segments)
    }

    fn cactus_url(&self, segments: &[&str]) -> Result<Url, ChemicalInfoError> {
        self.endpoint(&self.config.cactus_base_url, segments)
    }

    /// GET JSON，404 视为没有结果
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        timeout: Option<Duration>,
    ) -> Result<Option<T>, ChemicalInfoError> {
        let mut request = self.http.get(url.clone());
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;
        match response.status() {
            StatusCode::OK => Ok(Some(response.json::<T>().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(ChemicalInfoError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }

    async fn get_text(&self, url: Url) -> Result<Option<String>, ChemicalInfoError> {
        let response = self.http.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Ok(None);
        }
        let text = response.text().await?;
        let text = text.trim();
        if text.is_empty() || text.contains("Error") {
            return Ok(None);
        }
        Ok(Some(text.to_string()))
    }

    async fn cid_by(&self, namespace: &str, identifier: &str) -> Result<Option<String>, ChemicalInfoError> {
        if identifier.trim().is_empty() {
            return Ok(None);
        }
        let url = self.pubchem_url(&["compound", namespace, identifier, "cids", "JSON"])?;
        let response: Option<IdentifierListResponse> = self.get_json(url, None).await?;
        Ok(response
            .and_then(|r| r.identifier_list.cid.first().copied())
            .filter(|&cid| cid > 0)
            .map(|cid| cid.to_string()))
    }

    /// 化合物性质与同义词
    pub async fn compound_details(&self, cid: &str) -> Result<CompoundRecord, ChemicalInfoError> {
        let mut record = CompoundRecord {
            cid: cid.to_string(),
            ..CompoundRecord::default()
        };

        let props_url = self.pubchem_url(&["compound", "cid", cid, "property", PUBCHEM_PROPERTIES, "JSON"])?;
        match self.get_json::<PropertyTableResponse>(props_url, None).await {
            Ok(Some(table)) => {
                if let Some(props) = table.property_table.properties.into_iter().next() {
                    record.properties = props.into();
                }
            }
            Ok(None) => {}
            Err(e) => debug!(cid, error = %e, "PubChem property lookup failed"),
        }

        let synonyms_url = self.pubchem_url(&["compound", "cid", cid, "synonyms", "JSON"])?;
        match self.get_json::<SynonymsResponse>(synonyms_url, None).await {
            Ok(Some(response)) => {
                let synonyms = response
                    .information_list
                    .information
                    .into_iter()
                    .next()
                    .map(|info| info.synonym)
                    .unwrap_or_default();
                record.commercial_sources = has_commercial_indicator(&synonyms);
                record.synonyms = synonyms.into_iter().take(MAX_SYNONYMS).collect();
            }
            Ok(None) => {}
            Err(e) => debug!(cid, error = %e, "PubChem synonym lookup failed"),
        }

        Ok(record)
    }

    /// 先按 SMILES 查 CID，查不到或查询出错再按名称
    async fn pubchem_info(&self, smiles: &str, name: &str) -> Result<Option<CompoundRecord>, ChemicalInfoError> {
        let by_smiles = self.cid_by("smiles", smiles).await.unwrap_or_else(|e| {
            debug!(smiles, error = %e, "PubChem SMILES lookup failed, trying name");
            None
        });
        let cid = match by_smiles {
            Some(cid) => Some(cid),
            None => self.cid_by("name", name).await?,
        };
        match cid {
            Some(cid) => Ok(Some(self.compound_details(&cid).await?)),
            None => Ok(None),
        }
    }

    /// 两个字段分别查询，一个失败不影响另一个
    async fn cactus_info(&self, smiles: &str) -> Option<CactusRecord> {
        let (iupac_name, molecular_formula) = tokio::join!(
            self.cactus_field(smiles, "iupac_name"),
            self.cactus_field(smiles, "formula")
        );
        let record = CactusRecord {
            iupac_name,
            molecular_formula,
        };
        (!record.is_empty()).then_some(record)
    }

    async fn cactus_field(&self, smiles: &str, field: &str) -> Option<String> {
        let result = match self.cactus_url(&[smiles, field]) {
            Ok(url) => self.get_text(url).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            debug!(smiles, field, error = %e, "Cactus lookup failed");
            None
        })
    }
}

#[async_trait]
impl AvailabilityLookup for ChemicalInfoClient {
    async fn verify_availability(
        &self,
        smiles: &str,
        name: &str,
    ) -> Result<AvailabilityInfo, ChemicalInfoError> {
        let (pubchem, cactus) =
            tokio::join!(self.pubchem_info(smiles, name), self.cactus_info(smiles));

        let pubchem = pubchem.unwrap_or_else(|e| {
            warn!(smiles, error = %e, "PubChem search failed");
            None
        });

        let info = score_availability(pubchem, cactus);
        debug!(
            smiles,
            score = info.availability_score,
            availability = %info.commercial_availability,
            "availability verified"
        );
        Ok(info)
    }

    async fn search_similar(
        &self,
        smiles: &str,
        threshold: f64,
    ) -> Result<Vec<CompoundRecord>, ChemicalInfoError> {
        let percent = (threshold.clamp(0.0, 1.0) * 100.0).round() as u32;
        let mut url = self.pubchem_url(&["compound", "fastsimilarity_2d", "smiles", smiles, "cids", "JSON"])?;
        url.query_pairs_mut()
            .append_pair("Threshold", &percent.to_string())
            .append_pair("MaxRecords", &SIMILARITY_MAX_RECORDS.to_string());

        let timeout = Duration::from_secs(self.config.similar_timeout_secs);
        let Some(response) = self
            .get_json::<IdentifierListResponse>(url, Some(timeout))
            .await?
        else {
            return Ok(Vec::new());
        };

        let mut similar = Vec::new();
        for cid in response
            .identifier_list
            .cid
            .into_iter()
            .take(self.config.max_similar)
        {
            similar.push(self.compound_details(&cid.to_string()).await?);
        }
        Ok(similar)
    }
}
