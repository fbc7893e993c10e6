use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::chem::get_molecule_properties;
use crate::chemical_info::{AvailabilityLookup, ChemicalInfoClient};
use crate::config::Config;
use crate::history::HistoryStore;
use crate::llm::client::{GenerationRequest, LLMClient, TextGenerator};
use crate::proposal::ProposalWriter;
use crate::structure::{
    PipelineOutcome, StructureError, StructurePipeline, StructureReport, StructureRequest,
};

/// 应用上下文：显式构造并注入到各个命令中
#[derive(Clone)]
pub struct AppContext {
    /// 配置
    pub config: Config,
    /// 基于配置的 LLM 客户端，用于默认请求与连接检查
    pub llm_client: LLMClient,
    /// 结构生成流水线使用的文本生成服务
    pub generator: Arc<dyn TextGenerator>,
    /// 可得性查询
    pub chemical_info: Arc<dyn AvailabilityLookup>,
    pub pipeline: StructurePipeline,
    /// 提案、修改与设计依据
    pub proposal_writer: ProposalWriter,
    pub history: Arc<HistoryStore>,
}

impl AppContext {
    /// 根据配置创建真实的服务
    pub fn new(config: Config) -> Result<Self> {
        let llm_client = LLMClient::new(config.llm.clone());
        let chemical_info = ChemicalInfoClient::new(config.chemical_info.clone())?;
        Ok(Self::with_services(
            config,
            Arc::new(llm_client),
            Arc::new(chemical_info),
        ))
    }

    /// 使用给定的服务实现创建上下文
    pub fn with_services(
        config: Config,
        generator: Arc<dyn TextGenerator>,
        chemical_info: Arc<dyn AvailabilityLookup>,
    ) -> Self {
        let pipeline = StructurePipeline::new(generator.clone(), &config.structure);
        let proposal_writer = ProposalWriter::new(generator.clone());
        let history = Arc::new(HistoryStore::new(config.history.clone()));
        Self {
            llm_client: LLMClient::new(config.llm.clone()),
            config,
            generator,
            chemical_info,
            pipeline,
            proposal_writer,
            history,
        }
    }

    /// 由配置得到的生成请求
    pub fn default_request(&self) -> GenerationRequest {
        self.llm_client.default_request()
    }

    /// 运行流水线并记录历史，成功后按配置补充性质与可得性信息
    pub async fn generate_report(
        &self,
        request: &StructureRequest,
    ) -> Result<StructureReport, StructureError> {
        let session_id = match self
            .history
            .create_session(&request.context, &request.generation)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "failed to record history session");
                None
            }
        };

        let outcome = match self.pipeline.run(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if let Some(id) = &session_id {
                    let attempts = match &e {
                        StructureError::ExhaustedRetries { attempts, .. } => *attempts,
                        _ => 0,
                    };
                    if let Err(history_err) =
                        self.history.fail_session(id, &e.to_string(), attempts).await
                    {
                        warn!(session_id = %id, error = %history_err, "failed to update history");
                    }
                }
                return Err(e);
            }
        };

        if let Some(id) = &session_id
            && let Err(e) = self.history.complete_session(id, &outcome).await
        {
            warn!(session_id = %id, error = %e, "failed to update history");
        }

        let mut report = StructureReport::from(outcome.result.clone());
        if self.config.structure.enrich {
            self.enrich(&mut report, &outcome).await;
        }
        Ok(report)
    }

    /// 补充性质、可得性与相似化合物；任何失败只记录日志
    async fn enrich(&self, report: &mut StructureReport, outcome: &PipelineOutcome) {
        let properties = get_molecule_properties(&report.smiles);
        if !properties.is_empty() {
            report.properties = Some(properties);
        }

        let availability = match self
            .chemical_info
            .verify_availability(&report.smiles, &report.name)
            .await
        {
            Ok(info) => info,
            Err(e) => {
                warn!(smiles = %report.smiles, error = %e, "availability lookup failed");
                return;
            }
        };
        info!(
            smiles = %report.smiles,
            score = availability.availability_score,
            availability = %availability.commercial_availability,
            attempts = outcome.attempts,
            "availability verified"
        );

        if availability.availability_score < self.config.structure.availability_threshold {
            match self
                .chemical_info
                .search_similar(&report.smiles, self.config.structure.similarity_threshold)
                .await
            {
                Ok(similar) => {
                    debug!(count = similar.len(), "similar compounds found");
                    report.similar_compounds = Some(similar);
                }
                Err(e) => warn!(smiles = %report.smiles, error = %e, "similarity search failed"),
            }
        }
        report.availability_info = Some(availability);
    }
}
