use std::path::Path;

use anyhow::{Context, Result, bail};
use tokio::fs;
use tracing::warn;

use crate::chem::{MoleculeProperties, parse_smiles, properties, render_png};
use crate::cli::{Command, HistoryCommand};
use crate::config::Config;
use crate::history::ExportFormat;
use crate::proposal::ResearchProposal;
use crate::structure::{StructureReport, StructureRequest};

pub mod context;

pub use context::AppContext;

/// 根据配置构造上下文并执行命令
pub async fn launch(config: &Config, command: Command) -> Result<()> {
    let context = AppContext::new(config.clone())?;
    execute(&context, command).await
}

/// 执行一条命令
pub async fn execute(context: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::Generate {
            context: text,
            context_file,
            output,
            ..
        } => {
            let text = read_context(text, context_file.as_deref()).await?;
            let report = generate(context, text).await?;
            println!("{}", format_report_summary(&report));
            if let Some(path) = output {
                write_report(&report, &path).await?;
                println!("💾 结果已保存到 {}", path.display());
            }
            Ok(())
        }
        Command::Propose {
            topic,
            context: text,
            context_file,
            output,
        } => {
            let material = read_context(text, context_file.as_deref()).await?;
            println!("📝 正在生成研究提案 (provider: {})...", context.config.llm.provider);
            let proposal = context
                .proposal_writer
                .draft(&context.default_request(), &topic, &material)
                .await?;
            println!("{}", format_proposal(&proposal));
            if let Some(path) = output {
                write_file(&path, serde_json::to_string_pretty(&proposal)?.as_bytes()).await?;
                println!("💾 提案已保存到 {}", path.display());
            }
            Ok(())
        }
        Command::Refine {
            proposal_file,
            feedback,
            output,
        } => {
            let original = read_proposal(&proposal_file).await?;
            let refined = context
                .proposal_writer
                .refine(&context.default_request(), &original, &feedback)
                .await?;
            println!("✏️ 修改后的提案:\n{}", refined.new_proposal);
            if let Some(path) = output {
                write_file(&path, serde_json::to_string_pretty(&refined)?.as_bytes()).await?;
                println!("💾 修改结果已保存到 {}", path.display());
            }
            Ok(())
        }
        Command::Rationale {
            smiles,
            name,
            context: text,
            context_file,
            offline,
            output,
        } => {
            parse_smiles(&smiles).with_context(|| format!("无效的 SMILES: {smiles}"))?;
            let background = read_context(text, context_file.as_deref()).await?;
            let availability = if offline {
                None
            } else {
                match context.chemical_info.verify_availability(&smiles, &name).await {
                    Ok(info) => Some(info),
                    Err(e) => {
                        warn!(smiles = %smiles, error = %e, "availability lookup failed");
                        None
                    }
                }
            };
            let rationale = context
                .proposal_writer
                .design_rationale(
                    &context.default_request(),
                    &smiles,
                    &name,
                    &background,
                    availability.as_ref(),
                )
                .await?;
            println!("{rationale}");
            if let Some(path) = output {
                write_file(&path, rationale.as_bytes()).await?;
                println!("💾 设计依据已保存到 {}", path.display());
            }
            Ok(())
        }
        Command::Validate { smiles } => {
            match parse_smiles(&smiles) {
                Ok(mol) => {
                    println!("✅ 有效的 SMILES: {}", smiles);
                    println!("{}", format_properties(&properties::compute_properties(&mol)));
                }
                Err(e) => println!("❌ 无效的 SMILES: {} ({})", smiles, e),
            }
            Ok(())
        }
        Command::Properties { smiles } => {
            let mol = parse_smiles(&smiles).with_context(|| format!("无效的 SMILES: {smiles}"))?;
            println!("{}", format_properties(&properties::compute_properties(&mol)));
            println!("  molecular_formula: {}", properties::molecular_formula(&mol));
            Ok(())
        }
        Command::Render {
            smiles,
            output,
            size,
        } => {
            let size = size.unwrap_or(context.config.structure.image_size);
            let png = render_png(&smiles, size)?;
            write_file(&output, &png).await?;
            println!("🖼️ 结构图已保存到 {} ({}x{})", output.display(), size, size);
            Ok(())
        }
        Command::Check => {
            context
                .llm_client
                .check_connection(&context.default_request())
                .await?;
            Ok(())
        }
        Command::History(command) => execute_history(context, command).await,
    }
}

async fn generate(context: &AppContext, text: String) -> Result<StructureReport> {
    let request = StructureRequest::new(text, context.default_request());
    println!(
        "🧪 正在生成候选结构 (provider: {}, 最多 {} 次尝试 + 1 次兜底)...",
        request.generation.provider,
        context.pipeline.max_retries()
    );

    match context.generate_report(&request).await {
        Ok(report) => Ok(report),
        Err(e) => {
            eprintln!("❌ 结构生成失败 (HTTP {}): {}", e.http_status(), e);
            Err(e.into())
        }
    }
}

async fn execute_history(context: &AppContext, command: HistoryCommand) -> Result<()> {
    let history = &context.history;
    if !history.is_enabled() {
        println!("⚠️ 历史记录已禁用");
        return Ok(());
    }

    match command {
        HistoryCommand::List { limit, filter } => {
            let sessions = history.list(limit, filter.as_deref()).await?;
            if sessions.is_empty() {
                println!("📭 没有历史记录");
            }
            for s in sessions {
                println!(
                    "{}  {}  {:<9}  {:<7}  {}",
                    s.session_id,
                    s.timestamp.format("%Y-%m-%d %H:%M"),
                    s.status.to_string(),
                    s.api_provider,
                    s.smiles.as_deref().unwrap_or("-")
                );
                println!("    {}", s.topic);
            }
        }
        HistoryCommand::Show { id } => match history.get(&id).await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => bail!("会话不存在: {id}"),
        },
        HistoryCommand::Delete { id } => {
            if history.delete(&id).await? {
                println!("🗑️ 已删除会话 {id}");
            } else {
                bail!("会话不存在: {id}");
            }
        }
        HistoryCommand::Stats => {
            let stats = history.statistics().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        HistoryCommand::Export { format, output } => {
            let format: ExportFormat = format.parse()?;
            let content = history.export(format).await?;
            match output {
                Some(path) => {
                    write_file(&path, content.as_bytes()).await?;
                    println!("💾 历史已导出到 {}", path.display());
                }
                None => println!("{content}"),
            }
        }
    }
    Ok(())
}

/// 研究背景：命令行文本或文件内容
pub async fn read_context(text: Option<String>, file: Option<&Path>) -> Result<String> {
    let content = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => fs::read_to_string(path)
            .await
            .with_context(|| format!("无法读取研究背景文件 {:?}", path))?,
        (None, None) => bail!("需要提供 --context 或 --context-file"),
    };
    Ok(content)
}

/// 读取待修改的提案：propose 输出的 JSON 取其 proposal 字段，否则按纯文本处理
pub async fn read_proposal(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取提案文件 {:?}", path))?;
    match serde_json::from_str::<ResearchProposal>(&content) {
        Ok(proposal) => Ok(proposal.proposal),
        Err(_) => Ok(content),
    }
}

async fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, content)
        .await
        .with_context(|| format!("无法写入文件 {:?}", path))
}

async fn write_report(report: &StructureReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    write_file(path, json.as_bytes()).await
}

pub fn format_properties(props: &MoleculeProperties) -> String {
    props
        .iter()
        .map(|(key, value)| format!("  {}: {}", key, value.as_f64()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_proposal(proposal: &ResearchProposal) -> String {
    format!(
        "📚 摘要:\n{}\n\n💡 研究提案:\n{}\n\n🎯 选择理由:\n{}",
        proposal.summary, proposal.proposal, proposal.reason
    )
}

pub fn format_report_summary(report: &StructureReport) -> String {
    let mut lines = vec![
        format!("✅ {}", report.name),
        format!("  SMILES: {}", report.smiles),
        format!("  结构图: {} 字节 (base64)", report.image_base64.len()),
    ];

    if let Some(props) = &report.properties {
        lines.push("📊 性质:".to_string());
        lines.push(format_properties(props));
    }
    if let Some(info) = &report.availability_info {
        let sources = if info.sources.is_empty() {
            "-".to_string()
        } else {
            info.sources.join(", ")
        };
        lines.push(format!(
            "🏷️ 可得性: {} (评分 {}/100, 来源: {})",
            info.commercial_availability, info.availability_score, sources
        ));
    }
    if let Some(similar) = report.similar_compounds.as_ref().filter(|s| !s.is_empty()) {
        lines.push("🔍 相似化合物:".to_string());
        for compound in similar {
            lines.push(format!(
                "  CID {}  {}",
                compound.cid,
                compound
                    .properties
                    .canonical_smiles
                    .as_deref()
                    .or(compound.synonyms.first().map(String::as_str))
                    .unwrap_or("-")
            ));
        }
    }
    lines.join("\n")
}
