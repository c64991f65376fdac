// ==========================================
// 物料需求核对系统 - 命令行入口
// ==========================================
// 职责: 读取文件 → 执行管道 → 写出报表（薄 IO 外壳）
// 退出码: 仅配置/文件读写失败时非零；文档内容问题只进入校验日志
// ==========================================

use anyhow::Context;
use clap::Parser;
use material_requirement::config::ConfigManager;
use material_requirement::engine::ReportPipeline;
use material_requirement::importer::UniversalFileParser;
use material_requirement::report::write_report;
use material_requirement::{logging, APP_NAME, VERSION};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "material-requirement")]
#[command(about = "Aggregate work-order spreadsheets and reconcile them against a stock ledger", long_about = None)]
#[command(version)]
struct Cli {
    /// Stock ledger spreadsheet (material name + quantity columns)
    #[arg(short, long)]
    ledger: PathBuf,

    /// Pipeline configuration (JSON); defaults to the user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output path: *.xlsx, *.json, or a directory for CSV files
    #[arg(short, long, default_value = "material_requirement.xlsx")]
    output: PathBuf,

    /// Import documents one after another instead of concurrently
    #[arg(long)]
    sequential: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Work-order documents, processed in the given order
    #[arg(required = true)]
    documents: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(cli.json_logs);

    info!("==================================================");
    info!("{} v{}", APP_NAME, VERSION);
    info!("==================================================");

    let config = ConfigManager::load(cli.config.as_deref()).context("加载配置失败")?;
    let pipeline = ReportPipeline::new(config).context("初始化管道失败")?;

    let documents = cli
        .documents
        .iter()
        .map(|path| {
            UniversalFileParser::read_document(path)
                .with_context(|| format!("读取文档失败: {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let ledger = UniversalFileParser::read_document(&cli.ledger)
        .with_context(|| format!("读取库存台账失败: {}", cli.ledger.display()))?;

    let report = if cli.sequential {
        pipeline.run(&documents, Some(&ledger))
    } else {
        pipeline.run_batch(documents, Some(ledger)).await
    };

    write_report(&report, &cli.output)
        .with_context(|| format!("写出报表失败: {}", cli.output.display()))?;

    info!(
        output = %cli.output.display(),
        processed_sheets = report.processed_sheets(),
        materials = report.overall.len(),
        log_entries = report.validation_log.len(),
        "完成"
    );

    for line in report.log_lines() {
        eprintln!("{}", line);
    }

    Ok(())
}
