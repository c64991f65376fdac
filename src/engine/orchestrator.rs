// ==========================================
// 物料需求核对系统 - 管道编排器
// ==========================================
// 用途: 协调 导入 → 汇总 → 库存核对 → 报表 的执行顺序
// 红线: 管道总能产出报表 + 完整日志；单个文档/工作表失败只跳过该单元
// ==========================================

use crate::config::PipelineConfig;
use crate::domain::grid::SourceDocument;
use crate::domain::material::SheetOutcome;
use crate::domain::report::{DqLevel, Report, SheetSummary, ValidationEntry};
use crate::engine::{Aggregator, StockReconciler};
use crate::importer::{
    DocumentImporter, DocumentImporterImpl, DocumentOutcome, ImportResult, InventoryLedger,
    LedgerLoader,
};
use crate::perf::PerfGuard;
use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

// ==========================================
// ReportPipeline - 管道编排器
// ==========================================
pub struct ReportPipeline {
    config: PipelineConfig,
    importer: DocumentImporterImpl,
    ledger_loader: LedgerLoader,
    aggregator: Aggregator,
    reconciler: StockReconciler,
}

impl ReportPipeline {
    /// 按配置装配管道
    ///
    /// # 返回
    /// - Err: 仅当配置中的元数据标签无法编译
    pub fn new(config: PipelineConfig) -> ImportResult<Self> {
        Ok(Self {
            importer: DocumentImporterImpl::from_config(&config)?,
            ledger_loader: LedgerLoader::new(&config.ledger, &config.header_scan),
            aggregator: Aggregator::new(&config.grouping),
            reconciler: StockReconciler::new(),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 同步执行：按上传顺序逐个导入
    pub fn run(&self, documents: &[SourceDocument], ledger: Option<&SourceDocument>) -> Report {
        let _perf = PerfGuard::new("pipeline_run");
        info!(documents = documents.len(), "开始执行报表管道");

        let outcomes: Vec<DocumentOutcome> = {
            let _perf = PerfGuard::new("import");
            documents
                .iter()
                .map(|doc| self.importer.import_document(doc))
                .collect()
        };

        self.assemble(outcomes, ledger)
    }

    /// 并发导入，结果仍按上传顺序归并
    pub async fn run_batch(
        &self,
        documents: Vec<SourceDocument>,
        ledger: Option<SourceDocument>,
    ) -> Report {
        info!(documents = documents.len(), "开始执行报表管道（批量）");

        let outcomes = self.importer.batch_import(documents).await;

        // PerfGuard 依赖线程局部深度，不可跨越 .await 持有
        let _perf = PerfGuard::new("pipeline_run_batch");
        self.assemble(outcomes, ledger.as_ref())
    }

    /// 加载库存台账；失败时返回空台账并记录管道级日志
    fn load_ledger(
        &self,
        ledger: Option<&SourceDocument>,
        log: &mut Vec<ValidationEntry>,
    ) -> InventoryLedger {
        let _perf = PerfGuard::new("load_ledger");

        let Some(document) = ledger else {
            warn!("未提供库存台账");
            log.push(ValidationEntry::pipeline(
                DqLevel::Warning,
                "no stock ledger supplied; all materials reported as not found",
            ));
            return InventoryLedger::empty();
        };

        match self.ledger_loader.load(document) {
            Ok(inventory) => {
                for name in inventory.duplicates() {
                    log.push(ValidationEntry::file(
                        DqLevel::Warning,
                        &document.file_name,
                        format!(
                            "duplicate ledger material '{}' resolved by '{:?}' policy",
                            name, self.config.ledger.duplicate_policy
                        ),
                    ));
                }
                inventory
            }
            Err(e) => {
                error!(file = %document.file_name, error = %e, "库存台账加载失败");
                log.push(ValidationEntry::file(
                    DqLevel::Error,
                    &document.file_name,
                    format!(
                        "stock ledger unavailable ({}); all materials reported as not found",
                        e
                    ),
                ));
                InventoryLedger::empty()
            }
        }
    }

    /// 单写者归并：按上传顺序收集各文档结果，再汇总与核对
    fn assemble(&self, outcomes: Vec<DocumentOutcome>, ledger: Option<&SourceDocument>) -> Report {
        let mut sheets: Vec<SheetOutcome> = Vec::new();
        let mut summaries: Vec<SheetSummary> = Vec::new();
        let mut log: Vec<ValidationEntry> = Vec::new();

        for outcome in outcomes {
            debug!(
                file = %outcome.file_name,
                sheets = outcome.sheets.len(),
                entries = outcome.log.len(),
                "归并文档结果"
            );
            sheets.extend(outcome.sheets);
            summaries.extend(outcome.summaries);
            log.extend(outcome.log);
        }

        let inventory = self.load_ledger(ledger, &mut log);

        if sheets.is_empty() {
            error!("所有输入文档均无可用数据");
            log.push(ValidationEntry::pipeline(
                DqLevel::Error,
                "no usable data found in any input document; report is empty",
            ));
        }

        let aggregation = {
            let _perf = PerfGuard::new("aggregate");
            self.aggregator.aggregate(&sheets)
        };

        let stock_comparison = {
            let _perf = PerfGuard::new("reconcile");
            self.reconciler.reconcile(&aggregation.overall, &inventory)
        };

        let report = Report {
            run_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            overall: aggregation.overall,
            per_order: aggregation.per_order,
            stock_comparison,
            total_top_level_qty: aggregation.total_top_level_qty,
            job_index: aggregation.job_index,
            sheet_summaries: summaries,
            validation_log: log,
        };

        info!(
            run_id = %report.run_id,
            processed_sheets = report.processed_sheets(),
            overall = report.overall.len(),
            log_entries = report.validation_log.len(),
            "报表管道执行完成"
        );
        report
    }
}
