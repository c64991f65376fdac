// ==========================================
// 物料需求核对系统 - 文档导入器实现
// ==========================================
// 职责: 整合单文档导入流程
// 流程: 解析 → 表头定位 → 元数据提取 → 字段映射 → 多行合并 → 行级校验
// 红线: 文档/工作表级失败只记日志并跳过，不中断其他单元
// ==========================================

use crate::config::PipelineConfig;
use crate::domain::grid::{SheetGrid, SourceDocument};
use crate::domain::material::SheetOutcome;
use crate::domain::report::{DqLevel, SheetStatus, SheetSummary, ValidationEntry};
use crate::importer::document_importer_trait::{
    DocumentImporter, DqValidator, FieldMapper, FileParser,
};
use crate::importer::dq_validator::DqValidator as DqValidatorImpl;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::header_locator::{ExpectedColumn, HeaderLocator};
use crate::importer::line_item_merger::merge_line_items;
use crate::importer::metadata_extractor::MetadataExtractor;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// DocumentOutcome - 单文档导入结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DocumentOutcome {
    pub file_name: String,
    pub sheets: Vec<SheetOutcome>,
    pub summaries: Vec<SheetSummary>,
    pub log: Vec<ValidationEntry>,
}

impl DocumentOutcome {
    fn failed(file_name: &str, message: String) -> Self {
        Self {
            file_name: file_name.to_string(),
            log: vec![ValidationEntry::file(DqLevel::Error, file_name, message)],
            ..Default::default()
        }
    }
}

struct ImporterComponents {
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    dq_validator: Box<dyn DqValidator>,
    header_locator: HeaderLocator,
    metadata_extractor: MetadataExtractor,
    expected_columns: Vec<ExpectedColumn>,
}

// ==========================================
// DocumentImporterImpl - 文档导入器实现
// ==========================================
// 组件以 Arc 共享，批量导入时每个阻塞任务持有一份克隆
#[derive(Clone)]
pub struct DocumentImporterImpl {
    components: Arc<ImporterComponents>,
}

impl DocumentImporterImpl {
    /// 创建新的 DocumentImporter 实例
    ///
    /// # 参数
    /// - file_parser: 文件解析器
    /// - field_mapper: 字段映射器
    /// - dq_validator: 行级校验器
    /// - header_locator: 表头定位器
    /// - metadata_extractor: 元数据提取器
    /// - expected_columns: 表头定位所需的期望列
    pub fn new(
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        dq_validator: Box<dyn DqValidator>,
        header_locator: HeaderLocator,
        metadata_extractor: MetadataExtractor,
        expected_columns: Vec<ExpectedColumn>,
    ) -> Self {
        Self {
            components: Arc::new(ImporterComponents {
                file_parser,
                field_mapper,
                dq_validator,
                header_locator,
                metadata_extractor,
                expected_columns,
            }),
        }
    }

    /// 按配置装配默认组件
    pub fn from_config(config: &PipelineConfig) -> ImportResult<Self> {
        Ok(Self::new(
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl::new(&config.columns)),
            Box::new(DqValidatorImpl),
            HeaderLocator::from_config(&config.header_scan),
            MetadataExtractor::new(&config.metadata)?,
            config
                .required_columns()
                .map(ExpectedColumn::from_rule)
                .collect(),
        ))
    }

    /// 处理单个工作表
    ///
    /// # 返回
    /// - Ok((SheetOutcome, 日志)): 工作表可用
    /// - Err: 结构性错误（未找到表头 / 缺少必填列）
    fn process_sheet(
        &self,
        document: &SourceDocument,
        sheet: &SheetGrid,
    ) -> ImportResult<(SheetOutcome, Vec<ValidationEntry>)> {
        let c = &self.components;

        // === 步骤 1: 表头定位 ===
        let header = c
            .header_locator
            .locate(&sheet.grid, &c.expected_columns)
            .ok_or_else(|| ImportError::HeaderNotFound {
                sheet: sheet.name.clone(),
                scanned: c.header_locator.max_rows().min(sheet.grid.row_count()),
            })?;

        // === 步骤 2: 元数据提取（表头上方各行）===
        let metadata = c.metadata_extractor.extract(&sheet.grid, header.row_index);

        // === 步骤 3: 字段映射 ===
        let items = c.field_mapper.map_sheet(&sheet.name, &sheet.grid, &header)?;
        let rows_read = items.len();

        let mut log = c
            .dq_validator
            .validate_coercions(&document.file_name, &sheet.name, &items);

        // === 步骤 4: 多行合并 ===
        let merged = merge_line_items(&items);

        // === 步骤 5: 行级校验 ===
        log.extend(
            c.dq_validator
                .validate_items(&document.file_name, &sheet.name, &merged),
        );

        let job_number = metadata
            .job_number
            .clone()
            .unwrap_or_else(|| document.file_stem());
        let order_id = SheetOutcome::unique_order_id(&job_number, &sheet.name);

        debug!(
            sheet = %sheet.name,
            header_row = header.row_index,
            rows = rows_read,
            groups = merged.len(),
            order_id = %order_id,
            "工作表处理完成"
        );

        Ok((
            SheetOutcome {
                file_name: document.file_name.clone(),
                sheet_name: sheet.name.clone(),
                metadata,
                job_number,
                order_id,
                header_row: header.row_index,
                rows_read,
                items: merged,
            },
            log,
        ))
    }
}

#[async_trait::async_trait]
impl DocumentImporter for DocumentImporterImpl {
    #[instrument(skip(self, document), fields(file = %document.file_name))]
    fn import_document(&self, document: &SourceDocument) -> DocumentOutcome {
        info!("开始导入文档");

        let sheets = match self.components.file_parser.parse_document(document) {
            Ok(sheets) => sheets,
            Err(e) => {
                error!(error = %e, "文档解析失败，已跳过");
                return DocumentOutcome::failed(
                    &document.file_name,
                    format!("document skipped: {}", e),
                );
            }
        };

        let mut outcome = DocumentOutcome {
            file_name: document.file_name.clone(),
            ..Default::default()
        };

        if sheets.is_empty() {
            warn!("文档无可读工作表");
            outcome.log.push(ValidationEntry::file(
                DqLevel::Error,
                &document.file_name,
                "document skipped: no readable sheets",
            ));
            return outcome;
        }

        for sheet in &sheets {
            match self.process_sheet(document, sheet) {
                Ok((sheet_outcome, log)) => {
                    for entry in &log {
                        warn!(target: "validation", "{}", entry);
                    }
                    outcome.summaries.push(SheetSummary {
                        file_name: document.file_name.clone(),
                        sheet_name: sheet.name.clone(),
                        status: SheetStatus::Processed,
                        reason: None,
                        rows_read: sheet_outcome.rows_read,
                        groups: sheet_outcome.items.len(),
                    });
                    outcome.sheets.push(sheet_outcome);
                    outcome.log.extend(log);
                }
                Err(e) => {
                    warn!(sheet = %sheet.name, error = %e, "工作表已跳过");
                    outcome.summaries.push(SheetSummary {
                        file_name: document.file_name.clone(),
                        sheet_name: sheet.name.clone(),
                        status: SheetStatus::Skipped,
                        reason: Some(e.to_string()),
                        rows_read: 0,
                        groups: 0,
                    });
                    outcome.log.push(ValidationEntry::sheet(
                        DqLevel::Error,
                        &document.file_name,
                        &sheet.name,
                        format!("sheet skipped: {}", e),
                    ));
                }
            }
        }

        info!(
            processed = outcome.sheets.len(),
            skipped = outcome.summaries.len() - outcome.sheets.len(),
            "文档导入完成"
        );
        outcome
    }

    async fn batch_import(&self, documents: Vec<SourceDocument>) -> Vec<DocumentOutcome> {
        info!(documents = documents.len(), "开始批量导入");

        let tasks = documents.into_iter().map(|document| {
            let importer = self.clone();
            async move {
                let file_name = document.file_name.clone();
                match tokio::task::spawn_blocking(move || importer.import_document(&document)).await
                {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!(file = %file_name, error = %e, "导入任务异常终止");
                        DocumentOutcome::failed(&file_name, format!("document skipped: {}", e))
                    }
                }
            }
        });

        // join_all 按输入顺序返回，与完成顺序无关
        join_all(tasks).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn importer() -> DocumentImporterImpl {
        DocumentImporterImpl::from_config(&PipelineConfig::default()).unwrap()
    }

    const ORDER_CSV: &str = "\
WORK ORDER,,,,
Job No.: J-100,,,,
Customer: Acme Ltd,,,,
Order Qty. 20+5,,,,
Sl. No.,Material,Units,Qty. per unit,No. of units
1,Copper Wire,KG,5,20
,,,5,10
2,Bolt,,1,0
";

    #[test]
    fn test_import_document_end_to_end() {
        let doc = SourceDocument::new("order.csv", ORDER_CSV.as_bytes().to_vec());

        let outcome = importer().import_document(&doc);

        assert_eq!(outcome.sheets.len(), 1);
        let sheet = &outcome.sheets[0];
        assert_eq!(sheet.job_number, "J-100");
        assert_eq!(sheet.order_id, "J-100_order");
        assert_eq!(sheet.metadata.client_name, Some("Acme Ltd".to_string()));
        assert_eq!(sheet.metadata.top_level_qty, 25.0);
        assert_eq!(sheet.header_row, 4);
        assert_eq!(sheet.rows_read, 3);
        assert_eq!(sheet.items.len(), 2);
        assert_eq!(sheet.items[0].total_qty, 150.0);

        // Bolt: 单位缺失 + 单位数为 0 + 总数为 0，合并为一条
        assert_eq!(outcome.log.len(), 1);
        assert!(outcome.log[0].message.contains("Bolt"));
        assert!(outcome.log[0].message.contains("units missing"));
    }

    #[test]
    fn test_job_number_falls_back_to_file_stem() {
        let doc = SourceDocument::new(
            "WO-55.csv",
            b"Material,Units,Qty. per unit,No. of units\nPipe,MTR,2,3\n".to_vec(),
        );

        let outcome = importer().import_document(&doc);

        assert_eq!(outcome.sheets[0].job_number, "WO-55");
        assert_eq!(outcome.sheets[0].order_id, "WO-55_WO-55");
    }

    #[test]
    fn test_sheet_without_header_is_skipped() {
        let doc = SourceDocument::new("notes.csv", b"just,some,text\n".to_vec());

        let outcome = importer().import_document(&doc);

        assert!(outcome.sheets.is_empty());
        assert_eq!(outcome.summaries.len(), 1);
        assert_eq!(outcome.summaries[0].status, SheetStatus::Skipped);
        assert_eq!(outcome.log.len(), 1);
        assert_eq!(outcome.log[0].level, DqLevel::Error);
        assert_eq!(outcome.log[0].sheet_name.as_deref(), Some("notes"));
    }

    #[test]
    fn test_unsupported_document_is_skipped() {
        let doc = SourceDocument::new("scan.pdf", vec![1, 2, 3]);

        let outcome = importer().import_document(&doc);

        assert!(outcome.sheets.is_empty());
        assert_eq!(outcome.log.len(), 1);
        assert!(outcome.log[0].message.contains("document skipped"));
    }

    #[tokio::test]
    async fn test_batch_import_preserves_upload_order() {
        let docs: Vec<SourceDocument> = (0..6)
            .map(|i| {
                SourceDocument::new(
                    format!("doc{}.csv", i),
                    format!("Material,Units,Qty. per unit,No. of units\nItem{},NOS,1,{}\n", i, i + 1)
                        .into_bytes(),
                )
            })
            .collect();

        let outcomes = importer().batch_import(docs).await;

        let names: Vec<&str> = outcomes.iter().map(|o| o.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["doc0.csv", "doc1.csv", "doc2.csv", "doc3.csv", "doc4.csv", "doc5.csv"]
        );
        assert_eq!(outcomes[3].sheets[0].items[0].material, "Item3");
    }
}
