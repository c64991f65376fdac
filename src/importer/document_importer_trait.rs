// ==========================================
// 物料需求核对系统 - 文档导入 Trait
// ==========================================
// 职责: 定义文档导入各阶段接口（不包含实现）
// 流程: 解析 → 表头定位/元数据 → 字段映射 → 合并 → 校验
// ==========================================

use crate::domain::grid::{CellGrid, SheetGrid, SourceDocument};
use crate::domain::material::{LineItem, MergedLineItem};
use crate::domain::report::ValidationEntry;
use crate::domain::types::{CellValue, CoercedNumber};
use crate::importer::document_importer_impl::DocumentOutcome;
use crate::importer::error::ImportResult;
use crate::importer::header_locator::HeaderMatch;
use async_trait::async_trait;

// ==========================================
// DocumentImporter Trait
// ==========================================
// 用途: 文档导入主接口
// 实现者: DocumentImporterImpl
#[async_trait]
pub trait DocumentImporter: Send + Sync {
    /// 导入单个文档
    ///
    /// # 返回
    /// - DocumentOutcome: 可用工作表结果 + 各表摘要 + 日志
    ///
    /// # 说明
    /// - 不返回错误：文档/工作表级失败记入日志并跳过
    fn import_document(&self, document: &SourceDocument) -> DocumentOutcome;

    /// 批量导入多个文档（并发执行，按上传顺序返回）
    ///
    /// # 说明
    /// - 每个文档的导入是独立的，互不影响
    /// - 结果顺序与输入顺序一致，与完成顺序无关
    async fn batch_import(&self, documents: Vec<SourceDocument>) -> Vec<DocumentOutcome>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 原始字节流 → 工作表网格
// 实现者: ExcelParser, CsvParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    fn parse_document(&self, document: &SourceDocument) -> ImportResult<Vec<SheetGrid>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 表头下方数据行 → 标准字段明细行
// 实现者: FieldMapperImpl
pub trait FieldMapper: Send + Sync {
    /// # 返回
    /// - Ok(Vec<LineItem>): 已去除空白行的明细
    /// - Err(MissingColumns): 映射后缺少必填列
    fn map_sheet(
        &self,
        sheet_name: &str,
        grid: &CellGrid,
        header: &HeaderMatch,
    ) -> ImportResult<Vec<LineItem>>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 文本清洗与数值容错转换
// 实现者: DataCleanerImpl
pub trait DataCleaner: Send + Sync {
    /// 清洗文本字段（TRIM，可选 UPPER）
    fn clean_text(&self, value: &str, uppercase: bool) -> String;

    /// 标准化 NULL 值（空字符串/空白 → None）
    fn normalize_null(&self, value: Option<String>) -> Option<String>;

    /// 数值转换：失败取 0 并标记 Defaulted
    fn coerce_number(&self, cell: &CellValue) -> CoercedNumber;
}

// ==========================================
// DqValidator Trait
// ==========================================
// 用途: 合并后明细的数据质量检查（只记日志，不过滤）
// 实现者: DqValidatorImpl
pub trait DqValidator: Send + Sync {
    /// 数值转换兜底（解析失败按 0 处理）的行级记录
    fn validate_coercions(
        &self,
        file_name: &str,
        sheet_name: &str,
        items: &[LineItem],
    ) -> Vec<ValidationEntry>;

    /// 合并后明细检查：总数为 0 / 单位缺失 / 每单位数量为 0 / 单位数为 0
    fn validate_items(
        &self,
        file_name: &str,
        sheet_name: &str,
        items: &[MergedLineItem],
    ) -> Vec<ValidationEntry>;
}
