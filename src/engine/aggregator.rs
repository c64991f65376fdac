// ==========================================
// 物料需求核对系统 - 需求汇总引擎
// ==========================================
// 职责: 跨全部文档汇总合并后明细
// 输出: 总需求视图 (specification, units) + 分订单视图 (order_id, specification, units)
//       + 订单数量合计 + 作业号 → 客户名索引
// 红线: 物料为空 / 全零行在分组前剔除；校验日志不影响此处过滤
// ==========================================

use crate::config::GroupingConfig;
use crate::domain::aggregate::{AggregateRecord, PerOrderRecord};
use crate::domain::material::{MergedLineItem, SheetOutcome};
use crate::domain::report::JobClient;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument};

// 规格开头的字母/数字串
static LEADING_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+").expect("leading token regex pattern is valid"));

// ==========================================
// AggregationResult - 汇总结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationResult {
    pub overall: Vec<AggregateRecord>,
    pub per_order: Vec<PerOrderRecord>,
    pub total_top_level_qty: f64,
    pub job_index: Vec<JobClient>,
    pub excluded_rows: usize,
}

// ==========================================
// Aggregator - 需求汇总引擎
// ==========================================
pub struct Aggregator {
    fallback_tag: String,
    min_tag_len: usize,
}

impl Aggregator {
    pub fn new(config: &GroupingConfig) -> Self {
        Self {
            fallback_tag: config.fallback_tag.clone(),
            min_tag_len: config.min_tag_len,
        }
    }

    /// 分组标签：规格开头字母/数字串（小写，长度 ≥ min_tag_len），否则为兜底标签
    pub fn group_tag(&self, specification: &str) -> String {
        LEADING_TOKEN
            .find(specification.trim())
            .map(|m| m.as_str())
            .filter(|token| token.chars().count() >= self.min_tag_len)
            .map(|token| token.to_lowercase())
            .unwrap_or_else(|| self.fallback_tag.clone())
    }

    /// 是否参与汇总
    fn is_countable(item: &MergedLineItem) -> bool {
        item.has_material() && !item.is_all_zero()
    }

    #[instrument(skip(self, sheets), fields(sheets = sheets.len()))]
    pub fn aggregate(&self, sheets: &[SheetOutcome]) -> AggregationResult {
        let excluded_rows = sheets
            .iter()
            .flat_map(|s| s.items.iter())
            .filter(|item| !Self::is_countable(item))
            .count();

        let result = AggregationResult {
            overall: self.overall_view(sheets),
            per_order: self.per_order_view(sheets),
            total_top_level_qty: sheets.iter().map(|s| s.metadata.top_level_qty).sum(),
            job_index: self.job_index(sheets),
            excluded_rows,
        };

        info!(
            overall = result.overall.len(),
            per_order = result.per_order.len(),
            excluded = result.excluded_rows,
            "需求汇总完成"
        );
        result
    }

    /// 总需求视图，按 (group_tag, specification, units) 排序
    pub fn overall_view(&self, sheets: &[SheetOutcome]) -> Vec<AggregateRecord> {
        let mut records: Vec<AggregateRecord> = Vec::new();
        let mut index: HashMap<(String, String), usize> = HashMap::new();

        for item in sheets
            .iter()
            .flat_map(|s| s.items.iter())
            .filter(|item| Self::is_countable(item))
        {
            let key = (item.material.trim().to_string(), item.units.trim().to_string());
            match index.get(&key) {
                Some(&pos) => records[pos].total_qty += item.total_qty,
                None => {
                    index.insert(key.clone(), records.len());
                    records.push(AggregateRecord {
                        group_tag: self.group_tag(&key.0),
                        specification: key.0,
                        units: key.1,
                        total_qty: item.total_qty,
                    });
                }
            }
        }

        records.sort_by(|a, b| {
            (&a.group_tag, &a.specification, &a.units).cmp(&(
                &b.group_tag,
                &b.specification,
                &b.units,
            ))
        });

        debug!(records = records.len(), "总需求视图生成");
        records
    }

    /// 分订单视图，按 (order_id, specification, units) 排序
    pub fn per_order_view(&self, sheets: &[SheetOutcome]) -> Vec<PerOrderRecord> {
        let mut totals: BTreeMap<(String, String, String), f64> = BTreeMap::new();

        for sheet in sheets {
            for item in sheet.items.iter().filter(|item| Self::is_countable(item)) {
                *totals
                    .entry((
                        sheet.order_id.clone(),
                        item.material.trim().to_string(),
                        item.units.trim().to_string(),
                    ))
                    .or_insert(0.0) += item.total_qty;
            }
        }

        totals
            .into_iter()
            .map(|((order_id, specification, units), total_qty)| PerOrderRecord {
                order_id,
                specification,
                units,
                total_qty,
            })
            .collect()
    }

    /// 作业号 → 客户名（后出现者覆盖；无客户名的工作表不覆盖已有值）
    pub fn job_index(&self, sheets: &[SheetOutcome]) -> Vec<JobClient> {
        let mut index: BTreeMap<String, String> = BTreeMap::new();

        for sheet in sheets {
            match &sheet.metadata.client_name {
                Some(client) => {
                    index.insert(sheet.job_number.clone(), client.clone());
                }
                None => {
                    index.entry(sheet.job_number.clone()).or_default();
                }
            }
        }

        index
            .into_iter()
            .map(|(job_number, client_name)| JobClient {
                job_number,
                client_name,
            })
            .collect()
    }
}
