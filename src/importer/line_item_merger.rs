// ==========================================
// 物料需求核对系统 - 多行明细合并器
// ==========================================
// 职责: 父行 + 续行（共享 group_key）合并为一条记录
// 流程: ① 显式前向填充 group_key（纯函数） ② 按首次出现顺序分组求和
// ==========================================

use crate::domain::material::{LineItem, MergedLineItem};
use std::collections::HashMap;

/// 为每一行确定所属分组键
///
/// - 有序号的行开启新分组
/// - 无序号的行继承最近一次出现的序号
/// - 首个序号之前的无序号行各自成组（键为 "#行号"）
pub fn assign_group_keys(items: &[LineItem]) -> Vec<String> {
    items
        .iter()
        .scan(None::<String>, |current, item| {
            let key = match &item.group_key {
                Some(key) => {
                    *current = Some(key.clone());
                    key.clone()
                }
                None => current
                    .clone()
                    .unwrap_or_else(|| format!("#{}", item.row_number)),
            };
            Some(key)
        })
        .collect()
}

/// 合并单个工作表的明细
///
/// 数量字段组内求和；物料/单位/备注取组内首行；输出按分组首次出现顺序
pub fn merge_line_items(items: &[LineItem]) -> Vec<MergedLineItem> {
    let keys = assign_group_keys(items);

    let mut merged: Vec<MergedLineItem> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (item, key) in items.iter().zip(keys) {
        match index.get(&key) {
            Some(&pos) => {
                let group = &mut merged[pos];
                group.qty_per_unit += item.qty_per_unit;
                group.unit_count += item.unit_count;
                group.total_qty += item.total_qty;
                group.source_rows += 1;
            }
            None => {
                index.insert(key.clone(), merged.len());
                merged.push(MergedLineItem {
                    group_key: key,
                    material: item.material.clone(),
                    units: item.units.clone(),
                    qty_per_unit: item.qty_per_unit,
                    unit_count: item.unit_count,
                    total_qty: item.total_qty,
                    remarks: item.remarks.clone(),
                    first_row: item.row_number,
                    source_rows: 1,
                });
            }
        }
    }

    merged
}
