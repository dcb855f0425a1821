// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::dataset::Dataset;
use crate::domain::models::record::MonitorRecord;
use crate::utils::errors::SinkError;
use std::collections::HashSet;
use std::path::Path;

pub mod delimited;
pub mod spreadsheet;

pub use delimited::DelimitedSink;
pub use spreadsheet::SpreadsheetSink;

/// 既有数据集的装载结果
///
/// `urls` 覆盖文件中出现过的全部 url，包括字段不齐备、
/// 仅能参与去重的行，因此总是 `dataset` 行集的超集
#[derive(Debug)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub urls: HashSet<String>,
}

/// 数据集落盘抽象
///
/// 聚合器只依赖该接口，具体格式由输出文件扩展名决定，
/// 聚合器内部不对格式做任何分支
pub trait TabularSink: Send {
    /// 装载既有数据集（文件必须存在）
    fn load(&mut self, path: &Path) -> Result<LoadedDataset, SinkError>;

    /// 全量写出数据集
    fn write(&mut self, path: &Path, dataset: &Dataset) -> Result<(), SinkError>;
}

/// 按扩展名选择 sink 实现
pub fn sink_for_path(path: &Path) -> Result<Box<dyn TabularSink>, SinkError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => Ok(Box::new(DelimitedSink::comma())),
        "tsv" => Ok(Box::new(DelimitedSink::tab())),
        "xlsx" => Ok(Box::new(SpreadsheetSink::new())),
        other => Err(SinkError::UnsupportedFormat(other.to_string())),
    }
}

pub(crate) fn column_index(header: &[String], name: &str) -> Option<usize> {
    header
        .iter()
        .position(|cell| cell.trim().eq_ignore_ascii_case(name))
}

/// 由表头与数据行还原数据集；列不齐备或无法解析的行仅参与 url 去重
pub(crate) fn rows_to_dataset(
    header: &[String],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<LoadedDataset, SinkError> {
    let url_at =
        column_index(header, "url").ok_or_else(|| SinkError::MissingColumn("url".to_string()))?;
    let title_at = column_index(header, "title");
    let game_at = column_index(header, "game_name");
    let site_at = column_index(header, "site");
    let range_at = column_index(header, "time_range");
    let ts_at = column_index(header, "timestamp");

    let mut urls = HashSet::new();
    let mut records = Vec::new();

    for row in rows {
        let url = match row.get(url_at).map(|cell| cell.trim()) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => continue,
        };
        urls.insert(url.clone());

        let record = (|| {
            let title = row.get(title_at?)?.trim().to_string();
            let game_name = row.get(game_at?)?.trim().to_string();
            let site = row.get(site_at?)?.trim().to_string();
            let time_range = row.get(range_at?)?.trim();
            let timestamp = row.get(ts_at?)?.trim();
            MonitorRecord::from_fields(title, url.clone(), game_name, site, time_range, timestamp)
        })();

        if let Some(record) = record {
            records.push(record);
        }
    }

    Ok(LoadedDataset {
        dataset: Dataset::from_rows(records),
        urls,
    })
}
