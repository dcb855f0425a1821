// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::{rows_to_dataset, LoadedDataset, TabularSink};
use crate::domain::models::dataset::Dataset;
use crate::domain::models::record::MonitorRecord;
use crate::utils::errors::SinkError;
use calamine::{open_workbook_auto, Reader};
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// 电子表格 sink（xlsx）
///
/// 读取经 calamine，写出经 rust_xlsxwriter；
/// 单元格一律按文本处理，与分隔文本 sink 的行视图保持一致
pub struct SpreadsheetSink;

impl SpreadsheetSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpreadsheetSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TabularSink for SpreadsheetSink {
    fn load(&mut self, path: &Path) -> Result<LoadedDataset, SinkError> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| SinkError::Spreadsheet(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| SinkError::Spreadsheet("工作簿没有工作表".to_string()))?
            .map_err(|e| SinkError::Spreadsheet(e.to_string()))?;

        let mut rows = range.rows().map(|row| {
            row.iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect::<Vec<String>>()
        });

        let header = rows.next().unwrap_or_default();
        rows_to_dataset(&header, rows)
    }

    fn write(&mut self, path: &Path, dataset: &Dataset) -> Result<(), SinkError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, name) in MonitorRecord::COLUMNS.iter().enumerate() {
            worksheet
                .write_string(0, col as u16, *name)
                .map_err(|e| SinkError::Spreadsheet(e.to_string()))?;
        }
        for (at, record) in dataset.rows().iter().enumerate() {
            for (col, cell) in record.to_row().iter().enumerate() {
                worksheet
                    .write_string(at as u32 + 1, col as u16, cell.as_str())
                    .map_err(|e| SinkError::Spreadsheet(e.to_string()))?;
            }
        }

        workbook
            .save(path)
            .map_err(|e| SinkError::Spreadsheet(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::time_range::TimeRange;
    use chrono::NaiveDate;

    #[test]
    fn dataset_round_trips_through_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.xlsx");

        let dataset = Dataset::from_rows(vec![MonitorRecord {
            title: "《旧游戏》攻略".to_string(),
            url: "https://a.example/old".to_string(),
            game_name: "旧游戏".to_string(),
            site: "a.example".to_string(),
            time_range: TimeRange::LastWeek,
            timestamp: NaiveDate::from_ymd_opt(2026, 8, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        }]);

        let mut sink = SpreadsheetSink::new();
        sink.write(&path, &dataset).unwrap();

        let loaded = SpreadsheetSink::new().load(&path).unwrap();
        assert_eq!(loaded.dataset.len(), 1);
        let row = &loaded.dataset.rows()[0];
        assert_eq!(row.url, "https://a.example/old");
        assert_eq!(row.game_name, "旧游戏");
        assert_eq!(row.time_range, TimeRange::LastWeek);
        assert!(loaded.urls.contains("https://a.example/old"));
    }
}
