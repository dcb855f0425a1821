// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::record::MonitorRecord;
use std::collections::{HashMap, HashSet};

/// 累计数据集：按 url 唯一的有序表
///
/// 合并语义：同一 url 的两行保留时间戳较新者（相同时后写入者胜），
/// 行序保持首次出现顺序。该语义对重复合并幂等，结果与合并顺序无关
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<MonitorRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有行构造，构造时即按合并语义去重
    pub fn from_rows(rows: Vec<MonitorRecord>) -> Self {
        Self::new().merged_with(rows)
    }

    pub fn rows(&self) -> &[MonitorRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn url_set(&self) -> HashSet<String> {
        self.rows.iter().map(|row| row.url.clone()).collect()
    }

    /// 合并一批较新的记录，按 url 去重并保留较新时间戳
    pub fn merged_with(self, newer: impl IntoIterator<Item = MonitorRecord>) -> Self {
        let mut index: HashMap<String, usize> = HashMap::with_capacity(self.rows.len());
        let mut rows: Vec<MonitorRecord> = Vec::with_capacity(self.rows.len());

        for row in self.rows.into_iter().chain(newer) {
            match index.get(&row.url) {
                Some(&at) => {
                    if row.timestamp >= rows[at].timestamp {
                        rows[at] = row;
                    }
                }
                None => {
                    index.insert(row.url.clone(), rows.len());
                    rows.push(row);
                }
            }
        }

        Self { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::time_range::TimeRange;
    use chrono::NaiveDate;

    fn record(url: &str, day: u32) -> MonitorRecord {
        MonitorRecord {
            title: format!("《游戏》{url}"),
            url: url.to_string(),
            game_name: "游戏".to_string(),
            site: "a.example".to_string(),
            time_range: TimeRange::Last24h,
            timestamp: NaiveDate::from_ymd_opt(2026, 8, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn merge_keeps_latest_timestamp_per_url() {
        let merged = Dataset::from_rows(vec![record("https://a/x", 1)])
            .merged_with(vec![record("https://a/x", 3), record("https://a/y", 2)]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.rows()[0].timestamp, record("https://a/x", 3).timestamp);
        // 行序保持首次出现顺序
        assert_eq!(merged.rows()[0].url, "https://a/x");
        assert_eq!(merged.rows()[1].url, "https://a/y");
    }

    #[test]
    fn merge_is_idempotent() {
        let rows = vec![record("https://a/x", 1), record("https://a/y", 2)];
        let once = Dataset::new().merged_with(rows.clone());
        let twice = once.clone().merged_with(rows);
        assert_eq!(once, twice);
    }

    #[test]
    fn sequential_runs_equal_single_combined_run() {
        let a = vec![record("https://a/x", 1), record("https://a/y", 2)];
        let b = vec![record("https://a/x", 3), record("https://a/z", 2)];

        let sequential = Dataset::new()
            .merged_with(a.clone())
            .merged_with(b.clone());
        let combined = Dataset::new().merged_with(a.into_iter().chain(b));

        assert_eq!(sequential.url_set(), combined.url_set());
        for row in sequential.rows() {
            let other = combined
                .rows()
                .iter()
                .find(|r| r.url == row.url)
                .expect("url present in both");
            assert_eq!(row.timestamp, other.timestamp);
        }
    }

    #[test]
    fn older_row_never_replaces_newer() {
        let merged =
            Dataset::from_rows(vec![record("https://a/x", 5)]).merged_with(vec![record("https://a/x", 1)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.rows()[0].timestamp, record("https://a/x", 5).timestamp);
    }
}
