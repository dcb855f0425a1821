// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::time_range::TimeRange;
use chrono::{Local, NaiveDateTime};

/// 时间戳在表格文件中的格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 单条监控记录
///
/// 由一个搜索结果块提取而来，创建后不再修改
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorRecord {
    pub title: String,
    pub url: String,
    pub game_name: String,
    pub site: String,
    pub time_range: TimeRange,
    pub timestamp: NaiveDateTime,
}

impl MonitorRecord {
    /// 表头列名，全部 sink 共用
    pub const COLUMNS: [&'static str; 6] =
        ["title", "url", "game_name", "site", "time_range", "timestamp"];

    pub fn new(
        title: String,
        url: String,
        game_name: String,
        site: String,
        time_range: TimeRange,
    ) -> Self {
        Self {
            title,
            url,
            game_name,
            site,
            time_range,
            timestamp: Local::now().naive_local(),
        }
    }

    /// 导出为一行单元格，与 `COLUMNS` 对齐
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.url.clone(),
            self.game_name.clone(),
            self.site.clone(),
            self.time_range.to_string(),
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        ]
    }

    /// 从表格字段还原记录；时间范围或时间戳无法解析时返回 None
    pub fn from_fields(
        title: String,
        url: String,
        game_name: String,
        site: String,
        time_range: &str,
        timestamp: &str,
    ) -> Option<Self> {
        let time_range = time_range.parse().ok()?;
        let timestamp = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).ok()?;
        Some(Self {
            title,
            url,
            game_name,
            site,
            time_range,
            timestamp,
        })
    }
}
