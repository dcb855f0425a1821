// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 搜索时间范围
///
/// 对应搜索引擎的时效过滤参数：最近24小时或最近一周
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeRange {
    /// 最近24小时
    #[serde(rename = "24h")]
    Last24h,
    /// 最近一周
    #[serde(rename = "1w")]
    LastWeek,
}

impl TimeRange {
    /// 搜索引擎的时效过滤 token（Google `tbs` 参数）
    pub fn filter_token(&self) -> &'static str {
        match self {
            TimeRange::Last24h => "qdr:d",
            TimeRange::LastWeek => "qdr:w",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Last24h => "24h",
            TimeRange::LastWeek => "1w",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "24h" => Ok(TimeRange::Last24h),
            "1w" => Ok(TimeRange::LastWeek),
            other => Err(format!("invalid time range: {other}")),
        }
    }
}
