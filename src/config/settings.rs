// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::time_range::TimeRange;
use crate::utils::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 用户偏好设置
///
/// 与磁盘上的 JSON 键值文件往返；缺失的键使用下列默认值
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// 站点列表文件路径（默认空）
    pub site_list_path: String,
    /// 既有数据集文件路径（默认空）
    pub dataset_path: String,
    /// 是否复用既有数据集文件（默认 false）
    pub use_existing_dataset: bool,
    /// 是否启用代理（默认 false）
    pub proxy_enabled: bool,
    /// 代理主机（默认 127.0.0.1）
    pub proxy_host: String,
    /// 代理端口（默认 7890）
    pub proxy_port: u16,
    /// 搜索时间范围（默认 24h）
    pub time_range: TimeRange,
    /// 是否启用定时任务（默认 false）
    pub scheduler_enabled: bool,
    /// 调度间隔，分钟（默认 1440）
    pub interval_minutes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_list_path: String::new(),
            dataset_path: String::new(),
            use_existing_dataset: false,
            proxy_enabled: false,
            proxy_host: "127.0.0.1".to_string(),
            proxy_port: 7890,
            time_range: TimeRange::Last24h,
            scheduler_enabled: false,
            interval_minutes: 1440,
        }
    }
}

impl Settings {
    /// 加载配置；文件不存在时返回默认值
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 保存配置
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
