// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 配置错误类型
///
/// 配置错误在运行开始前即中止，不进入重试
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("站点列表文件不存在: {0}")]
    SiteListMissing(String),

    #[error("无效的调度间隔: {0}")]
    InvalidInterval(String),

    #[error("配置读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置格式错误: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// 数据集落盘错误类型
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("编码错误: {0}")]
    Encoding(String),

    #[error("缺少必需列: {0}")]
    MissingColumn(String),

    #[error("不支持的文件格式: {0}")]
    UnsupportedFormat(String),

    #[error("表格引擎错误: {0}")]
    Spreadsheet(String),
}
