// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Local;
use std::sync::Arc;
use tracing::info;

/// 进度事件接收端
///
/// 管道的每个重要事件（尝试、退避等待、结果数、运行摘要、错误）
/// 都会格式化为一行带时间戳的文本推送到该接口，
/// 管道因此与任何具体展示层解耦
pub trait ProgressSink: Send + Sync {
    fn report(&self, line: &str);
}

/// 丢弃全部进度事件
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _line: &str) {}
}

/// 进度汇报辅助：统一加时间戳并镜像到 tracing 日志
#[derive(Clone)]
pub struct Progress {
    sink: Arc<dyn ProgressSink>,
}

impl Progress {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self { sink }
    }

    pub fn emit(&self, message: &str) {
        info!("{message}");
        let line = format!("{} - {}", Local::now().format("%Y-%m-%d %H:%M:%S"), message);
        self.sink.report(&line);
    }
}
