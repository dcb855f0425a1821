// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::progress::ProgressSink;

/// 将进度行打印到终端
///
/// 对应原交互界面中的进度文本区域
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn report(&self, line: &str) {
        println!("{line}");
    }
}
