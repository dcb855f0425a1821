// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::time_range::TimeRange;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum SearchError {
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("Secure transport failure: {0}")]
    Tls(String),
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SearchError {
    /// 是否属于可按退避策略重试的瞬时失败
    ///
    /// 限流与一般网络错误可重试；其余状态码、TLS 失败
    /// 与解析错误立即放弃当前 (site, time_range) 对
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::RateLimited | SearchError::Transport(_))
    }
}

/// 引擎层搜索命中：标题与链接
///
/// 游戏名提取由领域服务在命中之上完成
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// 对单个站点执行一次限定时效的搜索
    async fn search(
        &self,
        site: &str,
        time_range: TimeRange,
    ) -> Result<Vec<SearchHit>, SearchError>;

    /// 搜索引擎名称
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(SearchError::RateLimited.is_retryable());
        assert!(SearchError::Transport("connection reset".into()).is_retryable());
        assert!(!SearchError::Status(503).is_retryable());
        assert!(!SearchError::Tls("certificate expired".into()).is_retryable());
        assert!(!SearchError::Parse("bad block".into()).is_retryable());
    }
}
