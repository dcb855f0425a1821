// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 重试策略配置
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（含首次请求）
    pub max_retries: u32,
    /// 初始退避时间，之后逐次翻倍
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(60),
        }
    }
}

/// 单次抓取范围内的重试状态，成功或耗尽后即丢弃
#[derive(Debug, Clone, PartialEq)]
pub struct RetryState {
    attempt: u32,
    delay: Duration,
}

/// 对一次失败结果的纯决策
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    /// 按当前退避时间等待后重试
    RetryAfter(Duration),
    /// 放弃当前 (site, time_range) 对
    Abandon,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn start(&self) -> RetryState {
        RetryState {
            attempt: 1,
            delay: self.base_delay,
        }
    }

    /// 决定失败后的去向：可重试错误且预算未耗尽时返回当前退避时间
    pub fn decide(&self, state: &RetryState, retryable: bool) -> RetryDecision {
        if retryable && state.attempt < self.max_retries {
            RetryDecision::RetryAfter(state.delay)
        } else {
            RetryDecision::Abandon
        }
    }
}

impl RetryState {
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// 进入下一次尝试：计数加一，退避时间翻倍
    pub fn advance(&mut self) {
        self.attempt += 1;
        self.delay *= 2;
    }
}
