// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{info, warn};

type RunFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Job = Arc<dyn Fn() -> RunFuture + Send + Sync>;

/// 监控调度器
///
/// 实例级的显式定时器：armed 标志加单调的下次到期时刻，
/// 由独立轮询任务按固定短节拍检查是否到期。
/// 轮询任务只做到期判断，不执行任何网络 IO；
/// 多个调度器实例互不影响
pub struct MonitorScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<TimerState>,
    /// 运行守卫：同一时刻至多一次监控运行，到期时占用中则跳过本次触发
    run_guard: Arc<tokio::sync::Mutex<()>>,
    poll_cadence: Duration,
}

#[derive(Default)]
struct TimerState {
    armed: bool,
    interval: Duration,
    next_due: Option<Instant>,
    poll_task: Option<JoinHandle<()>>,
}

impl MonitorScheduler {
    pub fn new() -> Self {
        Self::with_poll_cadence(Duration::from_secs(30))
    }

    /// 自定义轮询节拍（测试用）
    pub fn with_poll_cadence(poll_cadence: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(TimerState::default()),
                run_guard: Arc::new(tokio::sync::Mutex::new(())),
                poll_cadence,
            }),
        }
    }

    /// 启动调度：stopped → running，已在运行时为幂等空操作
    ///
    /// `run_immediately` 为 true 时在设定定时器前先触发一次管道
    pub fn start<F, Fut>(&self, interval: Duration, run_immediately: bool, job: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut state = self.inner.state.lock();
        if state.armed {
            return;
        }

        let job: Job = Arc::new(move || -> RunFuture { Box::pin(job()) });

        if run_immediately {
            spawn_guarded(self.inner.run_guard.clone(), job.clone());
        }

        state.armed = true;
        state.interval = interval;
        state.next_due = Some(Instant::now() + interval);
        state.poll_task = Some(tokio::spawn(poll_loop(self.inner.clone(), job)));
        info!("scheduler armed, interval {}s", interval.as_secs());
    }

    /// 停止调度：running → stopped，已停止时为空操作
    ///
    /// 只取消未来的触发，不中断进行中的运行
    pub fn stop(&self) {
        let mut state = self.inner.state.lock();
        if !state.armed {
            return;
        }
        state.armed = false;
        state.next_due = None;
        if let Some(task) = state.poll_task.take() {
            task.abort();
        }
        info!("scheduler disarmed");
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.lock().armed
    }

    /// 距下次运行的剩余时间，仅供展示
    pub fn time_to_next_run(&self) -> Option<Duration> {
        let state = self.inner.state.lock();
        state
            .next_due
            .map(|due| due.saturating_duration_since(Instant::now()))
    }
}

impl Default for MonitorScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn poll_loop(inner: Arc<Inner>, job: Job) {
    let mut ticker = tokio::time::interval(inner.poll_cadence);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let due = {
            let mut state = inner.state.lock();
            if !state.armed {
                break;
            }
            match state.next_due {
                // 下次到期时刻从触发时刻起算，而非运行完成时刻
                Some(due) if Instant::now() >= due => {
                    state.next_due = Some(Instant::now() + state.interval);
                    true
                }
                _ => false,
            }
        };

        if due {
            spawn_guarded(inner.run_guard.clone(), job.clone());
        }
    }
}

fn spawn_guarded(run_guard: Arc<tokio::sync::Mutex<()>>, job: Job) {
    tokio::spawn(async move {
        match run_guard.try_lock() {
            Ok(_guard) => job().await,
            Err(_) => {
                warn!("previous monitoring run still in progress, skipping this trigger");
            }
        }
    });
}
