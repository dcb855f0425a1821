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

use anyhow::Context;
use clap::Parser;
use monitrs::config::settings::Settings;
use monitrs::domain::models::time_range::TimeRange;
use monitrs::domain::progress::Progress;
use monitrs::infrastructure::progress::ConsoleProgress;
use monitrs::infrastructure::search::google::{GoogleConfig, GoogleSearchEngine, ProxyConfig};
use monitrs::queue::scheduler::MonitorScheduler;
use monitrs::utils::errors::ConfigError;
use monitrs::utils::telemetry;
use monitrs::workers::monitor_worker::{MonitorWorker, WorkerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// 游戏网站收录监控工具
#[derive(Parser, Debug)]
#[command(name = "monitrs", version, about = "Monitors game sites for newly indexed pages")]
struct Cli {
    /// 配置文件路径
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// 站点列表文件（每行一个域名），覆盖配置文件
    #[arg(long)]
    sites: Option<PathBuf>,

    /// 既有数据集文件（.csv/.tsv/.xlsx），覆盖配置文件
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// 搜索时间范围（24h 或 1w），可重复指定
    #[arg(long = "time-range")]
    time_ranges: Vec<TimeRange>,

    /// 代理主机
    #[arg(long)]
    proxy_host: Option<String>,

    /// 代理端口
    #[arg(long)]
    proxy_port: Option<u16>,

    /// 以固定间隔（分钟）调度运行；缺省时按配置决定
    #[arg(long)]
    interval: Option<u64>,

    /// 调度模式下跳过启动时的立即执行
    #[arg(long)]
    no_immediate_run: bool,

    /// 日志目录
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging
    let _log_guard = telemetry::init_telemetry(&cli.log_dir);
    info!("Starting monitrs...");

    // 2. Load configuration and fold in CLI overrides
    let mut settings = Settings::load(&cli.config).context("加载配置失败")?;
    apply_overrides(&mut settings, &cli);
    settings.save(&cli.config).context("保存配置失败")?;
    info!("Configuration loaded");

    // 3. Wire up the search engine
    let proxy = settings.proxy_enabled.then(|| ProxyConfig {
        host: settings.proxy_host.clone(),
        port: settings.proxy_port,
    });
    let engine = GoogleSearchEngine::new(GoogleConfig {
        proxy,
        ..GoogleConfig::default()
    })?;

    let time_ranges = if cli.time_ranges.is_empty() {
        vec![settings.time_range]
    } else {
        cli.time_ranges.clone()
    };

    let worker_config = WorkerConfig {
        sites_file: PathBuf::from(&settings.site_list_path),
        existing_dataset: (settings.use_existing_dataset && !settings.dataset_path.is_empty())
            .then(|| PathBuf::from(&settings.dataset_path)),
        time_ranges,
        ..WorkerConfig::default()
    };

    let progress = Progress::new(Arc::new(ConsoleProgress));
    let worker = Arc::new(MonitorWorker::new(Arc::new(engine), progress, worker_config));

    // 4. Run once or hand the pipeline to the scheduler
    if settings.scheduler_enabled {
        if settings.interval_minutes == 0 {
            return Err(ConfigError::InvalidInterval("0 分钟".to_string()).into());
        }
        let interval = Duration::from_secs(settings.interval_minutes * 60);

        let scheduler = MonitorScheduler::new();
        let job_worker = worker.clone();
        scheduler.start(interval, !cli.no_immediate_run, move || {
            let worker = job_worker.clone();
            async move {
                if let Err(err) = worker.run().await {
                    error!("monitoring run failed: {err}");
                }
            }
        });
        if let Some(remaining) = scheduler.time_to_next_run() {
            info!("Next run in {}s", remaining.as_secs());
        }

        tokio::signal::ctrl_c().await.context("等待退出信号失败")?;
        scheduler.stop();
        info!("Scheduler stopped");
    } else {
        let outcome = worker.run().await?;
        info!("Run finished with {} records", outcome.dataset.len());
    }

    Ok(())
}

fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(sites) = &cli.sites {
        settings.site_list_path = sites.display().to_string();
    }
    if let Some(dataset) = &cli.dataset {
        settings.dataset_path = dataset.display().to_string();
        settings.use_existing_dataset = true;
    }
    if let Some(host) = &cli.proxy_host {
        settings.proxy_host = host.clone();
        settings.proxy_enabled = true;
    }
    if let Some(port) = cli.proxy_port {
        settings.proxy_port = port;
        settings.proxy_enabled = true;
    }
    if let Some(first) = cli.time_ranges.first() {
        settings.time_range = *first;
    }
    if let Some(interval) = cli.interval {
        settings.scheduler_enabled = true;
        settings.interval_minutes = interval;
    }
}
