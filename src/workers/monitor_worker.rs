// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::dataset::Dataset;
use crate::domain::models::record::MonitorRecord;
use crate::domain::models::run_stats::RunStats;
use crate::domain::models::time_range::TimeRange;
use crate::domain::progress::Progress;
use crate::domain::search::engine::SearchEngine;
use crate::domain::services::extraction::extract_game_name;
use crate::infrastructure::sink::{sink_for_path, DelimitedSink, LoadedDataset, TabularSink};
use crate::utils::errors::ConfigError;
use crate::utils::site_list::load_sites;
use chrono::Local;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// 监控工作器配置
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// 站点列表文件
    pub sites_file: PathBuf,
    /// 既有数据集文件；为空时新建带时间戳命名的 CSV
    pub existing_dataset: Option<PathBuf>,
    /// 本次运行覆盖的时间范围，按给定顺序处理
    pub time_ranges: Vec<TimeRange>,
    /// 每次抓取后的随机延迟区间（秒），上界为 0 时不延迟
    pub request_delay_secs: (u64, u64),
    /// 新建输出文件所在目录
    pub output_dir: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            sites_file: PathBuf::from("game_sites.txt"),
            existing_dataset: None,
            time_ranges: vec![TimeRange::Last24h],
            request_delay_secs: (5, 15),
            output_dir: PathBuf::from("."),
        }
    }
}

/// 一次监控运行的产出
#[derive(Debug)]
pub struct RunOutcome {
    pub dataset: Dataset,
    pub stats: RunStats,
    /// 成功写出的文件；未写出（无新增或落盘失败）时为 None
    pub output_path: Option<PathBuf>,
}

/// 监控工作器：执行一次完整的 抓取 → 提取 → 去重 → 合并 → 落盘 周期
///
/// 站点按列表顺序处理，时间范围按给定顺序处理；
/// 已接受的 url 立即进入去重集合，同一轮运行内跨站点同样抑制重复
pub struct MonitorWorker {
    engine: Arc<dyn SearchEngine>,
    progress: Progress,
    config: WorkerConfig,
}

impl MonitorWorker {
    pub fn new(engine: Arc<dyn SearchEngine>, progress: Progress, config: WorkerConfig) -> Self {
        Self {
            engine,
            progress,
            config,
        }
    }

    /// 执行一次监控运行
    ///
    /// 只有配置错误会使运行整体失败；单个 (site, time_range) 对的
    /// 任何错误都不会中断其余组合的处理
    pub async fn run(&self) -> Result<RunOutcome, ConfigError> {
        let sites = load_sites(&self.config.sites_file)?;
        info!("Loaded {} sites from {}", sites.len(), self.config.sites_file.display());

        let (target, mut sink, loaded) = self.open_target();
        let (existing_dataset, mut seen_urls) = match loaded {
            Some(loaded) => (loaded.dataset, loaded.urls),
            None => (Dataset::new(), HashSet::new()),
        };

        let mut stats = RunStats {
            original_count: existing_dataset.len(),
            ..RunStats::default()
        };
        let mut new_records: Vec<MonitorRecord> = Vec::new();

        for site in &sites {
            for &time_range in &self.config.time_ranges {
                let hits = match self.engine.search(site, time_range).await {
                    Ok(hits) => hits,
                    Err(err) => {
                        self.progress
                            .emit(&format!("Error monitoring {site}: {err}"));
                        Vec::new()
                    }
                };

                let mut accepted = 0usize;
                for hit in hits {
                    let Some(game_name) = extract_game_name(&hit.title) else {
                        continue;
                    };
                    if !seen_urls.insert(hit.url.clone()) {
                        stats.record_duplicate();
                        continue;
                    }
                    stats.record_new(site, time_range);
                    accepted += 1;
                    new_records.push(MonitorRecord::new(
                        hit.title,
                        hit.url,
                        game_name,
                        site.clone(),
                        time_range,
                    ));
                }
                self.progress
                    .emit(&format!("{site} ({time_range}): {accepted} new records"));

                self.pause_between_requests().await;
            }
        }

        if new_records.is_empty() {
            if stats.duplicate_count > 0 {
                self.progress.emit(&format!(
                    "本次运行仅发现重复记录 {} 条，未新增数据",
                    stats.duplicate_count
                ));
            } else {
                self.progress.emit("未找到任何结果");
                info!("No results found");
            }
            return Ok(RunOutcome {
                dataset: Dataset::new(),
                stats,
                output_path: None,
            });
        }

        let dataset = existing_dataset.merged_with(new_records);
        stats.final_count = dataset.len();

        let output_path = self.persist(&target, sink.as_mut(), &dataset);

        for line in stats.summary_lines() {
            self.progress.emit(&line);
        }
        if let Some(path) = &output_path {
            self.progress.emit(&format!("结果已保存至: {}", path.display()));
        }

        Ok(RunOutcome {
            dataset,
            stats,
            output_path,
        })
    }

    /// 确定输出目标与既有数据：优先复用既有文件及其格式与编码
    fn open_target(&self) -> (PathBuf, Box<dyn TabularSink>, Option<LoadedDataset>) {
        if let Some(path) = &self.config.existing_dataset {
            if path.exists() {
                match sink_for_path(path) {
                    Ok(mut sink) => match sink.load(path) {
                        Ok(loaded) => {
                            info!(
                                "Loaded {} existing records from {}",
                                loaded.dataset.len(),
                                path.display()
                            );
                            return (path.clone(), sink, Some(loaded));
                        }
                        Err(err) => {
                            self.progress
                                .emit(&format!("Error loading existing dataset: {err}"));
                            return (path.clone(), sink, None);
                        }
                    },
                    Err(err) => {
                        self.progress
                            .emit(&format!("Unsupported existing dataset: {err}"));
                    }
                }
            } else {
                warn!("existing dataset {} not found, starting fresh", path.display());
            }
        }

        let name = format!(
            "game_monitor_results_{}.csv",
            Local::now().format("%Y%m%d_%H%M%S")
        );
        (
            self.config.output_dir.join(name),
            Box::new(DelimitedSink::comma()),
            None,
        )
    }

    /// 落盘；主写失败时回退为带 `_backup` 后缀的 UTF-8 CSV
    fn persist(
        &self,
        target: &Path,
        sink: &mut dyn TabularSink,
        dataset: &Dataset,
    ) -> Option<PathBuf> {
        match sink.write(target, dataset) {
            Ok(()) => Some(target.to_path_buf()),
            Err(err) => {
                self.progress.emit(&format!(
                    "写入 {} 失败: {err}，改写备份文件",
                    target.display()
                ));
                let backup = backup_path(target);
                match DelimitedSink::utf8_backup().write(&backup, dataset) {
                    Ok(()) => {
                        self.progress
                            .emit(&format!("备份文件已写出: {}", backup.display()));
                        Some(backup)
                    }
                    Err(err) => {
                        error!("backup write failed: {err}");
                        self.progress.emit(&format!(
                            "备份写入也失败: {err}，本次结果仅保留在内存中"
                        ));
                        None
                    }
                }
            }
        }
    }

    async fn pause_between_requests(&self) {
        let (min, max) = self.config.request_delay_secs;
        if max == 0 {
            return;
        }
        let secs = if max > min {
            rand::random_range(min..=max)
        } else {
            min
        };
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }
}

fn backup_path(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("results");
    target.with_file_name(format!("{stem}_backup.csv"))
}
