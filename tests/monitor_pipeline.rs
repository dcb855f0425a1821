use monitrs::domain::models::time_range::TimeRange;
use monitrs::domain::progress::{NullProgress, Progress};
use monitrs::infrastructure::search::google::{GoogleConfig, GoogleSearchEngine};
use monitrs::utils::retry_policy::RetryPolicy;
use monitrs::workers::monitor_worker::{MonitorWorker, WorkerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn result_page(entries: &[(&str, &str)]) -> String {
    let blocks: String = entries
        .iter()
        .map(|(title, url)| {
            format!(r#"<div class="g"><a href="{url}"><h3>{title}</h3></a></div>"#)
        })
        .collect();
    format!("<html><body><div id=\"search\">{blocks}</div></body></html>")
}

fn test_engine(server_uri: &str) -> GoogleSearchEngine {
    GoogleSearchEngine::new(GoogleConfig {
        endpoint: format!("{server_uri}/search"),
        retry: RetryPolicy::new(3, Duration::from_millis(10)),
        ..GoogleConfig::default()
    })
    .expect("engine")
}

fn write_sites(dir: &TempDir, sites: &[&str]) -> PathBuf {
    let path = dir.path().join("sites.txt");
    std::fs::write(&path, sites.join("\n")).expect("write site list");
    path
}

fn test_worker(
    engine: GoogleSearchEngine,
    sites_file: PathBuf,
    existing: Option<PathBuf>,
    output_dir: PathBuf,
) -> MonitorWorker {
    MonitorWorker::new(
        Arc::new(engine),
        Progress::new(Arc::new(NullProgress)),
        WorkerConfig {
            sites_file,
            existing_dataset: existing,
            time_ranges: vec![TimeRange::Last24h],
            request_delay_secs: (0, 0),
            output_dir,
        },
    )
}

#[tokio::test]
async fn run_collects_new_records_across_sites() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "site:a.example"))
        .respond_with(ResponseTemplate::new(200).set_body_string(result_page(&[
            ("《Game One》攻略", "https://a.example/x"),
            ("《Game Two》评测", "https://a.example/y"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "site:b.example"))
        .respond_with(ResponseTemplate::new(200).set_body_string(result_page(&[])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let sites = write_sites(&dir, &["a.example", "b.example"]);
    let worker = test_worker(
        test_engine(&server.uri()),
        sites,
        None,
        dir.path().to_path_buf(),
    );

    let outcome = worker.run().await.expect("run succeeds");
    assert_eq!(outcome.stats.new_count, 2);
    assert_eq!(outcome.stats.duplicate_count, 0);
    assert_eq!(outcome.stats.final_count, 2);
    assert_eq!(outcome.dataset.len(), 2);
    assert_eq!(outcome.stats.per_site.get("a.example"), Some(&2));

    let output = outcome.output_path.expect("output file written");
    let content = String::from_utf8_lossy(&std::fs::read(&output).unwrap()).into_owned();
    assert!(content.contains("https://a.example/x"));
    assert!(content.contains("Game One"));
    assert!(content.contains("Game Two"));
}

#[tokio::test]
async fn existing_urls_are_suppressed_and_file_reused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(result_page(&[
            ("《Game One》攻略", "https://a.example/x"),
            ("《Game Three》资讯", "https://a.example/z"),
        ])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let existing = dir.path().join("results.csv");
    std::fs::write(
        &existing,
        "title,url,game_name,site,time_range,timestamp\n\
         《Game One》攻略,https://a.example/x,Game One,a.example,24h,2026-08-01 10:00:00\n",
    )
    .unwrap();

    let sites = write_sites(&dir, &["a.example"]);
    let worker = test_worker(
        test_engine(&server.uri()),
        sites,
        Some(existing.clone()),
        dir.path().to_path_buf(),
    );

    let outcome = worker.run().await.expect("run succeeds");
    assert_eq!(outcome.stats.original_count, 1);
    assert_eq!(outcome.stats.new_count, 1);
    assert_eq!(outcome.stats.duplicate_count, 1);
    assert_eq!(outcome.stats.final_count, 2);
    assert_eq!(outcome.output_path.as_deref(), Some(existing.as_path()));

    let content = String::from_utf8_lossy(&std::fs::read(&existing).unwrap()).into_owned();
    // 同一 url 只保留一行
    assert_eq!(content.matches("https://a.example/x").count(), 1);
    assert!(content.contains("https://a.example/z"));
}

#[tokio::test]
async fn rate_limited_pair_is_retried_then_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let sites = write_sites(&dir, &["a.example"]);
    let worker = test_worker(
        test_engine(&server.uri()),
        sites,
        None,
        dir.path().to_path_buf(),
    );

    let outcome = worker.run().await.expect("run continues past the pair");
    assert_eq!(outcome.stats.new_count, 0);
    assert!(outcome.dataset.is_empty());
    assert!(outcome.output_path.is_none());
    // MockServer 在 drop 时校验恰好收到 3 次请求
}

#[tokio::test]
async fn other_statuses_abandon_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let sites = write_sites(&dir, &["a.example"]);
    let worker = test_worker(
        test_engine(&server.uri()),
        sites,
        None,
        dir.path().to_path_buf(),
    );

    let outcome = worker.run().await.expect("run continues past the pair");
    assert!(outcome.dataset.is_empty());
}

#[tokio::test]
async fn unencodable_merge_falls_back_to_backup_csv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(result_page(&[(
            "《🎮新作》下载",
            "https://a.example/new",
        )])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let existing = dir.path().join("results.csv");
    let csv = "title,url,game_name,site,time_range,timestamp\n\
               《旧游戏》攻略,https://a.example/old,旧游戏,a.example,24h,2026-08-01 10:00:00\n";
    let (gbk_bytes, _, had_errors) = encoding_rs::GBK.encode(csv);
    assert!(!had_errors);
    std::fs::write(&existing, &gbk_bytes).unwrap();

    let sites = write_sites(&dir, &["a.example"]);
    let worker = test_worker(
        test_engine(&server.uri()),
        sites,
        Some(existing.clone()),
        dir.path().to_path_buf(),
    );

    let outcome = worker.run().await.expect("run succeeds with fallback");
    assert_eq!(outcome.stats.new_count, 1);
    assert_eq!(outcome.stats.final_count, 2);

    let backup = dir.path().join("results_backup.csv");
    assert_eq!(outcome.output_path.as_deref(), Some(backup.as_path()));

    let bytes = std::fs::read(&backup).unwrap();
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    let text = String::from_utf8_lossy(&bytes).into_owned();
    assert!(text.contains("https://a.example/old"));
    assert!(text.contains("https://a.example/new"));

    // 原文件保持 GBK 原样
    let original = std::fs::read(&existing).unwrap();
    assert_eq!(original, gbk_bytes.as_ref());
}

#[tokio::test]
async fn missing_site_list_is_fatal_configuration_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let worker = test_worker(
        test_engine(&server.uri()),
        dir.path().join("nonexistent.txt"),
        None,
        dir.path().to_path_buf(),
    );

    assert!(worker.run().await.is_err());
}
