// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 考核服务集成测试
//!
//! 用wiremock模拟站点首页，走完整的抓取-提取-持久化-提醒流程。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use assessrs::domain::models::{AssessmentStatus, SiteAssessmentResult, SiteDescriptor};
use assessrs::domain::services::{AssessmentService, NotifyPolicy};
use assessrs::engines::{PageFetcher, ReqwestEngine};
use assessrs::extract::AssessmentExtractor;
use assessrs::infrastructure::{Notifier, ResultStore};

/// 记录收到提醒的测试通知器
#[derive(Default)]
struct RecordingNotifier {
    received: Mutex<Vec<SiteAssessmentResult>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, result: &SiteAssessmentResult) {
        self.received.lock().await.push(result.clone());
    }
}

fn site(id: i64, name: &str, url: String) -> SiteDescriptor {
    SiteDescriptor {
        id,
        name: name.to_string(),
        url,
        cookie: Some("uid=1; pass=abc".to_string()),
        user_agent: None,
        use_proxy: false,
        timeout_secs: Some(10),
    }
}

const ASSESSMENT_PAGE: &str = r#"
    <html><body>
    <p>名称：新手考核</p>
    <p>考核时间：2024-01-01 00:00:00 至 2030-12-31 23:59:59</p>
    <p>指标1：上传量，要求：100 GB，当前：50 GB，结果：未通过</p>
    <p>指标2：分享率，要求：1.5，当前：2.0，结果：通过</p>
    </body></html>
"#;

const PLAIN_PAGE: &str = "<html><body><p>最新种子</p></body></html>";

fn service(
    sites: Vec<SiteDescriptor>,
    store: Arc<ResultStore>,
    notifier: Arc<RecordingNotifier>,
    notify_days: i64,
) -> AssessmentService {
    AssessmentService::new(
        Arc::new(ReqwestEngine::new(None)),
        AssessmentExtractor::default(),
        store,
        notifier,
        NotifyPolicy {
            enabled: true,
            remaining_days: notify_days,
        },
        sites,
    )
}

#[tokio::test]
async fn test_refresh_detects_and_persists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("cookie", "uid=1; pass=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ASSESSMENT_PAGE))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ResultStore::new(dir.path().join("results.json")));
    let notifier = Arc::new(RecordingNotifier::default());
    let svc = service(
        vec![site(1, "测试站", server.uri())],
        Arc::clone(&store),
        Arc::clone(&notifier),
        3,
    );

    let results = svc.refresh().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].site_id, 1);
    assert_eq!(results[0].status, AssessmentStatus::InProgress);
    assert!((results[0].progress - 0.75).abs() < 1e-9);

    // 缓存与落盘内容一致
    assert_eq!(svc.results().await.len(), 1);
    let persisted = store.load().await.unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].message, results[0].message);

    // 剩余天数远超阈值，不应提醒
    assert!(notifier.received.lock().await.is_empty());
}

#[tokio::test]
async fn test_site_without_assessment_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PLAIN_PAGE))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ResultStore::new(dir.path().join("results.json")));
    let notifier = Arc::new(RecordingNotifier::default());
    let svc = service(
        vec![site(1, "普通站", server.uri())],
        store,
        notifier,
        3,
    );

    assert!(svc.refresh().await.is_empty());
}

#[tokio::test]
async fn test_non_200_response_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ResultStore::new(dir.path().join("results.json")));
    let notifier = Arc::new(RecordingNotifier::default());
    let svc = service(
        vec![site(1, "封禁站", server.uri())],
        store,
        notifier,
        3,
    );

    assert!(svc.refresh().await.is_empty());
}

#[tokio::test]
async fn test_failed_site_does_not_break_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ASSESSMENT_PAGE))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ResultStore::new(dir.path().join("results.json")));
    let notifier = Arc::new(RecordingNotifier::default());
    let svc = service(
        vec![
            site(1, "不可达站", "http://127.0.0.1:1/".to_string()),
            site(2, "测试站", server.uri()),
        ],
        store,
        notifier,
        3,
    );

    let results = svc.refresh().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].site_id, 2);
}

#[tokio::test]
async fn test_failed_assessment_triggers_notification() {
    let expired_page = r#"
        <html><body>
        <p>名称：新手考核</p>
        <p>考核时间：2020-01-01 ~ 2020-02-01</p>
        <p>指标1：上传量，要求：100 GB，当前：50 GB，结果：未通过</p>
        </body></html>
    "#;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(expired_page))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ResultStore::new(dir.path().join("results.json")));
    let notifier = Arc::new(RecordingNotifier::default());
    let svc = service(
        vec![site(1, "过期站", server.uri())],
        store,
        Arc::clone(&notifier),
        3,
    );

    let results = svc.refresh().await;
    assert_eq!(results[0].status, AssessmentStatus::Failed);

    let received = notifier.received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].site_id, 1);
}

#[tokio::test]
async fn test_gbk_page_is_decoded() {
    let (gbk_bytes, _, _) = encoding_rs::GBK.encode(ASSESSMENT_PAGE);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(gbk_bytes.into_owned(), "text/html; charset=gbk"),
        )
        .mount(&server)
        .await;

    let engine = ReqwestEngine::new(None);
    let page = engine.fetch(&site(1, "GBK站", server.uri())).await.unwrap();
    assert!(page.html.contains("新手考核"));
}
