// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 提取管线端到端测试
//!
//! 覆盖典型站点页面布局：结构化文本行、横向/纵向表格、
//! 倒计时控件、考核邀请页面。

use assessrs::domain::models::{Assessment, AssessmentStatus};
use assessrs::extract::result::build_result;
use assessrs::extract::rules::Rules;
use assessrs::extract::AssessmentExtractor;

fn extract(html: &str) -> Option<Assessment> {
    AssessmentExtractor::default().extract(html)
}

#[test]
fn structured_line_page_yields_full_assessment() {
    let html = r#"
        <html><body>
        <h1>欢迎回来，测试用户</h1>
        <div class="assessment">
            <p>名称：新手考核</p>
            <p>考核时间：2024-01-01 00:00:00 至 2030-12-31 23:59:59</p>
            <p>指标1：上传量，要求：100 GB，当前：50 GB，结果：未通过</p>
            <p>指标2：分享率，要求：1.5，当前：2.0，结果：通过</p>
        </div>
        <div>最新种子</div>
        <table><tr><td>Movie.2024.1080p.BluRay.x264</td><td>12 GB</td></tr></table>
        </body></html>
    "#;

    let assessment = extract(html).expect("应检测到考核");
    assert_eq!(assessment.name, "新手考核");
    assert_eq!(assessment.start_time.as_deref(), Some("2024-01-01 00:00:00"));
    assert_eq!(assessment.end_time.as_deref(), Some("2030-12-31 23:59:59"));
    assert_eq!(assessment.metrics.len(), 2);

    let upload = &assessment.metrics[0];
    assert_eq!(upload.name, "上传量");
    assert_eq!(upload.index, Some(1));
    assert_eq!(upload.required.as_deref(), Some("100 GB"));
    assert_eq!(upload.current.as_deref(), Some("50 GB"));
    assert_eq!(upload.passed, Some(false));

    let rules = Rules::default();
    let result = build_result(&rules, 1, "测试站", &assessment).expect("应产生结果");
    assert_eq!(result.status, AssessmentStatus::InProgress);
    assert!((result.progress - 0.75).abs() < 1e-9);
    assert!(result.remaining_days.unwrap() > 0);
    assert!(result.message.starts_with("[新手考核]"));
}

#[test]
fn horizontal_table_page_maps_columns() {
    let html = r#"
        <html><body>
        <h2>【新手考核】</h2>
        <table>
            <tr><th>指标</th><th>要求</th><th>当前</th><th>结果</th></tr>
            <tr><td>魔力</td><td>1000</td><td>1500</td><td>通过</td></tr>
            <tr><td>上传量</td><td>100 GB</td><td>50 GB</td><td>未通过</td></tr>
            <tr><td>做种时间</td><td>100 小时</td><td>120 小时</td><td></td></tr>
        </table>
        </body></html>
    "#;

    let assessment = extract(html).expect("应检测到考核");
    assert_eq!(assessment.name, "新手考核");
    assert_eq!(assessment.metrics.len(), 3);
    assert_eq!(assessment.metrics[0].passed, Some(true));
    assert_eq!(assessment.metrics[1].passed, Some(false));
    // 结果列为空时按数值比较推断
    assert_eq!(assessment.metrics[2].passed, Some(true));
}

#[test]
fn countdown_widget_with_title_attribute() {
    let html = r#"
        <html><body>
        <p>离新手考核结束还有 <span title="2030-06-30 12:00:00">30天</span></p>
        <p>上传量： 还需要 97.60 GB</p>
        </body></html>
    "#;

    let assessment = extract(html).expect("应检测到考核");
    assert_eq!(assessment.name, "新手考核");
    assert_eq!(assessment.end_time.as_deref(), Some("2030-06-30 12:00:00"));
    assert_eq!(assessment.metrics.len(), 1);
    assert_eq!(assessment.metrics[0].passed, Some(false));
    assert_eq!(assessment.metrics[0].current.as_deref(), Some("还需 97.60 GB"));
}

#[test]
fn invitation_page_is_not_an_active_assessment() {
    let html = r#"
        <html><body>
        <p>用户开启新手考核后需在规定时间内完成全部指标</p>
        <p>点击这里进入考核页面</p>
        </body></html>
    "#;
    assert!(extract(html).is_none());
}

#[test]
fn page_without_assessment_yields_none() {
    let html = r#"
        <html><body>
        <h1>最新种子</h1>
        <p>今日访问人数：52,341</p>
        <p>注册用户：100,000</p>
        </body></html>
    "#;
    assert!(extract(html).is_none());
}

#[test]
fn assessment_without_metrics_yields_none() {
    let html = "<html><body><p>名称：新手考核</p><p>祝各位考核顺利</p></body></html>";
    assert!(extract(html).is_none());
}

#[test]
fn vertical_table_layout() {
    let html = r#"
        <html><body>
        <table>
            <tr><td colspan="2">养成期考核</td></tr>
            <tr><td>上传量</td><td>50 GB / 100 GB</td></tr>
            <tr><td>分享率</td><td>已通过</td></tr>
        </table>
        </body></html>
    "#;

    let assessment = extract(html).expect("应检测到考核");
    assert_eq!(assessment.metrics.len(), 2);
    assert_eq!(assessment.metrics[0].current.as_deref(), Some("50 GB"));
    assert_eq!(assessment.metrics[0].required.as_deref(), Some("100 GB"));
    assert_eq!(assessment.metrics[1].passed, Some(true));
}

#[test]
fn traditional_chinese_page() {
    let html = r#"
        <html><body>
        <p>名稱：試用期考核</p>
        <p>指標1：上傳量，要求：100 GB，當前：120 GB，結果：通過</p>
        </body></html>
    "#;

    let assessment = extract(html).expect("应检测到考核");
    assert_eq!(assessment.name, "試用期考核");
    assert_eq!(assessment.metrics.len(), 1);
    assert_eq!(assessment.metrics[0].passed, Some(true));

    let rules = Rules::default();
    let result = build_result(&rules, 2, "繁体站", &assessment).expect("应产生结果");
    assert_eq!(result.status, AssessmentStatus::Completed);
    assert_eq!(result.progress, 1.0);
}

#[test]
fn expired_assessment_with_failed_metric() {
    let html = r#"
        <html><body>
        <p>名称：新手考核</p>
        <p>考核时间：2020-01-01 ~ 2020-02-01</p>
        <p>指标1：上传量，要求：100 GB，当前：50 GB，结果：未通过</p>
        </body></html>
    "#;

    let assessment = extract(html).expect("应检测到考核");
    let rules = Rules::default();
    let result = build_result(&rules, 3, "过期站", &assessment).expect("应产生结果");
    assert_eq!(result.status, AssessmentStatus::Failed);
    assert!(result.remaining_days.unwrap() < 0);
}

#[test]
fn extraction_is_idempotent() {
    let html = r#"
        <html><body>
        <p>名称：新手考核</p>
        <p>指标1：上传量，要求：100 GB，当前：50 GB，结果：未通过</p>
        </body></html>
    "#;
    let extractor = AssessmentExtractor::default();
    assert_eq!(extractor.extract(html), extractor.extract(html));
}
