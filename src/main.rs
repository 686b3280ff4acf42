// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use assessrs::config::settings::Settings;
use assessrs::domain::services::{AssessmentService, NotifyPolicy};
use assessrs::engines::ReqwestEngine;
use assessrs::extract::rules::Rules;
use assessrs::extract::AssessmentExtractor;
use assessrs::infrastructure::{LogNotifier, ResultStore};
use assessrs::utils::telemetry;
use assessrs::workers::RefreshWorker;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动定时刷新
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting assessrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!(sites = settings.sites.len(), "Configuration loaded");

    // 3. Wire up components
    let rules = Rules::with_timezone(settings.timezone());
    let extractor = AssessmentExtractor::new(rules);
    let fetcher = Arc::new(ReqwestEngine::new(settings.fetch.proxy_url.clone()));
    let store = Arc::new(ResultStore::new(&settings.storage.results_path));
    let notifier = Arc::new(LogNotifier);
    let notify_policy = NotifyPolicy {
        enabled: settings.notify.enabled,
        remaining_days: settings.notify.remaining_days,
    };

    let service = Arc::new(AssessmentService::new(
        fetcher,
        extractor,
        store,
        notifier,
        notify_policy,
        settings.sites.clone(),
    ));

    // 4. Optional immediate refresh on start
    if settings.scheduler.run_on_start {
        info!("Running initial refresh");
        service.refresh().await;
    }

    // 5. Start periodic refresh worker
    let interval = Duration::from_secs(settings.scheduler.interval_hours * 3600);
    let worker = RefreshWorker::new(Arc::clone(&service), interval);
    worker.start().await?;

    Ok(())
}
