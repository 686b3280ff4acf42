// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::domain::services::AssessmentService;

/// 定时刷新工作器
///
/// 按配置周期触发考核状态刷新
pub struct RefreshWorker {
    service: Arc<AssessmentService>,
    interval: Duration,
}

impl RefreshWorker {
    pub fn new(service: Arc<AssessmentService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// 运行工作器
    pub async fn run(&self) {
        info!(interval_secs = self.interval.as_secs(), "刷新工作器已启动");

        let mut interval = tokio::time::interval(self.interval);
        // 首个tick立即完成，由启动逻辑决定是否先刷新一次
        interval.tick().await;

        loop {
            interval.tick().await;
            let results = self.service.refresh().await;
            info!(detected = results.len(), "定时刷新完成");
        }
    }

    /// 启动后台运行
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}
