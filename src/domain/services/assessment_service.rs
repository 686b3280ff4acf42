// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 考核服务
//!
//! 刷新流程：逐站点抓取首页 -> 提取考核 -> 推导结果，
//! 然后整体替换缓存、持久化，并对临期/失败的考核发提醒。

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::domain::models::{AssessmentStatus, SiteAssessmentResult, SiteDescriptor};
use crate::engines::PageFetcher;
use crate::extract::result::build_result;
use crate::extract::AssessmentExtractor;
use crate::infrastructure::{Notifier, ResultStore};

/// 提醒策略
#[derive(Debug, Clone)]
pub struct NotifyPolicy {
    /// 是否启用提醒
    pub enabled: bool,
    /// 剩余天数不超过该值时提醒
    pub remaining_days: i64,
}

/// 考核服务
pub struct AssessmentService {
    fetcher: Arc<dyn PageFetcher>,
    extractor: AssessmentExtractor,
    store: Arc<ResultStore>,
    notifier: Arc<dyn Notifier>,
    notify_policy: NotifyPolicy,
    sites: Vec<SiteDescriptor>,
    cache: RwLock<Vec<SiteAssessmentResult>>,
}

impl AssessmentService {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: AssessmentExtractor,
        store: Arc<ResultStore>,
        notifier: Arc<dyn Notifier>,
        notify_policy: NotifyPolicy,
        sites: Vec<SiteDescriptor>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
            notifier,
            notify_policy,
            sites,
            cache: RwLock::new(Vec::new()),
        }
    }

    /// 评估单个站点
    ///
    /// 抓取失败、非200响应、页面无考核内容时返回`None`，
    /// 单个站点的失败不会中断整轮刷新
    pub async fn evaluate_site(&self, site: &SiteDescriptor) -> Option<SiteAssessmentResult> {
        let page = match self.fetcher.fetch(site).await {
            Ok(page) => page,
            Err(e) => {
                error!(site = %site.name, error = %e, "站点抓取失败");
                return None;
            }
        };

        if page.status_code != 200 {
            warn!(site = %site.name, status = page.status_code, "站点返回非200状态码");
            return None;
        }

        let assessment = match self.extractor.extract(&page.html) {
            Some(assessment) => assessment,
            None => {
                debug!(site = %site.name, "页面未检测到考核内容");
                return None;
            }
        };

        let result = match build_result(self.extractor.rules(), site.id, &site.name, &assessment) {
            Some(result) => result,
            None => {
                debug!(site = %site.name, "考核指标缺少有效观测值");
                return None;
            }
        };
        info!(
            site = %site.name,
            status = ?result.status,
            progress = result.progress,
            remaining_days = ?result.remaining_days,
            "站点考核评估完成"
        );
        Some(result)
    }

    /// 刷新全部站点
    ///
    /// 结果整体替换缓存并持久化；持久化失败只记日志不中断
    pub async fn refresh(&self) -> Vec<SiteAssessmentResult> {
        info!(sites = self.sites.len(), "开始刷新站点考核状态");

        let mut results = Vec::new();
        for site in &self.sites {
            if let Some(result) = self.evaluate_site(site).await {
                results.push(result);
            }
        }

        {
            let mut cache = self.cache.write().await;
            *cache = results.clone();
        }

        if let Err(e) = self.store.save(&results).await {
            error!(error = %e, "考核结果持久化失败");
        }

        self.send_notifications(&results).await;

        info!(detected = results.len(), "刷新完成");
        results
    }

    /// 读取缓存中的最新结果
    pub async fn results(&self) -> Vec<SiteAssessmentResult> {
        self.cache.read().await.clone()
    }

    /// 对失败和临期的考核发送提醒
    async fn send_notifications(&self, results: &[SiteAssessmentResult]) {
        if !self.notify_policy.enabled {
            return;
        }

        for result in results {
            let should_notify = match result.status {
                AssessmentStatus::Failed => true,
                AssessmentStatus::InProgress => result
                    .remaining_days
                    .is_some_and(|d| d >= 0 && d <= self.notify_policy.remaining_days),
                AssessmentStatus::Completed => false,
            };
            if should_notify {
                self.notifier.notify(result).await;
            }
        }
    }
}
