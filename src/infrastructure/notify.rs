// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 考核提醒
//!
//! 临期或失败的考核通过`Notifier`发出提醒。默认实现写结构化日志，
//! 接入IM推送时实现同一特质即可。

use async_trait::async_trait;
use tracing::warn;

use crate::domain::models::{AssessmentStatus, SiteAssessmentResult};

/// 提醒发送特质
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 发送一条考核提醒
    async fn notify(&self, result: &SiteAssessmentResult);
}

/// 日志提醒器
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, result: &SiteAssessmentResult) {
        match result.status {
            AssessmentStatus::Failed => {
                warn!(
                    site = %result.site_name,
                    message = %result.message,
                    "考核未通过"
                );
            }
            _ => {
                warn!(
                    site = %result.site_name,
                    remaining_days = ?result.remaining_days,
                    progress = result.progress,
                    message = %result.message,
                    "考核临近截止"
                );
            }
        }
    }
}
