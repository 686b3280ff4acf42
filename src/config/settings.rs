// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::models::SiteDescriptor;

/// 应用程序配置设置
///
/// 包含调度、抓取、通知、存储等所有配置项以及站点列表
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 调度配置
    pub scheduler: SchedulerSettings,
    /// 抓取配置
    pub fetch: FetchSettings,
    /// 通知配置
    pub notify: NotifySettings,
    /// 存储配置
    pub storage: StorageSettings,
    /// 站点列表
    #[serde(default)]
    pub sites: Vec<SiteDescriptor>,
}

/// 调度配置设置
#[derive(Debug, Deserialize)]
pub struct SchedulerSettings {
    /// 刷新周期（小时）
    pub interval_hours: u64,
    /// 启动时是否立即刷新一次
    pub run_on_start: bool,
}

/// 抓取配置设置
#[derive(Debug, Deserialize)]
pub struct FetchSettings {
    /// 代理URL（如 http://127.0.0.1:7890）
    pub proxy_url: Option<String>,
    /// 剩余天数计算使用的时区
    pub timezone: String,
}

/// 通知配置设置
#[derive(Debug, Deserialize)]
pub struct NotifySettings {
    /// 是否启用通知
    pub enabled: bool,
    /// 剩余天数不超过该值时提醒
    pub remaining_days: i64,
}

/// 存储配置设置
#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    /// 结果文件路径
    pub results_path: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件与环境变量加载，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default Scheduler settings
            .set_default("scheduler.interval_hours", 6)?
            .set_default("scheduler.run_on_start", true)?
            // Default Fetch settings
            .set_default("fetch.timezone", "Asia/Shanghai")?
            // Default Notify settings
            .set_default("notify.enabled", true)?
            .set_default("notify.remaining_days", 3)?
            // Default Storage settings
            .set_default("storage.results_path", "./data/assessments.json")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("ASSESSRS").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 解析配置的时区，非法值回退到Asia/Shanghai
    pub fn timezone(&self) -> chrono_tz::Tz {
        self.fetch
            .timezone
            .parse()
            .unwrap_or(chrono_tz::Asia::Shanghai)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
