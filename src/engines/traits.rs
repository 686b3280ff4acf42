// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::SiteDescriptor;

/// 抓取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 响应体解码失败
    #[error("Decode failed: {0}")]
    DecodeFailed(String),
    /// 站点URL无效
    #[error("Invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// 代理配置无效
    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),
    /// 超时
    #[error("Timeout")]
    Timeout,
}

impl FetchError {
    /// 判断错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            FetchError::Timeout => true,
            _ => false,
        }
    }
}

/// 抓取到的页面
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP状态码
    pub status_code: u16,
    /// 解码后的HTML文本
    pub html: String,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

/// 页面抓取引擎特质
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取站点首页
    async fn fetch(&self, site: &SiteDescriptor) -> Result<FetchedPage, FetchError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
