// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, USER_AGENT};
use tracing::{debug, warn};

use crate::domain::models::SiteDescriptor;
use crate::engines::traits::{FetchError, FetchedPage, PageFetcher};
use crate::utils::text_encoding;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 页面抓取引擎
///
/// 基于reqwest的HTTP引擎。站点开启代理时先直连一次，
/// 失败后再走代理重试。
pub struct ReqwestEngine {
    proxy_url: Option<String>,
}

impl ReqwestEngine {
    pub fn new(proxy_url: Option<String>) -> Self {
        Self { proxy_url }
    }

    /// 构建单次请求使用的客户端
    ///
    /// 每个请求独立客户端，保证站点间Cookie隔离
    fn build_client(
        &self,
        site: &SiteDescriptor,
        with_proxy: bool,
    ) -> Result<reqwest::Client, FetchError> {
        let timeout = Duration::from_secs(site.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .gzip(true)
            .brotli(true);

        if with_proxy {
            if let Some(proxy_url) = &self.proxy_url {
                let proxy = reqwest::Proxy::all(proxy_url)
                    .map_err(|e| FetchError::InvalidProxy(e.to_string()))?;
                builder = builder.proxy(proxy);
            }
        }

        Ok(builder.build()?)
    }

    fn build_headers(site: &SiteDescriptor) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let ua = site.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        if let Ok(value) = HeaderValue::from_str(ua) {
            headers.insert(USER_AGENT, value);
        }
        if let Some(cookie) = &site.cookie {
            if let Ok(value) = HeaderValue::from_str(cookie) {
                headers.insert(COOKIE, value);
            }
        }
        headers
    }

    async fn fetch_once(
        &self,
        site: &SiteDescriptor,
        with_proxy: bool,
    ) -> Result<FetchedPage, FetchError> {
        let url = url::Url::parse(&site.url)?;
        let client = self.build_client(site, with_proxy)?;
        let headers = Self::build_headers(site);

        let start = Instant::now();
        let response = client.get(url).headers(headers).send().await?;
        let status_code = response.status().as_u16();

        // 站点编码五花八门，按字节取回后统一检测解码
        let bytes = response.bytes().await?;
        let html = text_encoding::decode_html_bytes(&bytes)
            .map_err(|e| FetchError::DecodeFailed(e.to_string()))?;

        Ok(FetchedPage {
            status_code,
            html,
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait]
impl PageFetcher for ReqwestEngine {
    /// 抓取站点首页
    ///
    /// 先直连；直连失败且站点配置了代理时走代理重试一次
    async fn fetch(&self, site: &SiteDescriptor) -> Result<FetchedPage, FetchError> {
        match self.fetch_once(site, false).await {
            Ok(page) => {
                debug!(
                    site = %site.name,
                    status = page.status_code,
                    elapsed_ms = page.response_time_ms,
                    "直连抓取完成"
                );
                Ok(page)
            }
            Err(e) if site.use_proxy && self.proxy_url.is_some() && e.is_retryable() => {
                warn!(site = %site.name, error = %e, "直连失败，改走代理重试");
                self.fetch_once(site, true).await
            }
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}
