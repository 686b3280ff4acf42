// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 站点描述符
///
/// 由站点注册表提供的只读输入，核心管线不会修改它
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteDescriptor {
    /// 站点ID
    pub id: i64,
    /// 站点名称
    pub name: String,
    /// 站点首页URL
    pub url: String,
    /// 登录Cookie
    #[serde(default)]
    pub cookie: Option<String>,
    /// 自定义User-Agent
    #[serde(default)]
    pub user_agent: Option<String>,
    /// 是否走代理访问
    #[serde(default)]
    pub use_proxy: bool,
    /// 请求超时（秒）
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}
