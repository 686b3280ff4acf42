// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体和服务
pub mod domain;

/// 引擎模块
///
/// 实现站点页面抓取引擎
pub mod engines;

/// 解析模块
///
/// 从站点HTML中提取考核信息的核心管线
pub mod extract;

/// 基础设施模块
///
/// 提供外部服务集成，如缓存存储、通知等
pub mod infrastructure;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现后台定时刷新
pub mod workers;
