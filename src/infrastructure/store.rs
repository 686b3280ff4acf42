// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 结果持久化
//!
//! 把每轮刷新的完整结果集写入单个JSON文件，下一轮整体覆盖。

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::models::SiteAssessmentResult;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 基于JSON文件的结果存储
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 整体写入结果集
    pub async fn save(&self, results: &[SiteAssessmentResult]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(results)?;
        tokio::fs::write(&self.path, json).await?;

        info!(path = %self.path.display(), count = results.len(), "考核结果已保存");
        Ok(())
    }

    /// 读取上一轮结果集，文件不存在返回空集合
    pub async fn load(&self) -> Result<Vec<SiteAssessmentResult>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "结果文件不存在，返回空集合");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}
