// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 页面抓取引擎

pub mod reqwest_engine;
pub mod traits;

pub use reqwest_engine::ReqwestEngine;
pub use traits::{FetchError, FetchedPage, PageFetcher};
