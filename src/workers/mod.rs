// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 后台工作器

pub mod refresh_worker;

pub use refresh_worker::RefreshWorker;
