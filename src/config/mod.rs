// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 应用配置

pub mod settings;

pub use settings::Settings;
