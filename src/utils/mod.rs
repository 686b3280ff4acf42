// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 通用工具

pub mod telemetry;
pub mod text_encoding;
