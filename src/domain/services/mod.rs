// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 领域服务

pub mod assessment_service;

pub use assessment_service::{AssessmentService, NotifyPolicy};
