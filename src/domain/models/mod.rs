// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod assessment;
pub mod site;

pub use assessment::{Assessment, AssessmentStatus, Metric, SiteAssessmentResult};
pub use site::SiteDescriptor;
