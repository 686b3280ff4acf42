// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 基础设施：持久化与通知

pub mod notify;
pub mod store;

pub use notify::{LogNotifier, Notifier};
pub use store::{ResultStore, StoreError};
