// Copyright 2025 The Kubernetes Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! cloud-event-recorder - cloud provider load balancer events for Kubernetes
//!
//! This library provides the pieces a cloud provider needs to surface load
//! balancer lifecycle information as Kubernetes Events:
//! - The cloud event recorder and its fixed reason codes
//! - Portable subnet error aggregation for failure messages
//! - Configuration management
//! - Typed API clients for the resources the recorder touches

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod recorder;
pub mod subnet;

// Re-export commonly used types
pub use client::ClientSet;
pub use config::CloudConfig;
pub use recorder::{load_balancer_name, CloudEventError, CloudEventReason, CloudEventRecorder};
pub use subnet::{subnet_issues_message, SubnetConfigError};

/// Semantic version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Suffix appended to the provider name to form the recording component name.
pub const CLOUD_PROVIDER_COMPONENT_SUFFIX: &str = "-cloud-provider";
