// Copyright 2025 eraflo
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

//! # Kyber Control
//!
//! The adaptive governor proper: device-tier classification, per-tick
//! performance sampling, asymmetric-hysteresis feature governance, bounded
//! animation slots, and the emergency override — wired together by the
//! [`GovernorService`] facade the host drives from its frame loop.

#![warn(missing_docs)]

pub mod classifier;
pub mod config;
pub mod emergency;
pub mod error;
pub mod flags;
pub mod governor;
pub mod registry;
pub mod sampler;
pub mod service;
pub mod slots;
pub mod window;

pub use classifier::DeviceClassifier;
pub use config::{EmergencyConfig, GovernorConfig};
pub use emergency::EmergencyOverride;
pub use error::{FeatureConfigError, SlotError};
pub use flags::AdvisoryFlags;
pub use governor::FeatureGovernor;
pub use registry::{FeatureDescriptor, FeatureRegistry};
pub use sampler::{MemoryUsageProbe, PerformanceSampler};
pub use service::GovernorService;
pub use slots::{AnimationSlotManager, LoopCallback};
pub use window::SampleWindow;
