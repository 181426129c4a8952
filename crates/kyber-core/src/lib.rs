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

//! # Kyber Core
//!
//! Foundational crate containing the math primitives, event plumbing,
//! telemetry value types, and platform contracts the governor is built on.

#![warn(missing_docs)]

pub mod event;
pub mod math;
pub mod platform;
pub mod telemetry;
pub mod time;

pub use event::{EventBus, GovernorEvent, ToggleReason};
pub use platform::{DeviceProbe, DeviceTier, DeviceTierConfig};
pub use telemetry::{Health, PerformanceReport, PerformanceSample};
pub use time::{ManualClock, SystemClock, TickClock};
