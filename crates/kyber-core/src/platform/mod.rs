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

//! Provides abstractions over the capabilities of the host device.
//!
//! This module defines the probe interface through which the governor learns
//! what it is running on, the tier ladder devices are sorted into, and the
//! per-tier resource envelope derived from that classification. Probes return
//! `Option` for every capability: platforms that cannot answer a question
//! simply return `None` and classification degrades conservatively instead of
//! failing.

use serde::{Deserialize, Serialize};

/// The coarse capability class of the host device.
///
/// Ordering is meaningful: `Low < Mid < High < Ultra`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum DeviceTier {
    /// Constrained devices: small viewports, little memory, few cores.
    #[default]
    Low,
    /// Mainstream devices that can hold a moderate effect load.
    Mid,
    /// Capable desktops and consoles.
    High,
    /// High-refresh, memory-rich machines.
    Ultra,
}

impl DeviceTier {
    /// Returns the tier name as a lowercase string, for logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceTier::Low => "low",
            DeviceTier::Mid => "mid",
            DeviceTier::High => "high",
            DeviceTier::Ultra => "ultra",
        }
    }
}

/// The immutable resource envelope derived from a [`DeviceTier`].
///
/// Computed once when the governor starts and never refreshed; runtime
/// adaptation happens by toggling features, not by re-classifying the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceTierConfig {
    /// The tier this envelope was derived from.
    pub tier: DeviceTier,
    /// The frame rate the governor steers toward.
    pub target_fps: f32,
    /// Upper bound on concurrently animated objects.
    pub max_concurrent_animations: usize,
    /// Upper bound on live particles.
    pub max_particles: usize,
    /// Base period for ambient effect scheduling, in milliseconds.
    pub base_effect_interval_ms: u64,
}

impl DeviceTierConfig {
    /// Returns the frame budget implied by the target frame rate, in
    /// milliseconds.
    #[inline]
    pub fn frame_budget_ms(&self) -> f32 {
        1000.0 / self.target_fps
    }
}

/// Trait for probing the capabilities of the host device.
///
/// Every method returns `Option`: `None` means the platform cannot answer,
/// not that the answer is zero.
pub trait DeviceProbe: Send + Sync {
    /// Returns the viewport size in physical pixels as `(width, height)`.
    fn viewport_size(&self) -> Option<(u32, u32)>;
    /// Returns the device memory in gigabytes.
    fn memory_gb(&self) -> Option<f32>;
    /// Returns the number of logical CPU cores.
    fn logical_cores(&self) -> Option<usize>;
}

/// A [`DeviceProbe`] with fixed answers.
///
/// Used by tests and the sandbox to pin classification to a known device
/// shape. Fields left as `None` exercise the conservative fallback paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedProbe {
    /// The viewport size to report, if any.
    pub viewport: Option<(u32, u32)>,
    /// The memory size to report, if any.
    pub memory_gb: Option<f32>,
    /// The core count to report, if any.
    pub cores: Option<usize>,
}

impl DeviceProbe for FixedProbe {
    fn viewport_size(&self) -> Option<(u32, u32)> {
        self.viewport
    }

    fn memory_gb(&self) -> Option<f32> {
        self.memory_gb
    }

    fn logical_cores(&self) -> Option<usize> {
        self.cores
    }
}
