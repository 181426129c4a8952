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

//! Configuration for the governor and the emergency override.
//!
//! All hysteresis constants live here rather than being buried in the
//! decision code, so hosts can retune the governor for their own content
//! without patching it.

use serde::{Deserialize, Serialize};

/// Configuration for the hysteresis loop of the [`FeatureGovernor`](crate::FeatureGovernor).
///
/// The disable side reacts fast (short window, short cooldown); the enable
/// side is deliberately slower on every axis so recovery never oscillates
/// against degradation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Margin subtracted from the tier target fps to form the low watermark.
    /// The enable threshold sits the same margin above the watermark.
    pub fps_margin: f32,
    /// Number of trailing samples averaged for a disable decision.
    pub disable_window: usize,
    /// Number of trailing samples averaged for an enable decision.
    pub enable_window: usize,
    /// Minimum samples in the window before any disable decision.
    pub min_samples_disable: usize,
    /// Minimum samples in the window before any enable decision.
    pub min_samples_enable: usize,
    /// Minimum time between toggles of a feature being disabled.
    pub cooldown_disable_ms: u64,
    /// Minimum time between toggles of a feature being re-enabled.
    /// Intentionally longer than the disable cooldown.
    pub cooldown_enable_ms: u64,
    /// Render time above `factor * frame budget` counts as degradation.
    pub render_budget_disable_factor: f32,
    /// Render time must sit below `factor * frame budget` before re-enabling.
    pub render_budget_enable_factor: f32,
    /// Memory above this ceiling counts as degradation, in megabytes.
    pub memory_ceiling_mb: f32,
    /// Memory must sit below `factor * ceiling` before re-enabling.
    pub memory_enable_factor: f32,
    /// Configuration for the emergency override detector.
    pub emergency: EmergencyConfig,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            fps_margin: 10.0,
            disable_window: 10,
            enable_window: 30,
            min_samples_disable: 10,
            min_samples_enable: 20,
            cooldown_disable_ms: 5_000,
            cooldown_enable_ms: 10_000,
            render_budget_disable_factor: 1.5,
            render_budget_enable_factor: 0.8,
            memory_ceiling_mb: 1024.0,
            memory_enable_factor: 0.8,
            emergency: EmergencyConfig::default(),
        }
    }
}

/// Configuration for the [`EmergencyOverride`](crate::EmergencyOverride) detector.
///
/// The override runs outside the governor's cooldown discipline: its job is
/// to catch severe, sustained degradation fast, so its windows are short.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyConfig {
    /// A tick longer than this many milliseconds counts as a long tick.
    pub long_tick_threshold_ms: f32,
    /// Number of long ticks within the spike window that trips the override.
    pub long_tick_count: u32,
    /// Rolling window long ticks are counted over, in milliseconds.
    pub spike_window_ms: u64,
    /// Fallback trigger: trailing average fps below this floor.
    pub fallback_fps_floor: f32,
    /// Fallback trigger: samples required before the fps floor is consulted.
    pub fallback_min_samples: usize,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            long_tick_threshold_ms: 50.0,
            long_tick_count: 3,
            spike_window_ms: 2_000,
            fallback_fps_floor: 30.0,
            fallback_min_samples: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_side_is_slower_than_disable_side() {
        let config = GovernorConfig::default();
        assert!(config.cooldown_enable_ms > config.cooldown_disable_ms);
        assert!(config.enable_window > config.disable_window);
        assert!(config.min_samples_enable > config.min_samples_disable);
    }

    #[test]
    fn default_emergency_thresholds() {
        let config = EmergencyConfig::default();
        assert_eq!(config.long_tick_threshold_ms, 50.0);
        assert_eq!(config.long_tick_count, 3);
        assert_eq!(config.spike_window_ms, 2_000);
    }
}
