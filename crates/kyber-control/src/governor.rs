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

//! The asymmetric-hysteresis feature governor.
//!
//! Disabling reacts fast (short trailing window, short cooldown); re-enabling
//! is deliberately slower on every axis (longer window, stricter thresholds,
//! longer cooldown). Together with the one-toggle-per-evaluation rule this
//! keeps the system from flapping around its watermark.

use std::sync::Arc;

use crate::config::GovernorConfig;
use crate::error::FeatureConfigError;
use crate::registry::{FeatureDescriptor, FeatureRegistry};
use crate::window::SampleWindow;
use kyber_core::event::{EventBus, GovernorEvent, ToggleReason};
use kyber_core::platform::DeviceTierConfig;

/// Evaluates the rolling performance history and toggles features.
///
/// Single-writer: only the governor mutates the feature registry. Every
/// toggle is published on the event bus before `evaluate` returns, so all
/// `is_enabled` callers observe a consistent value from the start of the
/// next tick.
pub struct FeatureGovernor {
    config: GovernorConfig,
    tier: DeviceTierConfig,
    registry: FeatureRegistry,
    bus: Arc<EventBus<GovernorEvent>>,
}

impl FeatureGovernor {
    /// Creates a governor for the given tier, publishing on `bus`.
    pub fn new(
        config: GovernorConfig,
        tier: DeviceTierConfig,
        bus: Arc<EventBus<GovernorEvent>>,
    ) -> Self {
        Self {
            config,
            tier,
            registry: FeatureRegistry::new(),
            bus,
        }
    }

    /// Registers a feature, initially enabled.
    ///
    /// Invalid descriptors fail open: the error is returned for surfacing,
    /// the feature stays permanently enabled and ungoverned.
    pub fn register(&mut self, descriptor: FeatureDescriptor) -> Result<(), FeatureConfigError> {
        self.registry.register(descriptor)
    }

    /// Returns whether a feature is enabled. Unknown ids answer `true`.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.registry.is_enabled(id)
    }

    /// Ids of currently enabled features.
    pub fn enabled_features(&self) -> Vec<String> {
        self.registry.enabled_ids()
    }

    /// Ids of currently disabled features.
    pub fn disabled_features(&self) -> Vec<String> {
        self.registry.disabled_ids()
    }

    /// Low watermark the trailing fps average is held against.
    pub fn low_watermark(&self) -> f32 {
        self.tier.target_fps - self.config.fps_margin
    }

    /// Runs one hysteresis pass over the sample window.
    ///
    /// At most one state change per call, never more. The disable side is
    /// checked first; the enable side only runs when the disable condition
    /// did not hold. Returns the published event, if any.
    pub fn evaluate(&mut self, window: &SampleWindow, now_ms: u64) -> Option<GovernorEvent> {
        let watermark = self.low_watermark();
        let budget_ms = self.tier.frame_budget_ms();
        let memory_mb = window.latest().map_or(0.0, |s| s.memory_mb);

        if window.count() >= self.config.min_samples_disable {
            let avg_fps = window.trailing_avg_fps(self.config.disable_window);
            let max_render = window.trailing_max_render_time_ms(self.config.disable_window);
            let degraded = avg_fps < watermark
                || max_render > self.config.render_budget_disable_factor * budget_ms
                || memory_mb > self.config.memory_ceiling_mb;

            if degraded {
                let candidate = self
                    .registry
                    .disable_candidate(now_ms, self.config.cooldown_disable_ms)
                    .map(str::to_owned);
                if let Some(id) = candidate {
                    log::info!(
                        "FeatureGovernor: disabling '{}' (avg fps {:.1} / watermark {:.1}, \
                        max render {:.1} ms, memory {:.0} MB)",
                        id,
                        avg_fps,
                        watermark,
                        max_render,
                        memory_mb
                    );
                    return Some(self.toggle(&id, false, ToggleReason::PerformancePressure, now_ms));
                }
                // Degraded but every enabled feature is inside its cooldown:
                // nothing this tick, and no enable check either.
                return None;
            }
        }

        if window.count() >= self.config.min_samples_enable && self.registry.any_disabled() {
            let avg_fps = window.trailing_avg_fps(self.config.enable_window);
            let max_render = window.trailing_max_render_time_ms(self.config.enable_window);
            let recovered = avg_fps > watermark + self.config.fps_margin
                && max_render < self.config.render_budget_enable_factor * budget_ms
                && memory_mb < self.config.memory_enable_factor * self.config.memory_ceiling_mb;

            if recovered {
                let candidate = self
                    .registry
                    .enable_candidate(now_ms, self.config.cooldown_enable_ms)
                    .map(str::to_owned);
                if let Some(id) = candidate {
                    log::info!(
                        "FeatureGovernor: re-enabling '{}' (avg fps {:.1}, \
                        max render {:.1} ms, memory {:.0} MB)",
                        id,
                        avg_fps,
                        max_render,
                        memory_mb
                    );
                    return Some(self.toggle(&id, true, ToggleReason::PerformanceRecovery, now_ms));
                }
            }
        }
        None
    }

    fn toggle(
        &mut self,
        id: &str,
        enabled: bool,
        reason: ToggleReason,
        now_ms: u64,
    ) -> GovernorEvent {
        self.registry.set_enabled(id, enabled, now_ms);
        let event = GovernorEvent::FeatureStateChange {
            id: id.to_owned(),
            enabled,
            reason,
        };
        // Published before evaluate returns: consumers observe the new state
        // for the entirety of the next tick.
        self.bus.publish(event.clone());
        event
    }
}
