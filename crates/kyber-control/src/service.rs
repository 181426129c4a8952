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

//! Governor service facade.
//!
//! Owns every governor component and wires them in the fixed per-tick order:
//! sample, emergency check, hysteresis evaluation, managed loops. The host
//! calls [`GovernorService::tick`] from its frame loop; nothing here runs on
//! a background thread — the whole subsystem is single-threaded and
//! tick-synchronized by contract.

use std::sync::Arc;

use crate::classifier::DeviceClassifier;
use crate::config::GovernorConfig;
use crate::emergency::EmergencyOverride;
use crate::error::FeatureConfigError;
use crate::flags::AdvisoryFlags;
use crate::governor::FeatureGovernor;
use crate::registry::FeatureDescriptor;
use crate::sampler::{MemoryUsageProbe, PerformanceSampler};
use crate::slots::AnimationSlotManager;
use kyber_core::event::{EventBus, GovernorEvent};
use kyber_core::platform::{DeviceProbe, DeviceTierConfig};
use kyber_core::telemetry::{Health, PerformanceReport, PerformanceSample};
use kyber_core::time::TickClock;

/// The application-root governor object.
///
/// Explicitly constructed and dependency-injected into consumers — never a
/// module-level singleton — so every test gets a fresh instance. Classifies
/// the device exactly once at construction.
pub struct GovernorService {
    clock: Arc<dyn TickClock>,
    tier: DeviceTierConfig,
    config: GovernorConfig,
    sampler: PerformanceSampler,
    governor: FeatureGovernor,
    slots: AnimationSlotManager,
    emergency: EmergencyOverride,
    flags: Arc<AdvisoryFlags>,
    bus: Arc<EventBus<GovernorEvent>>,
}

impl GovernorService {
    /// Probes the device, derives the tier envelope, and wires the
    /// components together.
    pub fn new(probe: &dyn DeviceProbe, config: GovernorConfig, clock: Arc<dyn TickClock>) -> Self {
        let tier = DeviceClassifier::classify(probe);
        let bus = Arc::new(EventBus::new());
        Self {
            clock,
            tier,
            sampler: PerformanceSampler::new(tier),
            governor: FeatureGovernor::new(config.clone(), tier, Arc::clone(&bus)),
            slots: AnimationSlotManager::new(tier.max_concurrent_animations),
            emergency: EmergencyOverride::new(config.emergency.clone()),
            flags: Arc::new(AdvisoryFlags::new()),
            config,
            bus,
        }
    }

    /// Installs an optional memory usage source for the sampler.
    pub fn set_memory_probe(&mut self, probe: Box<dyn MemoryUsageProbe>) {
        self.sampler.set_memory_probe(probe);
    }

    /// The immutable tier envelope computed at construction.
    pub fn tier(&self) -> &DeviceTierConfig {
        &self.tier
    }

    /// Registers a toggleable feature, initially enabled.
    pub fn register_feature(
        &mut self,
        descriptor: FeatureDescriptor,
    ) -> Result<(), FeatureConfigError> {
        self.governor.register(descriptor)
    }

    /// Returns whether a feature is enabled.
    ///
    /// Effect producers call this before doing per-tick work. While the
    /// emergency override is active every id answers `false`, including
    /// unregistered ones; otherwise unknown ids answer `true`.
    pub fn is_feature_enabled(&self, id: &str) -> bool {
        if self.flags.emergency() {
            return false;
        }
        self.governor.is_enabled(id)
    }

    /// Runs one governor tick.
    ///
    /// Fixed order: sample the frame, feed the emergency detector, run the
    /// hysteresis evaluation (suppressed while in emergency), drive managed
    /// loops. Returns the sample recorded this tick, if any.
    pub fn tick(&mut self, render_time_ms: f32) -> Option<PerformanceSample> {
        let now_ms = self.clock.now_ms();
        let sample = self.sampler.sample(now_ms, render_time_ms);

        if !self.emergency.is_active() {
            if let Some(sample) = &sample {
                if let Some(spike_count) = self.emergency.observe_tick(now_ms, sample.frame_time_ms)
                {
                    self.enter_emergency(spike_count);
                } else {
                    self.governor.evaluate(self.sampler.window(), now_ms);
                }
            }
        }

        // Managed loops idle while the zero-animation override holds.
        if !self.flags.zero_animation() {
            self.slots.drive(now_ms);
        }
        sample
    }

    /// True while the emergency override holds.
    pub fn in_emergency(&self) -> bool {
        self.emergency.is_active()
    }

    /// Explicitly lifts the emergency override.
    ///
    /// Clears the advisory flags, re-arms the detector, and publishes
    /// [`GovernorEvent::EmergencyModeLifted`]. Feature state was never
    /// mutated by the override, so the pre-emergency picture is restored
    /// immediately; further recovery goes through normal cooldown-gated
    /// governance.
    pub fn deactivate_emergency(&mut self) {
        if !self.emergency.is_active() {
            return;
        }
        self.emergency.deactivate();
        self.flags.set_emergency(false);
        self.bus.publish(GovernorEvent::EmergencyModeLifted);
    }

    /// Subscribes to governor notifications.
    pub fn subscribe(&self) -> flume::Receiver<GovernorEvent> {
        self.bus.subscribe()
    }

    /// The advisory flags, for sharing with independent host systems.
    pub fn flags(&self) -> Arc<AdvisoryFlags> {
        Arc::clone(&self.flags)
    }

    /// The animation slot manager.
    pub fn slots(&mut self) -> &mut AnimationSlotManager {
        &mut self.slots
    }

    /// Assembles a point-in-time performance report.
    pub fn performance_report(&self) -> PerformanceReport {
        let window = self.sampler.window();
        let latest = window.latest();
        let emergency = self.emergency.is_active();

        // During emergency the report shows the effective state: everything
        // masked off, regardless of registry bookkeeping.
        let (enabled_features, disabled_features) = if emergency {
            let mut all = self.governor.enabled_features();
            all.extend(self.governor.disabled_features());
            (Vec::new(), all)
        } else {
            (
                self.governor.enabled_features(),
                self.governor.disabled_features(),
            )
        };

        let avg_fps = window.trailing_avg_fps(self.config.disable_window);
        let below_watermark = window.count() >= self.config.min_samples_disable
            && avg_fps < self.governor.low_watermark();
        let health = if emergency || !disabled_features.is_empty() || below_watermark {
            Health::Degraded
        } else {
            Health::Good
        };

        PerformanceReport {
            fps: avg_fps,
            render_time_ms: latest.map_or(0.0, |s| s.render_time_ms),
            memory_mb: latest.map_or(0.0, |s| s.memory_mb),
            enabled_features,
            disabled_features,
            health,
            sample_count: window.count(),
            emergency,
        }
    }

    fn enter_emergency(&mut self, spike_count: u32) {
        log::warn!(
            "GovernorService: entering emergency mode ({} long ticks).",
            spike_count
        );
        self.flags.set_emergency(true);
        self.bus.publish(GovernorEvent::EmergencyMode {
            long_tick_count: spike_count,
            tier: self.tier,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyber_core::platform::FixedProbe;
    use kyber_core::time::ManualClock;

    fn high_probe() -> FixedProbe {
        FixedProbe {
            viewport: Some((2560, 1440)),
            memory_gb: Some(8.0),
            cores: Some(8),
        }
    }

    fn service(clock: Arc<ManualClock>) -> GovernorService {
        GovernorService::new(&high_probe(), GovernorConfig::default(), clock)
    }

    fn run_ticks(service: &mut GovernorService, clock: &ManualClock, n: usize, frame_ms: u64) {
        for _ in 0..n {
            clock.advance(frame_ms);
            service.tick(5.0);
        }
    }

    #[test]
    fn register_then_query_returns_true() {
        let clock = Arc::new(ManualClock::new());
        let mut service = service(Arc::clone(&clock));
        service
            .register_feature(FeatureDescriptor::new("bloom", 4, 0.5))
            .expect("valid");
        assert!(service.is_feature_enabled("bloom"));
    }

    #[test]
    fn report_starts_good_and_degrades_under_load() {
        let clock = Arc::new(ManualClock::new());
        let mut service = service(Arc::clone(&clock));
        service
            .register_feature(FeatureDescriptor::new("trails", 5, 0.3))
            .expect("valid");

        run_ticks(&mut service, &clock, 20, 16);
        let report = service.performance_report();
        assert_eq!(report.health, Health::Good);
        assert!(report.enabled_features.contains(&"trails".to_string()));

        run_ticks(&mut service, &clock, 15, 40); // 25 fps
        let report = service.performance_report();
        assert_eq!(report.health, Health::Degraded);
        assert!(report.disabled_features.contains(&"trails".to_string()));
    }

    #[test]
    fn emergency_masks_every_feature_until_deactivation() {
        let clock = Arc::new(ManualClock::new());
        let mut service = service(Arc::clone(&clock));
        service
            .register_feature(FeatureDescriptor::new("base", 1, 1.0))
            .expect("valid");

        // 60 ms ticks: the first anchors, the next three are long-tick spikes.
        run_ticks(&mut service, &clock, 4, 60);
        assert!(service.in_emergency());
        assert!(!service.is_feature_enabled("base"));
        assert!(!service.is_feature_enabled("never_registered"));
        assert!(service.flags().zero_animation());

        // Recovery alone never lifts the override.
        run_ticks(&mut service, &clock, 60, 16);
        assert!(service.in_emergency());

        service.deactivate_emergency();
        assert!(!service.in_emergency());
        assert!(service.is_feature_enabled("base"));
        assert!(!service.flags().emergency());
    }

    #[test]
    fn slot_capacity_comes_from_the_tier() {
        let clock = Arc::new(ManualClock::new());
        let probe = FixedProbe {
            viewport: Some((360, 640)),
            memory_gb: Some(2.0),
            cores: Some(2),
        };
        let mut service = GovernorService::new(&probe, GovernorConfig::default(), clock);
        assert_eq!(service.slots().capacity(), 3);
    }
}
