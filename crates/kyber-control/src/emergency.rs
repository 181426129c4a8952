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

//! Independent detector for severe, sustained degradation.
//!
//! Runs outside the governor's cooldown discipline: where the governor sheds
//! one feature at a time, the override masks everything non-essential at once
//! and stays active until the host explicitly lifts it. Deactivation is never
//! automatic.

use std::collections::VecDeque;

use crate::config::EmergencyConfig;
use crate::window::SampleWindow;

/// Detects sustained severe degradation from per-tick durations, with a
/// fallback fps path for hosts that cannot time their ticks.
#[derive(Debug)]
pub struct EmergencyOverride {
    config: EmergencyConfig,
    /// Timestamps of recent long ticks, oldest first.
    spikes: VecDeque<u64>,
    active: bool,
}

impl EmergencyOverride {
    /// Creates an armed, inactive override.
    pub fn new(config: EmergencyConfig) -> Self {
        Self {
            config,
            spikes: VecDeque::new(),
            active: false,
        }
    }

    /// True while the override holds the system in emergency mode.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feeds one tick duration to the spike detector.
    ///
    /// Returns `Some(spike_count)` on the tick that trips the override, and
    /// `None` otherwise (including every tick while already active).
    pub fn observe_tick(&mut self, now_ms: u64, tick_duration_ms: f32) -> Option<u32> {
        if self.active {
            return None;
        }
        if tick_duration_ms > self.config.long_tick_threshold_ms {
            self.spikes.push_back(now_ms);
        }
        while let Some(&oldest) = self.spikes.front() {
            if now_ms.saturating_sub(oldest) > self.config.spike_window_ms {
                self.spikes.pop_front();
            } else {
                break;
            }
        }
        let count = self.spikes.len() as u32;
        if count >= self.config.long_tick_count {
            log::warn!(
                "EmergencyOverride: {} ticks over {:.0} ms within {} ms; activating.",
                count,
                self.config.long_tick_threshold_ms,
                self.config.spike_window_ms
            );
            self.active = true;
            return Some(count);
        }
        None
    }

    /// Fallback trigger for hosts without per-tick durations: sustained fps
    /// below the floor across the trailing window.
    ///
    /// Returns `true` on the call that trips the override.
    pub fn observe_fallback_fps(&mut self, window: &SampleWindow) -> bool {
        if self.active || window.count() < self.config.fallback_min_samples {
            return false;
        }
        let avg = window.trailing_avg_fps(self.config.fallback_min_samples);
        if avg < self.config.fallback_fps_floor {
            log::warn!(
                "EmergencyOverride: fallback fps {:.1} below floor {:.1}; activating.",
                avg,
                self.config.fallback_fps_floor
            );
            self.active = true;
            return true;
        }
        false
    }

    /// Explicitly lifts the override and re-arms the detector.
    ///
    /// The only way out of emergency mode; the detector never deactivates on
    /// its own, however well the system recovers.
    pub fn deactivate(&mut self) {
        if self.active {
            log::info!("EmergencyOverride: deactivated by host.");
        }
        self.active = false;
        self.spikes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyber_core::telemetry::PerformanceSample;

    fn detector() -> EmergencyOverride {
        EmergencyOverride::new(EmergencyConfig::default())
    }

    #[test]
    fn three_long_ticks_in_the_window_trip_the_override() {
        let mut emergency = detector();
        assert!(emergency.observe_tick(0, 60.0).is_none());
        assert!(emergency.observe_tick(100, 60.0).is_none());
        assert_eq!(emergency.observe_tick(200, 60.0), Some(3));
        assert!(emergency.is_active());
    }

    #[test]
    fn short_ticks_never_trip() {
        let mut emergency = detector();
        for i in 0..100 {
            assert!(emergency.observe_tick(i * 16, 16.0).is_none());
        }
        assert!(!emergency.is_active());
    }

    #[test]
    fn spikes_outside_the_rolling_window_expire() {
        let mut emergency = detector();
        emergency.observe_tick(0, 60.0);
        emergency.observe_tick(100, 60.0);
        // The third spike arrives after the first two left the 2000 ms window.
        assert!(emergency.observe_tick(2_500, 60.0).is_none());
        assert!(!emergency.is_active());
    }

    #[test]
    fn once_active_further_observations_are_ignored() {
        let mut emergency = detector();
        emergency.observe_tick(0, 60.0);
        emergency.observe_tick(50, 60.0);
        assert!(emergency.observe_tick(100, 60.0).is_some());
        assert!(emergency.observe_tick(150, 60.0).is_none());
        assert!(emergency.is_active());
    }

    #[test]
    fn deactivation_is_explicit_and_rearms() {
        let mut emergency = detector();
        emergency.observe_tick(0, 60.0);
        emergency.observe_tick(50, 60.0);
        emergency.observe_tick(100, 60.0);
        assert!(emergency.is_active());

        emergency.deactivate();
        assert!(!emergency.is_active());

        // Fully re-armed: needs three fresh spikes again.
        assert!(emergency.observe_tick(200, 60.0).is_none());
        assert!(emergency.observe_tick(250, 60.0).is_none());
        assert!(emergency.observe_tick(300, 60.0).is_some());
    }

    #[test]
    fn fallback_fps_path_requires_sustained_low_fps() {
        let mut emergency = detector();
        let mut window = SampleWindow::new();
        for _ in 0..9 {
            window.push(PerformanceSample {
                fps: 20.0,
                ..Default::default()
            });
        }
        // One sample short of the minimum population.
        assert!(!emergency.observe_fallback_fps(&window));

        window.push(PerformanceSample {
            fps: 20.0,
            ..Default::default()
        });
        assert!(emergency.observe_fallback_fps(&window));
        assert!(emergency.is_active());
    }

    #[test]
    fn fallback_fps_above_floor_does_not_trip() {
        let mut emergency = detector();
        let mut window = SampleWindow::new();
        for _ in 0..20 {
            window.push(PerformanceSample {
                fps: 45.0,
                ..Default::default()
            });
        }
        assert!(!emergency.observe_fallback_fps(&window));
        assert!(!emergency.is_active());
    }
}
