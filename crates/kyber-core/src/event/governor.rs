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

//! Event types describing governor decisions.

use crate::platform::DeviceTierConfig;
use serde::{Deserialize, Serialize};

/// The reason a feature changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleReason {
    /// Sustained low throughput pushed the feature out.
    PerformancePressure,
    /// Sustained recovered headroom allowed the feature back in.
    PerformanceRecovery,
}

/// A high-level event produced by the governor.
///
/// Published on the event bus so host systems (renderers, audio mixers,
/// polling loops) can react the moment a decision lands, without polling the
/// governor state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GovernorEvent {
    /// A single feature crossed from enabled to disabled or back.
    FeatureStateChange {
        /// The feature identifier.
        id: String,
        /// The new state of the feature.
        enabled: bool,
        /// Why the state changed.
        reason: ToggleReason,
    },
    /// The emergency override activated and force-disabled every feature.
    EmergencyMode {
        /// Count of long ticks that triggered the activation, if spike-driven.
        long_tick_count: u32,
        /// The resource envelope in force while the override holds.
        tier: DeviceTierConfig,
    },
    /// The emergency override was explicitly lifted by the host.
    EmergencyModeLifted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::DeviceTier;

    #[test]
    fn feature_state_change_round_trips_through_json() {
        let event = GovernorEvent::FeatureStateChange {
            id: "particle_trails".to_string(),
            enabled: false,
            reason: ToggleReason::PerformancePressure,
        };
        let json = serde_json::to_string(&event).expect("serialize");
        let back: GovernorEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, event);
    }

    #[test]
    fn emergency_event_carries_the_enforced_envelope() {
        let event = GovernorEvent::EmergencyMode {
            long_tick_count: 3,
            tier: DeviceTierConfig {
                tier: DeviceTier::High,
                target_fps: 60.0,
                max_concurrent_animations: 15,
                max_particles: 300,
                base_effect_interval_ms: 3_000,
            },
        };
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("\"target_fps\":60.0"));
        let back: GovernorEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, event);
    }
}
