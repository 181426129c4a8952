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

//! One-shot device-tier classification.
//!
//! Runs exactly once when the governor is constructed. The resulting
//! [`DeviceTierConfig`] is immutable for the process lifetime: runtime
//! adaptation happens by toggling features, never by re-classifying.

use kyber_core::platform::{DeviceProbe, DeviceTier, DeviceTierConfig};

/// Viewport width (px) below which the device is assumed constrained.
const NARROW_VIEWPORT_WIDTH: u32 = 768;
/// Conservative mid default when the memory probe cannot answer, in GB.
const DEFAULT_MEMORY_GB: f32 = 4.0;
/// Conservative mid default when the core-count probe cannot answer.
const DEFAULT_CORES: usize = 4;
/// Memory (GB) below which the device classifies as `Low`.
const LOW_MEMORY_GB: f32 = 3.0;
/// Core count below which the device classifies as `Low`.
const LOW_CORES: usize = 4;
/// Memory (GB) at or above which the device may classify as `High`.
const HIGH_MEMORY_GB: f32 = 6.0;
/// Core count at or above which the device may classify as `High`.
const HIGH_CORES: usize = 6;
/// Memory (GB) at or above which the device may classify as `Ultra`.
const ULTRA_MEMORY_GB: f32 = 12.0;
/// Core count at or above which the device may classify as `Ultra`.
const ULTRA_CORES: usize = 10;

/// Classifies the host device into a [`DeviceTier`] and derives its
/// resource envelope.
///
/// Probes answer with `Option`: a single missing signal substitutes its
/// conservative mid default and classification proceeds normally; only when
/// *both* the memory and core signals are absent does the classifier degrade
/// to the safest (`Low`) assumption.
pub struct DeviceClassifier;

impl DeviceClassifier {
    /// Probes the device once and returns its immutable resource envelope.
    pub fn classify(probe: &dyn DeviceProbe) -> DeviceTierConfig {
        let viewport = probe.viewport_size();
        let memory_gb = probe.memory_gb();
        let cores = probe.logical_cores();

        let tier = Self::tier_from(viewport, memory_gb, cores);
        let config = Self::config_for(tier);

        log::info!(
            "DeviceClassifier: tier={} (viewport={:?}, memory={:?} GB, cores={:?}) \
            -> target {} fps, {} animation slots, {} particles",
            tier.as_str(),
            viewport,
            memory_gb,
            cores,
            config.target_fps,
            config.max_concurrent_animations,
            config.max_particles
        );
        config
    }

    /// Ordered threshold checks from the raw (optional) capability signals.
    fn tier_from(
        viewport: Option<(u32, u32)>,
        memory_gb: Option<f32>,
        cores: Option<usize>,
    ) -> DeviceTier {
        // Both hardware signals missing: nothing to grade on, assume the worst.
        if memory_gb.is_none() && cores.is_none() {
            log::warn!("DeviceClassifier: no memory or core signal; assuming Low tier.");
            return DeviceTier::Low;
        }

        let memory_gb = memory_gb.unwrap_or(DEFAULT_MEMORY_GB);
        let cores = cores.unwrap_or(DEFAULT_CORES);

        if let Some((width, _)) = viewport {
            if width < NARROW_VIEWPORT_WIDTH {
                return DeviceTier::Low;
            }
        }
        if memory_gb < LOW_MEMORY_GB || cores < LOW_CORES {
            return DeviceTier::Low;
        }
        if memory_gb >= ULTRA_MEMORY_GB && cores >= ULTRA_CORES {
            return DeviceTier::Ultra;
        }
        if memory_gb >= HIGH_MEMORY_GB && cores >= HIGH_CORES {
            return DeviceTier::High;
        }
        DeviceTier::Mid
    }

    /// Baseline resource envelope for each tier.
    fn config_for(tier: DeviceTier) -> DeviceTierConfig {
        match tier {
            DeviceTier::Low => DeviceTierConfig {
                tier,
                target_fps: 30.0,
                max_concurrent_animations: 3,
                max_particles: 10,
                base_effect_interval_ms: 5_000,
            },
            DeviceTier::Mid => DeviceTierConfig {
                tier,
                target_fps: 50.0,
                max_concurrent_animations: 8,
                max_particles: 100,
                base_effect_interval_ms: 4_000,
            },
            DeviceTier::High => DeviceTierConfig {
                tier,
                target_fps: 60.0,
                max_concurrent_animations: 15,
                max_particles: 300,
                base_effect_interval_ms: 3_000,
            },
            DeviceTier::Ultra => DeviceTierConfig {
                tier,
                target_fps: 90.0,
                max_concurrent_animations: 30,
                max_particles: 800,
                base_effect_interval_ms: 2_000,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyber_core::platform::FixedProbe;

    #[test]
    fn narrow_phone_classifies_low() {
        // Scenario: 360px viewport, 2 GB, 2 cores.
        let probe = FixedProbe {
            viewport: Some((360, 640)),
            memory_gb: Some(2.0),
            cores: Some(2),
        };
        let config = DeviceClassifier::classify(&probe);
        assert_eq!(config.tier, DeviceTier::Low);
        assert!(config.max_concurrent_animations <= 3);
        assert!(config.max_particles <= 10);
    }

    #[test]
    fn wide_viewport_with_weak_hardware_is_still_low() {
        let probe = FixedProbe {
            viewport: Some((1920, 1080)),
            memory_gb: Some(2.0),
            cores: Some(8),
        };
        assert_eq!(DeviceClassifier::classify(&probe).tier, DeviceTier::Low);
    }

    #[test]
    fn mainstream_hardware_classifies_mid() {
        let probe = FixedProbe {
            viewport: Some((1366, 768)),
            memory_gb: Some(4.0),
            cores: Some(4),
        };
        assert_eq!(DeviceClassifier::classify(&probe).tier, DeviceTier::Mid);
    }

    #[test]
    fn capable_desktop_classifies_high() {
        let probe = FixedProbe {
            viewport: Some((2560, 1440)),
            memory_gb: Some(8.0),
            cores: Some(8),
        };
        assert_eq!(DeviceClassifier::classify(&probe).tier, DeviceTier::High);
    }

    #[test]
    fn workstation_classifies_ultra() {
        let probe = FixedProbe {
            viewport: Some((3840, 2160)),
            memory_gb: Some(32.0),
            cores: Some(16),
        };
        assert_eq!(DeviceClassifier::classify(&probe).tier, DeviceTier::Ultra);
    }

    #[test]
    fn both_signals_missing_degrades_to_low() {
        let probe = FixedProbe {
            viewport: Some((1920, 1080)),
            memory_gb: None,
            cores: None,
        };
        assert_eq!(DeviceClassifier::classify(&probe).tier, DeviceTier::Low);
    }

    #[test]
    fn single_missing_signal_uses_its_default() {
        // Memory unknown but 8 cores: defaults memory to 4 GB and grades
        // normally instead of forcing Low.
        let probe = FixedProbe {
            viewport: Some((1920, 1080)),
            memory_gb: None,
            cores: Some(8),
        };
        assert_eq!(DeviceClassifier::classify(&probe).tier, DeviceTier::Mid);

        // Cores unknown but plenty of memory: defaults cores to 4.
        let probe = FixedProbe {
            viewport: Some((1920, 1080)),
            memory_gb: Some(16.0),
            cores: None,
        };
        assert_eq!(DeviceClassifier::classify(&probe).tier, DeviceTier::Mid);
    }

    #[test]
    fn missing_viewport_grades_on_hardware_alone() {
        let probe = FixedProbe {
            viewport: None,
            memory_gb: Some(8.0),
            cores: Some(8),
        };
        assert_eq!(DeviceClassifier::classify(&probe).tier, DeviceTier::High);
    }

    #[test]
    fn tier_envelopes_scale_monotonically() {
        let tiers = [
            DeviceTier::Low,
            DeviceTier::Mid,
            DeviceTier::High,
            DeviceTier::Ultra,
        ];
        let configs: Vec<_> = tiers.iter().map(|t| DeviceClassifier::config_for(*t)).collect();
        for pair in configs.windows(2) {
            assert!(pair[0].max_concurrent_animations < pair[1].max_concurrent_animations);
            assert!(pair[0].max_particles < pair[1].max_particles);
            assert!(pair[0].target_fps <= pair[1].target_fps);
            assert!(pair[0].base_effect_interval_ms >= pair[1].base_effect_interval_ms);
        }
    }
}
