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

//! End-to-end governor scenarios driven through the service facade with a
//! simulated clock. Each scenario scripts a workload (steady, degraded,
//! spiking, recovered) and asserts the exact sequence of published events.

use std::sync::Arc;

use kyber_control::{FeatureDescriptor, GovernorConfig, GovernorService};
use kyber_core::event::GovernorEvent;
use kyber_core::platform::{DeviceTier, FixedProbe};
use kyber_core::time::ManualClock;

fn high_probe() -> FixedProbe {
    FixedProbe {
        viewport: Some((2560, 1440)),
        memory_gb: Some(8.0),
        cores: Some(8),
    }
}

/// High-tier service (target 60 fps, watermark 50) with two governed
/// features: expendable trails (priority 5) and a mid glow (priority 3).
fn service_with_features(clock: Arc<ManualClock>) -> GovernorService {
    let mut service = GovernorService::new(&high_probe(), GovernorConfig::default(), clock);
    service
        .register_feature(FeatureDescriptor::new("particle_trails", 5, 0.3))
        .expect("valid descriptor");
    service
        .register_feature(FeatureDescriptor::new("glow", 3, 0.5))
        .expect("valid descriptor");
    service
}

fn run_ticks(service: &mut GovernorService, clock: &ManualClock, n: usize, frame_ms: u64) {
    for _ in 0..n {
        clock.advance(frame_ms);
        service.tick(5.0);
    }
}

#[test]
fn low_tier_device_gets_a_constrained_envelope() {
    // Scenario A: viewport width 360, 2 GB memory, 2 cores.
    let probe = FixedProbe {
        viewport: Some((360, 640)),
        memory_gb: Some(2.0),
        cores: Some(2),
    };
    let clock = Arc::new(ManualClock::new());
    let service = GovernorService::new(&probe, GovernorConfig::default(), clock);
    assert_eq!(service.tier().tier, DeviceTier::Low);
    assert!(service.tier().max_concurrent_animations <= 3);
    assert!(service.tier().max_particles <= 10);
}

#[test]
fn ten_degraded_samples_disable_exactly_the_most_expendable_feature() {
    // Scenario B: feed 10 samples at 25 fps (40 ms frames, below the
    // 50 fps watermark). Exactly one disable fires, targeting the highest
    // priority value.
    let clock = Arc::new(ManualClock::new());
    let mut service = service_with_features(Arc::clone(&clock));
    let events = service.subscribe();

    // 11 ticks: the first anchors the sampler, the next 10 produce samples.
    run_ticks(&mut service, &clock, 11, 40);

    let received: Vec<GovernorEvent> = events.drain().collect();
    assert_eq!(received.len(), 1, "exactly one toggle: {received:?}");
    assert!(matches!(
        &received[0],
        GovernorEvent::FeatureStateChange { id, enabled: false, .. } if id == "particle_trails"
    ));
    assert!(!service.is_feature_enabled("particle_trails"));
    assert!(service.is_feature_enabled("glow"));
}

#[test]
fn sustained_degradation_sheds_features_most_expendable_first() {
    let clock = Arc::new(ManualClock::new());
    let mut service = service_with_features(Arc::clone(&clock));
    let events = service.subscribe();

    run_ticks(&mut service, &clock, 12, 40);

    let ids: Vec<String> = events
        .drain()
        .filter_map(|e| match e {
            GovernorEvent::FeatureStateChange { id, enabled: false, .. } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec!["particle_trails".to_string(), "glow".to_string()]);
}

#[test]
fn recovery_re_enables_most_essential_first_and_only_after_the_cooldown() {
    // Scenario C: degrade both features, then feed a long recovered stretch.
    let clock = Arc::new(ManualClock::new());
    let mut service = service_with_features(Arc::clone(&clock));

    run_ticks(&mut service, &clock, 12, 40);
    assert!(!service.is_feature_enabled("particle_trails"));
    assert!(!service.is_feature_enabled("glow"));

    let events = service.subscribe();

    // 35 recovered ticks at 62.5 fps: the enable condition holds well before
    // the end, but both features are still inside their 10 s enable cooldown.
    run_ticks(&mut service, &clock, 35, 16);
    assert_eq!(events.drain().count(), 0, "no toggle inside the cooldown");

    // Jump past the cooldown; the next recovered evaluation re-enables glow
    // (priority 3) before trails (priority 5).
    clock.advance(10_000);
    run_ticks(&mut service, &clock, 1, 16);
    let received: Vec<GovernorEvent> = events.drain().collect();
    assert_eq!(received.len(), 1, "one toggle per evaluation: {received:?}");
    assert!(matches!(
        &received[0],
        GovernorEvent::FeatureStateChange { id, enabled: true, .. } if id == "glow"
    ));
    assert!(service.is_feature_enabled("glow"));
    assert!(!service.is_feature_enabled("particle_trails"));

    // Trails follows on a later recovered evaluation (its own cooldown has
    // also elapsed by now).
    run_ticks(&mut service, &clock, 1, 16);
    assert!(service.is_feature_enabled("particle_trails"));
}

#[test]
fn three_long_ticks_enter_emergency_and_only_explicit_deactivation_leaves_it() {
    // Scenario D: 60 ms ticks blow the 50 ms long-tick threshold.
    let clock = Arc::new(ManualClock::new());
    let mut service = service_with_features(Arc::clone(&clock));
    let events = service.subscribe();

    run_ticks(&mut service, &clock, 4, 60);
    assert!(service.in_emergency());
    assert!(matches!(
        events.recv().expect("emergency event"),
        GovernorEvent::EmergencyMode { long_tick_count: 3, tier } if tier.tier == DeviceTier::High
    ));

    // Every query answers false, registered or not.
    assert!(!service.is_feature_enabled("particle_trails"));
    assert!(!service.is_feature_enabled("glow"));
    assert!(!service.is_feature_enabled("never_registered"));
    assert!(service.flags().zero_animation());
    assert!(service.flags().audio_suspended());
    assert!(service.flags().reduced_polling());

    // A long recovered stretch neither lifts the override nor toggles
    // anything: normal governance is suppressed while it holds.
    run_ticks(&mut service, &clock, 60, 16);
    assert!(service.in_emergency());
    assert_eq!(events.drain().count(), 0);

    service.deactivate_emergency();
    assert!(!service.in_emergency());
    assert!(matches!(
        events.recv().expect("lifted event"),
        GovernorEvent::EmergencyModeLifted
    ));
    // The override never touched registry state: the pre-emergency picture
    // is back immediately.
    assert!(service.is_feature_enabled("particle_trails"));
    assert!(service.is_feature_enabled("glow"));
    assert!(!service.flags().emergency());
}

#[test]
fn invalid_descriptor_fails_open_and_is_never_governed() {
    let clock = Arc::new(ManualClock::new());
    let mut service = GovernorService::new(&high_probe(), GovernorConfig::default(), clock.clone());
    service
        .register_feature(FeatureDescriptor::new("broken", 0, 0.5))
        .expect_err("priority 0 is invalid");
    service
        .register_feature(FeatureDescriptor::new("trails", 5, 0.3))
        .expect("valid descriptor");

    run_ticks(&mut service, &clock, 40, 40);

    // Sustained degradation sheds trails but can never touch the ungoverned
    // feature.
    assert!(!service.is_feature_enabled("trails"));
    assert!(service.is_feature_enabled("broken"));
}

#[test]
fn slot_lifecycle_matches_the_tier_and_survives_repeated_unregistration() {
    let probe = FixedProbe {
        viewport: Some((360, 640)),
        memory_gb: Some(2.0),
        cores: Some(2),
    };
    let clock = Arc::new(ManualClock::new());
    let mut service = GovernorService::new(&probe, GovernorConfig::default(), clock);

    let slots = service.slots();
    assert!(slots.register("pulse", 0));
    assert!(slots.register("shimmer", 0));
    assert!(slots.register("drift", 0));
    assert!(!slots.register("overflow", 0), "low tier caps at 3 slots");

    slots.unregister("pulse");
    slots.unregister("shimmer");
    slots.unregister("drift");
    slots.unregister("drift");
    slots.unregister("never_registered");
    assert_eq!(slots.active_count(), 0);
}
