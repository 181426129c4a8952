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

//! Drives a full governor stack through a scripted degrade/recover workload
//! on a simulated clock and prints the performance reports, so the whole
//! feedback loop can be watched without a real renderer.

use std::sync::Arc;

use anyhow::Context;
use kyber_control::{FeatureDescriptor, GovernorConfig, GovernorService};
use kyber_core::math::{Mat4, Vec3, FRAC_PI_4};
use kyber_core::platform::FixedProbe;
use kyber_core::time::{ManualClock, TickClock};
use kyber_scene::{
    FrustumCuller, GeometryHandle, InstancedParticlePool, LodLevel, LodSelector,
};

fn lod_chain(base: u64) -> Vec<LodLevel> {
    vec![
        LodLevel {
            threshold_distance: 15.0,
            quality_factor: 1.0,
            geometry: GeometryHandle(base),
        },
        LodLevel {
            threshold_distance: 40.0,
            quality_factor: 0.5,
            geometry: GeometryHandle(base + 1),
        },
        LodLevel {
            threshold_distance: 100.0,
            quality_factor: 0.2,
            geometry: GeometryHandle(base + 2),
        },
    ]
}

fn run_phase(
    label: &str,
    service: &mut GovernorService,
    clock: &ManualClock,
    ticks: usize,
    frame_ms: u64,
    render_ms: f32,
) -> anyhow::Result<()> {
    for _ in 0..ticks {
        clock.advance(frame_ms);
        service.tick(render_ms);
    }
    let report = service.performance_report();
    println!(
        "--- {label} ---\n{}",
        serde_json::to_string_pretty(&report).context("serializing report")?
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let probe = FixedProbe {
        viewport: Some((2560, 1440)),
        memory_gb: Some(8.0),
        cores: Some(8),
    };
    let clock = Arc::new(ManualClock::new());
    let mut service = GovernorService::new(&probe, GovernorConfig::default(), clock.clone());
    let events = service.subscribe();

    println!("device tier: {:?}", service.tier());

    for (id, priority, weight) in [
        ("base_scene", 1, 1.0),
        ("hero_glow", 2, 0.6),
        ("ambient_motes", 3, 0.4),
        ("bloom", 4, 0.5),
        ("particle_trails", 5, 0.3),
    ] {
        service.register_feature(FeatureDescriptor::new(id, priority, weight))?;
    }

    // One managed ambient effect, gated by its adaptive interval.
    let interval = service.tier().base_effect_interval_ms;
    service
        .slots()
        .spawn_loop(
            "ambient_pulse",
            interval,
            Box::new(|now_ms| {
                log::info!("ambient_pulse fired at {now_ms} ms");
                Ok(())
            }),
            clock.now_ms(),
        )
        .context("spawning ambient loop")?;

    // Scene-side consumers, driven only while their categories stay enabled.
    let mut lod = LodSelector::new(service.tier().target_fps);
    lod.track(1, Vec3::new(30.0, 0.0, -30.0), lod_chain(100))?;
    lod.track(2, Vec3::new(0.0, 0.0, -120.0), lod_chain(200))?;
    let mut culler = FrustumCuller::new();
    let mut particles = InstancedParticlePool::new(service.tier().max_particles, 7);

    run_phase("steady 60 fps", &mut service, &clock, 40, 16, 6.0)?;
    run_phase("degraded 25 fps", &mut service, &clock, 30, 40, 30.0)?;
    run_phase("stalling (60 ms ticks)", &mut service, &clock, 5, 60, 55.0)?;

    if service.in_emergency() {
        log::info!("host acknowledges emergency; lifting it explicitly.");
        service.deactivate_emergency();
    }
    run_phase("recovered 60 fps", &mut service, &clock, 80, 16, 6.0)?;

    // One illustrative render pass after recovery.
    let fps = service.performance_report().fps;
    let view = Mat4::look_at_rh(Vec3::ZERO, -Vec3::Z, Vec3::Y)
        .context("degenerate camera orientation")?;
    let projection = Mat4::perspective_rh_zo(FRAC_PI_4, 16.0 / 9.0, 0.1, 500.0);
    culler.begin_pass(&(projection * view));

    for id in [1u64, 2] {
        let transition = lod.select(id, Vec3::ZERO, fps)?;
        log::debug!("object {id}: lod level {}", transition.current);
    }
    for handle in lod.drain_reclaimed() {
        log::debug!("disposing retired geometry {handle:?}");
    }

    let visible = culler.is_visible(&kyber_core::math::Aabb::from_center_half_extents(
        Vec3::new(0.0, 0.0, -50.0),
        Vec3::splat(5.0),
    ));
    println!(
        "cull pass: {:?} (sample volume visible: {visible})",
        culler.stats()
    );

    if service.is_feature_enabled("particle_trails") {
        particles.update_instances(|_, transform| transform.rotation.y += 0.01);
        let instances = particles.flush();
        println!("flushed {} particle instances", instances.len());
    }

    println!("events observed:");
    for event in events.drain() {
        println!("  {event:?}");
    }
    Ok(())
}
