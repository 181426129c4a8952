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

//! Per-tick performance measurement.

use crate::window::SampleWindow;
use kyber_core::platform::DeviceTierConfig;
use kyber_core::telemetry::PerformanceSample;

/// Frame-time variance (ms²) treated as full memory pressure by the
/// degraded estimator.
const VARIANCE_FULL_PRESSURE: f32 = 25.0;
/// Span the degraded estimator maps pressure onto, in megabytes. Kept below
/// the default memory ceiling: the estimator is an advisory signal and must
/// not force toggles on its own.
const ESTIMATED_MEMORY_SPAN_MB: f32 = 512.0;

/// Optional source for the process's current memory usage.
///
/// Hosts that can read real usage (allocator stats, platform APIs) implement
/// this; when absent the sampler falls back to a frame-time-variance
/// estimator instead of halting.
pub trait MemoryUsageProbe: Send + Sync {
    /// Returns the current memory usage in megabytes, if measurable.
    fn current_usage_mb(&self) -> Option<f32>;
}

/// Converts per-tick observations into [`PerformanceSample`]s and owns the
/// rolling [`SampleWindow`].
///
/// Purely synchronous: one call per host tick, no suspension, no background
/// work. The first tick only anchors the timestamp and produces no sample
/// (there is no delta to derive fps from yet).
pub struct PerformanceSampler {
    tier: DeviceTierConfig,
    window: SampleWindow,
    memory_probe: Option<Box<dyn MemoryUsageProbe>>,
    last_tick_ms: Option<u64>,
    estimator_noted: bool,
}

impl PerformanceSampler {
    /// Creates a sampler for the given tier with no memory probe.
    pub fn new(tier: DeviceTierConfig) -> Self {
        Self {
            tier,
            window: SampleWindow::new(),
            memory_probe: None,
            last_tick_ms: None,
            estimator_noted: false,
        }
    }

    /// Installs a memory usage probe.
    pub fn set_memory_probe(&mut self, probe: Box<dyn MemoryUsageProbe>) {
        self.memory_probe = Some(probe);
    }

    /// Records one tick and appends a sample to the window.
    ///
    /// `now_ms` comes from the host clock; `render_time_ms` is the measured
    /// render duration of the tick. Returns `None` on the first tick (no
    /// delta yet) and on non-advancing timestamps.
    pub fn sample(&mut self, now_ms: u64, render_time_ms: f32) -> Option<PerformanceSample> {
        let last = match self.last_tick_ms.replace(now_ms) {
            Some(last) => last,
            None => return None,
        };
        if now_ms <= last {
            log::debug!("PerformanceSampler: non-advancing tick timestamp, skipping sample.");
            return None;
        }

        let frame_time_ms = (now_ms - last) as f32;
        let fps = 1000.0 / frame_time_ms;
        let memory_mb = self.measure_memory_mb();
        let estimated_load = render_time_ms / self.tier.frame_budget_ms();

        let sample = PerformanceSample {
            fps,
            frame_time_ms,
            memory_mb,
            render_time_ms,
            estimated_load,
            timestamp_ms: now_ms,
        };
        self.window.push(sample);
        Some(sample)
    }

    /// Returns the read-only rolling window of samples.
    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    /// Returns the tier envelope the sampler measures against.
    pub fn tier(&self) -> &DeviceTierConfig {
        &self.tier
    }

    fn measure_memory_mb(&mut self) -> f32 {
        if let Some(probe) = &self.memory_probe {
            if let Some(mb) = probe.current_usage_mb() {
                return mb;
            }
        }
        if !self.estimator_noted {
            log::debug!(
                "PerformanceSampler: no memory source; estimating pressure from \
                frame-time variance."
            );
            self.estimator_noted = true;
        }
        // Degraded estimator: jittery frame deltas correlate with allocation
        // pressure on hosts that hide real usage. Advisory only.
        let pressure = (self.window.frame_time_variance() / VARIANCE_FULL_PRESSURE).min(1.0);
        pressure * ESTIMATED_MEMORY_SPAN_MB
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyber_core::platform::DeviceTier;

    fn high_tier() -> DeviceTierConfig {
        DeviceTierConfig {
            tier: DeviceTier::High,
            target_fps: 60.0,
            max_concurrent_animations: 15,
            max_particles: 300,
            base_effect_interval_ms: 3_000,
        }
    }

    struct StubMemoryProbe(Option<f32>);

    impl MemoryUsageProbe for StubMemoryProbe {
        fn current_usage_mb(&self) -> Option<f32> {
            self.0
        }
    }

    #[test]
    fn first_tick_anchors_without_a_sample() {
        let mut sampler = PerformanceSampler::new(high_tier());
        assert!(sampler.sample(1000, 5.0).is_none());
        assert_eq!(sampler.window().count(), 0);

        let sample = sampler.sample(1016, 5.0).expect("second tick has a delta");
        assert_eq!(sample.frame_time_ms, 16.0);
        assert_eq!(sampler.window().count(), 1);
    }

    #[test]
    fn fps_is_derived_from_the_tick_delta() {
        let mut sampler = PerformanceSampler::new(high_tier());
        sampler.sample(0, 5.0);
        let sample = sampler.sample(20, 5.0).expect("sample");
        assert_eq!(sample.fps, 50.0);

        let sample = sampler.sample(60, 5.0).expect("sample");
        assert_eq!(sample.fps, 25.0);
    }

    #[test]
    fn non_advancing_timestamp_is_skipped() {
        let mut sampler = PerformanceSampler::new(high_tier());
        sampler.sample(100, 5.0);
        assert!(sampler.sample(100, 5.0).is_none());
        assert_eq!(sampler.window().count(), 0);
    }

    #[test]
    fn estimated_load_is_render_time_over_budget() {
        // High tier budget is 1000/60 ≈ 16.67 ms.
        let mut sampler = PerformanceSampler::new(high_tier());
        sampler.sample(0, 0.0);
        let sample = sampler.sample(16, 16.666_666).expect("sample");
        assert!((sample.estimated_load - 1.0).abs() < 1e-3);
    }

    #[test]
    fn memory_probe_is_preferred_over_the_estimator() {
        let mut sampler = PerformanceSampler::new(high_tier());
        sampler.set_memory_probe(Box::new(StubMemoryProbe(Some(768.0))));
        sampler.sample(0, 5.0);
        let sample = sampler.sample(16, 5.0).expect("sample");
        assert_eq!(sample.memory_mb, 768.0);
    }

    #[test]
    fn estimator_tracks_frame_time_jitter() {
        let mut sampler = PerformanceSampler::new(high_tier());
        // Perfectly steady deltas: variance 0, estimated memory 0.
        let mut now = 0;
        for _ in 0..10 {
            now += 16;
            sampler.sample(now, 5.0);
        }
        let steady = sampler.window().latest().expect("sample").memory_mb;
        assert_eq!(steady, 0.0);

        // Alternating 5/60 ms deltas: high variance, estimator saturates
        // but stays within its advisory span.
        let mut jittery = PerformanceSampler::new(high_tier());
        let mut now = 0;
        for i in 0..10 {
            now += if i % 2 == 0 { 5 } else { 60 };
            jittery.sample(now, 5.0);
        }
        let estimated = jittery.window().latest().expect("sample").memory_mb;
        assert!(estimated > 0.0);
        assert!(estimated <= ESTIMATED_MEMORY_SPAN_MB);
    }

    #[test]
    fn probe_that_cannot_answer_falls_back_to_the_estimator() {
        let mut sampler = PerformanceSampler::new(high_tier());
        sampler.set_memory_probe(Box::new(StubMemoryProbe(None)));
        sampler.sample(0, 5.0);
        let sample = sampler.sample(16, 5.0).expect("sample");
        // One steady delta: variance 0 -> estimator reports 0 instead of halting.
        assert_eq!(sample.memory_mb, 0.0);
    }
}
