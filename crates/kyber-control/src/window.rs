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

//! Efficient rolling storage for per-frame performance samples.

use kyber_core::telemetry::PerformanceSample;

/// Number of samples the window retains (one second at 60 Hz).
pub const WINDOW_CAPACITY: usize = 60;

/// A fixed-size circular buffer of the most recent performance samples.
///
/// Once full, each push overwrites the oldest sample. Aggregations are
/// computed on demand over either the whole window or a trailing slice of it;
/// nothing is cached between pushes.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    data: [PerformanceSample; WINDOW_CAPACITY],
    index: usize,
    count: usize,
}

impl SampleWindow {
    /// Creates a new, empty window.
    pub fn new() -> Self {
        Self {
            data: [PerformanceSample::default(); WINDOW_CAPACITY],
            index: 0,
            count: 0,
        }
    }

    /// Pushes a new sample, overwriting the oldest if the window is full.
    pub fn push(&mut self, sample: PerformanceSample) {
        self.data[self.index] = sample;
        self.index = (self.index + 1) % WINDOW_CAPACITY;
        if self.count < WINDOW_CAPACITY {
            self.count += 1;
        }
    }

    /// Returns the number of samples currently in the window.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns an iterator over the samples in chronological order (oldest to newest).
    pub fn iter(&self) -> impl Iterator<Item = &PerformanceSample> {
        let (left, right) = self.data.split_at(self.index);
        if self.count < WINDOW_CAPACITY {
            // Window not full: only use values up to the current index
            right[WINDOW_CAPACITY - self.index..]
                .iter()
                .chain(left[..self.index].iter())
        } else {
            // Window full: start from the current index (the oldest value)
            right.iter().chain(left.iter())
        }
    }

    /// Returns the most recently pushed sample, if any.
    pub fn latest(&self) -> Option<&PerformanceSample> {
        if self.count == 0 {
            return None;
        }
        let latest_index = (self.index + WINDOW_CAPACITY - 1) % WINDOW_CAPACITY;
        Some(&self.data[latest_index])
    }

    /// Calculates the average fps over the trailing `k` samples.
    ///
    /// When fewer than `k` samples are present the average covers what is
    /// there; callers that need a minimum population check [`Self::count`].
    pub fn trailing_avg_fps(&self, k: usize) -> f32 {
        let take_n = k.min(self.count);
        if take_n == 0 {
            return 0.0;
        }
        let sum: f32 = self
            .iter()
            .skip(self.count - take_n)
            .map(|s| s.fps)
            .sum();
        sum / take_n as f32
    }

    /// Calculates the average fps over the whole window.
    pub fn average_fps(&self) -> f32 {
        self.trailing_avg_fps(self.count)
    }

    /// Returns the minimum fps in the window, or `f32::MAX` if empty.
    pub fn min_fps(&self) -> f32 {
        if self.count == 0 {
            return f32::MAX;
        }
        self.iter().map(|s| s.fps).fold(f32::MAX, f32::min)
    }

    /// Returns the maximum fps in the window, or `f32::MIN` if empty.
    pub fn max_fps(&self) -> f32 {
        if self.count == 0 {
            return f32::MIN;
        }
        self.iter().map(|s| s.fps).fold(f32::MIN, f32::max)
    }

    /// Returns the maximum render time over the trailing `k` samples, in
    /// milliseconds, or `0.0` if the window is empty.
    pub fn trailing_max_render_time_ms(&self, k: usize) -> f32 {
        let take_n = k.min(self.count);
        if take_n == 0 {
            return 0.0;
        }
        self.iter()
            .skip(self.count - take_n)
            .map(|s| s.render_time_ms)
            .fold(0.0, f32::max)
    }

    /// Calculates the variance of frame times over the whole window.
    ///
    /// Used as a degraded pressure estimator when no memory source exists:
    /// high frame-time variance indicates inconsistency.
    pub fn frame_time_variance(&self) -> f32 {
        if self.count < 2 {
            return 0.0;
        }
        let avg = self.average_frame_time_ms();
        let sum_sq: f32 = self
            .iter()
            .map(|s| (s.frame_time_ms - avg) * (s.frame_time_ms - avg))
            .sum();
        sum_sq / self.count as f32
    }

    /// Calculates the average frame time over the whole window, in milliseconds.
    pub fn average_frame_time_ms(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        let sum: f32 = self.iter().map(|s| s.frame_time_ms).sum();
        sum / self.count as f32
    }

    /// Calculates the average estimated load over the whole window.
    pub fn average_load(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        let sum: f32 = self.iter().map(|s| s.estimated_load).sum();
        sum / self.count as f32
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_with_fps(fps: f32) -> PerformanceSample {
        PerformanceSample {
            fps,
            frame_time_ms: 1000.0 / fps,
            ..Default::default()
        }
    }

    #[test]
    fn test_push_and_count() {
        let mut window = SampleWindow::new();
        assert_eq!(window.count(), 0);

        window.push(sample_with_fps(60.0));
        window.push(sample_with_fps(58.0));
        assert_eq!(window.count(), 2);
    }

    #[test]
    fn test_window_caps_at_capacity() {
        let mut window = SampleWindow::new();
        for i in 0..(WINDOW_CAPACITY + 15) {
            window.push(sample_with_fps(i as f32));
        }
        assert_eq!(window.count(), WINDOW_CAPACITY);

        // The oldest surviving sample is the 15th pushed.
        let first = window.iter().next().expect("window is not empty");
        assert_eq!(first.fps, 15.0);
    }

    #[test]
    fn test_iter_is_chronological_after_wrap() {
        let mut window = SampleWindow::new();
        for i in 0..(WINDOW_CAPACITY + 3) {
            window.push(sample_with_fps(i as f32));
        }
        let fps_values: Vec<f32> = window.iter().map(|s| s.fps).collect();
        for pair in fps_values.windows(2) {
            assert!(pair[0] < pair[1], "samples out of order: {pair:?}");
        }
    }

    #[test]
    fn test_latest() {
        let mut window = SampleWindow::new();
        assert!(window.latest().is_none());

        window.push(sample_with_fps(60.0));
        window.push(sample_with_fps(42.0));
        assert_eq!(window.latest().expect("has samples").fps, 42.0);
    }

    #[test]
    fn test_trailing_avg_fps() {
        let mut window = SampleWindow::new();
        // 20 old samples at 60 fps, then 10 recent at 30 fps.
        for _ in 0..20 {
            window.push(sample_with_fps(60.0));
        }
        for _ in 0..10 {
            window.push(sample_with_fps(30.0));
        }

        assert_eq!(window.trailing_avg_fps(10), 30.0);
        // Trailing 30 spans all samples: (20 * 60 + 10 * 30) / 30.
        assert_eq!(window.trailing_avg_fps(30), 50.0);
    }

    #[test]
    fn test_trailing_avg_with_fewer_samples_than_requested() {
        let mut window = SampleWindow::new();
        window.push(sample_with_fps(50.0));
        window.push(sample_with_fps(40.0));

        assert_eq!(window.trailing_avg_fps(10), 45.0);
    }

    #[test]
    fn test_empty_window_aggregates() {
        let window = SampleWindow::new();
        assert_eq!(window.trailing_avg_fps(10), 0.0);
        assert_eq!(window.average_fps(), 0.0);
        assert_eq!(window.average_frame_time_ms(), 0.0);
        assert_eq!(window.average_load(), 0.0);
        assert_eq!(window.min_fps(), f32::MAX);
        assert_eq!(window.max_fps(), f32::MIN);
    }

    #[test]
    fn test_min_max_fps() {
        let mut window = SampleWindow::new();
        window.push(sample_with_fps(45.0));
        window.push(sample_with_fps(61.0));
        window.push(sample_with_fps(52.0));
        assert_eq!(window.min_fps(), 45.0);
        assert_eq!(window.max_fps(), 61.0);
    }

    #[test]
    fn test_trailing_max_render_time() {
        let mut window = SampleWindow::new();
        for render_ms in [30.0, 8.0, 9.0, 10.0] {
            window.push(PerformanceSample {
                render_time_ms: render_ms,
                ..Default::default()
            });
        }
        // The 30 ms spike is older than the trailing 3 samples.
        assert_eq!(window.trailing_max_render_time_ms(3), 10.0);
        assert_eq!(window.trailing_max_render_time_ms(4), 30.0);
    }

    #[test]
    fn test_frame_time_variance() {
        let mut window = SampleWindow::new();
        for frame_ms in [10.0, 10.0, 10.0, 10.0] {
            window.push(PerformanceSample {
                frame_time_ms: frame_ms,
                ..Default::default()
            });
        }
        assert_eq!(window.frame_time_variance(), 0.0); // Perfectly stable

        let mut jittery = SampleWindow::new();
        for frame_ms in [5.0, 15.0, 5.0, 15.0] {
            jittery.push(PerformanceSample {
                frame_time_ms: frame_ms,
                ..Default::default()
            });
        }
        // avg = 10.0, variance = (25 + 25 + 25 + 25) / 4 = 25.0
        assert!((jittery.frame_time_variance() - 25.0).abs() < 0.001);
    }
}
