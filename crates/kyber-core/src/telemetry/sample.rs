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

//! Per-frame performance observations.

use serde::{Deserialize, Serialize};

/// One frame's worth of performance observations.
///
/// Produced once per frame from the frame delta and whatever the host can
/// observe about memory and render cost. Values the platform cannot measure
/// stay at their neutral defaults rather than blocking sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    /// Instantaneous frames per second derived from the frame delta.
    pub fps: f32,
    /// Frame-to-frame delta in milliseconds.
    pub frame_time_ms: f32,
    /// Estimated process memory usage in megabytes. Zero when unmeasurable.
    pub memory_mb: f32,
    /// Time spent in the render pass for this frame, in milliseconds.
    pub render_time_ms: f32,
    /// Render time as a fraction of the tier's frame budget. 1.0 means the
    /// whole budget was spent rendering.
    pub estimated_load: f32,
    /// Milliseconds since governor start when the sample was taken.
    pub timestamp_ms: u64,
}

impl Default for PerformanceSample {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time_ms: 0.0,
            memory_mb: 0.0,
            render_time_ms: 0.0,
            estimated_load: 0.0,
            timestamp_ms: 0,
        }
    }
}
