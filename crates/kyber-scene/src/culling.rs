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

//! Per-frame frustum culling.

use kyber_core::math::{Aabb, Frustum, Mat4};

/// Per-pass culling counters, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullStats {
    /// Bounding volumes tested this pass.
    pub tested: usize,
    /// Volumes rejected as outside the frustum.
    pub culled: usize,
}

impl CullStats {
    /// Volumes that passed the test.
    pub fn visible(&self) -> usize {
        self.tested - self.culled
    }
}

/// Tests tracked bounding volumes against the camera frustum.
///
/// Purely a visibility flag: the culler never touches geometry lifetimes.
/// Until the first camera update every volume is reported visible — culling
/// with no frustum would reject the whole scene.
#[derive(Debug, Default)]
pub struct FrustumCuller {
    frustum: Option<Frustum>,
    stats: CullStats,
}

impl FrustumCuller {
    /// Creates a culler with no frustum yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the frustum from the camera's view-projection matrix and
    /// resets the pass counters. Called once per tick before visibility
    /// queries.
    pub fn begin_pass(&mut self, view_projection: &Mat4) {
        self.frustum = Some(Frustum::from_view_projection(view_projection));
        self.stats = CullStats::default();
    }

    /// Tests one bounding volume against the current frustum.
    pub fn is_visible(&mut self, bounds: &Aabb) -> bool {
        self.stats.tested += 1;
        let visible = match &self.frustum {
            Some(frustum) => frustum.intersects_aabb(bounds),
            None => true,
        };
        if !visible {
            self.stats.culled += 1;
        }
        visible
    }

    /// Counters for the current pass.
    pub fn stats(&self) -> CullStats {
        self.stats
    }
}
