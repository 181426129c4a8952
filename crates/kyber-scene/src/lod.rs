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

//! Performance-coupled level-of-detail selection.
//!
//! Selection distance is the camera distance scaled by a performance
//! multiplier. The multiplier is `1.0` at healthy frame rates and *grows* as
//! fps falls, so a struggling renderer sees objects as "further away" and
//! picks coarser geometry.

use std::collections::HashMap;
use std::fmt::Display;

use kyber_core::math::Vec3;

/// Fps-to-target ratio at or above which distances are unscaled.
const HEALTHY_FPS_RATIO: f32 = 0.9;
/// Fps-to-target ratio at or above which distances scale moderately.
const STRAINED_FPS_RATIO: f32 = 0.5;
/// Distance multiplier in the strained fps band.
const STRAINED_MULTIPLIER: f32 = 1.5;
/// Distance multiplier below the strained band.
const CRITICAL_MULTIPLIER: f32 = 2.0;

/// Opaque handle to a geometry resource owned by the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryHandle(pub u64);

/// One fidelity step in an object's LOD chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodLevel {
    /// Selection distance up to (and including) which this level applies.
    pub threshold_distance: f32,
    /// Relative fidelity of the level, `1.0` = full quality.
    pub quality_factor: f32,
    /// The geometry backing this level.
    pub geometry: GeometryHandle,
}

/// Errors raised when a LOD chain or query is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LodError {
    /// The chain had no levels.
    EmptyChain,
    /// Thresholds were not strictly increasing at the given index.
    NonIncreasingThresholds {
        /// Index of the offending level.
        index: usize,
    },
    /// An object with this id is already tracked.
    DuplicateObject(u64),
    /// No object with this id is tracked.
    UnknownObject(u64),
}

impl Display for LodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LodError::EmptyChain => write!(f, "LOD chain must have at least one level"),
            LodError::NonIncreasingThresholds { index } => {
                write!(f, "LOD thresholds must be strictly increasing (level {index})")
            }
            LodError::DuplicateObject(id) => write!(f, "Object {id} is already tracked"),
            LodError::UnknownObject(id) => write!(f, "Object {id} is not tracked"),
        }
    }
}

impl std::error::Error for LodError {}

/// Outcome of one selection pass for one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LodTransition {
    /// Level index before the pass.
    pub previous: usize,
    /// Level index after the pass.
    pub current: usize,
}

impl LodTransition {
    /// True when the pass swapped geometry.
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

struct TrackedObject {
    position: Vec3,
    levels: Vec<LodLevel>,
    current: usize,
}

/// Per-object LOD state, geometry lifetimes included.
///
/// The selector owns the per-object level cache: when a swap retires a
/// geometry it is queued for reclamation unless it is still the current level
/// of another object (reference counts guard shared handles) or it is a
/// level-0 base geometry (the canonical source, always retained). The host
/// drains the reclaim queue and disposes the actual resources.
pub struct LodSelector {
    target_fps: f32,
    objects: HashMap<u64, TrackedObject>,
    /// How many objects hold each handle as their *current* level.
    current_refs: HashMap<GeometryHandle, usize>,
    /// How many tracked chains use each handle as their level-0 base.
    base_refs: HashMap<GeometryHandle, usize>,
    reclaimed: Vec<GeometryHandle>,
    switch_count: u64,
}

impl LodSelector {
    /// Creates a selector steering against the given target frame rate.
    pub fn new(target_fps: f32) -> Self {
        Self {
            target_fps,
            objects: HashMap::new(),
            current_refs: HashMap::new(),
            base_refs: HashMap::new(),
            reclaimed: Vec::new(),
            switch_count: 0,
        }
    }

    /// Starts tracking an object at level 0 of its chain.
    ///
    /// The chain must be non-empty with strictly increasing thresholds; the
    /// last level is the fallback for any distance beyond the largest one.
    pub fn track(&mut self, id: u64, position: Vec3, levels: Vec<LodLevel>) -> Result<(), LodError> {
        if self.objects.contains_key(&id) {
            return Err(LodError::DuplicateObject(id));
        }
        if levels.is_empty() {
            return Err(LodError::EmptyChain);
        }
        for (i, pair) in levels.windows(2).enumerate() {
            if pair[1].threshold_distance <= pair[0].threshold_distance {
                return Err(LodError::NonIncreasingThresholds { index: i + 1 });
            }
        }

        *self.current_refs.entry(levels[0].geometry).or_insert(0) += 1;
        *self.base_refs.entry(levels[0].geometry).or_insert(0) += 1;
        self.objects.insert(
            id,
            TrackedObject {
                position,
                levels,
                current: 0,
            },
        );
        Ok(())
    }

    /// Stops tracking an object and queues its reclaimable geometries.
    pub fn untrack(&mut self, id: u64) -> Result<(), LodError> {
        let object = self.objects.remove(&id).ok_or(LodError::UnknownObject(id))?;
        let base = object.levels[0].geometry;
        self.release_current(object.levels[object.current].geometry);
        if let Some(count) = self.base_refs.get_mut(&base) {
            *count -= 1;
            if *count == 0 {
                self.base_refs.remove(&base);
            }
        }
        // Base geometries are never reclaimed here: the host owns the
        // canonical copy.
        Ok(())
    }

    /// Moves a tracked object.
    pub fn set_position(&mut self, id: u64, position: Vec3) -> Result<(), LodError> {
        let object = self.objects.get_mut(&id).ok_or(LodError::UnknownObject(id))?;
        object.position = position;
        Ok(())
    }

    /// Number of tracked objects.
    pub fn tracked_count(&self) -> usize {
        self.objects.len()
    }

    /// The object's current level index.
    pub fn current_level(&self, id: u64) -> Option<usize> {
        self.objects.get(&id).map(|o| o.current)
    }

    /// The geometry currently selected for an object.
    pub fn current_geometry(&self, id: u64) -> Option<GeometryHandle> {
        self.objects.get(&id).map(|o| o.levels[o.current].geometry)
    }

    /// Cumulative number of level swaps since construction.
    pub fn switch_count(&self) -> u64 {
        self.switch_count
    }

    /// Takes the geometries retired since the last drain.
    pub fn drain_reclaimed(&mut self) -> Vec<GeometryHandle> {
        std::mem::take(&mut self.reclaimed)
    }

    /// Distance multiplier for the current frame rate, in three bands.
    ///
    /// At or near the target the multiplier is `1.0`; below it the
    /// multiplier grows, inflating selection distances so degraded
    /// performance picks coarser levels.
    pub fn perf_multiplier(&self, fps: f32) -> f32 {
        let ratio = fps / self.target_fps;
        if ratio >= HEALTHY_FPS_RATIO {
            1.0
        } else if ratio >= STRAINED_FPS_RATIO {
            STRAINED_MULTIPLIER
        } else {
            CRITICAL_MULTIPLIER
        }
    }

    /// Runs one selection pass for an object.
    ///
    /// Picks the first level whose threshold is `>=` the performance-adjusted
    /// camera distance (ties resolve to that threshold's level); beyond the
    /// largest threshold the last level applies. Geometry is swapped only
    /// when the selected level differs from the current one.
    pub fn select(
        &mut self,
        id: u64,
        camera_position: Vec3,
        current_fps: f32,
    ) -> Result<LodTransition, LodError> {
        let multiplier = self.perf_multiplier(current_fps);
        let object = self.objects.get_mut(&id).ok_or(LodError::UnknownObject(id))?;

        let distance = camera_position.distance(object.position);
        let adjusted = distance * multiplier;
        let selected = object
            .levels
            .iter()
            .position(|level| level.threshold_distance >= adjusted)
            .unwrap_or(object.levels.len() - 1);

        let transition = LodTransition {
            previous: object.current,
            current: selected,
        };
        if !transition.changed() {
            return Ok(transition);
        }

        let retired = object.levels[object.current].geometry;
        let incoming = object.levels[selected].geometry;
        let retired_is_base = retired == object.levels[0].geometry;
        object.current = selected;
        self.switch_count += 1;

        *self.current_refs.entry(incoming).or_insert(0) += 1;
        if retired_is_base {
            // Level 0 is the canonical source: drop the current ref but never
            // queue it for disposal.
            if let Some(count) = self.current_refs.get_mut(&retired) {
                *count -= 1;
                if *count == 0 {
                    self.current_refs.remove(&retired);
                }
            }
        } else {
            self.release_current(retired);
        }

        log::trace!(
            "LodSelector: object {} level {} -> {} (distance {:.1}, x{:.1})",
            id,
            transition.previous,
            transition.current,
            distance,
            multiplier
        );
        Ok(transition)
    }

    /// Drops a current-level reference and queues the handle for reclamation
    /// once nothing references it.
    fn release_current(&mut self, handle: GeometryHandle) {
        if let Some(count) = self.current_refs.get_mut(&handle) {
            *count -= 1;
            if *count > 0 {
                return;
            }
            self.current_refs.remove(&handle);
        }
        if !self.base_refs.contains_key(&handle) {
            self.reclaimed.push(handle);
        }
    }
}
