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

//! Fixed-capacity instanced particle pool.
//!
//! All per-particle state lives in two preallocated buffers: decomposed
//! transforms for CPU-side updates and a packed `#[repr(C)]` instance buffer
//! for the renderer. Steady-state updates touch both in place — no
//! per-particle heap allocation after construction.

use bytemuck::{Pod, Zeroable};
use kyber_core::math::{Vec3, TAU};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Half-extent of the cube particles spawn in.
const SPAWN_EXTENT: f32 = 50.0;
/// Spawn scale range.
const SCALE_RANGE: (f32, f32) = (0.5, 2.0);
/// Spawn opacity range.
const OPACITY_RANGE: (f32, f32) = (0.3, 1.0);

/// Decomposed transform of one particle, mutated by batch updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleTransform {
    /// World position.
    pub position: Vec3,
    /// Euler rotation in radians.
    pub rotation: Vec3,
    /// Uniform scale.
    pub scale: f32,
    /// Alpha multiplier.
    pub opacity: f32,
}

/// Packed per-instance data as the renderer consumes it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// World position.
    pub position: [f32; 3],
    /// Uniform scale.
    pub scale: f32,
    /// Euler rotation in radians.
    pub rotation: [f32; 3],
    /// Alpha multiplier.
    pub opacity: f32,
}

/// Capacity-bounded pool of batched particle transforms.
///
/// Capacity comes from the device tier and is fixed at construction; when
/// requirements change the pool is rebuilt, never resized in place. A seed
/// makes the spawn layout reproducible.
pub struct InstancedParticlePool {
    capacity: usize,
    seed: u64,
    transforms: Vec<ParticleTransform>,
    instances: Vec<ParticleInstance>,
    dirty: bool,
}

impl InstancedParticlePool {
    /// Allocates a pool of `capacity` particles with a seeded random layout.
    pub fn new(capacity: usize, seed: u64) -> Self {
        let mut pool = Self {
            capacity,
            seed,
            transforms: Vec::new(),
            instances: Vec::new(),
            dirty: false,
        };
        pool.populate();
        pool
    }

    /// Number of particle slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Applies `update` to every slot's transform in one batched pass.
    ///
    /// The packed buffer is not touched here; call [`flush`](Self::flush)
    /// once per tick after all updates.
    pub fn update_instances(&mut self, mut update: impl FnMut(usize, &mut ParticleTransform)) {
        for (index, transform) in self.transforms.iter_mut().enumerate() {
            update(index, transform);
        }
        self.dirty = true;
    }

    /// Recomposes the packed instance buffer and returns it.
    ///
    /// A no-op when nothing changed since the last flush.
    pub fn flush(&mut self) -> &[ParticleInstance] {
        if self.dirty {
            for (instance, transform) in self.instances.iter_mut().zip(&self.transforms) {
                *instance = ParticleInstance {
                    position: [transform.position.x, transform.position.y, transform.position.z],
                    scale: transform.scale,
                    rotation: [transform.rotation.x, transform.rotation.y, transform.rotation.z],
                    opacity: transform.opacity,
                };
            }
            self.dirty = false;
        }
        &self.instances
    }

    /// The packed buffer as raw bytes for upload.
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Rebuilds the pool at a new capacity.
    ///
    /// The old buffers are disposed before the new ones are installed; the
    /// spawn layout is regenerated from the pool's seed.
    pub fn rebuild(&mut self, capacity: usize) {
        log::debug!(
            "InstancedParticlePool: rebuilding {} -> {} slots.",
            self.capacity,
            capacity
        );
        self.transforms = Vec::new();
        self.instances = Vec::new();
        self.capacity = capacity;
        self.populate();
    }

    fn populate(&mut self) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.transforms = (0..self.capacity)
            .map(|_| ParticleTransform {
                position: Vec3::new(
                    rng.random_range(-SPAWN_EXTENT..SPAWN_EXTENT),
                    rng.random_range(-SPAWN_EXTENT..SPAWN_EXTENT),
                    rng.random_range(-SPAWN_EXTENT..SPAWN_EXTENT),
                ),
                rotation: Vec3::new(
                    rng.random_range(0.0..TAU),
                    rng.random_range(0.0..TAU),
                    rng.random_range(0.0..TAU),
                ),
                scale: rng.random_range(SCALE_RANGE.0..SCALE_RANGE.1),
                opacity: rng.random_range(OPACITY_RANGE.0..OPACITY_RANGE.1),
            })
            .collect();
        self.instances = vec![ParticleInstance::zeroed(); self.capacity];
        self.dirty = true;
    }
}
