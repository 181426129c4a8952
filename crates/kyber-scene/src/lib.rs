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

//! # Kyber Scene
//!
//! Render-side consumers of the governor signal: performance-coupled LOD
//! selection, frustum culling, and the instanced particle pool. The host
//! drives these per frame and gates whole categories through
//! `is_feature_enabled` before doing the work.

#![warn(missing_docs)]

pub mod culling;
pub mod lod;
pub mod particles;

pub use culling::{CullStats, FrustumCuller};
pub use lod::{GeometryHandle, LodError, LodLevel, LodSelector, LodTransition};
pub use particles::{InstancedParticlePool, ParticleInstance, ParticleTransform};
