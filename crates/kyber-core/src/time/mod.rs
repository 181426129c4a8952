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

//! Provides the clock abstraction the governor's cooldowns are timed against.
//!
//! Hysteresis cooldowns and the emergency spike window are wall-clock driven.
//! Behind the [`TickClock`] trait the production path uses a monotonic
//! [`SystemClock`], while tests and scripted replays drive a [`ManualClock`]
//! forward explicitly instead of sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A monotonic source of elapsed milliseconds.
pub trait TickClock: Send + Sync {
    /// Returns the milliseconds elapsed since the clock's epoch.
    fn now_ms(&self) -> u64;
}

/// A [`TickClock`] backed by [`Instant`], anchored at construction time.
#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Creates a clock whose epoch is the moment of this call.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickClock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// A [`TickClock`] that only moves when told to.
///
/// Shared freely across components via `Arc`; `advance` uses atomics so a
/// test can hold the clock while the governor holds another handle to it.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock frozen at `start_ms`.
    pub fn starting_at(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    /// Moves the clock forward by `delta_ms`.
    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::Relaxed);
    }

    /// Jumps the clock to an absolute time.
    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::Relaxed);
    }
}

impl TickClock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::Relaxed)
    }
}
