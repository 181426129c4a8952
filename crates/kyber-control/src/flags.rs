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

//! Advisory flags shared with independent host systems.
//!
//! These are the only broadly shared mutable state in the subsystem. Writers
//! perform single atomic stores; readers tolerate staleness within one tick,
//! so `Relaxed` ordering is sufficient everywhere.

use std::sync::atomic::{AtomicBool, Ordering};

/// Advisory state raised during emergency mode and consulted by producers
/// the governor does not own (animation drivers, audio mixers, pollers).
///
/// Shared by `Arc`; the [`GovernorService`](crate::GovernorService) is the
/// only writer.
#[derive(Debug, Default)]
pub struct AdvisoryFlags {
    emergency: AtomicBool,
    zero_animation: AtomicBool,
    audio_suspended: AtomicBool,
    reduced_polling: AtomicBool,
}

impl AdvisoryFlags {
    /// Creates flags with everything lowered.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while emergency mode is active.
    pub fn emergency(&self) -> bool {
        self.emergency.load(Ordering::Relaxed)
    }

    /// True when animation durations should be forced to zero.
    pub fn zero_animation(&self) -> bool {
        self.zero_animation.load(Ordering::Relaxed)
    }

    /// True when host audio contexts should be paused.
    pub fn audio_suspended(&self) -> bool {
        self.audio_suspended.load(Ordering::Relaxed)
    }

    /// True when background pollers should drop to their slow cadence.
    pub fn reduced_polling(&self) -> bool {
        self.reduced_polling.load(Ordering::Relaxed)
    }

    /// Raises or lowers the whole emergency flag set.
    pub(crate) fn set_emergency(&self, active: bool) {
        self.emergency.store(active, Ordering::Relaxed);
        self.zero_animation.store(active, Ordering::Relaxed);
        self.audio_suspended.store(active, Ordering::Relaxed);
        self.reduced_polling.store(active, Ordering::Relaxed);
    }
}
