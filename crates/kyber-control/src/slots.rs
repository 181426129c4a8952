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

//! Capacity-bounded animation slots and managed per-tick loops.

use crate::error::SlotError;

/// Number of active slots that together share one unit of effect frequency:
/// the adaptive interval multiplier is `max(1, active / SLOTS_PER_STEP)`.
const SLOTS_PER_STEP: usize = 5;

/// Membership record for one registered animation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AnimationSlot {
    id: String,
    registered_at_ms: u64,
}

/// Callback driven by a managed loop. An `Err` is fatal for that loop only.
pub type LoopCallback = Box<dyn FnMut(u64) -> anyhow::Result<()> + Send>;

struct ManagedLoop {
    id: String,
    base_interval_ms: u64,
    last_run_ms: Option<u64>,
    callback: LoopCallback,
}

/// Caps concurrently registered periodic effects per device tier and drives
/// managed per-tick loops with elapsed-time gating.
///
/// Single-writer: only this manager mutates the slot set. Unregistering is
/// idempotent and synchronous — once a slot is released, its managed loop
/// (if any) is gone and its callback can never fire again.
pub struct AnimationSlotManager {
    capacity: usize,
    slots: Vec<AnimationSlot>,
    loops: Vec<ManagedLoop>,
}

impl AnimationSlotManager {
    /// Creates a manager with the tier's slot capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: Vec::with_capacity(capacity),
            loops: Vec::new(),
        }
    }

    /// Reserves a slot for `id`.
    ///
    /// Returns `false` when every slot is taken. Registering an id that
    /// already holds a slot keeps that slot and returns `true`.
    pub fn register(&mut self, id: &str, now_ms: u64) -> bool {
        if self.slots.iter().any(|s| s.id == id) {
            log::debug!("AnimationSlotManager: '{}' already holds a slot.", id);
            return true;
        }
        if self.slots.len() >= self.capacity {
            log::debug!(
                "AnimationSlotManager: rejected '{}', all {} slots taken.",
                id,
                self.capacity
            );
            return false;
        }
        self.slots.push(AnimationSlot {
            id: id.to_owned(),
            registered_at_ms: now_ms,
        });
        true
    }

    /// Releases the slot held by `id` and cancels its managed loop, if any.
    ///
    /// Idempotent: unknown ids are a no-op, never an error.
    pub fn unregister(&mut self, id: &str) {
        self.loops.retain(|l| l.id != id);
        self.slots.retain(|s| s.id != id);
    }

    /// Number of currently held slots.
    pub fn active_count(&self) -> usize {
        self.slots.len()
    }

    /// Slot capacity for this tier.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Scales a base period up under load: busy scenes animate slower
    /// instead of dropping frames outright.
    pub fn adaptive_interval_ms(&self, base_ms: u64) -> u64 {
        base_ms * (self.slots.len() / SLOTS_PER_STEP).max(1) as u64
    }

    /// Reserves a slot and installs a managed per-tick loop.
    ///
    /// The callback runs from [`drive`](Self::drive) once its adaptive
    /// interval has elapsed. Fails when all slots are taken or a loop with
    /// this id already runs.
    pub fn spawn_loop(
        &mut self,
        id: &str,
        base_interval_ms: u64,
        callback: LoopCallback,
        now_ms: u64,
    ) -> Result<(), SlotError> {
        if self.loops.iter().any(|l| l.id == id) {
            return Err(SlotError::DuplicateLoop(id.to_owned()));
        }
        if !self.register(id, now_ms) {
            return Err(SlotError::CapacityExhausted {
                capacity: self.capacity,
            });
        }
        self.loops.push(ManagedLoop {
            id: id.to_owned(),
            base_interval_ms,
            last_run_ms: None,
            callback,
        });
        Ok(())
    }

    /// Cancels a managed loop and synchronously releases its slot.
    ///
    /// After this returns the loop's callback can never fire again.
    pub fn cancel_loop(&mut self, id: &str) {
        self.unregister(id);
    }

    /// Drives every managed loop once.
    ///
    /// Each loop runs only when its adaptive interval has elapsed since its
    /// last run (elapsed-time gating). A callback error terminates that loop
    /// alone: the loop is removed, its slot released, the error logged with
    /// the loop id. Never retried.
    pub fn drive(&mut self, now_ms: u64) {
        // Interval scaling is fixed at drive entry so loops removed mid-pass
        // do not change gating for the rest of the pass.
        let active = self.slots.len();
        let multiplier = (active / SLOTS_PER_STEP).max(1) as u64;

        let mut failed: Vec<String> = Vec::new();
        for managed in &mut self.loops {
            let interval = managed.base_interval_ms * multiplier;
            let due = managed
                .last_run_ms
                .map_or(true, |last| now_ms.saturating_sub(last) >= interval);
            if !due {
                continue;
            }
            managed.last_run_ms = Some(now_ms);
            if let Err(err) = (managed.callback)(now_ms) {
                log::error!(
                    "AnimationSlotManager: loop '{}' failed and is terminated: {err:#}",
                    managed.id
                );
                failed.push(managed.id.clone());
            }
        }
        for id in failed {
            self.unregister(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn capacity_bounds_registration() {
        let mut slots = AnimationSlotManager::new(3);
        assert!(slots.register("a", 0));
        assert!(slots.register("b", 0));
        assert!(slots.register("c", 0));
        assert!(!slots.register("d", 0));
        assert_eq!(slots.active_count(), 3);
    }

    #[test]
    fn re_registering_a_held_id_keeps_its_slot() {
        let mut slots = AnimationSlotManager::new(1);
        assert!(slots.register("a", 0));
        assert!(slots.register("a", 10));
        assert_eq!(slots.active_count(), 1);
    }

    #[test]
    fn unregister_is_idempotent() {
        let mut slots = AnimationSlotManager::new(3);
        slots.register("a", 0);
        slots.unregister("a");
        slots.unregister("a");
        slots.unregister("never_registered");
        assert_eq!(slots.active_count(), 0);
    }

    #[test]
    fn adaptive_interval_scales_with_load() {
        let mut slots = AnimationSlotManager::new(20);
        assert_eq!(slots.adaptive_interval_ms(1_000), 1_000);

        for i in 0..9 {
            slots.register(&format!("fx{i}"), 0);
        }
        // 9 active / 5 = 1 (integer division).
        assert_eq!(slots.adaptive_interval_ms(1_000), 1_000);

        slots.register("fx9", 0);
        // 10 active / 5 = 2.
        assert_eq!(slots.adaptive_interval_ms(1_000), 2_000);
    }

    #[test]
    fn loops_are_gated_by_elapsed_time() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut slots = AnimationSlotManager::new(3);
        slots
            .spawn_loop(
                "fx",
                100,
                Box::new(move |_| {
                    counter.fetch_add(1, Ordering::Relaxed);
                    Ok(())
                }),
                0,
            )
            .expect("slot available");

        slots.drive(0); // first drive always runs
        slots.drive(50); // 50 < 100: gated
        slots.drive(99); // still gated
        slots.drive(100); // due again
        assert_eq!(runs.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn failing_callback_terminates_only_its_loop() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut slots = AnimationSlotManager::new(3);
        slots
            .spawn_loop("doomed", 10, Box::new(|_| anyhow::bail!("effect exploded")), 0)
            .expect("slot available");
        slots
            .spawn_loop(
                "steady",
                10,
                Box::new(move |_| {
                    counter.fetch_add(1, Ordering::Relaxed);
                    Ok(())
                }),
                0,
            )
            .expect("slot available");

        slots.drive(0);
        assert_eq!(slots.active_count(), 1); // doomed's slot released
        slots.drive(10);
        assert_eq!(runs.load(Ordering::Relaxed), 2); // steady keeps running
    }

    #[test]
    fn no_callback_fires_after_cancel() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut slots = AnimationSlotManager::new(3);
        slots
            .spawn_loop(
                "fx",
                10,
                Box::new(move |_| {
                    counter.fetch_add(1, Ordering::Relaxed);
                    Ok(())
                }),
                0,
            )
            .expect("slot available");

        slots.cancel_loop("fx");
        assert_eq!(slots.active_count(), 0);
        slots.drive(0);
        slots.drive(1_000);
        assert_eq!(runs.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn spawn_loop_reports_exhaustion_and_duplicates() {
        let mut slots = AnimationSlotManager::new(1);
        slots
            .spawn_loop("fx", 10, Box::new(|_| Ok(())), 0)
            .expect("slot available");

        let err = slots
            .spawn_loop("fx", 10, Box::new(|_| Ok(())), 0)
            .unwrap_err();
        assert_eq!(err, SlotError::DuplicateLoop("fx".to_string()));

        let err = slots
            .spawn_loop("other", 10, Box::new(|_| Ok(())), 0)
            .unwrap_err();
        assert_eq!(err, SlotError::CapacityExhausted { capacity: 1 });
    }
}
