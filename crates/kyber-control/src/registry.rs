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

//! Registry of toggleable features and their governance state.

use crate::error::FeatureConfigError;
use serde::{Deserialize, Serialize};

/// Priority of an essential feature (disabled last, re-enabled first).
pub const PRIORITY_ESSENTIAL: u8 = 1;
/// Priority of an expendable feature (disabled first, re-enabled last).
pub const PRIORITY_EXPENDABLE: u8 = 5;

/// Registration record for a toggleable feature.
///
/// Registered once at startup; the registry owns all state changes after
/// that (single-writer discipline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    /// Stable feature identifier, chosen by the caller.
    pub id: String,
    /// Governance priority: `1` = essential .. `5` = expendable.
    pub priority: u8,
    /// Relative resource cost of the feature, for diagnostics.
    pub resource_weight: f32,
}

impl FeatureDescriptor {
    /// Convenience constructor.
    pub fn new(id: impl Into<String>, priority: u8, resource_weight: f32) -> Self {
        Self {
            id: id.into(),
            priority,
            resource_weight,
        }
    }
}

/// Entry in the feature registry: the descriptor plus its mutable state.
#[derive(Debug, Clone)]
struct FeatureEntry {
    descriptor: FeatureDescriptor,
    enabled: bool,
    last_toggle_ms: Option<u64>,
}

impl FeatureEntry {
    fn off_cooldown(&self, now_ms: u64, cooldown_ms: u64) -> bool {
        self.last_toggle_ms
            .map_or(true, |t| now_ms.saturating_sub(t) >= cooldown_ms)
    }
}

/// Insertion-ordered store of governed features.
///
/// Features whose descriptor fails validation are recorded as *ungoverned*:
/// they answer `true` from [`is_enabled`](Self::is_enabled) forever and are
/// never candidates for a toggle (fail open).
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    entries: Vec<FeatureEntry>,
    ungoverned: Vec<String>,
}

impl FeatureRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a feature, initially enabled.
    ///
    /// A priority outside `1..=5` rejects the descriptor: the feature is
    /// recorded ungoverned (always enabled) and the error is returned so the
    /// caller can surface the misconfiguration.
    pub fn register(&mut self, descriptor: FeatureDescriptor) -> Result<(), FeatureConfigError> {
        if self.entries.iter().any(|e| e.descriptor.id == descriptor.id)
            || self.ungoverned.contains(&descriptor.id)
        {
            return Err(FeatureConfigError::DuplicateId(descriptor.id));
        }
        if !(PRIORITY_ESSENTIAL..=PRIORITY_EXPENDABLE).contains(&descriptor.priority) {
            log::warn!(
                "FeatureRegistry: rejected '{}' (priority {} outside {}..={}); \
                feature will stay enabled and ungoverned.",
                descriptor.id,
                descriptor.priority,
                PRIORITY_ESSENTIAL,
                PRIORITY_EXPENDABLE
            );
            self.ungoverned.push(descriptor.id.clone());
            return Err(FeatureConfigError::InvalidPriority {
                id: descriptor.id,
                priority: descriptor.priority,
            });
        }

        log::info!(
            "FeatureRegistry: registered '{}' (priority={}, weight={:.2})",
            descriptor.id,
            descriptor.priority,
            descriptor.resource_weight
        );
        self.entries.push(FeatureEntry {
            descriptor,
            enabled: true,
            last_toggle_ms: None,
        });
        Ok(())
    }

    /// Returns whether a feature is enabled.
    ///
    /// Unknown and ungoverned ids answer `true`: a producer that forgot to
    /// register is never silently blocked.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.entries
            .iter()
            .find(|e| e.descriptor.id == id)
            .map_or(true, |e| e.enabled)
    }

    /// Number of governed features.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no features are governed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if at least one governed feature is disabled.
    pub fn any_disabled(&self) -> bool {
        self.entries.iter().any(|e| !e.enabled)
    }

    /// Ids of currently enabled features, in registration order.
    ///
    /// Ungoverned (fail-open) features are included: consumers see them as
    /// enabled.
    pub fn enabled_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.descriptor.id.clone())
            .chain(self.ungoverned.iter().cloned())
            .collect()
    }

    /// Ids of currently disabled features, in registration order.
    pub fn disabled_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !e.enabled)
            .map(|e| e.descriptor.id.clone())
            .collect()
    }

    /// Picks the feature to disable under pressure: among enabled entries
    /// outside their disable cooldown, the highest priority value (most
    /// expendable). Registration order breaks ties.
    pub fn disable_candidate(&self, now_ms: u64, cooldown_ms: u64) -> Option<&str> {
        self.entries
            .iter()
            .filter(|e| e.enabled && e.off_cooldown(now_ms, cooldown_ms))
            .fold(None::<&FeatureEntry>, |best, e| match best {
                Some(b) if b.descriptor.priority >= e.descriptor.priority => Some(b),
                _ => Some(e),
            })
            .map(|e| e.descriptor.id.as_str())
    }

    /// Picks the feature to restore on recovery: among disabled entries
    /// outside their enable cooldown, the lowest priority value (most
    /// essential). Registration order breaks ties.
    pub fn enable_candidate(&self, now_ms: u64, cooldown_ms: u64) -> Option<&str> {
        self.entries
            .iter()
            .filter(|e| !e.enabled && e.off_cooldown(now_ms, cooldown_ms))
            .fold(None::<&FeatureEntry>, |best, e| match best {
                Some(b) if b.descriptor.priority <= e.descriptor.priority => Some(b),
                _ => Some(e),
            })
            .map(|e| e.descriptor.id.as_str())
    }

    /// Flips a feature's state and stamps the toggle time.
    ///
    /// Returns false if the id is unknown or already in the requested state.
    pub fn set_enabled(&mut self, id: &str, enabled: bool, now_ms: u64) -> bool {
        match self.entries.iter_mut().find(|e| e.descriptor.id == id) {
            Some(entry) if entry.enabled != enabled => {
                entry.enabled = enabled;
                entry.last_toggle_ms = Some(now_ms);
                true
            }
            _ => false,
        }
    }
}
