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

//! Error types for feature registration and animation slot management.

use std::fmt::Display;

/// An error raised when a feature descriptor is rejected at registration.
///
/// Rejection never crashes the caller's pipeline: the feature is excluded
/// from governance and fails open (always reported enabled) instead of
/// silently misbehaving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureConfigError {
    /// The priority fell outside the `1..=5` ladder.
    InvalidPriority {
        /// The offending feature id.
        id: String,
        /// The rejected priority value.
        priority: u8,
    },
    /// A feature with this id is already registered.
    DuplicateId(String),
}

impl Display for FeatureConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureConfigError::InvalidPriority { id, priority } => {
                write!(f, "Invalid priority {priority} for feature '{id}' (expected 1..=5)")
            }
            FeatureConfigError::DuplicateId(id) => {
                write!(f, "Feature '{id}' is already registered")
            }
        }
    }
}

impl std::error::Error for FeatureConfigError {}

/// An error raised when a managed animation loop cannot be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// Every animation slot for this tier is taken.
    CapacityExhausted {
        /// The tier's slot capacity.
        capacity: usize,
    },
    /// A managed loop with this id is already running.
    DuplicateLoop(String),
}

impl Display for SlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotError::CapacityExhausted { capacity } => {
                write!(f, "All {capacity} animation slots are taken")
            }
            SlotError::DuplicateLoop(id) => {
                write!(f, "A managed loop with id '{id}' is already running")
            }
        }
    }
}

impl std::error::Error for SlotError {}
