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

//! Provides foundational primitives for event-driven communication.
//!
//! This module contains a generic fan-out [`EventBus`] plus the
//! [`GovernorEvent`] type the governor publishes on it. The bus stays generic
//! so higher-level crates can run their own event types through it without
//! creating circular dependencies.

mod bus;
mod governor;

pub use self::bus::EventBus;
pub use self::governor::{GovernorEvent, ToggleReason};
