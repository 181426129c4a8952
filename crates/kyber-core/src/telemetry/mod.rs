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

//! Provides the value types the performance feedback loop is built from.
//!
//! A "sample" is one frame's worth of observations. It is plain data so it
//! can be shipped across the event bus or serialized into diagnostics dumps.

mod report;
mod sample;

pub use self::report::{Health, PerformanceReport};
pub use self::sample::PerformanceSample;
