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

//! Aggregated performance reports for host diagnostics.

use serde::{Deserialize, Serialize};

/// Coarse health verdict for host UI and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    /// Performance is inside the tier envelope with every feature running.
    Good,
    /// Features have been shed, the fps watermark is missed, or the
    /// emergency override is active.
    Degraded,
}

/// Point-in-time summary of the governor's view of the system.
///
/// Assembled on demand; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Trailing average frames per second.
    pub fps: f32,
    /// Most recent render duration, in milliseconds.
    pub render_time_ms: f32,
    /// Most recent memory reading (measured or estimated), in megabytes.
    pub memory_mb: f32,
    /// Ids of currently enabled features.
    pub enabled_features: Vec<String>,
    /// Ids of currently disabled features.
    pub disabled_features: Vec<String>,
    /// Coarse health verdict.
    pub health: Health,
    /// Number of samples currently in the rolling window.
    pub sample_count: usize,
    /// True while the emergency override is active.
    pub emergency: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Health::Good).expect("serialize"), "\"good\"");
        assert_eq!(
            serde_json::to_string(&Health::Degraded).expect("serialize"),
            "\"degraded\""
        );
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = PerformanceReport {
            fps: 58.0,
            render_time_ms: 9.0,
            memory_mb: 420.0,
            enabled_features: vec!["base".to_string()],
            disabled_features: vec!["trails".to_string()],
            health: Health::Degraded,
            sample_count: 42,
            emergency: false,
        };
        let json = serde_json::to_string(&report).expect("serialize");
        let back: PerformanceReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, report);
    }
}
