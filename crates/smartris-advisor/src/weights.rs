//! Weights of the heuristic score.

use serde::{Deserialize, Serialize};

use crate::board_metrics::BoardMetrics;

/// Multipliers for each board metric.
///
/// Lines are rewarded, holes and heights are penalized; all three weights
/// are given as magnitudes. Weight files are JSON objects with the same field
/// names:
///
/// ```
/// use smartris_advisor::HeuristicWeights;
///
/// let weights: HeuristicWeights =
///     serde_json::from_str(r#"{"lines": 30.0, "holes": 8.0, "heights": 0.3}"#).unwrap();
/// assert_eq!(weights, HeuristicWeights::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeuristicWeights {
    pub lines: f32,
    pub holes: f32,
    pub heights: f32,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            lines: 30.0,
            holes: 8.0,
            heights: 0.3,
        }
    }
}

impl HeuristicWeights {
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn score(&self, metrics: &BoardMetrics) -> f32 {
        metrics.lines as f32 * self.lines
            - metrics.holes as f32 * self.holes
            - metrics.heights as f32 * self.heights
    }
}
