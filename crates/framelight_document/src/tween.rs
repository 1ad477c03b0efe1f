// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tween (interpolation range) definitions.

use serde::{Deserialize, Serialize};

fn default_easing() -> String {
    "linear".to_string()
}

/// A declared interpolation range between two keyframes on one layer.
///
/// Bounds satisfy `start_frame < end_frame`. Containment is half-open at
/// the start and closed at the end: the start frame is the anchor
/// keyframe itself, not part of the tween.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tween {
    /// Anchor keyframe frame (excluded from containment)
    pub start_frame: u32,
    /// Final frame (included in containment)
    pub end_frame: u32,
    /// Easing label, `"linear"` by default
    #[serde(rename = "type", default = "default_easing")]
    pub easing: String,
}

impl Tween {
    /// Create a tween with an explicit easing label
    pub fn new(start_frame: u32, end_frame: u32, easing: impl Into<String>) -> Self {
        Self {
            start_frame,
            end_frame,
            easing: easing.into(),
        }
    }

    /// Create a linear tween
    pub fn linear(start_frame: u32, end_frame: u32) -> Self {
        Self::new(start_frame, end_frame, "linear")
    }

    /// Half-open containment test: `start_frame < frame <= end_frame`
    pub fn contains(&self, frame: u32) -> bool {
        self.start_frame < frame && frame <= self.end_frame
    }

    /// Whether two tween intervals overlap.
    ///
    /// Adjacent tweens sharing one bound do not overlap: the shared frame
    /// is the end of one range and the excluded anchor of the other.
    pub fn overlaps(&self, other: &Tween) -> bool {
        self.start_frame < other.end_frame && other.start_frame < self.end_frame
    }

    /// Exact bounds match, ignoring easing
    pub fn same_bounds(&self, start_frame: u32, end_frame: u32) -> bool {
        self.start_frame == start_frame && self.end_frame == end_frame
    }
}
