// SPDX-License-Identifier: MIT OR Apache-2.0
//! Document-level timeline settings.

use serde::{Deserialize, Serialize};

/// Settings shared by every view of a timeline document.
///
/// `frame_width` and `row_height` are grid metrics consumed by external
/// rendering collaborators; the engine itself only reads `total_frames`
/// and `frame_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSettings {
    /// Length of the frame axis, 1-based inclusive
    pub total_frames: u32,
    /// Playback rate in frames per second
    pub frame_rate: f32,
    /// Width of one frame cell in the grid view
    pub frame_width: f32,
    /// Height of one layer row in the grid view
    pub row_height: f32,
    /// Whether clicking a frame cell should also move the playhead
    pub move_playhead_on_frame_click: bool,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            total_frames: 100,
            frame_rate: 24.0,
            frame_width: 12.0,
            row_height: 28.0,
            move_playhead_on_frame_click: true,
        }
    }
}
