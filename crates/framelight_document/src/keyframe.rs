// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions and frame addressing.

use crate::error::FrameRefParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A marked frame on a layer.
///
/// Frames are 1-based; within one layer keyframes are kept sorted
/// ascending by `frame` and no two share a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    /// 1-based frame position
    pub frame: u32,
    /// Blank keyframe (intentional empty marker) vs. authored content
    pub is_empty: bool,
}

impl Keyframe {
    /// Create a content keyframe
    pub fn content(frame: u32) -> Self {
        Self {
            frame,
            is_empty: false,
        }
    }

    /// Create a blank keyframe
    pub fn blank(frame: u32) -> Self {
        Self {
            frame,
            is_empty: true,
        }
    }

    /// Content vs. blank classification
    pub fn kind(&self) -> KeyframeKind {
        if self.is_empty {
            KeyframeKind::Blank
        } else {
            KeyframeKind::Content
        }
    }
}

/// Whether a keyframe carries authored content or is an empty marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyframeKind {
    /// Authored content
    Content,
    /// Intentional empty marker
    Blank,
}

impl KeyframeKind {
    /// Get the event-facing name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Blank => "blank",
        }
    }
}

/// Build the event-facing id of a keyframe: `kf-<layerId>-<frame>`
pub fn keyframe_id(layer_id: &str, frame: u32) -> String {
    format!("kf-{layer_id}-{frame}")
}

/// External address of a frame cell on a layer.
///
/// Prints and parses as `"<layerId>:<frame>"`. A `FrameRef` is a pure
/// address; nothing guarantees it still names a live keyframe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameRef {
    /// Owning layer id
    pub layer_id: String,
    /// 1-based frame position
    pub frame: u32,
}

impl FrameRef {
    /// Create a frame reference
    pub fn new(layer_id: impl Into<String>, frame: u32) -> Self {
        Self {
            layer_id: layer_id.into(),
            frame,
        }
    }
}

impl fmt::Display for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.layer_id, self.frame)
    }
}

impl FromStr for FrameRef {
    type Err = FrameRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (layer_id, frame) = s
            .rsplit_once(':')
            .ok_or_else(|| FrameRefParseError::new(s))?;
        if layer_id.is_empty() {
            return Err(FrameRefParseError::new(s));
        }
        let frame: u32 = frame.parse().map_err(|_| FrameRefParseError::new(s))?;
        Ok(Self::new(layer_id, frame))
    }
}
