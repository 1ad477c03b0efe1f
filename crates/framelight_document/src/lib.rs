// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline document model for Framelight.
//!
//! This crate holds the persisted data model for a frame-based animation
//! timeline:
//! - Document settings (frame count, frame rate, grid metrics)
//! - The layer forest (layers and folders, sibling order is z-order)
//! - Keyframes and tween ranges per layer
//! - Validation and JSON serialization
//!
//! ## Architecture
//!
//! The document is a plain value type; all editing services in
//! `framelight_engine` share one document behind a single handle and
//! mutate it in place. Serialization round-trips through `serde_json`
//! with `camelCase` wire names.

pub mod document;
pub mod error;
pub mod keyframe;
pub mod layer;
pub mod settings;
pub mod tween;

pub use document::TimelineDocument;
pub use error::{FormatError, FrameRefParseError};
pub use keyframe::{keyframe_id, FrameRef, Keyframe, KeyframeKind};
pub use layer::{Folder, Layer, LayerNode};
pub use settings::TimelineSettings;
pub use tween::Tween;
