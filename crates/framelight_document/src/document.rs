// SPDX-License-Identifier: MIT OR Apache-2.0
//! The timeline document: settings plus the layer forest.
//!
//! The document is the single source of truth for the edit engine. It
//! owns validation of incoming JSON and the recursive forest lookups
//! every mutation service is built on.

use crate::error::FormatError;
use crate::keyframe::{keyframe_id, Keyframe};
use crate::layer::{Layer, LayerNode};
use crate::settings::TimelineSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document format version written by this crate
pub const DOCUMENT_VERSION: &str = "1.0";

/// A complete timeline document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDocument {
    /// Format version string
    pub version: String,
    /// Timeline settings
    pub settings: TimelineSettings,
    /// Root layer forest, sibling order is z-order
    pub layers: Vec<LayerNode>,
}

impl TimelineDocument {
    /// Create the document a fresh editor session opens with: default
    /// settings and one layer holding a blank keyframe at frame 1.
    pub fn new() -> Self {
        let mut layer = Layer::new("Layer 1");
        layer.add_keyframe(Keyframe::blank(1));
        Self {
            version: DOCUMENT_VERSION.to_string(),
            settings: TimelineSettings::default(),
            layers: vec![LayerNode::Layer(layer)],
        }
    }

    /// Create an empty document with no layers
    pub fn empty() -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            settings: TimelineSettings::default(),
            layers: Vec::new(),
        }
    }

    /// Replace the whole document state. The caller is trusted; no
    /// validation is performed.
    pub fn load(&mut self, doc: TimelineDocument) {
        *self = doc;
    }

    /// Serialize to the authoritative JSON shape
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate a document from JSON text.
    ///
    /// Validation checks, in order: parseability, `version`, `settings`,
    /// `layers`, positive `totalFrames` and `frameRate`, and a string id
    /// on every layer node (recursing into folder children).
    pub fn from_json(text: &str) -> Result<Self, FormatError> {
        let value: Value = serde_json::from_str(text).map_err(|_| FormatError::InvalidJson)?;
        validate_document(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Parse JSON text and replace this document on success. On any
    /// failure the current state is left unchanged.
    pub fn load_json(&mut self, text: &str) -> Result<(), FormatError> {
        let doc = Self::from_json(text)?;
        self.load(doc);
        Ok(())
    }

    /// Set the frame-axis length; rejects zero
    pub fn set_total_frames(&mut self, total_frames: u32) -> bool {
        if total_frames == 0 {
            tracing::warn!("totalFrames must be a positive number");
            return false;
        }
        self.settings.total_frames = total_frames;
        true
    }

    /// Set the playback rate; rejects non-positive rates
    pub fn set_frame_rate(&mut self, frame_rate: f32) -> bool {
        if frame_rate <= 0.0 {
            tracing::warn!("frameRate must be a positive number");
            return false;
        }
        self.settings.frame_rate = frame_rate;
        true
    }

    /// Depth-first search for a node by id
    pub fn find_node(&self, id: &str) -> Option<&LayerNode> {
        find_in(&self.layers, id)
    }

    /// Depth-first search for a node by id, mutable
    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut LayerNode> {
        find_in_mut(&mut self.layers, id)
    }

    /// Find a layer (not a folder) by id
    pub fn find_layer(&self, id: &str) -> Option<&Layer> {
        self.find_node(id).and_then(LayerNode::as_layer)
    }

    /// Find a layer (not a folder) by id, mutable
    pub fn find_layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.find_node_mut(id).and_then(LayerNode::as_layer_mut)
    }

    /// Whether any node in the forest carries the id
    pub fn contains_id(&self, id: &str) -> bool {
        self.find_node(id).is_some()
    }

    /// The sibling list holding the node with this id (the root list or
    /// some folder's children), mutable
    pub fn sibling_list_mut(&mut self, id: &str) -> Option<&mut Vec<LayerNode>> {
        owner_of(&mut self.layers, id)
    }

    /// Detach a node from wherever it sits in the forest
    pub fn remove_node(&mut self, id: &str) -> Option<LayerNode> {
        let siblings = self.sibling_list_mut(id)?;
        let index = siblings.iter().position(|n| n.id() == id)?;
        Some(siblings.remove(index))
    }

    /// Event-facing ids of every keyframe in the forest at a frame
    pub fn keyframe_ids_at(&self, frame: u32) -> Vec<String> {
        let mut ids = Vec::new();
        collect_keyframe_ids(&self.layers, frame, &mut ids);
        ids
    }
}

impl Default for TimelineDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_document(value: &Value) -> Result<(), FormatError> {
    if value.get("version").is_none() {
        return Err(FormatError::MissingField("version"));
    }
    let Some(settings) = value.get("settings") else {
        return Err(FormatError::MissingField("settings"));
    };
    let Some(layers) = value.get("layers") else {
        return Err(FormatError::MissingField("layers"));
    };
    if let Some(total) = settings.get("totalFrames").and_then(Value::as_f64) {
        if total <= 0.0 {
            return Err(FormatError::NonPositive("totalFrames"));
        }
    }
    if let Some(rate) = settings.get("frameRate").and_then(Value::as_f64) {
        if rate <= 0.0 {
            return Err(FormatError::NonPositive("frameRate"));
        }
    }
    if let Some(nodes) = layers.as_array() {
        validate_nodes(nodes)?;
    }
    Ok(())
}

fn validate_nodes(nodes: &[Value]) -> Result<(), FormatError> {
    for node in nodes {
        if !node.get("id").is_some_and(Value::is_string) {
            return Err(FormatError::InvalidLayerId);
        }
        if let Some(children) = node.get("children").and_then(Value::as_array) {
            validate_nodes(children)?;
        }
    }
    Ok(())
}

fn find_in<'a>(nodes: &'a [LayerNode], id: &str) -> Option<&'a LayerNode> {
    for node in nodes {
        if node.id() == id {
            return Some(node);
        }
        if let Some(children) = node.children() {
            if let Some(found) = find_in(children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn find_in_mut<'a>(nodes: &'a mut [LayerNode], id: &str) -> Option<&'a mut LayerNode> {
    for node in nodes.iter_mut() {
        if node.id() == id {
            return Some(node);
        }
        if let Some(children) = node.children_mut() {
            if let Some(found) = find_in_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn owner_of<'a>(nodes: &'a mut Vec<LayerNode>, id: &str) -> Option<&'a mut Vec<LayerNode>> {
    if nodes.iter().any(|n| n.id() == id) {
        return Some(nodes);
    }
    for node in nodes.iter_mut() {
        if let Some(children) = node.children_mut() {
            if let Some(found) = owner_of(children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn collect_keyframe_ids(nodes: &[LayerNode], frame: u32, ids: &mut Vec<String>) {
    for node in nodes {
        match node {
            LayerNode::Layer(layer) => {
                if layer.has_keyframe(frame) {
                    ids.push(keyframe_id(&layer.id, frame));
                }
            }
            LayerNode::Folder(folder) => collect_keyframe_ids(&folder.children, frame, ids),
        }
    }
}
