// SPDX-License-Identifier: MIT OR Apache-2.0
//! The layer forest: layers, folders, and node accessors.

use crate::keyframe::Keyframe;
use crate::tween::Tween;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A layer carrying keyframes and tween ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Unique id across the whole tree
    pub id: String,
    /// Display name
    pub name: String,
    /// Whether the layer is shown by rendering collaborators
    pub visible: bool,
    /// Whether edits to the layer are blocked by UI collaborators
    pub locked: bool,
    /// Keyframes, sorted ascending by frame, frames unique
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    /// Tween ranges, sorted ascending by start frame
    #[serde(default)]
    pub tweens: Vec<Tween>,
}

impl Layer {
    /// Create an empty, visible, unlocked layer with a generated id
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(format!("layer-{}", Uuid::new_v4()), name)
    }

    /// Create a layer with an explicit id
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            visible: true,
            locked: false,
            keyframes: Vec::new(),
            tweens: Vec::new(),
        }
    }

    /// Get the keyframe at a frame, if any
    pub fn keyframe_at(&self, frame: u32) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.frame == frame)
    }

    /// Whether a keyframe exists at a frame
    pub fn has_keyframe(&self, frame: u32) -> bool {
        self.keyframe_at(frame).is_some()
    }

    /// Insert a keyframe and restore frame order
    pub fn add_keyframe(&mut self, keyframe: Keyframe) {
        self.keyframes.push(keyframe);
        self.sort_keyframes();
    }

    /// Remove the keyframe at a frame; `false` when absent
    pub fn remove_keyframe(&mut self, frame: u32) -> bool {
        let before = self.keyframes.len();
        self.keyframes.retain(|k| k.frame != frame);
        self.keyframes.len() != before
    }

    /// Sort keyframes ascending by frame
    pub fn sort_keyframes(&mut self) {
        self.keyframes.sort_by_key(|k| k.frame);
    }

    /// Insert a tween and restore start-frame order
    pub fn add_tween(&mut self, tween: Tween) {
        self.tweens.push(tween);
        self.sort_tweens();
    }

    /// Sort tweens ascending by start frame
    pub fn sort_tweens(&mut self) {
        self.tweens.sort_by_key(|t| t.start_frame);
    }

    /// Get the tween containing a frame (half-open at the start)
    pub fn tween_at(&self, frame: u32) -> Option<&Tween> {
        self.tweens.iter().find(|t| t.contains(frame))
    }
}

/// A folder grouping child nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Unique id across the whole tree
    pub id: String,
    /// Display name
    pub name: String,
    /// Whether the folder's subtree is shown
    pub visible: bool,
    /// Whether the folder's subtree is locked
    pub locked: bool,
    /// Child nodes, order is z-order
    #[serde(default)]
    pub children: Vec<LayerNode>,
}

impl Folder {
    /// Create an empty, visible, unlocked folder with a generated id
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(format!("folder-{}", Uuid::new_v4()), name)
    }

    /// Create a folder with an explicit id
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            visible: true,
            locked: false,
            children: Vec::new(),
        }
    }
}

/// One node of the layer forest.
///
/// Serialized with a `type` tag of `"layer"` or `"folder"`, matching the
/// document wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerNode {
    /// A leaf layer with keyframes and tweens
    Layer(Layer),
    /// A folder with child nodes
    Folder(Folder),
}

impl LayerNode {
    /// Node id
    pub fn id(&self) -> &str {
        match self {
            Self::Layer(l) => &l.id,
            Self::Folder(f) => &f.id,
        }
    }

    /// Node display name
    pub fn name(&self) -> &str {
        match self {
            Self::Layer(l) => &l.name,
            Self::Folder(f) => &f.name,
        }
    }

    /// Replace the display name
    pub fn set_name(&mut self, name: impl Into<String>) {
        match self {
            Self::Layer(l) => l.name = name.into(),
            Self::Folder(f) => f.name = name.into(),
        }
    }

    /// Visibility flag
    pub fn visible(&self) -> bool {
        match self {
            Self::Layer(l) => l.visible,
            Self::Folder(f) => f.visible,
        }
    }

    /// Set the visibility flag
    pub fn set_visible(&mut self, visible: bool) {
        match self {
            Self::Layer(l) => l.visible = visible,
            Self::Folder(f) => f.visible = visible,
        }
    }

    /// Lock flag
    pub fn locked(&self) -> bool {
        match self {
            Self::Layer(l) => l.locked,
            Self::Folder(f) => f.locked,
        }
    }

    /// Set the lock flag
    pub fn set_locked(&mut self, locked: bool) {
        match self {
            Self::Layer(l) => l.locked = locked,
            Self::Folder(f) => f.locked = locked,
        }
    }

    /// The tag name, `"layer"` or `"folder"`
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Layer(_) => "layer",
            Self::Folder(_) => "folder",
        }
    }

    /// View as a layer, if this node is one
    pub fn as_layer(&self) -> Option<&Layer> {
        match self {
            Self::Layer(l) => Some(l),
            Self::Folder(_) => None,
        }
    }

    /// Mutable view as a layer, if this node is one
    pub fn as_layer_mut(&mut self) -> Option<&mut Layer> {
        match self {
            Self::Layer(l) => Some(l),
            Self::Folder(_) => None,
        }
    }

    /// Child list, if this node is a folder
    pub fn children(&self) -> Option<&[LayerNode]> {
        match self {
            Self::Layer(_) => None,
            Self::Folder(f) => Some(&f.children),
        }
    }

    /// Mutable child list, if this node is a folder
    pub fn children_mut(&mut self) -> Option<&mut Vec<LayerNode>> {
        match self {
            Self::Layer(_) => None,
            Self::Folder(f) => Some(&mut f.children),
        }
    }

    /// Whether this node or any descendant carries the id
    pub fn subtree_contains(&self, id: &str) -> bool {
        if self.id() == id {
            return true;
        }
        self.children()
            .is_some_and(|children| children.iter().any(|c| c.subtree_contains(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_prefixed_and_unique() {
        let a = Layer::new("A");
        let b = Layer::new("B");
        assert!(a.id.starts_with("layer-"));
        assert_ne!(a.id, b.id);
        assert!(Folder::new("G").id.starts_with("folder-"));
    }

    #[test]
    fn test_add_keyframe_keeps_sorted_order() {
        let mut layer = Layer::with_id("layer-1", "L");
        layer.add_keyframe(Keyframe::content(20));
        layer.add_keyframe(Keyframe::content(1));
        layer.add_keyframe(Keyframe::blank(10));
        let frames: Vec<u32> = layer.keyframes.iter().map(|k| k.frame).collect();
        assert_eq!(frames, vec![1, 10, 20]);
    }

    #[test]
    fn test_node_tag_serialization() {
        let node = LayerNode::Layer(Layer::with_id("layer-1", "L"));
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"type\":\"layer\""));

        let folder = LayerNode::Folder(Folder::with_id("folder-1", "G"));
        let json = serde_json::to_string(&folder).unwrap();
        assert!(json.contains("\"type\":\"folder\""));
        assert!(json.contains("\"children\""));
    }

    #[test]
    fn test_subtree_contains() {
        let mut folder = Folder::with_id("folder-1", "G");
        folder
            .children
            .push(LayerNode::Layer(Layer::with_id("layer-1", "L")));
        let node = LayerNode::Folder(folder);
        assert!(node.subtree_contains("folder-1"));
        assert!(node.subtree_contains("layer-1"));
        assert!(!node.subtree_contains("layer-2"));
    }
}
