// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structural mutation of the layer forest.

use crate::event::{EventBus, ObjectKind, TimelineEvent};
use crate::DocumentHandle;
use framelight_document::{Folder, Layer, LayerNode};
use std::rc::Rc;

/// Service for adding, deleting, renaming, reordering and reparenting
/// layers and folders.
///
/// Expected "not found" cases return `false`/`None` with a diagnostic;
/// nothing here panics or errors. Deletion runs the cancellable
/// `BeforeObjectDelete` protocol before mutating.
pub struct LayerTreeService {
    doc: DocumentHandle,
    bus: Rc<EventBus>,
}

impl LayerTreeService {
    /// Create the service over a shared document and bus
    pub fn new(doc: DocumentHandle, bus: Rc<EventBus>) -> Self {
        Self { doc, bus }
    }

    /// Append a new layer at the root or inside the named folder.
    /// Returns a clone of the created node.
    pub fn add_layer(&self, name: &str, parent_folder_id: Option<&str>) -> Option<LayerNode> {
        self.insert_node(
            LayerNode::Layer(Layer::new(name)),
            parent_folder_id,
            ObjectKind::Layer,
        )
    }

    /// Append a new folder at the root or inside the named folder.
    /// Returns a clone of the created node.
    pub fn add_folder(&self, name: &str, parent_folder_id: Option<&str>) -> Option<LayerNode> {
        self.insert_node(
            LayerNode::Folder(Folder::new(name)),
            parent_folder_id,
            ObjectKind::Folder,
        )
    }

    fn insert_node(
        &self,
        node: LayerNode,
        parent_folder_id: Option<&str>,
        kind: ObjectKind,
    ) -> Option<LayerNode> {
        let id = node.id().to_string();
        {
            let mut doc = self.doc.borrow_mut();
            match parent_folder_id {
                None => doc.layers.push(node.clone()),
                Some(parent_id) => {
                    let Some(children) = doc
                        .find_node_mut(parent_id)
                        .and_then(LayerNode::children_mut)
                    else {
                        tracing::warn!("parent folder not found: {parent_id}");
                        return None;
                    };
                    children.push(node.clone());
                }
            }
        }
        self.bus.emit(&TimelineEvent::ObjectAdd {
            id,
            kind,
            parent_id: parent_folder_id.map(str::to_string),
        });
        Some(node)
    }

    /// Delete a node (layers and folders alike, searched recursively).
    /// Subscribers to `BeforeObjectDelete` may veto.
    pub fn delete_object(&self, id: &str) -> bool {
        if !self.doc.borrow().contains_id(id) {
            tracing::warn!("object not found: {id}");
            return false;
        }
        let outcome = self.bus.emit_cancellable(&TimelineEvent::BeforeObjectDelete {
            ids: vec![id.to_string()],
        });
        if outcome.is_cancelled() {
            tracing::debug!("delete of {id} vetoed by subscriber");
            return false;
        }
        if self.doc.borrow_mut().remove_node(id).is_none() {
            return false;
        }
        self.bus.emit(&TimelineEvent::ObjectDelete {
            ids: vec![id.to_string()],
        });
        true
    }

    /// Rename a node
    pub fn rename_object(&self, id: &str, new_name: &str) -> bool {
        let old_name = {
            let mut doc = self.doc.borrow_mut();
            let Some(node) = doc.find_node_mut(id) else {
                tracing::warn!("object not found: {id}");
                return false;
            };
            let old_name = node.name().to_string();
            node.set_name(new_name);
            old_name
        };
        self.bus.emit(&TimelineEvent::ObjectRename {
            id: id.to_string(),
            old_name,
            new_name: new_name.to_string(),
        });
        true
    }

    /// Move a node within its current parent's sibling list. The index
    /// is clamped into the sibling range.
    pub fn reorder_object(&self, id: &str, new_index: usize) -> bool {
        let (old_index, new_index) = {
            let mut doc = self.doc.borrow_mut();
            let Some(siblings) = doc.sibling_list_mut(id) else {
                tracing::warn!("object not found: {id}");
                return false;
            };
            let Some(old_index) = siblings.iter().position(|n| n.id() == id) else {
                return false;
            };
            let new_index = new_index.min(siblings.len() - 1);
            let node = siblings.remove(old_index);
            siblings.insert(new_index, node);
            (old_index, new_index)
        };
        self.bus.emit(&TimelineEvent::ObjectReorder {
            id: id.to_string(),
            old_index,
            new_index,
        });
        true
    }

    /// Detach a node and insert it into another folder's children (or
    /// the root) at `insert_index`, or at the end when absent.
    ///
    /// Reparenting a folder into its own subtree is refused: detaching
    /// first would make the target unreachable and drop the node.
    pub fn reparent_object(
        &self,
        id: &str,
        new_parent_id: Option<&str>,
        insert_index: Option<usize>,
    ) -> bool {
        {
            let mut doc = self.doc.borrow_mut();
            let Some(node) = doc.find_node(id) else {
                tracing::warn!("object not found: {id}");
                return false;
            };
            if let Some(parent_id) = new_parent_id {
                if node.subtree_contains(parent_id) {
                    tracing::warn!("cannot reparent {id} into its own subtree");
                    return false;
                }
                let target_is_folder = doc
                    .find_node(parent_id)
                    .is_some_and(|n| n.children().is_some());
                if !target_is_folder {
                    tracing::warn!("target folder not found: {parent_id}");
                    return false;
                }
            }
            let Some(node) = doc.remove_node(id) else {
                return false;
            };
            match new_parent_id {
                None => {
                    let index = insert_index.unwrap_or(doc.layers.len()).min(doc.layers.len());
                    doc.layers.insert(index, node);
                }
                Some(parent_id) => {
                    let Some(children) = doc
                        .find_node_mut(parent_id)
                        .and_then(LayerNode::children_mut)
                    else {
                        // Validated above; restore at the root rather than lose the node.
                        doc.layers.push(node);
                        return false;
                    };
                    let index = insert_index.unwrap_or(children.len()).min(children.len());
                    children.insert(index, node);
                }
            }
        }
        self.bus.emit(&TimelineEvent::ObjectReparent {
            id: id.to_string(),
            new_parent_id: new_parent_id.map(str::to_string),
        });
        true
    }

    /// Flip a node's visibility flag
    pub fn toggle_visibility(&self, id: &str) -> bool {
        let is_visible = {
            let mut doc = self.doc.borrow_mut();
            let Some(node) = doc.find_node_mut(id) else {
                tracing::warn!("object not found: {id}");
                return false;
            };
            node.set_visible(!node.visible());
            node.visible()
        };
        self.bus.emit(&TimelineEvent::ObjectVisibilityChange {
            id: id.to_string(),
            is_visible,
        });
        true
    }

    /// Flip a node's lock flag
    pub fn toggle_lock(&self, id: &str) -> bool {
        let is_locked = {
            let mut doc = self.doc.borrow_mut();
            let Some(node) = doc.find_node_mut(id) else {
                tracing::warn!("object not found: {id}");
                return false;
            };
            node.set_locked(!node.locked());
            node.locked()
        };
        self.bus.emit(&TimelineEvent::ObjectLockChange {
            id: id.to_string(),
            is_locked,
        });
        true
    }
}
