// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed keyframe clipboard.
//!
//! A single typed slot rather than a generic string-keyed store, so
//! copy/paste callers cannot collide on key names. Entries are value
//! snapshots; pasting never aliases document state.

use std::cell::RefCell;
use std::rc::Rc;

/// Snapshot of one keyframe captured by a copy operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardKeyframe {
    /// Layer the keyframe was copied from
    pub layer_id: String,
    /// Source frame position
    pub frame: u32,
    /// Blank vs. content
    pub is_empty: bool,
}

/// Process-scoped clipboard holding the latest copied keyframes.
#[derive(Debug, Default)]
pub struct KeyframeClipboard {
    entries: Vec<ClipboardKeyframe>,
}

impl KeyframeClipboard {
    /// Create an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clipboard contents with a new snapshot
    pub fn store(&mut self, entries: Vec<ClipboardKeyframe>) {
        self.entries = entries;
    }

    /// The current snapshot, in copy order
    pub fn entries(&self) -> &[ClipboardKeyframe] {
        &self.entries
    }

    /// Whether the clipboard holds nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of snapshots held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop the current snapshot
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Shared handle to the clipboard
pub type ClipboardHandle = Rc<RefCell<KeyframeClipboard>>;

/// Wrap a fresh clipboard in a shared handle
pub fn clipboard_handle() -> ClipboardHandle {
    Rc::new(RefCell::new(KeyframeClipboard::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_replaces_previous_snapshot() {
        let mut clipboard = KeyframeClipboard::new();
        clipboard.store(vec![ClipboardKeyframe {
            layer_id: "layer-1".into(),
            frame: 1,
            is_empty: false,
        }]);
        assert_eq!(clipboard.len(), 1);

        clipboard.store(vec![
            ClipboardKeyframe {
                layer_id: "layer-2".into(),
                frame: 5,
                is_empty: true,
            },
            ClipboardKeyframe {
                layer_id: "layer-2".into(),
                frame: 9,
                is_empty: false,
            },
        ]);
        assert_eq!(clipboard.len(), 2);
        assert_eq!(clipboard.entries()[0].layer_id, "layer-2");

        clipboard.clear();
        assert!(clipboard.is_empty());
    }
}
