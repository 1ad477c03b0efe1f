// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-layer keyframe and frame-range mutation.
//!
//! Frame shifting uses half-open-interval arithmetic over the tween
//! bounds. `delete_frames` replicates a known asymmetry: a tween whose
//! start lies inside the deleted range but whose end lies beyond it is
//! left untouched (see the pinning test), so downstream consumers must
//! not assume tween bounds always reference live keyframes after a
//! range delete.

use crate::clipboard::{ClipboardHandle, ClipboardKeyframe};
use crate::event::{EventBus, KeyframeMove, TimelineEvent};
use crate::DocumentHandle;
use framelight_document::{keyframe_id, FrameRef, Keyframe};
use std::collections::HashSet;
use std::rc::Rc;

/// Service for keyframe insertion, deletion with shifting, cross-layer
/// moves and clipboard copy/paste.
///
/// Every operation either fully applies or fully no-ops; precondition
/// failures return `false` with a diagnostic. Mutating operations emit
/// their specific event followed by [`TimelineEvent::Refresh`].
pub struct KeyframeSequencer {
    doc: DocumentHandle,
    bus: Rc<EventBus>,
    clipboard: ClipboardHandle,
}

impl KeyframeSequencer {
    /// Create the sequencer over a shared document, bus and clipboard
    pub fn new(doc: DocumentHandle, bus: Rc<EventBus>, clipboard: ClipboardHandle) -> Self {
        Self {
            doc,
            bus,
            clipboard,
        }
    }

    /// Insert a content keyframe; rejects duplicates at `frame`
    pub fn insert_keyframe(&self, layer_id: &str, frame: u32) -> bool {
        self.insert(layer_id, frame, false)
    }

    /// Insert a blank keyframe; rejects duplicates at `frame`
    pub fn insert_blank_keyframe(&self, layer_id: &str, frame: u32) -> bool {
        self.insert(layer_id, frame, true)
    }

    fn insert(&self, layer_id: &str, frame: u32, is_empty: bool) -> bool {
        let keyframe = Keyframe { frame, is_empty };
        {
            let mut doc = self.doc.borrow_mut();
            let Some(layer) = doc.find_layer_mut(layer_id) else {
                tracing::warn!("layer not found: {layer_id}");
                return false;
            };
            if layer.has_keyframe(frame) {
                tracing::warn!("keyframe already exists at frame {frame} on {layer_id}");
                return false;
            }
            layer.add_keyframe(keyframe);
        }
        self.bus.emit(&TimelineEvent::KeyframeAdd {
            id: keyframe_id(layer_id, frame),
            layer_id: layer_id.to_string(),
            frame,
            kind: keyframe.kind(),
        });
        self.bus.emit(&TimelineEvent::Refresh);
        true
    }

    /// Insert one frame column at `frame`, extending the sequence.
    ///
    /// Keyframes at or after `frame` shift `+1`. A tween starting at or
    /// after `frame` shifts both bounds; one straddling `frame` grows by
    /// its end bound only.
    pub fn insert_frame(&self, layer_id: &str, frame: u32) -> bool {
        {
            let mut doc = self.doc.borrow_mut();
            let Some(layer) = doc.find_layer_mut(layer_id) else {
                tracing::warn!("layer not found: {layer_id}");
                return false;
            };
            for keyframe in &mut layer.keyframes {
                if keyframe.frame >= frame {
                    keyframe.frame += 1;
                }
            }
            for tween in &mut layer.tweens {
                if tween.start_frame >= frame {
                    tween.start_frame += 1;
                    tween.end_frame += 1;
                } else if tween.end_frame >= frame {
                    tween.end_frame += 1;
                }
            }
        }
        self.bus.emit(&TimelineEvent::FrameInserted {
            layer_id: layer_id.to_string(),
            frame,
        });
        self.bus.emit(&TimelineEvent::Refresh);
        true
    }

    /// Delete the frame range `[frame_start, frame_end]` from a layer,
    /// shifting later content down. Subscribers to
    /// `BeforeKeyframeDelete` may veto.
    pub fn delete_frames(&self, layer_id: &str, frame_start: u32, frame_end: u32) -> bool {
        if frame_start > frame_end {
            tracing::warn!("invalid frame range: {frame_start}..{frame_end}");
            return false;
        }
        let affected: Vec<String> = {
            let doc = self.doc.borrow();
            let Some(layer) = doc.find_layer(layer_id) else {
                tracing::warn!("layer not found: {layer_id}");
                return false;
            };
            layer
                .keyframes
                .iter()
                .filter(|k| k.frame >= frame_start && k.frame <= frame_end)
                .map(|k| keyframe_id(layer_id, k.frame))
                .collect()
        };
        let outcome = self
            .bus
            .emit_cancellable(&TimelineEvent::BeforeKeyframeDelete {
                ids: affected.clone(),
            });
        if outcome.is_cancelled() {
            tracing::debug!("frame delete on {layer_id} vetoed by subscriber");
            return false;
        }

        let count = frame_end - frame_start + 1;
        {
            let mut doc = self.doc.borrow_mut();
            let Some(layer) = doc.find_layer_mut(layer_id) else {
                return false;
            };
            layer
                .keyframes
                .retain(|k| k.frame < frame_start || k.frame > frame_end);
            for keyframe in &mut layer.keyframes {
                if keyframe.frame > frame_end {
                    keyframe.frame -= count;
                }
            }
            layer
                .tweens
                .retain(|t| !(t.start_frame >= frame_start && t.end_frame <= frame_end));
            for tween in &mut layer.tweens {
                if tween.start_frame > frame_end {
                    tween.start_frame -= count;
                    tween.end_frame -= count;
                } else if tween.end_frame > frame_end && tween.start_frame < frame_start {
                    tween.end_frame -= count;
                }
                // A tween starting inside the range but ending beyond it
                // is deliberately not repositioned.
            }
        }
        self.bus
            .emit(&TimelineEvent::KeyframeDelete { ids: affected });
        self.bus.emit(&TimelineEvent::Refresh);
        true
    }

    /// Delete a single keyframe without any frame shifting. Subscribers
    /// to `BeforeKeyframeDelete` may veto.
    pub fn delete_keyframe(&self, layer_id: &str, frame: u32) -> bool {
        {
            let doc = self.doc.borrow();
            let Some(layer) = doc.find_layer(layer_id) else {
                tracing::warn!("layer not found: {layer_id}");
                return false;
            };
            if !layer.has_keyframe(frame) {
                tracing::warn!("no keyframe at frame {frame} on {layer_id}");
                return false;
            }
        }
        let id = keyframe_id(layer_id, frame);
        let outcome = self
            .bus
            .emit_cancellable(&TimelineEvent::BeforeKeyframeDelete {
                ids: vec![id.clone()],
            });
        if outcome.is_cancelled() {
            tracing::debug!("keyframe delete on {layer_id}:{frame} vetoed by subscriber");
            return false;
        }
        {
            let mut doc = self.doc.borrow_mut();
            let Some(layer) = doc.find_layer_mut(layer_id) else {
                return false;
            };
            layer.remove_keyframe(frame);
        }
        self.bus
            .emit(&TimelineEvent::KeyframeDelete { ids: vec![id] });
        self.bus.emit(&TimelineEvent::Refresh);
        true
    }

    /// Relocate the referenced keyframes so the first lands on
    /// `target_frame` in `target_layer_id`, preserving relative offsets.
    ///
    /// Fully rejected (no partial move) when any reference is stale,
    /// any destination falls below frame 1, two moved keyframes land on
    /// the same destination, or a destination collides with a keyframe
    /// not itself part of the move.
    pub fn move_keyframes(
        &self,
        refs: &[FrameRef],
        target_layer_id: &str,
        target_frame: u32,
    ) -> bool {
        let Some(first) = refs.first() else {
            tracing::warn!("no keyframes to move");
            return false;
        };
        let offset = i64::from(target_frame) - i64::from(first.frame);

        let moves = {
            let mut doc = self.doc.borrow_mut();
            if doc.find_layer(target_layer_id).is_none() {
                tracing::warn!("layer not found: {target_layer_id}");
                return false;
            }

            // Resolve every reference and compute destinations.
            let mut planned: Vec<(FrameRef, u32, bool)> = Vec::with_capacity(refs.len());
            for r in refs {
                let Some(keyframe) = doc
                    .find_layer(&r.layer_id)
                    .and_then(|l| l.keyframe_at(r.frame))
                else {
                    tracing::warn!("keyframe not found: {r}");
                    return false;
                };
                let destination = i64::from(r.frame) + offset;
                if destination < 1 {
                    tracing::warn!("move would place {r} before frame 1");
                    return false;
                }
                planned.push((r.clone(), destination as u32, keyframe.is_empty));
            }

            // Two moved keyframes must not land on the same frame.
            let mut destinations = HashSet::new();
            for (r, destination, _) in &planned {
                if !destinations.insert(*destination) {
                    tracing::warn!("move of {r} collides inside the moved set");
                    return false;
                }
            }

            // Destinations must not collide with unmoved target keyframes.
            let moved_sources: HashSet<u32> = refs
                .iter()
                .filter(|r| r.layer_id == target_layer_id)
                .map(|r| r.frame)
                .collect();
            {
                let Some(target) = doc.find_layer(target_layer_id) else {
                    return false;
                };
                for (r, destination, _) in &planned {
                    if target.has_keyframe(*destination) && !moved_sources.contains(destination) {
                        tracing::warn!("move of {r} collides at frame {destination}");
                        return false;
                    }
                }
            }

            // Apply: detach from sources, then insert at destinations.
            let mut moves = Vec::with_capacity(planned.len());
            for (r, destination, _) in &planned {
                let Some(source) = doc.find_layer_mut(&r.layer_id) else {
                    return false;
                };
                source.remove_keyframe(r.frame);
                moves.push(KeyframeMove {
                    id: keyframe_id(&r.layer_id, r.frame),
                    old_frame: r.frame,
                    new_frame: *destination,
                });
            }
            let Some(target) = doc.find_layer_mut(target_layer_id) else {
                return false;
            };
            for (_, destination, is_empty) in &planned {
                target.add_keyframe(Keyframe {
                    frame: *destination,
                    is_empty: *is_empty,
                });
            }
            moves
        };
        self.bus.emit(&TimelineEvent::KeyframeMove { moves });
        self.bus.emit(&TimelineEvent::Refresh);
        true
    }

    /// Snapshot the referenced keyframes into the clipboard.
    /// References that no longer resolve are silently dropped; a copy
    /// resolving nothing is a diagnostic no-op.
    pub fn copy_keyframes(&self, refs: &[FrameRef]) -> bool {
        if refs.is_empty() {
            tracing::warn!("no keyframes to copy");
            return false;
        }
        let entries: Vec<ClipboardKeyframe> = {
            let doc = self.doc.borrow();
            refs.iter()
                .filter_map(|r| {
                    doc.find_layer(&r.layer_id)
                        .and_then(|l| l.keyframe_at(r.frame))
                        .map(|k| ClipboardKeyframe {
                            layer_id: r.layer_id.clone(),
                            frame: r.frame,
                            is_empty: k.is_empty,
                        })
                })
                .collect()
        };
        if entries.is_empty() {
            tracing::warn!("none of the referenced keyframes exist");
            return false;
        }
        let count = entries.len();
        self.clipboard.borrow_mut().store(entries);
        self.bus.emit(&TimelineEvent::KeyframesCopied { count });
        true
    }

    /// Paste the clipboard into a layer, anchoring the earliest copied
    /// frame at `target_frame`. Colliding destinations are skipped with
    /// a diagnostic; a paste inserting nothing is a no-op.
    pub fn paste_keyframes(&self, target_layer_id: &str, target_frame: u32) -> bool {
        let entries = self.clipboard.borrow().entries().to_vec();
        let Some(min_frame) = entries.iter().map(|e| e.frame).min() else {
            tracing::warn!("clipboard is empty");
            return false;
        };
        let offset = i64::from(target_frame) - i64::from(min_frame);

        let pasted = {
            let mut doc = self.doc.borrow_mut();
            let Some(layer) = doc.find_layer_mut(target_layer_id) else {
                tracing::warn!("layer not found: {target_layer_id}");
                return false;
            };
            let mut pasted = 0;
            for entry in &entries {
                let destination = i64::from(entry.frame) + offset;
                if destination < 1 {
                    tracing::warn!("paste of frame {} lands before frame 1", entry.frame);
                    continue;
                }
                let destination = destination as u32;
                if layer.has_keyframe(destination) {
                    tracing::warn!("paste collides at frame {destination} on {target_layer_id}");
                    continue;
                }
                layer.add_keyframe(Keyframe {
                    frame: destination,
                    is_empty: entry.is_empty,
                });
                pasted += 1;
            }
            pasted
        };
        if pasted == 0 {
            tracing::warn!("nothing pasted: all clipboard entries conflict");
            return false;
        }
        self.bus.emit(&TimelineEvent::KeyframesPasted {
            target_layer_id: target_layer_id.to_string(),
            target_frame,
            count: pasted,
        });
        self.bus.emit(&TimelineEvent::Refresh);
        true
    }
}
