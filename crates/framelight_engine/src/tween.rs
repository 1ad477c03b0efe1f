// SPDX-License-Identifier: MIT OR Apache-2.0
//! Motion tween creation and querying.
//!
//! Tween ownership follows half-open containment: the start frame
//! belongs to the keyframe anchoring the tween, every frame after it up
//! to and including the end frame belongs to the tween. Two tweens may
//! therefore share a boundary keyframe (one ends where the next starts)
//! without overlapping.

use crate::event::{EventBus, TimelineEvent};
use crate::DocumentHandle;
use framelight_document::Tween;
use std::rc::Rc;

/// Service for creating, removing and querying motion tweens.
pub struct TweenEngine {
    doc: DocumentHandle,
    bus: Rc<EventBus>,
}

impl TweenEngine {
    /// Create the engine over a shared document and bus
    pub fn new(doc: DocumentHandle, bus: Rc<EventBus>) -> Self {
        Self { doc, bus }
    }

    /// Create a motion tween between two existing keyframes.
    ///
    /// Both bounds must be keyframes, the start must precede the end,
    /// and the span must not overlap an existing tween (sharing a
    /// boundary keyframe is allowed).
    pub fn create_motion_tween(
        &self,
        layer_id: &str,
        start_frame: u32,
        end_frame: u32,
        easing: &str,
    ) -> bool {
        let tween = Tween::new(start_frame, end_frame, easing);
        {
            let mut doc = self.doc.borrow_mut();
            let Some(layer) = doc.find_layer_mut(layer_id) else {
                tracing::warn!("layer not found: {layer_id}");
                return false;
            };
            if !layer.has_keyframe(start_frame) || !layer.has_keyframe(end_frame) {
                tracing::warn!("Both start and end must be keyframes");
                return false;
            }
            if start_frame >= end_frame {
                tracing::warn!("Start frame must be before end frame");
                return false;
            }
            if layer.tweens.iter().any(|t| t.overlaps(&tween)) {
                tracing::warn!("Tween overlaps with existing tween");
                return false;
            }
            layer.add_tween(tween);
        }
        self.bus.emit(&TimelineEvent::TweenAdd {
            layer_id: layer_id.to_string(),
            start_frame,
            end_frame,
            kind: "motion".to_string(),
        });
        self.bus.emit(&TimelineEvent::Refresh);
        true
    }

    /// Remove the tween with exactly these bounds
    pub fn remove_tween(&self, layer_id: &str, start_frame: u32, end_frame: u32) -> bool {
        {
            let mut doc = self.doc.borrow_mut();
            let Some(layer) = doc.find_layer_mut(layer_id) else {
                tracing::warn!("layer not found: {layer_id}");
                return false;
            };
            let before = layer.tweens.len();
            layer
                .tweens
                .retain(|t| !t.same_bounds(start_frame, end_frame));
            if layer.tweens.len() == before {
                tracing::warn!("no tween spanning {start_frame}..{end_frame} on {layer_id}");
                return false;
            }
        }
        self.bus.emit(&TimelineEvent::TweenRemove {
            layer_id: layer_id.to_string(),
            start_frame,
            end_frame,
        });
        self.bus.emit(&TimelineEvent::Refresh);
        true
    }

    /// Replace the tween matching `old` with `new`. The replacement's
    /// bound order and overlap against every other tween are validated
    /// the same way creation validates them.
    pub fn update_tween(&self, layer_id: &str, old: &Tween, new: Tween) -> bool {
        {
            let mut doc = self.doc.borrow_mut();
            let Some(layer) = doc.find_layer_mut(layer_id) else {
                tracing::warn!("layer not found: {layer_id}");
                return false;
            };
            let Some(index) = layer.tweens.iter().position(|t| t == old) else {
                tracing::warn!(
                    "no tween matching {}..{} on {layer_id}",
                    old.start_frame,
                    old.end_frame
                );
                return false;
            };
            if new.start_frame >= new.end_frame {
                tracing::warn!("Start frame must be before end frame");
                return false;
            }
            if layer
                .tweens
                .iter()
                .enumerate()
                .any(|(i, t)| i != index && t.overlaps(&new))
            {
                tracing::warn!("Tween overlaps with existing tween");
                return false;
            }
            layer.tweens[index] = new.clone();
            layer.sort_tweens();
        }
        self.bus.emit(&TimelineEvent::TweenUpdate {
            layer_id: layer_id.to_string(),
            old: old.clone(),
            new,
        });
        self.bus.emit(&TimelineEvent::Refresh);
        true
    }

    /// The tween owning `frame` on a layer, if any
    pub fn tween_at_frame(&self, layer_id: &str, frame: u32) -> Option<Tween> {
        self.doc
            .borrow()
            .find_layer(layer_id)
            .and_then(|l| l.tween_at(frame))
            .cloned()
    }

    /// Whether `frame` falls inside a tween on this layer
    pub fn is_frame_in_tween(&self, layer_id: &str, frame: u32) -> bool {
        self.tween_at_frame(layer_id, frame).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_handle;
    use framelight_document::{Keyframe, Layer, LayerNode, TimelineDocument};
    use std::cell::RefCell;

    fn engine_with_keyframes(frames: &[u32]) -> (TweenEngine, DocumentHandle, Rc<EventBus>) {
        let mut layer = Layer::with_id("layer-1", "Layer 1");
        for &frame in frames {
            layer.add_keyframe(Keyframe::content(frame));
        }
        let mut doc = TimelineDocument::empty();
        doc.layers = vec![LayerNode::Layer(layer)];
        let doc = document_handle(doc);
        let bus = Rc::new(EventBus::new());
        (
            TweenEngine::new(Rc::clone(&doc), Rc::clone(&bus)),
            doc,
            bus,
        )
    }

    fn tweens(doc: &DocumentHandle) -> Vec<(u32, u32)> {
        doc.borrow()
            .find_layer("layer-1")
            .map(|l| l.tweens.iter().map(|t| (t.start_frame, t.end_frame)).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_create_requires_keyframes_at_both_bounds() {
        let (engine, doc, _bus) = engine_with_keyframes(&[1, 10]);

        assert!(!engine.create_motion_tween("layer-1", 1, 5, "linear"));
        assert!(!engine.create_motion_tween("layer-1", 5, 10, "linear"));
        assert!(!engine.create_motion_tween("missing", 1, 10, "linear"));
        assert!(tweens(&doc).is_empty());

        assert!(engine.create_motion_tween("layer-1", 1, 10, "ease-in"));
        assert_eq!(tweens(&doc), vec![(1, 10)]);
        assert_eq!(
            doc.borrow().find_layer("layer-1").unwrap().tweens[0].easing,
            "ease-in"
        );
    }

    #[test]
    fn test_create_requires_start_before_end() {
        let (engine, doc, _bus) = engine_with_keyframes(&[1, 10]);

        assert!(!engine.create_motion_tween("layer-1", 10, 1, "linear"));
        assert!(!engine.create_motion_tween("layer-1", 10, 10, "linear"));
        assert!(tweens(&doc).is_empty());
    }

    #[test]
    fn test_create_rejects_overlap_but_allows_adjacency() {
        let (engine, doc, _bus) = engine_with_keyframes(&[1, 5, 10, 20]);
        assert!(engine.create_motion_tween("layer-1", 5, 10, "linear"));

        assert!(!engine.create_motion_tween("layer-1", 1, 10, "linear"));
        assert!(!engine.create_motion_tween("layer-1", 1, 20, "linear"));
        // Sharing a boundary keyframe is not an overlap.
        assert!(engine.create_motion_tween("layer-1", 1, 5, "linear"));
        assert!(engine.create_motion_tween("layer-1", 10, 20, "linear"));
        assert_eq!(tweens(&doc), vec![(1, 5), (5, 10), (10, 20)]);
    }

    #[test]
    fn test_create_emits_tween_add() {
        let (engine, _doc, bus) = engine_with_keyframes(&[1, 10]);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        bus.subscribe(move |event, _| sink.borrow_mut().push(event.clone()));

        assert!(engine.create_motion_tween("layer-1", 1, 10, "linear"));
        let events = events.borrow();
        assert!(matches!(
            &events[0],
            TimelineEvent::TweenAdd { layer_id, start_frame: 1, end_frame: 10, kind }
                if layer_id == "layer-1" && kind == "motion"
        ));
        assert!(matches!(events[1], TimelineEvent::Refresh));
    }

    #[test]
    fn test_remove_matches_exact_bounds() {
        let (engine, doc, _bus) = engine_with_keyframes(&[1, 5, 10]);
        assert!(engine.create_motion_tween("layer-1", 1, 5, "linear"));
        assert!(engine.create_motion_tween("layer-1", 5, 10, "linear"));

        assert!(!engine.remove_tween("layer-1", 1, 10));
        assert!(engine.remove_tween("layer-1", 1, 5));
        assert_eq!(tweens(&doc), vec![(5, 10)]);
    }

    #[test]
    fn test_update_replaces_and_revalidates() {
        let (engine, doc, _bus) = engine_with_keyframes(&[1, 5, 10, 20]);
        assert!(engine.create_motion_tween("layer-1", 1, 5, "linear"));
        assert!(engine.create_motion_tween("layer-1", 10, 20, "linear"));

        let old = Tween::linear(1, 5);
        // Growing into (1,12) overlaps (10,20); growing into (1,10) is
        // adjacency and must pass.
        assert!(!engine.update_tween("layer-1", &old, Tween::linear(1, 12)));
        assert!(!engine.update_tween("layer-1", &old, Tween::linear(5, 5)));
        assert!(engine.update_tween("layer-1", &old, Tween::new(1, 10, "ease-out")));
        assert_eq!(tweens(&doc), vec![(1, 10), (10, 20)]);

        assert!(!engine.update_tween("layer-1", &old, Tween::linear(1, 5)));
    }

    #[test]
    fn test_tween_at_frame_uses_half_open_containment() {
        let (engine, _doc, _bus) = engine_with_keyframes(&[1, 10]);
        assert!(engine.create_motion_tween("layer-1", 1, 10, "linear"));

        assert!(engine.tween_at_frame("layer-1", 1).is_none());
        for frame in 2..=10 {
            assert!(engine.is_frame_in_tween("layer-1", frame), "frame {frame}");
        }
        assert!(!engine.is_frame_in_tween("layer-1", 11));
        assert!(!engine.is_frame_in_tween("missing", 5));
    }
}
