// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame selection tracking.
//!
//! The model owns the authoritative set of selected frame cells in
//! insertion order and emits the full set on every change, so listeners
//! never need to reconstruct it from deltas. Selection is not reconciled
//! against later document mutations; stale entries are the consumer's
//! concern.

use crate::event::{EventBus, TimelineEvent};
use framelight_document::FrameRef;
use indexmap::IndexSet;
use std::rc::Rc;

/// Ordered set of selected frame cells with a range-selection anchor.
pub struct SelectionModel {
    selected: IndexSet<FrameRef>,
    last_selected: Option<FrameRef>,
    bus: Rc<EventBus>,
}

impl SelectionModel {
    /// Create an empty selection bound to a bus
    pub fn new(bus: Rc<EventBus>) -> Self {
        Self {
            selected: IndexSet::new(),
            last_selected: None,
            bus,
        }
    }

    /// Replace the selection with a single frame cell.
    ///
    /// Emits two `SelectionChange` events: one for the implicit clear,
    /// one for the new singleton set.
    pub fn select_frame(&mut self, frame: FrameRef) {
        self.clear_selection();
        self.selected.insert(frame.clone());
        self.last_selected = Some(frame);
        self.emit_selection();
    }

    /// Remove one frame cell from the selection; no-op when absent
    pub fn deselect_frame(&mut self, frame: &FrameRef) {
        if !self.selected.shift_remove(frame) {
            return;
        }
        if self.last_selected.as_ref() == Some(frame) {
            self.last_selected = None;
        }
        self.emit_selection();
    }

    /// Add the cell if absent, remove it if present
    pub fn toggle_selection(&mut self, frame: FrameRef) {
        if self.selected.contains(&frame) {
            self.deselect_frame(&frame);
        } else {
            self.selected.insert(frame.clone());
            self.last_selected = Some(frame);
            self.emit_selection();
        }
    }

    /// Select every frame in the inclusive span between two cells on the
    /// same layer, in either order. Cross-layer ranges are rejected.
    pub fn select_range(&mut self, a: &FrameRef, b: &FrameRef) {
        if a.layer_id != b.layer_id {
            tracing::warn!("Range selection only works on the same layer");
            return;
        }
        let start = a.frame.min(b.frame);
        let end = a.frame.max(b.frame);
        self.selected.clear();
        for frame in start..=end {
            self.selected.insert(FrameRef::new(&a.layer_id, frame));
        }
        self.last_selected = Some(b.clone());
        self.emit_selection();
    }

    /// Empty the selection. Emits even when already empty.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.last_selected = None;
        self.emit_selection();
    }

    /// Whether a cell is currently selected
    pub fn is_selected(&self, frame: &FrameRef) -> bool {
        self.selected.contains(frame)
    }

    /// The selected cells in insertion order
    pub fn selected_frames(&self) -> Vec<FrameRef> {
        self.selected.iter().cloned().collect()
    }

    /// Number of selected cells
    pub fn selection_count(&self) -> usize {
        self.selected.len()
    }

    /// The range anchor: the most recently selected cell
    pub fn last_selected_frame(&self) -> Option<&FrameRef> {
        self.last_selected.as_ref()
    }

    fn emit_selection(&self) {
        self.bus.emit(&TimelineEvent::SelectionChange {
            selected: self.selected_frames(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn model_with_sink() -> (SelectionModel, Rc<RefCell<Vec<Vec<FrameRef>>>>) {
        let bus = Rc::new(EventBus::new());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        bus.subscribe(move |event, _| {
            if let TimelineEvent::SelectionChange { selected } = event {
                sink.borrow_mut().push(selected.clone());
            }
        });
        (SelectionModel::new(bus), events)
    }

    #[test]
    fn test_select_frame_replaces_and_emits_twice() {
        let (mut model, events) = model_with_sink();

        model.select_frame(FrameRef::new("layer-1", 5));
        model.select_frame(FrameRef::new("layer-1", 9));

        assert_eq!(model.selection_count(), 1);
        assert!(model.is_selected(&FrameRef::new("layer-1", 9)));
        assert_eq!(
            model.last_selected_frame(),
            Some(&FrameRef::new("layer-1", 9))
        );

        // clear + singleton per call
        let events = events.borrow();
        assert_eq!(events.len(), 4);
        assert!(events[0].is_empty());
        assert_eq!(events[1], vec![FrameRef::new("layer-1", 5)]);
        assert!(events[2].is_empty());
        assert_eq!(events[3], vec![FrameRef::new("layer-1", 9)]);
    }

    #[test]
    fn test_toggle_and_deselect() {
        let (mut model, _events) = model_with_sink();
        let a = FrameRef::new("layer-1", 3);
        let b = FrameRef::new("layer-2", 7);

        model.toggle_selection(a.clone());
        model.toggle_selection(b.clone());
        assert_eq!(model.selection_count(), 2);
        assert_eq!(model.last_selected_frame(), Some(&b));

        model.toggle_selection(b.clone());
        assert_eq!(model.selected_frames(), vec![a.clone()]);
        assert!(model.last_selected_frame().is_none());

        model.deselect_frame(&b); // absent, no-op
        model.deselect_frame(&a);
        assert_eq!(model.selection_count(), 0);
    }

    #[test]
    fn test_select_range_is_order_independent() {
        let (mut model, _events) = model_with_sink();
        let lo = FrameRef::new("layer-1", 5);
        let hi = FrameRef::new("layer-1", 10);

        model.select_range(&hi, &lo);
        let expected: Vec<FrameRef> = (5..=10).map(|f| FrameRef::new("layer-1", f)).collect();
        assert_eq!(model.selected_frames(), expected);
        assert_eq!(model.last_selected_frame(), Some(&lo));

        model.select_range(&lo, &hi);
        assert_eq!(model.selected_frames(), expected);
        assert_eq!(model.last_selected_frame(), Some(&hi));
    }

    #[test]
    fn test_select_range_rejects_cross_layer() {
        let (mut model, events) = model_with_sink();
        model.select_frame(FrameRef::new("layer-1", 1));
        let emitted = events.borrow().len();

        model.select_range(&FrameRef::new("layer-1", 1), &FrameRef::new("layer-2", 5));
        assert_eq!(model.selected_frames(), vec![FrameRef::new("layer-1", 1)]);
        assert_eq!(events.borrow().len(), emitted);
    }

    #[test]
    fn test_clear_selection_emits_empty_set() {
        let (mut model, events) = model_with_sink();
        model.toggle_selection(FrameRef::new("layer-1", 2));

        model.clear_selection();
        assert_eq!(model.selection_count(), 0);
        assert!(events.borrow().last().unwrap().is_empty());
    }
}
