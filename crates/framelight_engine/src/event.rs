// SPDX-License-Identifier: MIT OR Apache-2.0
//! Synchronous event bus and the timeline event catalog.
//!
//! Dispatch is reentrant-safe: the handler list is snapshotted before
//! iteration, so a handler may subscribe or unsubscribe during dispatch
//! without corrupting the iteration. Cancellable events use a veto
//! protocol: the emitter receives an [`EmitOutcome`] instead of reading
//! back a shared `defaultPrevented` flag.

use framelight_document::{FrameRef, KeyframeKind, Tween};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Kind of node in the layer forest, as carried by object events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// A leaf layer
    Layer,
    /// A folder
    Folder,
}

impl ObjectKind {
    /// Get the event-facing name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Layer => "layer",
            Self::Folder => "folder",
        }
    }
}

/// A single relocation inside a [`TimelineEvent::KeyframeMove`] batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyframeMove {
    /// Event-facing id of the keyframe at its source position
    pub id: String,
    /// Frame before the move
    pub old_frame: u32,
    /// Frame after the move
    pub new_frame: u32,
}

/// Every event the engine emits.
///
/// `BeforeObjectDelete` and `BeforeKeyframeDelete` are cancellable: they
/// are dispatched through [`EventBus::emit_cancellable`] and a vetoed
/// dispatch aborts the pending mutation. All other events are plain
/// notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// A layer or folder was added
    ObjectAdd {
        /// Id of the new node
        id: String,
        /// Layer or folder
        kind: ObjectKind,
        /// Containing folder, `None` for the root
        parent_id: Option<String>,
    },
    /// A node is about to be deleted (cancellable)
    BeforeObjectDelete {
        /// Ids of the nodes pending deletion
        ids: Vec<String>,
    },
    /// Nodes were deleted
    ObjectDelete {
        /// Ids of the removed nodes
        ids: Vec<String>,
    },
    /// A node was renamed
    ObjectRename {
        /// Node id
        id: String,
        /// Name before the rename
        old_name: String,
        /// Name after the rename
        new_name: String,
    },
    /// A node moved within its sibling list
    ObjectReorder {
        /// Node id
        id: String,
        /// Index before the move
        old_index: usize,
        /// Index after the move
        new_index: usize,
    },
    /// A node moved to a different parent
    ObjectReparent {
        /// Node id
        id: String,
        /// New containing folder, `None` for the root
        new_parent_id: Option<String>,
    },
    /// A node's visibility flag flipped
    ObjectVisibilityChange {
        /// Node id
        id: String,
        /// Flag value after the change
        is_visible: bool,
    },
    /// A node's lock flag flipped
    ObjectLockChange {
        /// Node id
        id: String,
        /// Flag value after the change
        is_locked: bool,
    },
    /// A keyframe was inserted
    KeyframeAdd {
        /// Event-facing keyframe id (`kf-<layerId>-<frame>`)
        id: String,
        /// Owning layer
        layer_id: String,
        /// Frame position
        frame: u32,
        /// Content or blank
        kind: KeyframeKind,
    },
    /// Keyframes are about to be deleted (cancellable)
    BeforeKeyframeDelete {
        /// Event-facing ids of the keyframes pending deletion
        ids: Vec<String>,
    },
    /// Keyframes were deleted
    KeyframeDelete {
        /// Event-facing ids of the removed keyframes
        ids: Vec<String>,
    },
    /// Keyframes were relocated
    KeyframeMove {
        /// One entry per relocated keyframe
        moves: Vec<KeyframeMove>,
    },
    /// A frame column was inserted into a layer, shifting later content
    FrameInserted {
        /// Owning layer
        layer_id: String,
        /// Insertion frame
        frame: u32,
    },
    /// Keyframes were copied to the clipboard
    KeyframesCopied {
        /// Number of snapshots captured
        count: usize,
    },
    /// Clipboard keyframes were pasted
    KeyframesPasted {
        /// Destination layer
        target_layer_id: String,
        /// Destination frame of the earliest clipboard entry
        target_frame: u32,
        /// Number of keyframes actually inserted
        count: usize,
    },
    /// A tween was created
    TweenAdd {
        /// Owning layer
        layer_id: String,
        /// Anchor frame
        start_frame: u32,
        /// Final frame
        end_frame: u32,
        /// Tween category, `"motion"`
        kind: String,
    },
    /// A tween was removed
    TweenRemove {
        /// Owning layer
        layer_id: String,
        /// Anchor frame of the removed tween
        start_frame: u32,
        /// Final frame of the removed tween
        end_frame: u32,
    },
    /// A tween's fields were replaced
    TweenUpdate {
        /// Owning layer
        layer_id: String,
        /// Tween before the update
        old: Tween,
        /// Tween after the update
        new: Tween,
    },
    /// The selection set changed
    SelectionChange {
        /// The authoritative selection after the change, in order
        selected: Vec<FrameRef>,
    },
    /// Playback started
    PlaybackStart {
        /// Playhead position at start
        frame: u32,
    },
    /// Playback paused
    PlaybackPause {
        /// Playhead position at pause
        frame: u32,
    },
    /// Playback stopped and the playhead reset
    PlaybackStop {
        /// Playhead position after the reset (always 1)
        frame: u32,
    },
    /// The playhead wrapped past the last frame back to frame 1
    PlaybackLoop,
    /// The playhead jumped via an explicit seek
    FrameChange {
        /// New playhead position
        frame: u32,
    },
    /// The playhead entered a frame during playback
    FrameEnter {
        /// Current frame
        frame: u32,
        /// Event-facing ids of every keyframe at this frame
        keyframe_ids: Vec<String>,
    },
    /// Generic "re-render" notification after a mutation
    Refresh,
}

/// Outcome of a cancellable dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// No handler vetoed; the pending mutation may proceed
    Proceed,
    /// A handler vetoed; the pending mutation must be aborted
    Cancelled,
}

impl EmitOutcome {
    /// Whether a handler vetoed the event
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Per-dispatch context handed to every handler.
pub struct EventContext {
    cancellable: bool,
    prevented: bool,
}

impl EventContext {
    /// Whether this dispatch accepts a veto
    pub fn cancellable(&self) -> bool {
        self.cancellable
    }

    /// Veto the pending mutation. Ignored (with a diagnostic) on plain
    /// dispatches.
    pub fn prevent_default(&mut self) {
        if self.cancellable {
            self.prevented = true;
        } else {
            tracing::warn!("prevent_default called on a non-cancellable event");
        }
    }

    /// Whether some handler has already vetoed this dispatch
    pub fn default_prevented(&self) -> bool {
        self.prevented
    }
}

type Handler = Rc<dyn Fn(&TimelineEvent, &mut EventContext)>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Synchronous publish/subscribe bus for [`TimelineEvent`]s.
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<Vec<(HandlerId, Handler)>>,
    next_id: Cell<u64>,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every event; returns its id
    pub fn subscribe(
        &self,
        handler: impl Fn(&TimelineEvent, &mut EventContext) + 'static,
    ) -> HandlerId {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    /// Remove a handler; `false` when the id is unknown
    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(h, _)| *h != id);
        handlers.len() != before
    }

    /// Number of registered handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Dispatch a plain event to every handler
    pub fn emit(&self, event: &TimelineEvent) {
        self.dispatch(event, false);
    }

    /// Dispatch a cancellable event; any handler may veto the pending
    /// mutation via [`EventContext::prevent_default`]
    pub fn emit_cancellable(&self, event: &TimelineEvent) -> EmitOutcome {
        self.dispatch(event, true)
    }

    fn dispatch(&self, event: &TimelineEvent, cancellable: bool) -> EmitOutcome {
        // Snapshot so handlers can (un)subscribe mid-dispatch.
        let snapshot: Vec<Handler> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        let mut ctx = EventContext {
            cancellable,
            prevented: false,
        };
        for handler in snapshot {
            handler(event, &mut ctx);
        }
        if ctx.prevented {
            EmitOutcome::Cancelled
        } else {
            EmitOutcome::Proceed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_all_handlers() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let hits = Rc::clone(&hits);
            bus.subscribe(move |_, _| hits.set(hits.get() + 1));
        }

        bus.emit(&TimelineEvent::Refresh);
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let id = {
            let hits = Rc::clone(&hits);
            bus.subscribe(move |_, _| hits.set(hits.get() + 1))
        };

        bus.emit(&TimelineEvent::Refresh);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&TimelineEvent::Refresh);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_cancellable_veto() {
        let bus = EventBus::new();
        assert_eq!(
            bus.emit_cancellable(&TimelineEvent::BeforeObjectDelete { ids: vec![] }),
            EmitOutcome::Proceed
        );

        bus.subscribe(|_, ctx| ctx.prevent_default());
        assert_eq!(
            bus.emit_cancellable(&TimelineEvent::BeforeObjectDelete { ids: vec![] }),
            EmitOutcome::Cancelled
        );
    }

    #[test]
    fn test_prevent_default_ignored_on_plain_emit() {
        let bus = EventBus::new();
        bus.subscribe(|_, ctx| {
            ctx.prevent_default();
            assert!(!ctx.default_prevented());
        });
        bus.emit(&TimelineEvent::Refresh);
    }

    #[test]
    fn test_subscribing_during_dispatch_is_safe() {
        let bus = Rc::new(EventBus::new());
        let late_hits = Rc::new(Cell::new(0));

        {
            let bus2 = Rc::clone(&bus);
            let late_hits = Rc::clone(&late_hits);
            bus.subscribe(move |_, _| {
                let late_hits = Rc::clone(&late_hits);
                bus2.subscribe(move |_, _| late_hits.set(late_hits.get() + 1));
            });
        }

        // The handler registered mid-dispatch must not run for this event.
        bus.emit(&TimelineEvent::Refresh);
        assert_eq!(late_hits.get(), 0);
        assert_eq!(bus.handler_count(), 2);

        bus.emit(&TimelineEvent::Refresh);
        assert_eq!(late_hits.get(), 1);
    }
}
