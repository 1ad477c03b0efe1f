// SPDX-License-Identifier: MIT OR Apache-2.0
//! Temporal edit engine for Framelight.
//!
//! This crate provides the mutation and scheduling layer over a
//! [`framelight_document::TimelineDocument`]:
//! - Synchronous event bus with cancellable (veto) events
//! - Layer forest mutation (add/delete/rename/reorder/reparent)
//! - Keyframe sequencing (insertion, deletion with shifting, move,
//!   copy/paste through a typed clipboard)
//! - Tween creation with adjacency/overlap validation
//! - Frame selection tracking
//! - Drift-compensated frame-accurate playback
//!
//! ## Architecture
//!
//! Everything is single-threaded and synchronous. The document lives
//! behind a [`DocumentHandle`]; every service holds that handle plus a
//! shared [`EventBus`] and emits events after each mutation for external
//! rendering collaborators to consume. The playback scheduler is driven
//! by a host timer calling [`PlaybackScheduler::tick`].

pub mod clipboard;
pub mod event;
pub mod layers;
pub mod playback;
pub mod selection;
pub mod sequencer;
pub mod tween;

use framelight_document::TimelineDocument;
use std::cell::RefCell;
use std::rc::Rc;

pub use clipboard::{clipboard_handle, ClipboardHandle, ClipboardKeyframe, KeyframeClipboard};
pub use event::{
    EmitOutcome, EventBus, EventContext, HandlerId, KeyframeMove, ObjectKind, TimelineEvent,
};
pub use layers::LayerTreeService;
pub use playback::PlaybackScheduler;
pub use selection::SelectionModel;
pub use sequencer::KeyframeSequencer;
pub use tween::TweenEngine;

/// Shared exclusive-mutation handle to the timeline document.
///
/// The engine is single-threaded; services borrow the document for the
/// duration of one synchronous operation and release it before emitting
/// events, so subscribers may read the document again.
pub type DocumentHandle = Rc<RefCell<TimelineDocument>>;

/// Wrap a document in a shared handle
pub fn document_handle(doc: TimelineDocument) -> DocumentHandle {
    Rc::new(RefCell::new(doc))
}
