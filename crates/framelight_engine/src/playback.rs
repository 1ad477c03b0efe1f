// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drift-compensated frame playback.
//!
//! The scheduler is driven by an external timer calling [`PlaybackScheduler::tick`]
//! with the current instant. Each tick advances at most one frame;
//! instead of catching up after a late tick, the tick base is re-anchored
//! to `now - (elapsed % interval)`, so residual lateness carries into the
//! next interval and frame boundaries stay phase-locked to the wall
//! clock without bursts.

use crate::event::{EventBus, TimelineEvent};
use crate::DocumentHandle;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Frame-accurate playhead driver over a shared document.
pub struct PlaybackScheduler {
    doc: DocumentHandle,
    bus: Rc<EventBus>,
    current_frame: u32,
    playing: bool,
    last_tick: Option<Instant>,
    frame_interval: Duration,
}

impl PlaybackScheduler {
    /// Create a stopped scheduler with the playhead at frame 1
    pub fn new(doc: DocumentHandle, bus: Rc<EventBus>) -> Self {
        Self {
            doc,
            bus,
            current_frame: 1,
            playing: false,
            last_tick: None,
            frame_interval: Duration::ZERO,
        }
    }

    /// Current playhead position (1-based)
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start playback from the current playhead position.
    ///
    /// The frame interval is derived from the document's frame rate at
    /// start; rate changes made while playing take effect on the next
    /// `play`. No-op when already playing or the rate is non-positive.
    pub fn play(&mut self, now: Instant) {
        if self.playing {
            return;
        }
        // Settings can arrive through the unvalidated `load` path or a
        // direct field write; a non-positive rate here would make
        // `Duration::from_secs_f64` panic on the non-finite interval.
        let rate = self.doc.borrow().settings.frame_rate;
        if rate <= 0.0 {
            tracing::warn!("cannot play: frame rate is {rate}");
            return;
        }
        self.frame_interval = Duration::from_secs_f64(1.0 / f64::from(rate));
        self.playing = true;
        self.last_tick = Some(now);
        self.bus.emit(&TimelineEvent::PlaybackStart {
            frame: self.current_frame,
        });
    }

    /// Pause, leaving the playhead where it is
    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        self.last_tick = None;
        self.bus.emit(&TimelineEvent::PlaybackPause {
            frame: self.current_frame,
        });
    }

    /// Stop and reset the playhead to frame 1
    pub fn stop(&mut self) {
        self.pause();
        self.current_frame = 1;
        self.bus.emit(&TimelineEvent::PlaybackStop { frame: 1 });
    }

    /// Pause when playing, play when paused
    pub fn toggle_play_pause(&mut self, now: Instant) {
        if self.playing {
            self.pause();
        } else {
            self.play(now);
        }
    }

    /// Advance the playhead if a frame interval has elapsed since the
    /// last advance. Returns whether a frame boundary was crossed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.playing {
            return false;
        }
        let Some(last_tick) = self.last_tick else {
            return false;
        };
        let elapsed = now.saturating_duration_since(last_tick);
        if elapsed < self.frame_interval {
            return false;
        }
        // Re-anchor to the most recent frame boundary rather than to
        // `now`, so timer jitter does not accumulate into drift. A tick
        // that is several intervals late still advances only one frame.
        let remainder = elapsed.as_nanos() % self.frame_interval.as_nanos();
        self.last_tick = Some(now - Duration::from_nanos(remainder as u64));
        self.advance_frame();
        true
    }

    /// Move the playhead to an explicit frame, clamped to the document
    /// range. Usable during playback and while stopped.
    pub fn go_to_frame(&mut self, frame: u32) {
        let total = self.doc.borrow().settings.total_frames;
        let clamped = frame.clamp(1, total.max(1));
        if clamped != frame {
            tracing::debug!("seek to {frame} clamped to {clamped}");
        }
        self.current_frame = clamped;
        self.bus
            .emit(&TimelineEvent::FrameChange { frame: clamped });
    }

    fn advance_frame(&mut self) {
        let (wrapped, next, keyframe_ids) = {
            let doc = self.doc.borrow();
            let wrapped = self.current_frame >= doc.settings.total_frames;
            let next = if wrapped { 1 } else { self.current_frame + 1 };
            let ids = doc.keyframe_ids_at(next);
            (wrapped, next, ids)
        };
        self.current_frame = next;
        if wrapped {
            self.bus.emit(&TimelineEvent::PlaybackLoop);
        }
        self.bus.emit(&TimelineEvent::FrameEnter {
            frame: self.current_frame,
            keyframe_ids,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_handle;
    use framelight_document::{Keyframe, Layer, LayerNode, TimelineDocument};
    use std::cell::RefCell;

    fn scheduler(
        total_frames: u32,
        frame_rate: f32,
    ) -> (PlaybackScheduler, Rc<RefCell<Vec<TimelineEvent>>>) {
        let mut layer = Layer::with_id("layer-1", "Layer 1");
        layer.add_keyframe(Keyframe::content(1));
        layer.add_keyframe(Keyframe::content(2));
        let mut doc = TimelineDocument::empty();
        doc.settings.total_frames = total_frames;
        doc.settings.frame_rate = frame_rate;
        doc.layers = vec![LayerNode::Layer(layer)];

        let bus = Rc::new(EventBus::new());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        bus.subscribe(move |event, _| sink.borrow_mut().push(event.clone()));
        (PlaybackScheduler::new(document_handle(doc), bus), events)
    }

    #[test]
    fn test_tick_advances_one_frame_per_interval() {
        // 10 fps: one frame per 100ms.
        let (mut scheduler, _events) = scheduler(100, 10.0);
        let start = Instant::now();
        scheduler.play(start);

        assert!(!scheduler.tick(start + Duration::from_millis(50)));
        assert_eq!(scheduler.current_frame(), 1);

        assert!(scheduler.tick(start + Duration::from_millis(100)));
        assert_eq!(scheduler.current_frame(), 2);

        assert!(!scheduler.tick(start + Duration::from_millis(150)));
        assert!(scheduler.tick(start + Duration::from_millis(200)));
        assert_eq!(scheduler.current_frame(), 3);
    }

    #[test]
    fn test_late_tick_advances_once_without_catch_up() {
        let (mut scheduler, _events) = scheduler(100, 10.0);
        let start = Instant::now();
        scheduler.play(start);

        // 350ms late covers three intervals but advances one frame; the
        // base re-anchors to the 300ms boundary, so the next boundary is
        // at 400ms.
        assert!(scheduler.tick(start + Duration::from_millis(350)));
        assert_eq!(scheduler.current_frame(), 2);

        assert!(!scheduler.tick(start + Duration::from_millis(390)));
        assert!(scheduler.tick(start + Duration::from_millis(400)));
        assert_eq!(scheduler.current_frame(), 3);
    }

    #[test]
    fn test_wrap_emits_loop_once_per_cycle() {
        let (mut scheduler, events) = scheduler(3, 10.0);
        let start = Instant::now();
        scheduler.play(start);

        for i in 1..=3u64 {
            assert!(scheduler.tick(start + Duration::from_millis(100 * i)));
        }
        assert_eq!(scheduler.current_frame(), 1);

        let events = events.borrow();
        let loops = events
            .iter()
            .filter(|e| matches!(e, TimelineEvent::PlaybackLoop))
            .count();
        assert_eq!(loops, 1);
        // The wrap lands on frame 1 and reports its keyframes.
        assert!(matches!(
            events.last().unwrap(),
            TimelineEvent::FrameEnter { frame: 1, keyframe_ids } if keyframe_ids == &["kf-layer-1-1"]
        ));
    }

    #[test]
    fn test_frame_enter_carries_keyframe_ids() {
        let (mut scheduler, events) = scheduler(100, 10.0);
        let start = Instant::now();
        scheduler.play(start);
        assert!(scheduler.tick(start + Duration::from_millis(100)));

        assert!(matches!(
            events.borrow().last().unwrap(),
            TimelineEvent::FrameEnter { frame: 2, keyframe_ids } if keyframe_ids == &["kf-layer-1-2"]
        ));
    }

    #[test]
    fn test_pause_holds_and_stop_resets() {
        let (mut scheduler, events) = scheduler(100, 10.0);
        let start = Instant::now();
        scheduler.play(start);
        assert!(scheduler.tick(start + Duration::from_millis(100)));

        scheduler.pause();
        assert!(!scheduler.is_playing());
        assert!(!scheduler.tick(start + Duration::from_millis(500)));
        assert_eq!(scheduler.current_frame(), 2);

        scheduler.stop();
        assert_eq!(scheduler.current_frame(), 1);
        assert!(matches!(
            events.borrow().last().unwrap(),
            TimelineEvent::PlaybackStop { frame: 1 }
        ));
    }

    #[test]
    fn test_stop_while_playing_pauses_first() {
        let (mut scheduler, events) = scheduler(100, 10.0);
        scheduler.play(Instant::now());
        scheduler.stop();

        let events = events.borrow();
        assert!(matches!(events[0], TimelineEvent::PlaybackStart { frame: 1 }));
        assert!(matches!(events[1], TimelineEvent::PlaybackPause { frame: 1 }));
        assert!(matches!(events[2], TimelineEvent::PlaybackStop { frame: 1 }));
    }

    #[test]
    fn test_play_rejects_non_positive_rate() {
        let (mut scheduler, events) = scheduler(100, 0.0);
        scheduler.play(Instant::now());
        assert!(!scheduler.is_playing());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_toggle_play_pause() {
        let (mut scheduler, _events) = scheduler(100, 10.0);
        let now = Instant::now();
        scheduler.toggle_play_pause(now);
        assert!(scheduler.is_playing());
        scheduler.toggle_play_pause(now);
        assert!(!scheduler.is_playing());
    }

    #[test]
    fn test_go_to_frame_clamps_to_document_range() {
        let (mut scheduler, events) = scheduler(50, 10.0);

        scheduler.go_to_frame(25);
        assert_eq!(scheduler.current_frame(), 25);
        scheduler.go_to_frame(0);
        assert_eq!(scheduler.current_frame(), 1);
        scheduler.go_to_frame(999);
        assert_eq!(scheduler.current_frame(), 50);

        assert!(matches!(
            events.borrow().last().unwrap(),
            TimelineEvent::FrameChange { frame: 50 }
        ));
    }
}
