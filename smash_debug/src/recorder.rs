// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events as
//! fixed-size little-endian records. [`decode`] reads them back as an
//! iterator of [`RecordedEvent`].
//!
//! Clones of a recorder share one buffer: keep a clone, hand the other to
//! [`Reactor::set_trace_sink`](smash_core::reactor::Reactor::set_trace_sink),
//! and read the recording later with [`RecorderSink::bytes`].

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use smash_core::keys::Keysym;
use smash_core::render::Rect;
use smash_core::trace::{
    AnomalyEvent, AnomalyKind, FrameEvent, NativeBatchEvent, QuitEvent, RedrawRequestEvent,
    RepaintEvent, ResizeEvent, TaskEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_NATIVE_BATCH: u8 = 1;
const TAG_REDRAW_REQUEST: u8 = 2;
const TAG_FRAME: u8 = 3;
const TAG_TASK: u8 = 4;
const TAG_RESIZE: u8 = 5;
const TAG_REPAINT: u8 = 6;
const TAG_ANOMALY: u8 = 7;
const TAG_QUIT: u8 = 8;

const ANOMALY_KEY: u8 = 0;
const ANOMALY_EVENT: u8 = 1;
const ANOMALY_BUTTON: u8 = 2;
const ANOMALY_SKIPPED_FRAME: u8 = 3;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded bytes.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.buf.borrow().clone()
    }

    /// Number of recorded bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.borrow().len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.borrow().is_empty()
    }

    // -- encoding helpers --------------------------------------------------

    fn record(&self, tag: u8, at: Duration, body: impl FnOnce(&mut Encoder<'_>)) {
        let mut buf = self.buf.borrow_mut();
        let mut enc = Encoder(&mut *buf);
        enc.u8(tag);
        enc.duration(at);
        body(&mut enc);
    }
}

struct Encoder<'a>(&'a mut Vec<u8>);

impl Encoder<'_> {
    fn u8(&mut self, v: u8) {
        self.0.push(v);
    }

    fn bool(&mut self, v: bool) {
        self.u8(u8::from(v));
    }

    fn u32(&mut self, v: u32) {
        self.0.extend_from_slice(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.0.extend_from_slice(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.0.extend_from_slice(&v.to_le_bytes());
    }

    /// Counts are capped at `u32::MAX`.
    fn count(&mut self, v: usize) {
        self.u32(u32::try_from(v).unwrap_or(u32::MAX));
    }

    fn duration(&mut self, d: Duration) {
        self.u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));
    }
}

impl TraceSink for RecorderSink {
    fn on_native_batch(&mut self, e: &NativeBatchEvent) {
        self.record(TAG_NATIVE_BATCH, e.at, |enc| enc.count(e.events));
    }

    fn on_redraw_request(&mut self, e: &RedrawRequestEvent) {
        self.record(TAG_REDRAW_REQUEST, e.at, |enc| enc.bool(e.newly_wanted));
    }

    fn on_frame(&mut self, e: &FrameEvent) {
        self.record(TAG_FRAME, e.at, |enc| {
            enc.u64(e.frame_index);
            enc.count(e.advanced);
            enc.count(e.finished);
            enc.count(e.remaining);
            enc.bool(e.drew);
        });
    }

    fn on_task(&mut self, e: &TaskEvent) {
        self.record(TAG_TASK, e.at, |enc| {
            enc.u64(e.task_index);
            enc.duration(e.duration);
        });
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        self.record(TAG_RESIZE, e.at, |enc| {
            enc.u32(e.width);
            enc.u32(e.height);
            enc.bool(e.reallocated);
        });
    }

    fn on_repaint(&mut self, e: &RepaintEvent) {
        self.record(TAG_REPAINT, e.at, |enc| {
            enc.i32(e.rect.x);
            enc.i32(e.rect.y);
            enc.u32(e.rect.width);
            enc.u32(e.rect.height);
        });
    }

    fn on_anomaly(&mut self, e: &AnomalyEvent) {
        let (kind, value) = match e.kind {
            AnomalyKind::UnhandledKey(keysym) => (ANOMALY_KEY, keysym.0),
            AnomalyKind::UnknownEvent(code) => (ANOMALY_EVENT, code),
            AnomalyKind::UnhandledButton(button) => (ANOMALY_BUTTON, button),
            AnomalyKind::SkippedFrame => (ANOMALY_SKIPPED_FRAME, 0),
        };
        self.record(TAG_ANOMALY, e.at, |enc| {
            enc.u8(kind);
            enc.u32(value);
        });
    }

    fn on_quit(&mut self, e: &QuitEvent) {
        self.record(TAG_QUIT, e.at, |enc| enc.count(e.discarded_tasks));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`NativeBatchEvent`].
    NativeBatch(NativeBatchEvent),
    /// A [`RedrawRequestEvent`].
    RedrawRequest(RedrawRequestEvent),
    /// A [`FrameEvent`].
    Frame(FrameEvent),
    /// A [`TaskEvent`].
    Task(TaskEvent),
    /// A [`ResizeEvent`].
    Resize(ResizeEvent),
    /// A [`RepaintEvent`].
    Repaint(RepaintEvent),
    /// An [`AnomalyEvent`].
    Anomaly(AnomalyEvent),
    /// A [`QuitEvent`].
    Quit(QuitEvent),
}

impl RecordedEvent {
    /// Time since loop creation.
    #[must_use]
    pub fn at(&self) -> Duration {
        match self {
            Self::NativeBatch(e) => e.at,
            Self::RedrawRequest(e) => e.at,
            Self::Frame(e) => e.at,
            Self::Task(e) => e.at,
            Self::Resize(e) => e.at,
            Self::Repaint(e) => e.at,
            Self::Anomaly(e) => e.at,
            Self::Quit(e) => e.at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Decoding stops at the first truncated or unknown record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_count(&mut self) -> Option<usize> {
        usize::try_from(self.read_u32()?).ok()
    }

    fn read_duration(&mut self) -> Option<Duration> {
        self.read_u64().map(Duration::from_nanos)
    }

    fn read_anomaly(&mut self) -> Option<AnomalyKind> {
        let kind = self.read_u8()?;
        let value = self.read_u32()?;
        Some(match kind {
            ANOMALY_KEY => AnomalyKind::UnhandledKey(Keysym(value)),
            ANOMALY_EVENT => AnomalyKind::UnknownEvent(value),
            ANOMALY_BUTTON => AnomalyKind::UnhandledButton(value),
            _ => AnomalyKind::SkippedFrame,
        })
    }

    fn decode_one(&mut self) -> Option<RecordedEvent> {
        let tag = self.read_u8()?;
        let at = self.read_duration()?;
        Some(match tag {
            TAG_NATIVE_BATCH => RecordedEvent::NativeBatch(NativeBatchEvent {
                at,
                events: self.read_count()?,
            }),
            TAG_REDRAW_REQUEST => RecordedEvent::RedrawRequest(RedrawRequestEvent {
                at,
                newly_wanted: self.read_bool()?,
            }),
            TAG_FRAME => RecordedEvent::Frame(FrameEvent {
                at,
                frame_index: self.read_u64()?,
                advanced: self.read_count()?,
                finished: self.read_count()?,
                remaining: self.read_count()?,
                drew: self.read_bool()?,
            }),
            TAG_TASK => RecordedEvent::Task(TaskEvent {
                at,
                task_index: self.read_u64()?,
                duration: self.read_duration()?,
            }),
            TAG_RESIZE => RecordedEvent::Resize(ResizeEvent {
                at,
                width: self.read_u32()?,
                height: self.read_u32()?,
                reallocated: self.read_bool()?,
            }),
            TAG_REPAINT => RecordedEvent::Repaint(RepaintEvent {
                at,
                rect: Rect::new(
                    self.read_i32()?,
                    self.read_i32()?,
                    self.read_u32()?,
                    self.read_u32()?,
                ),
            }),
            TAG_ANOMALY => RecordedEvent::Anomaly(AnomalyEvent {
                at,
                kind: self.read_anomaly()?,
            }),
            TAG_QUIT => RecordedEvent::Quit(QuitEvent {
                at,
                discarded_tasks: self.read_count()?,
            }),
            _ => return None,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.decode_one();
        if event.is_none() {
            // Leave a corrupt tail alone instead of resynchronizing.
            self.pos = self.data.len();
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn clones_share_one_recording() {
        let rec = RecorderSink::new();
        let mut installed: Box<dyn TraceSink> = Box::new(rec.clone());
        installed.on_quit(&QuitEvent {
            at: ms(5),
            discarded_tasks: 2,
        });
        assert!(!rec.is_empty(), "events recorded through the clone");

        let events: Vec<_> = decode(&rec.bytes()).collect();
        assert_eq!(events.len(), 1);
        let RecordedEvent::Quit(quit) = events[0] else {
            panic!("expected quit, got {:?}", events[0]);
        };
        assert_eq!(quit.at, ms(5));
        assert_eq!(quit.discarded_tasks, 2);
    }

    #[test]
    fn frame_and_repaint_keep_their_fields() {
        let mut rec = RecorderSink::new();
        rec.on_frame(&FrameEvent {
            at: ms(16),
            frame_index: 7,
            advanced: 3,
            finished: 1,
            remaining: 2,
            drew: true,
        });
        rec.on_repaint(&RepaintEvent {
            at: ms(17),
            rect: Rect::new(-4, 8, 100, 50),
        });

        let events: Vec<_> = decode(&rec.bytes()).collect();
        let RecordedEvent::Frame(frame) = events[0] else {
            panic!("expected frame, got {:?}", events[0]);
        };
        assert_eq!(frame.frame_index, 7);
        assert_eq!((frame.advanced, frame.finished, frame.remaining), (3, 1, 2));
        assert!(frame.drew);
        let RecordedEvent::Repaint(repaint) = events[1] else {
            panic!("expected repaint, got {:?}", events[1]);
        };
        assert_eq!(repaint.rect, Rect::new(-4, 8, 100, 50));
        assert_eq!(events[1].at(), ms(17));
    }

    #[test]
    fn anomaly_kinds_survive_recording() {
        let mut rec = RecorderSink::new();
        let kinds = [
            AnomalyKind::UnhandledKey(Keysym::F1),
            AnomalyKind::UnknownEvent(35),
            AnomalyKind::UnhandledButton(9),
            AnomalyKind::SkippedFrame,
        ];
        for kind in kinds {
            rec.on_anomaly(&AnomalyEvent { at: ms(1), kind });
        }
        let decoded: Vec<_> = decode(&rec.bytes())
            .map(|e| match e {
                RecordedEvent::Anomaly(a) => a.kind,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(decoded, kinds);
    }

    #[test]
    fn truncated_tail_is_dropped() {
        let mut rec = RecorderSink::new();
        rec.on_native_batch(&NativeBatchEvent {
            at: ms(1),
            events: 4,
        });
        rec.on_task(&TaskEvent {
            at: ms(2),
            task_index: 0,
            duration: Duration::from_micros(250),
        });
        let mut bytes = rec.bytes();
        bytes.truncate(bytes.len() - 3);
        let events: Vec<_> = decode(&bytes).collect();
        assert_eq!(events.len(), 1, "only the complete record decodes");
        assert!(matches!(events[0], RecordedEvent::NativeBatch(e) if e.events == 4));
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }
}
