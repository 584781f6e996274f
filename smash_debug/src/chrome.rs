// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};
use std::time::Duration;

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Tasks become complete (`"X"`) slices; everything else is an instant.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(to_trace_event).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_trace_event(recorded: RecordedEvent) -> Value {
    let ts = us(recorded.at());
    match recorded {
        RecordedEvent::NativeBatch(e) => instant("NativeBatch", "Loop", ts, json!({
            "events": e.events,
        })),
        RecordedEvent::RedrawRequest(e) => instant("RedrawRequest", "Loop", ts, json!({
            "newly_wanted": e.newly_wanted,
        })),
        RecordedEvent::Frame(e) => instant("Frame", "Frame", ts, json!({
            "frame_index": e.frame_index,
            "advanced": e.advanced,
            "finished": e.finished,
            "remaining": e.remaining,
            "drew": e.drew,
        })),
        RecordedEvent::Task(e) => json!({
            "ph": "X",
            "name": "Task",
            "cat": "Dispatch",
            // Tasks are reported when they end.
            "ts": us(e.at.saturating_sub(e.duration)),
            "dur": us(e.duration),
            "pid": 0,
            "tid": 0,
            "args": {
                "task_index": e.task_index,
            }
        }),
        RecordedEvent::Resize(e) => instant("Resize", "Render", ts, json!({
            "width": e.width,
            "height": e.height,
            "reallocated": e.reallocated,
        })),
        RecordedEvent::Repaint(e) => instant("Repaint", "Render", ts, json!({
            "x": e.rect.x,
            "y": e.rect.y,
            "width": e.rect.width,
            "height": e.rect.height,
        })),
        RecordedEvent::Anomaly(e) => instant("Anomaly", "Loop", ts, json!({
            "kind": format!("{:?}", e.kind),
        })),
        RecordedEvent::Quit(e) => instant("Quit", "Loop", ts, json!({
            "discarded_tasks": e.discarded_tasks,
        })),
    }
}

fn instant(name: &str, cat: &str, ts: f64, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}

fn us(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use smash_core::trace::{AnomalyEvent, AnomalyKind, FrameEvent, TaskEvent, TraceSink};

    use super::*;
    use crate::recorder::RecorderSink;

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_frame(&FrameEvent {
            at: Duration::from_millis(1),
            frame_index: 0,
            advanced: 1,
            finished: 0,
            remaining: 1,
            drew: true,
        });
        rec.on_task(&TaskEvent {
            at: Duration::from_millis(3),
            task_index: 0,
            duration: Duration::from_millis(1),
        });
        rec.on_anomaly(&AnomalyEvent {
            at: Duration::from_millis(4),
            kind: AnomalyKind::UnhandledButton(9),
        });

        let mut out = Vec::new();
        export(&rec.bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "Frame");
        assert_eq!(parsed[0]["ts"], 1000.0);
        assert_eq!(parsed[0]["args"]["drew"], true);

        assert_eq!(parsed[1]["ph"], "X");
        assert_eq!(parsed[1]["ts"], 2000.0, "task slice starts when it began");
        assert_eq!(parsed[1]["dur"], 1000.0);

        assert_eq!(parsed[2]["args"]["kind"], "UnhandledButton(9)");
    }

    #[test]
    fn empty_recording_exports_empty_array() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
