// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use super::*;
use crate::config::Backpressure;
use crate::event::{KeyText, RawKey};
use crate::keys::{Keysym, Modifiers, Sym};
use crate::testing::{ChannelReady, FakePlatform, RecordingDelegate};

type TestReactor = Reactor<FakePlatform, RecordingDelegate>;

fn reactor() -> TestReactor {
    Reactor::new(
        FakePlatform::default(),
        RecordingDelegate::default(),
        LoopConfig::protocol(),
    )
}

fn sized(width: u32, height: u32) -> TestReactor {
    let mut reactor = reactor();
    reactor.resize(width, height).unwrap();
    reactor
}

fn lookup(text: &[u8], keysym: Keysym, mods: Modifiers) -> NativeEvent {
    NativeEvent::Key(RawKey::Lookup {
        text: KeyText::from_bytes(text),
        keysym,
        mods,
    })
}

fn char_key(c: char) -> NativeEvent {
    let mut buf = [0; 4];
    lookup(c.encode_utf8(&mut buf).as_bytes(), Keysym::from_char(c), Modifiers::empty())
}

/// Runs every queued signal the way the owned loop would.
fn pump(reactor: &mut TestReactor) {
    while let Some(signal) = reactor.try_signal() {
        reactor.handle_signal(signal).unwrap();
    }
}

#[test]
fn resize_from_zero_draws_once_with_full_repaint() {
    let mut reactor = reactor();
    assert_eq!(reactor.size(), (0, 0));

    assert_eq!(reactor.resize(640, 400).unwrap(), Resized::Reallocated);

    assert_eq!(reactor.delegate().draws, 1, "exactly one draw expected");
    assert_eq!(
        reactor.onscreen().unwrap().blits(),
        &[Rect::new(0, 0, 640, 400)],
        "exactly one full repaint expected"
    );
}

#[test]
fn configure_events_resize_once_per_size() {
    let mut reactor = reactor();
    reactor.platform().push(NativeEvent::Configure {
        width: 20,
        height: 10,
    });
    reactor.platform().push(NativeEvent::Configure {
        width: 20,
        height: 10,
    });
    reactor.native_batch().unwrap();

    assert_eq!(reactor.size(), (20, 10));
    assert_eq!(reactor.delegate().draws, 1, "repeated size must not redraw");
    assert_eq!(reactor.platform().surfaces_created(), 1);
    assert!(reactor.platform().flushes >= 1, "batch should flush");
}

#[test]
fn expose_repairs_from_backing_without_drawing() {
    let mut reactor = sized(8, 8);
    reactor.delegate_mut().fill = 0xff00_00ff;
    reactor.platform().push(NativeEvent::Expose(Rect::new(0, 0, 4, 4)));
    reactor.platform().push(NativeEvent::Expose(Rect::new(6, 6, 10, 10)));
    reactor.native_batch().unwrap();

    assert_eq!(reactor.delegate().draws, 1, "expose must not call draw");
    assert_eq!(
        reactor.onscreen().unwrap().blits(),
        &[
            Rect::new(0, 0, 8, 8),
            Rect::new(0, 0, 4, 4),
            Rect::new(6, 6, 2, 2)
        ]
    );
}

#[test]
fn expose_before_first_size_is_dropped() {
    let mut reactor = reactor();
    reactor.platform().push(NativeEvent::Expose(Rect::new(0, 0, 4, 4)));
    reactor.native_batch().unwrap();
    assert!(reactor.onscreen().is_none());
}

#[test]
fn animation_runs_until_it_reports_done() {
    let mut reactor = sized(10, 10);
    let calls = Arc::new(Mutex::new(0_u32));
    let counter = calls.clone();
    reactor.add_animation(move |_now: Instant| {
        let mut calls = counter.lock().unwrap();
        *calls += 1;
        *calls <= 3
    });
    assert_eq!(reactor.platform().frame_requests, 1, "first add arms frames");
    assert!(reactor.next_deadline().is_some());

    let mut now = Instant::now();
    let mut frames = 0;
    while reactor.next_deadline().is_some() {
        now += Duration::from_millis(16);
        reactor.frame(now).unwrap();
        frames += 1;
        assert!(frames < 10, "animation never finished");
    }

    assert_eq!(*calls.lock().unwrap(), 4);
    assert_eq!(frames, 4, "three continuing frames plus the final one");
    assert_eq!(
        reactor.delegate().draws,
        1 + 4,
        "the resize draws once; every tick draws, including the last one where the \
         animation finishes, because the set was non-empty before that tick and its \
         final state must reach the screen"
    );
    assert_eq!(reactor.onscreen().unwrap().blits().len(), 1 + 4);
    assert!(reactor.animations().is_empty());
    assert_eq!(reactor.next_deadline(), None, "no deadline once empty");
}

#[test]
fn removed_animation_stops_frames() {
    let mut reactor = sized(4, 4);
    let id = reactor.add_animation(|_: Instant| true);
    reactor.frame(Instant::now()).unwrap();
    assert!(reactor.remove_animation(id));
    assert_eq!(reactor.next_deadline(), None);
}

#[test]
fn marks_before_a_frame_coalesce_into_one_draw() {
    let mut reactor = sized(4, 4);
    let handle = reactor.handle();
    let marker = thread::spawn(move || {
        for _ in 0..5 {
            handle.mark_dirty();
        }
    });
    marker.join().unwrap();

    pump(&mut reactor);
    assert_eq!(reactor.next_deadline(), Some(Deadline::Immediate));
    reactor.frame(Instant::now()).unwrap();
    assert_eq!(reactor.delegate().draws, 2, "initial draw plus one coalesced");

    pump(&mut reactor);
    assert_eq!(reactor.next_deadline(), None, "nothing left to draw");
}

#[test]
fn frame_folds_unconsumed_marks() {
    let mut reactor = sized(4, 4);
    reactor.handle().mark_dirty();
    // Frame runs before the redraw signal is handled.
    reactor.frame(Instant::now()).unwrap();
    pump(&mut reactor);
    assert_eq!(reactor.next_deadline(), None);
    assert_eq!(reactor.delegate().draws, 2);
}

#[test]
fn frame_before_size_skips_draw() {
    let mut reactor = reactor();
    reactor.mark_dirty();
    reactor.frame(Instant::now()).unwrap();
    assert_eq!(reactor.delegate().draws, 0);
    assert_eq!(reactor.next_deadline(), None, "pending draw is cleared");
}

#[test]
fn keys_are_normalized_before_delivery() {
    let mut reactor = sized(4, 4);
    for event in [
        lookup(&[0x03], Keysym::from_char('c'), Modifiers::CONTROL),
        lookup(b"", Keysym::SHIFT_L, Modifiers::empty()),
        lookup(b"", Keysym::F1, Modifiers::empty()),
        lookup(b"", Keysym::LEFT, Modifiers::empty()),
        NativeEvent::Key(RawKey::Keysym {
            keysym: Keysym::DOWN,
            mods: Modifiers::META,
        }),
        char_key('é'),
    ] {
        reactor.platform().push(event);
    }
    reactor.native_batch().unwrap();

    assert_eq!(
        reactor.delegate().keys,
        vec![
            Key::with_mods(Sym::Char('c'), Modifiers::CONTROL),
            Key::new(Sym::Left),
            Key::with_mods(Sym::Down, Modifiers::META),
            Key::new(Sym::Char('é')),
        ]
    );
}

#[test]
fn buttons_map_to_vertical_scroll() {
    let mut reactor = sized(4, 4);
    for event in [
        NativeEvent::Button(4),
        NativeEvent::Button(5),
        NativeEvent::Button(6),
        NativeEvent::Button(7),
        NativeEvent::Button(1),
        NativeEvent::Scroll(3),
    ] {
        reactor.platform().push(event);
    }
    reactor.native_batch().unwrap();
    assert_eq!(reactor.delegate().scrolls, vec![-1, 1, 3]);
}

#[test]
fn mapped_focus_and_close_reach_the_loop() {
    let mut reactor = sized(4, 4);
    let handle = reactor.handle();
    reactor.platform().push(NativeEvent::Mapped);
    reactor.platform().push(NativeEvent::Focus(true));
    reactor.platform().push(NativeEvent::Unknown(99));
    reactor.platform().push(NativeEvent::CloseRequested);
    reactor.native_batch().unwrap();

    assert_eq!(reactor.delegate().log, ["mapped", "focus true"]);
    assert!(handle.is_quitting(), "close request should quit");
}

#[test]
fn task_runs_with_window_capabilities() {
    let mut reactor = sized(4, 4);
    reactor
        .handle()
        .enqueue(|d: &mut RecordingDelegate, cx| {
            d.log.push("task".into());
            cx.add_animation(|_: Instant| false);
            cx.window().set_position(3, 4);
            cx.mark_dirty();
        })
        .unwrap();
    pump(&mut reactor);

    assert_eq!(reactor.delegate().log, ["task"]);
    assert_eq!(reactor.animations().len(), 1);
    assert_eq!(reactor.platform().frame_requests, 1, "task add arms frames");
    assert_eq!(reactor.content_position(), (3, 4));
    assert_eq!(reactor.next_deadline(), Some(Deadline::Immediate));
}

#[test]
fn window_operations_reach_the_platform() {
    let mut reactor = reactor();
    reactor.set_size(640, 400);
    reactor.set_position(10, 20);
    reactor.show();
    reactor.close();
    let platform = reactor.platform();
    assert_eq!(platform.size_requests, vec![(640, 400)]);
    assert_eq!(platform.position, (10, 20));
    assert!(platform.shown && platform.closed);
}

#[test]
fn quit_before_run_discards_queued_tasks() {
    let mut reactor = reactor();
    let handle = reactor.handle();
    handle.enqueue(|d, _| d.log.push("never".into())).unwrap();
    handle.quit();
    assert_eq!(
        handle.enqueue(|_, _| {}),
        Err(crate::DispatchError::Closed)
    );

    let (_ready_tx, ready_rx) = crossbeam_channel::unbounded();
    reactor.run(ChannelReady(ready_rx)).unwrap();

    assert!(reactor.is_stopped());
    assert!(reactor.delegate().log.is_empty(), "queued task must not run");
}

#[test]
fn foreign_tasks_run_in_order_before_later_native_event() {
    let platform = FakePlatform::default();
    let events = platform.injector();
    let delegate = RecordingDelegate {
        quit_on: Some('q'),
        ..Default::default()
    };
    let mut reactor = Reactor::new(platform, delegate, LoopConfig::protocol());
    let handle = reactor.handle();
    let (ready_tx, ready_rx) = crossbeam_channel::unbounded();
    let (started_tx, started_rx) = crossbeam_channel::bounded(1);
    handle
        .enqueue(move |_, _| started_tx.send(()).unwrap())
        .unwrap();

    let producer = thread::spawn(move || {
        started_rx.recv().unwrap();
        handle.enqueue(|d, _| d.log.push("f1".into())).unwrap();
        handle.enqueue(|d, _| d.log.push("f2".into())).unwrap();
        events.lock().unwrap().push_back(char_key('q'));
        ready_tx.send(()).unwrap();
        ready_tx
    });

    reactor.run(ChannelReady(ready_rx)).unwrap();
    let _ready_tx = producer.join().unwrap();

    assert_eq!(reactor.delegate().log, ["f1", "f2", "key q"]);
}

#[test]
fn concurrent_enqueues_interleave_only_between_tasks() {
    const THREADS: usize = 4;
    const PER_THREAD: usize = 25;

    let config = LoopConfig::protocol().with_dispatch(2, Backpressure::Wait(Duration::from_secs(10)));
    let mut reactor = Reactor::new(
        FakePlatform::default(),
        RecordingDelegate::default(),
        config,
    );
    let handle = reactor.handle();

    let coordinator = thread::spawn(move || {
        let producers: Vec<_> = (0..THREADS)
            .map(|t| {
                let handle = handle.clone();
                thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        handle
                            .enqueue(move |d, _| {
                                d.log.push(format!("begin {t} {i}"));
                                d.log.push(format!("end {t} {i}"));
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }
        // Runs after every producer task, FIFO.
        handle.enqueue(|_, cx| cx.quit()).unwrap();
    });

    let (_ready_tx, ready_rx) = crossbeam_channel::unbounded();
    reactor.run(ChannelReady(ready_rx)).unwrap();
    coordinator.join().unwrap();

    let log = &reactor.delegate().log;
    assert_eq!(log.len(), THREADS * PER_THREAD * 2);
    let mut next = [0_usize; THREADS];
    for pair in log.chunks(2) {
        let begin: Vec<&str> = pair[0].split(' ').collect();
        let end: Vec<&str> = pair[1].split(' ').collect();
        assert_eq!(begin[0], "begin");
        assert_eq!(end[0], "end");
        assert_eq!(begin[1..], end[1..], "tasks must not interleave");
        let t: usize = begin[1].parse().unwrap();
        let i: usize = begin[2].parse().unwrap();
        assert_eq!(i, next[t], "per-thread order must be preserved");
        next[t] += 1;
    }
}

#[test]
fn run_surfaces_backend_failure() {
    let mut platform = FakePlatform::default();
    platform.fail_drain();
    let mut reactor = Reactor::new(platform, RecordingDelegate::default(), LoopConfig::protocol());
    let (_ready_tx, ready_rx) = crossbeam_channel::unbounded();
    let err = reactor.run(ChannelReady(ready_rx)).unwrap_err();
    assert!(matches!(err, Error::Backend(_)), "got {err:?}");
}

#[test]
fn animation_deadline_wakes_owned_loop() {
    let mut reactor = sized(4, 4);
    let handle = reactor.handle();
    reactor.add_animation(move |_: Instant| {
        // Quit from the third frame.
        static FRAMES: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(0);
        if FRAMES.fetch_add(1, std::sync::atomic::Ordering::Relaxed) == 2 {
            handle.quit();
        }
        true
    });

    let (_ready_tx, ready_rx) = crossbeam_channel::unbounded();
    reactor.run(ChannelReady(ready_rx)).unwrap();

    assert!(reactor.is_stopped());
    assert_eq!(reactor.delegate().draws, 1 + 3, "one draw per frame");
}

#[test]
fn slow_frames_still_let_tasks_through() {
    let mut reactor = sized(4, 4);
    let fallback = reactor.handle();
    let mut frames = 0;
    reactor.add_animation(move |_: Instant| {
        // Each frame overruns the 16ms interval, so a frame is always due.
        thread::sleep(Duration::from_millis(20));
        frames += 1;
        if frames == 200 {
            fallback.quit();
        }
        true
    });

    let handle = reactor.handle();
    let producer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        handle
            .enqueue(|d, cx| {
                d.log.push("task".into());
                cx.quit();
            })
            .unwrap();
    });

    let (_ready_tx, ready_rx) = crossbeam_channel::unbounded();
    reactor.run(ChannelReady(ready_rx)).unwrap();
    producer.join().unwrap();

    assert_eq!(
        reactor.delegate().log,
        ["task"],
        "a task queued during back-to-back frames must run before the next frame"
    );
    assert!(
        reactor.delegate().draws < 50,
        "the task should stop the loop soon after it was queued, got {} draws",
        reactor.delegate().draws
    );
}

#[cfg(feature = "trace")]
#[test]
fn trace_sink_sees_each_unit() {
    use crate::trace::{AnomalyEvent, FrameEvent, QuitEvent, ResizeEvent, TraceSink};

    #[derive(Default)]
    struct Seen {
        resizes: usize,
        frames: usize,
        anomalies: usize,
        quits: usize,
    }
    struct Sink(Arc<Mutex<Seen>>);
    impl TraceSink for Sink {
        fn on_resize(&mut self, _: &ResizeEvent) {
            self.0.lock().unwrap().resizes += 1;
        }
        fn on_frame(&mut self, _: &FrameEvent) {
            self.0.lock().unwrap().frames += 1;
        }
        fn on_anomaly(&mut self, _: &AnomalyEvent) {
            self.0.lock().unwrap().anomalies += 1;
        }
        fn on_quit(&mut self, _: &QuitEvent) {
            self.0.lock().unwrap().quits += 1;
        }
    }

    let seen = Arc::new(Mutex::new(Seen::default()));
    let mut reactor = reactor();
    reactor.set_trace_sink(Box::new(Sink(seen.clone())));
    reactor.resize(4, 4).unwrap();
    reactor.platform().push(NativeEvent::Unknown(42));
    reactor.native_batch().unwrap();
    reactor.frame(Instant::now()).unwrap();
    reactor.quit();
    pump(&mut reactor);
    pump(&mut reactor);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.resizes, 1);
    assert_eq!(seen.frames, 1);
    assert_eq!(seen.anomalies, 1, "unknown event is an anomaly");
    assert_eq!(seen.quits, 1, "quit is traced once");
}

mod embedded {
    use super::*;

    #[derive(Default)]
    struct HostWake(Mutex<Vec<Signal>>);

    impl Wake for HostWake {
        fn wake(&self, signal: Signal) {
            self.0.lock().unwrap().push(signal);
        }
    }

    fn embedded(host: &Arc<HostWake>) -> Embedded<FakePlatform, RecordingDelegate> {
        let host: Arc<dyn Wake> = host.clone();
        Embedded::new(
            FakePlatform::default(),
            RecordingDelegate::default(),
            LoopConfig::toolkit(),
            host,
        )
    }

    #[test]
    fn host_is_notified_and_wake_runs_one_unit() {
        let host = Arc::new(HostWake::default());
        let mut driver = embedded(&host);
        let handle = driver.handle();
        handle.enqueue(|d, _| d.log.push("a".into())).unwrap();
        handle.mark_dirty();

        assert_eq!(*host.0.lock().unwrap(), vec![Signal::Dispatch, Signal::Redraw]);
        assert!(driver.on_wake().unwrap());
        assert_eq!(driver.reactor().delegate().log, ["a"]);
        assert!(driver.on_wake().unwrap());
        assert_eq!(driver.next_deadline(), Some(Deadline::Immediate));
        assert!(!driver.on_wake().unwrap(), "nothing left to run");
    }

    #[test]
    fn native_and_frame_callbacks() {
        let host = Arc::new(HostWake::default());
        let mut driver = embedded(&host);
        driver
            .on_native(&[NativeEvent::Configure {
                width: 5,
                height: 5,
            }])
            .unwrap();
        assert_eq!(driver.reactor().delegate().draws, 1);

        driver.reactor_mut().add_animation(|_: Instant| false);
        assert_eq!(driver.reactor().platform().frame_requests, 1);
        let keep_ticking = driver.on_frame(Instant::now()).unwrap();
        assert!(!keep_ticking, "finished animation stops the frame clock");
        assert_eq!(driver.reactor().delegate().draws, 2);
        assert_eq!(driver.next_deadline(), None);
    }

    #[test]
    fn quit_stops_every_callback() {
        let host = Arc::new(HostWake::default());
        let mut driver = embedded(&host);
        let handle = driver.handle();
        handle.enqueue(|d, _| d.log.push("dropped".into())).unwrap();
        handle.quit();

        assert!(!driver.on_wake().unwrap());
        assert!(driver.is_stopped());
        assert!(!driver.on_frame(Instant::now()).unwrap());
        driver.on_native(&[NativeEvent::Mapped]).unwrap();
        assert!(driver.reactor().delegate().log.is_empty());
        assert_eq!(host.0.lock().unwrap().last(), Some(&Signal::Quit));
    }
}
