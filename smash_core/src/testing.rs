// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use crossbeam_channel::Receiver;

use crate::Error;
use crate::backend::{NativeWindow, Onscreen, Platform, Readiness};
use crate::event::NativeEvent;
use crate::keys::{Key, Sym};
use crate::reactor::{WindowCx, WindowDelegate};
use crate::render::{Pixmap, Rect};

pub(crate) type EventQueue = Arc<Mutex<VecDeque<NativeEvent>>>;

/// Platform that hands out in-memory surfaces and replays injected events.
#[derive(Debug, Default)]
pub(crate) struct FakePlatform {
    events: EventQueue,
    created: usize,
    fail_next_surface: bool,
    fail_drain: bool,
    pub(crate) frame_requests: usize,
    pub(crate) flushes: usize,
    pub(crate) size_requests: Vec<(u32, u32)>,
    pub(crate) position: (i32, i32),
    pub(crate) shown: bool,
    pub(crate) closed: bool,
}

impl FakePlatform {
    pub(crate) fn surfaces_created(&self) -> usize {
        self.created
    }

    pub(crate) fn fail_next_surface(&mut self) {
        self.fail_next_surface = true;
    }

    pub(crate) fn fail_drain(&mut self) {
        self.fail_drain = true;
    }

    pub(crate) fn push(&self, event: NativeEvent) {
        self.events.lock().unwrap().push_back(event);
    }

    pub(crate) fn injector(&self) -> EventQueue {
        self.events.clone()
    }
}

impl NativeWindow for FakePlatform {
    fn set_size(&mut self, width: u32, height: u32) {
        self.size_requests.push((width, height));
    }

    fn set_position(&mut self, x: i32, y: i32) {
        self.position = (x, y);
    }

    fn content_position(&self) -> (i32, i32) {
        self.position
    }

    fn show(&mut self) {
        self.shown = true;
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

impl Platform for FakePlatform {
    type Onscreen = FakeOnscreen;

    fn create_onscreen(&mut self, width: u32, height: u32) -> Result<FakeOnscreen, Error> {
        if core::mem::take(&mut self.fail_next_surface) {
            return Err(Error::SurfaceCreation {
                width,
                height,
                reason: "injected failure".into(),
            });
        }
        self.created += 1;
        Ok(FakeOnscreen::new(width, height))
    }

    fn drain_events(&mut self, out: &mut Vec<NativeEvent>) -> Result<(), Error> {
        if self.fail_drain {
            return Err(Error::backend(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "connection lost",
            )));
        }
        out.extend(self.events.lock().unwrap().drain(..));
        Ok(())
    }

    fn request_frames(&mut self) {
        self.frame_requests += 1;
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.flushes += 1;
        Ok(())
    }
}

/// On-screen surface that keeps its pixels and a log of blitted rects.
#[derive(Debug)]
pub(crate) struct FakeOnscreen {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    blits: Vec<Rect>,
}

impl FakeOnscreen {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            blits: Vec::new(),
        }
    }

    pub(crate) fn blits(&self) -> &[Rect] {
        &self.blits
    }

    pub(crate) fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

impl Onscreen for FakeOnscreen {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn blit(&mut self, src: &Pixmap, rect: Rect) -> Result<(), Error> {
        src.copy_rect_into(rect, &mut self.pixels, self.width as usize);
        self.blits.push(rect);
        Ok(())
    }
}

/// Delegate that records every callback.
#[derive(Debug, Default)]
pub(crate) struct RecordingDelegate {
    pub(crate) log: Vec<String>,
    pub(crate) draws: usize,
    pub(crate) keys: Vec<Key>,
    pub(crate) scrolls: Vec<i32>,
    pub(crate) quit_on: Option<char>,
    pub(crate) fill: u32,
}

impl WindowDelegate for RecordingDelegate {
    fn draw(&mut self, pixmap: &mut Pixmap) {
        self.draws += 1;
        pixmap.fill(self.fill);
    }

    fn key(&mut self, cx: &mut WindowCx<'_>, key: Key) -> bool {
        self.keys.push(key);
        self.log.push(format!("key {key}"));
        if self.quit_on.is_some_and(|q| key.sym == Sym::Char(q)) {
            cx.quit();
        }
        true
    }

    fn scroll(&mut self, _cx: &mut WindowCx<'_>, lines: i32) {
        self.scrolls.push(lines);
    }

    fn mapped(&mut self, _cx: &mut WindowCx<'_>) {
        self.log.push("mapped".into());
    }

    fn focus(&mut self, _cx: &mut WindowCx<'_>, focused: bool) {
        self.log.push(format!("focus {focused}"));
    }
}

/// Readiness that fires once per message on a channel.
#[derive(Debug)]
pub(crate) struct ChannelReady(pub(crate) Receiver<()>);

impl Readiness for ChannelReady {
    fn wait(&mut self) -> io::Result<()> {
        self.0
            .recv()
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "ready channel closed"))
    }
}
