// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The event loop.
//!
//! A [`Reactor`] owns one window: the platform, the delegate, the surface
//! pair, the animation set and the task queue. It turns every input into
//! one of five units of work and runs exactly one unit at a time:
//!
//! 1. **Native batch**: drain the platform's queued events and dispatch each.
//! 2. **Redraw request**: fold a cross-thread [`mark_dirty`] into the
//!    pending-draw flag.
//! 3. **Frame**: advance animations, then draw and repaint the whole window.
//! 4. **Task**: run one closure from the dispatch queue.
//! 5. **Quit**: discard queued tasks and stop.
//!
//! Two drivers pick the next unit. [`Reactor::run`] owns the wait and
//! multiplexes native readiness, signals and the frame deadline itself.
//! [`Embedded`] is driven by a host main loop through callbacks.
//!
//! [`mark_dirty`]: crate::dispatch::LoopHandle::mark_dirty

mod embedded;

pub use embedded::Embedded;

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::Error;
use crate::anim::{Animation, AnimationId, Animations, Deadline};
use crate::backend::{NativeWindow, Platform, Readiness, Signal, Wake};
use crate::config::LoopConfig;
use crate::dispatch::{Dispatcher, LoopHandle, Shared};
use crate::event::NativeEvent;
use crate::keys::{Key, KeyInput};
use crate::render::{Damage, DoubleBuffer, Pixmap, Rect, RenderState, Resized};
use crate::trace::{
    AnomalyEvent, AnomalyKind, FrameEvent, NativeBatchEvent, QuitEvent, RedrawRequestEvent,
    RepaintEvent, ResizeEvent, TaskEvent, TraceSink, Tracer,
};

/// Application logic attached to a window.
///
/// All methods run on the loop thread.
pub trait WindowDelegate {
    /// Draws the whole window into the backing store.
    fn draw(&mut self, pixmap: &mut Pixmap);

    /// Handles a normalized key press. Returns `true` if it was consumed.
    fn key(&mut self, cx: &mut WindowCx<'_>, key: Key) -> bool;

    /// Handles vertical scrolling by whole lines; negative scrolls up.
    fn scroll(&mut self, cx: &mut WindowCx<'_>, lines: i32);

    /// Called when the window becomes visible.
    fn mapped(&mut self, cx: &mut WindowCx<'_>) {
        _ = cx;
    }

    /// Called when keyboard focus changes.
    fn focus(&mut self, cx: &mut WindowCx<'_>, focused: bool) {
        _ = (cx, focused);
    }
}

/// Window capabilities available inside delegate callbacks and tasks.
pub struct WindowCx<'a> {
    animations: &'a mut Animations,
    draw_wanted: &'a mut bool,
    shared: &'a Shared,
    window: &'a mut dyn NativeWindow,
    now: Instant,
    arm_frames: bool,
}

impl<'a> WindowCx<'a> {
    /// Requests a redraw on the next frame.
    pub fn mark_dirty(&mut self) {
        *self.draw_wanted = true;
    }

    /// Adds an animation to the window's active set.
    pub fn add_animation(&mut self, anim: impl Animation + 'static) -> AnimationId {
        let (id, armed) = self.animations.add(Box::new(anim));
        self.arm_frames |= armed;
        id
    }

    /// Removes an animation. Returns `false` if it was not active.
    pub fn remove_animation(&mut self, id: AnimationId) -> bool {
        self.animations.remove(id)
    }

    /// Number of active animations.
    #[must_use]
    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// Requests the loop to stop after the current unit.
    pub fn quit(&mut self) {
        self.shared.request_quit();
    }

    /// Native window operations.
    pub fn window(&mut self) -> &mut (dyn NativeWindow + 'a) {
        &mut *self.window
    }

    /// The time the current unit of work started.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.now
    }
}

impl core::fmt::Debug for WindowCx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowCx")
            .field("animations", &self.animations.len())
            .field("draw_wanted", &*self.draw_wanted)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

/// One window and the loop that drives it.
pub struct Reactor<P: Platform, D> {
    platform: P,
    delegate: D,
    buffer: DoubleBuffer<P::Onscreen>,
    animations: Animations,
    draw_wanted: bool,
    damage: Damage,
    dispatcher: Dispatcher<D>,
    signals: Receiver<Signal>,
    tracer: Tracer,
    epoch: Instant,
    frames: u64,
    tasks_run: u64,
    stopped: bool,
    scratch: Vec<NativeEvent>,
}

impl<P: Platform, D> core::fmt::Debug for Reactor<P, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Reactor")
            .field("buffer", &self.buffer)
            .field("animations", &self.animations)
            .field("draw_wanted", &self.draw_wanted)
            .field("frames", &self.frames)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl<P: Platform, D: WindowDelegate + 'static> Reactor<P, D> {
    /// Creates the window state for `platform`.
    ///
    /// The window starts unsized; nothing is drawn until the first
    /// [`resize`](Self::resize) (usually from a native configure event).
    pub fn new(platform: P, delegate: D, config: LoopConfig) -> Self {
        Self::build(platform, delegate, config, None)
    }

    pub(crate) fn build(
        platform: P,
        delegate: D,
        config: LoopConfig,
        notify: Option<Arc<dyn Wake>>,
    ) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let shared = Arc::new(Shared::new(tx, notify));
        Self {
            platform,
            delegate,
            buffer: DoubleBuffer::new(),
            animations: Animations::new(config.frame_interval),
            draw_wanted: false,
            damage: Damage::None,
            dispatcher: Dispatcher::new(&config, shared),
            signals: rx,
            tracer: Tracer::none(),
            epoch: Instant::now(),
            frames: 0,
            tasks_run: 0,
            stopped: false,
            scratch: Vec::new(),
        }
    }

    // --- window API ---

    /// Brings both surfaces to `width` × `height`, drawing and repainting
    /// the whole window if the size changed.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<Resized, Error> {
        let delegate = &mut self.delegate;
        let resized = self
            .buffer
            .resize(&mut self.platform, width, height, |p| delegate.draw(p))?;
        if resized != Resized::Unchanged {
            log::debug!("resized to {width}x{height} ({resized:?})");
            self.tracer.resize(&ResizeEvent {
                at: self.epoch.elapsed(),
                width,
                height,
                reallocated: resized == Resized::Reallocated,
            });
        }
        if resized == Resized::Reallocated {
            self.trace_repaint(Rect::from_size(width, height));
        }
        Ok(resized)
    }

    /// Asks the native layer for a new content size.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.platform.set_size(width, height);
    }

    /// Moves the native window.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.platform.set_position(x, y);
    }

    /// Returns the on-screen position of the content area.
    #[must_use]
    pub fn content_position(&self) -> (i32, i32) {
        self.platform.content_position()
    }

    /// Makes the window visible.
    pub fn show(&mut self) {
        self.platform.show();
    }

    /// Destroys the native window.
    pub fn close(&mut self) {
        self.platform.close();
    }

    /// Adds an animation, arming native frame callbacks if the set was empty.
    pub fn add_animation(&mut self, anim: impl Animation + 'static) -> AnimationId {
        let (id, armed) = self.animations.add(Box::new(anim));
        if armed {
            self.platform.request_frames();
        }
        id
    }

    /// Removes an animation. Returns `false` if it was not active.
    pub fn remove_animation(&mut self, id: AnimationId) -> bool {
        self.animations.remove(id)
    }

    /// Requests a redraw on the next frame.
    pub fn mark_dirty(&mut self) {
        self.draw_wanted = true;
    }

    /// Returns a handle for other threads.
    #[must_use]
    pub fn handle(&self) -> LoopHandle<D> {
        self.dispatcher.handle()
    }

    /// Requests the loop to stop.
    pub fn quit(&self) {
        self.dispatcher.shared().request_quit();
    }

    /// Installs a trace sink, replacing any previous one.
    ///
    /// Without the `trace` feature the sink is dropped.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) -> Option<Box<dyn TraceSink>> {
        self.tracer.replace(Some(sink))
    }

    /// Removes the trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.tracer.replace(None)
    }

    // --- inspection ---

    /// The delegate.
    #[must_use]
    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// The delegate, mutably.
    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    /// The platform.
    #[must_use]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// The platform, mutably.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Current surface size, `(0, 0)` while unsized.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.buffer.size()
    }

    /// Surface pair state.
    #[must_use]
    pub fn render_state(&self) -> RenderState {
        self.buffer.state()
    }

    /// The on-screen surface, once sized.
    #[must_use]
    pub fn onscreen(&self) -> Option<&P::Onscreen> {
        self.buffer.onscreen()
    }

    /// The active animation set.
    #[must_use]
    pub fn animations(&self) -> &Animations {
        &self.animations
    }

    /// When the next frame is due, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Deadline> {
        self.animations.next_deadline(self.draw_wanted)
    }

    /// Returns `true` once the loop has stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    // --- owned driver ---

    /// Runs the loop on the current thread until quit.
    ///
    /// A background thread blocks on `readiness` and posts a wake-up each
    /// time the native layer may have events. The loop drains native events
    /// once before its first wait.
    pub fn run<R: Readiness>(&mut self, readiness: R) -> Result<(), Error> {
        let (rearm_tx, rearm_rx) = crossbeam_channel::bounded(1);
        let signals = self.dispatcher.shared().signals();
        // Detached: it may be blocked in the native wait when the loop ends,
        // and leaves on its next wake-up.
        thread::Builder::new()
            .name("smash-readiness".into())
            .spawn(move || watch_readiness(readiness, &signals, &rearm_rx))?;
        self.drive(&rearm_tx)
    }

    fn drive(&mut self, rearm: &Sender<()>) -> Result<(), Error> {
        self.native_batch()?;
        // Set after a frame so a pending signal goes next, even when frames
        // take longer than the frame interval.
        let mut after_frame = false;
        loop {
            if self.dispatcher.shared().quit_requested() {
                self.stop();
                return Ok(());
            }
            let now = Instant::now();
            let deadline = self.next_deadline();
            if deadline.is_some_and(|d| d.is_due(now)) {
                let pending = if after_frame { self.try_signal() } else { None };
                match pending {
                    Some(signal) => {
                        after_frame = false;
                        self.handle_owned_signal(signal, rearm)?;
                    }
                    None => {
                        after_frame = true;
                        self.frame(now)?;
                    }
                }
                continue;
            }
            let signal = match deadline {
                Some(Deadline::At(at)) => match self.signals.recv_deadline(at) {
                    Ok(signal) => signal,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => return Err(closed_signals()),
                },
                _ => self.signals.recv().map_err(|_| closed_signals())?,
            };
            after_frame = false;
            self.handle_owned_signal(signal, rearm)?;
        }
    }

    fn handle_owned_signal(&mut self, signal: Signal, rearm: &Sender<()>) -> Result<(), Error> {
        self.handle_signal(signal)?;
        if signal == Signal::Native {
            // Full means the watcher already has a pending re-arm.
            _ = rearm.try_send(());
        }
        Ok(())
    }

    // --- units of work ---

    pub(crate) fn handle_signal(&mut self, signal: Signal) -> Result<(), Error> {
        match signal {
            Signal::Native => self.native_batch(),
            Signal::Redraw => {
                self.redraw_request();
                Ok(())
            }
            Signal::Dispatch => {
                self.run_task();
                Ok(())
            }
            Signal::Quit => {
                self.stop();
                Ok(())
            }
        }
    }

    pub(crate) fn try_signal(&self) -> Option<Signal> {
        self.signals.try_recv().ok()
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.dispatcher.shared().quit_requested()
    }

    /// Drains the platform and dispatches what it had queued.
    pub(crate) fn native_batch(&mut self) -> Result<(), Error> {
        let mut events = core::mem::take(&mut self.scratch);
        events.clear();
        self.platform.drain_events(&mut events)?;
        let result = self.dispatch_native(&events);
        self.scratch = events;
        result
    }

    /// Dispatches one batch of native events, then repairs exposed damage
    /// and flushes.
    pub(crate) fn dispatch_native(&mut self, events: &[NativeEvent]) -> Result<(), Error> {
        for &event in events {
            self.dispatch_event(event)?;
        }
        self.flush_damage()?;
        self.platform.flush()?;
        self.tracer.native_batch(&NativeBatchEvent {
            at: self.epoch.elapsed(),
            events: events.len(),
        });
        Ok(())
    }

    fn dispatch_event(&mut self, event: NativeEvent) -> Result<(), Error> {
        match event {
            NativeEvent::Configure { width, height } => {
                self.resize(width, height)?;
            }
            NativeEvent::Expose(rect) => self.damage.add(rect),
            NativeEvent::Key(raw) => match raw.decode() {
                KeyInput::Key(key) => {
                    if !self.with_cx(|d, cx| d.key(cx, key)) {
                        log::trace!("key {key} not consumed");
                    }
                }
                KeyInput::Modifier => {}
                KeyInput::Unhandled(keysym) => {
                    log::debug!("unhandled keysym {keysym:?}");
                    self.anomaly(AnomalyKind::UnhandledKey(keysym));
                }
            },
            NativeEvent::Scroll(lines) => self.with_cx(|d, cx| d.scroll(cx, lines)),
            NativeEvent::Button(4) => self.with_cx(|d, cx| d.scroll(cx, -1)),
            NativeEvent::Button(5) => self.with_cx(|d, cx| d.scroll(cx, 1)),
            // Horizontal scroll buttons; there is no horizontal scrolling.
            NativeEvent::Button(6 | 7) => {}
            NativeEvent::Button(button) => {
                log::debug!("unhandled button {button}");
                self.anomaly(AnomalyKind::UnhandledButton(button));
            }
            NativeEvent::Mapped => self.with_cx(|d, cx| d.mapped(cx)),
            NativeEvent::Focus(focused) => self.with_cx(|d, cx| d.focus(cx, focused)),
            NativeEvent::CloseRequested => {
                log::debug!("close requested");
                self.dispatcher.shared().request_quit();
            }
            NativeEvent::Unknown(code) => {
                log::debug!("unhandled native event {code}");
                self.anomaly(AnomalyKind::UnknownEvent(code));
            }
        }
        Ok(())
    }

    fn flush_damage(&mut self) -> Result<(), Error> {
        let damage = self.damage.take();
        if damage.is_empty() || self.buffer.state() == RenderState::Uninitialized {
            return Ok(());
        }
        let (width, height) = self.buffer.size();
        for rect in damage.rects(width, height) {
            if let Some(painted) = self.buffer.repaint(rect)? {
                self.trace_repaint(painted);
            }
        }
        Ok(())
    }

    /// Folds a cross-thread redraw request into the pending-draw flag.
    pub(crate) fn redraw_request(&mut self) {
        if !self.dispatcher.shared().take_dirty() {
            return;
        }
        let newly_wanted = !self.draw_wanted;
        self.draw_wanted = true;
        self.tracer.redraw_request(&RedrawRequestEvent {
            at: self.epoch.elapsed(),
            newly_wanted,
        });
    }

    /// Advances animations and draws if anything was animating or a draw was
    /// pending.
    pub(crate) fn frame(&mut self, now: Instant) -> Result<(), Error> {
        self.draw_wanted |= self.dispatcher.shared().take_dirty();
        let outcome = self.animations.tick(now);
        let wants_draw = outcome.was_active || self.draw_wanted;
        self.draw_wanted = false;

        let mut drew = false;
        if wants_draw {
            if self.buffer.state() == RenderState::Uninitialized {
                log::debug!("skipping frame draw: window has no size yet");
                self.anomaly(AnomalyKind::SkippedFrame);
            } else {
                let delegate = &mut self.delegate;
                let painted = self.buffer.redraw(|p| delegate.draw(p))?;
                self.trace_repaint(painted);
                drew = true;
            }
        }
        self.platform.flush()?;

        self.tracer.frame(&FrameEvent {
            at: self.epoch.elapsed(),
            frame_index: self.frames,
            advanced: outcome.advanced,
            finished: outcome.finished,
            remaining: self.animations.len(),
            drew,
        });
        self.frames += 1;
        Ok(())
    }

    /// Runs the oldest queued task. Returns `false` if the queue was empty.
    pub(crate) fn run_task(&mut self) -> bool {
        let Some(task) = self.dispatcher.pop() else {
            return false;
        };
        let start = Instant::now();
        self.with_cx(|d, cx| task(d, cx));
        self.tracer.task(&TaskEvent {
            at: self.epoch.elapsed(),
            task_index: self.tasks_run,
            duration: start.elapsed(),
        });
        self.tasks_run += 1;
        true
    }

    /// Stops the loop. Tasks still queued are dropped unrun.
    pub(crate) fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        let discarded_tasks = self.dispatcher.discard();
        if discarded_tasks > 0 {
            log::debug!("quit with {discarded_tasks} queued tasks discarded");
        }
        self.tracer.quit(&QuitEvent {
            at: self.epoch.elapsed(),
            discarded_tasks,
        });
    }

    // --- helpers ---

    fn with_cx<R>(&mut self, f: impl FnOnce(&mut D, &mut WindowCx<'_>) -> R) -> R {
        let mut cx = WindowCx {
            animations: &mut self.animations,
            draw_wanted: &mut self.draw_wanted,
            shared: self.dispatcher.shared(),
            window: &mut self.platform,
            now: Instant::now(),
            arm_frames: false,
        };
        let result = f(&mut self.delegate, &mut cx);
        let arm = cx.arm_frames;
        if arm {
            self.platform.request_frames();
        }
        result
    }

    fn anomaly(&mut self, kind: AnomalyKind) {
        self.tracer.anomaly(&AnomalyEvent {
            at: self.epoch.elapsed(),
            kind,
        });
    }

    fn trace_repaint(&mut self, rect: Rect) {
        self.tracer.repaint(&RepaintEvent {
            at: self.epoch.elapsed(),
            rect,
        });
    }
}

fn closed_signals() -> Error {
    Error::InvalidState("loop signal channel closed")
}

/// Body of the readiness thread.
fn watch_readiness<R: Readiness>(mut readiness: R, signals: &Sender<Signal>, rearm: &Receiver<()>) {
    loop {
        if let Err(err) = readiness.wait() {
            log::error!("native readiness wait failed: {err}");
            // The loop's next drain surfaces the failure.
            _ = signals.send(Signal::Native);
            return;
        }
        if signals.send(Signal::Native).is_err() || rearm.recv().is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests;
