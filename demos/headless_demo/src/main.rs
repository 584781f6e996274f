// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Toy window embedded in a simulated toolkit loop.
//!
//! A second thread plays the user: it sizes the window, types, scrolls,
//! presses a button nobody handles, and queues a task. Pressing space starts
//! a short fade animation; `q` quits.
//!
//! By default every trace event is printed to stderr by a
//! [`PrettyPrintSink`]. With `--chrome`, events go to a [`RecorderSink`]
//! instead and are exported as Chrome trace JSON on stdout:
//!
//! ```text
//! cargo run -p headless_demo -- --chrome > trace.json
//! ```

use std::cell::Cell;
use std::error::Error;
use std::io::{self, BufWriter, Write};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use smash_backend_headless::{HostLoop, Injector};
use smash_core::event::{KeyText, NativeEvent, RawKey};
use smash_core::keys::{Key, Keysym, Modifiers, Sym};
use smash_core::reactor::{WindowCx, WindowDelegate};
use smash_core::render::Pixmap;
use smash_debug::pretty::PrettyPrintSink;
use smash_debug::recorder::RecorderSink;

const FADE_FRAMES: u32 = 8;

struct Toy {
    /// Shared with the running fade animation.
    shade: Rc<Cell<u32>>,
    offset: i32,
    typed: String,
}

impl Toy {
    fn new() -> Self {
        Self {
            shade: Rc::new(Cell::new(0)),
            offset: 0,
            typed: String::new(),
        }
    }
}

impl WindowDelegate for Toy {
    fn draw(&mut self, pixmap: &mut Pixmap) {
        let level = self.shade.get() * 0xff / FADE_FRAMES;
        pixmap.fill(0xff00_0000 | (level << 16) | (level << 8) | level);
    }

    fn key(&mut self, cx: &mut WindowCx<'_>, key: Key) -> bool {
        match key.sym {
            Sym::Char('q') if key.mods.is_empty() => cx.quit(),
            Sym::Char(' ') => {
                let shade = self.shade.clone();
                shade.set(FADE_FRAMES);
                cx.add_animation(move |_now: Instant| {
                    shade.set(shade.get().saturating_sub(1));
                    shade.get() > 0
                });
            }
            Sym::Char(c) => {
                self.typed.push(c);
                cx.mark_dirty();
            }
            _ => return false,
        }
        true
    }

    fn scroll(&mut self, cx: &mut WindowCx<'_>, lines: i32) {
        self.offset += lines;
        cx.mark_dirty();
    }
}

fn press(injector: &Injector, c: char) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut buf = [0; 4];
    injector.send(NativeEvent::Key(RawKey::Lookup {
        text: KeyText::from_bytes(c.encode_utf8(&mut buf).as_bytes()),
        keysym: Keysym::from_char(c),
        mods: Modifiers::empty(),
    }))?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let chrome = std::env::args().skip(1).any(|arg| arg == "--chrome");

    let mut host = HostLoop::new();
    let mut window = host.embed(Toy::new(), None);
    let recorder = RecorderSink::new();
    if chrome {
        window.reactor_mut().set_trace_sink(Box::new(recorder.clone()));
    } else {
        window.reactor_mut().set_trace_sink(Box::new(PrettyPrintSink::stderr()));
    }

    let injector = window.reactor().platform().injector();
    let handle = window.handle();
    let user = thread::spawn(move || -> Result<(), Box<dyn Error + Send + Sync>> {
        injector.send_all([
            NativeEvent::Configure {
                width: 160,
                height: 48,
            },
            NativeEvent::Mapped,
            NativeEvent::Focus(true),
        ])?;
        for c in "hi".chars() {
            press(&injector, c)?;
        }
        injector.send_all([NativeEvent::Scroll(3), NativeEvent::Button(9)])?;
        handle.enqueue(|toy: &mut Toy, cx: &mut WindowCx<'_>| {
            toy.typed.push('!');
            cx.mark_dirty();
        })?;
        press(&injector, ' ')?;
        thread::sleep(Duration::from_millis(250));
        press(&injector, 'q')?;
        Ok(())
    });

    host.run(&mut window)?;
    user.join()
        .map_err(|_| "user thread panicked")?
        .map_err(|e| -> Box<dyn Error> { e })?;

    let toy = window.reactor().delegate();
    let stats = host.stats();
    eprintln!(
        "typed {:?}, scrolled {}, {} batches, {} idle callbacks, {} frames",
        toy.typed, toy.offset, stats.batches, stats.idles, stats.frames
    );

    if chrome {
        let mut out = BufWriter::new(io::stdout().lock());
        smash_debug::chrome::export(&recorder.bytes(), &mut out)?;
        writeln!(out)?;
    }
    Ok(())
}
