// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation scheduling.
//!
//! A window keeps a set of active [`Animation`]s. While the set is non-empty
//! the loop wakes once per frame interval, advances every member once, and
//! draws. Members that report they are finished leave the set during the
//! same pass. An empty set never schedules a wake-up.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// A unit of time-driven visual change.
pub trait Animation {
    /// Advances to `now`. Returns `false` once the animation is finished.
    fn advance(&mut self, now: Instant) -> bool;
}

impl<F: FnMut(Instant) -> bool> Animation for F {
    fn advance(&mut self, now: Instant) -> bool {
        self(now)
    }
}

/// Identity of an animation within one window's set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationId(u64);

/// When the loop must next run a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deadline {
    /// As soon as possible.
    Immediate,
    /// No earlier than this instant.
    At(Instant),
}

impl Deadline {
    /// Returns `true` if the deadline has been reached at `now`.
    #[must_use]
    pub fn is_due(self, now: Instant) -> bool {
        match self {
            Self::Immediate => true,
            Self::At(at) => at <= now,
        }
    }

    /// Returns the time left until the deadline, zero if due.
    #[must_use]
    pub fn remaining(self, now: Instant) -> Duration {
        match self {
            Self::Immediate => Duration::ZERO,
            Self::At(at) => at.saturating_duration_since(now),
        }
    }
}

/// What a [`tick`](Animations::tick) did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Number of animations advanced.
    pub advanced: usize,
    /// Number of animations that finished and were removed.
    pub finished: usize,
    /// Whether the set was non-empty before the tick.
    pub was_active: bool,
}

/// The per-window active animation set.
pub struct Animations {
    members: BTreeMap<AnimationId, Box<dyn Animation>>,
    next_id: u64,
    interval: Duration,
    last_frame: Option<Instant>,
}

impl core::fmt::Debug for Animations {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Animations")
            .field("ids", &self.members.keys().collect::<Vec<_>>())
            .field("interval", &self.interval)
            .field("last_frame", &self.last_frame)
            .finish_non_exhaustive()
    }
}

impl Animations {
    /// Creates an empty set with the given frame interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            members: BTreeMap::new(),
            next_id: 0,
            interval,
            last_frame: None,
        }
    }

    /// Returns the frame interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Adds an animation.
    ///
    /// The returned flag is `true` when this call made the set non-empty,
    /// which is when the caller should arm the native frame callback.
    pub fn add(&mut self, anim: Box<dyn Animation>) -> (AnimationId, bool) {
        let armed = self.members.is_empty();
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        self.members.insert(id, anim);
        (id, armed)
    }

    /// Removes an animation. Returns `false` if it was not in the set.
    pub fn remove(&mut self, id: AnimationId) -> bool {
        self.members.remove(&id).is_some()
    }

    /// Returns `true` if `id` is in the set.
    #[must_use]
    pub fn contains(&self, id: AnimationId) -> bool {
        self.members.contains_key(&id)
    }

    /// Number of active animations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if no animation is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the time of the last frame, if any.
    #[must_use]
    pub fn last_frame(&self) -> Option<Instant> {
        self.last_frame
    }

    /// Computes when the loop must next run a frame.
    ///
    /// A pending draw is due immediately. Otherwise an empty set has no
    /// deadline and a non-empty one is due one interval after the last frame.
    #[must_use]
    pub fn next_deadline(&self, draw_pending: bool) -> Option<Deadline> {
        if draw_pending {
            return Some(Deadline::Immediate);
        }
        if self.members.is_empty() {
            return None;
        }
        Some(match self.last_frame {
            Some(last) => Deadline::At(last + self.interval),
            None => Deadline::Immediate,
        })
    }

    /// Advances every active animation once and drops the finished ones.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let was_active = !self.members.is_empty();
        let before = self.members.len();
        self.members.retain(|_, anim| anim.advance(now));
        self.last_frame = Some(now);
        TickOutcome {
            advanced: before,
            finished: before - self.members.len(),
            was_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn counting(limit: u32, calls: Rc<Cell<u32>>) -> Box<dyn Animation> {
        Box::new(move |_now: Instant| {
            calls.set(calls.get() + 1);
            calls.get() <= limit
        })
    }

    #[test]
    fn adding_to_empty_set_arms_and_sets_deadline() {
        let mut anims = Animations::new(Duration::from_millis(16));
        assert_eq!(anims.next_deadline(false), None);

        let (_, armed) = anims.add(Box::new(|_: Instant| true));
        assert!(armed, "first add should arm");
        let (_, armed) = anims.add(Box::new(|_: Instant| true));
        assert!(!armed, "second add should not arm again");
        assert!(anims.next_deadline(false).is_some());
    }

    #[test]
    fn deadline_follows_last_frame() {
        let mut anims = Animations::new(Duration::from_millis(16));
        anims.add(Box::new(|_: Instant| true));
        assert_eq!(anims.next_deadline(false), Some(Deadline::Immediate));

        let now = Instant::now();
        anims.tick(now);
        assert_eq!(
            anims.next_deadline(false),
            Some(Deadline::At(now + Duration::from_millis(16)))
        );
        assert_eq!(anims.next_deadline(true), Some(Deadline::Immediate));
    }

    #[test]
    fn finished_animation_leaves_in_same_tick() {
        let calls = Rc::new(Cell::new(0));
        let mut anims = Animations::new(Duration::from_millis(16));
        let (id, _) = anims.add(counting(3, calls.clone()));
        let now = Instant::now();

        for _ in 0..3 {
            let outcome = anims.tick(now);
            assert_eq!(outcome.finished, 0);
            assert!(anims.contains(id));
        }
        let outcome = anims.tick(now);
        assert_eq!(outcome.finished, 1);
        assert!(outcome.was_active);
        assert!(!anims.contains(id), "finished animation must be gone");
        assert_eq!(anims.next_deadline(false), None);

        let outcome = anims.tick(now);
        assert_eq!(calls.get(), 4, "removed animation must not advance again");
        assert!(!outcome.was_active);
    }

    #[test]
    fn explicit_remove_stops_advancing() {
        let calls = Rc::new(Cell::new(0));
        let mut anims = Animations::new(Duration::from_millis(16));
        let (id, _) = anims.add(counting(100, calls.clone()));
        anims.tick(Instant::now());
        assert!(anims.remove(id));
        assert!(!anims.remove(id), "second remove reports absence");
        anims.tick(Instant::now());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn deadline_remaining_saturates() {
        let now = Instant::now();
        assert_eq!(Deadline::At(now).remaining(now + Duration::from_secs(1)), Duration::ZERO);
        assert!(Deadline::At(now).is_due(now));
        assert!(!Deadline::At(now + Duration::from_secs(1)).is_due(now));
    }
}
