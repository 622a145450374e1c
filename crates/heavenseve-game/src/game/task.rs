//! Cooperative tasks: fades, delays and polls advanced once per frame
//!
//! Each task names the clock it runs on. Dropping or clearing a task cancels
//! it on the spot; nothing keeps running behind the owner's back.

use crate::engine::{ClockMode, FrameTime};

/// Linear interpolation between `from` and `to` over `duration` seconds
#[derive(Debug, Clone, PartialEq)]
pub struct Fade {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    clock: ClockMode,
}

impl Fade {
    pub fn new(from: f32, to: f32, duration: f32, clock: ClockMode) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            clock,
        }
    }

    /// Advance the fade. Returns true once it has reached `to`.
    pub fn tick(&mut self, time: &FrameTime) -> bool {
        self.elapsed += time.on(self.clock);
        self.is_done()
    }

    pub fn value(&self) -> f32 {
        if self.is_done() {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn target(&self) -> f32 {
        self.to
    }
}

/// Fires once after a delay
#[derive(Debug, Clone, PartialEq)]
pub struct Delay {
    remaining: f32,
    clock: ClockMode,
    fired: bool,
}

impl Delay {
    pub fn new(seconds: f32, clock: ClockMode) -> Self {
        Self {
            remaining: seconds,
            clock,
            fired: false,
        }
    }

    /// Returns true on the frame the delay runs out
    pub fn tick(&mut self, time: &FrameTime) -> bool {
        if self.fired {
            return false;
        }
        self.remaining -= time.on(self.clock);
        self.fired = self.remaining <= 0.0;
        self.fired
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }
}

/// Fires every `interval` seconds
#[derive(Debug, Clone, PartialEq)]
pub struct Poll {
    interval: f32,
    acc: f32,
    clock: ClockMode,
}

impl Poll {
    pub fn new(interval: f32, clock: ClockMode) -> Self {
        Self {
            interval: interval.max(0.0),
            acc: 0.0,
            clock,
        }
    }

    /// Returns true when a poll is due this frame
    pub fn tick(&mut self, time: &FrameTime) -> bool {
        self.acc += time.on(self.clock);
        if self.acc >= self.interval {
            self.acc = 0.0;
            true
        } else {
            false
        }
    }
}

/// Delayed events, each on its own clock
#[derive(Debug)]
pub struct Scheduler<E> {
    entries: Vec<(Delay, E)>,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn schedule(&mut self, seconds: f32, clock: ClockMode, event: E) {
        self.entries.push((Delay::new(seconds, clock), event));
    }

    /// Advance every entry and hand back the events that came due, in
    /// scheduling order
    pub fn tick(&mut self, time: &FrameTime) -> Vec<E> {
        let mut due = Vec::new();
        let mut pending = Vec::with_capacity(self.entries.len());
        for (mut delay, event) in self.entries.drain(..) {
            if delay.tick(time) {
                due.push(event);
            } else {
                pending.push((delay, event));
            }
        }
        self.entries = pending;
        due
    }

    /// Drop every entry matching `pred`
    pub fn cancel_where(&mut self, pred: impl Fn(&E) -> bool) {
        self.entries.retain(|(_, e)| !pred(e));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(delta: f32, unscaled: f32) -> FrameTime {
        FrameTime { delta, unscaled_delta: unscaled }
    }

    #[test]
    fn fade_reaches_target() {
        let mut fade = Fade::new(0.0, 1.0, 1.0, ClockMode::Unscaled);
        assert!(!fade.tick(&frame(0.0, 0.5)));
        assert!((fade.value() - 0.5).abs() < 1e-5);
        assert!(fade.tick(&frame(0.0, 0.6)));
        assert_eq!(fade.value(), 1.0);
    }

    #[test]
    fn unscaled_fade_runs_while_paused() {
        let mut scaled = Fade::new(1.0, 0.0, 0.35, ClockMode::Scaled);
        let mut unscaled = Fade::new(1.0, 0.0, 0.35, ClockMode::Unscaled);
        for _ in 0..10 {
            scaled.tick(&frame(0.0, 0.05));
            unscaled.tick(&frame(0.0, 0.05));
        }
        assert_eq!(scaled.value(), 1.0);
        assert!(unscaled.is_done());
    }

    #[test]
    fn zero_length_fade_is_done() {
        let fade = Fade::new(0.0, 0.8, 0.0, ClockMode::Scaled);
        assert!(fade.is_done());
        assert_eq!(fade.value(), 0.8);
    }

    #[test]
    fn delay_fires_once() {
        let mut delay = Delay::new(1.0, ClockMode::Scaled);
        assert!(!delay.tick(&frame(0.6, 0.6)));
        assert!(delay.tick(&frame(0.6, 0.6)));
        assert!(!delay.tick(&frame(0.6, 0.6)));
    }

    #[test]
    fn poll_fires_every_interval() {
        let mut poll = Poll::new(0.5, ClockMode::Unscaled);
        let fired: Vec<bool> = (0..4).map(|_| poll.tick(&frame(0.0, 0.25))).collect();
        assert_eq!(fired, vec![false, true, false, true]);
    }

    #[test]
    fn scheduler_orders_and_cancels() {
        let mut s: Scheduler<&str> = Scheduler::new();
        s.schedule(1.0, ClockMode::Scaled, "spawn");
        s.schedule(0.5, ClockMode::Unscaled, "load");
        s.schedule(2.0, ClockMode::Scaled, "later");

        // Paused: only the unscaled entry moves
        assert_eq!(s.tick(&frame(0.0, 0.6)), vec!["load"]);
        assert_eq!(s.tick(&frame(1.0, 1.0)), vec!["spawn"]);
        s.cancel_where(|e| *e == "later");
        assert!(s.is_empty());
    }
}
