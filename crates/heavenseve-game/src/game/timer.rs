//! Countdown timers
//!
//! A countdown either belongs to its owner or sits in the `TimerRegistry`
//! under a stable tag so several controllers can borrow it (the HUD timer,
//! tagged `GameTimer`). On reaching zero it stops and reports where the
//! expiry goes: to whoever borrowed it, or back to the orchestrator.

use std::collections::HashMap;

use crate::engine::{ClockMode, FrameTime};

/// Tag of the HUD countdown shared by the forest mission and the minigames
pub const SHARED_TIMER_TAG: &str = "GameTimer";

/// Who hears about an expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryTarget {
    /// Default: the session's time-expired handler
    Orchestrator,
    /// The running minigame borrowed the timer
    Minigame,
}

/// A single countdown
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    remaining: f32,
    running: bool,
    clock: ClockMode,
    target: ExpiryTarget,
}

impl Countdown {
    pub fn new(clock: ClockMode) -> Self {
        Self {
            remaining: 0.0,
            running: false,
            clock,
            target: ExpiryTarget::Orchestrator,
        }
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.remaining = seconds.max(0.0);
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn set_clock(&mut self, clock: ClockMode) {
        self.clock = clock;
    }

    pub fn set_target(&mut self, target: ExpiryTarget) {
        self.target = target;
    }

    pub fn target(&self) -> ExpiryTarget {
        self.target
    }

    pub fn clock(&self) -> ClockMode {
        self.clock
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Advance one frame. Returns the expiry target on the frame it hits zero.
    pub fn tick(&mut self, time: &FrameTime) -> Option<ExpiryTarget> {
        if !self.running {
            return None;
        }
        self.remaining -= time.on(self.clock);
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.running = false;
            Some(self.target)
        } else {
            None
        }
    }

    /// "MM:SS"
    pub fn text(&self) -> String {
        format_mm_ss(self.remaining)
    }
}

/// Minutes and seconds, both floored: 75.9 -> "01:15"
pub fn format_mm_ss(seconds: f32) -> String {
    let t = seconds.max(0.0);
    let minutes = (t / 60.0).floor() as u32;
    let secs = (t % 60.0).floor() as u32;
    format!("{:02}:{:02}", minutes, secs)
}

/// Whole seconds left, rounded up: 9.2 -> "10"
pub fn format_ss(seconds: f32) -> String {
    format!("{:02}", seconds.max(0.0).ceil() as u32)
}

/// An expiry reported by the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expired {
    pub tag: String,
    pub target: ExpiryTarget,
}

/// Countdowns reachable by tag
#[derive(Debug, Default)]
pub struct TimerRegistry {
    timers: HashMap<String, Countdown>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tag: &str, countdown: Countdown) {
        self.timers.insert(tag.to_string(), countdown);
    }

    pub fn get(&self, tag: &str) -> Option<&Countdown> {
        self.timers.get(tag)
    }

    pub fn get_mut(&mut self, tag: &str) -> Option<&mut Countdown> {
        self.timers.get_mut(tag)
    }

    /// Advance every countdown and collect expiries
    pub fn tick(&mut self, time: &FrameTime) -> Vec<Expired> {
        let mut expired = Vec::new();
        for (tag, countdown) in self.timers.iter_mut() {
            if let Some(target) = countdown.tick(time) {
                tracing::debug!("Timer '{}' expired -> {:?}", tag, target);
                expired.push(Expired { tag: tag.clone(), target });
            }
        }
        expired
    }
}
