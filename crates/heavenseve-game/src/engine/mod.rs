//! Engine seam: what the host engine feeds the gameplay layer each frame
//! and what it gets back.
//!
//! Rendering, physics and scene asset loading live on the other side of this
//! seam. Per frame the host hands over the real frame time and an
//! `InputFrame`; in return it drains `HostCommand`s (scene loads, quit) and
//! reads UI state off the session.

pub mod sound_engine;

use serde::{Deserialize, Serialize};

use heavenseve_common::SceneId;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Keys the gameplay layer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    E,
    Q,
    Space,
    Return,
    I,
    Escape,
    R,
    M,
}

/// Keys pressed this frame plus the movement axes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFrame {
    pressed: Vec<Key>,
    pub axis: Vec2,
}

impl InputFrame {
    /// A frame without input
    pub fn none() -> Self {
        Self::default()
    }

    /// A frame where the given keys went down
    pub fn keys(keys: &[Key]) -> Self {
        Self {
            pressed: keys.to_vec(),
            axis: Vec2::ZERO,
        }
    }

    pub fn with_axis(mut self, x: f32, y: f32) -> Self {
        self.axis = Vec2::new(x, y);
        self
    }

    /// Whether `key` went down this frame
    pub fn pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn any_pressed(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.pressed(*k))
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// World-space 2D vector (scene units)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Same direction, length 1 (zero stays zero)
    pub fn normalized(&self) -> Vec2 {
        let len = self.length();
        if len <= f32::EPSILON {
            Vec2::ZERO
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    /// Step from `self` toward `target` by at most `max_delta`
    pub fn move_towards(self, target: Vec2, max_delta: f32) -> Vec2 {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist <= max_delta || dist <= f32::EPSILON {
            target
        } else {
            Vec2::new(self.x + dx / dist * max_delta, self.y + dy / dist * max_delta)
        }
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(v: [f32; 2]) -> Self {
        Vec2::new(v[0], v[1])
    }
}

/// Scalar version of `Vec2::move_towards`
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Which clock a countdown, fade or delay runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockMode {
    /// Game time, stops while paused
    Scaled,
    /// Real time, keeps running while paused
    Unscaled,
}

/// Frame deltas for both clocks
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    pub delta: f32,
    pub unscaled_delta: f32,
}

impl FrameTime {
    pub fn on(&self, clock: ClockMode) -> f32 {
        match clock {
            ClockMode::Scaled => self.delta,
            ClockMode::Unscaled => self.unscaled_delta,
        }
    }
}

/// Global game clock with a time scale (0 while paused)
#[derive(Debug, Clone)]
pub struct GameClock {
    time_scale: f32,
    pub time: f32,
    pub unscaled_time: f32,
}

impl GameClock {
    pub fn new() -> Self {
        Self {
            time_scale: 1.0,
            time: 0.0,
            unscaled_time: 0.0,
        }
    }

    /// Advance by one real frame and return the deltas for it
    pub fn advance(&mut self, real_dt: f32) -> FrameTime {
        let real_dt = real_dt.max(0.0);
        let delta = real_dt * self.time_scale;
        self.time += delta;
        self.unscaled_time += real_dt;
        FrameTime {
            delta,
            unscaled_delta: real_dt,
        }
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn pause(&mut self) {
        self.time_scale = 0.0;
    }

    pub fn resume(&mut self) {
        self.time_scale = 1.0;
    }

    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Host commands
// ---------------------------------------------------------------------------

/// Requests the gameplay layer hands back to the host engine
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// Load a scene; the host answers with `Session::on_scene_loaded`
    LoadScene(SceneId),
    /// Close the application
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_caps_diagonal_input() {
        let v = Vec2::new(1.0, 1.0).normalized();
        assert!((v.length() - 1.0).abs() < 1e-5);
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
    }

    #[test]
    fn move_towards_never_overshoots() {
        let p = Vec2::new(0.0, 0.0).move_towards(Vec2::new(3.0, 4.0), 1.0);
        assert!((p.length() - 1.0).abs() < 1e-5);
        let p = Vec2::new(0.0, 0.0).move_towards(Vec2::new(0.5, 0.0), 1.0);
        assert_eq!(p, Vec2::new(0.5, 0.0));
        assert_eq!(move_towards(0.0, 10.0, 2.0), 2.0);
        assert_eq!(move_towards(9.5, 10.0, 2.0), 10.0);
        assert_eq!(move_towards(0.0, -10.0, 2.0), -2.0);
    }

    #[test]
    fn paused_clock_keeps_unscaled_time() {
        let mut clock = GameClock::new();
        let t = clock.advance(0.5);
        assert_eq!(t.delta, 0.5);
        clock.pause();
        let t = clock.advance(0.5);
        assert_eq!(t.delta, 0.0);
        assert_eq!(t.unscaled_delta, 0.5);
        assert_eq!(t.on(ClockMode::Unscaled), 0.5);
        assert_eq!(clock.time, 0.5);
        assert_eq!(clock.unscaled_time, 1.0);
        clock.resume();
        assert!(!clock.is_paused());
    }

    #[test]
    fn input_frame_queries() {
        let input = InputFrame::keys(&[Key::Space, Key::Q]).with_axis(1.0, 0.0);
        assert!(input.pressed(Key::Space));
        assert!(!input.pressed(Key::E));
        assert!(input.any_pressed(&[Key::Return, Key::Q]));
        assert_eq!(input.axis, Vec2::new(1.0, 0.0));
    }
}
