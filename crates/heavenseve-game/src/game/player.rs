//! Player motor: two-axis movement on the scaled clock

use heavenseve_common::config::PlayerConfig;

use crate::engine::Vec2;

#[derive(Debug, Clone)]
pub struct PlayerMotor {
    pub position: Vec2,
    move_speed: f32,
    enabled: bool,
    /// -1 when facing left
    facing: f32,
}

impl PlayerMotor {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            position: Vec2::from(config.spawn),
            move_speed: config.move_speed,
            enabled: true,
            facing: 1.0,
        }
    }

    /// Move by `axis` (capped to length 1) for `dt` scaled seconds
    pub fn step(&mut self, axis: Vec2, dt: f32) {
        if !self.enabled {
            return;
        }
        self.facing = if axis.x < 0.0 { -1.0 } else { 1.0 };
        let movement = if axis.length() > 1.0 { axis.normalized() } else { axis };
        self.position.x += movement.x * self.move_speed * dt;
        self.position.y += movement.y * self.move_speed * dt;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn facing(&self) -> f32 {
        self.facing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motor() -> PlayerMotor {
        PlayerMotor::new(&PlayerConfig { spawn: [0.0, 0.0], ..PlayerConfig::default() })
    }

    #[test]
    fn diagonal_is_not_faster() {
        let mut p = motor();
        p.step(Vec2::new(1.0, 1.0), 1.0);
        assert!((p.position.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn facing_follows_x() {
        let mut p = motor();
        p.step(Vec2::new(-0.5, 0.0), 0.1);
        assert_eq!(p.facing(), -1.0);
        assert!((p.position.x + 0.25).abs() < 1e-5);
        p.step(Vec2::ZERO, 0.1);
        assert_eq!(p.facing(), 1.0);
    }

    #[test]
    fn paused_or_disabled_does_not_move() {
        let mut p = motor();
        p.step(Vec2::new(1.0, 0.0), 0.0);
        assert_eq!(p.position, Vec2::ZERO);
        p.set_enabled(false);
        p.step(Vec2::new(1.0, 0.0), 1.0);
        assert_eq!(p.position, Vec2::ZERO);
    }
}
