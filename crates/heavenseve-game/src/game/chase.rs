//! Chasing enemy of the forest mission
//!
//!   - Spawned by the delayed event once the NPC has been talked to
//!   - x always moves toward the player; speed ramps from `base_speed` to
//!     `max_speed` over `mission_total_time`
//!   - y depends on the follow mode: locked, clamped to a band, or free
//!   - Touching the player while chasing deals `hit_damage`

use heavenseve_common::config::{EnemyConfig, FollowMode};

use crate::engine::{self, Vec2};

#[derive(Debug, Clone)]
pub struct EnemyChase {
    config: EnemyConfig,
    pub position: Vec2,
    elapsed: f32,
    current_speed: f32,
    chasing: bool,
    spawned: bool,
    /// y held by `FollowMode::HorizontalOnly`
    y_locked: f32,
    /// -1 when facing left
    facing: f32,
}

impl EnemyChase {
    pub fn new(config: EnemyConfig) -> Self {
        let position = Vec2::from(config.spawn);
        Self {
            y_locked: position.y,
            config,
            position,
            elapsed: 0.0,
            current_speed: 0.0,
            chasing: false,
            spawned: false,
            facing: 1.0,
        }
    }

    /// Make the enemy appear at its spawn point and start chasing
    pub fn spawn(&mut self) {
        self.position = Vec2::from(self.config.spawn);
        self.spawned = true;
        tracing::info!("Enemy: spawned at ({:.1}, {:.1})", self.position.x, self.position.y);
        self.begin_chase();
    }

    pub fn begin_chase(&mut self) {
        self.chasing = true;
        self.elapsed = 0.0;
        self.y_locked = self.position.y;
    }

    pub fn stop_chase(&mut self) {
        if self.chasing {
            tracing::debug!("Enemy: chase stopped");
        }
        self.chasing = false;
    }

    /// Back to the idle, unspawned state
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.current_speed = 0.0;
        self.chasing = false;
        self.spawned = false;
        self.position = Vec2::from(self.config.spawn);
        self.y_locked = self.position.y;
    }

    /// Move one step toward `player` (`dt` on the scaled clock)
    pub fn step(&mut self, player: Vec2, dt: f32) {
        if !self.chasing || dt <= 0.0 {
            return;
        }
        self.elapsed += dt;
        let t = if self.config.mission_total_time > 0.0 {
            (self.elapsed / self.config.mission_total_time).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.current_speed = self.config.base_speed + (self.config.max_speed - self.config.base_speed) * t;

        let next_x = engine::move_towards(self.position.x, player.x, self.current_speed * dt);
        let vertical = self.config.max_vertical_speed * dt;
        let next_y = match self.config.follow {
            FollowMode::HorizontalOnly => self.y_locked,
            FollowMode::FollowYClamped => {
                let desired = player.y.clamp(self.config.min_y, self.config.max_y);
                engine::move_towards(self.position.y, desired, vertical)
            }
            FollowMode::Full2d => engine::move_towards(self.position.y, player.y, vertical),
        };
        self.position = Vec2::new(next_x, next_y);
        self.facing = if player.x < self.position.x { -1.0 } else { 1.0 };
        tracing::trace!("Enemy: ({:.2}, {:.2}) speed {:.2}", next_x, next_y, self.current_speed);
    }

    /// Damage dealt when touching the player; none unless chasing
    pub fn contact_damage(&self) -> Option<u32> {
        self.chasing.then_some(self.config.hit_damage)
    }

    pub fn is_chasing(&self) -> bool {
        self.chasing
    }

    pub fn is_spawned(&self) -> bool {
        self.spawned
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn facing(&self) -> f32 {
        self.facing
    }
}
