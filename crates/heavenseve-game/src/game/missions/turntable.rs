//! Turntable: the finale
//!
//! Locked until the three core missions are done and the record is in the
//! inventory. Activation is one-way: the disk spins, the music crossfades in
//! and the finale flag is set, so a reloaded basement comes back already
//! playing.

use heavenseve_common::config::TurntableConfig;

use crate::engine::{ClockMode, FrameTime};
use crate::game::flags::{MissionFlag, MissionFlags};
use crate::game::i18n;
use crate::game::missions::{MissionContext, MissionGate};
use crate::game::task::Poll;

/// Result of pressing E on the turntable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateResult {
    AlreadyActive,
    Locked,
    MissingDisk,
    Activated,
}

#[derive(Debug)]
pub struct Turntable {
    disk_item: String,
    gate: MissionGate,
    activated: bool,
    /// Uncovered visual once the core missions are done
    gate_unlocked: bool,
    gate_poll: Poll,
    disk_visible: bool,
    spinning: bool,
    spin_speed: f32,
    angle: f32,
    spin_elapsed: f32,
    stop_after: Option<f32>,
}

impl Turntable {
    pub fn new(config: &TurntableConfig, flags: &MissionFlags) -> Self {
        let activated = flags.finale;
        Self {
            disk_item: config.disk_item.clone(),
            gate: MissionGate::ALL_CORE,
            activated,
            gate_unlocked: flags.all_core_completed(),
            gate_poll: Poll::new(config.gate_poll_seconds, ClockMode::Unscaled),
            disk_visible: activated,
            spinning: activated,
            spin_speed: config.spin_speed,
            angle: 0.0,
            spin_elapsed: 0.0,
            stop_after: config.stop_after_seconds,
        }
    }

    pub fn try_activate(&mut self, ctx: &mut MissionContext<'_>) -> ActivateResult {
        if self.activated {
            return ActivateResult::AlreadyActive;
        }
        if !self.gate.can_interact(ctx.flags.flags()) {
            ctx.prompt.show_message(i18n::t(ctx.lang, "turntable_locked"));
            return ActivateResult::Locked;
        }
        if ctx.inventory.remove_by_name(&self.disk_item).is_none() {
            ctx.prompt.show_message(i18n::t(ctx.lang, "turntable_need_disk"));
            return ActivateResult::MissingDisk;
        }

        self.activated = true;
        self.disk_visible = true;
        self.spinning = true;
        self.spin_elapsed = 0.0;
        ctx.audio.play_turntable_track();
        ctx.flags.set(MissionFlag::Finale);
        ctx.prompt.show_interaction(i18n::t(ctx.lang, "line_turntable_done"));
        ctx.tracker.on_place_disk(ctx.prompt);
        tracing::info!("Turntable activated");
        ActivateResult::Activated
    }

    /// A core mission changed; refresh the gate visual now
    pub fn on_core_missions_changed(&mut self, flags: &MissionFlags) {
        self.refresh_gate(flags);
    }

    fn refresh_gate(&mut self, flags: &MissionFlags) {
        let unlocked = flags.all_core_completed();
        if unlocked != self.gate_unlocked {
            tracing::debug!("Turntable: gate visual {}", if unlocked { "uncovered" } else { "covered" });
        }
        self.gate_unlocked = unlocked;
    }

    pub fn update(&mut self, time: &FrameTime, flags: &MissionFlags) {
        if self.gate_poll.tick(time) {
            self.refresh_gate(flags);
        }
        if !self.spinning {
            return;
        }
        self.angle = (self.angle + self.spin_speed * time.delta).rem_euclid(360.0);
        self.spin_elapsed += time.delta;
        if let Some(limit) = self.stop_after {
            if self.spin_elapsed >= limit {
                self.spinning = false;
            }
        }
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn is_gate_unlocked(&self) -> bool {
        self.gate_unlocked
    }

    pub fn is_disk_visible(&self) -> bool {
        self.disk_visible
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    /// Disk rotation in degrees, `0..360`
    pub fn angle(&self) -> f32 {
        self.angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heavenseve_common::config::GiftData;

    use crate::engine::sound_engine::Channel;
    use crate::game::missions::tests::Services;

    fn core_done() -> MissionFlags {
        MissionFlags { forest: true, room: true, bike: true, finale: false }
    }

    #[test]
    fn locked_until_core_missions() {
        let mut s = Services::new(MissionFlags { forest: true, ..Default::default() });
        s.inventory.add(GiftData::new("regalo_disco", "Disco", "")).unwrap();
        let mut table = Turntable::new(&TurntableConfig::default(), s.flags.flags());

        assert_eq!(table.try_activate(&mut s.ctx()), ActivateResult::Locked);
        assert_eq!(s.prompt.message(), Some("Completa las otras misiones primero."));
        assert!(s.inventory.contains_name("Disco"));
        assert!(!s.flags.flags().finale);
    }

    #[test]
    fn needs_the_disk() {
        let mut s = Services::new(core_done());
        let mut table = Turntable::new(&TurntableConfig::default(), s.flags.flags());
        assert_eq!(table.try_activate(&mut s.ctx()), ActivateResult::MissingDisk);
        assert_eq!(s.prompt.message(), Some("Necesitas el disco para usar el tocadiscos."));
        assert!(!table.is_activated());
    }

    #[test]
    fn activation_is_one_way() {
        let mut s = Services::new(core_done());
        s.inventory.add(GiftData::new("regalo_disco", "Disco", "")).unwrap();
        s.inventory.add(GiftData::new("regalo_extra", "Disco", "")).unwrap();
        let mut table = Turntable::new(&TurntableConfig::default(), s.flags.flags());

        assert_eq!(table.try_activate(&mut s.ctx()), ActivateResult::Activated);
        assert!(s.flags.flags().finale);
        assert_eq!(s.inventory.len(), 1);
        assert!(table.is_disk_visible());
        assert!(s.audio.is_turntable_activated());
        assert!(s.output.channel(Channel::Turntable).is_playing());
        assert_eq!(s.prompt.interaction(), "- Tocadiscos activado");
        assert_eq!(s.prompt.mission_text(), "Tocadiscos activado");

        // Repeats consume nothing
        assert_eq!(table.try_activate(&mut s.ctx()), ActivateResult::AlreadyActive);
        assert_eq!(s.inventory.len(), 1);

        // A reloaded scene restores from the flag
        let again = Turntable::new(&TurntableConfig::default(), s.flags.flags());
        assert!(again.is_activated());
        assert!(again.is_spinning());
    }

    #[test]
    fn gate_visual_follows_poll_and_notifications() {
        let mut flags = MissionFlags { forest: true, room: true, ..Default::default() };
        let mut table = Turntable::new(&TurntableConfig::default(), &flags);
        assert!(!table.is_gate_unlocked());

        flags.bike = true;
        table.update(&FrameTime { delta: 0.0, unscaled_delta: 0.25 }, &flags);
        assert!(!table.is_gate_unlocked());
        table.update(&FrameTime { delta: 0.0, unscaled_delta: 0.25 }, &flags);
        assert!(table.is_gate_unlocked());

        let mut other = Turntable::new(&TurntableConfig::default(), &MissionFlags::default());
        other.on_core_missions_changed(&flags);
        assert!(other.is_gate_unlocked());
    }

    #[test]
    fn spins_on_scaled_time() {
        let config = TurntableConfig { stop_after_seconds: Some(1.0), ..Default::default() };
        let flags = MissionFlags { finale: true, ..core_done() };
        let mut table = Turntable::new(&config, &flags);
        table.update(&FrameTime { delta: 0.0, unscaled_delta: 0.5 }, &flags);
        assert_eq!(table.angle(), 0.0);
        table.update(&FrameTime { delta: 0.25, unscaled_delta: 0.25 }, &flags);
        assert!((table.angle() - 315.0).abs() < 1e-3);
        table.update(&FrameTime { delta: 1.0, unscaled_delta: 1.0 }, &flags);
        assert!(!table.is_spinning());
    }
}
