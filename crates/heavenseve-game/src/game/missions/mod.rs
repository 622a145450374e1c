//! Sub-mission controllers
//!
//! Each controller is scene-scoped: built when its scene loads and dropped
//! when it unloads. Progress that must survive lives in the mission flags.
//!
//!   - forest: gifts counted against the target, chased by the enemy
//!   - room: closet plush sorting
//!   - basement: bike repair minigame
//!   - turntable: the finale, gated by the three core missions

pub mod basement;
pub mod forest;
pub mod room;
pub mod turntable;

use heavenseve_common::Language;

use crate::engine::GameClock;
use crate::game::audio::AudioDirector;
use crate::game::dialog::DialogueBox;
use crate::game::flags::MissionFlags;
use crate::game::i18n;
use crate::game::inventory::Inventory;
use crate::game::mission::MissionTracker;
use crate::game::prompt::PromptService;
use crate::game::save::FlagStore;
use crate::game::timer::TimerRegistry;

/// Lifecycle shared by the sub-missions
///
/// `Locked -> Available -> InProgress -> Completed`, or
/// `InProgress -> Failed -> Available` for a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubMissionState {
    #[default]
    Locked,
    Available,
    InProgress,
    Completed,
    Failed,
}

impl SubMissionState {
    /// Locked -> Available once the prerequisites hold
    pub fn unlock_if(&mut self, prerequisites_met: bool) {
        if *self == SubMissionState::Locked && prerequisites_met {
            *self = SubMissionState::Available;
        }
    }

    /// Available -> InProgress. Returns false from any other state.
    pub fn begin(&mut self) -> bool {
        if *self == SubMissionState::Available {
            *self = SubMissionState::InProgress;
            true
        } else {
            false
        }
    }

    /// InProgress -> Completed
    pub fn complete(&mut self) -> bool {
        if *self == SubMissionState::InProgress {
            *self = SubMissionState::Completed;
            true
        } else {
            false
        }
    }

    /// InProgress -> Failed
    pub fn fail(&mut self) -> bool {
        if *self == SubMissionState::InProgress {
            *self = SubMissionState::Failed;
            true
        } else {
            false
        }
    }

    /// Failed -> Available; never back to Locked
    pub fn retry(&mut self) {
        if *self == SubMissionState::Failed {
            *self = SubMissionState::Available;
        }
    }

    pub fn is_completed(&self) -> bool {
        *self == SubMissionState::Completed
    }
}

/// Interaction precondition on the core flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissionGate {
    pub require_all_core: bool,
}

impl MissionGate {
    pub const ALL_CORE: MissionGate = MissionGate { require_all_core: true };

    pub fn can_interact(&self, flags: &MissionFlags) -> bool {
        let can = !self.require_all_core || flags.all_core_completed();
        tracing::debug!(
            "MissionGate: can_interact={} (forest={} room={} bike={})",
            can, flags.forest, flags.room, flags.bike
        );
        can
    }

    pub fn show_locked_message(&self, prompt: &mut PromptService, lang: Language) {
        prompt.show_message(i18n::t(lang, "gate_locked"));
    }
}

/// Session services a controller may touch while handling an event
pub struct MissionContext<'a> {
    pub flags: &'a mut FlagStore,
    pub inventory: &'a mut Inventory,
    pub prompt: &'a mut PromptService,
    pub tracker: &'a mut MissionTracker,
    pub dialogue: &'a mut DialogueBox,
    pub clock: &'a mut GameClock,
    pub timers: &'a mut TimerRegistry,
    pub audio: &'a mut AudioDirector,
    pub lang: Language,
}
