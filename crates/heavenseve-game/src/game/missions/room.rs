//! Room mission: sort the closet and deliver the plush

use heavenseve_common::config::RoomConfig;

use crate::game::closet::{ClosetEffect, ClosetUi};
use crate::game::dialog::DialogueEvent;
use crate::game::flags::{MissionFlag, MissionFlags};
use crate::game::i18n;
use crate::game::missions::{MissionContext, SubMissionState};

#[derive(Debug)]
pub struct RoomMission {
    state: SubMissionState,
    closet: ClosetUi,
    plush_item: String,
    /// Sorted plushes shown on the shelf and the penguin on the floor
    reward_visible: bool,
}

impl RoomMission {
    pub fn new(config: &RoomConfig, flags: &MissionFlags) -> Self {
        let mut state = SubMissionState::Locked;
        state.unlock_if(true);
        if flags.room {
            state = SubMissionState::Completed;
        }
        Self {
            state,
            closet: ClosetUi::new(config),
            plush_item: config.plush_item.clone(),
            reward_visible: flags.room,
        }
    }

    pub fn on_scene_start(&self, ctx: &mut MissionContext<'_>) {
        let key = if self.state.is_completed() { "line_room_done" } else { "line_room_task" };
        ctx.prompt.show_interaction(i18n::t(ctx.lang, key));
    }

    /// The closet was interacted with
    pub fn open_closet(&mut self, ctx: &mut MissionContext<'_>) -> bool {
        if !self.closet.open(ctx.clock) {
            return false;
        }
        self.state.begin();
        if !self.state.is_completed() {
            ctx.tracker.on_closet_opened(ctx.prompt);
        }
        true
    }

    pub fn close_closet(&mut self, ctx: &mut MissionContext<'_>) {
        self.closet.close(ctx.dialogue, ctx.clock);
    }

    pub fn click_plush(&mut self, index: usize, ctx: &mut MissionContext<'_>) {
        self.closet.click(index, ctx.dialogue, ctx.lang);
    }

    /// Route a dialogue event. Returns damage the player must take.
    pub fn on_dialogue_event(&mut self, event: &DialogueEvent, ctx: &mut MissionContext<'_>) -> u32 {
        let mut damage = 0;
        for effect in self.closet.on_dialogue_event(event, ctx.dialogue, ctx.clock) {
            match effect {
                ClosetEffect::Damage(amount) => damage += amount,
                ClosetEffect::Progress { current, total } => {
                    let title = i18n::t(ctx.lang, "line_room_task");
                    ctx.prompt.show_interaction(format!("{} ({}/{})", title, current, total));
                }
                ClosetEffect::Completed => self.complete(ctx),
            }
        }
        damage
    }

    fn complete(&mut self, ctx: &mut MissionContext<'_>) {
        if self.state.is_completed() {
            return;
        }
        self.state.complete();
        self.reward_visible = true;
        ctx.flags.set(MissionFlag::Room);
        if ctx.inventory.remove_by_name(&self.plush_item).is_none() {
            tracing::debug!("Room: no '{}' in the inventory to deliver", self.plush_item);
        }
        ctx.prompt.show_interaction(i18n::t(ctx.lang, "line_room_done"));
        ctx.tracker.on_closet_completed(ctx.prompt);
        tracing::info!("Room mission completed");
    }

    pub fn closet(&self) -> &ClosetUi {
        &self.closet
    }

    pub fn state(&self) -> SubMissionState {
        self.state
    }

    pub fn reward_visible(&self) -> bool {
        self.reward_visible
    }
}
