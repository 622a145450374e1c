//! Basement mission: repair the bike against the shared countdown
//!
//! Opening the bike pauses the game and starts the drag & drop minigame,
//! which borrows the HUD timer. Success repairs the bike for good and uses up
//! the helmet; failure closes the panel and leaves the bike ready for a retry.

use heavenseve_common::config::BikeConfig;

use crate::engine::FrameTime;
use crate::game::dialog::{DialogueEvent, DialogueOwner};
use crate::game::drag_drop::{DragDropMinigame, DropResult, MinigameOutcome};
use crate::game::flags::{MissionFlag, MissionFlags};
use crate::game::missions::{MissionContext, SubMissionState};

pub struct BikeMission {
    state: SubMissionState,
    minigame: DragDropMinigame,
    panel_open: bool,
    pause_on_open: bool,
    repaired_sprite: bool,
    helmet_item: String,
    success_lines: Vec<String>,
    failed_lines: Vec<String>,
}

impl BikeMission {
    pub fn new(config: &BikeConfig, flags: &MissionFlags) -> Self {
        let mut state = SubMissionState::Locked;
        state.unlock_if(true);
        if flags.bike {
            state = SubMissionState::Completed;
        }
        Self {
            state,
            minigame: DragDropMinigame::new(config),
            panel_open: false,
            pause_on_open: config.pause_on_open,
            repaired_sprite: flags.bike,
            helmet_item: config.helmet_item.clone(),
            success_lines: config.success_lines.clone(),
            failed_lines: config.failed_lines.clone(),
        }
    }

    /// Open the repair panel. Refused once repaired or while already open.
    pub fn open(&mut self, ctx: &mut MissionContext<'_>) -> bool {
        if self.state.is_completed() || self.panel_open {
            return false;
        }
        self.state.retry();
        if !self.state.begin() {
            tracing::debug!("Bike: cannot open from {:?}", self.state);
            return false;
        }
        self.panel_open = true;
        if self.pause_on_open {
            ctx.clock.pause();
        }
        ctx.dialogue.cancel();
        self.minigame.start(ctx.timers);
        tracing::info!("Bike: repair panel opened");
        true
    }

    /// Close the panel and halt the minigame
    pub fn close(&mut self, ctx: &mut MissionContext<'_>) {
        if !self.panel_open {
            return;
        }
        self.panel_open = false;
        if self.pause_on_open {
            ctx.clock.resume();
        }
        self.minigame.stop(ctx.timers);
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.panel_open && self.minigame.pointer_down(x, y)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.panel_open {
            self.minigame.pointer_move(x, y);
        }
    }

    pub fn pointer_up(&mut self, x: f32, y: f32, ctx: &mut MissionContext<'_>) -> Option<MinigameOutcome> {
        if !self.panel_open {
            return None;
        }
        if let DropResult::Placed { id } = self.minigame.pointer_up(x, y, ctx.timers) {
            tracing::debug!("Bike: '{}' fitted ({})", id, self.minigame.progress_text());
        }
        let outcome = self.minigame.take_outcome()?;
        self.handle_outcome(outcome, ctx);
        Some(outcome)
    }

    /// Per-frame update of the minigame's local countdown
    pub fn update(&mut self, time: &FrameTime, ctx: &mut MissionContext<'_>) -> Option<MinigameOutcome> {
        if !self.panel_open {
            return None;
        }
        let outcome = self.minigame.update(time, ctx.timers)?;
        self.handle_outcome(outcome, ctx);
        Some(outcome)
    }

    /// The borrowed shared timer ran out
    pub fn on_shared_timer_expired(&mut self, ctx: &mut MissionContext<'_>) -> Option<MinigameOutcome> {
        let outcome = self.minigame.on_shared_timer_expired(ctx.timers)?;
        self.handle_outcome(outcome, ctx);
        Some(outcome)
    }

    fn handle_outcome(&mut self, outcome: MinigameOutcome, ctx: &mut MissionContext<'_>) {
        match outcome {
            MinigameOutcome::Completed => {
                self.state.complete();
                ctx.flags.set(MissionFlag::Bike);
                ctx.tracker.on_bike_repaired(ctx.flags.flags(), ctx.prompt);
                self.close(ctx);
                self.repaired_sprite = true;
                if ctx.inventory.remove_by_name(&self.helmet_item).is_none() {
                    tracing::debug!("Bike: no '{}' in the inventory", self.helmet_item);
                }
                tracing::info!("Bike repaired");
                self.show_result(&self.success_lines.clone(), ctx);
            }
            MinigameOutcome::Failed => {
                self.state.fail();
                self.close(ctx);
                tracing::info!("Bike repair failed, retry available");
                self.show_result(&self.failed_lines.clone(), ctx);
            }
        }
    }

    fn show_result(&mut self, lines: &[String], ctx: &mut MissionContext<'_>) {
        if lines.is_empty() {
            self.state.retry();
            return;
        }
        ctx.dialogue.show_lines(DialogueOwner::Bike, lines);
    }

    pub fn on_dialogue_event(&mut self, event: &DialogueEvent) {
        if let DialogueEvent::Finished { owner: DialogueOwner::Bike }
        | DialogueEvent::Canceled { owner: DialogueOwner::Bike } = event
        {
            self.state.retry();
        }
    }

    pub fn is_open(&self) -> bool {
        self.panel_open
    }

    pub fn state(&self) -> SubMissionState {
        self.state
    }

    pub fn is_repaired_sprite(&self) -> bool {
        self.repaired_sprite
    }

    pub fn minigame(&self) -> &DragDropMinigame {
        &self.minigame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heavenseve_common::config::GiftData;

    use crate::game::dialog::tests::skip_through;
    use crate::game::missions::tests::Services;
    use crate::game::timer::{ExpiryTarget, SHARED_TIMER_TAG};

    fn place(bike: &mut BikeMission, s: &mut Services, id: &str) -> Option<MinigameOutcome> {
        let item = bike.minigame().items.iter().find(|i| i.id == id).unwrap().rect;
        assert!(bike.pointer_down(item.x + 1.0, item.y + 1.0));
        bike.pointer_move(400.0, 200.0);
        bike.pointer_up(400.0, 200.0, &mut s.ctx())
    }

    #[test]
    fn repair_in_time() {
        let all = MissionFlags { forest: true, room: true, ..Default::default() };
        let mut s = Services::new(all);
        s.inventory.add(GiftData::new("regalo_casco", "Casco", "")).unwrap();
        let mut bike = BikeMission::new(&BikeConfig::default(), s.flags.flags());

        assert!(bike.open(&mut s.ctx()));
        assert!(s.clock.is_paused());
        assert!(!bike.open(&mut s.ctx()));
        assert_eq!(s.timers.get(SHARED_TIMER_TAG).unwrap().text(), "00:10");

        assert_eq!(place(&mut bike, &mut s, "cadena"), None);
        assert_eq!(place(&mut bike, &mut s, "rueda"), None);
        assert_eq!(place(&mut bike, &mut s, "pedal"), Some(MinigameOutcome::Completed));

        assert!(s.flags.flags().bike);
        assert!(bike.state().is_completed());
        assert!(bike.is_repaired_sprite());
        assert!(!bike.is_open());
        assert!(!s.clock.is_paused());
        assert!(!s.inventory.contains_name("Casco"));
        assert_eq!(s.prompt.mission_text(), "Coloca el disco");
        assert_eq!(s.dialogue.owner(), Some(DialogueOwner::Bike));

        // Repaired bikes never reopen
        assert!(!bike.open(&mut s.ctx()));
    }

    #[test]
    fn timeout_then_retry() {
        let mut s = Services::new(MissionFlags::default());
        let mut bike = BikeMission::new(&BikeConfig::default(), s.flags.flags());
        bike.open(&mut s.ctx());
        place(&mut bike, &mut s, "cadena");

        // Paused game, the borrowed timer runs on real time
        let time = FrameTime { delta: 0.0, unscaled_delta: 10.0 };
        let expired = s.timers.tick(&time);
        assert_eq!(expired[0].target, ExpiryTarget::Minigame);
        assert_eq!(bike.on_shared_timer_expired(&mut s.ctx()), Some(MinigameOutcome::Failed));

        assert_eq!(bike.state(), SubMissionState::Failed);
        assert!(!bike.is_open());
        assert!(!s.flags.flags().bike);
        assert_eq!(s.timers.get(SHARED_TIMER_TAG).unwrap().target(), ExpiryTarget::Orchestrator);

        for ev in skip_through(&mut s.dialogue) {
            bike.on_dialogue_event(&ev);
        }
        assert_eq!(bike.state(), SubMissionState::Available);
        assert!(bike.open(&mut s.ctx()));
        assert_eq!(bike.minigame().placed_count(), 0);
    }

    #[test]
    fn repaired_bike_from_flags() {
        let s = Services::new(MissionFlags { bike: true, ..Default::default() });
        let bike = BikeMission::new(&BikeConfig::default(), s.flags.flags());
        assert!(bike.is_repaired_sprite());
        assert!(bike.state().is_completed());
    }
}
