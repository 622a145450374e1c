//! Forest mission: find the gifts before time runs out
//!
//! Talking to the NPC starts the mission. Each distinct gift counts once;
//! reaching the target completes it, sets the forest flag and freezes the
//! shared countdown at 00:00. A game over first ends it the other way. Only
//! one of the two outcomes is ever recorded.

use std::collections::HashSet;

use crate::game::flags::{MissionFlag, MissionFlags};
use crate::game::i18n;
use crate::game::missions::{MissionContext, SubMissionState};
use crate::game::timer::SHARED_TIMER_TAG;

/// Distinct gifts counted against a target
#[derive(Debug, Clone, Default)]
pub struct GiftCounter {
    target: usize,
    counted: HashSet<String>,
}

impl GiftCounter {
    pub fn new(target: usize) -> Self {
        Self { target, counted: HashSet::new() }
    }

    /// Count `id`. Returns false for repeats or once the target is reached.
    pub fn count(&mut self, id: &str) -> bool {
        if self.is_complete() || self.counted.contains(id) {
            return false;
        }
        self.counted.insert(id.to_string());
        true
    }

    pub fn current(&self) -> usize {
        self.counted.len()
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn is_complete(&self) -> bool {
        self.counted.len() >= self.target
    }

    pub fn reset(&mut self) {
        self.counted.clear();
    }
}

/// How the forest mission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForestOutcome {
    Completed,
    GameOver,
}

/// Result of a gift pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftOutcome {
    Ignored,
    Counted { current: usize, target: usize },
    Completed,
}

#[derive(Debug)]
pub struct ForestMission {
    state: SubMissionState,
    counter: GiftCounter,
    outcome: Option<ForestOutcome>,
}

impl ForestMission {
    pub fn new(gift_target: usize, flags: &MissionFlags) -> Self {
        let mut mission = Self {
            state: SubMissionState::Locked,
            counter: GiftCounter::new(gift_target),
            outcome: None,
        };
        mission.state.unlock_if(true);
        if flags.forest {
            mission.state = SubMissionState::Completed;
            mission.outcome = Some(ForestOutcome::Completed);
        }
        mission
    }

    /// Set the scene's interaction line
    pub fn on_scene_start(&self, ctx: &mut MissionContext<'_>) {
        if self.state.is_completed() {
            ctx.prompt.show_interaction(i18n::t(ctx.lang, "line_gifts_found"));
        } else {
            ctx.prompt.show_interaction(i18n::find_gifts_line(ctx.lang, self.counter.target()));
        }
    }

    /// The NPC has been talked to. Returns true the first time.
    pub fn start(&mut self, ctx: &mut MissionContext<'_>) -> bool {
        if !self.state.begin() {
            return false;
        }
        tracing::info!("Forest mission started ({} gifts)", self.counter.target());
        self.counter.reset();
        ctx.prompt.show_interaction(i18n::find_gifts_line(ctx.lang, self.counter.target()));
        ctx.tracker.on_talked_to_npc(ctx.prompt);
        true
    }

    pub fn on_gift_collected(&mut self, id: &str, ctx: &mut MissionContext<'_>) -> GiftOutcome {
        if self.state != SubMissionState::InProgress || self.outcome.is_some() {
            tracing::debug!("Forest: gift '{}' ignored ({:?})", id, self.state);
            return GiftOutcome::Ignored;
        }
        if !self.counter.count(id) {
            tracing::debug!("Forest: gift '{}' already counted", id);
            return GiftOutcome::Ignored;
        }

        let (current, target) = (self.counter.current(), self.counter.target());
        tracing::info!("Forest: gift '{}' found ({}/{})", id, current, target);
        ctx.prompt.show_interaction(i18n::counted(ctx.lang, "line_gifts", current, target));
        ctx.tracker.on_gift_progress(current, ctx.prompt);
        if !self.counter.is_complete() {
            return GiftOutcome::Counted { current, target };
        }

        self.state.complete();
        self.outcome = Some(ForestOutcome::Completed);
        ctx.flags.set(MissionFlag::Forest);
        if let Some(timer) = ctx.timers.get_mut(SHARED_TIMER_TAG) {
            timer.stop();
            timer.set_time(0.0);
        }
        ctx.prompt.show_interaction(i18n::t(ctx.lang, "line_gifts_found"));
        ctx.tracker.on_gifts_found(ctx.prompt);
        GiftOutcome::Completed
    }

    /// Record a game over unless the mission already ended
    pub fn on_game_over(&mut self) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(ForestOutcome::GameOver);
        self.state.fail();
        true
    }

    pub fn is_started(&self) -> bool {
        !matches!(self.state, SubMissionState::Locked | SubMissionState::Available)
    }

    pub fn is_completed(&self) -> bool {
        self.state.is_completed()
    }

    pub fn outcome(&self) -> Option<ForestOutcome> {
        self.outcome
    }

    pub fn state(&self) -> SubMissionState {
        self.state
    }

    pub fn gifts(&self) -> &GiftCounter {
        &self.counter
    }
}
