//! Scene flow: everything that moves the player between scenes
//!
//!  - `LevelExit`: a trigger zone with a target scene; Q (or walking past
//!    `limit_x`) starts a realtime delay, then the scene loads
//!  - `PendingSpawn`: where the player appears once the target scene loads
//!  - `TransitionOverlay`: black overlay faded on the unscaled clock
//!  - `CutscenePlayer`: fade in, play, fade out, then the next scene
//!  - `PauseMenu`: Escape toggles the paused state

use heavenseve_common::config::{CutsceneConfig, ExitConfig, ExitRequirement};
use heavenseve_common::{Language, SceneId};

use crate::engine::{ClockMode, FrameTime, GameClock, InputFrame, Key, Vec2};
use crate::game::flags::MissionFlags;
use crate::game::i18n;
use crate::game::prompt::PromptService;
use crate::game::task::{Delay, Fade};

/// Overlay alpha above which it swallows input
pub const OVERLAY_BLOCK_THRESHOLD: f32 = 0.01;

// ─── Level exits ──────────────────────────────────────────────────────────

/// Spawn point handed over to the next scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSpawn {
    pub scene: SceneId,
    pub position: Vec2,
}

impl PendingSpawn {
    /// Take the spawn if it belongs to `loaded`; a spawn for another scene
    /// stays pending.
    pub fn take_for(pending: &mut Option<PendingSpawn>, loaded: SceneId) -> Option<Vec2> {
        match pending {
            Some(spawn) if spawn.scene == loaded => pending.take().map(|s| s.position),
            _ => None,
        }
    }
}

/// Whether an exit's requirement is satisfied
pub fn exit_allowed(requires: ExitRequirement, forest_mission_done: bool, flags: &MissionFlags) -> bool {
    match requires {
        ExitRequirement::None => true,
        ExitRequirement::ForestMission => forest_mission_done || flags.forest,
        ExitRequirement::Finale => flags.finale,
    }
}

#[derive(Debug)]
pub struct LevelExit {
    config: ExitConfig,
    player_inside: bool,
    loading: Option<Delay>,
    delay_seconds: f32,
}

impl LevelExit {
    pub fn new(config: ExitConfig, delay_seconds: f32) -> Self {
        Self {
            config,
            player_inside: false,
            loading: None,
            delay_seconds,
        }
    }

    pub fn target(&self) -> SceneId {
        self.config.target
    }

    pub fn requires(&self) -> ExitRequirement {
        self.config.requires
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    /// Prompt text for the current state
    pub fn prompt_text(&self, allowed: bool, lang: Language) -> String {
        if allowed {
            format!("{} {}", i18n::t(lang, "exit_go_to"), self.config.target)
        } else {
            i18n::t(lang, "exit_locked").to_string()
        }
    }

    pub fn on_player_enter(&mut self, allowed: bool, prompt: &mut PromptService, lang: Language) {
        self.player_inside = true;
        prompt.show_message(self.prompt_text(allowed, lang));
    }

    pub fn on_player_exit(&mut self, prompt: &mut PromptService) {
        self.player_inside = false;
        prompt.hide_message();
    }

    /// Per-frame check. Returns the spawn to remember when the exit starts
    /// loading, through `Started`, and the scene to load once the delay ran.
    pub fn update(&mut self, time: &FrameTime, input: &InputFrame, player_x: f32, allowed: bool) -> ExitEvent {
        if let Some(delay) = &mut self.loading {
            if delay.tick(time) {
                self.loading = None;
                tracing::info!("LevelExit: loading {}", self.config.target);
                return ExitEvent::Load(self.config.target);
            }
            return ExitEvent::None;
        }
        if !allowed {
            return ExitEvent::None;
        }

        let by_key = self.player_inside && input.pressed(Key::Q);
        let by_position = self.config.limit_x.is_some_and(|limit| player_x >= limit - 0.1);
        if !(by_key || by_position) {
            return ExitEvent::None;
        }

        tracing::debug!("LevelExit: {} -> {} in {}s", self.config.scene, self.config.target, self.delay_seconds);
        self.loading = Some(Delay::new(self.delay_seconds, ClockMode::Unscaled));
        let spawn = self.config.spawn.map(|p| PendingSpawn {
            scene: self.config.target,
            position: Vec2::from(p),
        });
        ExitEvent::Started(spawn)
    }
}

/// What a level exit did this frame
#[derive(Debug, Clone, PartialEq)]
pub enum ExitEvent {
    None,
    Started(Option<PendingSpawn>),
    Load(SceneId),
}

// ─── Transition overlay ───────────────────────────────────────────────────

#[derive(Debug)]
pub struct TransitionOverlay {
    alpha: f32,
    fade: Option<Fade>,
}

impl TransitionOverlay {
    pub fn new() -> Self {
        Self { alpha: 0.0, fade: None }
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.fade = None;
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    /// Fade to black
    pub fn fade_out(&mut self, seconds: f32) {
        self.fade_to(1.0, seconds);
    }

    /// Fade back to clear
    pub fn fade_in(&mut self, seconds: f32) {
        self.fade_to(0.0, seconds);
    }

    pub fn fade_to(&mut self, target: f32, seconds: f32) {
        self.fade = Some(Fade::new(self.alpha, target, seconds, ClockMode::Unscaled));
    }

    pub fn update(&mut self, time: &FrameTime) {
        if let Some(fade) = &mut self.fade {
            let done = fade.tick(time);
            self.alpha = fade.value();
            if done {
                self.fade = None;
            }
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn blocks_input(&self) -> bool {
        self.alpha > OVERLAY_BLOCK_THRESHOLD
    }
}

impl Default for TransitionOverlay {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Cutscenes ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CutsceneStage {
    FadingIn,
    Playing,
    FadingOut,
    Done,
}

/// Plays a cutscene scene and then moves on
#[derive(Debug)]
pub struct CutscenePlayer {
    next: SceneId,
    auto_duration: f32,
    fade_seconds: f32,
    elapsed: f32,
    stage: CutsceneStage,
    fade: Fade,
}

impl CutscenePlayer {
    /// The scene a cutscene leads to
    pub fn next_scene(scene: SceneId) -> Option<SceneId> {
        match scene {
            SceneId::CutsceneIntro => Some(SceneId::Bosque),
            SceneId::CutsceneFinal => Some(SceneId::MainMenu),
            _ => None,
        }
    }

    pub fn new(scene: SceneId, config: &CutsceneConfig) -> Option<Self> {
        let next = Self::next_scene(scene)?;
        tracing::info!("Cutscene: {} ({}s, then {})", scene, config.auto_duration_seconds, next);
        Some(Self {
            next,
            auto_duration: config.auto_duration_seconds,
            fade_seconds: config.fade_seconds,
            elapsed: 0.0,
            stage: CutsceneStage::FadingIn,
            fade: Fade::new(1.0, 0.0, config.fade_seconds, ClockMode::Scaled),
        })
    }

    pub fn skip(&mut self) {
        if matches!(self.stage, CutsceneStage::FadingIn | CutsceneStage::Playing) {
            tracing::debug!("Cutscene: skipped");
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.stage = CutsceneStage::FadingOut;
        self.fade = Fade::new(self.fade.value(), 1.0, self.fade_seconds, ClockMode::Scaled);
    }

    /// Advance the cutscene. Returns the next scene once the fade-out ends.
    pub fn update(&mut self, time: &FrameTime, input: &InputFrame) -> Option<SceneId> {
        if input.pressed(Key::Space) {
            self.skip();
        }
        match self.stage {
            CutsceneStage::FadingIn => {
                if self.fade.tick(time) {
                    self.stage = CutsceneStage::Playing;
                }
            }
            CutsceneStage::Playing => {
                self.elapsed += time.delta;
                if self.elapsed >= self.auto_duration {
                    self.finish();
                }
            }
            CutsceneStage::FadingOut => {
                if self.fade.tick(time) {
                    self.stage = CutsceneStage::Done;
                    return Some(self.next);
                }
            }
            CutsceneStage::Done => {}
        }
        None
    }

    /// Black level of the cutscene's own fade
    pub fn fade_alpha(&self) -> f32 {
        match self.stage {
            CutsceneStage::Playing => 0.0,
            CutsceneStage::Done => 1.0,
            _ => self.fade.value(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.stage == CutsceneStage::Done
    }
}

// ─── Pause menu ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct PauseMenu {
    paused: bool,
}

impl PauseMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escape pressed. Returns the new paused state.
    pub fn toggle(&mut self, clock: &mut GameClock) -> bool {
        if self.paused {
            self.resume(clock);
        } else {
            self.paused = true;
            clock.pause();
            tracing::debug!("Pause menu opened");
        }
        self.paused
    }

    pub fn resume(&mut self, clock: &mut GameClock) {
        if self.paused {
            self.paused = false;
            clock.resume();
            tracing::debug!("Pause menu closed");
        }
    }

    /// Forget the paused state without touching the clock (session reset)
    pub fn reset(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
