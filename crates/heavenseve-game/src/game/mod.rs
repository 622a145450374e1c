//! Game logic: the session, its services and the scene controllers
//!
//! Scene mapping:
//!   MainMenu       - play / quit
//!   CutsceneIntro  - intro clip, then Bosque
//!   Bosque         - NPC, gifts, chasing enemy, shared countdown
//!   Exterior, Sala - walk-through scenes with exits
//!   Cuarto         - closet plush sorting
//!   Sotano         - bike repair minigame, turntable finale
//!   CutsceneFinal  - ending clip, then MainMenu
//!
//! `Session` owns what survives scene loads (flags, inventory, prompt texts,
//! dialogue box, shared timer, audio) plus the controllers of the scene that
//! is loaded. The host calls `update` once per frame, reports triggers and
//! pointer events through the other methods, and drains `HostCommand`s.

pub mod audio;
pub mod chase;
pub mod closet;
pub mod dialog;
pub mod drag_drop;
pub mod flags;
pub mod game_over;
pub mod health;
pub mod i18n;
pub mod interaction;
pub mod inventory;
pub mod mission;
pub mod missions;
pub mod player;
pub mod prompt;
pub mod save;
pub mod scenes;
pub mod task;
pub mod timer;

#[cfg(test)]
mod tests;

use heavenseve_common::config::DialogueTrigger;
use heavenseve_common::{GameConfig, Language, SceneId};

use crate::engine::sound_engine::AudioOutput;
use crate::engine::{ClockMode, FrameTime, GameClock, HostCommand, InputFrame, Key};
use crate::game::audio::AudioDirector;
use crate::game::chase::EnemyChase;
use crate::game::dialog::{DialogueBox, DialogueEvent, ScriptedDialogue};
use crate::game::drag_drop::MinigameOutcome;
use crate::game::flags::MissionFlags;
use crate::game::game_over::{GameOverChoice, GameOverPanel};
use crate::game::health::Health;
use crate::game::interaction::{InteractAction, Interactable, InteractableKind, PlayerInteraction};
use crate::game::inventory::Inventory;
use crate::game::mission::{MissionPhase, MissionTracker};
use crate::game::missions::basement::BikeMission;
use crate::game::missions::forest::{ForestMission, GiftOutcome};
use crate::game::missions::room::RoomMission;
use crate::game::missions::turntable::{ActivateResult, Turntable};
use crate::game::missions::MissionContext;
use crate::game::player::PlayerMotor;
use crate::game::prompt::PromptService;
use crate::game::save::{FlagStore, SaveManager};
use crate::game::scenes::{CutscenePlayer, ExitEvent, LevelExit, PauseMenu, PendingSpawn, TransitionOverlay};
use crate::game::task::Scheduler;
use crate::game::timer::{Countdown, ExpiryTarget, TimerRegistry, SHARED_TIMER_TAG};

/// Delayed orchestrator events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEvent {
    SpawnEnemy,
}

// ---------------------------------------------------------------------------
// Scene controllers
// ---------------------------------------------------------------------------

/// Controllers of the loaded scene, dropped on the next load
#[derive(Default)]
struct SceneControllers {
    forest: Option<ForestMission>,
    npc: Option<ScriptedDialogue>,
    room: Option<RoomMission>,
    bike: Option<BikeMission>,
    turntable: Option<Turntable>,
    cutscene: Option<CutscenePlayer>,
    exits: Vec<LevelExit>,
    interactables: Vec<Interactable>,
}

impl SceneControllers {
    fn build(scene: SceneId, config: &GameConfig, flags: &MissionFlags) -> Self {
        let mut controllers = SceneControllers::default();
        match scene {
            SceneId::Bosque => {
                controllers.forest = Some(ForestMission::new(config.forest.gift_target, flags));
                controllers.npc = Some(ScriptedDialogue::new(config.forest.npc.clone()));
            }
            SceneId::Cuarto => controllers.room = Some(RoomMission::new(&config.room, flags)),
            SceneId::Sotano => {
                controllers.bike = Some(BikeMission::new(&config.bike, flags));
                controllers.turntable = Some(Turntable::new(&config.turntable, flags));
            }
            _ => controllers.cutscene = CutscenePlayer::new(scene, &config.cutscene),
        }

        let gift_ids: Vec<String> = config.gifts.iter().map(|g| g.id.clone()).collect();
        controllers.interactables = interaction::scene_interactables(scene, &gift_ids);
        controllers.exits = config
            .transitions
            .exits
            .iter()
            .filter(|exit| exit.scene == scene)
            .map(|exit| LevelExit::new(exit.clone(), config.transitions.level_change_delay))
            .collect();
        controllers
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Central game state
pub struct Session {
    config: GameConfig,
    lang: Language,
    /// Scene reported by the last `on_scene_loaded`
    scene: Option<SceneId>,
    clock: GameClock,

    flags: FlagStore,
    inventory: Inventory,
    prompt: PromptService,
    dialogue: DialogueBox,
    timers: TimerRegistry,
    tracker: MissionTracker,
    audio: AudioDirector,

    health: Health,
    chase: EnemyChase,
    player: PlayerMotor,
    interaction: PlayerInteraction,

    scheduler: Scheduler<SessionEvent>,
    game_over: GameOverPanel,
    overlay: TransitionOverlay,
    pause: PauseMenu,
    pending_spawn: Option<PendingSpawn>,
    stage: SceneControllers,

    /// The NPC has been talked to in this forest visit
    mission_started: bool,
    commands: Vec<HostCommand>,
}

impl Session {
    pub fn new(config: GameConfig, save: SaveManager, output: Box<dyn AudioOutput>) -> Self {
        let lang = config.language;
        let mut timers = TimerRegistry::new();
        timers.register(SHARED_TIMER_TAG, Countdown::new(ClockMode::Scaled));

        let mut audio = AudioDirector::new(config.audio.clone(), output);
        audio.start();

        let flags = FlagStore::open(save);
        tracing::info!("Session started (language {}, flags {:?})", lang.code(), flags.flags());

        Self {
            lang,
            scene: None,
            clock: GameClock::new(),
            inventory: Inventory::new(),
            prompt: PromptService::new(),
            dialogue: DialogueBox::new(&config.dialogue),
            timers,
            tracker: MissionTracker::new(lang, config.forest.gift_target),
            audio,
            health: Health::new(config.player.max_hits),
            chase: EnemyChase::new(config.enemy.clone()),
            player: PlayerMotor::new(&config.player),
            interaction: PlayerInteraction::new(true),
            scheduler: Scheduler::new(),
            game_over: GameOverPanel::new(config.transitions.game_over_fade_seconds),
            overlay: TransitionOverlay::new(),
            pause: PauseMenu::new(),
            pending_spawn: None,
            stage: SceneControllers::default(),
            mission_started: false,
            commands: Vec::new(),
            flags,
            config,
        }
    }

    /// Borrow the scene controllers and the services they act on, separately
    fn split(&mut self) -> (&mut SceneControllers, MissionContext<'_>) {
        let ctx = MissionContext {
            flags: &mut self.flags,
            inventory: &mut self.inventory,
            prompt: &mut self.prompt,
            tracker: &mut self.tracker,
            dialogue: &mut self.dialogue,
            clock: &mut self.clock,
            timers: &mut self.timers,
            audio: &mut self.audio,
            lang: self.lang,
        };
        (&mut self.stage, ctx)
    }

    fn load(&mut self, scene: SceneId) {
        tracing::info!("Session: loading {}", scene);
        self.commands.push(HostCommand::LoadScene(scene));
    }

    /// Commands for the host, oldest first
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    // -----------------------------------------------------------------------
    // Scene lifecycle
    // -----------------------------------------------------------------------

    /// The host finished loading `scene`
    pub fn on_scene_loaded(&mut self, scene: SceneId) {
        tracing::info!("Session: entered {}", scene);
        let flags = *self.flags.flags();
        self.scene = Some(scene);

        self.clock.resume();
        self.pause.reset();
        self.game_over.reset();
        self.dialogue.cancel();
        self.inventory.close();
        self.prompt.clear_scene_texts();
        self.scheduler.clear();
        self.health.reset();
        self.chase.reset();
        self.mission_started = false;
        if let Some(timer) = self.timers.get_mut(SHARED_TIMER_TAG) {
            timer.stop();
            timer.set_clock(ClockMode::Scaled);
            timer.set_target(ExpiryTarget::Orchestrator);
            timer.set_time(self.config.forest.mission_duration);
        }

        self.player = PlayerMotor::new(&self.config.player);
        if let Some(position) = PendingSpawn::take_for(&mut self.pending_spawn, scene) {
            tracing::debug!("Session: spawn at ({:.1}, {:.1})", position.x, position.y);
            self.player.teleport(position);
        }
        self.interaction = PlayerInteraction::new(scene == SceneId::Bosque && !flags.forest);

        if scene == SceneId::Bosque && !flags.forest {
            // an unfinished run starts over with every gift back in the forest
            for gift in &self.config.gifts {
                if self.inventory.remove(&gift.id).is_some() {
                    tracing::debug!("Session: returned {} to the forest", gift.id);
                }
            }
        }

        self.stage = SceneControllers::build(scene, &self.config, &flags);
        for object in &mut self.stage.interactables {
            if let InteractableKind::Gift(_) = &object.kind {
                object.disabled = flags.forest;
            }
        }

        self.tracker.on_scene_entered(scene, &flags, &mut self.prompt);
        let (stage, mut ctx) = self.split();
        if let Some(forest) = &stage.forest {
            forest.on_scene_start(&mut ctx);
        }
        if let Some(room) = &stage.room {
            room.on_scene_start(&mut ctx);
        }

        if self.overlay.alpha() > 0.0 {
            self.overlay.fade_in(self.config.transitions.overlay_fade_seconds);
        }
    }

    /// Back to a fresh playthrough: flags, inventory and mission text
    fn reset_session(&mut self) {
        self.flags.reset();
        self.inventory.clear();
        self.tracker = MissionTracker::new(self.lang, self.config.forest.gift_target);
        self.prompt = PromptService::new();
        self.pending_spawn = None;
        self.pause.reset();
        self.mission_started = false;
        tracing::info!("Session reset");
    }

    // -----------------------------------------------------------------------
    // Orchestrator
    // -----------------------------------------------------------------------

    /// First conversation with the NPC: unlocks gifts, starts the countdown
    /// and schedules the enemy. Later calls do nothing.
    pub fn on_talked_to_npc(&mut self) {
        if self.mission_started {
            tracing::debug!("Session: NPC already talked to");
            return;
        }
        self.mission_started = true;
        self.interaction.set_locked(false);
        if self.forest_completed() {
            tracing::debug!("Session: forest already done, nothing to start");
            return;
        }

        let target = self.config.forest.gift_target;
        let (stage, mut ctx) = self.split();
        match stage.forest.as_mut() {
            Some(forest) => {
                forest.start(&mut ctx);
            }
            None => {
                tracing::warn!("Session: NPC talked to outside the forest");
                ctx.prompt.show_interaction(i18n::find_gifts_line(ctx.lang, target));
                ctx.tracker.on_talked_to_npc(ctx.prompt);
            }
        }

        let duration = self.config.forest.mission_duration;
        match self.timers.get_mut(SHARED_TIMER_TAG) {
            Some(timer) => {
                timer.set_clock(ClockMode::Scaled);
                timer.set_target(ExpiryTarget::Orchestrator);
                timer.set_time(duration);
                timer.start();
            }
            None => tracing::warn!("Session: shared timer missing"),
        }
        self.scheduler
            .schedule(self.config.forest.enemy_spawn_delay, ClockMode::Scaled, SessionEvent::SpawnEnemy);
        tracing::info!(
            "Forest mission started: {}s on the clock, enemy in {}s",
            duration,
            self.config.forest.enemy_spawn_delay
        );
    }

    /// Count a gift for the forest mission
    pub fn on_gift_collected(&mut self, id: &str) -> GiftOutcome {
        if !self.mission_started {
            tracing::debug!("Session: gift '{}' before the mission started", id);
            return GiftOutcome::Ignored;
        }
        let (stage, mut ctx) = self.split();
        let Some(forest) = stage.forest.as_mut() else {
            tracing::warn!("Session: gift '{}' collected outside the forest", id);
            return GiftOutcome::Ignored;
        };
        let outcome = forest.on_gift_collected(id, &mut ctx);
        if outcome == GiftOutcome::Completed {
            self.chase.stop_chase();
            self.scheduler.cancel_where(|e| *e == SessionEvent::SpawnEnemy);
            tracing::info!("Forest mission completed");
        }
        outcome
    }

    /// The shared countdown reached zero
    pub fn on_time_expired(&mut self) {
        if self.forest_completed() {
            tracing::debug!("Session: time expired after the forest was done");
            return;
        }
        tracing::info!("Time expired");
        self.trigger_game_over();
    }

    pub fn on_player_death(&mut self) {
        tracing::info!("Player died");
        self.trigger_game_over();
    }

    fn trigger_game_over(&mut self) {
        if self.game_over.is_visible() {
            return;
        }
        if let Some(forest) = self.stage.forest.as_mut() {
            forest.on_game_over();
        }
        self.player.set_enabled(false);
        self.interaction.set_enabled(false);
        self.chase.stop_chase();
        self.scheduler.cancel_where(|e| *e == SessionEvent::SpawnEnemy);
        self.clock.pause();
        self.game_over.show();
    }

    fn forest_completed(&self) -> bool {
        self.flags.flags().forest || self.stage.forest.as_ref().is_some_and(ForestMission::is_completed)
    }

    fn spawn_enemy(&mut self) {
        if self.forest_completed() || self.game_over.is_visible() {
            tracing::debug!("Session: enemy spawn skipped");
            return;
        }
        self.chase.reset();
        self.chase.spawn();
    }

    /// Reload the current scene
    pub fn restart_level(&mut self) {
        self.clock.resume();
        self.game_over.hide();
        match self.scene {
            Some(scene) => self.load(scene),
            None => tracing::warn!("Session: restart with no scene loaded"),
        }
    }

    pub fn go_to_main_menu(&mut self) {
        self.clock.resume();
        self.game_over.hide();
        self.reset_session();
        self.load(SceneId::MainMenu);
    }

    pub fn quit(&mut self) {
        self.clock.resume();
        tracing::info!("Session: quit requested");
        self.commands.push(HostCommand::Quit);
    }

    /// Main menu "play": fresh session, then the intro
    pub fn play_game(&mut self) {
        self.clock.resume();
        self.reset_session();
        if self.audio.is_turntable_activated() {
            self.audio.return_to_ambient();
        }
        self.load(SceneId::CutsceneIntro);
    }

    // -----------------------------------------------------------------------
    // Per-frame update
    // -----------------------------------------------------------------------

    /// Advance one frame of `real_dt` seconds
    pub fn update(&mut self, real_dt: f32, input: &InputFrame) {
        let time = self.clock.advance(real_dt);
        self.overlay.update(&time);
        self.audio.update(&time);

        if let Some(choice) = self.game_over.update(&time, input) {
            match choice {
                GameOverChoice::Restart => self.restart_level(),
                GameOverChoice::MainMenu => self.go_to_main_menu(),
                GameOverChoice::Quit => self.quit(),
            }
            return;
        }
        if self.game_over.is_visible() {
            return;
        }

        if input.pressed(Key::Escape) {
            self.toggle_pause();
        }

        // Keys that went to the dialogue box are not gameplay input
        let dialogue_had_input = self.dialogue.is_running();
        for event in self.dialogue.update(time.unscaled_delta, input) {
            self.route_dialogue_event(&event);
        }

        if let Some(cutscene) = self.stage.cutscene.as_mut() {
            if let Some(next) = cutscene.update(&time, input) {
                self.reset_session();
                self.load(next);
            }
            return;
        }

        self.tick_timers(&time);
        for event in self.scheduler.tick(&time) {
            match event {
                SessionEvent::SpawnEnemy => self.spawn_enemy(),
            }
        }

        let outcome = {
            let (stage, mut ctx) = self.split();
            stage.bike.as_mut().and_then(|bike| bike.update(&time, &mut ctx))
        };
        if let Some(outcome) = outcome {
            self.after_bike_outcome(outcome);
        }

        let flags = *self.flags.flags();
        if let Some(turntable) = self.stage.turntable.as_mut() {
            turntable.update(&time, &flags);
        }
        if let Some(npc) = self.stage.npc.as_mut() {
            npc.update(&time, input, &flags, &mut self.dialogue);
        }

        let gameplay = if self.pause.is_paused() || dialogue_had_input {
            InputFrame::none()
        } else {
            input.clone()
        };

        let frozen = self.stage.npc.as_ref().is_some_and(ScriptedDialogue::freezes_movement);
        if !frozen {
            self.player.step(gameplay.axis, time.delta);
        }
        self.chase.step(self.player.position, time.delta);

        if gameplay.pressed(Key::I) {
            self.toggle_inventory();
        }
        if gameplay.pressed(Key::E) {
            self.interact();
        }
        self.update_exits(&time, &gameplay);
    }

    fn tick_timers(&mut self, time: &FrameTime) {
        for expired in self.timers.tick(time) {
            match expired.target {
                ExpiryTarget::Orchestrator => self.on_time_expired(),
                ExpiryTarget::Minigame => {
                    let outcome = {
                        let (stage, mut ctx) = self.split();
                        stage.bike.as_mut().and_then(|bike| bike.on_shared_timer_expired(&mut ctx))
                    };
                    match outcome {
                        Some(outcome) => self.after_bike_outcome(outcome),
                        None => tracing::warn!("Session: '{}' expired with no minigame running", expired.tag),
                    }
                }
            }
        }
    }

    fn route_dialogue_event(&mut self, event: &DialogueEvent) {
        tracing::trace!("Session: dialogue event {:?}", event);
        if let Some(npc) = self.stage.npc.as_mut() {
            npc.on_dialogue_event(event);
        }
        if let Some(bike) = self.stage.bike.as_mut() {
            bike.on_dialogue_event(event);
        }
        let damage = {
            let (stage, mut ctx) = self.split();
            stage.room.as_mut().map_or(0, |room| room.on_dialogue_event(event, &mut ctx))
        };
        self.apply_damage(damage);
    }

    fn update_exits(&mut self, time: &FrameTime, input: &InputFrame) {
        let forest_done = self.forest_completed();
        let flags = *self.flags.flags();
        let player_x = self.player.position.x;
        let events: Vec<ExitEvent> = self
            .stage
            .exits
            .iter_mut()
            .map(|exit| {
                let allowed = scenes::exit_allowed(exit.requires(), forest_done, &flags);
                exit.update(time, input, player_x, allowed)
            })
            .collect();

        for event in events {
            match event {
                ExitEvent::None => {}
                ExitEvent::Started(spawn) => {
                    self.pending_spawn = spawn;
                    self.overlay.fade_out(self.config.transitions.overlay_fade_seconds);
                }
                ExitEvent::Load(scene) => self.load(scene),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Player input
    // -----------------------------------------------------------------------

    /// Escape: open or close the pause menu
    pub fn toggle_pause(&mut self) {
        let in_gameplay = self.scene.is_some_and(|s| s != SceneId::MainMenu && !s.is_cutscene());
        if !in_gameplay || self.game_over.is_visible() || self.panel_open() {
            return;
        }
        let paused = self.pause.toggle(&mut self.clock);
        self.player.set_enabled(!paused);
    }

    /// Pause menu "main menu"
    pub fn pause_to_main_menu(&mut self) {
        self.pause.resume(&mut self.clock);
        self.player.set_enabled(true);
        self.go_to_main_menu();
    }

    /// Closet, bike or inventory panel is up
    fn panel_open(&self) -> bool {
        self.inventory.is_open()
            || self.stage.room.as_ref().is_some_and(|r| r.closet().is_open())
            || self.stage.bike.as_ref().is_some_and(BikeMission::is_open)
    }

    /// I: open or close the inventory panel. Returns the new open state.
    pub fn toggle_inventory(&mut self) -> bool {
        let other_panel = self.stage.room.as_ref().is_some_and(|r| r.closet().is_open())
            || self.stage.bike.as_ref().is_some_and(BikeMission::is_open);
        if self.pause.is_paused() || other_panel {
            return self.inventory.is_open();
        }
        let open = self.inventory.toggle();
        if open {
            self.clock.pause();
        } else {
            self.clock.resume();
        }
        tracing::debug!("Inventory panel {}", if open { "opened" } else { "closed" });
        open
    }

    pub fn select_inventory_slot(&mut self, index: usize) {
        self.inventory.select_slot(index);
    }

    /// Player walked into an interactable's trigger
    pub fn on_trigger_enter(&mut self, id: &str) {
        let Some(object) = self.stage.interactables.iter().find(|o| o.id == id) else {
            tracing::warn!("Session: no interactable '{}' in this scene", id);
            return;
        };
        self.interaction.on_trigger_enter(object, &mut self.prompt, self.lang);
        if object.kind == InteractableKind::Npc {
            if let Some(npc) = self.stage.npc.as_mut() {
                npc.on_trigger_enter(&mut self.dialogue);
            }
        }
    }

    pub fn on_trigger_exit(&mut self, id: &str) {
        self.interaction.on_trigger_exit(id, &mut self.prompt);
        let is_npc = self.stage.interactables.iter().any(|o| o.id == id && o.kind == InteractableKind::Npc);
        if is_npc {
            if let Some(npc) = self.stage.npc.as_mut() {
                npc.on_trigger_exit();
            }
        }
    }

    /// Player walked into the exit leading to `target`
    pub fn on_exit_enter(&mut self, target: SceneId) {
        let forest_done = self.forest_completed();
        let flags = *self.flags.flags();
        match self.stage.exits.iter_mut().find(|e| e.target() == target) {
            Some(exit) => {
                let allowed = scenes::exit_allowed(exit.requires(), forest_done, &flags);
                exit.on_player_enter(allowed, &mut self.prompt, self.lang);
            }
            None => tracing::warn!("Session: no exit to {} here", target),
        }
    }

    pub fn on_exit_leave(&mut self, target: SceneId) {
        if let Some(exit) = self.stage.exits.iter_mut().find(|e| e.target() == target) {
            exit.on_player_exit(&mut self.prompt);
        }
    }

    /// E pressed while standing in an interactable
    fn interact(&mut self) {
        let Some(id) = self.interaction.current().map(str::to_string) else {
            return;
        };
        let Some(object) = self.stage.interactables.iter().find(|o| o.id == id) else {
            return;
        };
        let flags = *self.flags.flags();
        let action = self
            .interaction
            .press(object, &flags, self.mission_started, &mut self.prompt, self.lang);
        if let Some(action) = action {
            self.dispatch(action);
        }
    }

    fn dispatch(&mut self, action: InteractAction) {
        tracing::debug!("Session: {:?}", action);
        match action {
            InteractAction::TalkToNpc => {
                if let Some(npc) = self.stage.npc.as_mut() {
                    if npc.trigger() == DialogueTrigger::OnInteract {
                        npc.play(&mut self.dialogue);
                    }
                }
                self.on_talked_to_npc();
            }
            InteractAction::PickGift(id) => self.pick_gift(&id),
            InteractAction::OpenCloset => {
                let (stage, mut ctx) = self.split();
                match stage.room.as_mut() {
                    Some(room) => {
                        room.open_closet(&mut ctx);
                    }
                    None => tracing::warn!("Session: closet without a room mission"),
                }
            }
            InteractAction::OpenBike => {
                let (stage, mut ctx) = self.split();
                match stage.bike.as_mut() {
                    Some(bike) => {
                        bike.open(&mut ctx);
                    }
                    None => tracing::warn!("Session: bike without a basement mission"),
                }
            }
            InteractAction::ActivateTurntable => {
                self.activate_turntable();
            }
        }
    }

    /// Pick up a gift: into the inventory, hidden from the scene, counted
    fn pick_gift(&mut self, id: &str) {
        match self.config.gift(id).cloned() {
            Some(gift) => {
                if let Err(e) = self.inventory.add(gift) {
                    tracing::warn!("Session: {}", e);
                }
            }
            None => tracing::warn!("Session: unknown gift '{}'", id),
        }
        if let Some(object) = self.stage.interactables.iter_mut().find(|o| o.id == id) {
            object.disabled = true;
        }
        if self.interaction.current() == Some(id) {
            self.interaction.clear();
            self.prompt.hide_message();
        }
        self.on_gift_collected(id);
    }

    pub fn activate_turntable(&mut self) -> Option<ActivateResult> {
        let (stage, mut ctx) = self.split();
        match stage.turntable.as_mut() {
            Some(turntable) => Some(turntable.try_activate(&mut ctx)),
            None => {
                tracing::warn!("Session: no turntable in this scene");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Minigame panels
    // -----------------------------------------------------------------------

    pub fn click_plush(&mut self, index: usize) {
        let (stage, mut ctx) = self.split();
        if let Some(room) = stage.room.as_mut() {
            room.click_plush(index, &mut ctx);
        }
    }

    pub fn close_closet(&mut self) {
        let (stage, mut ctx) = self.split();
        if let Some(room) = stage.room.as_mut() {
            room.close_closet(&mut ctx);
        }
    }

    pub fn close_bike(&mut self) {
        let (stage, mut ctx) = self.split();
        if let Some(bike) = stage.bike.as_mut() {
            bike.close(&mut ctx);
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        if self.overlay.blocks_input() {
            return false;
        }
        self.stage.bike.as_mut().is_some_and(|bike| bike.pointer_down(x, y))
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if let Some(bike) = self.stage.bike.as_mut() {
            bike.pointer_move(x, y);
        }
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) -> Option<MinigameOutcome> {
        let outcome = {
            let (stage, mut ctx) = self.split();
            stage.bike.as_mut().and_then(|bike| bike.pointer_up(x, y, &mut ctx))
        };
        if let Some(outcome) = outcome {
            self.after_bike_outcome(outcome);
        }
        outcome
    }

    fn after_bike_outcome(&mut self, outcome: MinigameOutcome) {
        if outcome == MinigameOutcome::Completed {
            let flags = *self.flags.flags();
            if let Some(turntable) = self.stage.turntable.as_mut() {
                turntable.on_core_missions_changed(&flags);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Damage
    // -----------------------------------------------------------------------

    /// The enemy touched the player
    pub fn on_enemy_contact(&mut self) {
        if let Some(damage) = self.chase.contact_damage() {
            self.apply_damage(damage);
        }
    }

    fn apply_damage(&mut self, amount: u32) {
        if amount == 0 || self.game_over.is_visible() {
            return;
        }
        if self.health.take_hit(amount) {
            self.on_player_death();
        }
    }

    // -----------------------------------------------------------------------
    // UI surface
    // -----------------------------------------------------------------------

    pub fn scene(&self) -> Option<SceneId> {
        self.scene
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn flags(&self) -> &MissionFlags {
        self.flags.flags()
    }

    pub fn phase(&self) -> MissionPhase {
        self.tracker.phase()
    }

    pub fn prompt(&self) -> &PromptService {
        &self.prompt
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn dialogue(&self) -> &DialogueBox {
        &self.dialogue
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn chase(&self) -> &EnemyChase {
        &self.chase
    }

    pub fn player(&self) -> &PlayerMotor {
        &self.player
    }

    pub fn audio(&self) -> &AudioDirector {
        &self.audio
    }

    /// HUD countdown, "MM:SS"
    pub fn timer_text(&self) -> String {
        self.timers
            .get(SHARED_TIMER_TAG)
            .map(Countdown::text)
            .unwrap_or_else(|| timer::format_mm_ss(0.0))
    }

    pub fn shared_timer(&self) -> Option<&Countdown> {
        self.timers.get(SHARED_TIMER_TAG)
    }

    pub fn is_mission_started(&self) -> bool {
        self.mission_started
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over.is_visible()
    }

    pub fn game_over_alpha(&self) -> f32 {
        self.game_over.alpha()
    }

    pub fn overlay_alpha(&self) -> f32 {
        self.overlay.alpha()
    }

    pub fn forest(&self) -> Option<&ForestMission> {
        self.stage.forest.as_ref()
    }

    pub fn room(&self) -> Option<&RoomMission> {
        self.stage.room.as_ref()
    }

    pub fn bike(&self) -> Option<&BikeMission> {
        self.stage.bike.as_ref()
    }

    pub fn turntable(&self) -> Option<&Turntable> {
        self.stage.turntable.as_ref()
    }

    pub fn interactable(&self, id: &str) -> Option<&Interactable> {
        self.stage.interactables.iter().find(|o| o.id == id)
    }
}
