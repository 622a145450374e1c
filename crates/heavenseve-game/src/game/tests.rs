//! Session scenarios: whole playthroughs driven frame by frame

use heavenseve_common::{GameConfig, SceneId};

use super::*;
use crate::engine::sound_engine::RecordingOutput;
use crate::engine::Vec2;
use crate::game::flags::MissionFlag;
use crate::game::missions::forest::ForestOutcome;
use crate::game::missions::SubMissionState;

const FRAME: f32 = 0.05;

fn session() -> Session {
    Session::new(GameConfig::default(), SaveManager::in_memory(), Box::new(RecordingOutput::new()))
}

fn step(s: &mut Session, keys: &[Key]) {
    s.update(FRAME, &InputFrame::keys(keys));
}

fn idle(s: &mut Session, seconds: f32) {
    let frames = (seconds / FRAME).ceil() as usize;
    for _ in 0..frames {
        s.update(FRAME, &InputFrame::none());
    }
}

/// Press Space until the dialogue box closes
fn skip_dialogue(s: &mut Session) {
    for _ in 0..400 {
        if !s.dialogue().is_running() {
            return;
        }
        step(s, &[Key::Space]);
    }
    panic!("dialogue never finished");
}

/// Play the running dialogue through and answer its prompt
fn answer(s: &mut Session, yes: bool) {
    for _ in 0..400 {
        if !s.dialogue().is_running() {
            return;
        }
        let key = if s.dialogue().awaiting_confirm() {
            if yes { Key::Q } else { Key::E }
        } else {
            Key::Space
        };
        step(s, &[key]);
    }
    panic!("dialogue never reached an answer");
}

/// Run frames until the session asks for a scene, then load it
fn follow_load(s: &mut Session) -> SceneId {
    for _ in 0..400 {
        step(s, &[]);
        for command in s.drain_commands() {
            if let HostCommand::LoadScene(scene) = command {
                s.on_scene_loaded(scene);
                return scene;
            }
        }
    }
    panic!("no scene load requested");
}

fn take_exit(s: &mut Session, target: SceneId) {
    s.on_exit_enter(target);
    step(s, &[Key::Q]);
    assert_eq!(follow_load(s), target);
    // Let the overlay fade off before pointer input
    idle(s, 0.5);
}

fn use_object(s: &mut Session, id: &str) {
    s.on_trigger_enter(id);
    step(s, &[Key::E]);
}

fn talk_to_npc(s: &mut Session) {
    use_object(s, "NPC");
    assert!(s.dialogue().is_running());
    skip_dialogue(s);
    s.on_trigger_exit("NPC");
}

fn collect_gifts(s: &mut Session) {
    for id in ["regalo_peluche", "regalo_casco", "regalo_disco"] {
        use_object(s, id);
        s.on_trigger_exit(id);
    }
}

fn drag_part(s: &mut Session, y: f32) -> Option<MinigameOutcome> {
    assert!(s.pointer_down(41.0, y + 1.0));
    s.pointer_move(400.0, 200.0);
    s.pointer_up(400.0, 200.0)
}

fn repair_bike(s: &mut Session) {
    use_object(s, "Bicicleta");
    assert!(s.bike().is_some_and(BikeMission::is_open));
    assert_eq!(drag_part(s, 60.0), None);
    assert_eq!(drag_part(s, 160.0), None);
    assert_eq!(drag_part(s, 260.0), Some(MinigameOutcome::Completed));
    skip_dialogue(s);
}

#[test]
fn full_playthrough() {
    let mut s = session();
    s.on_scene_loaded(SceneId::Bosque);
    assert_eq!(s.phase(), MissionPhase::TalkToNpc);
    assert_eq!(s.prompt().interaction(), "- Encontrar los 3 regalos");

    // Gifts stay out of reach until the NPC has spoken
    use_object(&mut s, "regalo_disco");
    assert_eq!(s.prompt().message(), Some("Habla con el NPC primero [E]"));
    assert!(s.inventory().is_empty());
    s.on_trigger_exit("regalo_disco");

    talk_to_npc(&mut s);
    assert!(s.is_mission_started());
    assert!(s.shared_timer().is_some_and(Countdown::is_running));
    assert_eq!(s.prompt().mission_text(), "Regalos: 0/3");

    collect_gifts(&mut s);
    assert!(s.flags().forest);
    assert_eq!(s.inventory().len(), 3);
    assert_eq!(s.phase(), MissionPhase::GiftsFound);
    assert!(!s.shared_timer().is_some_and(Countdown::is_running));
    assert!(s.interactable("regalo_casco").is_some_and(|o| o.disabled));

    take_exit(&mut s, SceneId::Exterior);
    assert_eq!(s.player().position, Vec2::new(-8.0, 0.0));
    assert_eq!(s.phase(), MissionPhase::DeliverGifts);
    take_exit(&mut s, SceneId::Sala);
    take_exit(&mut s, SceneId::Cuarto);

    // Closet: two correct plushes and one negative pick
    use_object(&mut s, "Closet");
    assert!(s.room().is_some_and(|r| r.closet().is_open()));
    assert!(s.clock().is_paused());
    s.click_plush(0);
    answer(&mut s, true);
    s.click_plush(2);
    answer(&mut s, true);
    assert_eq!(s.health().hits(), 1);
    s.click_plush(1);
    answer(&mut s, true);
    assert!(s.flags().room);
    assert!(!s.inventory().contains_name("Peluche"));
    assert!(!s.clock().is_paused());
    assert_eq!(s.prompt().mission_text(), "Peluche de Pinguino entregado");

    take_exit(&mut s, SceneId::Sala);
    take_exit(&mut s, SceneId::Sotano);
    assert_eq!(s.phase(), MissionPhase::BikeRepair);

    repair_bike(&mut s);
    assert!(s.flags().bike);
    assert!(!s.inventory().contains_name("Casco"));
    assert!(s.turntable().is_some_and(Turntable::is_gate_unlocked));
    assert_eq!(s.phase(), MissionPhase::PlaceDisk);

    use_object(&mut s, "Tocadiscos");
    assert!(s.flags().finale);
    assert!(s.inventory().is_empty());
    assert!(s.audio().is_turntable_activated());
    assert_eq!(s.phase(), MissionPhase::Completed);

    take_exit(&mut s, SceneId::CutsceneFinal);
    step(&mut s, &[Key::Space]);
    assert_eq!(follow_load(&mut s), SceneId::MainMenu);
    assert_eq!(*s.flags(), MissionFlags::default());
    // The final song keeps playing on the menu
    assert!(s.audio().is_turntable_activated());
}

#[test]
fn forest_exit_locked_until_done() {
    let mut s = session();
    s.on_scene_loaded(SceneId::Bosque);
    s.on_exit_enter(SceneId::Exterior);
    assert_eq!(s.prompt().message(), Some("Primero completa la misión."));
    step(&mut s, &[Key::Q]);
    idle(&mut s, 2.0);
    assert!(s.drain_commands().is_empty());
}

#[test]
fn pause_freezes_the_countdown_and_the_player() {
    let mut s = session();
    s.on_scene_loaded(SceneId::MainMenu);
    s.toggle_pause();
    assert!(!s.is_paused());

    s.on_scene_loaded(SceneId::Bosque);
    talk_to_npc(&mut s);
    step(&mut s, &[Key::Escape]);
    assert!(s.is_paused());
    assert!(s.clock().is_paused());

    let before = s.shared_timer().map(Countdown::remaining);
    for _ in 0..20 {
        s.update(FRAME, &InputFrame::none().with_axis(1.0, 0.0));
    }
    assert_eq!(s.shared_timer().map(Countdown::remaining), before);
    assert_eq!(s.player().position, Vec2::ZERO);

    step(&mut s, &[Key::Escape]);
    assert!(!s.is_paused());
    s.update(FRAME, &InputFrame::none().with_axis(1.0, 0.0));
    assert!(s.player().position.x > 0.0);
}

#[test]
fn borrowed_timer_never_ends_the_forest_run() {
    let mut s = session();
    s.on_scene_loaded(SceneId::Sotano);
    use_object(&mut s, "Bicicleta");
    assert_eq!(s.shared_timer().map(Countdown::target), Some(ExpiryTarget::Minigame));

    // Clock is paused behind the panel; the borrowed timer runs on real time
    idle(&mut s, 10.5);
    assert!(!s.is_game_over());
    assert_eq!(s.bike().map(BikeMission::state), Some(SubMissionState::Failed));
    assert!(!s.bike().is_some_and(BikeMission::is_open));
    assert_eq!(s.shared_timer().map(Countdown::target), Some(ExpiryTarget::Orchestrator));

    skip_dialogue(&mut s);
    assert_eq!(s.bike().map(BikeMission::state), Some(SubMissionState::Available));
    repair_bike(&mut s);
    assert!(s.flags().bike);
    // Bike done without the other missions
    assert_eq!(s.prompt().mission_text(), "Bici reparada");
}

#[test]
fn scene_reentry_is_idempotent() {
    let mut s = session();
    s.flags.set(MissionFlag::Forest);
    s.flags.set(MissionFlag::Room);

    s.on_scene_loaded(SceneId::Sotano);
    let first = (s.phase(), s.prompt().mission_text().to_string(), s.prompt().interaction().to_string());
    s.on_scene_loaded(SceneId::Sotano);
    let second = (s.phase(), s.prompt().mission_text().to_string(), s.prompt().interaction().to_string());
    assert_eq!(first, second);
    assert_eq!(s.phase(), MissionPhase::BikeRepair);

    s.on_scene_loaded(SceneId::Bosque);
    assert_eq!(s.phase(), MissionPhase::GiftsFound);
    assert!(s.interactable("regalo_disco").is_some_and(|o| o.disabled));
    assert!(s.forest().is_some_and(ForestMission::is_completed));
}

#[test]
fn talking_again_does_not_restart_the_clock() {
    let mut s = session();
    s.on_scene_loaded(SceneId::Bosque);
    talk_to_npc(&mut s);
    idle(&mut s, 2.0);
    let remaining = s.shared_timer().map(Countdown::remaining).unwrap_or_default();
    s.on_talked_to_npc();
    assert_eq!(s.shared_timer().map(Countdown::remaining), Some(remaining));
}

#[test]
fn enemy_arrives_after_the_delay() {
    let mut s = session();
    s.on_scene_loaded(SceneId::Bosque);
    talk_to_npc(&mut s);
    s.on_enemy_contact();
    assert_eq!(s.health().hits(), 0);

    idle(&mut s, 10.5);
    assert!(s.chase().is_spawned());
    s.on_enemy_contact();
    assert_eq!(s.health().hits(), 1);
    assert_eq!(s.health().hearts_visible(), 4);
}

#[test]
fn completing_the_forest_calls_off_the_enemy() {
    let mut s = session();
    s.on_scene_loaded(SceneId::Bosque);
    talk_to_npc(&mut s);
    collect_gifts(&mut s);
    idle(&mut s, 12.0);
    assert!(!s.chase().is_spawned());
    assert!(!s.is_game_over());
}

#[test]
fn time_running_out_is_game_over() {
    let mut s = session();
    s.on_scene_loaded(SceneId::Bosque);
    talk_to_npc(&mut s);
    idle(&mut s, 31.0);
    assert!(s.is_game_over());
    assert!(s.clock().is_paused());
    assert_eq!(s.forest().and_then(ForestMission::outcome), Some(ForestOutcome::GameOver));

    // Gifts are refused behind the panel
    use_object(&mut s, "regalo_disco");
    assert!(s.inventory().is_empty());

    idle(&mut s, 1.0);
    assert!(s.game_over_alpha() > 0.99);
    step(&mut s, &[Key::M]);
    assert_eq!(s.drain_commands(), vec![HostCommand::LoadScene(SceneId::MainMenu)]);
    assert!(!s.clock().is_paused());
}

#[test]
fn death_after_completion_keeps_the_flag() {
    let mut s = session();
    s.on_scene_loaded(SceneId::Bosque);
    talk_to_npc(&mut s);
    collect_gifts(&mut s);

    s.apply_damage(5);
    assert!(s.is_game_over());
    assert!(s.flags().forest);
    assert_eq!(s.forest().and_then(ForestMission::outcome), Some(ForestOutcome::Completed));

    step(&mut s, &[Key::R]);
    assert_eq!(follow_load(&mut s), SceneId::Bosque);
    assert!(!s.is_game_over());
    assert_eq!(s.health().hits(), 0);
    assert!(s.flags().forest);
}

#[test]
fn restart_after_partial_run_puts_the_gifts_back() {
    let mut s = session();
    s.on_scene_loaded(SceneId::Bosque);
    talk_to_npc(&mut s);
    use_object(&mut s, "regalo_peluche");
    s.on_trigger_exit("regalo_peluche");
    assert!(s.inventory().contains_id("regalo_peluche"));

    idle(&mut s, 31.0);
    assert!(s.is_game_over());
    idle(&mut s, 1.0);
    step(&mut s, &[Key::R]);
    assert_eq!(follow_load(&mut s), SceneId::Bosque);

    assert!(s.inventory().is_empty());
    assert_eq!(s.interactable("regalo_peluche").map(|o| o.disabled), Some(false));

    talk_to_npc(&mut s);
    collect_gifts(&mut s);
    assert!(s.flags().forest);
    assert_eq!(s.inventory().len(), 3);
    assert_eq!(s.forest().and_then(ForestMission::outcome), Some(ForestOutcome::Completed));
}

#[test]
fn play_from_menu_starts_over() {
    let mut s = session();
    s.flags.set(MissionFlag::Forest);
    s.on_scene_loaded(SceneId::MainMenu);
    s.play_game();
    assert_eq!(s.drain_commands(), vec![HostCommand::LoadScene(SceneId::CutsceneIntro)]);
    assert!(!s.flags().forest);

    s.on_scene_loaded(SceneId::CutsceneIntro);
    idle(&mut s, 60.0);
    assert_eq!(s.drain_commands(), vec![HostCommand::LoadScene(SceneId::Bosque)]);
}

#[test]
fn inventory_panel_pauses_and_blocks_pause_menu() {
    let mut s = session();
    s.on_scene_loaded(SceneId::Exterior);
    step(&mut s, &[Key::I]);
    assert!(s.inventory().is_open());
    assert!(s.clock().is_paused());
    step(&mut s, &[Key::Escape]);
    assert!(!s.is_paused());
    step(&mut s, &[Key::I]);
    assert!(!s.inventory().is_open());
    assert!(!s.clock().is_paused());
}
