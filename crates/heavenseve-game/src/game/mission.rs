//! Mission tracker: the always-visible mission text
//!
//! The phase moves forward as the sub-missions report progress. Entering a
//! scene recomputes it from the persisted flags, so loading the same scene
//! twice with unchanged flags shows the same text.

use heavenseve_common::{Language, SceneId};

use crate::game::flags::MissionFlags;
use crate::game::i18n;
use crate::game::prompt::PromptService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissionPhase {
    #[default]
    None,
    TalkToNpc,
    FindGifts,
    GiftsFound,
    DeliverGifts,
    ClosetOpen,
    ClosetCollect,
    BikeRepair,
    PlaceDisk,
    Completed,
}

#[derive(Debug, Clone)]
pub struct MissionTracker {
    phase: MissionPhase,
    lang: Language,
    gifts_target: usize,
}

impl MissionTracker {
    pub fn new(lang: Language, gifts_target: usize) -> Self {
        Self {
            phase: MissionPhase::None,
            lang,
            gifts_target,
        }
    }

    pub fn phase(&self) -> MissionPhase {
        self.phase
    }

    fn set(&mut self, phase: MissionPhase, text: &str, prompt: &mut PromptService) {
        if self.phase != phase {
            tracing::debug!("Mission phase: {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
        prompt.set_mission_text(text);
    }

    fn text(&self, key: &str) -> &'static str {
        i18n::t(self.lang, key)
    }

    /// Derive the phase for `scene` from the flags
    pub fn on_scene_entered(&mut self, scene: SceneId, flags: &MissionFlags, prompt: &mut PromptService) {
        tracing::info!("Mission tracker: entered {} (phase {:?})", scene, self.phase);
        match scene {
            SceneId::Bosque if flags.forest => {
                self.set(MissionPhase::GiftsFound, self.text("phase_gifts_found"), prompt)
            }
            SceneId::Bosque => self.set(MissionPhase::TalkToNpc, self.text("phase_talk_to_npc"), prompt),
            SceneId::Exterior | SceneId::Sala => {
                self.set(MissionPhase::DeliverGifts, self.text("phase_deliver"), prompt)
            }
            SceneId::Cuarto if flags.room => {
                self.set(MissionPhase::ClosetCollect, self.text("phase_plush_delivered"), prompt)
            }
            SceneId::Cuarto => self.set(MissionPhase::ClosetOpen, self.text("phase_closet_open"), prompt),
            SceneId::Sotano if !flags.bike => {
                self.set(MissionPhase::BikeRepair, self.text("phase_bike_repair"), prompt)
            }
            SceneId::Sotano if flags.finale => {
                self.set(MissionPhase::Completed, self.text("phase_completed"), prompt)
            }
            SceneId::Sotano if flags.all_core_completed() => {
                self.set(MissionPhase::PlaceDisk, self.text("phase_place_disk"), prompt)
            }
            SceneId::Sotano => self.set(MissionPhase::BikeRepair, self.text("phase_bike_repaired"), prompt),
            _ => {
                self.phase = MissionPhase::None;
                prompt.set_mission_text("");
            }
        }
    }

    pub fn on_talked_to_npc(&mut self, prompt: &mut PromptService) {
        if matches!(self.phase, MissionPhase::TalkToNpc | MissionPhase::None) {
            let text = i18n::counted(self.lang, "phase_gifts", 0, self.gifts_target);
            self.set(MissionPhase::FindGifts, &text, prompt);
        }
    }

    pub fn on_gift_progress(&mut self, count: usize, prompt: &mut PromptService) {
        let text = i18n::counted(self.lang, "phase_gifts", count.min(self.gifts_target), self.gifts_target);
        self.set(MissionPhase::FindGifts, &text, prompt);
    }

    pub fn on_gifts_found(&mut self, prompt: &mut PromptService) {
        self.set(MissionPhase::GiftsFound, self.text("phase_gifts_found"), prompt);
    }

    pub fn on_closet_opened(&mut self, prompt: &mut PromptService) {
        self.set(MissionPhase::ClosetOpen, self.text("phase_closet_collect"), prompt);
    }

    pub fn on_closet_completed(&mut self, prompt: &mut PromptService) {
        self.set(MissionPhase::ClosetCollect, self.text("phase_plush_delivered"), prompt);
    }

    /// Bike fixed; moves on to the record when every core mission is done
    pub fn on_bike_repaired(&mut self, flags: &MissionFlags, prompt: &mut PromptService) {
        if flags.all_core_completed() {
            self.set(MissionPhase::PlaceDisk, self.text("phase_place_disk"), prompt);
        } else {
            self.set(MissionPhase::BikeRepair, self.text("phase_bike_repaired"), prompt);
        }
    }

    pub fn on_place_disk(&mut self, prompt: &mut PromptService) {
        self.set(MissionPhase::Completed, self.text("phase_completed"), prompt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> (MissionTracker, PromptService) {
        (MissionTracker::new(Language::Spanish, 3), PromptService::new())
    }

    #[test]
    fn forest_flow_texts() {
        let (mut m, mut p) = tracker();
        m.on_scene_entered(SceneId::Bosque, &MissionFlags::default(), &mut p);
        assert_eq!(m.phase(), MissionPhase::TalkToNpc);
        assert_eq!(p.mission_text(), "Habla con el NPC");

        m.on_talked_to_npc(&mut p);
        assert_eq!(p.mission_text(), "Regalos: 0/3");
        m.on_talked_to_npc(&mut p);
        assert_eq!(m.phase(), MissionPhase::FindGifts);

        m.on_gift_progress(2, &mut p);
        assert_eq!(p.mission_text(), "Regalos: 2/3");
        m.on_gifts_found(&mut p);
        assert_eq!(p.mission_text(), "Regalos encontrados");
    }

    #[test]
    fn reentry_is_idempotent() {
        let flags = MissionFlags { forest: true, room: true, bike: false, finale: false };
        for scene in SceneId::all() {
            let (mut m, mut p) = tracker();
            m.on_scene_entered(scene, &flags, &mut p);
            let first = (m.phase(), p.mission_text().to_string());
            m.on_scene_entered(scene, &flags, &mut p);
            assert_eq!(first, (m.phase(), p.mission_text().to_string()), "{}", scene);
        }
    }

    #[test]
    fn basement_derived_from_flags() {
        let (mut m, mut p) = tracker();
        let mut flags = MissionFlags::default();
        m.on_scene_entered(SceneId::Sotano, &flags, &mut p);
        assert_eq!(m.phase(), MissionPhase::BikeRepair);

        flags.bike = true;
        m.on_scene_entered(SceneId::Sotano, &flags, &mut p);
        assert_eq!(p.mission_text(), "Bici reparada");

        flags.forest = true;
        flags.room = true;
        m.on_scene_entered(SceneId::Sotano, &flags, &mut p);
        assert_eq!(m.phase(), MissionPhase::PlaceDisk);

        flags.finale = true;
        m.on_scene_entered(SceneId::Sotano, &flags, &mut p);
        assert_eq!(m.phase(), MissionPhase::Completed);
        assert_eq!(p.mission_text(), "Tocadiscos activado");

        m.on_scene_entered(SceneId::MainMenu, &flags, &mut p);
        assert_eq!(p.mission_text(), "");
    }

    #[test]
    fn bike_repair_moves_to_disk_when_all_done() {
        let (mut m, mut p) = tracker();
        let flags = MissionFlags { forest: true, room: true, bike: true, finale: false };
        m.on_bike_repaired(&flags, &mut p);
        assert_eq!(m.phase(), MissionPhase::PlaceDisk);
        assert_eq!(p.mission_text(), "Coloca el disco");
    }
}
