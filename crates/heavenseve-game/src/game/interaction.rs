//! Player interaction: prompts on trigger enter/exit and E dispatch
//!
//! The player tracks the interactable it is standing in. Pressing E runs the
//! checks in order (disabled, lock, gate, forest started) and hands back the
//! action for the session to carry out.

use heavenseve_common::Language;

use crate::game::flags::MissionFlags;
use crate::game::i18n;
use crate::game::missions::MissionGate;
use crate::game::prompt::PromptService;

/// What an interactable is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractableKind {
    /// A collectible gift, by gift id
    Gift(String),
    Npc,
    Closet,
    Bicycle,
    Turntable,
}

impl InteractableKind {
    /// NPC, closet and bike work even while interactions are locked
    pub fn always_allowed(&self) -> bool {
        matches!(self, InteractableKind::Npc | InteractableKind::Closet | InteractableKind::Bicycle)
    }
}

/// An object in the scene the player can press E on
#[derive(Debug, Clone)]
pub struct Interactable {
    /// Trigger name the host reports on enter/exit
    pub id: String,
    pub kind: InteractableKind,
    pub disabled: bool,
    pub gate: Option<MissionGate>,
}

impl Interactable {
    pub fn new(id: &str, kind: InteractableKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            disabled: false,
            gate: None,
        }
    }

    pub fn with_gate(mut self, gate: MissionGate) -> Self {
        self.gate = Some(gate);
        self
    }
}

/// What the session should do after an accepted E press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractAction {
    TalkToNpc,
    PickGift(String),
    OpenCloset,
    OpenBike,
    ActivateTurntable,
}

/// Interactables of a scene
pub fn scene_interactables(scene: heavenseve_common::SceneId, gift_ids: &[String]) -> Vec<Interactable> {
    use heavenseve_common::SceneId;
    match scene {
        SceneId::Bosque => {
            let mut objects = vec![Interactable::new("NPC", InteractableKind::Npc)];
            objects.extend(
                gift_ids
                    .iter()
                    .map(|id| Interactable::new(id, InteractableKind::Gift(id.clone()))),
            );
            objects
        }
        SceneId::Cuarto => vec![Interactable::new("Closet", InteractableKind::Closet)],
        SceneId::Sotano => vec![
            Interactable::new("Bicicleta", InteractableKind::Bicycle),
            Interactable::new("Tocadiscos", InteractableKind::Turntable),
        ],
        _ => Vec::new(),
    }
}

#[derive(Debug)]
pub struct PlayerInteraction {
    current: Option<String>,
    /// Locked until the NPC has been talked to
    locked: bool,
    enabled: bool,
}

impl PlayerInteraction {
    pub fn new(locked: bool) -> Self {
        Self {
            current: None,
            locked,
            enabled: true,
        }
    }

    pub fn set_locked(&mut self, locked: bool) {
        if self.locked != locked {
            tracing::debug!("PlayerInteraction: locked={}", locked);
        }
        self.locked = locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Game over and pause switch interaction off
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn on_trigger_enter(&mut self, object: &Interactable, prompt: &mut PromptService, lang: Language) {
        tracing::debug!("PlayerInteraction: entered '{}' (disabled={})", object.id, object.disabled);
        self.current = Some(object.id.clone());
        if object.disabled {
            return;
        }
        let key = match object.kind {
            InteractableKind::Npc => "prompt_talk",
            InteractableKind::Closet => "prompt_open",
            InteractableKind::Bicycle => "prompt_repair",
            _ if self.locked => "talk_to_npc_first",
            _ => "prompt_open",
        };
        prompt.show_message(i18n::t(lang, key));
    }

    pub fn on_trigger_exit(&mut self, id: &str, prompt: &mut PromptService) {
        if self.current.as_deref() == Some(id) {
            self.current = None;
            prompt.hide_message();
        }
    }

    /// Forget the current object without touching the prompt (scene unload)
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// E pressed on `object`. Returns the action to run, or None after
    /// showing why it was refused.
    pub fn press(
        &self,
        object: &Interactable,
        flags: &MissionFlags,
        forest_started: bool,
        prompt: &mut PromptService,
        lang: Language,
    ) -> Option<InteractAction> {
        if !self.enabled {
            return None;
        }
        tracing::debug!(
            "PlayerInteraction: E on '{}' (disabled={}, locked={})",
            object.id, object.disabled, self.locked
        );
        if object.disabled {
            return None;
        }
        if !object.kind.always_allowed() && self.locked {
            prompt.show_message(i18n::t(lang, "talk_to_npc_first"));
            return None;
        }
        if let Some(gate) = &object.gate {
            if !gate.can_interact(flags) {
                gate.show_locked_message(prompt, lang);
                return None;
            }
        }

        let action = match &object.kind {
            InteractableKind::Npc => InteractAction::TalkToNpc,
            InteractableKind::Closet => InteractAction::OpenCloset,
            InteractableKind::Bicycle => InteractAction::OpenBike,
            InteractableKind::Turntable => InteractAction::ActivateTurntable,
            InteractableKind::Gift(_) if !forest_started => {
                prompt.show_message(i18n::t(lang, "talk_to_npc_first"));
                return None;
            }
            InteractableKind::Gift(id) => InteractAction::PickGift(id.clone()),
        };
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ES: Language = Language::Spanish;

    fn gift() -> Interactable {
        Interactable::new("regalo_disco", InteractableKind::Gift("regalo_disco".into()))
    }

    #[test]
    fn prompts_on_enter_and_exit() {
        let mut p = PromptService::new();
        let mut player = PlayerInteraction::new(true);

        player.on_trigger_enter(&Interactable::new("NPC", InteractableKind::Npc), &mut p, ES);
        assert_eq!(p.message(), Some("[E para hablar]"));
        player.on_trigger_enter(&Interactable::new("Bicicleta", InteractableKind::Bicycle), &mut p, ES);
        assert_eq!(p.message(), Some("[E para reparar]"));
        player.on_trigger_enter(&gift(), &mut p, ES);
        assert_eq!(p.message(), Some("Habla con el NPC primero [E]"));

        // Leaving an object that is no longer current keeps the prompt
        player.on_trigger_exit("NPC", &mut p);
        assert!(p.message().is_some());
        player.on_trigger_exit("regalo_disco", &mut p);
        assert_eq!(p.message(), None);
        assert_eq!(player.current(), None);

        player.set_locked(false);
        player.on_trigger_enter(&gift(), &mut p, ES);
        assert_eq!(p.message(), Some("[E para abrir]"));
    }

    #[test]
    fn disabled_object_shows_nothing() {
        let mut p = PromptService::new();
        let mut player = PlayerInteraction::new(false);
        let mut closet = Interactable::new("Closet", InteractableKind::Closet);
        closet.disabled = true;
        player.on_trigger_enter(&closet, &mut p, ES);
        assert_eq!(p.message(), None);
        assert_eq!(player.press(&closet, &MissionFlags::default(), true, &mut p, ES), None);
    }

    #[test]
    fn press_checks_in_order() {
        let mut p = PromptService::new();
        let flags = MissionFlags::default();
        let mut player = PlayerInteraction::new(true);

        assert_eq!(
            player.press(&Interactable::new("NPC", InteractableKind::Npc), &flags, false, &mut p, ES),
            Some(InteractAction::TalkToNpc)
        );
        assert_eq!(player.press(&gift(), &flags, false, &mut p, ES), None);
        assert_eq!(p.message(), Some("Habla con el NPC primero [E]"));

        player.set_locked(false);
        assert_eq!(player.press(&gift(), &flags, false, &mut p, ES), None);
        assert_eq!(
            player.press(&gift(), &flags, true, &mut p, ES),
            Some(InteractAction::PickGift("regalo_disco".into()))
        );

        let table = Interactable::new("Tocadiscos", InteractableKind::Turntable).with_gate(MissionGate::ALL_CORE);
        assert_eq!(player.press(&table, &flags, true, &mut p, ES), None);
        assert_eq!(p.message(), Some("Completa primero las misiones necesarias."));
        let done = MissionFlags { forest: true, room: true, bike: true, finale: false };
        assert_eq!(player.press(&table, &done, true, &mut p, ES), Some(InteractAction::ActivateTurntable));

        player.set_enabled(false);
        assert_eq!(player.press(&table, &done, true, &mut p, ES), None);
    }
}
