//! Closet minigame: pick the daughter's favourite plushes
//!
//! Clicking a plush previews it and plays its lines in the shared dialogue
//! box, ending on a yes/no prompt. A confirmed negative plush hurts the
//! player; a confirmed correct one is counted once and its button disabled.
//! Any other plush is only talked about.
//! When every correct plush has been picked the closet closes itself.

use std::collections::HashSet;

use heavenseve_common::config::{PlushData, RoomConfig};
use heavenseve_common::Language;

use crate::engine::{GameClock, Key};
use crate::game::dialog::{ConfirmPrompt, DialogueBox, DialogueEvent, DialogueOwner};
use crate::game::i18n;

/// What a confirmed pick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosetEffect {
    /// Damage to apply to the player
    Damage(u32),
    /// A new correct plush was counted
    Progress { current: usize, total: usize },
    /// Every correct plush has been picked; the closet is now closed
    Completed,
}

#[derive(Debug)]
pub struct ClosetUi {
    plushes: Vec<PlushData>,
    /// Explicit correct set by name; empty means each plush's own flag decides
    correct_names: Vec<String>,
    negatives_damage: u32,
    pause_on_open: bool,

    open: bool,
    /// Plush whose dialogue flow is in flight
    processing: Option<usize>,
    selected_correct: HashSet<String>,
    disabled: Vec<bool>,
    preview: Option<usize>,
}

impl ClosetUi {
    pub fn new(config: &RoomConfig) -> Self {
        Self {
            plushes: config.plushes.clone(),
            correct_names: config.correct.clone(),
            negatives_damage: config.negatives_damage,
            pause_on_open: config.pause_on_open,
            open: false,
            processing: None,
            selected_correct: HashSet::new(),
            disabled: vec![false; config.plushes.len()],
            preview: None,
        }
    }

    /// Show the panel. Returns false if it was already open.
    pub fn open(&mut self, clock: &mut GameClock) -> bool {
        if self.open {
            return false;
        }
        self.open = true;
        self.preview = None;
        if self.pause_on_open {
            clock.pause();
        }
        tracing::debug!("Closet: opened");
        true
    }

    /// Hide the panel, dropping any selection flow in flight
    pub fn close(&mut self, dialogue: &mut DialogueBox, clock: &mut GameClock) {
        if !self.open {
            return;
        }
        self.open = false;
        dialogue.cancel_if_owned_by(DialogueOwner::Closet);
        self.processing = None;
        if self.pause_on_open {
            clock.resume();
        }
        tracing::debug!("Closet: closed");
    }

    /// A plush button was clicked
    pub fn click(&mut self, index: usize, dialogue: &mut DialogueBox, lang: Language) {
        if !self.open || self.processing.is_some() {
            return;
        }
        let Some(plush) = self.plushes.get(index) else {
            tracing::warn!("Closet: click index out of range: {}", index);
            return;
        };
        if self.disabled[index] {
            tracing::debug!("Closet: '{}' already picked", plush.name);
            return;
        }
        tracing::debug!("Closet: click {} ('{}')", index, plush.name);

        self.preview = Some(index);
        self.processing = Some(index);
        let prompt = ConfirmPrompt {
            text: i18n::t(lang, "confirm_plush").to_string(),
            yes: Key::Q,
            no: Key::E,
        };
        dialogue.show_lines_then_confirm(DialogueOwner::Closet, &plush.lines, prompt);
    }

    /// Route a dialogue event; only closet-owned events are consumed
    pub fn on_dialogue_event(
        &mut self,
        event: &DialogueEvent,
        dialogue: &mut DialogueBox,
        clock: &mut GameClock,
    ) -> Vec<ClosetEffect> {
        match event {
            DialogueEvent::Confirmed { owner: DialogueOwner::Closet, accepted } => {
                let Some(index) = self.processing.take() else {
                    return Vec::new();
                };
                if *accepted {
                    self.confirm(index, dialogue, clock)
                } else {
                    Vec::new()
                }
            }
            DialogueEvent::Finished { owner: DialogueOwner::Closet }
            | DialogueEvent::Canceled { owner: DialogueOwner::Closet } => {
                self.processing = None;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn confirm(&mut self, index: usize, dialogue: &mut DialogueBox, clock: &mut GameClock) -> Vec<ClosetEffect> {
        let plush = &self.plushes[index];
        if plush.negative {
            let damage = if plush.damage_on_pick > 0 { plush.damage_on_pick } else { self.negatives_damage };
            tracing::info!("Closet: wrong plush '{}' ({} damage)", plush.name, damage);
            return vec![ClosetEffect::Damage(damage)];
        }
        if !self.is_correct(plush) {
            tracing::debug!("Closet: '{}' is not one of hers", plush.name);
            return Vec::new();
        }
        if !self.selected_correct.insert(plush.name.clone()) {
            return Vec::new();
        }
        self.disabled[index] = true;

        let total = self.total_correct();
        let current = self.current_correct();
        tracing::info!("Closet: progress {}/{}", current, total);
        let mut effects = vec![ClosetEffect::Progress { current, total }];
        if total > 0 && current >= total {
            tracing::info!("Closet: every correct plush picked");
            self.close(dialogue, clock);
            effects.push(ClosetEffect::Completed);
        }
        effects
    }

    fn is_correct(&self, plush: &PlushData) -> bool {
        if self.correct_names.is_empty() {
            plush.correct
        } else {
            self.correct_names.contains(&plush.name)
        }
    }

    /// Size of the correct set
    pub fn total_correct(&self) -> usize {
        if self.correct_names.is_empty() {
            self.plushes.iter().filter(|p| p.correct).count()
        } else {
            self.correct_names.len()
        }
    }

    /// Distinct correct plushes picked so far
    pub fn current_correct(&self) -> usize {
        self.plushes
            .iter()
            .filter(|p| self.selected_correct.contains(&p.name) && self.is_correct(p))
            .count()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_processing(&self) -> bool {
        self.processing.is_some()
    }

    /// Whether the button of `index` still accepts clicks
    pub fn is_button_enabled(&self, index: usize) -> bool {
        self.open && self.processing.is_none() && !self.disabled.get(index).copied().unwrap_or(true)
    }

    /// Plush shown in the preview area
    pub fn preview(&self) -> Option<&PlushData> {
        self.preview.and_then(|i| self.plushes.get(i))
    }

    pub fn plush_count(&self) -> usize {
        self.plushes.len()
    }
}
