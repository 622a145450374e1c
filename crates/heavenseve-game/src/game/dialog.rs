//! Dialogue system
//!
//! One dialogue box shared by the whole game:
//!   - Lines are typed out at `chars_per_second` on the unscaled clock, so
//!     dialogue keeps running while the game is paused
//!   - An advance key (Space, Return, E) while typing shows the whole line;
//!     once the line is complete the next press moves on
//!   - Input is ignored for a short moment after a sequence starts
//!   - `show_lines_then_confirm` ends on a yes/no prompt and reports the answer
//!   - Every sequence is tagged with its owner so results reach the right
//!     controller; starting a new sequence cancels the running one
//!
//! `ScriptedDialogue` is an NPC's canned conversation with its trigger rules.

use heavenseve_common::config::{DialogueConfig, DialogueTrigger, ScriptedDialogueConfig};

use crate::engine::{ClockMode, FrameTime, InputFrame, Key};
use crate::game::flags::MissionFlags;
use crate::game::task::{Delay, Poll};

/// Default advance keys
pub const ADVANCE_KEYS: [Key; 3] = [Key::Space, Key::Return, Key::E];

/// Realtime interval of the flag watch of `DialogueTrigger::OnFlagTrue`
const FLAG_WATCH_SECONDS: f32 = 0.25;

// ---------------------------------------------------------------------------
// Dialogue box
// ---------------------------------------------------------------------------

/// Who started a dialogue sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueOwner {
    /// Scripted NPC conversation
    Npc,
    /// Plush preview and confirm in the closet
    Closet,
    /// Result lines of the bike repair
    Bike,
}

/// Events emitted by the dialogue box
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueEvent {
    /// All lines shown and dismissed
    Finished { owner: DialogueOwner },
    /// The confirm prompt was answered
    Confirmed { owner: DialogueOwner, accepted: bool },
    /// A newer sequence replaced this one before it finished
    Canceled { owner: DialogueOwner },
}

/// Yes/no question asked after the last line
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmPrompt {
    pub text: String,
    pub yes: Key,
    pub no: Key,
}

#[derive(Debug, Clone, PartialEq)]
enum Stage {
    Idle,
    Typing { line: usize, shown: usize, acc: f32 },
    /// `armed` is false on the frame the line completes, so the press that
    /// finished the line never also advances it
    WaitAdvance { line: usize, armed: bool },
    ConfirmDelay { remaining: f32 },
    WaitConfirm { armed: bool },
}

/// The typewriter dialogue box
#[derive(Debug)]
pub struct DialogueBox {
    chars_per_second: f32,
    input_block_seconds: f32,
    confirm_delay_seconds: f32,
    advance_keys: Vec<Key>,

    lines: Vec<String>,
    confirm: Option<ConfirmPrompt>,
    owner: Option<DialogueOwner>,
    stage: Stage,
    /// Unscaled seconds since the running sequence started
    since_start: f32,

    text: String,
    visible: bool,
    hint_visible: bool,
    confirm_result: bool,
    pending: Vec<DialogueEvent>,
}

impl DialogueBox {
    pub fn new(config: &DialogueConfig) -> Self {
        Self {
            chars_per_second: config.chars_per_second,
            input_block_seconds: config.input_block_seconds.max(0.0),
            confirm_delay_seconds: config.confirm_delay_seconds.max(0.0),
            advance_keys: ADVANCE_KEYS.to_vec(),
            lines: Vec::new(),
            confirm: None,
            owner: None,
            stage: Stage::Idle,
            since_start: 0.0,
            text: String::new(),
            visible: false,
            hint_visible: false,
            confirm_result: false,
            pending: Vec::new(),
        }
    }

    /// Play `lines`; `Finished` fires once the last one is dismissed
    pub fn show_lines(&mut self, owner: DialogueOwner, lines: &[String]) {
        self.start(owner, lines, None);
    }

    /// Play `lines`, then ask `prompt`; `Confirmed` carries the answer
    pub fn show_lines_then_confirm(&mut self, owner: DialogueOwner, lines: &[String], prompt: ConfirmPrompt) {
        self.start(owner, lines, Some(prompt));
    }

    fn start(&mut self, owner: DialogueOwner, lines: &[String], confirm: Option<ConfirmPrompt>) {
        if let Some(previous) = self.cancel() {
            tracing::debug!("Dialogue: {:?} replaced by {:?}", previous, owner);
            self.pending.push(DialogueEvent::Canceled { owner: previous });
        }
        self.lines = lines.to_vec();
        self.confirm = confirm;
        self.owner = Some(owner);
        self.since_start = 0.0;
        self.visible = true;
        self.hint_visible = false;
        self.confirm_result = false;
        self.text.clear();
        self.stage = self.first_stage_for_line(0);
        tracing::debug!("Dialogue: {:?} started ({} lines)", owner, self.lines.len());
    }

    /// Hide at once and drop the running sequence. Returns its owner.
    pub fn cancel(&mut self) -> Option<DialogueOwner> {
        let owner = if self.is_running() { self.owner } else { None };
        self.stage = Stage::Idle;
        self.owner = None;
        self.lines.clear();
        self.confirm = None;
        self.hide();
        owner
    }

    /// Cancel only if `owner` started the running sequence
    pub fn cancel_if_owned_by(&mut self, owner: DialogueOwner) -> bool {
        if self.owner == Some(owner) && self.is_running() {
            self.cancel();
            true
        } else {
            false
        }
    }

    fn hide(&mut self) {
        self.visible = false;
        self.hint_visible = false;
        self.text.clear();
    }

    fn first_stage_for_line(&mut self, line: usize) -> Stage {
        if line >= self.lines.len() {
            return self.after_last_line();
        }
        self.text.clear();
        let shown = usize::from(self.lines[line].chars().count() > 0);
        self.set_text(line, shown);
        Stage::Typing { line, shown, acc: 0.0 }
    }

    fn after_last_line(&mut self) -> Stage {
        match self.confirm {
            Some(_) => Stage::ConfirmDelay { remaining: self.confirm_delay_seconds },
            None => Stage::Idle,
        }
    }

    fn set_text(&mut self, line: usize, shown: usize) {
        self.text = self.lines[line].chars().take(shown).collect();
    }

    fn advance_pressed(&self, input: &InputFrame) -> bool {
        self.since_start >= self.input_block_seconds && input.any_pressed(&self.advance_keys)
    }

    /// Advance by one frame (`dt` is unscaled). Returns finished/confirmed events.
    pub fn update(&mut self, dt: f32, input: &InputFrame) -> Vec<DialogueEvent> {
        let mut events: Vec<DialogueEvent> = self.pending.drain(..).collect();
        let Some(owner) = self.owner else {
            return events;
        };
        self.since_start += dt;

        match self.stage.clone() {
            Stage::Idle => {}
            Stage::Typing { line, shown, acc } => {
                let total = self.lines[line].chars().count();
                let delay = if self.chars_per_second > 0.0 { 1.0 / self.chars_per_second } else { 0.0 };
                if delay == 0.0 || self.advance_pressed(input) {
                    self.set_text(line, total);
                    self.stage = Stage::WaitAdvance { line, armed: false };
                } else {
                    let mut shown = shown;
                    let mut acc = acc + dt;
                    while acc >= delay && shown < total {
                        shown += 1;
                        acc -= delay;
                    }
                    self.set_text(line, shown);
                    self.stage = if shown >= total {
                        Stage::WaitAdvance { line, armed: false }
                    } else {
                        Stage::Typing { line, shown, acc }
                    };
                }
            }
            Stage::WaitAdvance { line, armed: false } => {
                self.hint_visible = true;
                self.stage = Stage::WaitAdvance { line, armed: true };
            }
            Stage::WaitAdvance { line, armed: true } => {
                if self.advance_pressed(input) {
                    self.hint_visible = false;
                    self.stage = self.first_stage_for_line(line + 1);
                    if self.stage == Stage::Idle {
                        tracing::debug!("Dialogue: {:?} finished", owner);
                        self.owner = None;
                        self.hide();
                        events.push(DialogueEvent::Finished { owner });
                    }
                }
            }
            Stage::ConfirmDelay { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    if let Some(prompt) = &self.confirm {
                        self.text = prompt.text.clone();
                    }
                    self.hint_visible = false;
                    self.stage = Stage::WaitConfirm { armed: false };
                } else {
                    self.stage = Stage::ConfirmDelay { remaining };
                }
            }
            Stage::WaitConfirm { armed: false } => {
                self.stage = Stage::WaitConfirm { armed: true };
            }
            Stage::WaitConfirm { armed: true } => {
                let answer = self.confirm.as_ref().and_then(|p| {
                    if input.pressed(p.yes) {
                        Some(true)
                    } else if input.pressed(p.no) {
                        Some(false)
                    } else {
                        None
                    }
                });
                if let Some(accepted) = answer {
                    tracing::debug!("Dialogue: {:?} confirm -> {}", owner, accepted);
                    self.confirm_result = accepted;
                    self.stage = Stage::Idle;
                    self.owner = None;
                    self.confirm = None;
                    self.hide();
                    events.push(DialogueEvent::Confirmed { owner, accepted });
                }
            }
        }
        events
    }

    /// Whether a sequence is in progress
    pub fn is_running(&self) -> bool {
        self.owner.is_some() && self.stage != Stage::Idle
    }

    pub fn owner(&self) -> Option<DialogueOwner> {
        if self.is_running() {
            self.owner
        } else {
            None
        }
    }

    /// Whether the yes/no prompt is up (or about to be)
    pub fn awaiting_confirm(&self) -> bool {
        matches!(self.stage, Stage::ConfirmDelay { .. } | Stage::WaitConfirm { .. })
    }

    /// Answer of the last confirm prompt
    pub fn confirm_result(&self) -> bool {
        self.confirm_result
    }

    /// Currently visible text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// "Continue" hint, shown while a complete line waits for advance
    pub fn hint_visible(&self) -> bool {
        self.hint_visible
    }
}

// ---------------------------------------------------------------------------
// Scripted dialogue
// ---------------------------------------------------------------------------

/// A canned conversation and the rules that start it
#[derive(Debug)]
pub struct ScriptedDialogue {
    config: ScriptedDialogueConfig,
    has_played: bool,
    running: bool,
    awaiting_input_in_trigger: bool,
    start_delay: Option<Delay>,
    flag_watch: Option<Poll>,
}

impl ScriptedDialogue {
    pub fn new(config: ScriptedDialogueConfig) -> Self {
        let mut dialogue = Self {
            config,
            has_played: false,
            running: false,
            awaiting_input_in_trigger: false,
            start_delay: None,
            flag_watch: None,
        };
        match dialogue.config.trigger {
            DialogueTrigger::OnStart => {
                dialogue.start_delay = Some(Delay::new(dialogue.config.start_delay, ClockMode::Unscaled));
            }
            DialogueTrigger::OnFlagTrue => {
                dialogue.flag_watch = Some(Poll::new(FLAG_WATCH_SECONDS, ClockMode::Unscaled));
            }
            _ => {}
        }
        dialogue
    }

    pub fn trigger(&self) -> DialogueTrigger {
        self.config.trigger
    }

    /// Start the conversation. Returns false when it may not run.
    pub fn play(&mut self, dialogue: &mut DialogueBox) -> bool {
        if self.config.lines.is_empty() {
            tracing::warn!("Scripted dialogue has no lines");
            return false;
        }
        if self.config.play_once && self.has_played {
            tracing::debug!("Scripted dialogue already played, ignoring");
            return false;
        }
        if self.running {
            tracing::debug!("Scripted dialogue already running");
            return false;
        }
        self.running = true;
        self.has_played = true;
        dialogue.show_lines(DialogueOwner::Npc, &self.config.lines);
        true
    }

    /// Player walked into the NPC's trigger area
    pub fn on_trigger_enter(&mut self, dialogue: &mut DialogueBox) {
        if self.config.trigger != DialogueTrigger::OnTriggerEnter {
            return;
        }
        if self.config.play_once && self.has_played {
            return;
        }
        if self.config.require_interact_input {
            self.awaiting_input_in_trigger = true;
        } else {
            self.play(dialogue);
        }
    }

    pub fn on_trigger_exit(&mut self) {
        self.awaiting_input_in_trigger = false;
    }

    /// Per-frame trigger handling (start delay, flag watch, key inside trigger)
    pub fn update(&mut self, time: &FrameTime, input: &InputFrame, flags: &MissionFlags, dialogue: &mut DialogueBox) {
        if self.awaiting_input_in_trigger && input.pressed(Key::E) {
            self.play(dialogue);
        }

        if let Some(poll) = &mut self.flag_watch {
            if poll.tick(time) && flags.watched(self.config.watch_flag) {
                self.flag_watch = None;
                self.start_delay = Some(Delay::new(self.config.start_delay, ClockMode::Unscaled));
            }
        }

        if let Some(delay) = &mut self.start_delay {
            if delay.tick(time) {
                self.start_delay = None;
                self.play(dialogue);
            }
        }
    }

    pub fn on_dialogue_event(&mut self, event: &DialogueEvent) {
        match event {
            DialogueEvent::Finished { owner: DialogueOwner::Npc }
            | DialogueEvent::Canceled { owner: DialogueOwner::Npc } => {
                self.running = false;
            }
            _ => {}
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the player should stand still right now
    pub fn freezes_movement(&self) -> bool {
        self.running && self.config.freeze_movement
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const FRAME: f32 = 0.05;

    pub(crate) fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    pub(crate) fn confirm_prompt() -> ConfirmPrompt {
        ConfirmPrompt { text: "¿Elegir?".to_string(), yes: Key::Q, no: Key::E }
    }

    /// Press Space until the prompt is up, then answer it
    pub(crate) fn answer(dialogue: &mut DialogueBox, yes: bool) -> Vec<DialogueEvent> {
        for _ in 0..400 {
            let key = if dialogue.awaiting_confirm() {
                if yes { Key::Q } else { Key::E }
            } else {
                Key::Space
            };
            let events = dialogue.update(FRAME, &InputFrame::keys(&[key]));
            if events.iter().any(|e| matches!(e, DialogueEvent::Confirmed { .. })) {
                return events;
            }
        }
        panic!("dialogue never reached a confirm answer");
    }

    /// Press Space until the sequence finishes
    pub(crate) fn skip_through(dialogue: &mut DialogueBox) -> Vec<DialogueEvent> {
        for _ in 0..400 {
            let events = dialogue.update(FRAME, &InputFrame::keys(&[Key::Space]));
            if events.iter().any(|e| matches!(e, DialogueEvent::Finished { .. })) {
                return events;
            }
        }
        panic!("dialogue never finished");
    }

    fn dialogue_box() -> DialogueBox {
        DialogueBox::new(&DialogueConfig::default())
    }

    #[test]
    fn types_line_over_time() {
        let mut d = dialogue_box();
        d.show_lines(DialogueOwner::Npc, &lines(&["Hola mundo"]));
        assert_eq!(d.text(), "H");
        d.update(0.11, &InputFrame::none()); // 4 more chars at 40 cps
        assert_eq!(d.text(), "Hola ");
        d.update(1.0, &InputFrame::none());
        assert_eq!(d.text(), "Hola mundo");
        assert!(d.is_running());
    }

    #[test]
    fn skip_press_does_not_also_advance() {
        let mut d = dialogue_box();
        d.show_lines(DialogueOwner::Npc, &lines(&["Una línea bastante larga", "Otra"]));
        d.update(0.2, &InputFrame::none()); // past the input block
        d.update(FRAME, &InputFrame::keys(&[Key::Space]));
        assert_eq!(d.text(), "Una línea bastante larga");
        // Same key next frame only arms
        d.update(FRAME, &InputFrame::keys(&[Key::Space]));
        assert_eq!(d.text(), "Una línea bastante larga");
        assert!(d.hint_visible());
        d.update(FRAME, &InputFrame::keys(&[Key::Space]));
        assert_eq!(d.text(), "O");
    }

    #[test]
    fn input_blocked_right_after_start() {
        let mut d = dialogue_box();
        d.show_lines(DialogueOwner::Npc, &lines(&["Una línea bastante larga"]));
        d.update(0.01, &InputFrame::keys(&[Key::Return]));
        assert_ne!(d.text(), "Una línea bastante larga");
    }

    #[test]
    fn finishes_and_hides() {
        let mut d = dialogue_box();
        d.show_lines(DialogueOwner::Bike, &lines(&["Uno", "Dos"]));
        let events = skip_through(&mut d);
        assert_eq!(events, vec![DialogueEvent::Finished { owner: DialogueOwner::Bike }]);
        assert!(!d.is_running());
        assert!(!d.is_visible());
    }

    #[test]
    fn confirm_yes_and_no() {
        let mut d = dialogue_box();
        d.show_lines_then_confirm(DialogueOwner::Closet, &lines(&["Un pingüino"]), confirm_prompt());
        let events = answer(&mut d, true);
        assert_eq!(events, vec![DialogueEvent::Confirmed { owner: DialogueOwner::Closet, accepted: true }]);
        assert!(d.confirm_result());

        d.show_lines_then_confirm(DialogueOwner::Closet, &lines(&["Un payaso"]), confirm_prompt());
        let events = answer(&mut d, false);
        assert_eq!(events, vec![DialogueEvent::Confirmed { owner: DialogueOwner::Closet, accepted: false }]);
        assert!(!d.confirm_result());
    }

    #[test]
    fn prompt_waits_for_yes_or_no_only() {
        let mut d = dialogue_box();
        d.show_lines_then_confirm(DialogueOwner::Closet, &[], confirm_prompt());
        for _ in 0..10 {
            let events = d.update(FRAME, &InputFrame::keys(&[Key::Space]));
            assert!(events.is_empty());
        }
        assert_eq!(d.text(), "¿Elegir?");
        assert!(d.awaiting_confirm());
    }

    #[test]
    fn new_sequence_cancels_running_one() {
        let mut d = dialogue_box();
        d.show_lines(DialogueOwner::Npc, &lines(&["Hola"]));
        d.show_lines(DialogueOwner::Bike, &lines(&["Lista"]));
        let events = d.update(FRAME, &InputFrame::none());
        assert_eq!(events, vec![DialogueEvent::Canceled { owner: DialogueOwner::Npc }]);
        assert_eq!(d.owner(), Some(DialogueOwner::Bike));
    }

    #[test]
    fn cancel_is_immediate() {
        let mut d = dialogue_box();
        d.show_lines(DialogueOwner::Closet, &lines(&["Hola"]));
        assert!(!d.cancel_if_owned_by(DialogueOwner::Npc));
        assert!(d.cancel_if_owned_by(DialogueOwner::Closet));
        assert!(!d.is_running());
        assert!(!d.is_visible());
        assert_eq!(d.text(), "");
        assert!(d.update(FRAME, &InputFrame::keys(&[Key::Space])).is_empty());
    }

    #[test]
    fn zero_speed_shows_whole_line() {
        let mut d = DialogueBox::new(&DialogueConfig { chars_per_second: 0.0, ..Default::default() });
        d.show_lines(DialogueOwner::Npc, &lines(&["Todo de golpe"]));
        d.update(FRAME, &InputFrame::none());
        assert_eq!(d.text(), "Todo de golpe");
    }

    #[test]
    fn scripted_dialogue_plays_once() {
        let mut d = dialogue_box();
        let mut npc = ScriptedDialogue::new(ScriptedDialogueConfig::default());
        assert!(npc.play(&mut d));
        assert!(!npc.play(&mut d)); // running
        for ev in skip_through(&mut d) {
            npc.on_dialogue_event(&ev);
        }
        assert!(!npc.is_running());
        assert!(!npc.play(&mut d)); // play_once
    }

    #[test]
    fn scripted_dialogue_without_lines_is_refused() {
        let mut d = dialogue_box();
        let mut npc = ScriptedDialogue::new(ScriptedDialogueConfig { lines: Vec::new(), ..Default::default() });
        assert!(!npc.play(&mut d));
        assert!(!d.is_running());
    }

    #[test]
    fn flag_trigger_waits_for_flag() {
        use heavenseve_common::config::WatchedFlag;
        let mut d = dialogue_box();
        let mut npc = ScriptedDialogue::new(ScriptedDialogueConfig {
            trigger: DialogueTrigger::OnFlagTrue,
            watch_flag: WatchedFlag::Room,
            ..Default::default()
        });
        let time = FrameTime { delta: 0.0, unscaled_delta: 0.3 };
        let mut flags = MissionFlags::default();
        npc.update(&time, &InputFrame::none(), &flags, &mut d);
        assert!(!d.is_running());
        flags.room = true;
        npc.update(&time, &InputFrame::none(), &flags, &mut d);
        npc.update(&time, &InputFrame::none(), &flags, &mut d);
        assert!(d.is_running());
    }

    #[test]
    fn trigger_enter_with_key() {
        let mut d = dialogue_box();
        let mut npc = ScriptedDialogue::new(ScriptedDialogueConfig {
            trigger: DialogueTrigger::OnTriggerEnter,
            require_interact_input: true,
            ..Default::default()
        });
        let time = FrameTime { delta: FRAME, unscaled_delta: FRAME };
        npc.on_trigger_enter(&mut d);
        npc.update(&time, &InputFrame::none(), &MissionFlags::default(), &mut d);
        assert!(!d.is_running());
        npc.update(&time, &InputFrame::keys(&[Key::E]), &MissionFlags::default(), &mut d);
        assert!(d.is_running());
    }
}
