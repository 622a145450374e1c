//! Drag & Drop minigame: parts dragged onto a drop zone against the clock
//!
//!   - Pointer down on a visible part → start drag (record grab offset, raise it)
//!   - Pointer move → the part follows the pointer
//!   - Pointer up → over a drop zone the minigame validates the placement,
//!     anywhere else (or when rejected) the part returns to its anchor
//!
//! A run ends exactly once: `Completed` when every required part is placed,
//! `Failed` when the countdown runs out first. The countdown is either the
//! shared HUD timer (borrowed for the run, unscaled clock) or a local one.

use std::collections::HashSet;

use heavenseve_common::config::{BikeConfig, UiRect};

use crate::engine::{ClockMode, FrameTime};
use crate::game::timer::{self, Countdown, ExpiryTarget, TimerRegistry, SHARED_TIMER_TAG};

// ---------------------------------------------------------------------------
// Drop Zone
// ---------------------------------------------------------------------------

/// A region that accepts dragged parts
#[derive(Debug, Clone)]
pub struct DropZone {
    pub id: String,
    pub rect: UiRect,
}

impl DropZone {
    pub fn hit_test(&self, px: f32, py: f32) -> bool {
        self.rect.contains(px, py)
    }
}

// ---------------------------------------------------------------------------
// Draggable Item
// ---------------------------------------------------------------------------

/// A part on the minigame panel
#[derive(Debug, Clone)]
pub struct DraggableItem {
    pub id: String,
    /// Current rectangle in UI coordinates
    pub rect: UiRect,
    /// Position the part returns to
    anchor: UiRect,
    /// Layout position at the start of a run
    origin: UiRect,
    pub visible: bool,
    pub dragging: bool,
    pub z_order: i32,
}

impl DraggableItem {
    pub fn new(id: &str, rect: UiRect, z_order: i32) -> Self {
        Self {
            id: id.to_string(),
            rect,
            anchor: rect,
            origin: rect,
            visible: true,
            dragging: false,
            z_order,
        }
    }

    pub fn hit_test(&self, px: f32, py: f32) -> bool {
        self.visible && self.rect.contains(px, py)
    }

    fn return_to_anchor(&mut self) {
        self.rect = self.anchor;
    }

    fn reset_to_origin(&mut self) {
        self.rect = self.origin;
        self.anchor = self.origin;
        self.visible = true;
        self.dragging = false;
    }
}

// ---------------------------------------------------------------------------
// Minigame state
// ---------------------------------------------------------------------------

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinigameOutcome {
    Completed,
    Failed,
}

/// What happened when the pointer was released
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropResult {
    /// Part accepted by the zone and hidden
    Placed { id: String },
    /// Part went back to its anchor
    Returned { id: String },
    /// No drag was active
    Nothing,
}

/// Which countdown drives the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerSource {
    Shared,
    Local,
}

pub struct DragDropMinigame {
    required: Vec<String>,
    pub items: Vec<DraggableItem>,
    pub zones: Vec<DropZone>,
    placed: HashSet<String>,
    running: bool,
    /// Outcome reached this run, reported once through `take_outcome`
    outcome: Option<MinigameOutcome>,
    reported: bool,
    source: TimerSource,
    shared_seconds: f32,
    time_limit: f32,
    local_timer: Countdown,
    state_sprites: usize,
    dragging_idx: Option<usize>,
    grab_offset: (f32, f32),
}

impl DragDropMinigame {
    pub fn new(config: &BikeConfig) -> Self {
        let items = config
            .items
            .iter()
            .enumerate()
            .map(|(i, layout)| DraggableItem::new(&layout.id, layout.rect, i as i32))
            .collect();
        Self {
            required: config.required_items.clone(),
            items,
            zones: vec![DropZone { id: "bike".to_string(), rect: config.drop_zone }],
            placed: HashSet::new(),
            running: false,
            outcome: None,
            reported: false,
            source: if config.use_shared_timer { TimerSource::Shared } else { TimerSource::Local },
            shared_seconds: config.shared_timer_seconds,
            time_limit: config.time_limit_seconds,
            local_timer: Countdown::new(ClockMode::Unscaled),
            state_sprites: config.state_sprites,
            dragging_idx: None,
            grab_offset: (0.0, 0.0),
        }
    }

    // -----------------------------------------------------------------------
    // Run lifecycle
    // -----------------------------------------------------------------------

    /// Begin a run: reset the parts and arm the countdown
    pub fn start(&mut self, timers: &mut TimerRegistry) {
        for id in &self.required {
            if !self.items.iter().any(|item| &item.id == id) {
                tracing::warn!("DragDrop: required part '{}' has no draggable item", id);
            }
        }
        self.placed.clear();
        self.outcome = None;
        self.reported = false;
        self.dragging_idx = None;
        for item in &mut self.items {
            item.reset_to_origin();
        }

        match self.source {
            TimerSource::Shared => match timers.get_mut(SHARED_TIMER_TAG) {
                Some(shared) => {
                    shared.set_clock(ClockMode::Unscaled);
                    shared.set_target(ExpiryTarget::Minigame);
                    shared.set_time(self.shared_seconds);
                    shared.start();
                }
                None => tracing::warn!("DragDrop: shared timer '{}' not registered", SHARED_TIMER_TAG),
            },
            TimerSource::Local => {
                self.local_timer.set_time(self.time_limit);
                self.local_timer.start();
            }
        }
        self.running = true;
        tracing::info!("DragDrop: started ({} parts required)", self.required.len());
    }

    /// Halt the run and hand the shared timer back
    pub fn stop(&mut self, timers: &mut TimerRegistry) {
        self.running = false;
        self.dragging_idx = None;
        self.local_timer.stop();
        if self.source == TimerSource::Shared {
            if let Some(shared) = timers.get_mut(SHARED_TIMER_TAG) {
                shared.stop();
                shared.set_target(ExpiryTarget::Orchestrator);
                shared.set_clock(ClockMode::Scaled);
            }
        }
    }

    /// Advance the local countdown. Returns the outcome the first time one is reached.
    pub fn update(&mut self, time: &FrameTime, timers: &mut TimerRegistry) -> Option<MinigameOutcome> {
        if self.running
            && self.source == TimerSource::Local
            && self.local_timer.tick(time).is_some()
        {
            self.fail(timers);
        }
        self.take_outcome()
    }

    /// Called when the borrowed shared timer reaches zero
    pub fn on_shared_timer_expired(&mut self, timers: &mut TimerRegistry) -> Option<MinigameOutcome> {
        if !self.running {
            return None;
        }
        self.fail(timers);
        self.take_outcome()
    }

    fn fail(&mut self, timers: &mut TimerRegistry) {
        tracing::info!("DragDrop: time ran out ({}/{})", self.placed.len(), self.required.len());
        self.stop(timers);
        self.outcome = Some(MinigameOutcome::Failed);
    }

    /// The run's outcome, at most once per run
    pub fn take_outcome(&mut self) -> Option<MinigameOutcome> {
        if self.reported {
            return None;
        }
        let outcome = self.outcome?;
        self.reported = true;
        Some(outcome)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn outcome(&self) -> Option<MinigameOutcome> {
        self.outcome
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Ask the minigame to accept `item_id` on `zone_id`
    pub fn try_place(&mut self, item_id: &str, zone_id: &str, timers: &mut TimerRegistry) -> bool {
        let Some(idx) = self.items.iter().position(|i| i.id == item_id) else {
            tracing::warn!("DragDrop: unknown part '{}'", item_id);
            return false;
        };
        let accepted = self.running
            && self.zones.iter().any(|z| z.id == zone_id)
            && self.required.iter().any(|r| r == item_id)
            && !self.placed.contains(item_id);
        if !accepted {
            tracing::debug!("DragDrop: '{}' rejected by '{}'", item_id, zone_id);
            self.items[idx].return_to_anchor();
            return false;
        }

        self.placed.insert(item_id.to_string());
        self.items[idx].visible = false;
        tracing::debug!("DragDrop: placed '{}' ({})", item_id, self.progress_text());

        if self.placed.len() >= self.required.len() {
            tracing::info!("DragDrop: all parts placed");
            self.stop(timers);
            self.outcome = Some(MinigameOutcome::Completed);
        }
        true
    }

    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    pub fn is_placed(&self, id: &str) -> bool {
        self.placed.contains(id)
    }

    /// "{placed}/{required}"
    pub fn progress_text(&self) -> String {
        format!("{}/{}", self.placed.len(), self.required.len())
    }

    /// Which bike sprite to show for the current progress
    pub fn state_sprite_index(&self) -> usize {
        self.placed.len().min(self.state_sprites.saturating_sub(1))
    }

    /// Countdown text: the shared timer as "MM:SS", the local one as "SS"
    pub fn timer_text(&self, timers: &TimerRegistry) -> String {
        match self.source {
            TimerSource::Shared => timers
                .get(SHARED_TIMER_TAG)
                .map(Countdown::text)
                .unwrap_or_else(|| timer::format_mm_ss(0.0)),
            TimerSource::Local => timer::format_ss(self.local_timer.remaining()),
        }
    }

    // -----------------------------------------------------------------------
    // Pointer input
    // -----------------------------------------------------------------------

    /// Find the topmost visible part at (px, py)
    pub fn item_at(&self, px: f32, py: f32) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.hit_test(px, py))
            .max_by_key(|(_, item)| item.z_order)
            .map(|(i, _)| i)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging_idx.is_some()
    }

    pub fn dragged_item(&self) -> Option<&DraggableItem> {
        self.dragging_idx.and_then(|i| self.items.get(i))
    }

    /// Returns true if a drag started
    pub fn pointer_down(&mut self, px: f32, py: f32) -> bool {
        if !self.running || self.dragging_idx.is_some() {
            return false;
        }
        let Some(idx) = self.item_at(px, py) else {
            return false;
        };
        let max_z = self.items.iter().map(|i| i.z_order).max().unwrap_or(0);
        let item = &mut self.items[idx];
        item.anchor = item.rect;
        item.dragging = true;
        item.z_order = max_z + 1;
        self.grab_offset = (item.rect.x - px, item.rect.y - py);
        self.dragging_idx = Some(idx);
        tracing::debug!("Drag start: '{}' at ({}, {})", item.id, px, py);
        true
    }

    pub fn pointer_move(&mut self, px: f32, py: f32) {
        if let Some(idx) = self.dragging_idx {
            let item = &mut self.items[idx];
            item.rect.x = px + self.grab_offset.0;
            item.rect.y = py + self.grab_offset.1;
        }
    }

    pub fn pointer_up(&mut self, px: f32, py: f32, timers: &mut TimerRegistry) -> DropResult {
        let Some(idx) = self.dragging_idx.take() else {
            return DropResult::Nothing;
        };
        self.items[idx].dragging = false;
        let id = self.items[idx].id.clone();

        let zone = self.zones.iter().find(|z| z.hit_test(px, py)).map(|z| z.id.clone());
        match zone {
            Some(zone_id) if self.try_place(&id, &zone_id, timers) => DropResult::Placed { id },
            Some(_) => DropResult::Returned { id },
            None => {
                self.items[idx].return_to_anchor();
                DropResult::Returned { id }
            }
        }
    }
}
