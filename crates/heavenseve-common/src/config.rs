//! Game configuration loaded from TOML
//!
//! Every section carries `#[serde(default)]`, so a config file only needs the
//! values it wants to change. Gift and plush records replace the data assets
//! the scenes used to reference by name.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Language, SceneId};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Data records
// ---------------------------------------------------------------------------

/// A collectible item that can sit in an inventory slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftData {
    /// Stable identity of the pickup (one per placed gift)
    pub id: String,
    /// Display name, also used for name lookups ("Casco", "Disco", ...)
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl GiftData {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// A plush shown in the closet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlushData {
    pub name: String,
    /// Lines played before the confirm prompt
    #[serde(default)]
    pub lines: Vec<String>,
    /// Picking a negative plush hurts the player
    #[serde(default)]
    pub negative: bool,
    /// Damage dealt when a negative plush is picked (0 uses the closet default)
    #[serde(default)]
    pub damage_on_pick: u32,
    /// Used when the closet has no explicit list of correct plushes
    #[serde(default)]
    pub correct: bool,
}

/// Axis-aligned rectangle in UI coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UiRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl UiRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.width && py < self.y + self.height
    }
}

/// A draggable piece of the repair minigame and where it starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragItemLayout {
    pub id: String,
    pub rect: UiRect,
}

/// How the chasing enemy tracks the player vertically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowMode {
    HorizontalOnly,
    #[default]
    FollowYClamped,
    Full2d,
}

/// What has to be done before a level exit lets the player through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitRequirement {
    #[default]
    None,
    ForestMission,
    Finale,
}

/// A level exit placed in a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitConfig {
    pub scene: SceneId,
    pub target: SceneId,
    #[serde(default)]
    pub requires: ExitRequirement,
    /// Where the player appears in the target scene
    #[serde(default)]
    pub spawn: Option<[f32; 2]>,
    /// Leave automatically once the player walks past this x
    #[serde(default)]
    pub limit_x: Option<f32>,
}

impl ExitConfig {
    fn new(scene: SceneId, target: SceneId, requires: ExitRequirement, spawn: Option<[f32; 2]>) -> Self {
        Self { scene, target, requires, spawn, limit_x: None }
    }
}

/// When a scripted dialogue starts by itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueTrigger {
    Manual,
    OnStart,
    OnTriggerEnter,
    #[default]
    OnInteract,
    OnFlagTrue,
}

/// Mission flag a scripted dialogue can wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchedFlag {
    #[default]
    None,
    Forest,
    Room,
    Bike,
    Finale,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptedDialogueConfig {
    pub lines: Vec<String>,
    pub play_once: bool,
    pub trigger: DialogueTrigger,
    /// Realtime delay for `on_start` and `on_flag_true`
    pub start_delay: f32,
    /// With `on_trigger_enter`, wait for the interact key inside the trigger
    pub require_interact_input: bool,
    pub watch_flag: WatchedFlag,
    pub freeze_movement: bool,
}

impl Default for ScriptedDialogueConfig {
    fn default() -> Self {
        Self {
            lines: vec![
                "¿Estás perdido? Tu hija te espera en casa.".to_string(),
                "Encuentra los tres regalos antes de que sea tarde.".to_string(),
            ],
            play_once: true,
            trigger: DialogueTrigger::OnInteract,
            start_delay: 0.0,
            require_interact_input: false,
            watch_flag: WatchedFlag::None,
            freeze_movement: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub gift_target: usize,
    /// Countdown started when the player talks to the NPC (seconds)
    pub mission_duration: f32,
    /// Delay between talking to the NPC and the enemy appearing (seconds)
    pub enemy_spawn_delay: f32,
    pub npc: ScriptedDialogueConfig,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            gift_target: 3,
            mission_duration: 30.0,
            enemy_spawn_delay: 10.0,
            npc: ScriptedDialogueConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub base_speed: f32,
    pub max_speed: f32,
    /// Time over which the speed ramps from base to max
    pub mission_total_time: f32,
    pub follow: FollowMode,
    pub min_y: f32,
    pub max_y: f32,
    pub max_vertical_speed: f32,
    pub hit_damage: u32,
    pub spawn: [f32; 2],
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            base_speed: 0.8,
            max_speed: 4.0,
            mission_total_time: 30.0,
            follow: FollowMode::FollowYClamped,
            min_y: -5.0,
            max_y: 5.0,
            max_vertical_speed: 2.0,
            hit_damage: 1,
            spawn: [-12.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub move_speed: f32,
    pub max_hits: u32,
    pub spawn: [f32; 2],
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            max_hits: 5,
            spawn: [0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    pub chars_per_second: f32,
    /// Advance input is ignored this long after a sequence starts
    pub input_block_seconds: f32,
    /// Pause between the last line and the yes/no prompt
    pub confirm_delay_seconds: f32,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            chars_per_second: 40.0,
            input_block_seconds: 0.12,
            confirm_delay_seconds: 0.08,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Inventory item delivered when the closet is sorted
    pub plush_item: String,
    /// Damage for negative plushes that do not set their own
    pub negatives_damage: u32,
    /// Names of the correct plushes; empty falls back to `PlushData::correct`
    pub correct: Vec<String>,
    pub plushes: Vec<PlushData>,
    pub pause_on_open: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            plush_item: "Peluche".to_string(),
            negatives_damage: 1,
            correct: Vec::new(),
            plushes: vec![
                PlushData {
                    name: "Pingüino".to_string(),
                    lines: vec!["Su pingüino favorito, el que abraza cada noche.".to_string()],
                    negative: false,
                    damage_on_pick: 0,
                    correct: true,
                },
                PlushData {
                    name: "Conejo".to_string(),
                    lines: vec!["Un conejo de orejas largas.".to_string()],
                    negative: false,
                    damage_on_pick: 0,
                    correct: true,
                },
                PlushData {
                    name: "Payaso".to_string(),
                    lines: vec!["Este payaso no le gusta nada...".to_string()],
                    negative: true,
                    damage_on_pick: 1,
                    correct: false,
                },
                PlushData {
                    name: "Oso".to_string(),
                    lines: vec!["Un oso viejo, sin un ojo.".to_string()],
                    negative: false,
                    damage_on_pick: 0,
                    correct: false,
                },
            ],
            pause_on_open: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BikeConfig {
    pub required_items: Vec<String>,
    pub items: Vec<DragItemLayout>,
    pub drop_zone: UiRect,
    /// Local countdown used when the shared timer is off or missing
    pub time_limit_seconds: f32,
    pub use_shared_timer: bool,
    pub shared_timer_seconds: f32,
    /// Number of bike state sprites shown while repairing
    pub state_sprites: usize,
    pub helmet_item: String,
    pub success_lines: Vec<String>,
    pub failed_lines: Vec<String>,
    pub pause_on_open: bool,
}

impl Default for BikeConfig {
    fn default() -> Self {
        Self {
            required_items: vec!["cadena".to_string(), "rueda".to_string(), "pedal".to_string()],
            items: vec![
                DragItemLayout { id: "cadena".to_string(), rect: UiRect::new(40.0, 60.0, 64.0, 64.0) },
                DragItemLayout { id: "rueda".to_string(), rect: UiRect::new(40.0, 160.0, 64.0, 64.0) },
                DragItemLayout { id: "pedal".to_string(), rect: UiRect::new(40.0, 260.0, 64.0, 64.0) },
                DragItemLayout { id: "tornillo".to_string(), rect: UiRect::new(40.0, 360.0, 64.0, 64.0) },
            ],
            drop_zone: UiRect::new(300.0, 100.0, 280.0, 240.0),
            time_limit_seconds: 40.0,
            use_shared_timer: true,
            shared_timer_seconds: 10.0,
            state_sprites: 4,
            helmet_item: "Casco".to_string(),
            success_lines: vec!["La bicicleta ha quedado como nueva.".to_string()],
            failed_lines: vec!["No lograste repararla a tiempo. Inténtalo de nuevo.".to_string()],
            pause_on_open: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurntableConfig {
    pub disk_item: String,
    /// Realtime interval of the gate visual refresh
    pub gate_poll_seconds: f32,
    /// Degrees per second, negative spins clockwise
    pub spin_speed: f32,
    /// Stop spinning after this many seconds (None spins forever)
    pub stop_after_seconds: Option<f32>,
}

impl Default for TurntableConfig {
    fn default() -> Self {
        Self {
            disk_item: "Disco".to_string(),
            gate_poll_seconds: 0.5,
            spin_speed: -180.0,
            stop_after_seconds: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Directory holding the audio tracks (only used with real output)
    pub audio_dir: Option<PathBuf>,
    pub ambient_track: String,
    pub turntable_track: String,
    pub ambient_volume: f32,
    pub turntable_volume: f32,
    pub ambient_fade_in_seconds: f32,
    pub fade_to_turntable_seconds: f32,
    pub fade_back_to_ambient_seconds: f32,
    pub play_ambient_on_start: bool,
    pub turntable_loop: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            audio_dir: None,
            ambient_track: "ambient.ogg".to_string(),
            turntable_track: "turntable.ogg".to_string(),
            ambient_volume: 0.6,
            turntable_volume: 0.8,
            ambient_fade_in_seconds: 1.0,
            fade_to_turntable_seconds: 2.0,
            fade_back_to_ambient_seconds: 2.0,
            play_ambient_on_start: true,
            turntable_loop: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutsceneConfig {
    pub auto_duration_seconds: f32,
    pub fade_seconds: f32,
}

impl Default for CutsceneConfig {
    fn default() -> Self {
        Self {
            auto_duration_seconds: 54.0,
            fade_seconds: 0.35,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Realtime wait between confirming a level exit and loading the scene
    pub level_change_delay: f32,
    pub overlay_fade_seconds: f32,
    pub game_over_fade_seconds: f32,
    pub exits: Vec<ExitConfig>,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        use SceneId::*;
        let open = ExitRequirement::None;
        Self {
            level_change_delay: 1.0,
            overlay_fade_seconds: 0.35,
            game_over_fade_seconds: 0.35,
            exits: vec![
                ExitConfig::new(Bosque, Exterior, ExitRequirement::ForestMission, Some([-8.0, 0.0])),
                ExitConfig::new(Exterior, Sala, open, Some([-6.0, 0.0])),
                ExitConfig::new(Sala, Cuarto, open, Some([-4.0, 0.0])),
                ExitConfig::new(Cuarto, Sala, open, Some([4.0, 0.0])),
                ExitConfig::new(Sala, Sotano, open, Some([0.0, 0.0])),
                ExitConfig::new(Sotano, Sala, open, Some([0.0, 0.0])),
                ExitConfig::new(Sotano, CutsceneFinal, ExitRequirement::Finale, None),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Root
// ---------------------------------------------------------------------------

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub language: Language,
    pub log_level: String,
    /// Where the mission flags are persisted (None keeps them in memory)
    pub save_dir: Option<PathBuf>,
    pub gifts: Vec<GiftData>,
    pub forest: ForestConfig,
    pub enemy: EnemyConfig,
    pub player: PlayerConfig,
    pub dialogue: DialogueConfig,
    pub room: RoomConfig,
    pub bike: BikeConfig,
    pub turntable: TurntableConfig,
    pub audio: AudioConfig,
    pub cutscene: CutsceneConfig,
    pub transitions: TransitionConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            language: Language::Spanish,
            log_level: "info".to_string(),
            save_dir: None,
            gifts: vec![
                GiftData::new("regalo_peluche", "Peluche", "Un pingüino de peluche envuelto en papel rojo."),
                GiftData::new("regalo_casco", "Casco", "Un casco de bicicleta, justo de su talla."),
                GiftData::new("regalo_disco", "Disco", "Un disco de vinilo con su canción favorita."),
            ],
            forest: ForestConfig::default(),
            enemy: EnemyConfig::default(),
            player: PlayerConfig::default(),
            dialogue: DialogueConfig::default(),
            room: RoomConfig::default(),
            bike: BikeConfig::default(),
            turntable: TurntableConfig::default(),
            audio: AudioConfig::default(),
            cutscene: CutsceneConfig::default(),
            transitions: TransitionConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self> {
        let config: GameConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text, path)?;
        tracing::info!(
            "Loaded config {}: {} gifts, {} plushes",
            path.display(),
            config.gifts.len(),
            config.room.plushes.len()
        );
        Ok(config)
    }

    /// Load a config file if one was given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                tracing::info!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Look up a gift record by its pickup identity
    pub fn gift(&self, id: &str) -> Option<&GiftData> {
        self.gifts.iter().find(|g| g.id == id)
    }

    fn validate(&self) -> Result<()> {
        if self.forest.gift_target == 0 {
            return Err(ConfigError::Invalid("forest.gift_target must be at least 1".into()));
        }
        if self.dialogue.chars_per_second < 0.0 {
            return Err(ConfigError::Invalid("dialogue.chars_per_second must not be negative".into()));
        }
        let enemy = &self.enemy;
        for (name, value) in [
            ("base_speed", enemy.base_speed),
            ("max_speed", enemy.max_speed),
            ("mission_total_time", enemy.mission_total_time),
            ("min_y", enemy.min_y),
            ("max_y", enemy.max_y),
            ("max_vertical_speed", enemy.max_vertical_speed),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("enemy.{} must be a finite number", name)));
            }
        }
        if enemy.base_speed > enemy.max_speed {
            return Err(ConfigError::Invalid("enemy.base_speed is above enemy.max_speed".into()));
        }
        if enemy.min_y > enemy.max_y {
            return Err(ConfigError::Invalid("enemy.min_y is above enemy.max_y".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for gift in &self.gifts {
            if !seen.insert(gift.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate gift id '{}'", gift.id)));
            }
        }
        Ok(())
    }
}
