//! Common types shared across Heaven's Eve crates
//!
//!   - `SceneId`: the scenes of the game and their engine-side names
//!   - `Language`: UI language selection
//!   - `config`: TOML-backed tuning and data records (gifts, plushes, timings)

pub mod config;

pub use config::{ConfigError, GameConfig};

use serde::{Deserialize, Serialize};

/// Scenes of the game, in story order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneId {
    MainMenu,
    CutsceneIntro,
    Bosque,
    Exterior,
    Sala,
    Cuarto,
    Sotano,
    CutsceneFinal,
}

impl SceneId {
    /// Name the host engine uses for this scene
    pub fn scene_name(&self) -> &'static str {
        match self {
            SceneId::MainMenu => "MainMenu",
            SceneId::CutsceneIntro => "CutsceneIntro",
            SceneId::Bosque => "Bosque",
            SceneId::Exterior => "Exterior",
            SceneId::Sala => "Sala",
            SceneId::Cuarto => "Cuarto",
            SceneId::Sotano => "Sotano",
            SceneId::CutsceneFinal => "CutsceneFinal",
        }
    }

    /// Look up a scene by its engine name
    pub fn from_name(name: &str) -> Option<SceneId> {
        SceneId::all().into_iter().find(|s| s.scene_name() == name)
    }

    /// Cutscene scenes play a clip and move on by themselves
    pub fn is_cutscene(&self) -> bool {
        matches!(self, SceneId::CutsceneIntro | SceneId::CutsceneFinal)
    }

    /// Get all scenes
    pub fn all() -> Vec<SceneId> {
        vec![
            SceneId::MainMenu,
            SceneId::CutsceneIntro,
            SceneId::Bosque,
            SceneId::Exterior,
            SceneId::Sala,
            SceneId::Cuarto,
            SceneId::Sotano,
            SceneId::CutsceneFinal,
        ]
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.scene_name())
    }
}

/// Supported UI languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[serde(alias = "es")]
    Spanish,
    #[serde(alias = "en")]
    English,
}

impl Language {
    /// Cycle to the next language
    pub fn next(self) -> Self {
        match self {
            Language::Spanish => Language::English,
            Language::English => Language::Spanish,
        }
    }

    /// Short display code
    pub fn code(&self) -> &'static str {
        match self {
            Language::Spanish => "ES",
            Language::English => "EN",
        }
    }
}
