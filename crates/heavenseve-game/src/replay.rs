//! Replay scripts: scripted input for a headless session
//!
//! A script is a flat list of steps read from TOML. Each step feeds frames,
//! triggers or pointer events into the `Session`; scene loads the session asks
//! for are answered at once, the way a host engine would.
//!
//! ```toml
//! start_scene = "Bosque"
//!
//! [[steps]]
//! action = "enter"
//! id = "NPC"
//!
//! [[steps]]
//! action = "press"
//! keys = ["E"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use heavenseve_common::SceneId;

use crate::engine::{HostCommand, InputFrame, Key};
use crate::game::Session;

/// Frames a `wait_for_load` step runs before giving up
const LOAD_WAIT_FRAMES: usize = 2000;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Failed to read replay {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid replay {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Replay step {step}: no scene load within {frames} frames")]
    LoadTimeout { step: usize, frames: usize },

    #[error("Replay frame length must be positive, got {0}")]
    BadFrame(f32),
}

pub type Result<T> = std::result::Result<T, ReplayError>;

/// One scripted step
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReplayStep {
    /// Idle frames
    Wait { seconds: f32 },
    /// One frame with `keys` down
    Press { keys: Vec<Key> },
    /// Hold the movement axes
    Walk { axis: [f32; 2], seconds: f32 },
    /// Player entered an interactable's trigger
    Enter { id: String },
    Leave { id: String },
    /// Player entered the exit towards `target`
    EnterExit { target: SceneId },
    LeaveExit { target: SceneId },
    /// Drag from one screen point to another
    Drag { from: [f32; 2], to: [f32; 2] },
    /// Click a closet plush button
    ClickPlush { index: usize },
    CloseCloset,
    CloseBike,
    /// The enemy touched the player
    Contact,
    /// Main menu "play"
    Play,
    /// Run frames until the session loads a scene
    WaitForLoad,
}

fn default_frame() -> f32 {
    1.0 / 60.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    #[serde(default = "default_frame")]
    pub frame_seconds: f32,
    /// Scene reported as loaded before the first step
    pub start_scene: Option<SceneId>,
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self> {
        let script: ReplayScript = toml::from_str(text).map_err(|source| ReplayError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if script.frame_seconds <= 0.0 {
            return Err(ReplayError::BadFrame(script.frame_seconds));
        }
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let script = Self::from_toml_str(&text, path)?;
        tracing::info!("Loaded replay {}: {} steps", path.display(), script.steps.len());
        Ok(script)
    }
}

/// What happened during a replay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    pub frames: usize,
    /// Scenes loaded, in order
    pub scenes: Vec<SceneId>,
    pub quit: bool,
}

/// Drives a session through a script
pub struct Replay<'a> {
    session: &'a mut Session,
    frame: f32,
    summary: ReplaySummary,
}

impl<'a> Replay<'a> {
    pub fn new(session: &'a mut Session, frame_seconds: f32) -> Self {
        Self {
            session,
            frame: frame_seconds,
            summary: ReplaySummary::default(),
        }
    }

    /// Run every step of `script`. Stops early when the session quits.
    pub fn run(mut self, script: &ReplayScript) -> Result<ReplaySummary> {
        if let Some(scene) = script.start_scene {
            self.load(scene);
        }
        for (index, step) in script.steps.iter().enumerate() {
            if self.summary.quit {
                tracing::info!("Replay: quit requested, {} steps skipped", script.steps.len() - index);
                break;
            }
            tracing::debug!("Replay step {}: {:?}", index, step);
            self.step(index, step)?;
        }
        Ok(self.summary)
    }

    fn step(&mut self, index: usize, step: &ReplayStep) -> Result<()> {
        match step {
            ReplayStep::Wait { seconds } => self.frames(*seconds, &InputFrame::none()),
            ReplayStep::Press { keys } => self.frame(&InputFrame::keys(keys)),
            ReplayStep::Walk { axis, seconds } => {
                self.frames(*seconds, &InputFrame::none().with_axis(axis[0], axis[1]))
            }
            ReplayStep::Enter { id } => self.session.on_trigger_enter(id),
            ReplayStep::Leave { id } => self.session.on_trigger_exit(id),
            ReplayStep::EnterExit { target } => self.session.on_exit_enter(*target),
            ReplayStep::LeaveExit { target } => self.session.on_exit_leave(*target),
            ReplayStep::Drag { from, to } => {
                if self.session.pointer_down(from[0], from[1]) {
                    self.session.pointer_move(to[0], to[1]);
                    self.session.pointer_up(to[0], to[1]);
                } else {
                    tracing::warn!("Replay: nothing to drag at ({}, {})", from[0], from[1]);
                }
            }
            ReplayStep::ClickPlush { index } => self.session.click_plush(*index),
            ReplayStep::CloseCloset => self.session.close_closet(),
            ReplayStep::CloseBike => self.session.close_bike(),
            ReplayStep::Contact => self.session.on_enemy_contact(),
            ReplayStep::Play => self.session.play_game(),
            ReplayStep::WaitForLoad => return self.wait_for_load(index),
        }
        self.handle_commands();
        Ok(())
    }

    fn frame(&mut self, input: &InputFrame) {
        self.session.update(self.frame, input);
        self.summary.frames += 1;
        self.handle_commands();
    }

    fn frames(&mut self, seconds: f32, input: &InputFrame) {
        let count = (seconds / self.frame).ceil().max(0.0) as usize;
        for _ in 0..count {
            self.frame(input);
            if self.summary.quit {
                return;
            }
        }
    }

    fn wait_for_load(&mut self, index: usize) -> Result<()> {
        let loaded = self.summary.scenes.len();
        self.handle_commands();
        for _ in 0..LOAD_WAIT_FRAMES {
            if self.summary.scenes.len() > loaded || self.summary.quit {
                return Ok(());
            }
            self.frame(&InputFrame::none());
        }
        if self.summary.scenes.len() > loaded {
            return Ok(());
        }
        Err(ReplayError::LoadTimeout {
            step: index,
            frames: LOAD_WAIT_FRAMES,
        })
    }

    fn handle_commands(&mut self) {
        for command in self.session.drain_commands() {
            match command {
                HostCommand::LoadScene(scene) => self.load(scene),
                HostCommand::Quit => self.summary.quit = true,
            }
        }
    }

    fn load(&mut self, scene: SceneId) {
        self.session.on_scene_loaded(scene);
        self.summary.scenes.push(scene);
    }
}
