/// Heaven's Eve: headless host for the gameplay layer
///
/// Loads the TOML config, opens the saved mission flags, optionally replays
/// an input script through the session and logs the resulting UI state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use heavenseve::engine::sound_engine::{AudioOutput, RecordingOutput};
use heavenseve::game::save::SaveManager;
use heavenseve::replay::{Replay, ReplayScript};
use heavenseve::Session;
use heavenseve_common::{GameConfig, SceneId};

#[derive(Parser, Debug)]
#[command(name = "heavenseve", version, about = "Heaven's Eve gameplay host")]
struct Args {
    /// Game config (TOML); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the mission flags, overrides the config
    #[arg(short, long)]
    save_dir: Option<PathBuf>,

    /// Forget the saved mission flags before starting
    #[arg(long)]
    reset: bool,

    /// Replay script (TOML) to run through the session
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = GameConfig::load_or_default(args.config.as_deref())
        .with_context(|| format!("loading config {:?}", args.config))?;

    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env().add_directive("heavenseve=debug".parse()?),
        Err(_) => EnvFilter::new(&config.log_level),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Heaven's Eve v{}", env!("CARGO_PKG_VERSION"));

    let save = match args.save_dir.as_ref().or(config.save_dir.as_ref()) {
        Some(dir) => {
            std::fs::create_dir_all(dir).with_context(|| format!("creating save dir {}", dir.display()))?;
            SaveManager::new(dir)
        }
        None => {
            tracing::info!("No save dir, mission flags stay in memory");
            SaveManager::in_memory()
        }
    };

    let output = audio_output(&config);
    let mut session = Session::new(config, save, output);
    if args.reset {
        session.go_to_main_menu();
        session.drain_commands();
    }

    match &args.script {
        Some(path) => {
            let script = ReplayScript::load(path)?;
            let summary = Replay::new(&mut session, script.frame_seconds).run(&script)?;
            tracing::info!(
                "Replay done: {} frames, scenes {:?}{}",
                summary.frames,
                summary.scenes,
                if summary.quit { ", quit" } else { "" }
            );
        }
        None => session.on_scene_loaded(SceneId::MainMenu),
    }

    log_state(&session);
    Ok(())
}

#[cfg(feature = "rodio")]
fn audio_output(config: &GameConfig) -> Box<dyn AudioOutput> {
    use heavenseve::engine::sound_engine::SoundEngine;

    let dir = config.audio.audio_dir.clone().unwrap_or_else(|| PathBuf::from("audio"));
    match SoundEngine::new(dir) {
        Some(engine) => Box::new(engine),
        None => Box::new(RecordingOutput::new()),
    }
}

#[cfg(not(feature = "rodio"))]
fn audio_output(_config: &GameConfig) -> Box<dyn AudioOutput> {
    Box::new(RecordingOutput::new())
}

fn log_state(session: &Session) {
    let flags = session.flags();
    tracing::info!(
        "Scene {:?} | phase {:?} | forest={} room={} bike={} finale={}",
        session.scene(),
        session.phase(),
        flags.forest,
        flags.room,
        flags.bike,
        flags.finale
    );
    tracing::info!("Mission: {}", session.prompt().mission_text());
    tracing::info!("Interaction: {}", session.prompt().interaction());
    if let Some(message) = session.prompt().message() {
        tracing::info!("Message: {}", message);
    }
    let items: Vec<&str> = session.inventory().items().map(|g| g.name.as_str()).collect();
    tracing::info!(
        "Inventory: {:?} | hearts {} | timer {}",
        items,
        session.health().hearts_visible(),
        session.timer_text()
    );
    if session.is_game_over() {
        tracing::info!("Game over panel is up");
    }
}
