//! Music director: ambient loop and the turntable track
//!
//! Fades run on the unscaled clock so music keeps moving while the game is
//! paused. The turntable crossfade happens at most once until the director
//! goes back to ambient.

use heavenseve_common::config::AudioConfig;

use crate::engine::sound_engine::{AudioOutput, Channel};
use crate::engine::{ClockMode, FrameTime};
use crate::game::task::Fade;

pub struct AudioDirector {
    config: AudioConfig,
    output: Box<dyn AudioOutput>,
    ambient_fade: Option<Fade>,
    turntable_fade: Option<Fade>,
    ambient_volume: f32,
    turntable_volume: f32,
    ambient_playing: bool,
    turntable_playing: bool,
    turntable_activated: bool,
}

impl AudioDirector {
    pub fn new(config: AudioConfig, output: Box<dyn AudioOutput>) -> Self {
        let mut director = Self {
            config,
            output,
            ambient_fade: None,
            turntable_fade: None,
            ambient_volume: 0.0,
            turntable_volume: 0.0,
            ambient_playing: false,
            turntable_playing: false,
            turntable_activated: false,
        };
        director.output.set_volume(Channel::Ambient, 0.0);
        director.output.set_volume(Channel::Turntable, 0.0);
        director
    }

    /// Called once at startup
    pub fn start(&mut self) {
        if self.config.play_ambient_on_start {
            self.play_ambient_initial();
        }
    }

    /// Start the ambient loop from silence
    pub fn play_ambient_initial(&mut self) {
        if self.config.ambient_track.is_empty() {
            tracing::warn!("AudioDirector: no ambient track configured");
            return;
        }
        self.set_ambient_volume(0.0);
        self.output.play(Channel::Ambient, &self.config.ambient_track, true);
        self.ambient_playing = true;
        self.ambient_fade = Some(Fade::new(
            0.0,
            self.config.ambient_volume,
            self.config.ambient_fade_in_seconds,
            ClockMode::Unscaled,
        ));
    }

    /// Crossfade ambient -> turntable. Returns false if already activated.
    pub fn play_turntable_track(&mut self) -> bool {
        if self.turntable_activated {
            tracing::debug!("AudioDirector: turntable already active, ignoring");
            return false;
        }
        self.turntable_activated = true;
        if self.config.turntable_track.is_empty() {
            tracing::warn!("AudioDirector: no turntable track configured");
            return true;
        }

        self.set_turntable_volume(0.0);
        self.output.play(Channel::Turntable, &self.config.turntable_track, self.config.turntable_loop);
        self.turntable_playing = true;

        let duration = self.config.fade_to_turntable_seconds;
        self.ambient_fade = Some(Fade::new(self.ambient_volume, 0.0, duration, ClockMode::Unscaled));
        self.turntable_fade = Some(Fade::new(0.0, self.config.turntable_volume, duration, ClockMode::Unscaled));
        tracing::info!("AudioDirector: crossfade to turntable ({}s)", duration);
        true
    }

    /// Stop the turntable and fade the ambient loop back in
    pub fn return_to_ambient(&mut self) {
        if self.turntable_playing {
            self.output.stop(Channel::Turntable);
            self.turntable_playing = false;
        }
        self.turntable_fade = None;
        self.turntable_activated = false;

        self.set_ambient_volume(0.0);
        if !self.ambient_playing {
            self.output.play(Channel::Ambient, &self.config.ambient_track, true);
            self.ambient_playing = true;
        }
        self.ambient_fade = Some(Fade::new(
            0.0,
            self.config.ambient_volume,
            self.config.fade_back_to_ambient_seconds,
            ClockMode::Unscaled,
        ));
    }

    /// Silence both channels at once
    pub fn stop_all(&mut self) {
        self.output.stop(Channel::Ambient);
        self.output.stop(Channel::Turntable);
        self.ambient_playing = false;
        self.turntable_playing = false;
        self.ambient_fade = None;
        self.turntable_fade = None;
    }

    /// Advance the running fades
    pub fn update(&mut self, time: &FrameTime) {
        if let Some(fade) = &mut self.ambient_fade {
            let done = fade.tick(time);
            let value = fade.value();
            if done {
                self.ambient_fade = None;
            }
            self.set_ambient_volume(value);
        }
        if let Some(fade) = &mut self.turntable_fade {
            let done = fade.tick(time);
            let value = fade.value();
            if done {
                self.turntable_fade = None;
            }
            self.set_turntable_volume(value);
        }
    }

    fn set_ambient_volume(&mut self, volume: f32) {
        self.ambient_volume = volume;
        self.output.set_volume(Channel::Ambient, volume);
    }

    fn set_turntable_volume(&mut self, volume: f32) {
        self.turntable_volume = volume;
        self.output.set_volume(Channel::Turntable, volume);
    }

    pub fn is_turntable_activated(&self) -> bool {
        self.turntable_activated
    }

    pub fn ambient_volume(&self) -> f32 {
        self.ambient_volume
    }

    pub fn turntable_volume(&self) -> f32 {
        self.turntable_volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sound_engine::RecordingOutput;

    fn director() -> (AudioDirector, RecordingOutput) {
        let out = RecordingOutput::new();
        let director = AudioDirector::new(AudioConfig::default(), Box::new(out.clone()));
        (director, out)
    }

    fn realtime(seconds: f32) -> FrameTime {
        FrameTime { delta: 0.0, unscaled_delta: seconds }
    }

    #[test]
    fn ambient_fades_in_while_paused() {
        let (mut d, out) = director();
        d.start();
        assert!(out.channel(Channel::Ambient).is_playing());
        assert_eq!(out.channel(Channel::Ambient).volume, 0.0);
        d.update(&realtime(0.5));
        assert!((d.ambient_volume() - 0.3).abs() < 1e-4);
        d.update(&realtime(0.6));
        assert_eq!(out.channel(Channel::Ambient).volume, 0.6);
    }

    #[test]
    fn turntable_crossfade_is_idempotent() {
        let (mut d, out) = director();
        d.start();
        d.update(&realtime(2.0));

        assert!(d.play_turntable_track());
        assert!(!d.play_turntable_track());
        assert_eq!(out.channel(Channel::Turntable).starts, 1);
        assert!(out.channel(Channel::Turntable).looped);

        d.update(&realtime(1.0));
        assert!((d.ambient_volume() - 0.3).abs() < 1e-4);
        assert!((d.turntable_volume() - 0.4).abs() < 1e-4);
        d.update(&realtime(1.5));
        assert_eq!(out.channel(Channel::Ambient).volume, 0.0);
        assert_eq!(out.channel(Channel::Turntable).volume, 0.8);
    }

    #[test]
    fn return_to_ambient_stops_turntable() {
        let (mut d, out) = director();
        d.start();
        d.play_turntable_track();
        d.return_to_ambient();
        assert!(!out.channel(Channel::Turntable).is_playing());
        assert!(!d.is_turntable_activated());
        d.update(&realtime(3.0));
        assert_eq!(d.ambient_volume(), 0.6);
        // Ambient kept playing, so no restart
        assert_eq!(out.channel(Channel::Ambient).starts, 1);
    }

    #[test]
    fn stop_all_silences_everything() {
        let (mut d, out) = director();
        d.start();
        d.play_turntable_track();
        d.stop_all();
        assert!(!out.channel(Channel::Ambient).is_playing());
        assert!(!out.channel(Channel::Turntable).is_playing());
    }
}
