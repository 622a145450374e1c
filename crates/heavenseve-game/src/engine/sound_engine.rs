//! Sound output: the two music channels the game drives
//!
//! The gameplay layer only ever talks to `AudioOutput`. Headless runs and
//! tests use `RecordingOutput`; with the `rodio` feature `SoundEngine` plays
//! the tracks through the default output device.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Music channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Ambient,
    Turntable,
}

/// Sink for channel-level playback requests
pub trait AudioOutput {
    /// Start `track` on `channel`, replacing whatever played there
    fn play(&mut self, channel: Channel, track: &str, looped: bool);
    fn stop(&mut self, channel: Channel);
    fn set_volume(&mut self, channel: Channel, volume: f32);
}

// ---------------------------------------------------------------------------
// Recording output
// ---------------------------------------------------------------------------

/// State of one channel as last requested
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelState {
    pub track: Option<String>,
    pub looped: bool,
    pub volume: f32,
    /// How often `play` was called on this channel
    pub starts: u32,
}

impl ChannelState {
    pub fn is_playing(&self) -> bool {
        self.track.is_some()
    }
}

/// Output that only remembers what it was asked to do.
/// Clones share the same record, so a caller can keep a handle for inspection.
#[derive(Debug, Default, Clone)]
pub struct RecordingOutput {
    channels: Rc<RefCell<HashMap<Channel, ChannelState>>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(&self, channel: Channel) -> ChannelState {
        self.channels.borrow().get(&channel).cloned().unwrap_or_default()
    }
}

impl AudioOutput for RecordingOutput {
    fn play(&mut self, channel: Channel, track: &str, looped: bool) {
        let mut channels = self.channels.borrow_mut();
        let state = channels.entry(channel).or_default();
        state.track = Some(track.to_string());
        state.looped = looped;
        state.starts += 1;
        tracing::trace!("Audio: {:?} <- '{}' (loop={})", channel, track, looped);
    }

    fn stop(&mut self, channel: Channel) {
        if let Some(state) = self.channels.borrow_mut().get_mut(&channel) {
            state.track = None;
        }
    }

    fn set_volume(&mut self, channel: Channel, volume: f32) {
        self.channels.borrow_mut().entry(channel).or_default().volume = volume.clamp(0.0, 1.0);
    }
}

// ---------------------------------------------------------------------------
// rodio output
// ---------------------------------------------------------------------------

#[cfg(feature = "rodio")]
pub use self::device::SoundEngine;

#[cfg(feature = "rodio")]
mod device {
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::BufReader;
    use std::path::PathBuf;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    use super::{AudioOutput, Channel};

    /// Plays music tracks from a directory on the default output device
    pub struct SoundEngine {
        /// rodio output stream (must be kept alive)
        _stream: OutputStream,
        handle: OutputStreamHandle,
        audio_dir: PathBuf,
        sinks: HashMap<Channel, Sink>,
        volumes: HashMap<Channel, f32>,
    }

    impl SoundEngine {
        /// Open the default device. Returns None if no audio device is available.
        pub fn new(audio_dir: PathBuf) -> Option<Self> {
            match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    tracing::info!("Audio output initialized ({})", audio_dir.display());
                    Some(Self {
                        _stream: stream,
                        handle,
                        audio_dir,
                        sinks: HashMap::new(),
                        volumes: HashMap::new(),
                    })
                }
                Err(e) => {
                    tracing::warn!("Failed to initialize audio: {}", e);
                    None
                }
            }
        }
    }

    impl AudioOutput for SoundEngine {
        fn play(&mut self, channel: Channel, track: &str, looped: bool) {
            self.stop(channel);
            let path = self.audio_dir.join(track);
            let file = match File::open(&path) {
                Ok(f) => f,
                Err(e) => {
                    tracing::warn!("Track '{}' not readable: {}", path.display(), e);
                    return;
                }
            };
            let source = match Decoder::new(BufReader::new(file)) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("Failed to decode '{}': {}", path.display(), e);
                    return;
                }
            };
            match Sink::try_new(&self.handle) {
                Ok(sink) => {
                    sink.set_volume(self.volumes.get(&channel).copied().unwrap_or(0.0));
                    if looped {
                        sink.append(source.repeat_infinite());
                    } else {
                        sink.append(source);
                    }
                    tracing::debug!("Playing '{}' on {:?}", track, channel);
                    self.sinks.insert(channel, sink);
                }
                Err(e) => tracing::warn!("Failed to create sink for {:?}: {}", channel, e),
            }
        }

        fn stop(&mut self, channel: Channel) {
            if let Some(sink) = self.sinks.remove(&channel) {
                sink.stop();
            }
        }

        fn set_volume(&mut self, channel: Channel, volume: f32) {
            let volume = volume.clamp(0.0, 1.0);
            self.volumes.insert(channel, volume);
            if let Some(sink) = self.sinks.get(&channel) {
                sink.set_volume(volume);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_output_tracks_channels() {
        let mut out = RecordingOutput::new();
        let handle = out.clone();
        out.set_volume(Channel::Ambient, 1.5);
        out.play(Channel::Ambient, "ambient.ogg", true);
        let ambient = handle.channel(Channel::Ambient);
        assert!(ambient.is_playing());
        assert_eq!(ambient.volume, 1.0);
        assert_eq!(ambient.starts, 1);

        out.stop(Channel::Ambient);
        assert!(!out.channel(Channel::Ambient).is_playing());
        assert!(!out.channel(Channel::Turntable).is_playing());
    }
}
