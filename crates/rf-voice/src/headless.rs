//! Headless Backend
//!
//! In-memory [`AudioBackend`] that renders nothing but keeps the state a real
//! backend would: bound clip, gain, loop flag, position, and a playback clock
//! per channel. Clip lengths are declared up front; [`HeadlessBackend::advance`]
//! moves every playing channel forward and ends non-looping clips that run out.
//!
//! Used for tests, benchmarks, and for running game logic on servers where no
//! audio device exists.

use crate::asset::{ClipId, RoutingGroupId};
use crate::backend::{AudioBackend, OutputChannel, Position3D};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Snapshot of one headless channel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessVoice {
    pub name: String,
    pub clip: Option<ClipId>,
    pub group: RoutingGroupId,
    pub priority: u8,
    pub gain: f32,
    pub looping: bool,
    pub spatial_blend: f32,
    pub position: Position3D,
    pub playing: bool,
    pub paused: bool,
    /// Seconds into the bound clip
    pub clip_time: f32,
    /// Number of `play()` calls received
    pub play_calls: u32,
    /// Number of `stop()` calls received
    pub stop_calls: u32,
}

/// Output channel handed to the scheduler
#[derive(Debug, Clone)]
pub struct HeadlessChannel {
    voice: Arc<Mutex<HeadlessVoice>>,
}

impl OutputChannel for HeadlessChannel {
    fn bind_clip(&mut self, clip: Option<ClipId>) {
        let mut voice = self.voice.lock();
        voice.clip = clip;
        voice.clip_time = 0.0;
        if clip.is_none() {
            voice.playing = false;
            voice.paused = false;
        }
    }

    fn set_routing_group(&mut self, group: RoutingGroupId) {
        self.voice.lock().group = group;
    }

    fn set_priority(&mut self, priority: u8) {
        self.voice.lock().priority = priority;
    }

    fn set_gain(&mut self, gain: f32) {
        self.voice.lock().gain = gain;
    }

    fn set_loop(&mut self, looping: bool) {
        self.voice.lock().looping = looping;
    }

    fn set_spatial_blend(&mut self, blend: f32) {
        self.voice.lock().spatial_blend = blend;
    }

    fn set_local_position(&mut self, position: Position3D) {
        self.voice.lock().position = position;
    }

    fn play(&mut self) {
        let mut voice = self.voice.lock();
        voice.play_calls += 1;
        if voice.clip.is_none() {
            return;
        }
        if !voice.paused {
            voice.clip_time = 0.0;
        }
        voice.playing = true;
        voice.paused = false;
    }

    fn stop(&mut self) {
        let mut voice = self.voice.lock();
        voice.stop_calls += 1;
        voice.playing = false;
        voice.paused = false;
        voice.clip_time = 0.0;
    }

    fn pause(&mut self) {
        let mut voice = self.voice.lock();
        if voice.playing {
            voice.playing = false;
            voice.paused = true;
        }
    }

    fn is_playing(&self) -> bool {
        self.voice.lock().playing
    }
}

/// Backend without an audio device
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    voices: Vec<Arc<Mutex<HeadlessVoice>>>,
    clip_lengths: HashMap<ClipId, f32>,
    unloaded: Vec<ClipId>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a clip's length; clips without one never end on their own
    pub fn with_clip_length(mut self, clip: ClipId, secs: f32) -> Self {
        self.set_clip_length(clip, secs);
        self
    }

    pub fn set_clip_length(&mut self, clip: ClipId, secs: f32) {
        self.clip_lengths.insert(clip, secs.max(0.0));
    }

    /// Advance the playback clock of every playing channel
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        for voice in &self.voices {
            let mut voice = voice.lock();
            if !voice.playing {
                continue;
            }
            voice.clip_time += dt;

            let length = match voice.clip.and_then(|c| self.clip_lengths.get(&c)) {
                Some(&length) => length,
                None => continue,
            };
            if voice.clip_time < length {
                continue;
            }
            if voice.looping && length > 0.0 {
                voice.clip_time %= length;
            } else {
                voice.playing = false;
                voice.clip_time = length;
            }
        }
    }

    /// End the clip on one channel as if it ran out
    pub fn finish(&mut self, channel_index: usize) {
        if let Some(voice) = self.voices.get(channel_index) {
            voice.lock().playing = false;
        }
    }

    /// State of one channel, by creation order
    pub fn voice(&self, channel_index: usize) -> Option<HeadlessVoice> {
        self.voices.get(channel_index).map(|v| v.lock().clone())
    }

    pub fn channel_count(&self) -> usize {
        self.voices.len()
    }

    /// Clips released through `unload_clip_data`, in call order
    pub fn unloaded_clips(&self) -> &[ClipId] {
        &self.unloaded
    }
}

impl AudioBackend for HeadlessBackend {
    type Channel = HeadlessChannel;

    fn create_channel(&mut self, name: &str) -> HeadlessChannel {
        let voice = Arc::new(Mutex::new(HeadlessVoice {
            name: name.to_string(),
            ..Default::default()
        }));
        self.voices.push(Arc::clone(&voice));
        HeadlessChannel { voice }
    }

    fn unload_clip_data(&mut self, clip: ClipId) {
        self.unloaded.push(clip);
    }
}
