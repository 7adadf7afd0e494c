//! Voice Player
//!
//! The scheduler for one playback category. Owns:
//! - a fixed resource slot table of registered assets
//! - a fixed channel pool (free/active partition)
//! - the per-tick admission counter
//!
//! Everything runs on the caller's thread; mutating operations take
//! `&mut self` and the host calls [`VoicePlayer::tick`] once per frame.

use crate::asset::AudioAsset;
use crate::backend::{AudioBackend, TrackingTarget};
use crate::channel::{ChannelState, PlayEndedCallback, PlaybackChannel};
use crate::config::PlayerConfig;
use crate::controller::AudioController;
use crate::handle::{AudioHandle, DataHandle};
use crate::pool::ChannelPool;
use crate::{MAX_CLIPS, VoiceError, VoiceResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Global player ID counter
static NEXT_PLAYER_ID: AtomicU32 = AtomicU32::new(1);

/// Generate unique player ID
#[inline]
fn generate_player_id() -> u32 {
    NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed)
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLAY PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Parameters of one playback request
pub struct PlayParams {
    /// Index into the asset's clip list
    pub clip_index: usize,
    pub looping: bool,
    /// Fade-in time in seconds (<= 0 starts at full volume)
    pub fade_in_secs: f32,
    /// Target volume, clamped to 0.0 - 1.0
    pub volume: f32,
    /// Emitter to position the channel at (makes the playback 3D)
    pub tracking: Option<Arc<TrackingTarget>>,
    /// Follow the emitter every tick instead of only at start
    pub track_continuously: bool,
    pub on_ended: Option<PlayEndedCallback>,
}

impl PlayParams {
    pub fn new(clip_index: usize) -> Self {
        Self {
            clip_index,
            looping: false,
            fade_in_secs: 0.0,
            volume: 1.0,
            tracking: None,
            track_continuously: false,
            on_ended: None,
        }
    }

    // === Builder methods ===

    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_fade_in(mut self, secs: f32) -> Self {
        self.fade_in_secs = secs;
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_tracking(mut self, target: Arc<TrackingTarget>, continuous: bool) -> Self {
        self.tracking = Some(target);
        self.track_continuously = continuous;
        self
    }

    pub fn on_ended(mut self, callback: impl FnOnce(AudioHandle) + Send + 'static) -> Self {
        self.on_ended = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for PlayParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayParams")
            .field("clip_index", &self.clip_index)
            .field("looping", &self.looping)
            .field("fade_in_secs", &self.fade_in_secs)
            .field("volume", &self.volume)
            .field("tracking", &self.tracking)
            .field("track_continuously", &self.track_continuously)
            .field("on_ended", &self.on_ended.is_some())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATS
// ═══════════════════════════════════════════════════════════════════════════════

/// Snapshot of a player's pool and slot usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePoolStats {
    pub active_count: usize,
    pub free_count: usize,
    pub max_voices: usize,
    /// Playbacks admitted since the last tick
    pub plays_this_tick: usize,
    pub registered_resources: usize,
    pub resource_max: usize,
}

// ═══════════════════════════════════════════════════════════════════════════════
// VOICE PLAYER
// ═══════════════════════════════════════════════════════════════════════════════

pub struct VoicePlayer<B: AudioBackend> {
    id: u32,
    name: String,
    config: PlayerConfig,
    slots: Box<[Option<Arc<AudioAsset>>]>,
    pool: ChannelPool<B::Channel>,
    plays_this_tick: usize,
    backend: B,
}

impl<B: AudioBackend> VoicePlayer<B> {
    /// Validate the config and provision `pool_size` channels from the backend.
    ///
    /// Channels are named `"{name}{index:02}"`.
    pub fn new(config: PlayerConfig, mut backend: B, name: impl Into<String>) -> VoiceResult<Self> {
        config.validate()?;
        let name = name.into();

        let pool_size = u8::try_from(config.pool_size).map_err(|_| {
            VoiceError::InvalidConfig(format!("pool_size {} does not fit a handle", config.pool_size))
        })?;
        let pool = ChannelPool::new(&mut backend, &name, pool_size);
        let slots = vec![None; config.resource_max].into_boxed_slice();

        log::debug!(
            "[VoicePlayer] '{}' created: {} slots, {} channels, {} plays/tick",
            name,
            config.resource_max,
            config.pool_size,
            config.simultaneous_play_max
        );

        Ok(Self {
            id: generate_player_id(),
            name,
            config,
            slots,
            pool,
            plays_this_tick: 0,
            backend,
        })
    }

    // === Accessors ===

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Asset registered under `data`
    pub fn asset(&self, data: DataHandle) -> Option<&Arc<AudioAsset>> {
        self.slots.get(data.index()).and_then(Option::as_ref)
    }

    pub fn stats(&self) -> VoicePoolStats {
        VoicePoolStats {
            active_count: self.pool.active_count(),
            free_count: self.pool.free_count(),
            max_voices: self.pool.capacity(),
            plays_this_tick: self.plays_this_tick,
            registered_resources: self.slots.iter().filter(|s| s.is_some()).count(),
            resource_max: self.slots.len(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RESOURCE SLOTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Store an asset in the first empty slot
    pub fn register(&mut self, asset: impl Into<Arc<AudioAsset>>) -> VoiceResult<AudioController> {
        let asset = asset.into();
        if asset.clips.is_empty() {
            return Err(VoiceError::NoClips);
        }
        if asset.clip_count() > MAX_CLIPS {
            return Err(VoiceError::TooManyClips {
                count: asset.clip_count(),
            });
        }

        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(VoiceError::NoFreeSlot {
                capacity: self.slots.len(),
            })?;
        // resource_max <= 256, so every slot index fits a u8
        let data = DataHandle::new(index as u8);
        self.slots[index] = Some(asset);

        Ok(AudioController::new(data, self.id))
    }

    /// [`register`](Self::register), logging the failure instead of returning it
    pub fn attach(&mut self, asset: impl Into<Arc<AudioAsset>>) -> Option<AudioController> {
        let asset = asset.into();
        let name = asset.name.clone();
        match self.register(asset) {
            Ok(controller) => Some(controller),
            Err(e) => {
                log::error!("[VoicePlayer] '{}' failed to attach '{}': {}", self.name, name, e);
                None
            }
        }
    }

    /// Force-stop every playback of the controller's asset, unload its clips
    /// and free the slot. No completion callback fires.
    pub fn unregister(&mut self, controller: AudioController) -> VoiceResult<()> {
        if controller.player_id() != self.id {
            return Err(VoiceError::ForeignController);
        }
        self.release_data(controller.data_handle());
        Ok(())
    }

    /// [`unregister`](Self::unregister), logging a foreign controller
    pub fn detach(&mut self, controller: AudioController) {
        if let Err(e) = self.unregister(controller) {
            log::warn!("[VoicePlayer] '{}' detach ignored: {}", self.name, e);
        }
    }

    fn release_data(&mut self, data: DataHandle) {
        let Some(asset) = self.slots.get_mut(data.index()).and_then(Option::take) else {
            return;
        };

        for position in (0..self.pool.active_count()).rev() {
            let bound = self
                .pool
                .active_at(position)
                .and_then(|index| self.pool.channel(index))
                .is_some_and(|channel| {
                    let handle = channel.handle();
                    !handle.is_empty() && handle.data_handle() == data
                });
            if bound {
                self.pool.release(position);
            }
        }

        for &clip in &asset.clips {
            self.backend.unload_clip_data(clip);
        }

        log::debug!("[VoicePlayer] '{}' unregistered '{}' ({})", self.name, asset.name, data);
    }

    /// Number of clips of a registered asset (0 if the slot is empty)
    pub fn clip_count(&self, data: DataHandle) -> usize {
        self.asset(data).map_or(0, |asset| asset.clip_count())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PLAYBACK
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start a playback, returning why it was refused
    pub fn try_play(&mut self, data: DataHandle, params: PlayParams) -> VoiceResult<AudioHandle> {
        if self.plays_this_tick >= self.config.simultaneous_play_max {
            return Err(VoiceError::AdmissionLimit {
                limit: self.config.simultaneous_play_max,
            });
        }
        let pool_size = self.pool.capacity();
        if self.pool.free_count() == 0 {
            return Err(VoiceError::PoolExhausted { pool_size });
        }

        let asset = self
            .asset(data)
            .cloned()
            .ok_or(VoiceError::InvalidDataHandle(data))?;
        let clip = asset
            .clip(params.clip_index)
            .ok_or(VoiceError::ClipOutOfRange {
                data_handle: data,
                clip_index: params.clip_index,
                clip_count: asset.clip_count(),
            })?;

        let channel_index = self
            .pool
            .allocate()
            .ok_or(VoiceError::PoolExhausted { pool_size })?;
        let Some(channel) = self.pool.channel_mut(channel_index) else {
            return Err(VoiceError::PoolExhausted { pool_size });
        };
        // Pool size <= 255 and clip count <= 256 keep every field in 8 bits.
        // The tag is the channel's own play count, so a handle only repeats
        // after 256 plays on the same channel.
        let handle = AudioHandle::pack(
            channel_index as u8,
            params.clip_index as u8,
            data,
            channel.reuse_count(),
        );
        channel.play(handle, asset, clip, params);

        self.plays_this_tick += 1;
        Ok(handle)
    }

    /// Start a playback; returns [`AudioHandle::EMPTY`] when refused
    pub fn play(&mut self, data: DataHandle, params: PlayParams) -> AudioHandle {
        let clip_index = params.clip_index;
        match self.try_play(data, params) {
            Ok(handle) => handle,
            Err(e @ (VoiceError::AdmissionLimit { .. } | VoiceError::PoolExhausted { .. })) => {
                log::warn!("[VoicePlayer] '{}' refused clip {}: {}", self.name, clip_index, e);
                AudioHandle::EMPTY
            }
            Err(e) => {
                log::error!("[VoicePlayer] '{}' cannot play clip {}: {}", self.name, clip_index, e);
                AudioHandle::EMPTY
            }
        }
    }

    pub fn stop(&mut self, handle: AudioHandle, fade_out_secs: f32) {
        if let Some(channel) = self.resolve_mut(handle) {
            channel.stop(fade_out_secs);
        }
    }

    pub fn stop_all(&mut self, fade_out_secs: f32) {
        self.for_each_active(|channel| channel.stop(fade_out_secs));
    }

    pub fn pause(&mut self, handle: AudioHandle) {
        if let Some(channel) = self.resolve_mut(handle) {
            channel.pause();
        }
    }

    pub fn pause_all(&mut self) {
        self.for_each_active(PlaybackChannel::pause);
    }

    pub fn unpause(&mut self, handle: AudioHandle) {
        if let Some(channel) = self.resolve_mut(handle) {
            channel.unpause();
        }
    }

    pub fn unpause_all(&mut self) {
        self.for_each_active(PlaybackChannel::unpause);
    }

    /// State of a playback; stale handles read as Idle
    pub fn state(&self, handle: AudioHandle) -> ChannelState {
        self.resolve(handle)
            .map_or(ChannelState::Idle, PlaybackChannel::state)
    }

    /// Fading in, playing or fading out
    pub fn is_playing(&self, handle: AudioHandle) -> bool {
        self.state(handle).is_audible()
    }

    pub fn is_paused(&self, handle: AudioHandle) -> bool {
        self.state(handle).is_paused()
    }

    /// Advance every active channel and reclaim the ones that went Idle.
    /// Resets the admission counter.
    pub fn tick(&mut self, dt: f32) {
        for position in (0..self.pool.active_count()).rev() {
            let Some(index) = self.pool.active_at(position) else {
                continue;
            };
            let still_active = self
                .pool
                .channel_mut(index)
                .is_some_and(|channel| channel.tick(dt));
            if !still_active {
                self.pool.release(position);
            }
        }
        self.plays_this_tick = 0;
    }

    // === Handle resolution ===

    fn resolve(&self, handle: AudioHandle) -> Option<&PlaybackChannel<B::Channel>> {
        if handle.is_empty() {
            return None;
        }
        self.pool
            .channel(handle.channel_index())
            .filter(|channel| channel.handle() == handle && !channel.state().is_idle())
    }

    fn resolve_mut(&mut self, handle: AudioHandle) -> Option<&mut PlaybackChannel<B::Channel>> {
        if handle.is_empty() {
            return None;
        }
        self.pool
            .channel_mut(handle.channel_index())
            .filter(|channel| channel.handle() == handle && !channel.state().is_idle())
    }

    fn for_each_active(&mut self, mut f: impl FnMut(&mut PlaybackChannel<B::Channel>)) {
        for position in 0..self.pool.active_count() {
            if let Some(channel) = self
                .pool
                .active_at(position)
                .and_then(|index| self.pool.channel_mut(index))
            {
                f(channel);
            }
        }
    }
}

impl<B: AudioBackend> fmt::Debug for VoicePlayer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoicePlayer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("config", &self.config)
            .field("stats", &self.stats())
            .field("active_channels", &self.pool.active())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
