//! FluxForge Voice Scheduler
//!
//! Bounded-resource playback scheduling for game audio:
//! - Fixed resource slot table of registered assets
//! - Fixed channel pool with O(1) allocate/release
//! - Packed 32-bit playback handles with stale-handle rejection
//! - Fade-in / fade-out state machine with pluggable curves
//! - Per-tick admission ceiling on new playbacks
//! - BGM / SE / Voice category manager with mixer volume control
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        VOICE PLAYER                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │   register(asset) ──▶ Resource Slots [0..resource_max]           │
//! │        │                                                         │
//! │        ▼                                                         │
//! │   AudioController ── play(clip) ──▶ admission ──▶ Channel Pool   │
//! │                                      ceiling     free ◀──▶ active│
//! │                                                        │         │
//! │   AudioHandle ◀──── pack(channel, clip, data, tag) ◀───┘         │
//! │                                                                  │
//! │   tick(dt): active channels back-to-front                        │
//! │      FadingIn ─▶ Playing ─▶ FadingOut ─▶ Idle ─▶ release         │
//! │                                                                  │
//! └───────────────────────────┬─────────────────────────────────────┘
//!                             │ OutputChannel
//!                             ▼
//!                      host AudioBackend
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use rf_voice::{AudioAsset, ClipId, HeadlessBackend, PlayParams, PlayerConfig, VoicePlayer};
//!
//! let mut player = VoicePlayer::new(PlayerConfig::new(4, 8, 2), HeadlessBackend::new(), "SE")?;
//! let click = player.register(AudioAsset::new("click").with_clip(ClipId(1)))?;
//!
//! let handle = click.play_with(&mut player, PlayParams::new(0).with_fade_in(0.1));
//! assert!(player.is_playing(handle));
//!
//! // Once per frame
//! player.tick(1.0 / 60.0);
//! # Ok::<(), rf_voice::VoiceError>(())
//! ```

#![allow(clippy::new_without_default)]

pub mod asset;
pub mod backend;
pub mod channel;
pub mod config;
pub mod controller;
pub mod curve;
pub mod handle;
pub mod headless;
pub mod manager;
pub mod player;
pub mod pool;
pub mod volume;

// Re-exports
pub use asset::{AudioAsset, ClipId, PRIORITY_HIGHEST, PRIORITY_LOWEST, PRIORITY_MIDDLE, RoutingGroupId};
pub use backend::{AudioBackend, OutputChannel, Position3D, TrackingTarget};
pub use channel::{ChannelState, PlayEndedCallback, PlaybackChannel};
pub use config::{AudioCategory, ManagerConfig, PlayerConfig};
pub use controller::AudioController;
pub use curve::{FadeCurve, FadeShape, Keyframe, KeyframeCurve};
pub use handle::{AudioHandle, DataHandle};
pub use headless::{HeadlessBackend, HeadlessChannel, HeadlessVoice};
pub use manager::{AudioManager, MixerParams, ParamTable};
pub use player::{PlayParams, VoicePlayer, VoicePoolStats};
pub use pool::ChannelPool;
pub use volume::{MAX_DB, MIN_DB, db_to_volume, volume_to_db};

use thiserror::Error;

/// Voice scheduler errors
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Asset has no clips")]
    NoClips,

    #[error("Asset has {count} clips, at most {} are addressable", MAX_CLIPS)]
    TooManyClips { count: usize },

    #[error("No free resource slot (capacity {capacity})")]
    NoFreeSlot { capacity: usize },

    #[error("No asset registered under {0}")]
    InvalidDataHandle(DataHandle),

    #[error("Clip {clip_index} out of range for {data_handle} ({clip_count} clips)")]
    ClipOutOfRange {
        data_handle: DataHandle,
        clip_index: usize,
        clip_count: usize,
    },

    #[error("Over the number of simultaneous plays per tick ({limit})")]
    AdmissionLimit { limit: usize },

    #[error("No free channel (pool size {pool_size})")]
    PoolExhausted { pool_size: usize },

    #[error("Controller belongs to another player")]
    ForeignController,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type VoiceResult<T> = Result<T, VoiceError>;

/// Maximum channels per player (channel index 255 is reserved for the empty handle)
pub const MAX_POOL_SIZE: usize = 255;

/// Maximum resource slots per player
pub const MAX_RESOURCES: usize = 256;

/// Maximum clips per asset
pub const MAX_CLIPS: usize = 256;
