//! Playback Channel
//!
//! One pooled output slot and its fade/playback state machine.
//!
//! ```text
//!   Idle ──play(fade>0)──▶ FadingIn ──fade done──▶ Playing
//!   Idle ──play(fade=0)─────────────────────────▶ Playing
//!   FadingIn | Playing ──stop(fade>0)──▶ FadingOut ──fade done──▶ Idle
//!   any audible state ──stop(0) / clip ended──▶ Idle
//!   FadingIn | Playing | FadingOut ──pause──▶ Paused ──unpause──▶ (previous)
//! ```
//!
//! The completion callback fires from `tick` on the tick the channel is seen
//! Idle, exactly once. `reset` drops it without calling it.

use crate::asset::{AudioAsset, ClipId};
use crate::backend::{OutputChannel, Position3D, TrackingTarget};
use crate::curve::FadeShape;
use crate::handle::AudioHandle;
use crate::player::PlayParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Called once when a playback ends (naturally or through a stop)
pub type PlayEndedCallback = Box<dyn FnOnce(AudioHandle) + Send>;

// ═══════════════════════════════════════════════════════════════════════════════
// CHANNEL STATE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChannelState {
    /// Not playing; the channel can be reclaimed
    #[default]
    Idle = 0,
    FadingIn = 1,
    Playing = 2,
    FadingOut = 3,
    Paused = 4,
}

impl ChannelState {
    /// Fading in, playing or fading out
    #[inline]
    pub fn is_audible(&self) -> bool {
        matches!(
            self,
            ChannelState::FadingIn | ChannelState::Playing | ChannelState::FadingOut
        )
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        *self == ChannelState::Idle
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        *self == ChannelState::Paused
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLAYBACK CHANNEL
// ═══════════════════════════════════════════════════════════════════════════════

pub struct PlaybackChannel<C: OutputChannel> {
    index: u8,
    output: C,
    state: ChannelState,
    /// State to return to on unpause
    paused_from: ChannelState,
    handle: AudioHandle,
    /// Bumped on every play; salts the handle tag
    reuse_count: u8,
    asset: Option<Arc<AudioAsset>>,
    /// Last gain sent to the output
    gain: f32,
    /// Fade-in target
    target_volume: f32,
    /// Gain captured when a fade-out started
    fade_start_gain: f32,
    fade_timer: f32,
    fade_duration: f32,
    tracking: Option<Arc<TrackingTarget>>,
    track_continuously: bool,
    on_ended: Option<PlayEndedCallback>,
}

/// A fade runs only for a finite, positive duration
#[inline]
fn is_fade(secs: f32) -> bool {
    secs.is_finite() && secs > 0.0
}

impl<C: OutputChannel> PlaybackChannel<C> {
    pub fn new(index: u8, output: C) -> Self {
        let mut channel = Self {
            index,
            output,
            state: ChannelState::Idle,
            paused_from: ChannelState::Idle,
            handle: AudioHandle::EMPTY,
            reuse_count: 0,
            asset: None,
            gain: 0.0,
            target_volume: 0.0,
            fade_start_gain: 0.0,
            fade_timer: 0.0,
            fade_duration: 0.0,
            tracking: None,
            track_continuously: false,
            on_ended: None,
        };
        channel.reset();
        channel
    }

    // === Accessors ===

    #[inline]
    pub fn state(&self) -> ChannelState {
        self.state
    }

    #[inline]
    pub fn handle(&self) -> AudioHandle {
        self.handle
    }

    /// Number of plays started on this channel (wrapping)
    #[inline]
    pub fn reuse_count(&self) -> u8 {
        self.reuse_count
    }

    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain
    }

    // === Transitions ===

    /// Start a playback on this channel
    pub(crate) fn play(
        &mut self,
        handle: AudioHandle,
        asset: Arc<AudioAsset>,
        clip: ClipId,
        params: PlayParams,
    ) {
        let volume = if params.volume.is_nan() { 0.0 } else { params.volume.clamp(0.0, 1.0) };
        self.target_volume = volume;
        self.fade_timer = 0.0;
        self.paused_from = ChannelState::Idle;

        let start_gain = if is_fade(params.fade_in_secs) {
            self.state = ChannelState::FadingIn;
            self.fade_duration = params.fade_in_secs;
            0.0
        } else {
            self.state = ChannelState::Playing;
            self.fade_duration = 0.0;
            volume
        };

        match &params.tracking {
            Some(target) => {
                self.output.set_spatial_blend(1.0);
                self.output.set_local_position(target.get());
            }
            None => {
                self.output.set_spatial_blend(0.0);
                self.output.set_local_position(Position3D::origin());
            }
        }

        self.output.set_routing_group(asset.group);
        self.output.set_priority(asset.priority);
        self.output.set_gain(start_gain);
        self.output.bind_clip(Some(clip));
        self.output.set_loop(params.looping);
        self.output.play();

        self.gain = start_gain;
        self.handle = handle;
        self.reuse_count = self.reuse_count.wrapping_add(1);
        self.track_continuously = params.track_continuously && params.tracking.is_some();
        self.tracking = params.tracking;
        self.on_ended = params.on_ended;
        self.asset = Some(asset);
    }

    /// Advance by `dt` seconds. Returns false once the channel is Idle.
    pub(crate) fn tick(&mut self, dt: f32) -> bool {
        let dt = dt.max(0.0);

        if self.state != ChannelState::Idle && self.track_continuously {
            if let Some(target) = &self.tracking {
                self.output.set_local_position(target.get());
            }
        }

        match self.state {
            ChannelState::FadingIn => {
                if !self.output.is_playing() {
                    // Clip shorter than its fade-in
                    self.state = ChannelState::Idle;
                } else if self.advance_fade(dt) {
                    self.state = ChannelState::Playing;
                }
            }
            ChannelState::Playing => {
                if !self.output.is_playing() {
                    self.state = ChannelState::Idle;
                }
            }
            ChannelState::FadingOut => {
                let done = self.advance_fade(dt);
                if done || !self.output.is_playing() {
                    self.output.stop();
                    self.state = ChannelState::Idle;
                }
            }
            ChannelState::Paused | ChannelState::Idle => {}
        }

        let active = !self.state.is_idle();
        if !active {
            if let Some(on_ended) = self.on_ended.take() {
                on_ended(self.handle);
            }
        }
        active
    }

    /// Stop, fading out over `fade_out_secs` when positive
    pub(crate) fn stop(&mut self, fade_out_secs: f32) {
        match self.state {
            ChannelState::Idle => {}
            ChannelState::Paused => {
                self.output.stop();
                self.state = ChannelState::Idle;
            }
            ChannelState::FadingIn | ChannelState::Playing | ChannelState::FadingOut => {
                if is_fade(fade_out_secs) && self.output.is_playing() {
                    self.fade_start_gain = self.gain;
                    self.fade_timer = 0.0;
                    self.fade_duration = fade_out_secs;
                    self.state = ChannelState::FadingOut;
                } else {
                    self.output.stop();
                    self.state = ChannelState::Idle;
                }
            }
        }
    }

    /// Pause an audible channel; the fade timer freezes with it
    pub(crate) fn pause(&mut self) {
        if self.state.is_audible() && self.output.is_playing() {
            self.output.pause();
            self.paused_from = self.state;
            self.state = ChannelState::Paused;
        }
    }

    /// Resume a paused channel in the state it was paused from
    pub(crate) fn unpause(&mut self) {
        if self.state != ChannelState::Paused {
            return;
        }
        self.output.play();
        self.state = if self.paused_from.is_audible() {
            self.paused_from
        } else {
            ChannelState::Playing
        };
        self.paused_from = ChannelState::Idle;
    }

    /// Return to Idle without firing the completion callback
    pub(crate) fn reset(&mut self) {
        self.state = ChannelState::Idle;
        self.paused_from = ChannelState::Idle;
        self.handle = AudioHandle::EMPTY;
        self.tracking = None;
        self.track_continuously = false;
        self.on_ended = None;
        self.asset = None;
        self.gain = 0.0;
        self.target_volume = 0.0;
        self.fade_start_gain = 0.0;
        self.fade_timer = 0.0;
        self.fade_duration = 0.0;

        if self.output.is_playing() {
            self.output.stop();
        }
        self.output.bind_clip(None);
    }

    /// Step the current fade; returns true when it has completed
    fn advance_fade(&mut self, dt: f32) -> bool {
        self.fade_timer += dt;
        let progress = if self.fade_duration > 0.0 {
            (self.fade_timer / self.fade_duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let done = progress >= 1.0;

        let default_shape = FadeShape::default();
        let gain = match self.state {
            ChannelState::FadingIn if done => self.target_volume,
            ChannelState::FadingIn => {
                let shape = self.asset.as_ref().map_or(&default_shape, |a| &a.fade_in);
                shape.fade_in(progress) * self.target_volume
            }
            ChannelState::FadingOut if done => 0.0,
            ChannelState::FadingOut => {
                let shape = self.asset.as_ref().map_or(&default_shape, |a| &a.fade_out);
                shape.fade_out(progress) * self.fade_start_gain
            }
            _ => self.gain,
        };

        self.gain = gain;
        self.output.set_gain(gain);
        done
    }
}

impl<C: OutputChannel> fmt::Debug for PlaybackChannel<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackChannel")
            .field("index", &self.index)
            .field("state", &self.state)
            .field("handle", &self.handle)
            .field("gain", &self.gain)
            .field("fade_timer", &self.fade_timer)
            .field("fade_duration", &self.fade_duration)
            .field("tracking", &self.tracking.is_some())
            .field("has_callback", &self.on_ended.is_some())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::AudioBackend;
    use crate::curve::FadeCurve;
    use crate::handle::DataHandle;
    use crate::headless::{HeadlessBackend, HeadlessChannel};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn test_asset() -> Arc<AudioAsset> {
        Arc::new(AudioAsset::new("test").with_clip(ClipId(1)))
    }

    fn test_channel() -> (HeadlessBackend, PlaybackChannel<HeadlessChannel>) {
        let mut backend = HeadlessBackend::new();
        let output = backend.create_channel("Test00");
        (backend, PlaybackChannel::new(0, output))
    }

    fn handle() -> AudioHandle {
        AudioHandle::pack(0, 0, DataHandle::new(0), 0)
    }

    #[test]
    fn test_new_channel_is_idle() {
        let (_backend, channel) = test_channel();
        assert_eq!(channel.state(), ChannelState::Idle);
        assert!(channel.handle().is_empty());
    }

    #[test]
    fn test_play_without_fade() {
        let (backend, mut channel) = test_channel();
        channel.play(handle(), test_asset(), ClipId(1), PlayParams::new(0).with_volume(0.8));

        assert_eq!(channel.state(), ChannelState::Playing);
        assert_eq!(channel.handle(), handle());
        let voice = backend.voice(0).unwrap();
        assert!(voice.playing);
        assert!((voice.gain - 0.8).abs() < 0.0001);
        assert_eq!(voice.spatial_blend, 0.0);
    }

    #[test]
    fn test_fade_in_reaches_target() {
        let (backend, mut channel) = test_channel();
        channel.play(
            handle(),
            test_asset(),
            ClipId(1),
            PlayParams::new(0).with_fade_in(1.0).with_volume(0.5),
        );
        assert_eq!(channel.state(), ChannelState::FadingIn);
        assert_eq!(backend.voice(0).unwrap().gain, 0.0);

        assert!(channel.tick(0.5));
        assert!((channel.gain() - 0.25).abs() < 0.0001);
        assert_eq!(channel.state(), ChannelState::FadingIn);

        assert!(channel.tick(0.5));
        assert_eq!(channel.state(), ChannelState::Playing);
        assert!((backend.voice(0).unwrap().gain - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_non_finite_params_are_sanitized() {
        let (backend, mut channel) = test_channel();
        channel.play(
            handle(),
            test_asset(),
            ClipId(1),
            PlayParams::new(0).with_fade_in(f32::INFINITY).with_volume(f32::NAN),
        );
        assert_eq!(channel.state(), ChannelState::Playing);
        assert_eq!(backend.voice(0).unwrap().gain, 0.0);

        channel.reset();
        channel.play(
            handle(),
            test_asset(),
            ClipId(1),
            PlayParams::new(0).with_fade_in(f32::NAN).with_volume(f32::INFINITY),
        );
        assert_eq!(channel.state(), ChannelState::Playing);
        assert_eq!(backend.voice(0).unwrap().gain, 1.0);

        channel.stop(f32::NAN);
        assert_eq!(channel.state(), ChannelState::Idle);
    }

    #[test]
    fn test_fade_in_never_overshoots() {
        let asset = Arc::new(
            AudioAsset::new("curved")
                .with_clip(ClipId(1))
                .with_fade_in(FadeCurve::Log3),
        );
        let (_backend, mut channel) = test_channel();
        channel.play(handle(), asset, ClipId(1), PlayParams::new(0).with_fade_in(2.0).with_volume(0.7));

        for _ in 0..40 {
            channel.tick(0.06);
            assert!(channel.gain() <= 0.7 + 0.0001);
        }
        assert!((channel.gain() - 0.7).abs() < 0.0001);
    }

    #[test]
    fn test_fade_out_stops_backend() {
        let (backend, mut channel) = test_channel();
        channel.play(handle(), test_asset(), ClipId(1), PlayParams::new(0).with_volume(1.0));

        channel.stop(1.0);
        assert_eq!(channel.state(), ChannelState::FadingOut);

        assert!(channel.tick(0.25));
        assert!((channel.gain() - 0.75).abs() < 0.0001);

        assert!(!channel.tick(1.0));
        assert_eq!(channel.state(), ChannelState::Idle);
        let voice = backend.voice(0).unwrap();
        assert!(!voice.playing);
        assert_eq!(voice.gain, 0.0);
        assert_eq!(voice.stop_calls, 1);
    }

    #[test]
    fn test_fade_out_starts_from_current_gain() {
        let (_backend, mut channel) = test_channel();
        channel.play(
            handle(),
            test_asset(),
            ClipId(1),
            PlayParams::new(0).with_fade_in(1.0).with_volume(1.0),
        );
        channel.tick(0.4);
        channel.stop(1.0);
        channel.tick(0.5);
        assert!((channel.gain() - 0.2).abs() < 0.0001);
    }

    #[test]
    fn test_stop_immediate() {
        let (backend, mut channel) = test_channel();
        channel.play(handle(), test_asset(), ClipId(1), PlayParams::new(0));
        channel.stop(0.0);
        assert_eq!(channel.state(), ChannelState::Idle);
        assert!(!backend.voice(0).unwrap().playing);
    }

    #[test]
    fn test_clip_end_fires_callback_once() {
        let fired = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&fired);

        let (mut backend, mut channel) = test_channel();
        channel.play(
            handle(),
            test_asset(),
            ClipId(1),
            PlayParams::new(0).on_ended(move |h| {
                assert_eq!(h, AudioHandle::pack(0, 0, DataHandle::new(0), 0));
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert!(channel.tick(0.016));
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        backend.finish(0);
        assert!(!channel.tick(0.016));
        assert!(!channel.tick(0.016));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reset_drops_callback() {
        let fired = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&fired);

        let (backend, mut channel) = test_channel();
        channel.play(
            handle(),
            test_asset(),
            ClipId(1),
            PlayParams::new(0).on_ended(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        channel.reset();
        channel.tick(0.016);

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(channel.handle().is_empty());
        let voice = backend.voice(0).unwrap();
        assert!(!voice.playing);
        assert_eq!(voice.clip, None);
    }

    #[test]
    fn test_pause_and_unpause_playing() {
        let (backend, mut channel) = test_channel();
        channel.play(handle(), test_asset(), ClipId(1), PlayParams::new(0));

        channel.pause();
        assert_eq!(channel.state(), ChannelState::Paused);
        assert!(backend.voice(0).unwrap().paused);

        // Paused channels survive ticks even though the output is not playing
        assert!(channel.tick(1.0));

        channel.unpause();
        assert_eq!(channel.state(), ChannelState::Playing);
        assert!(backend.voice(0).unwrap().playing);
    }

    #[test]
    fn test_pause_during_fade_in_resumes_fade() {
        let (_backend, mut channel) = test_channel();
        channel.play(
            handle(),
            test_asset(),
            ClipId(1),
            PlayParams::new(0).with_fade_in(1.0).with_volume(1.0),
        );
        channel.tick(0.5);
        channel.pause();
        assert_eq!(channel.state(), ChannelState::Paused);

        channel.tick(10.0);
        assert!((channel.gain() - 0.5).abs() < 0.0001);

        channel.unpause();
        assert_eq!(channel.state(), ChannelState::FadingIn);
        channel.tick(0.25);
        assert!((channel.gain() - 0.75).abs() < 0.0001);
    }

    #[test]
    fn test_unpause_ignored_unless_paused() {
        let (backend, mut channel) = test_channel();
        channel.unpause();
        assert_eq!(channel.state(), ChannelState::Idle);
        assert_eq!(backend.voice(0).unwrap().play_calls, 0);

        channel.play(handle(), test_asset(), ClipId(1), PlayParams::new(0).with_fade_in(1.0));
        channel.unpause();
        assert_eq!(channel.state(), ChannelState::FadingIn);
    }

    #[test]
    fn test_stop_while_paused() {
        let (backend, mut channel) = test_channel();
        channel.play(handle(), test_asset(), ClipId(1), PlayParams::new(0));
        channel.pause();
        channel.stop(2.0);
        assert_eq!(channel.state(), ChannelState::Idle);
        assert!(!backend.voice(0).unwrap().paused);
    }

    #[test]
    fn test_tracking_follows_target() {
        let target = Arc::new(TrackingTarget::new(Position3D::new(1.0, 0.0, 0.0)));
        let (backend, mut channel) = test_channel();
        channel.play(
            handle(),
            test_asset(),
            ClipId(1),
            PlayParams::new(0).with_tracking(Arc::clone(&target), true),
        );
        let voice = backend.voice(0).unwrap();
        assert_eq!(voice.spatial_blend, 1.0);
        assert_eq!(voice.position, Position3D::new(1.0, 0.0, 0.0));

        target.set(Position3D::new(5.0, 1.0, -2.0));
        channel.tick(0.016);
        assert_eq!(backend.voice(0).unwrap().position, Position3D::new(5.0, 1.0, -2.0));
    }

    #[test]
    fn test_positioned_once_without_tracking() {
        let target = Arc::new(TrackingTarget::new(Position3D::new(2.0, 2.0, 2.0)));
        let (backend, mut channel) = test_channel();
        channel.play(
            handle(),
            test_asset(),
            ClipId(1),
            PlayParams::new(0).with_tracking(Arc::clone(&target), false),
        );

        target.set(Position3D::new(9.0, 9.0, 9.0));
        channel.tick(0.016);
        assert_eq!(backend.voice(0).unwrap().position, Position3D::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_short_clip_under_fade_in_ends() {
        let (mut backend, mut channel) = test_channel();
        channel.play(handle(), test_asset(), ClipId(1), PlayParams::new(0).with_fade_in(5.0));
        backend.finish(0);
        assert!(!channel.tick(0.1));
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let (_backend, mut channel) = test_channel();
        channel.play(handle(), test_asset(), ClipId(1), PlayParams::new(0).with_fade_in(1.0));
        channel.tick(-5.0);
        assert_eq!(channel.gain(), 0.0);
        assert_eq!(channel.state(), ChannelState::FadingIn);
    }
}
