//! Audio Controller
//!
//! Returned by [`VoicePlayer::register`]; scopes playback requests to one
//! registered asset. A controller is bound to the player that issued it and
//! is consumed by [`VoicePlayer::unregister`], so it cannot outlive its slot.
//! Calls made against a different player are refused with a warning.

use crate::backend::AudioBackend;
use crate::channel::ChannelState;
use crate::handle::{AudioHandle, DataHandle};
use crate::player::{PlayParams, VoicePlayer};
use crate::{VoiceError, VoiceResult};

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct AudioController {
    data_handle: DataHandle,
    player_id: u32,
}

impl AudioController {
    pub(crate) fn new(data_handle: DataHandle, player_id: u32) -> Self {
        Self {
            data_handle,
            player_id,
        }
    }

    #[inline]
    pub fn data_handle(&self) -> DataHandle {
        self.data_handle
    }

    /// Id of the issuing player
    #[inline]
    pub fn player_id(&self) -> u32 {
        self.player_id
    }

    fn owned_by<B: AudioBackend>(&self, player: &VoicePlayer<B>) -> bool {
        if player.id() == self.player_id {
            return true;
        }
        log::warn!(
            "[AudioController] {} belongs to player {}, not '{}' ({})",
            self.data_handle,
            self.player_id,
            player.name(),
            player.id()
        );
        false
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PLAYBACK
    // ═══════════════════════════════════════════════════════════════════════════

    /// Play a clip of this asset (2D)
    pub fn play<B: AudioBackend>(
        &self,
        player: &mut VoicePlayer<B>,
        clip_index: usize,
        looping: bool,
        fade_in_secs: f32,
        volume: f32,
    ) -> AudioHandle {
        self.play_with(
            player,
            PlayParams::new(clip_index)
                .with_loop(looping)
                .with_fade_in(fade_in_secs)
                .with_volume(volume),
        )
    }

    /// Play with full parameters (tracking, completion callback)
    pub fn play_with<B: AudioBackend>(
        &self,
        player: &mut VoicePlayer<B>,
        params: PlayParams,
    ) -> AudioHandle {
        if !self.owned_by(player) {
            return AudioHandle::EMPTY;
        }
        player.play(self.data_handle, params)
    }

    pub fn try_play<B: AudioBackend>(
        &self,
        player: &mut VoicePlayer<B>,
        params: PlayParams,
    ) -> VoiceResult<AudioHandle> {
        if player.id() != self.player_id {
            return Err(VoiceError::ForeignController);
        }
        player.try_play(self.data_handle, params)
    }

    pub fn stop<B: AudioBackend>(&self, player: &mut VoicePlayer<B>, handle: AudioHandle, fade_out_secs: f32) {
        if self.owned_by(player) {
            player.stop(handle, fade_out_secs);
        }
    }

    /// Stop every playback of the owning player
    pub fn stop_all<B: AudioBackend>(&self, player: &mut VoicePlayer<B>, fade_out_secs: f32) {
        if self.owned_by(player) {
            player.stop_all(fade_out_secs);
        }
    }

    pub fn pause<B: AudioBackend>(&self, player: &mut VoicePlayer<B>, handle: AudioHandle) {
        if self.owned_by(player) {
            player.pause(handle);
        }
    }

    pub fn pause_all<B: AudioBackend>(&self, player: &mut VoicePlayer<B>) {
        if self.owned_by(player) {
            player.pause_all();
        }
    }

    pub fn unpause<B: AudioBackend>(&self, player: &mut VoicePlayer<B>, handle: AudioHandle) {
        if self.owned_by(player) {
            player.unpause(handle);
        }
    }

    pub fn unpause_all<B: AudioBackend>(&self, player: &mut VoicePlayer<B>) {
        if self.owned_by(player) {
            player.unpause_all();
        }
    }

    // === Queries ===

    pub fn state<B: AudioBackend>(&self, player: &VoicePlayer<B>, handle: AudioHandle) -> ChannelState {
        if !self.owned_by(player) {
            return ChannelState::Idle;
        }
        player.state(handle)
    }

    pub fn is_playing<B: AudioBackend>(&self, player: &VoicePlayer<B>, handle: AudioHandle) -> bool {
        self.state(player, handle).is_audible()
    }

    pub fn is_paused<B: AudioBackend>(&self, player: &VoicePlayer<B>, handle: AudioHandle) -> bool {
        self.state(player, handle).is_paused()
    }

    pub fn clip_count<B: AudioBackend>(&self, player: &VoicePlayer<B>) -> usize {
        if !self.owned_by(player) {
            return 0;
        }
        player.clip_count(self.data_handle)
    }
}
