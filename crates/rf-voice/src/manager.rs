//! Audio Manager
//!
//! Owns one [`VoicePlayer`] per [`AudioCategory`] and ticks them together.
//! Master and per-category volume live in an external mixer as decibel
//! parameters, reached through [`MixerParams`].
//!
//! ```text
//! ┌──────────────────── AudioManager ────────────────────┐
//! │   tick(dt) ──┬──▶ VoicePlayer "Bgm"   ──▶ backend     │
//! │              ├──▶ VoicePlayer "SE"    ──▶ backend     │
//! │              └──▶ VoicePlayer "Voice" ──▶ backend     │
//! │                                                      │
//! │   set_*_volume(0..1) ──volume_to_db──▶ MixerParams   │
//! └──────────────────────────────────────────────────────┘
//! ```

use crate::VoiceResult;
use crate::asset::AudioAsset;
use crate::backend::AudioBackend;
use crate::config::{AudioCategory, ManagerConfig, PlayerConfig};
use crate::controller::AudioController;
use crate::player::VoicePlayer;
use crate::volume::{db_to_volume, volume_to_db};
use std::collections::HashMap;
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════════════
// MIXER PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Exposed float parameters of the host mixer
pub trait MixerParams {
    /// Returns false if no parameter with that name is exposed
    fn set_float(&mut self, name: &str, value: f32) -> bool;
    fn get_float(&self, name: &str) -> Option<f32>;
}

/// Plain parameter table, for hosts without a mixer and for tests
#[derive(Debug, Clone, Default)]
pub struct ParamTable {
    values: HashMap<String, f32>,
}

impl ParamTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose a parameter with an initial value
    pub fn with_param(mut self, name: impl Into<String>, value: f32) -> Self {
        self.values.insert(name.into(), value);
        self
    }
}

impl MixerParams for ParamTable {
    fn set_float(&mut self, name: &str, value: f32) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn get_float(&self, name: &str) -> Option<f32> {
        self.values.get(name).copied()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AUDIO MANAGER
// ═══════════════════════════════════════════════════════════════════════════════

pub struct AudioManager<B: AudioBackend, M: MixerParams> {
    bgm: VoicePlayer<B>,
    se: VoicePlayer<B>,
    voice: VoicePlayer<B>,
    mixer: M,
    master_volume_param: String,
    volume_params: [String; 3],
}

impl<B: AudioBackend, M: MixerParams> AudioManager<B, M> {
    /// Build the three category players.
    ///
    /// `make_backend` is called once per category. A category missing from
    /// `config` gets [`PlayerConfig::default`].
    pub fn new(
        config: ManagerConfig,
        mixer: M,
        mut make_backend: impl FnMut(AudioCategory) -> B,
    ) -> VoiceResult<Self> {
        let mut build = |category: AudioCategory| -> VoiceResult<VoicePlayer<B>> {
            let player_config = match config.category(category) {
                Some(c) => c.clone(),
                None => {
                    log::warn!(
                        "[AudioManager] No config for {}, using a 1/1/1 default",
                        category.name()
                    );
                    PlayerConfig::default()
                }
            };
            VoicePlayer::new(player_config, make_backend(category), category.name())
        };

        let bgm = build(AudioCategory::Bgm)?;
        let se = build(AudioCategory::Se)?;
        let voice = build(AudioCategory::Voice)?;

        let volume_params = [
            bgm.config().volume_param_name.clone(),
            se.config().volume_param_name.clone(),
            voice.config().volume_param_name.clone(),
        ];

        log::info!("[AudioManager] Initialized");

        Ok(Self {
            bgm,
            se,
            voice,
            mixer,
            master_volume_param: config.master_volume_param,
            volume_params,
        })
    }

    /// Advance every category by the same delta
    pub fn tick(&mut self, dt: f32) {
        self.bgm.tick(dt);
        self.se.tick(dt);
        self.voice.tick(dt);
    }

    // === Players ===

    pub fn player(&self, category: AudioCategory) -> &VoicePlayer<B> {
        match category {
            AudioCategory::Bgm => &self.bgm,
            AudioCategory::Se => &self.se,
            AudioCategory::Voice => &self.voice,
        }
    }

    pub fn player_mut(&mut self, category: AudioCategory) -> &mut VoicePlayer<B> {
        match category {
            AudioCategory::Bgm => &mut self.bgm,
            AudioCategory::Se => &mut self.se,
            AudioCategory::Voice => &mut self.voice,
        }
    }

    pub fn bgm(&mut self) -> &mut VoicePlayer<B> {
        &mut self.bgm
    }

    pub fn se(&mut self) -> &mut VoicePlayer<B> {
        &mut self.se
    }

    pub fn voice(&mut self) -> &mut VoicePlayer<B> {
        &mut self.voice
    }

    pub fn mixer(&self) -> &M {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut M {
        &mut self.mixer
    }

    // === Registration ===

    pub fn attach(
        &mut self,
        category: AudioCategory,
        asset: impl Into<Arc<AudioAsset>>,
    ) -> Option<AudioController> {
        self.player_mut(category).attach(asset)
    }

    pub fn detach(&mut self, category: AudioCategory, controller: AudioController) {
        self.player_mut(category).detach(controller);
    }

    pub fn attach_bgm(&mut self, asset: impl Into<Arc<AudioAsset>>) -> Option<AudioController> {
        self.bgm.attach(asset)
    }

    pub fn detach_bgm(&mut self, controller: AudioController) {
        self.bgm.detach(controller);
    }

    pub fn attach_se(&mut self, asset: impl Into<Arc<AudioAsset>>) -> Option<AudioController> {
        self.se.attach(asset)
    }

    pub fn detach_se(&mut self, controller: AudioController) {
        self.se.detach(controller);
    }

    pub fn attach_voice(&mut self, asset: impl Into<Arc<AudioAsset>>) -> Option<AudioController> {
        self.voice.attach(asset)
    }

    pub fn detach_voice(&mut self, controller: AudioController) {
        self.voice.detach(controller);
    }

    // === Global transport ===

    pub fn stop_all(&mut self, fade_out_secs: f32) {
        for category in AudioCategory::ALL {
            self.player_mut(category).stop_all(fade_out_secs);
        }
    }

    pub fn pause_all(&mut self) {
        for category in AudioCategory::ALL {
            self.player_mut(category).pause_all();
        }
    }

    pub fn unpause_all(&mut self) {
        for category in AudioCategory::ALL {
            self.player_mut(category).unpause_all();
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // VOLUME
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn set_master_volume(&mut self, volume: f32) {
        let name = self.master_volume_param.clone();
        self.set_volume_param(&name, volume);
    }

    pub fn master_volume(&self) -> f32 {
        self.volume_param(&self.master_volume_param)
    }

    /// Linear category volume, written to the mixer as decibels
    pub fn set_volume(&mut self, category: AudioCategory, volume: f32) {
        let name = self.volume_params[category_slot(category)].clone();
        self.set_volume_param(&name, volume);
    }

    /// Linear category volume; 0.0 if the mixer does not expose it
    pub fn volume(&self, category: AudioCategory) -> f32 {
        self.volume_param(&self.volume_params[category_slot(category)])
    }

    fn set_volume_param(&mut self, name: &str, volume: f32) {
        if !self.mixer.set_float(name, volume_to_db(volume)) {
            log::warn!("[AudioManager] Mixer has no exposed parameter '{}'", name);
        }
    }

    fn volume_param(&self, name: &str) -> f32 {
        self.mixer.get_float(name).map_or(0.0, db_to_volume)
    }
}

#[inline]
fn category_slot(category: AudioCategory) -> usize {
    match category {
        AudioCategory::Bgm => 0,
        AudioCategory::Se => 1,
        AudioCategory::Voice => 2,
    }
}
