//! Player and Manager Configuration
//!
//! Both configs deserialize from JSON with per-field defaults, so a host can
//! ship a partial file and get the 1/1/1 player shape for anything omitted.

use crate::{MAX_POOL_SIZE, MAX_RESOURCES, VoiceError, VoiceResult};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// PLAYER CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

/// Capacity limits of one [`VoicePlayer`](crate::VoicePlayer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Number of resource slots (registered assets)
    #[serde(default = "default_one")]
    pub resource_max: usize,
    /// Number of output channels
    #[serde(default = "default_one")]
    pub pool_size: usize,
    /// New playbacks accepted per tick
    #[serde(default = "default_one")]
    pub simultaneous_play_max: usize,
    /// Exposed mixer parameter holding this category's volume (dB)
    #[serde(default)]
    pub volume_param_name: String,
}

fn default_one() -> usize {
    1
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            resource_max: 1,
            pool_size: 1,
            simultaneous_play_max: 1,
            volume_param_name: String::new(),
        }
    }
}

impl PlayerConfig {
    pub fn new(resource_max: usize, pool_size: usize, simultaneous_play_max: usize) -> Self {
        Self {
            resource_max,
            pool_size,
            simultaneous_play_max,
            volume_param_name: String::new(),
        }
    }

    pub fn with_volume_param(mut self, name: impl Into<String>) -> Self {
        self.volume_param_name = name.into();
        self
    }

    /// Check every limit against the handle layout
    pub fn validate(&self) -> VoiceResult<()> {
        if self.resource_max == 0 || self.resource_max > MAX_RESOURCES {
            return Err(VoiceError::InvalidConfig(format!(
                "resource_max must be 1..={}, got {}",
                MAX_RESOURCES, self.resource_max
            )));
        }
        if self.pool_size == 0 || self.pool_size > MAX_POOL_SIZE {
            return Err(VoiceError::InvalidConfig(format!(
                "pool_size must be 1..={}, got {}",
                MAX_POOL_SIZE, self.pool_size
            )));
        }
        if self.simultaneous_play_max == 0 {
            return Err(VoiceError::InvalidConfig(
                "simultaneous_play_max must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate
    pub fn from_json(json: &str) -> VoiceResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> VoiceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MANAGER CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

/// Playback category owned by the [`AudioManager`](crate::AudioManager)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCategory {
    Bgm,
    Se,
    Voice,
}

impl AudioCategory {
    pub const ALL: [AudioCategory; 3] = [AudioCategory::Bgm, AudioCategory::Se, AudioCategory::Voice];

    /// Channel name prefix
    pub fn name(&self) -> &'static str {
        match self {
            AudioCategory::Bgm => "Bgm",
            AudioCategory::Se => "SE",
            AudioCategory::Voice => "Voice",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Exposed mixer parameter holding the master volume (dB)
    #[serde(default)]
    pub master_volume_param: String,
    #[serde(default)]
    pub bgm: Option<PlayerConfig>,
    #[serde(default)]
    pub se: Option<PlayerConfig>,
    #[serde(default)]
    pub voice: Option<PlayerConfig>,
}

impl ManagerConfig {
    pub fn category(&self, category: AudioCategory) -> Option<&PlayerConfig> {
        match category {
            AudioCategory::Bgm => self.bgm.as_ref(),
            AudioCategory::Se => self.se.as_ref(),
            AudioCategory::Voice => self.voice.as_ref(),
        }
    }

    pub fn with_category(mut self, category: AudioCategory, config: PlayerConfig) -> Self {
        match category {
            AudioCategory::Bgm => self.bgm = Some(config),
            AudioCategory::Se => self.se = Some(config),
            AudioCategory::Voice => self.voice = Some(config),
        }
        self
    }

    pub fn with_master_volume_param(mut self, name: impl Into<String>) -> Self {
        self.master_volume_param = name.into();
        self
    }

    /// Parse and validate every configured category
    pub fn from_json(json: &str) -> VoiceResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        for category in AudioCategory::ALL {
            if let Some(player) = config.category(category) {
                player.validate().map_err(|e| match e {
                    VoiceError::InvalidConfig(msg) => {
                        VoiceError::InvalidConfig(format!("{}: {}", category.name(), msg))
                    }
                    other => other,
                })?;
            }
        }
        Ok(config)
    }
}
