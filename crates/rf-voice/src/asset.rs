//! Audio Asset Definition
//!
//! An asset is what a caller registers with a player: the clips that can be
//! played, where they are routed, their voice priority and the two fade
//! curves. Clips and routing groups are opaque ids owned by the backend.

use crate::curve::FadeShape;
use serde::{Deserialize, Serialize};

/// Highest voice priority
pub const PRIORITY_HIGHEST: u8 = 0;
/// Default voice priority
pub const PRIORITY_MIDDLE: u8 = 128;
/// Lowest voice priority
pub const PRIORITY_LOWEST: u8 = 255;

/// Backend clip reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(pub u64);

/// Backend output routing group (mixer group / bus)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingGroupId(pub u32);

/// Registered audio asset
///
/// ## Example
///
/// ```rust
/// use rf_voice::{AudioAsset, ClipId, FadeCurve, RoutingGroupId, PRIORITY_HIGHEST};
///
/// let jingle = AudioAsset::new("jingle")
///     .with_clips([ClipId(10), ClipId(11)])
///     .with_group(RoutingGroupId(2))
///     .with_priority(PRIORITY_HIGHEST)
///     .with_fade_in(FadeCurve::SCurve);
///
/// assert_eq!(jingle.clip_count(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioAsset {
    /// Name (diagnostics only)
    pub name: String,
    /// Output routing group
    #[serde(default)]
    pub group: RoutingGroupId,
    /// Voice priority (0 = highest)
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Playable clips, addressed by index
    #[serde(default)]
    pub clips: Vec<ClipId>,
    /// Fade-in shape
    #[serde(default)]
    pub fade_in: FadeShape,
    /// Fade-out shape
    #[serde(default)]
    pub fade_out: FadeShape,
}

fn default_priority() -> u8 {
    PRIORITY_MIDDLE
}

impl AudioAsset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: RoutingGroupId::default(),
            priority: PRIORITY_MIDDLE,
            clips: Vec::new(),
            fade_in: FadeShape::default(),
            fade_out: FadeShape::default(),
        }
    }

    // === Builder methods ===

    pub fn with_clip(mut self, clip: ClipId) -> Self {
        self.clips.push(clip);
        self
    }

    pub fn with_clips(mut self, clips: impl IntoIterator<Item = ClipId>) -> Self {
        self.clips.extend(clips);
        self
    }

    pub fn with_group(mut self, group: RoutingGroupId) -> Self {
        self.group = group;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_fade_in(mut self, shape: impl Into<FadeShape>) -> Self {
        self.fade_in = shape.into();
        self
    }

    pub fn with_fade_out(mut self, shape: impl Into<FadeShape>) -> Self {
        self.fade_out = shape.into();
        self
    }

    // === Queries ===

    #[inline]
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    #[inline]
    pub fn clip(&self, index: usize) -> Option<ClipId> {
        self.clips.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::FadeCurve;

    #[test]
    fn test_asset_defaults() {
        let asset = AudioAsset::new("empty");
        assert_eq!(asset.priority, PRIORITY_MIDDLE);
        assert_eq!(asset.clip_count(), 0);
        assert_eq!(asset.fade_in, FadeShape::Preset(FadeCurve::Linear));
    }

    #[test]
    fn test_clip_lookup() {
        let asset = AudioAsset::new("se").with_clip(ClipId(5)).with_clip(ClipId(6));
        assert_eq!(asset.clip(1), Some(ClipId(6)));
        assert_eq!(asset.clip(2), None);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let asset: AudioAsset =
            serde_json::from_str(r#"{ "name": "bgm", "clips": [1, 2, 3] }"#).unwrap();
        assert_eq!(asset.clips, vec![ClipId(1), ClipId(2), ClipId(3)]);
        assert_eq!(asset.priority, PRIORITY_MIDDLE);
        assert_eq!(asset.group, RoutingGroupId(0));
    }
}
