//! Playback and Data Handles
//!
//! An [`AudioHandle`] packs four 8-bit fields into one `u32`:
//!
//! ```text
//!  31        24 23        16 15         8 7          0
//! ┌────────────┬────────────┬────────────┬────────────┐
//! │  channel   │    clip    │    data    │    play    │
//! │   index    │   index    │   handle   │    tag     │
//! └────────────┴────────────┴────────────┴────────────┘
//! ```
//!
//! The channel index locates the owning channel in O(1). The full value is
//! compared against what that channel currently stores, so a handle kept by
//! a caller after its playback ended no longer matches once the channel has
//! been reset or reused. The low byte is the number of plays the channel
//! had started before this one (wrapping), so consecutive playbacks on one
//! channel never share a handle and a value only comes back after 256 plays
//! on that channel. It is opaque and never read back as an index.

use serde::{Deserialize, Serialize};
use std::fmt;

const SHIFT_CHANNEL: u32 = 24;
const SHIFT_CLIP: u32 = 16;
const SHIFT_DATA: u32 = 8;
const SHIFT_TAG: u32 = 0;
const FIELD_MASK: u32 = 0xFF;

// ═══════════════════════════════════════════════════════════════════════════════
// DATA HANDLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Index of a registered asset in a player's resource slot table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataHandle(u8);

impl DataHandle {
    #[inline]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl fmt::Display for DataHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data#{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AUDIO HANDLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Identity of one playback instance
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioHandle(u32);

impl AudioHandle {
    /// "No playback"
    pub const EMPTY: AudioHandle = AudioHandle(u32::MAX);

    /// Pack the four fields
    #[inline]
    pub const fn pack(channel: u8, clip: u8, data: DataHandle, tag: u8) -> Self {
        Self(
            (channel as u32) << SHIFT_CHANNEL
                | (clip as u32) << SHIFT_CLIP
                | (data.0 as u32) << SHIFT_DATA
                | (tag as u32) << SHIFT_TAG,
        )
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == Self::EMPTY.0
    }

    /// Pool index of the owning channel
    #[inline]
    pub const fn channel_index(self) -> usize {
        ((self.0 >> SHIFT_CHANNEL) & FIELD_MASK) as usize
    }

    #[inline]
    pub const fn clip_index(self) -> usize {
        ((self.0 >> SHIFT_CLIP) & FIELD_MASK) as usize
    }

    #[inline]
    pub const fn data_handle(self) -> DataHandle {
        DataHandle(((self.0 >> SHIFT_DATA) & FIELD_MASK) as u8)
    }

    /// Opaque disambiguation bits (the channel's play count)
    #[inline]
    pub const fn active_tag(self) -> u8 {
        ((self.0 >> SHIFT_TAG) & FIELD_MASK) as u8
    }
}

impl Default for AudioHandle {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for AudioHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("AudioHandle(EMPTY)");
        }
        write!(
            f,
            "AudioHandle(ch={} clip={} data={} tag={})",
            self.channel_index(),
            self.clip_index(),
            self.data_handle().raw(),
            self.active_tag()
        )
    }
}

impl fmt::Display for AudioHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}
