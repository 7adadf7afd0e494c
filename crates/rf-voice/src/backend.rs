//! Backend Contract
//!
//! The scheduler never renders audio. It drives output channels provided by
//! the host through [`OutputChannel`], and asks the host's [`AudioBackend`]
//! to provision those channels once, when a player is built.

use crate::asset::{ClipId, RoutingGroupId};
use portable_atomic::AtomicF32;
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;

// ═══════════════════════════════════════════════════════════════════════════════
// POSITION
// ═══════════════════════════════════════════════════════════════════════════════

/// Local position of an emitter
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position3D {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::default()
    }
}

/// Emitter position shared between game code and the scheduler
///
/// Game code moves the target; a channel that tracks it copies the position
/// onto its output every tick.
pub struct TrackingTarget {
    x: AtomicF32,
    y: AtomicF32,
    z: AtomicF32,
}

impl TrackingTarget {
    pub fn new(position: Position3D) -> Self {
        Self {
            x: AtomicF32::new(position.x),
            y: AtomicF32::new(position.y),
            z: AtomicF32::new(position.z),
        }
    }

    pub fn set(&self, position: Position3D) {
        self.x.store(position.x, Ordering::Relaxed);
        self.y.store(position.y, Ordering::Relaxed);
        self.z.store(position.z, Ordering::Relaxed);
    }

    pub fn get(&self) -> Position3D {
        Position3D {
            x: self.x.load(Ordering::Relaxed),
            y: self.y.load(Ordering::Relaxed),
            z: self.z.load(Ordering::Relaxed),
        }
    }
}

impl Default for TrackingTarget {
    fn default() -> Self {
        Self::new(Position3D::origin())
    }
}

impl std::fmt::Debug for TrackingTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TrackingTarget").field(&self.get()).finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTRACTS
// ═══════════════════════════════════════════════════════════════════════════════

/// One physical output channel owned by the host audio backend
pub trait OutputChannel {
    /// Bind a clip (`None` unbinds)
    fn bind_clip(&mut self, clip: Option<ClipId>);
    fn set_routing_group(&mut self, group: RoutingGroupId);
    fn set_priority(&mut self, priority: u8);
    /// Linear gain, 0.0 - 1.0
    fn set_gain(&mut self, gain: f32);
    fn set_loop(&mut self, looping: bool);
    /// 0.0 = 2D, 1.0 = fully 3D
    fn set_spatial_blend(&mut self, blend: f32);
    fn set_local_position(&mut self, position: Position3D);
    /// Start (or resume after `pause`) the bound clip
    fn play(&mut self);
    fn stop(&mut self);
    fn pause(&mut self);
    /// False once stopped, paused, or a non-looping clip has run out
    fn is_playing(&self) -> bool;
}

/// Host side of the backend
pub trait AudioBackend {
    type Channel: OutputChannel;

    /// Provision one output channel; called `pool_size` times per player
    fn create_channel(&mut self, name: &str) -> Self::Channel;

    /// Release decoded data for a clip whose asset was unregistered
    fn unload_clip_data(&mut self, clip: ClipId);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_tracking_target_shared() {
        let target = Arc::new(TrackingTarget::new(Position3D::new(1.0, 2.0, 3.0)));
        let observer = Arc::clone(&target);

        target.set(Position3D::new(-4.0, 0.5, 9.0));
        assert_eq!(observer.get(), Position3D::new(-4.0, 0.5, 9.0));
    }

    #[test]
    fn test_default_target_at_origin() {
        assert_eq!(TrackingTarget::default().get(), Position3D::origin());
    }
}
