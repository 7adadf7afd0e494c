//! Channel Pool
//!
//! Fixed set of [`PlaybackChannel`]s plus two index lists that partition them
//! into free and active. Both lists are preallocated to the pool size, so
//! allocation and release never grow a buffer.

use crate::backend::{AudioBackend, OutputChannel};
use crate::channel::PlaybackChannel;

pub struct ChannelPool<C: OutputChannel> {
    channels: Vec<PlaybackChannel<C>>,
    free: Vec<usize>,
    active: Vec<usize>,
}

impl<C: OutputChannel> ChannelPool<C> {
    /// Provision `size` channels from the backend, named `"{prefix}{index:02}"`
    pub fn new<B>(backend: &mut B, prefix: &str, size: u8) -> Self
    where
        B: AudioBackend<Channel = C>,
    {
        let size = size as usize;
        let mut channels = Vec::with_capacity(size);
        let mut free = Vec::with_capacity(size);

        for index in 0..size {
            let output = backend.create_channel(&format!("{prefix}{index:02}"));
            channels.push(PlaybackChannel::new(index as u8, output));
            free.push(index);
        }

        Self {
            channels,
            free,
            active: Vec::with_capacity(size),
        }
    }

    /// Move a free channel to the end of the active list.
    ///
    /// Returns the channel index, or `None` when every channel is busy.
    pub fn allocate(&mut self) -> Option<usize> {
        let channel = self.free.pop()?;
        self.active.push(channel);
        Some(channel)
    }

    /// Reset the channel at `active_position` and return it to the free list
    pub fn release(&mut self, active_position: usize) {
        if active_position >= self.active.len() {
            return;
        }
        let channel = self.active.remove(active_position);
        self.channels[channel].reset();
        self.free.push(channel);
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Channel index at an active position
    #[inline]
    pub fn active_at(&self, active_position: usize) -> Option<usize> {
        self.active.get(active_position).copied()
    }

    #[inline]
    pub fn channel(&self, index: usize) -> Option<&PlaybackChannel<C>> {
        self.channels.get(index)
    }

    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut PlaybackChannel<C>> {
        self.channels.get_mut(index)
    }

    /// Channel indices currently active, in allocation order
    #[inline]
    pub fn active(&self) -> &[usize] {
        &self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessBackend, HeadlessChannel};

    fn pool(size: u8) -> (HeadlessBackend, ChannelPool<HeadlessChannel>) {
        let mut backend = HeadlessBackend::new();
        let pool = ChannelPool::new(&mut backend, "Se", size);
        (backend, pool)
    }

    #[test]
    fn test_channels_named_by_prefix() {
        let (backend, pool) = pool(3);
        assert_eq!(pool.capacity(), 3);
        assert_eq!(backend.channel_count(), 3);
        assert_eq!(backend.voice(0).unwrap().name, "Se00");
        assert_eq!(backend.voice(2).unwrap().name, "Se02");
    }

    #[test]
    fn test_allocate_pops_from_back() {
        let (_backend, mut pool) = pool(3);
        assert_eq!(pool.allocate(), Some(2));
        assert_eq!(pool.allocate(), Some(1));
        assert_eq!(pool.free_count(), 1);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_exhaustion() {
        let (_backend, mut pool) = pool(1);
        assert!(pool.allocate().is_some());
        assert!(pool.allocate().is_none());
    }

    #[test]
    fn test_release_partitions_stay_disjoint() {
        let (_backend, mut pool) = pool(4);
        for _ in 0..4 {
            pool.allocate();
        }
        pool.release(1);
        assert_eq!(pool.active(), &[3, 1, 0]);
        assert_eq!(pool.free_count(), 1);
        assert_eq!(pool.active_count() + pool.free_count(), pool.capacity());

        // The released channel is the next one handed out
        assert_eq!(pool.allocate(), Some(2));
        assert_eq!(pool.active(), &[3, 1, 0, 2]);
    }

    #[test]
    fn test_release_out_of_range_ignored() {
        let (_backend, mut pool) = pool(2);
        pool.allocate();
        pool.release(5);
        assert_eq!(pool.active_count(), 1);
    }
}
