//! The single active Playback Session.
//!
//! At most one session is active. Starting a new one always stops and
//! releases the previous one first.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::tts::{AudioPlayer, PlayableResource, PlaybackControl};

/// Owns a loaded audio resource and releases it on drop.
pub struct ResourceLease {
    player: Arc<dyn AudioPlayer>,
    resource: PlayableResource,
}

impl ResourceLease {
    pub fn new(player: Arc<dyn AudioPlayer>, resource: PlayableResource) -> Self {
        Self { player, resource }
    }

    pub fn resource(&self) -> &PlayableResource {
        &self.resource
    }
}

impl Drop for ResourceLease {
    fn drop(&mut self) {
        match self.player.release(&self.resource) {
            Ok(()) => debug!("Released audio resource {}", self.resource.id),
            Err(e) => warn!("Failed to release audio resource {}: {}", self.resource.id, e),
        }
    }
}

/// Proof that the slot was cleared for a new playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTicket(u64);

struct PlaybackSession {
    id: u64,
    control: Box<dyn PlaybackControl>,
    // Dropped after `control` is stopped.
    _resource: Option<ResourceLease>,
}

impl PlaybackSession {
    fn stop(mut self) {
        debug!("Stopping playback session {}", self.id);
        self.control.stop();
    }
}

#[derive(Default)]
pub struct PlaybackSlot {
    active: Option<PlaybackSession>,
    epoch: u64,
    next_id: u64,
}

impl PlaybackSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_id(&self) -> Option<u64> {
        self.active.as_ref().map(|s| s.id)
    }

    /// Stop and release the active session. Pending tickets become stale.
    pub fn stop(&mut self) -> bool {
        self.epoch += 1;
        match self.active.take() {
            Some(session) => {
                session.stop();
                true
            }
            None => false,
        }
    }

    /// Clear the slot ahead of starting a new playback.
    pub fn reserve(&mut self) -> PlaybackTicket {
        self.stop();
        PlaybackTicket(self.epoch)
    }

    /// Whether no stop or newer reservation happened since `ticket` was issued.
    pub fn is_current(&self, ticket: PlaybackTicket) -> bool {
        ticket.0 == self.epoch
    }

    /// Install a started playback.
    ///
    /// Returns the session id, or `None` when the ticket went stale while the
    /// playback was starting; in that case the playback is stopped and its
    /// resource released here.
    pub fn activate(
        &mut self,
        ticket: PlaybackTicket,
        mut control: Box<dyn PlaybackControl>,
        resource: Option<ResourceLease>,
    ) -> Option<u64> {
        if !self.is_current(ticket) {
            debug!("Discarding playback that started after the slot was cleared");
            control.stop();
            drop(resource);
            return None;
        }

        if let Some(previous) = self.active.take() {
            previous.stop();
        }

        self.next_id += 1;
        let id = self.next_id;
        self.active = Some(PlaybackSession {
            id,
            control,
            _resource: resource,
        });
        debug!("Playback session {} active", id);
        Some(id)
    }

    /// Release session `id` after it ended on its own.
    ///
    /// Returns false when that session is no longer the active one.
    pub fn finish(&mut self, id: u64) -> bool {
        if self.active_id() != Some(id) {
            return false;
        }
        self.active = None;
        debug!("Playback session {} finished", id);
        true
    }
}
