//! Registry spawning and tracking room actors.

use log::info;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::actor::{RoomActor, RoomHandle};
use super::config::RoomConfig;
use crate::game::{DisplayName, PlayerId, RoomId, ValidationError};

/// Spawns room actors and resolves room ids to handles. Cloneable; clones
/// share the same underlying map.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<RwLock<HashMap<RoomId, RoomHandle>>>,
}

impl RoomRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config, spawn the room task with `host` seated, and
    /// return its handle.
    pub async fn create_room(
        &self,
        config: RoomConfig,
        host: PlayerId,
        host_name: DisplayName,
    ) -> Result<RoomHandle, ValidationError> {
        config.validate()?;
        let id = Uuid::new_v4();
        let (actor, handle) = RoomActor::new(id, config, host, host_name);
        tokio::spawn(actor.run());
        self.rooms.write().await.insert(id, handle.clone());
        info!("registry: created room {id} hosted by {host}");
        Ok(handle)
    }

    /// Look up a live room. Rooms whose task has stopped are pruned on
    /// access.
    pub async fn get(&self, id: RoomId) -> Option<RoomHandle> {
        let handle = self.rooms.read().await.get(&id).cloned()?;
        if handle.is_closed() {
            self.rooms.write().await.remove(&id);
            return None;
        }
        Some(handle)
    }

    /// Ids of rooms whose tasks are still running.
    pub async fn list_rooms(&self) -> Vec<RoomId> {
        self.prune().await;
        self.rooms.read().await.keys().copied().collect()
    }

    pub async fn room_count(&self) -> usize {
        self.prune().await;
        self.rooms.read().await.len()
    }

    /// Shut a room down and forget it. Unknown ids are not an error; the
    /// room may have closed itself after emptying.
    pub async fn close_room(&self, id: RoomId) {
        let handle = self.rooms.write().await.remove(&id);
        if let Some(handle) = handle {
            let _ = handle.close().await;
            info!("registry: closed room {id}");
        }
    }

    /// Close every room; used on shutdown.
    pub async fn close_all(&self) {
        let handles: Vec<RoomHandle> = self.rooms.write().await.drain().map(|(_, h)| h).collect();
        for handle in handles {
            let _ = handle.close().await;
        }
    }

    async fn prune(&self) {
        self.rooms.write().await.retain(|_, handle| !handle.is_closed());
    }
}
