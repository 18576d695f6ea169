//! Room hosting: async actors around the deterministic engine.
//!
//! Each room runs in its own tokio task with an mpsc inbox, so all of a
//! room's state changes happen on one logical timeline. The
//! [`RoomRegistry`] spawns rooms and resolves ids to [`RoomHandle`]s;
//! handles expose the room operations as plain async methods and hide the
//! oneshot plumbing.
//!
//! ## Example
//!
//! ```ignore
//! use holdem_rooms::room::{RoomConfig, RoomRegistry};
//! use holdem_rooms::game::DisplayName;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = RoomRegistry::new();
//!     let host = Uuid::new_v4();
//!     let room = registry
//!         .create_room(RoomConfig::default(), host, DisplayName::from("alice"))
//!         .await
//!         .unwrap();
//!     let snapshot = room.start_hand(host).await;
//! }
//! ```

pub mod actor;
pub mod config;
pub mod messages;
pub mod registry;

pub use actor::{RoomActor, RoomHandle};
pub use config::RoomConfig;
pub use messages::{RoomEvent, RoomMessage};
pub use registry::RoomRegistry;
