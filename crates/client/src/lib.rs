//! # Orbit Client
//!
//! Device-side pieces of Orbit: the JSON mirror behind the profile store,
//! the HTTP client for the backend, the debounced cloud sync and the in-app
//! notification loop.

pub mod debounce;
pub mod local;
pub mod mock;
pub mod remote;
pub mod ticker;

pub use debounce::{DebouncedSync, ProfilePusher};
pub use local::JsonFilePersistence;
pub use remote::SyncClient;
pub use ticker::{NotificationTicker, SystemNotifier};
