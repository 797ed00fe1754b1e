//! usm engine
//!
//! Runtime side of the settings manager:
//! - a registry of owner schemas (last registration of an id wins)
//! - persistence of committed values, namespaced per owner
//! - one draft session for the owner being edited, with per-field
//!   debounced re-validation
//! - change notification to listeners on commit and reset
//!
//! [`Manager`] is the type you construct and drive. Everything else is
//! exposed for editor surfaces ([`Control`], [`DraftSnapshot`], [`Status`])
//! and for choosing a storage [`Backend`].

mod broadcast;
mod config;
mod control;
mod debounce;
mod draft;
mod error;
mod manager;
mod registry;
mod status;
mod store;

pub use broadcast::{Broadcaster, Listener, ListenerId};
pub use config::ManagerConfig;
pub use control::{Control, add_tag, remove_tag};
pub use debounce::Debouncer;
pub use draft::{Draft, DraftSnapshot, Errors};
pub use error::{Error, Result};
pub use manager::Manager;
pub use registry::{OwnerSummary, Registry, display_name};
pub use status::Status;
pub use store::{Backend, FileBackend, MemoryBackend, Storage, StoreError, StoreResult};
