//! # OROBOROS Singleton
//!
//! Lazily-instantiated, lifecycle-guarded singletons for host-managed
//! objects:
//! - At most one live instance of a behaviour type is bound at a time
//! - The instance is created on first access if none exists
//! - Persistent instances are marked to survive scene transitions
//! - Once the bound instance is torn down, nothing is ever created again
//!
//! ## Architecture Rules
//!
//! 1. **The host owns lifetimes** - creation, destruction and hook dispatch
//!    go through the [`Host`] trait
//! 2. **Nothing is fatal** - duplicates are reported, post-shutdown access
//!    returns `None`
//! 3. **One slot per type** - a type-indexed [`SingletonRegistry`], not
//!    per-generic statics
//!
//! ## Example
//!
//! ```rust,ignore
//! use oroboros_singleton::{Behaviour, MemoryHost, Singleton};
//!
//! let host = MemoryHost::new();
//! Singleton::<AudioDirector>::install(&host);
//!
//! let director = Singleton::<AudioDirector>::get_instance(&host);
//! // Created once, named "AudioDirector (Singleton)"
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod accessor;
pub mod behaviour;
pub mod config;
pub mod error;
pub mod host;
pub mod object;
pub mod registry;
pub mod slot;
pub mod stats;

pub use accessor::Singleton;
pub use behaviour::Behaviour;
pub use config::SingletonConfig;
pub use error::{HostError, SingletonError, SingletonResult};
pub use host::{Host, HostControl, LifecycleHooks, MemoryHost};
pub use object::{Instance, ObjectId};
pub use registry::SingletonRegistry;
pub use slot::{SingletonSlot, SlotState};
pub use stats::SlotStats;
