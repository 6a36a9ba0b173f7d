//! # Typed Accessor
//!
//! `Singleton::<T>` is the everyday entry point: associated functions over
//! the process-wide registry, so call sites never name a registry.
//!
//! ```rust,ignore
//! Singleton::<AudioDirector>::install(&host);
//!
//! if let Some(director) = Singleton::<AudioDirector>::get_instance(&host) {
//!     director.play("theme");
//! }
//! ```
//!
//! After shutdown begins, `get_instance` returns `None`. Callers must treat
//! that as a normal value, not a failure.

use std::marker::PhantomData;

use crate::behaviour::Behaviour;
use crate::error::SingletonResult;
use crate::host::{Host, HostControl};
use crate::object::Instance;
use crate::registry::SingletonRegistry;
use crate::slot::SlotState;
use crate::stats::SlotStats;

/// Global singleton accessor for behaviour type `T`.
///
/// Never instantiated; all functions are associated.
pub struct Singleton<T: Behaviour> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Behaviour> Singleton<T> {
    /// Registers `T`'s lifecycle hooks with `host`.
    pub fn install<H: Host>(host: &H) {
        SingletonRegistry::global().install::<T, H>(host);
    }

    /// Returns the unique live instance of `T`, creating it if absent.
    ///
    /// `None` once the bound instance has been released.
    pub fn get_instance<H: Host>(host: &H) -> Option<Instance<T>> {
        SingletonRegistry::global().get_instance::<T, H>(host)
    }

    /// Returns the unique live instance of `T`, or why there is none.
    ///
    /// # Errors
    ///
    /// Fails after shutdown, when the host refuses creation, or when every
    /// candidate is destroyed before it can be bound.
    pub fn try_get_instance<H: Host>(host: &H) -> SingletonResult<Instance<T>> {
        SingletonRegistry::global().try_get_instance::<T, H>(host)
    }

    /// The bound instance, if any, without creating one.
    #[must_use]
    pub fn peek() -> Option<Instance<T>> {
        SingletonRegistry::global().peek::<T>()
    }

    /// Claim hook, for hosts that dispatch hooks themselves.
    pub fn on_claim(host: &dyn HostControl, instance: &Instance<T>) {
        SingletonRegistry::global().on_claim(host, instance);
    }

    /// Release hook, for hosts that dispatch hooks themselves.
    pub fn on_release(instance: &Instance<T>) {
        SingletonRegistry::global().on_release(instance);
    }

    /// Returns `true` once the bound instance has been released.
    #[must_use]
    pub fn is_shutting_down() -> bool {
        SingletonRegistry::global().is_shutting_down::<T>()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state() -> SlotState {
        SingletonRegistry::global().state::<T>()
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats() -> SlotStats {
        SingletonRegistry::global().stats::<T>()
    }
}
