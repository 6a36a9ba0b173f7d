//! # Singleton Registry
//!
//! Type-indexed table of [`SingletonSlot`]s: one canonical slot per behaviour
//! type for the lifetime of the registry. The [`global`](SingletonRegistry::global)
//! registry makes slots process-wide; separate registries are fully isolated
//! (useful for tools and tests).

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::behaviour::Behaviour;
use crate::config::SingletonConfig;
use crate::error::SingletonResult;
use crate::host::{Host, HostControl};
use crate::object::Instance;
use crate::slot::{SingletonSlot, SlotState};
use crate::stats::SlotStats;

type ErasedSlot = Arc<dyn Any + Send + Sync>;

static GLOBAL: Lazy<SingletonRegistry> = Lazy::new(SingletonRegistry::new);

/// Table of singleton slots keyed by behaviour type.
pub struct SingletonRegistry {
    slots: RwLock<HashMap<TypeId, ErasedSlot>>,
    config: Arc<SingletonConfig>,
}

impl Default for SingletonRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SingletonRegistry {
    /// Creates an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SingletonConfig::default())
    }

    /// Creates an empty registry sharing `config` across all its slots.
    #[must_use]
    pub fn with_config(config: SingletonConfig) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            config: Arc::new(config),
        }
    }

    /// The process-wide registry, using the default configuration.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Configuration shared by every slot.
    #[must_use]
    pub fn config(&self) -> &SingletonConfig {
        &self.config
    }

    /// Number of behaviour types with a slot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Returns `true` if no slot has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// The slot for `T`, created on first use.
    #[must_use]
    pub fn slot<T: Behaviour>(&self) -> Arc<SingletonSlot<T>> {
        let key = TypeId::of::<T>();
        if let Some(slot) = self.slots.read().get(&key).and_then(downcast_slot::<T>) {
            return slot;
        }

        let mut slots = self.slots.write();
        if let Some(slot) = slots.get(&key).and_then(downcast_slot::<T>) {
            return slot;
        }
        let slot = Arc::new(SingletonSlot::<T>::new(Arc::clone(&self.config)));
        slots.insert(key, Arc::clone(&slot) as ErasedSlot);
        slot
    }

    /// Registers `T`'s claim and release hooks with `host`.
    ///
    /// Objects of `T` constructed before this call were never claimed; the
    /// next lookup discovers them instead.
    pub fn install<T: Behaviour, H: Host>(&self, host: &H) {
        host.register_hooks(self.slot::<T>().hooks());
    }

    /// See [`SingletonSlot::get_instance`].
    pub fn get_instance<T: Behaviour, H: Host>(&self, host: &H) -> Option<Instance<T>> {
        self.slot::<T>().get_instance(host)
    }

    /// See [`SingletonSlot::try_get_instance`].
    ///
    /// # Errors
    ///
    /// Fails after shutdown, when the host refuses creation, or when every
    /// candidate is destroyed before it can be bound.
    pub fn try_get_instance<T: Behaviour, H: Host>(&self, host: &H) -> SingletonResult<Instance<T>> {
        self.slot::<T>().try_get_instance(host)
    }

    /// See [`SingletonSlot::peek`].
    #[must_use]
    pub fn peek<T: Behaviour>(&self) -> Option<Instance<T>> {
        self.slot::<T>().peek()
    }

    /// See [`SingletonSlot::on_claim`].
    pub fn on_claim<T: Behaviour>(&self, host: &dyn HostControl, instance: &Instance<T>) {
        self.slot::<T>().on_claim(host, instance);
    }

    /// See [`SingletonSlot::on_release`].
    pub fn on_release<T: Behaviour>(&self, instance: &Instance<T>) {
        self.slot::<T>().on_release(instance);
    }

    /// See [`SingletonSlot::is_shutting_down`].
    #[must_use]
    pub fn is_shutting_down<T: Behaviour>(&self) -> bool {
        self.slot::<T>().is_shutting_down()
    }

    /// See [`SingletonSlot::state`].
    #[must_use]
    pub fn state<T: Behaviour>(&self) -> SlotState {
        self.slot::<T>().state()
    }

    /// See [`SingletonSlot::stats`].
    #[must_use]
    pub fn stats<T: Behaviour>(&self) -> SlotStats {
        self.slot::<T>().stats()
    }
}

fn downcast_slot<T: Behaviour>(erased: &ErasedSlot) -> Option<Arc<SingletonSlot<T>>> {
    Arc::clone(erased).downcast::<SingletonSlot<T>>().ok()
}
