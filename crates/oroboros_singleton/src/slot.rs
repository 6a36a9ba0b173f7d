//! # Singleton Slot
//!
//! One slot per behaviour type. Holds the bound instance, the shutdown latch
//! and the creation lock.
//!
//! ## State machine
//!
//! ```text
//!   Uninitialized ──first bind──▶ Active ──bound object released──▶ ShuttingDown
//!                                                                     (terminal)
//! ```
//!
//! ## Locking
//!
//! - `creation` serializes the whole existence check → duplicate scan →
//!   create → bind sequence, so concurrent first accesses create one object.
//! - `bound` is a short-lived `RwLock` around the slot itself. The creation
//!   lock is held across `Host::create_object`, the slot lock never is, so a
//!   claim hook fired synchronously by the host can bind without deadlock.
//! - `shutting_down` is read lock-free. It only ever goes false → true.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::behaviour::Behaviour;
use crate::config::SingletonConfig;
use crate::error::{SingletonError, SingletonResult};
use crate::host::{Host, HostControl, LifecycleHooks};
use crate::object::Instance;
use crate::stats::{SlotCounters, SlotStats};

/// Observable lifecycle state of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// Nothing bound yet.
    Uninitialized,
    /// An instance is bound.
    Active,
    /// The bound instance was released; the accessor returns `None` forever.
    ShuttingDown,
}

/// Outcome of trying to bind an instance into the slot.
enum Binding<T> {
    /// The candidate is now the singleton.
    Bound(Instance<T>),
    /// Another (or the same) object already holds the slot.
    Occupied(Instance<T>),
    /// The candidate was torn down before it could be bound.
    Dead,
    /// The latch tripped; nothing may be bound.
    Refused,
}

/// Lookup passes before the accessor gives up on candidates that keep dying.
const MAX_BIND_ATTEMPTS: usize = 4;

/// Process-wide storage for the singleton of one behaviour type.
pub struct SingletonSlot<T: Behaviour> {
    creation: Mutex<()>,
    bound: RwLock<Option<Instance<T>>>,
    shutting_down: AtomicBool,
    config: Arc<SingletonConfig>,
    counters: SlotCounters,
}

impl<T: Behaviour> SingletonSlot<T> {
    /// Creates an empty slot.
    #[must_use]
    pub fn new(config: Arc<SingletonConfig>) -> Self {
        Self {
            creation: Mutex::new(()),
            bound: RwLock::new(None),
            shutting_down: AtomicBool::new(false),
            config,
            counters: SlotCounters::default(),
        }
    }

    /// Returns `true` once the bound instance has been released.
    #[inline]
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SlotState {
        if self.is_shutting_down() {
            SlotState::ShuttingDown
        } else if self.bound.read().is_some() {
            SlotState::Active
        } else {
            SlotState::Uninitialized
        }
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> SlotStats {
        self.counters.snapshot()
    }

    /// The bound instance, without creating, scanning or logging.
    #[must_use]
    pub fn peek(&self) -> Option<Instance<T>> {
        if self.is_shutting_down() {
            return None;
        }
        self.bound.read().clone()
    }

    /// Returns the singleton, creating it through `host` if none exists.
    ///
    /// Returns `None` after shutdown (with a warning) or if the host refuses
    /// to create the object (with an error). Never panics.
    pub fn get_instance<H: Host>(&self, host: &H) -> Option<Instance<T>> {
        self.try_get_instance(host).ok()
    }

    /// Like [`get_instance`](Self::get_instance), but reports why no
    /// instance is available.
    ///
    /// When more than one live object is found, the first one is returned
    /// and the duplicate is only reported; nothing is destroyed.
    ///
    /// # Errors
    ///
    /// - [`SingletonError::PostShutdownAccess`] once the latch has tripped.
    /// - [`SingletonError::Host`] if the object could not be created.
    /// - [`SingletonError::InstanceDestroyed`] if every candidate was torn
    ///   down before it could be bound.
    pub fn try_get_instance<H: Host>(&self, host: &H) -> SingletonResult<Instance<T>> {
        if self.is_shutting_down() {
            return Err(self.refuse_post_shutdown());
        }
        if let Some(instance) = self.bound.read().clone() {
            return Ok(instance);
        }

        let _creation = self.creation.lock();

        // Another caller may have won the race while we waited
        if self.is_shutting_down() {
            return Err(self.refuse_post_shutdown());
        }
        if let Some(instance) = self.bound.read().clone() {
            return Ok(instance);
        }

        // A candidate torn down between scan and bind is skipped and the
        // graph rescanned.
        for _ in 0..MAX_BIND_ATTEMPTS {
            if let Some(instance) = self.scan_and_bind(host)? {
                return Ok(instance);
            }
        }

        tracing::error!(
            singleton = T::type_name(),
            attempts = MAX_BIND_ATTEMPTS,
            "every candidate was destroyed before it could be bound"
        );
        Err(SingletonError::InstanceDestroyed {
            type_name: T::type_name(),
        })
    }

    /// One lookup pass. Caller holds the creation lock.
    ///
    /// `Ok(None)` when the chosen object died before it was bound.
    fn scan_and_bind<H: Host>(&self, host: &H) -> SingletonResult<Option<Instance<T>>> {
        let mut found = host.find_objects::<T>();
        let candidate = match found.len() {
            0 => return self.create(host),
            1 => found.swap_remove(0),
            count => {
                SlotCounters::bump(&self.counters.duplicates_reported);
                if self.config.report_duplicates {
                    let error = SingletonError::DuplicateInstanceDetected {
                        type_name: T::type_name(),
                        count,
                    };
                    tracing::error!(
                        singleton = T::type_name(),
                        count,
                        "{error}; returning the first one found"
                    );
                }
                found.swap_remove(0)
            }
        };

        match self.bind(host, candidate) {
            Binding::Bound(instance) => {
                SlotCounters::bump(&self.counters.discovered);
                tracing::debug!(
                    singleton = T::type_name(),
                    object = %instance.id(),
                    "bound existing instance"
                );
                Ok(Some(instance))
            }
            Binding::Occupied(instance) => Ok(Some(instance)),
            Binding::Dead => Ok(None),
            Binding::Refused => Err(self.refuse_post_shutdown()),
        }
    }

    /// Claim hook. Called by the host when an object carrying `T` is
    /// constructed.
    ///
    /// Binds the object if the slot is empty. If another object is already
    /// bound, the newcomer is a duplicate and is destroyed through `host`.
    pub fn on_claim(&self, host: &dyn HostControl, instance: &Instance<T>) {
        if self.is_shutting_down() {
            tracing::debug!(
                singleton = T::type_name(),
                object = %instance.id(),
                "claim ignored after shutdown"
            );
            return;
        }

        match self.bind(host, instance.clone()) {
            Binding::Bound(_) => SlotCounters::bump(&self.counters.claimed),
            Binding::Occupied(current) if current.same_object(instance) => {}
            Binding::Occupied(current) => {
                SlotCounters::bump(&self.counters.duplicates_destroyed);
                tracing::warn!(
                    singleton = T::type_name(),
                    object = %instance.id(),
                    bound = %current.id(),
                    "duplicate singleton constructed, destroying it"
                );
                host.destroy(instance.id());
            }
            Binding::Dead | Binding::Refused => {}
        }
    }

    /// Release hook. Called by the host when an object carrying `T` is torn
    /// down.
    ///
    /// Releasing the bound object trips the shutdown latch and clears the
    /// slot. Releasing any other object has no effect.
    pub fn on_release(&self, instance: &Instance<T>) {
        let mut bound = self.bound.write();
        if bound.as_ref().is_some_and(|current| current.same_object(instance)) {
            self.shutting_down.store(true, Ordering::Release);
            *bound = None;
            tracing::debug!(
                singleton = T::type_name(),
                object = %instance.id(),
                "bound instance released, singleton shutting down"
            );
        }
    }

    /// Hooks to register with a host. Both capture this slot.
    #[must_use]
    pub fn hooks(self: &Arc<Self>) -> LifecycleHooks<T> {
        let claim_slot = Arc::clone(self);
        let release_slot = Arc::clone(self);
        LifecycleHooks::new(
            Box::new(move |host: &dyn HostControl, instance: &Instance<T>| {
                claim_slot.on_claim(host, instance);
            }),
            Box::new(move |instance: &Instance<T>| release_slot.on_release(instance)),
        )
    }

    /// Creates the object. Caller holds the creation lock.
    fn create<H: Host>(&self, host: &H) -> SingletonResult<Option<Instance<T>>> {
        let name = self.config.object_name(T::type_name());
        let created = host.create_object::<T>(&name).map_err(|error| {
            tracing::error!(singleton = T::type_name(), %error, "host refused to create singleton");
            SingletonError::from(error)
        })?;
        SlotCounters::bump(&self.counters.created);
        tracing::debug!(singleton = T::type_name(), object = %created.id(), %name, "created singleton");

        // The claim hook may already have bound it, or destroyed it in favour
        // of an object claimed concurrently. Either way, return what is bound.
        match self.bind(host, created) {
            Binding::Bound(instance) | Binding::Occupied(instance) => Ok(Some(instance)),
            Binding::Dead => Ok(None),
            Binding::Refused => Err(self.refuse_post_shutdown()),
        }
    }

    /// Binds `candidate` if the slot is empty, the latch is clear and the
    /// object is still alive. Marks it persistent when its flag is set.
    ///
    /// Liveness is checked under the slot lock: a release racing with this
    /// bind either removed the object first (not bound) or waits for the lock
    /// and then sees it bound (latch trips).
    fn bind(&self, host: &dyn HostControl, candidate: Instance<T>) -> Binding<T> {
        {
            let mut bound = self.bound.write();
            if self.is_shutting_down() {
                return Binding::Refused;
            }
            if let Some(current) = bound.as_ref() {
                return Binding::Occupied(current.clone());
            }
            if !host.is_alive(candidate.id()) {
                tracing::debug!(
                    singleton = T::type_name(),
                    object = %candidate.id(),
                    "candidate destroyed before bind, skipping"
                );
                return Binding::Dead;
            }
            *bound = Some(candidate.clone());
        }

        if candidate.persistent() {
            host.mark_persistent(candidate.id());
        }
        Binding::Bound(candidate)
    }

    fn refuse_post_shutdown(&self) -> SingletonError {
        SlotCounters::bump(&self.counters.post_shutdown_accesses);
        if self.config.report_post_shutdown_access {
            tracing::warn!(
                singleton = T::type_name(),
                "singleton accessed after shutdown began, returning none"
            );
        }
        SingletonError::PostShutdownAccess {
            type_name: T::type_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::object::ObjectId;

    /// Host with a fixed object list and a recorded call log.
    #[derive(Default)]
    struct ScriptedHost {
        existing: Vec<Instance<Marker>>,
        refuse_creation: bool,
        torn_down: Vec<ObjectId>,
        persisted: Mutex<Vec<ObjectId>>,
        destroyed: Mutex<Vec<ObjectId>>,
        created: Mutex<u32>,
    }

    impl HostControl for ScriptedHost {
        fn mark_persistent(&self, id: ObjectId) {
            self.persisted.lock().push(id);
        }

        fn destroy(&self, id: ObjectId) {
            self.destroyed.lock().push(id);
        }

        fn is_alive(&self, id: ObjectId) -> bool {
            !self.torn_down.contains(&id) && !self.destroyed.lock().contains(&id)
        }
    }

    impl Host for ScriptedHost {
        fn find_objects<U: Behaviour>(&self) -> Vec<Instance<U>> {
            self.existing
                .iter()
                .filter_map(|marker| {
                    let erased: Arc<dyn std::any::Any + Send + Sync> =
                        Arc::clone(marker.behaviour()) as Arc<dyn std::any::Any + Send + Sync>;
                    erased.downcast::<U>().ok().map(|b| Instance::new(marker.id(), b))
                })
                .collect()
        }

        fn create_object<U: Behaviour>(&self, _name: &str) -> Result<Instance<U>, HostError> {
            if self.refuse_creation {
                return Err(HostError::Rejected("scripted".into()));
            }
            let mut created = self.created.lock();
            *created += 1;
            Ok(Instance::new(ObjectId::new(100 + *created, 1), Arc::new(U::create())))
        }

        fn register_hooks<U: Behaviour>(&self, _hooks: LifecycleHooks<U>) {}
    }

    struct Marker {
        persistent: bool,
    }

    impl Behaviour for Marker {
        fn create() -> Self {
            Self { persistent: true }
        }

        fn persistent(&self) -> bool {
            self.persistent
        }
    }

    fn marker(index: u32, persistent: bool) -> Instance<Marker> {
        Instance::new(ObjectId::new(index, 1), Arc::new(Marker { persistent }))
    }

    fn slot() -> SingletonSlot<Marker> {
        SingletonSlot::new(Arc::new(SingletonConfig::default()))
    }

    #[test]
    fn test_creates_when_absent() {
        let host = ScriptedHost::default();
        let slot = slot();
        assert_eq!(slot.state(), SlotState::Uninitialized);

        let first = slot.get_instance(&host).unwrap();
        let again = slot.get_instance(&host).unwrap();

        assert!(first.same_object(&again));
        assert_eq!(*host.created.lock(), 1);
        assert_eq!(*host.persisted.lock(), vec![first.id()]);
        assert_eq!(slot.state(), SlotState::Active);
        assert_eq!(slot.stats().created, 1);
    }

    #[test]
    fn test_duplicates_on_lookup_return_first() {
        let host = ScriptedHost {
            existing: vec![marker(1, false), marker(2, false)],
            ..ScriptedHost::default()
        };
        let slot = slot();

        let instance = slot.get_instance(&host).unwrap();
        assert_eq!(instance.id(), ObjectId::new(1, 1));
        assert!(host.destroyed.lock().is_empty());
        assert_eq!(*host.created.lock(), 0);
        assert_eq!(slot.stats().duplicates_reported, 1);
    }

    #[test]
    fn test_claim_destroys_duplicate() {
        let host = ScriptedHost::default();
        let slot = slot();
        let a = marker(1, false);
        let b = marker(2, false);

        slot.on_claim(&host, &a);
        slot.on_claim(&host, &a);
        slot.on_claim(&host, &b);

        assert_eq!(*host.destroyed.lock(), vec![b.id()]);
        assert!(slot.peek().unwrap().same_object(&a));
        assert!(host.persisted.lock().is_empty());
        assert_eq!(slot.stats().claimed, 1);
        assert_eq!(slot.stats().duplicates_destroyed, 1);
    }

    #[test]
    fn test_release_of_bound_latches() {
        let host = ScriptedHost::default();
        let slot = slot();
        let a = marker(1, true);
        let stray = marker(2, false);
        slot.on_claim(&host, &a);

        slot.on_release(&stray);
        assert_eq!(slot.state(), SlotState::Active);

        slot.on_release(&a);
        assert_eq!(slot.state(), SlotState::ShuttingDown);
        assert!(slot.peek().is_none());
        assert_eq!(
            slot.try_get_instance(&host).unwrap_err(),
            SingletonError::PostShutdownAccess { type_name: "Marker" }
        );

        // A later construction neither binds nor gets destroyed
        let late = marker(3, false);
        slot.on_claim(&host, &late);
        assert!(slot.get_instance(&host).is_none());
        assert!(host.destroyed.lock().is_empty());
        assert_eq!(slot.stats().post_shutdown_accesses, 2);
    }

    #[test]
    fn test_host_refusal_is_not_fatal() {
        let host = ScriptedHost {
            refuse_creation: true,
            ..ScriptedHost::default()
        };
        let slot = slot();

        let err = slot.try_get_instance(&host).unwrap_err();
        assert_eq!(err, SingletonError::Host(HostError::Rejected("scripted".into())));
        assert!(slot.get_instance(&host).is_none());
        assert_eq!(slot.state(), SlotState::Uninitialized);
    }

    #[test]
    fn test_dead_candidate_is_never_bound() {
        let host = ScriptedHost {
            existing: vec![marker(1, true)],
            torn_down: vec![ObjectId::new(1, 1)],
            ..ScriptedHost::default()
        };
        let slot = slot();

        assert_eq!(
            slot.try_get_instance(&host).unwrap_err(),
            SingletonError::InstanceDestroyed { type_name: "Marker" }
        );
        assert_eq!(slot.state(), SlotState::Uninitialized);
        assert!(host.persisted.lock().is_empty());
        assert_eq!(slot.stats().discovered, 0);

        // A dead claim is ignored too
        slot.on_claim(&host, &marker(1, true));
        assert!(slot.peek().is_none());
        assert!(host.destroyed.lock().is_empty());
    }

    #[test]
    fn test_dead_created_object_is_retried() {
        let host = ScriptedHost {
            torn_down: vec![ObjectId::new(101, 1)],
            ..ScriptedHost::default()
        };
        let slot = slot();

        let instance = slot.get_instance(&host).unwrap();
        assert_eq!(instance.id(), ObjectId::new(102, 1));
        assert_eq!(*host.created.lock(), 2);
        assert_eq!(slot.state(), SlotState::Active);
    }
}
