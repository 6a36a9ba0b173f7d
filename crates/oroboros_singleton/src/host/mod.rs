//! # Host Runtime Interface
//!
//! The host owns object lifetimes: it creates objects, destroys them, moves
//! them across scene transitions and calls the lifecycle hooks. The singleton
//! accessor only talks to it through these traits.
//!
//! ```text
//!   Accessor ──find_objects / create_object──▶ Host
//!   Accessor ◀──────── on_claim / on_release ── Host (registered hooks)
//! ```
//!
//! [`MemoryHost`] is an in-process implementation used by tests, benchmarks
//! and tools that run without an engine.

pub mod memory;

pub use memory::MemoryHost;

use crate::behaviour::Behaviour;
use crate::error::HostError;
use crate::object::{Instance, ObjectId};

/// Host operations that are safe to call from inside a lifecycle hook.
pub trait HostControl: Send + Sync {
    /// Marks the object to survive scene transitions.
    fn mark_persistent(&self, id: ObjectId);

    /// Destroys the object. Its release hook fires. Unknown or stale IDs are
    /// ignored.
    fn destroy(&self, id: ObjectId);

    /// Returns `true` while the object exists. A destroyed object must read
    /// as dead before its release hook fires.
    fn is_alive(&self, id: ObjectId) -> bool;
}

/// Object-lifecycle runtime consumed by the singleton accessor.
pub trait Host: HostControl {
    /// Every live object carrying a `T`, in discovery order.
    ///
    /// Cost is O(live objects); the accessor only calls this on a slot miss.
    fn find_objects<T: Behaviour>(&self) -> Vec<Instance<T>>;

    /// Creates a named object, attaches `T::create()` to it, and fires the
    /// claim hook for `T` if one is registered.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the host cannot create another object.
    fn create_object<T: Behaviour>(&self, name: &str) -> Result<Instance<T>, HostError>;

    /// Registers the hooks fired for objects of type `T`, replacing any
    /// previously registered for `T`.
    fn register_hooks<T: Behaviour>(&self, hooks: LifecycleHooks<T>);
}

/// Callback fired when an object carrying `T` is constructed.
pub type ClaimHook<T> = Box<dyn Fn(&dyn HostControl, &Instance<T>) + Send + Sync>;

/// Callback fired when an object carrying `T` is torn down.
pub type ReleaseHook<T> = Box<dyn Fn(&Instance<T>) + Send + Sync>;

/// The pair of callbacks a host invokes for one behaviour type.
pub struct LifecycleHooks<T> {
    on_claim: ClaimHook<T>,
    on_release: ReleaseHook<T>,
}

impl<T> LifecycleHooks<T> {
    /// Bundles a claim and a release callback.
    #[must_use]
    pub fn new(on_claim: ClaimHook<T>, on_release: ReleaseHook<T>) -> Self {
        Self {
            on_claim,
            on_release,
        }
    }

    /// Fires the claim callback. Hosts call this once the object is attached
    /// and before it is first used.
    pub fn claim(&self, host: &dyn HostControl, instance: &Instance<T>) {
        (self.on_claim)(host, instance);
    }

    /// Fires the release callback. Hosts call this when the object is
    /// destroyed.
    pub fn release(&self, instance: &Instance<T>) {
        (self.on_release)(instance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        destroyed: Mutex<Vec<ObjectId>>,
    }

    impl HostControl for Recorder {
        fn mark_persistent(&self, _id: ObjectId) {}

        fn destroy(&self, id: ObjectId) {
            self.destroyed.lock().push(id);
        }

        fn is_alive(&self, id: ObjectId) -> bool {
            !self.destroyed.lock().contains(&id)
        }
    }

    #[test]
    fn test_hooks_forward_to_callbacks() {
        let released = Arc::new(Mutex::new(Vec::new()));
        let released_in_hook = Arc::clone(&released);

        let hooks: LifecycleHooks<u8> = LifecycleHooks::new(
            Box::new(|host: &dyn HostControl, instance: &Instance<u8>| host.destroy(instance.id())),
            Box::new(move |instance: &Instance<u8>| released_in_hook.lock().push(instance.id())),
        );

        let recorder = Recorder::default();
        let instance = Instance::new(ObjectId::new(4, 1), Arc::new(0_u8));
        hooks.claim(&recorder, &instance);
        hooks.release(&instance);

        assert_eq!(*recorder.destroyed.lock(), vec![ObjectId::new(4, 1)]);
        assert_eq!(*released.lock(), vec![ObjectId::new(4, 1)]);
    }
}
