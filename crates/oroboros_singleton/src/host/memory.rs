//! # In-Memory Host
//!
//! A self-contained object-lifecycle runtime. Objects live in a slot table
//! with generation counters, so a destroyed object's [`ObjectId`] never
//! resolves again even after its slot is reused.
//!
//! ## Hook dispatch
//!
//! No internal lock is held while a lifecycle hook runs. Hooks are free to
//! call back into the host (a claim hook destroying its own object is the
//! normal duplicate path).
//!
//! ## Example
//!
//! ```rust,ignore
//! let host = MemoryHost::new();
//! Singleton::<AudioDirector>::install(&host);
//!
//! let director = Singleton::<AudioDirector>::get_instance(&host);
//! host.transition_scene(); // non-persistent objects are destroyed
//! host.shutdown();         // everything is destroyed, latches trip
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Host, HostControl, LifecycleHooks};
use crate::behaviour::Behaviour;
use crate::error::HostError;
use crate::object::{Instance, ObjectId};

type ErasedBehaviour = Arc<dyn Any + Send + Sync>;

/// A live object in the table.
struct ObjectRecord {
    id: ObjectId,
    name: String,
    type_id: TypeId,
    behaviour: ErasedBehaviour,
    persistent: bool,
    /// Spawn order, used as discovery order.
    sequence: u64,
}

/// Slot table with free-list reuse.
#[derive(Default)]
struct ObjectTable {
    slots: Vec<Option<ObjectRecord>>,
    /// Last generation handed out per slot. Survives removal.
    generations: Vec<u32>,
    free_indices: Vec<u32>,
    live: usize,
    next_sequence: u64,
}

impl ObjectTable {
    fn insert(
        &mut self,
        name: &str,
        type_id: TypeId,
        behaviour: ErasedBehaviour,
        limit: Option<usize>,
    ) -> Result<ObjectId, HostError> {
        if let Some(capacity) = limit {
            if self.live >= capacity {
                return Err(HostError::CapacityExhausted { capacity });
            }
        }

        let index = if let Some(index) = self.free_indices.pop() {
            index
        } else {
            let index = u32::try_from(self.slots.len()).map_err(|_| {
                HostError::CapacityExhausted {
                    capacity: self.slots.len(),
                }
            })?;
            self.slots.push(None);
            self.generations.push(0);
            index
        };

        let idx = index as usize;
        // Increment generation to invalidate old references
        let generation = self.generations[idx].wrapping_add(1);
        self.generations[idx] = generation;
        let id = ObjectId::new(index, generation);

        self.slots[idx] = Some(ObjectRecord {
            id,
            name: name.to_owned(),
            type_id,
            behaviour,
            persistent: false,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
        self.live += 1;

        Ok(id)
    }

    fn get(&self, id: ObjectId) -> Option<&ObjectRecord> {
        if id.is_null() {
            return None;
        }
        self.slots
            .get(id.index() as usize)?
            .as_ref()
            .filter(|record| record.id == id)
    }

    fn get_mut(&mut self, id: ObjectId) -> Option<&mut ObjectRecord> {
        if id.is_null() {
            return None;
        }
        self.slots
            .get_mut(id.index() as usize)?
            .as_mut()
            .filter(|record| record.id == id)
    }

    fn remove(&mut self, id: ObjectId) -> Option<ObjectRecord> {
        self.get(id)?;
        let record = self.slots[id.index() as usize].take()?;
        self.free_indices.push(id.index());
        self.live -= 1;
        Some(record)
    }

    /// Live records matching `filter`, in spawn order.
    fn ids_where(&self, filter: impl Fn(&ObjectRecord) -> bool) -> Vec<ObjectId> {
        let mut matching: Vec<&ObjectRecord> =
            self.slots.iter().flatten().filter(|&record| filter(record)).collect();
        matching.sort_by_key(|record| record.sequence);
        matching.into_iter().map(|record| record.id).collect()
    }
}

/// Type-erased view of [`LifecycleHooks`] so one table can hold hooks for
/// every behaviour type.
trait ErasedHooks: Send + Sync {
    fn dispatch_claim(&self, host: &dyn HostControl, id: ObjectId, behaviour: &ErasedBehaviour);
    fn dispatch_release(&self, id: ObjectId, behaviour: &ErasedBehaviour);
}

impl<T: Behaviour> ErasedHooks for LifecycleHooks<T> {
    fn dispatch_claim(&self, host: &dyn HostControl, id: ObjectId, behaviour: &ErasedBehaviour) {
        if let Ok(typed) = Arc::clone(behaviour).downcast::<T>() {
            self.claim(host, &Instance::new(id, typed));
        }
    }

    fn dispatch_release(&self, id: ObjectId, behaviour: &ErasedBehaviour) {
        if let Ok(typed) = Arc::clone(behaviour).downcast::<T>() {
            self.release(&Instance::new(id, typed));
        }
    }
}

/// In-memory object-lifecycle runtime.
///
/// Thread-safe: every method takes `&self`.
#[derive(Default)]
pub struct MemoryHost {
    table: RwLock<ObjectTable>,
    hooks: RwLock<HashMap<TypeId, Arc<dyn ErasedHooks>>>,
    capacity_limit: Option<usize>,
}

impl MemoryHost {
    /// Creates an empty host with no object limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty host that refuses to hold more than `capacity` live
    /// objects.
    #[must_use]
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity_limit: Some(capacity),
            ..Self::default()
        }
    }

    /// Constructs an object carrying `behaviour`, as authored content would
    /// be. The claim hook for `T` fires before this returns, so the returned
    /// object may already be destroyed if it was a duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::CapacityExhausted`] if the host is full.
    pub fn spawn<T: Behaviour>(&self, name: &str, behaviour: T) -> Result<Instance<T>, HostError> {
        let behaviour = Arc::new(behaviour);
        let erased: ErasedBehaviour = Arc::clone(&behaviour) as ErasedBehaviour;
        let id = self.table.write().insert(
            name,
            TypeId::of::<T>(),
            Arc::clone(&erased),
            self.capacity_limit,
        )?;

        if let Some(hooks) = self.hooks_for(TypeId::of::<T>()) {
            hooks.dispatch_claim(self, id, &erased);
        }

        Ok(Instance::new(id, behaviour))
    }

    /// Returns `true` if the object is alive and marked persistent.
    #[must_use]
    pub fn is_persistent(&self, id: ObjectId) -> bool {
        self.table.read().get(id).is_some_and(|record| record.persistent)
    }

    /// Diagnostic name of a live object.
    #[must_use]
    pub fn name_of(&self, id: ObjectId) -> Option<String> {
        self.table.read().get(id).map(|record| record.name.clone())
    }

    /// Number of live objects of every type.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.table.read().live
    }

    /// Destroys every object not marked persistent, oldest first.
    ///
    /// Returns the number of objects destroyed.
    pub fn transition_scene(&self) -> usize {
        let doomed = self.table.read().ids_where(|record| !record.persistent);
        self.destroy_all(&doomed)
    }

    /// Destroys every object, persistent or not (application quit).
    ///
    /// Returns the number of objects destroyed.
    pub fn shutdown(&self) -> usize {
        let doomed = self.table.read().ids_where(|_| true);
        self.destroy_all(&doomed)
    }

    fn destroy_all(&self, ids: &[ObjectId]) -> usize {
        ids.iter().filter(|&&id| self.destroy_object(id)).count()
    }

    /// Removes the object, then fires its release hook.
    fn destroy_object(&self, id: ObjectId) -> bool {
        let Some(record) = self.table.write().remove(id) else {
            return false;
        };
        if let Some(hooks) = self.hooks_for(record.type_id) {
            hooks.dispatch_release(id, &record.behaviour);
        }
        true
    }

    fn hooks_for(&self, type_id: TypeId) -> Option<Arc<dyn ErasedHooks>> {
        self.hooks.read().get(&type_id).cloned()
    }
}

impl HostControl for MemoryHost {
    fn mark_persistent(&self, id: ObjectId) {
        if let Some(record) = self.table.write().get_mut(id) {
            record.persistent = true;
        }
    }

    fn destroy(&self, id: ObjectId) {
        self.destroy_object(id);
    }

    fn is_alive(&self, id: ObjectId) -> bool {
        self.table.read().get(id).is_some()
    }
}

impl Host for MemoryHost {
    fn find_objects<T: Behaviour>(&self) -> Vec<Instance<T>> {
        let table = self.table.read();
        let type_id = TypeId::of::<T>();
        table
            .ids_where(|record| record.type_id == type_id)
            .into_iter()
            .filter_map(|id| {
                let record = table.get(id)?;
                let typed = Arc::clone(&record.behaviour).downcast::<T>().ok()?;
                Some(Instance::new(id, typed))
            })
            .collect()
    }

    fn create_object<T: Behaviour>(&self, name: &str) -> Result<Instance<T>, HostError> {
        self.spawn(name, T::create())
    }

    fn register_hooks<T: Behaviour>(&self, hooks: LifecycleHooks<T>) {
        self.hooks.write().insert(TypeId::of::<T>(), Arc::new(hooks));
    }
}
