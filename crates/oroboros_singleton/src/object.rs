//! # Host Object Identity
//!
//! Hosts hand out [`ObjectId`] handles. A handle names a table position and
//! the lifetime of the object that occupied it when the handle was issued;
//! once that object is gone the handle stops resolving, even if the position
//! is filled again.
//!
//! An [`Instance`] pairs a handle with the behaviour attached to the object.

use std::fmt;
use std::sync::Arc;

/// Handle to a host-managed object.
///
/// Equality compares both the table position and the lifetime stamp, so a
/// handle kept past its object's destruction never matches the newcomer
/// that reuses the position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    /// Handle for the object at `index` during lifetime `generation`.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Table position.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Lifetime stamp. Hosts bump it each time a position is reused.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Handle that never names an object.
    pub const NULL: Self = Self::new(u32::MAX, u32::MAX);

    /// Returns `true` for [`ObjectId::NULL`].
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.index == u32::MAX && self.generation == u32::MAX
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("#null")
        } else {
            write!(f, "#{}v{}", self.index(), self.generation())
        }
    }
}

/// A live host object carrying a behaviour of type `T`.
///
/// Cloning is cheap: the behaviour is shared, not copied. Two instances
/// refer to the same object exactly when their [`ObjectId`]s are equal.
pub struct Instance<T> {
    id: ObjectId,
    behaviour: Arc<T>,
}

impl<T> Instance<T> {
    /// Wraps an already-attached behaviour.
    #[inline]
    #[must_use]
    pub fn new(id: ObjectId, behaviour: Arc<T>) -> Self {
        Self { id, behaviour }
    }

    /// The host identity of this object.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Shared handle to the attached behaviour.
    #[inline]
    #[must_use]
    pub fn behaviour(&self) -> &Arc<T> {
        &self.behaviour
    }

    /// Returns `true` if both instances are the same host object.
    #[inline]
    #[must_use]
    pub fn same_object(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Clone for Instance<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            behaviour: Arc::clone(&self.behaviour),
        }
    }
}

impl<T> std::ops::Deref for Instance<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.behaviour
    }
}

impl<T> fmt::Debug for Instance<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance").field("id", &self.id).finish_non_exhaustive()
    }
}
