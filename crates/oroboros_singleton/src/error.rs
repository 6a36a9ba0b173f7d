//! # Singleton Error Types
//!
//! Nothing here is fatal. [`SingletonError::DuplicateInstanceDetected`] is only
//! ever reported through the log; the accessor still returns an instance.
//! The other variants surface from `try_get_instance` and collapse to `None`
//! in `get_instance`.

use thiserror::Error;

/// Failures reported by the host runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host object table is full.
    #[error("host object table full: capacity {capacity}")]
    CapacityExhausted {
        /// Maximum number of live objects.
        capacity: usize,
    },

    /// The host refused the operation for another reason.
    #[error("host rejected operation: {0}")]
    Rejected(String),
}

/// Errors that can occur around the singleton accessor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SingletonError {
    /// More than one live object of the type was found during lookup.
    #[error("{count} live instances of singleton {type_name} found, expected at most one")]
    DuplicateInstanceDetected {
        /// Behaviour type name.
        type_name: &'static str,
        /// Number of live objects found.
        count: usize,
    },

    /// The accessor was used after the bound instance was released.
    #[error("singleton {type_name} accessed after shutdown began")]
    PostShutdownAccess {
        /// Behaviour type name.
        type_name: &'static str,
    },

    /// Every candidate was torn down before the accessor could bind it.
    #[error("singleton {type_name} destroyed before it could be bound")]
    InstanceDestroyed {
        /// Behaviour type name.
        type_name: &'static str,
    },

    /// The host failed to create the instance.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for singleton operations.
pub type SingletonResult<T> = Result<T, SingletonError>;
