//! Game objects and their owners
//!
//! ```text
//! Container (context)
//!      └── ObjectRegistry<Child>
//!             └── Child: Lifecycle + Simulated
//! ```
//!
//! A registry owns its objects outright: registering moves an object in,
//! unregistering hands it back, and destroying consumes it after its shared
//! resource references are released.

mod object;
mod registry;

use thiserror::Error;

use crate::assets::pool::ResourceError;
use crate::assets::AssetError;

pub use object::{Container, Identity, Lifecycle, ObjectId, ObjectState, ObjectStatus, Simulated};
pub use registry::{ObjectRegistry, Rejected, REGISTRY_GROWTH};

/// Registry errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The object is already held by this registry
    #[error("{0} is already registered")]
    AlreadyRegistered(ObjectId),

    /// No live object with this identity
    #[error("{0} is not registered")]
    NotFound(ObjectId),

    /// Growing the slot array failed
    #[error("Out of memory growing object registry to {requested} slots")]
    OutOfMemory {
        /// Slot count that could not be allocated
        requested: usize,
    },
}

/// Object lifecycle errors
#[derive(Debug, Error)]
pub enum ObjectError {
    /// Shared resource bookkeeping failed
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Loading a shared asset failed
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Registering a child failed
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Lifecycle step out of order
    #[error("Invalid lifecycle transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// State before the attempt
        from: ObjectState,
        /// Requested state
        to: ObjectState,
    },
}
