//! Object identity, lifecycle state and capability traits
//!
//! Objects are generic over an environment type `E`: whatever the owning
//! application hands down each frame (services, settings, level state).
//! Leaf objects implement [`Lifecycle`] and [`Simulated`]; objects that own
//! a registry of children implement [`Lifecycle`] and [`Container`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::registry::{ObjectRegistry, Rejected};
use super::{ObjectError, RegistryError};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique object identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Allocate a fresh identity
    pub fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// Lifecycle stage of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectState {
    /// Allocated, defaults not yet applied
    Uninitialized,
    /// Defaults applied
    Initialized,
    /// Shared resources acquired
    Created,
    /// Held by a registry
    Active,
    /// Releasing resources
    Destroying,
    /// Gone
    Destroyed,
}

impl ObjectState {
    /// Move to `to`, rejecting steps the lifecycle does not allow
    ///
    /// Re-initialising an initialised object is accepted.
    pub fn transition(&mut self, to: Self) -> Result<(), ObjectError> {
        use ObjectState::{Active, Created, Destroyed, Destroying, Initialized, Uninitialized};
        let allowed = matches!(
            (*self, to),
            (Uninitialized | Initialized, Initialized)
                | (Initialized, Created)
                | (Created, Active)
                | (Active, Created)
                | (Uninitialized | Initialized | Created | Active, Destroying)
                | (Destroying, Destroyed)
        );
        if !allowed {
            return Err(ObjectError::InvalidTransition { from: *self, to });
        }
        *self = to;
        Ok(())
    }
}

/// Whether an object stays registered after its update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectStatus {
    /// Keep it
    Alive,
    /// Remove it from its registry and destroy it
    Expired,
}

/// Identity shared by everything a registry can hold
pub trait Identity {
    /// Kind tag
    type Kind: Copy + fmt::Debug;

    /// Object identity
    fn id(&self) -> ObjectId;

    /// Kind tag
    fn kind(&self) -> Self::Kind;

    /// Told when a registry takes or gives up ownership
    fn set_registered(&mut self, _registered: bool) {}
}

/// Lifecycle hooks
pub trait Lifecycle<E>: Identity {
    /// Apply default field values; must not touch shared resources
    fn initialise(&mut self);

    /// Acquire shared resources
    fn create(&mut self, env: &mut E) -> Result<(), ObjectError>;

    /// Release shared resources and consume the object
    fn destroy(self, env: &mut E)
    where
        Self: Sized;

    /// React to this frame's input
    fn handle_input(&mut self, _env: &mut E) {}
}

/// Per-frame simulation for registry members
pub trait Simulated<E>: Lifecycle<E> + Sized {
    /// Advance one frame
    ///
    /// The object is checked out of its slot while this runs, so `siblings`
    /// holds every other member and may be scanned, grown or shrunk freely.
    fn update(&mut self, siblings: &mut ObjectRegistry<Self>, env: &mut E) -> ObjectStatus;

    /// Draw the object
    fn render(&self, env: &mut E);
}

/// Objects owning a registry of children
///
/// The frame hooks are left to the implementor because a container usually
/// hands its children a narrower environment than it receives.
pub trait Container<E> {
    /// Child type
    type Child: Identity;

    /// Owned children
    fn children(&self) -> &ObjectRegistry<Self::Child>;

    /// Owned children
    fn children_mut(&mut self) -> &mut ObjectRegistry<Self::Child>;

    /// Advance the container and its children one frame
    fn update(&mut self, env: &mut E);

    /// Draw the container and its children
    fn render(&self, env: &mut E);

    /// Dispatch this frame's input to the container and its children
    fn handle_input(&mut self, env: &mut E);

    /// Take ownership of a child
    fn register_child(&mut self, child: Self::Child) -> Result<ObjectId, Rejected<Self::Child>> {
        self.children_mut().register(child)
    }

    /// Give ownership of a child back to the caller
    fn unregister_child(&mut self, id: ObjectId) -> Result<Self::Child, RegistryError> {
        self.children_mut().unregister(id)
    }

    /// Unregister and destroy a child
    fn destroy_child(&mut self, id: ObjectId, env: &mut E) -> Result<(), RegistryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = ObjectId::next();
        let b = ObjectId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn test_lifecycle_order() {
        let mut state = ObjectState::Uninitialized;
        state.transition(ObjectState::Initialized).unwrap();
        state.transition(ObjectState::Initialized).unwrap();
        state.transition(ObjectState::Created).unwrap();
        state.transition(ObjectState::Active).unwrap();
        state.transition(ObjectState::Created).unwrap();
        state.transition(ObjectState::Destroying).unwrap();
        state.transition(ObjectState::Destroyed).unwrap();
    }

    #[test]
    fn test_create_before_initialise_is_rejected() {
        let mut state = ObjectState::Uninitialized;
        let err = state.transition(ObjectState::Created).unwrap_err();
        assert!(matches!(
            err,
            ObjectError::InvalidTransition {
                from: ObjectState::Uninitialized,
                to: ObjectState::Created
            }
        ));
        assert_eq!(state, ObjectState::Uninitialized);

        let mut state = ObjectState::Destroyed;
        assert!(state.transition(ObjectState::Destroying).is_err());
    }
}
