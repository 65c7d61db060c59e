//! Growable slot array of owned objects
//!
//! Slots are reused before the array grows, and it grows in chunks of
//! [`REGISTRY_GROWTH`] that are never given back. Frame passes run in slot
//! order over the slot count seen on entry; an object being updated is
//! checked out of its slot so anything registered during the pass lands
//! elsewhere.

use std::fmt;

use super::object::{Identity, Lifecycle, ObjectId, ObjectStatus, Simulated};
use super::RegistryError;

/// Slots added each time the registry runs out
pub const REGISTRY_GROWTH: usize = 32;

#[derive(Debug)]
enum Slot<O> {
    Free,
    Live(O),
    CheckedOut(ObjectId),
}

/// Object handed back by a failed [`ObjectRegistry::register`]
pub struct Rejected<O> {
    /// Why registration failed
    pub error: RegistryError,
    /// The object, still owned by the caller
    pub object: O,
}

impl<O> Rejected<O> {
    /// Take the object back
    pub fn into_inner(self) -> O {
        self.object
    }
}

impl<O> fmt::Debug for Rejected<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected").field("error", &self.error).finish_non_exhaustive()
    }
}

/// Owner of a set of objects
#[derive(Debug)]
pub struct ObjectRegistry<O> {
    slots: Vec<Slot<O>>,
    live: usize,
}

impl<O> Default for ObjectRegistry<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> ObjectRegistry<O> {
    /// Empty registry without slots
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
        }
    }

    /// Registered objects, including one checked out for update
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Whether nothing is registered
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Slots allocated
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Live objects in slot order
    pub fn iter(&self) -> impl Iterator<Item = &O> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Live(object) => Some(object),
            _ => None,
        })
    }

    /// Live objects in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut O> + '_ {
        self.slots.iter_mut().filter_map(|slot| match slot {
            Slot::Live(object) => Some(object),
            _ => None,
        })
    }

    fn grow(&mut self) -> Result<(), RegistryError> {
        let requested = self.slots.len() + REGISTRY_GROWTH;
        self.slots
            .try_reserve_exact(REGISTRY_GROWTH)
            .map_err(|_| RegistryError::OutOfMemory { requested })?;
        self.slots.extend(std::iter::repeat_with(|| Slot::Free).take(REGISTRY_GROWTH));
        log::debug!("Object registry grew to {requested} slots");
        Ok(())
    }
}

impl<O: Identity> ObjectRegistry<O> {
    fn position(&self, id: ObjectId) -> Option<usize> {
        self.slots.iter().position(|slot| match slot {
            Slot::Live(object) => object.id() == id,
            Slot::CheckedOut(checked_out) => *checked_out == id,
            Slot::Free => false,
        })
    }

    fn live_position(&self, id: ObjectId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Slot::Live(object) if object.id() == id))
    }

    /// Whether `id` is registered here
    pub fn contains(&self, id: ObjectId) -> bool {
        self.position(id).is_some()
    }

    /// Borrow a live object
    pub fn get(&self, id: ObjectId) -> Option<&O> {
        self.iter().find(|object| object.id() == id)
    }

    /// Borrow a live object
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut O> {
        self.iter_mut().find(|object| object.id() == id)
    }

    /// Take ownership of `object` in the first free slot
    pub fn register(&mut self, mut object: O) -> Result<ObjectId, Rejected<O>> {
        let id = object.id();
        if self.contains(id) {
            log::trace!("{id} is already registered");
            return Err(Rejected {
                error: RegistryError::AlreadyRegistered(id),
                object,
            });
        }

        let index = match self.slots.iter().position(|slot| matches!(slot, Slot::Free)) {
            Some(index) => index,
            None => {
                let index = self.slots.len();
                if let Err(error) = self.grow() {
                    return Err(Rejected { error, object });
                }
                index
            }
        };

        object.set_registered(true);
        self.slots[index] = Slot::Live(object);
        self.live += 1;
        Ok(id)
    }

    /// Remove `id` without destroying it, handing ownership back
    pub fn unregister(&mut self, id: ObjectId) -> Result<O, RegistryError> {
        let index = self.live_position(id).ok_or_else(|| {
            log::trace!("{id} is not registered");
            RegistryError::NotFound(id)
        })?;
        match std::mem::replace(&mut self.slots[index], Slot::Free) {
            Slot::Live(mut object) => {
                self.live -= 1;
                object.set_registered(false);
                Ok(object)
            }
            other => {
                self.slots[index] = other;
                Err(RegistryError::NotFound(id))
            }
        }
    }

    /// Unregister and destroy `id`
    pub fn destroy_object<E>(&mut self, id: ObjectId, env: &mut E) -> Result<(), RegistryError>
    where
        O: Lifecycle<E>,
    {
        self.unregister(id)?.destroy(env);
        Ok(())
    }

    /// Put `replacement` in the slot held by `id`
    ///
    /// The old object is destroyed before its slot is overwritten.
    pub fn replace_object<E>(&mut self, id: ObjectId, replacement: O, env: &mut E) -> Result<ObjectId, Rejected<O>>
    where
        O: Lifecycle<E>,
    {
        let new_id = replacement.id();
        if new_id != id && self.contains(new_id) {
            return Err(Rejected {
                error: RegistryError::AlreadyRegistered(new_id),
                object: replacement,
            });
        }
        let Some(index) = self.live_position(id) else {
            return Err(Rejected {
                error: RegistryError::NotFound(id),
                object: replacement,
            });
        };
        if let Slot::Live(mut old) = std::mem::replace(&mut self.slots[index], Slot::Free) {
            old.set_registered(false);
            old.destroy(env);
        }
        let mut replacement = replacement;
        replacement.set_registered(true);
        self.slots[index] = Slot::Live(replacement);
        Ok(new_id)
    }

    /// Dispatch input to every live object in slot order
    pub fn handle_input<E>(&mut self, env: &mut E)
    where
        O: Lifecycle<E>,
    {
        for object in self.iter_mut() {
            object.handle_input(env);
        }
    }

    /// Destroy every live object in slot order
    pub fn destroy_all<E>(&mut self, env: &mut E)
    where
        O: Lifecycle<E>,
    {
        for index in 0..self.slots.len() {
            if let Slot::Live(mut object) = std::mem::replace(&mut self.slots[index], Slot::Free) {
                self.live -= 1;
                object.set_registered(false);
                object.destroy(env);
            }
        }
    }

    fn check_out(&mut self, index: usize) -> Option<O> {
        let slot = self.slots.get_mut(index)?;
        match std::mem::replace(slot, Slot::Free) {
            Slot::Live(object) => {
                *slot = Slot::CheckedOut(object.id());
                Some(object)
            }
            other => {
                *slot = other;
                None
            }
        }
    }

    /// Advance every live object one frame
    ///
    /// Objects that report [`ObjectStatus::Expired`] are unregistered and
    /// destroyed straight after their update.
    pub fn update<E>(&mut self, env: &mut E)
    where
        O: Simulated<E>,
    {
        let count = self.slots.len();
        for index in 0..count {
            let Some(mut object) = self.check_out(index) else {
                continue;
            };
            match object.update(self, env) {
                ObjectStatus::Alive => self.slots[index] = Slot::Live(object),
                ObjectStatus::Expired => {
                    self.slots[index] = Slot::Free;
                    self.live -= 1;
                    object.set_registered(false);
                    object.destroy(env);
                }
            }
        }
    }

    /// Draw every live object in slot order
    pub fn render<E>(&self, env: &mut E)
    where
        O: Simulated<E>,
    {
        for object in self.iter() {
            object.render(env);
        }
    }
}

impl<O> Drop for ObjectRegistry<O> {
    fn drop(&mut self) {
        if self.live > 0 {
            log::debug!("Object registry dropped with {} objects never destroyed", self.live);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ObjectError;

    #[derive(Default)]
    struct Log {
        destroyed: Vec<ObjectId>,
        updated: Vec<ObjectId>,
    }

    #[derive(Debug)]
    struct Probe {
        id: ObjectId,
        lifetime: u32,
        spawns: u32,
        registered: bool,
    }

    impl Probe {
        fn new(lifetime: u32) -> Self {
            Self {
                id: ObjectId::next(),
                lifetime,
                spawns: 0,
                registered: false,
            }
        }
    }

    impl Identity for Probe {
        type Kind = ();

        fn id(&self) -> ObjectId {
            self.id
        }

        fn kind(&self) -> Self::Kind {}

        fn set_registered(&mut self, registered: bool) {
            self.registered = registered;
        }
    }

    impl Lifecycle<Log> for Probe {
        fn initialise(&mut self) {}

        fn create(&mut self, _env: &mut Log) -> Result<(), ObjectError> {
            Ok(())
        }

        fn destroy(self, env: &mut Log) {
            env.destroyed.push(self.id);
        }
    }

    impl Simulated<Log> for Probe {
        fn update(&mut self, siblings: &mut ObjectRegistry<Self>, env: &mut Log) -> ObjectStatus {
            env.updated.push(self.id);
            for _ in 0..self.spawns {
                siblings.register(Probe::new(10)).unwrap();
            }
            self.spawns = 0;
            self.lifetime = self.lifetime.saturating_sub(1);
            if self.lifetime == 0 {
                ObjectStatus::Expired
            } else {
                ObjectStatus::Alive
            }
        }

        fn render(&self, _env: &mut Log) {}
    }

    #[test]
    fn test_register_unregister_keeps_count() {
        let mut registry = ObjectRegistry::new();
        let id = registry.register(Probe::new(5)).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.capacity(), REGISTRY_GROWTH);

        let probe = registry.unregister(id).unwrap();
        assert!(!probe.registered);
        assert!(registry.is_empty());
        assert!(matches!(registry.unregister(id), Err(RegistryError::NotFound(_))));

        registry.register(probe).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_identity_is_rejected() {
        let mut registry = ObjectRegistry::new();
        let probe = Probe::new(5);
        let twin = Probe {
            id: probe.id,
            ..Probe::new(5)
        };
        registry.register(probe).unwrap();
        let rejected = registry.register(twin).unwrap_err();
        assert!(matches!(rejected.error, RegistryError::AlreadyRegistered(_)));
        assert!(!rejected.into_inner().registered);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_free_slots_are_reused_before_growing() {
        let mut registry = ObjectRegistry::new();
        let ids: Vec<_> = (0..REGISTRY_GROWTH)
            .map(|_| registry.register(Probe::new(5)).unwrap())
            .collect();
        assert_eq!(registry.capacity(), REGISTRY_GROWTH);

        registry.unregister(ids[3]).unwrap();
        registry.register(Probe::new(5)).unwrap();
        assert_eq!(registry.capacity(), REGISTRY_GROWTH);

        registry.register(Probe::new(5)).unwrap();
        assert_eq!(registry.capacity(), 2 * REGISTRY_GROWTH);
    }

    #[test]
    fn test_expired_objects_are_destroyed() {
        let mut registry = ObjectRegistry::new();
        let short = registry.register(Probe::new(1)).unwrap();
        let long = registry.register(Probe::new(3)).unwrap();
        let mut log = Log::default();

        registry.update(&mut log);
        assert_eq!(log.destroyed, vec![short]);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(long));
    }

    #[test]
    fn test_spawns_never_overwrite_the_updating_object() {
        let mut registry = ObjectRegistry::new();
        let mut spawner = Probe::new(5);
        spawner.spawns = 2;
        let spawner_id = registry.register(spawner).unwrap();
        let mut log = Log::default();

        registry.update(&mut log);
        assert!(registry.contains(spawner_id));
        assert_eq!(registry.len(), 3);
        // spawned into later free slots, so visited in the same pass
        assert_eq!(log.updated.len(), 3);
    }

    #[test]
    fn test_slots_added_by_growth_wait_for_next_pass() {
        let mut registry = ObjectRegistry::new();
        for _ in 0..REGISTRY_GROWTH - 1 {
            registry.register(Probe::new(5)).unwrap();
        }
        let mut spawner = Probe::new(5);
        spawner.spawns = 2;
        registry.register(spawner).unwrap();
        let mut log = Log::default();

        registry.update(&mut log);
        assert_eq!(registry.capacity(), 2 * REGISTRY_GROWTH);
        assert_eq!(log.updated.len(), REGISTRY_GROWTH);

        log.updated.clear();
        registry.update(&mut log);
        assert_eq!(log.updated.len(), REGISTRY_GROWTH + 2);
    }

    #[test]
    fn test_replace_destroys_old_object_first() {
        let mut registry = ObjectRegistry::new();
        let old = registry.register(Probe::new(5)).unwrap();
        let mut log = Log::default();

        let new = registry.replace_object(old, Probe::new(5), &mut log).unwrap();
        assert_eq!(log.destroyed, vec![old]);
        assert!(registry.contains(new));
        assert!(!registry.contains(old));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(new).unwrap().registered);

        let missing = registry.replace_object(old, Probe::new(5), &mut log).unwrap_err();
        assert!(matches!(missing.error, RegistryError::NotFound(_)));
    }

    #[test]
    fn test_destroy_all() {
        let mut registry = ObjectRegistry::new();
        let ids: Vec<_> = (0..3).map(|_| registry.register(Probe::new(5)).unwrap()).collect();
        let mut log = Log::default();

        registry.destroy_object(ids[1], &mut log).unwrap();
        registry.destroy_all(&mut log);
        assert_eq!(log.destroyed, vec![ids[1], ids[0], ids[2]]);
        assert!(registry.is_empty());
        assert_eq!(registry.capacity(), REGISTRY_GROWTH);
    }
}
