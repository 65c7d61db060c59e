//! Reference-counted, named resource pool
//!
//! Resources live in a generation-checked arena with their reference count
//! stored alongside. The pool additionally keeps an unordered array of named
//! slots used for lookup by name.
//!
//! Ownership rules:
//! - [`ResourcePool::create`] hands the caller one reference (count 1).
//! - [`ResourcePool::add`] moves that reference into a named slot. It does not
//!   increment the count.
//! - [`ResourcePool::find_by_name`] is a plain lookup. Holders that keep the
//!   handle must call [`ResourcePool::add_ref`] (or use
//!   [`ResourcePool::acquire`]) and later [`ResourcePool::release_ref`].
//! - [`ResourcePool::release`] clears the resource's slot and drops the
//!   reference the slot was holding.
//!
//! A resource is destroyed on the release that takes its count to zero. Its
//! payload is moved to a retired list so the owner of the underlying device
//! handles can free them; see [`ResourcePool::take_retired`]. Any later use of
//! the handle reports [`ResourceError::Stale`].

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

new_key_type! {
    /// Generation-checked handle to a pooled resource
    pub struct ResourceHandle;
}

/// Slots are added in chunks of this size
pub const POOL_GROWTH: usize = 32;

/// Behaviour every pooled payload provides
pub trait Resource {
    /// Other pooled resources this one holds a reference to
    ///
    /// Each listed handle has one reference dropped when this resource is
    /// destroyed.
    fn dependencies(&self) -> Vec<ResourceHandle> {
        Vec::new()
    }
}

/// Resource pool errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// Growing the slot array failed
    #[error("Out of memory growing resource pool by {requested} slots")]
    OutOfMemory {
        /// Number of slots requested
        requested: usize,
    },

    /// The handle refers to a resource that has already been destroyed
    #[error("Resource handle {0:?} refers to a destroyed resource")]
    Stale(ResourceHandle),

    /// The resource is already registered under a name
    #[error("Resource is already registered as '{0}'")]
    AlreadyNamed(String),
}

/// Payload of a destroyed resource awaiting device teardown
#[derive(Debug)]
pub struct Retired<T> {
    /// Name the resource was registered under, if any
    pub name: Option<String>,
    /// The destroyed payload
    pub payload: T,
}

#[derive(Debug)]
struct Entry<T> {
    name: Option<String>,
    refs: u32,
    payload: T,
}

/// Named, reference-counted resource cache
#[derive(Debug)]
pub struct ResourcePool<T> {
    arena: SlotMap<ResourceHandle, Entry<T>>,
    slots: Vec<Option<ResourceHandle>>,
    retired: Vec<Retired<T>>,
}

impl<T: Resource> Default for ResourcePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource> ResourcePool<T> {
    /// Create an empty pool with no slots
    pub fn new() -> Self {
        Self {
            arena: SlotMap::with_key(),
            slots: Vec::new(),
            retired: Vec::new(),
        }
    }

    // ========================================================================
    // Creation and registration
    // ========================================================================

    /// Allocate a new resource holding one reference for the caller
    ///
    /// The resource is not reachable by name until [`Self::add`] is called.
    pub fn create(&mut self, payload: T) -> ResourceHandle {
        self.arena.insert(Entry {
            name: None,
            refs: 1,
            payload,
        })
    }

    /// Register a resource under `name` in the first free slot
    ///
    /// The caller's reference moves into the slot; the count is unchanged.
    /// Reuses cleared slots before growing. Nothing is modified on failure.
    pub fn add(&mut self, handle: ResourceHandle, name: &str) -> Result<(), ResourceError> {
        let entry = self.arena.get(handle).ok_or(ResourceError::Stale(handle))?;
        if let Some(existing) = &entry.name {
            return Err(ResourceError::AlreadyNamed(existing.clone()));
        }

        let index = match self.slots.iter().position(Option::is_none) {
            Some(index) => index,
            None => {
                let index = self.slots.len();
                self.expand(POOL_GROWTH)?;
                index
            }
        };

        self.slots[index] = Some(handle);
        if let Some(entry) = self.arena.get_mut(handle) {
            entry.name = Some(name.to_owned());
        }
        log::debug!("Registered resource '{name}' in slot {index}");
        Ok(())
    }

    /// First registered resource whose name equals `name`
    ///
    /// Does not add a reference.
    pub fn find_by_name(&self, name: &str) -> Option<ResourceHandle> {
        if name.is_empty() {
            return None;
        }
        self.slots
            .iter()
            .flatten()
            .copied()
            .find(|handle| self.name(*handle) == Some(name))
    }

    /// Find by name and take a reference on the result
    pub fn acquire(&mut self, name: &str) -> Option<ResourceHandle> {
        let handle = self.find_by_name(name)?;
        self.add_ref(handle).ok()?;
        Some(handle)
    }

    /// Clear the resource's slot and drop the reference the slot held
    ///
    /// No-op when the resource is not registered in this pool.
    pub fn release(&mut self, handle: ResourceHandle) {
        let Some(index) = self.slots.iter().position(|slot| *slot == Some(handle)) else {
            return;
        };
        self.slots[index] = None;
        if let Err(err) = self.release_ref(handle) {
            log::warn!("Pool slot {index} held a dead resource: {err}");
        }
    }

    /// Release every registered resource (pool teardown)
    pub fn clear(&mut self) {
        let registered: Vec<ResourceHandle> = self.slots.iter().flatten().copied().collect();
        for handle in registered {
            self.release(handle);
        }
    }

    // ========================================================================
    // Reference counting
    // ========================================================================

    /// Add a reference, returning the new count
    pub fn add_ref(&mut self, handle: ResourceHandle) -> Result<u32, ResourceError> {
        let entry = self.arena.get_mut(handle).ok_or(ResourceError::Stale(handle))?;
        entry.refs = entry.refs.saturating_add(1);
        Ok(entry.refs)
    }

    /// Drop a reference, returning the new count
    ///
    /// At zero the resource is destroyed: its slot is cleared, its
    /// dependencies are released and the payload is retired.
    pub fn release_ref(&mut self, handle: ResourceHandle) -> Result<u32, ResourceError> {
        let entry = self.arena.get_mut(handle).ok_or(ResourceError::Stale(handle))?;
        entry.refs -= 1;
        if entry.refs > 0 {
            return Ok(entry.refs);
        }
        self.destroy(handle);
        Ok(0)
    }

    fn destroy(&mut self, handle: ResourceHandle) {
        let mut pending = vec![handle];
        while let Some(handle) = pending.pop() {
            let Some(entry) = self.arena.remove(handle) else {
                continue;
            };
            for slot in &mut self.slots {
                if *slot == Some(handle) {
                    *slot = None;
                }
            }

            for dependency in entry.payload.dependencies() {
                if let Some(dep) = self.arena.get_mut(dependency) {
                    dep.refs -= 1;
                    if dep.refs == 0 {
                        pending.push(dependency);
                    }
                }
            }

            log::debug!("Destroyed resource '{}'", entry.name.as_deref().unwrap_or("<unnamed>"));
            self.retired.push(Retired {
                name: entry.name,
                payload: entry.payload,
            });
        }
    }

    // ========================================================================
    // Capacity
    // ========================================================================

    /// Grow the slot array by `by` empty slots
    pub fn expand(&mut self, by: usize) -> Result<(), ResourceError> {
        self.slots
            .try_reserve_exact(by)
            .map_err(|_| ResourceError::OutOfMemory { requested: by })?;
        self.slots.resize(self.slots.len() + by, None);
        log::trace!("Resource pool grown to {} slots", self.slots.len());
        Ok(())
    }

    /// Grow the slot array to at least `new_size` slots; never shrinks
    pub fn resize(&mut self, new_size: usize) -> Result<(), ResourceError> {
        if new_size > self.slots.len() {
            self.expand(new_size - self.slots.len())
        } else {
            Ok(())
        }
    }

    /// Number of slots, free or not
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Whether no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Whether the handle refers to a live resource
    pub fn contains(&self, handle: ResourceHandle) -> bool {
        self.arena.contains_key(handle)
    }

    /// Current reference count of a live resource
    pub fn ref_count(&self, handle: ResourceHandle) -> Option<u32> {
        self.arena.get(handle).map(|entry| entry.refs)
    }

    /// Registered name of a live resource
    pub fn name(&self, handle: ResourceHandle) -> Option<&str> {
        self.arena.get(handle)?.name.as_deref()
    }

    /// Payload of a live resource
    pub fn get(&self, handle: ResourceHandle) -> Option<&T> {
        self.arena.get(handle).map(|entry| &entry.payload)
    }

    /// Mutable payload of a live resource
    pub fn get_mut(&mut self, handle: ResourceHandle) -> Option<&mut T> {
        self.arena.get_mut(handle).map(|entry| &mut entry.payload)
    }

    /// Payload of the registered resource called `name`
    pub fn get_by_name(&self, name: &str) -> Option<&T> {
        self.get(self.find_by_name(name)?)
    }

    /// Take the payloads destroyed since the last call
    pub fn take_retired(&mut self) -> Vec<Retired<T>> {
        std::mem::take(&mut self.retired)
    }
}
