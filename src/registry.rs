//! Schema Registry
//!
//! Table from class identity to class map. Registration is append-only: a
//! class is registered at most once and never removed.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use std::thread::{self, ThreadId};

use tracing::{debug, warn};

use crate::class_map::{ClassMap, ClassMapInfo};
use crate::config::RegistryConfig;
use crate::error::{MappingError, Result};
use crate::reflect::{Reflect, TypeKey};
use crate::snapshot::RegistrySnapshot;

/// A registered class map, kept both erased and downcastable
struct Entry {
    info: Arc<dyn ClassMapInfo>,
    any: Arc<dyn Any + Send + Sync>,
}

/// Classes reserved by a serialized registration in progress
#[derive(Default)]
struct Pending {
    /// Reserved class and the thread configuring it
    owners: HashMap<TypeKey, ThreadId>,
    /// Class each blocked thread waits for
    waiting: HashMap<ThreadId, TypeKey>,
}

impl Pending {
    /// Whether `thread` waiting for `class_type` would end up waiting on
    /// itself
    fn closes_cycle(&self, thread: ThreadId, class_type: TypeKey) -> bool {
        let mut next = class_type;
        for _ in 0..=self.waiting.len() {
            match self.owners.get(&next) {
                Some(owner) if *owner == thread => return true,
                Some(owner) => match self.waiting.get(owner) {
                    Some(class_type) => next = *class_type,
                    None => return false,
                },
                None => return false,
            }
        }
        false
    }
}

/// Releases a reservation when registration finishes, successfully or not
struct Reservation<'a> {
    registry: &'a SchemaRegistry,
    class_type: TypeKey,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.registry.pending().owners.remove(&self.class_type);
        self.registry.released.notify_all();
    }
}

/// The class map registry
pub struct SchemaRegistry {
    /// Registered class maps by class identity
    class_maps: Mutex<HashMap<TypeKey, Entry>>,
    /// Reserve each class across configure-and-insert
    serialize_registration: bool,
    pending: Mutex<Pending>,
    released: Condvar,
}

impl SchemaRegistry {
    /// Create an empty registry with the default (insert-only) locking
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default())
    }

    /// Create an empty registry
    pub fn with_config(config: &RegistryConfig) -> Self {
        Self {
            class_maps: Mutex::new(HashMap::new()),
            serialize_registration: config.serialize_registration,
            pending: Mutex::new(Pending::default()),
            released: Condvar::new(),
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SchemaRegistry::new)
    }

    /// Register `C` without mapping any members
    pub fn register<C: Reflect + ?Sized>(&self) -> Result<Arc<ClassMap<C>>> {
        self.register_with::<C, _>(|_| Ok(()))
    }

    /// Register `C`, letting `configure` map its members first
    ///
    /// If `configure` fails nothing is registered.
    pub fn register_with<C, F>(&self, configure: F) -> Result<Arc<ClassMap<C>>>
    where
        C: Reflect + ?Sized,
        F: FnOnce(&mut ClassMap<C>) -> Result<()>,
    {
        self.register_class(None, configure)
    }

    /// Register `C` with the class map of `B` as its base
    pub fn register_derived_with<C, B, F>(&self, configure: F) -> Result<Arc<ClassMap<C>>>
    where
        C: Reflect + ?Sized,
        B: Reflect + ?Sized,
        F: FnOnce(&mut ClassMap<C>) -> Result<()>,
    {
        let base_type = TypeKey::of::<B>();
        let base = self
            .table()
            .get(&base_type)
            .map(|entry| Arc::downgrade(&entry.info))
            .ok_or_else(|| MappingError::NotRegistered(base_type.to_string()))?;

        self.register_class(Some(base), configure)
    }

    fn register_class<C, F>(
        &self,
        base: Option<Weak<dyn ClassMapInfo>>,
        configure: F,
    ) -> Result<Arc<ClassMap<C>>>
    where
        C: Reflect + ?Sized,
        F: FnOnce(&mut ClassMap<C>) -> Result<()>,
    {
        let class_type = TypeKey::of::<C>();

        let _reservation = if self.serialize_registration {
            Some(self.reserve(class_type)?)
        } else {
            None
        };

        let mut class_map = ClassMap::<C>::new(base);
        configure(&mut class_map)?;
        let class_map = Arc::new(class_map);

        {
            let mut table = self.table();
            if table.contains_key(&class_type) {
                return Err(duplicate(class_type));
            }
            table.insert(
                class_type,
                Entry {
                    info: class_map.clone(),
                    any: class_map.clone(),
                },
            );
        }

        debug!(
            class = class_type.name(),
            members = class_map.declared_member_maps().len(),
            "registered class map"
        );
        Ok(class_map)
    }

    /// Reserve `class_type` for the current thread
    ///
    /// Waits while another thread holds the reservation, then fails if that
    /// thread registered the class. Fails instead of waiting when the wait
    /// would never end.
    fn reserve(&self, class_type: TypeKey) -> Result<Reservation<'_>> {
        let current = thread::current().id();
        let mut pending = self.pending();

        while pending.owners.contains_key(&class_type) {
            if pending.closes_cycle(current, class_type) {
                pending.waiting.remove(&current);
                warn!(class = class_type.name(), "registration waits on itself");
                return Err(MappingError::RegistrationCycle(class_type.to_string()));
            }
            pending.waiting.insert(current, class_type);
            pending = self
                .released
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
        pending.waiting.remove(&current);

        if self.table().contains_key(&class_type) {
            return Err(duplicate(class_type));
        }
        pending.owners.insert(class_type, current);

        Ok(Reservation {
            registry: self,
            class_type,
        })
    }

    /// Whether a class map is registered for `class_type`
    pub fn is_class_map_registered(&self, class_type: Option<TypeKey>) -> Result<bool> {
        let class_type = class_type.ok_or(MappingError::NullArgument("class_type"))?;
        Ok(self.table().contains_key(&class_type))
    }

    /// Whether a class map is registered for `C`
    pub fn is_registered<C: ?Sized + 'static>(&self) -> bool {
        self.table().contains_key(&TypeKey::of::<C>())
    }

    /// The class map registered for `C`
    pub fn class_map<C: Reflect + ?Sized>(&self) -> Option<Arc<ClassMap<C>>> {
        let any = self.table().get(&TypeKey::of::<C>())?.any.clone();
        any.downcast::<ClassMap<C>>().ok()
    }

    /// The class map registered for `class_type`, erased
    pub fn class_map_info(&self, class_type: TypeKey) -> Option<Arc<dyn ClassMapInfo>> {
        self.table().get(&class_type).map(|entry| entry.info.clone())
    }

    pub fn registered_types(&self) -> Vec<TypeKey> {
        self.table().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    /// Snapshot of everything registered so far
    pub fn snapshot(&self, include_checksum: bool) -> Result<RegistrySnapshot> {
        let class_maps: Vec<Arc<dyn ClassMapInfo>> =
            self.table().values().map(|entry| entry.info.clone()).collect();
        RegistrySnapshot::from_class_maps(&class_maps, include_checksum)
    }

    // Table operations never leave the map half-updated, so a poisoned lock
    // is still safe to use.
    fn table(&self) -> MutexGuard<'_, HashMap<TypeKey, Entry>> {
        self.class_maps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Lock order: pending before table.
    fn pending(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn duplicate(class_type: TypeKey) -> MappingError {
    warn!(class = class_type.name(), "duplicate class map registration");
    MappingError::DuplicateRegistration(class_type.to_string())
}
