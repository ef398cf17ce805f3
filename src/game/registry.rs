//! # Instance Registry
//!
//! Shared map of instance id to running [`GameInstance`]. Each instance
//! lives behind its own mutex: one coarse critical section per command or
//! tick, and no lock ordering to get wrong because instances never touch
//! each other.

use crate::{Clock, DelveError, DelveResult, GameInstance, SystemClock};
use log::info;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Thread-safe registry of running instances.
#[derive(Default)]
pub struct InstanceRegistry {
    instances: Mutex<HashMap<String, Arc<Mutex<GameInstance>>>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers an instance running on the system clock.
    pub fn create(&self, id: &str, seed: u64) -> DelveResult<Arc<Mutex<GameInstance>>> {
        self.create_with_clock(id, seed, Box::new(SystemClock::default()))
    }

    /// Creates and registers an instance with an injected clock, refusing
    /// duplicate ids.
    pub fn create_with_clock(
        &self,
        id: &str,
        seed: u64,
        clock: Box<dyn Clock>,
    ) -> DelveResult<Arc<Mutex<GameInstance>>> {
        let mut instances = self.lock();
        if instances.contains_key(id) {
            return Err(DelveError::InvalidState(format!(
                "instance {id} already exists"
            )));
        }
        let instance = Arc::new(Mutex::new(GameInstance::new(id, seed, clock)));
        instances.insert(id.to_string(), Arc::clone(&instance));
        Ok(instance)
    }

    /// Looks up a running instance.
    pub fn get(&self, id: &str) -> Option<Arc<Mutex<GameInstance>>> {
        self.lock().get(id).cloned()
    }

    /// Unregisters an instance. Commands already holding the instance arc
    /// finish normally; the simulation is dropped with the last reference.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.lock().remove(id).is_some();
        if removed {
            info!("instance {id} removed from registry");
        }
        removed
    }

    pub fn ids(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned registry lock only means another thread panicked mid-map
    // operation; the map itself is still coherent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Mutex<GameInstance>>>> {
        self.instances
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
