//! Single-flight memoizing cache.
//!
//! [`SingleFlightCache`] maps keys to small `Clone` values. For any key, at
//! most one thread runs the construction closure at a time; every other
//! thread asking for the same key blocks until that value is committed and
//! then reads it.
//!
//! # Key States
//!
//! - **settled**: the value is in `settled` and never changes until removed
//!   or cleared.
//! - **under construction**: a [`Slot`] in `pending` names the constructing
//!   thread; other requesters wait on the slot's condition variable.
//!
//! A key moves from pending to settled while the `pending` lock is held, and
//! a new claim re-checks `settled` under that same lock, so no committed value
//! is ever constructed twice.
//!
//! # Failure Modes
//!
//! - A thread that asks for a key it is itself constructing gets
//!   [`CacheError::RecursiveConstruction`] immediately.
//! - [`SingleFlightCache::clear`] cancels every slot; blocked waiters get
//!   [`CacheError::Unavailable`].
//! - A construction closure that panics abandons its slot; waiters wake and
//!   retry the construction themselves.
//!
//! There is no timeout. A closure that never returns blocks its waiters
//! forever, and two threads constructing keys that need each other deadlock.

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use rustc_hash::{FxBuildHasher, FxHashMap};

/// Why a cache request could not produce a value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CacheError {
    /// The cache was cleared or dropped while this request waited.
    #[error("the cache was cleared or disposed while waiting for an entry")]
    Unavailable,
    /// The requesting thread is already constructing this key.
    #[error("recursive construction of a cache entry")]
    RecursiveConstruction,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum SlotState {
    Building,
    Committed,
    /// The construction closure unwound.
    Abandoned,
    /// The cache was cleared mid-construction.
    Cancelled,
}

struct Slot {
    owner: ThreadId,
    state: Mutex<SlotState>,
    done: Condvar,
    waiters: AtomicUsize,
}

impl Slot {
    fn new() -> Arc<Self> {
        Arc::new(Slot {
            owner: thread::current().id(),
            state: Mutex::new(SlotState::Building),
            done: Condvar::new(),
            waiters: AtomicUsize::new(0),
        })
    }

    fn owned_by_current_thread(&self) -> bool {
        self.owner == thread::current().id()
    }

    /// Block until the slot leaves `Building`, returning how it ended.
    fn wait(&self) -> SlotState {
        self.waiters.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        while *state == SlotState::Building {
            self.done.wait(&mut state);
        }
        let outcome = *state;
        drop(state);
        self.waiters.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    /// Move out of `Building` and wake all waiters. Later calls are no-ops.
    fn finish(&self, outcome: SlotState) {
        let mut state = self.state.lock();
        if *state == SlotState::Building {
            *state = outcome;
        }
        self.done.notify_all();
    }
}

enum Claim<V> {
    Settled(V),
    Wait(Arc<Slot>),
    Build(Arc<Slot>),
}

/// Concurrent memoizing cache with at most one construction in flight per key.
pub struct SingleFlightCache<K, V> {
    settled: DashMap<K, V, FxBuildHasher>,
    pending: Mutex<FxHashMap<K, Arc<Slot>>>,
}

impl<K, V> SingleFlightCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        SingleFlightCache {
            settled: DashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            pending: Mutex::new(FxHashMap::default()),
        }
    }

    /// Return the value for `key`, running `factory` if no value exists and
    /// nobody else is constructing one.
    pub fn get_or_create(&self, key: K, factory: impl FnOnce() -> V) -> Result<V, CacheError> {
        loop {
            if let Some(value) = self.settled.get(&key) {
                return Ok(value.value().clone());
            }
            match self.claim(&key)? {
                Claim::Settled(value) => return Ok(value),
                Claim::Build(slot) => return Ok(self.build(key, &slot, factory)),
                Claim::Wait(slot) => {
                    if slot.wait() == SlotState::Cancelled {
                        return Err(CacheError::Unavailable);
                    }
                }
            }
        }
    }

    /// Construct and commit a value for `key` unless one exists or is being
    /// constructed elsewhere. Never waits.
    ///
    /// Returns `Ok(true)` when this call committed a value.
    pub fn try_create(&self, key: K, factory: impl FnOnce() -> V) -> Result<bool, CacheError> {
        if self.settled.contains_key(&key) {
            return Ok(false);
        }
        match self.claim(&key)? {
            Claim::Settled(_) | Claim::Wait(_) => Ok(false),
            Claim::Build(slot) => {
                self.build(key, &slot, factory);
                Ok(true)
            }
        }
    }

    /// The settled value for `key`, waiting out any construction in flight.
    pub fn try_get(&self, key: &K) -> Result<Option<V>, CacheError> {
        self.wait_for_pending(key)?;
        Ok(self.settled.get(key).map(|value| value.value().clone()))
    }

    /// Remove the value for `key`, waiting out any construction in flight.
    ///
    /// Returns `Ok(true)` when a value was removed.
    pub fn try_remove(&self, key: &K) -> Result<bool, CacheError> {
        self.wait_for_pending(key)?;
        Ok(self.settled.remove(key).is_some())
    }

    /// Drop every settled value and cancel every construction in flight.
    pub fn clear(&self) {
        let mut pending = self.pending.lock();
        let cancelled = pending.len();
        for (_, slot) in pending.drain() {
            slot.finish(SlotState::Cancelled);
        }
        let dropped = self.settled.len();
        self.settled.clear();
        drop(pending);
        tracing::debug!(cancelled, dropped, "single-flight cache cleared");
    }

    /// Settled entries plus constructions in flight.
    pub fn len(&self) -> usize {
        let pending = self.pending.lock();
        self.settled.len() + pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys with a settled value, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        self.settled.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Whether `key` has a settled value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.settled.contains_key(key)
    }

    /// Whether `key` is settled or under construction.
    pub fn might_contain_key(&self, key: &K) -> bool {
        self.settled.contains_key(key) || self.pending.lock().contains_key(key)
    }

    /// Number of threads currently blocked on `key`.
    pub fn waiters(&self, key: &K) -> usize {
        self.pending
            .lock()
            .get(key)
            .map_or(0, |slot| slot.waiters.load(Ordering::SeqCst))
    }

    fn claim(&self, key: &K) -> Result<Claim<V>, CacheError> {
        let mut pending = self.pending.lock();
        if let Some(value) = self.settled.get(key) {
            return Ok(Claim::Settled(value.value().clone()));
        }
        if let Some(slot) = pending.get(key) {
            if slot.owned_by_current_thread() {
                return Err(CacheError::RecursiveConstruction);
            }
            return Ok(Claim::Wait(Arc::clone(slot)));
        }
        let slot = Slot::new();
        pending.insert(key.clone(), Arc::clone(&slot));
        Ok(Claim::Build(slot))
    }

    fn build(&self, key: K, slot: &Arc<Slot>, factory: impl FnOnce() -> V) -> V {
        let value = {
            let mut guard = AbandonOnUnwind {
                cache: self,
                key: &key,
                slot,
                armed: true,
            };
            let value = factory();
            guard.armed = false;
            value
        };
        self.commit(key, slot, value.clone());
        value
    }

    fn commit(&self, key: K, slot: &Arc<Slot>, value: V) {
        let mut pending = self.pending.lock();
        // A clear() since the claim has already cancelled the slot; the value
        // goes back to the constructing caller only.
        if pending
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            pending.remove(&key);
            self.settled.insert(key, value);
        }
        drop(pending);
        slot.finish(SlotState::Committed);
    }

    fn abandon(&self, key: &K, slot: &Arc<Slot>) {
        let mut pending = self.pending.lock();
        if pending
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            pending.remove(key);
        }
        drop(pending);
        slot.finish(SlotState::Abandoned);
        tracing::debug!("cache construction unwound; waiters will retry");
    }

    fn wait_for_pending(&self, key: &K) -> Result<(), CacheError> {
        loop {
            let slot = self.pending.lock().get(key).cloned();
            let Some(slot) = slot else {
                return Ok(());
            };
            if slot.owned_by_current_thread() {
                return Err(CacheError::RecursiveConstruction);
            }
            if slot.wait() == SlotState::Cancelled {
                return Err(CacheError::Unavailable);
            }
        }
    }
}

struct AbandonOnUnwind<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    cache: &'a SingleFlightCache<K, V>,
    key: &'a K,
    slot: &'a Arc<Slot>,
    armed: bool,
}

impl<K, V> Drop for AbandonOnUnwind<'_, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn drop(&mut self) {
        if self.armed {
            self.cache.abandon(self.key, self.slot);
        }
    }
}

impl<K, V> Default for SingleFlightCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for SingleFlightCache<K, V> {
    fn drop(&mut self) {
        for (_, slot) in self.pending.get_mut().drain() {
            slot.finish(SlotState::Cancelled);
        }
    }
}

impl<K, V> fmt::Debug for SingleFlightCache<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlightCache")
            .field("settled", &self.settled.len())
            .field("pending", &self.pending.lock().len())
            .finish()
    }
}
