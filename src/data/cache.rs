use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::table::{ComposedTable, StatsTable};

// ---------------------------------------------------------------------------
// StoreCache – derived tables owned by one RecordStore
// ---------------------------------------------------------------------------

/// Lazily computed tables of a store.
///
/// `dirty` is raised by every mutation (store or record side) and cleared
/// only by a successful compose; both tables are dropped at the same time.
#[derive(Debug, Default)]
pub struct StoreCache {
    composed: Option<Rc<ComposedTable>>,
    stats: Option<Rc<StatsTable>>,
    dirty: bool,
}

impl StoreCache {
    pub fn invalidate(&mut self) {
        self.composed = None;
        self.stats = None;
        self.dirty = true;
    }

    /// The composed table, unless it is stale.
    pub fn composed(&self) -> Option<Rc<ComposedTable>> {
        if self.dirty {
            return None;
        }
        self.composed.clone()
    }

    pub fn stats(&self) -> Option<Rc<StatsTable>> {
        if self.dirty {
            return None;
        }
        self.stats.clone()
    }

    pub fn store_composed(&mut self, table: Rc<ComposedTable>) {
        self.composed = Some(table);
        self.stats = None;
        self.dirty = false;
    }

    /// Only accepted while the composed table it was derived from is current.
    pub fn store_stats(&mut self, table: Rc<StatsTable>) {
        if !self.dirty && self.composed.is_some() {
            self.stats = Some(table);
        }
    }
}

/// Handle a store keeps on its own cache.
pub type CacheHandle = Rc<RefCell<StoreCache>>;

// ---------------------------------------------------------------------------
// Dependents – back-references from a record to the caches that use it
// ---------------------------------------------------------------------------

/// Weak registry of every store cache a record belongs to.
#[derive(Debug, Default)]
pub struct Dependents {
    caches: Vec<Weak<RefCell<StoreCache>>>,
}

impl Dependents {
    /// Register `cache`; registering twice is a no-op.
    pub fn attach(&mut self, cache: &CacheHandle) {
        self.prune();
        let weak = Rc::downgrade(cache);
        if !self.caches.iter().any(|c| c.ptr_eq(&weak)) {
            self.caches.push(weak);
        }
    }

    pub fn detach(&mut self, cache: &CacheHandle) {
        let weak = Rc::downgrade(cache);
        self.caches.retain(|c| !c.ptr_eq(&weak) && c.strong_count() > 0);
    }

    /// Invalidate every live dependent cache. Returns how many were reached.
    pub fn invalidate_all(&mut self) -> usize {
        self.prune();
        let mut reached = 0;
        for cache in self.caches.iter().filter_map(Weak::upgrade) {
            cache.borrow_mut().invalidate();
            reached += 1;
        }
        reached
    }

    /// Number of stores still alive that reference the record.
    pub fn len(&self) -> usize {
        self.caches.iter().filter(|c| c.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prune(&mut self) {
        self.caches.retain(|c| c.strong_count() > 0);
    }
}
