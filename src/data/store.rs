use std::cell::Ref;
use std::path::Path;
use std::rc::Rc;

use super::cache::CacheHandle;
use super::compose;
use super::config::OutputConfig;
use super::definition::GroupDefinition;
use super::error::{IndexError, Result, SpectError};
use super::read_spec::ReadSpec;
use super::record::{Record, SharedRecord};
use super::stats;
use super::table::{ComposedTable, StatsTable};

// ---------------------------------------------------------------------------
// RecordStore – an ordered group of experiments
// ---------------------------------------------------------------------------

/// An ordered group of experiments with lazily composed tables.
///
/// Records are shared (`Rc<RefCell<Record>>`), so a subgroup sees the same
/// data as its parent. Each record keeps a weak back-reference to the cache
/// of every store holding it and invalidates them all when it is reloaded.
///
/// Not thread-safe: mutation and `compose`/`stats` must not interleave
/// across threads (the type is `!Send`).
#[derive(Debug)]
pub struct RecordStore {
    name: String,
    output: OutputConfig,
    records: Vec<SharedRecord>,
    cache: CacheHandle,
}

impl RecordStore {
    /// An empty group.
    pub fn new(name: impl Into<String>, output: OutputConfig) -> Self {
        Self {
            name: name.into(),
            output,
            records: Vec::new(),
            cache: CacheHandle::default(),
        }
    }

    /// A group over already constructed records.
    pub fn with_records(
        records: Vec<SharedRecord>,
        name: impl Into<String>,
        output: OutputConfig,
    ) -> Self {
        let mut store = Self::new(name, output);
        store.set_records(records);
        store
    }

    /// Load one record per `(path, name)` pair with a common [`ReadSpec`].
    /// Fails on the first file that does not load.
    pub fn from_files<P: AsRef<Path>>(
        files: &[(P, Option<String>)],
        spec: &ReadSpec,
        name: impl Into<String>,
        output: OutputConfig,
    ) -> Result<Self> {
        let mut records = Vec::with_capacity(files.len());
        for (path, record_name) in files {
            let mut record = Record::with_source(path.as_ref())
                .with_output_dir(output.output_dir.clone());
            record.set_name(record_name.clone());
            record.load(spec)?;
            records.push(record.into_shared());
        }
        let store = Self::with_records(records, name, output);
        log::info!(
            "Built group '{}' from {} file(s)",
            store.name,
            store.len()
        );
        Ok(store)
    }

    /// Load every experiment a JSON group definition expands to.
    pub fn from_definition(
        path: &Path,
        name: impl Into<String>,
        output: OutputConfig,
    ) -> Result<Self> {
        let definition = GroupDefinition::from_path(path)?;
        let mut records = Vec::new();
        for exp in definition.expand()? {
            let mut record = Record::with_source(exp.source_file)
                .named(exp.name)
                .with_output_dir(exp.output_path);
            record.load(&definition.read_spec)?;
            records.push(record.into_shared());
        }
        let store = Self::with_records(records, name, output);
        log::info!(
            "Built group '{}' with {} experiment(s) from {}",
            store.name,
            store.len(),
            path.display()
        );
        Ok(store)
    }

    // -- Mutation --

    /// Append a record and invalidate the cached tables.
    pub fn add_record(&mut self, record: SharedRecord) {
        record.borrow_mut().attach(&self.cache);
        self.records.push(record);
        self.invalidate();
    }

    /// Replace the whole sequence and invalidate the cached tables.
    pub fn set_records(&mut self, records: Vec<SharedRecord>) {
        for old in &self.records {
            old.borrow_mut().detach(&self.cache);
        }
        for new in &records {
            new.borrow_mut().attach(&self.cache);
        }
        self.records = records;
        self.invalidate();
    }

    /// Drop the cached tables; the next `compose`/`stats` recomputes.
    pub fn invalidate(&self) {
        log::debug!("Invalidating cached tables of '{}'", self.name);
        self.cache.borrow_mut().invalidate();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_output(&mut self, output: OutputConfig) {
        self.output = output;
    }

    // -- Derived tables --

    /// The composed table, computed on first use and after any mutation.
    pub fn compose(&self) -> Result<Rc<ComposedTable>> {
        if let Some(table) = self.cache.borrow().composed() {
            log::debug!("Composed table of '{}' served from cache", self.name);
            return Ok(table);
        }

        let guards: Vec<Ref<'_, Record>> = self.records.iter().map(|r| r.borrow()).collect();
        let borrowed: Vec<&Record> = guards.iter().map(|g| &**g).collect();
        compose::ensure_loaded(&borrowed)?;
        let table = Rc::new(compose::compose(&borrowed)?);
        drop(borrowed);
        drop(guards);

        log::debug!(
            "Composed '{}': {} rows x {} experiments",
            self.name,
            table.len(),
            table.width()
        );
        self.cache.borrow_mut().store_composed(Rc::clone(&table));
        Ok(table)
    }

    /// Row-wise statistics of the composed table, composing first if needed.
    pub fn stats(&self) -> Result<Rc<StatsTable>> {
        if let Some(table) = self.cache.borrow().stats() {
            log::debug!("Stats of '{}' served from cache", self.name);
            return Ok(table);
        }
        let composed = self.compose()?;
        let table = Rc::new(stats::compute(&composed));
        self.cache.borrow_mut().store_stats(Rc::clone(&table));
        Ok(table)
    }

    /// Whether a current composed table is cached.
    pub fn is_composed(&self) -> bool {
        self.cache.borrow().composed().is_some()
    }

    pub fn is_stats(&self) -> bool {
        self.cache.borrow().stats().is_some()
    }

    // -- Subgroups --

    /// One subgroup per index set, named `Subgroup #<n> of <name>` (n from
    /// 1), sharing this group's records and output configuration. Each has
    /// its own cache.
    pub fn subgroup(&self, index_sets: &[Vec<usize>]) -> Result<Vec<RecordStore>> {
        let mut groups = Vec::with_capacity(index_sets.len());
        for (set, indices) in index_sets.iter().enumerate() {
            let records = self.select_in_set(indices, set + 1)?;
            groups.push(RecordStore::with_records(
                records,
                format!("Subgroup #{} of {}", set + 1, self.name),
                self.output.clone(),
            ));
        }
        Ok(groups)
    }

    /// The records at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Result<Vec<SharedRecord>> {
        self.select_in_set(indices, 1)
    }

    fn select_in_set(&self, indices: &[usize], set: usize) -> Result<Vec<SharedRecord>> {
        indices
            .iter()
            .map(|&index| {
                self.records.get(index).cloned().ok_or(SpectError::Index(
                    IndexError::OutOfRange {
                        set,
                        index,
                        len: self.records.len(),
                    },
                ))
            })
            .collect()
    }

    // -- Accessors --

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    pub fn output_dir(&self) -> &Path {
        &self.output.output_dir
    }

    pub fn records(&self) -> &[SharedRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&SharedRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Drop for RecordStore {
    fn drop(&mut self) {
        for record in &self.records {
            if let Ok(mut r) = record.try_borrow_mut() {
                r.detach(&self.cache);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
