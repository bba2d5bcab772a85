//! Host-owned record cache.

use crate::generator::Generator;
use crate::record::MarketRecord;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Lazily generated record set.
///
/// The first [`RecordStore::get`] generates the dataset; later calls return
/// the cached slice until [`RecordStore::invalidate`] drops it. Because the
/// generator reseeds on every run, a regenerated dataset equals the previous
/// one.
#[derive(Debug, Default)]
pub struct RecordStore {
    generator: Generator,
    cache: OnceCell<Vec<MarketRecord>>,
    generations: AtomicU64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generator(generator: Generator) -> Self {
        Self {
            generator,
            cache: OnceCell::new(),
            generations: AtomicU64::new(0),
        }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// Cached records, generating them on first use. A failed generation is
    /// logged and served as an empty dataset.
    pub fn get(&self) -> &[MarketRecord] {
        self.cache.get_or_init(|| {
            self.generations.fetch_add(1, Ordering::Relaxed);
            match self.generator.generate() {
                Ok(records) => records,
                Err(err) => {
                    warn!(
                        %err,
                        seed = self.generator.seed(),
                        "record generation failed, serving empty dataset"
                    );
                    Vec::new()
                }
            }
        })
    }

    /// Drop the cached records. Safe to call on an empty cache.
    pub fn invalidate(&mut self) {
        if let Some(records) = self.cache.take() {
            debug!(records = records.len(), "record cache invalidated");
        }
    }

    pub fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }

    /// How many times the dataset has been (re)generated.
    pub fn generation_count(&self) -> u64 {
        self.generations.load(Ordering::Relaxed)
    }
}
