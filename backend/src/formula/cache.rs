// Formula DSL - Parsed Formula Cache
//
// Process-wide, size-bounded LRU of parsed ASTs keyed by the SHA-256 of the
// formula text. This is the engine's only shared mutable state.
//
// Entries are immutable `Arc<Expr>` values. Parsing happens outside the lock,
// so two callers racing on the same new text may both parse; the first
// insert wins and the second caller adopts it. Parse failures are not cached.

use crate::formula::parser::{parse_formula, ParseError};
use crate::formula::types::Expr;
use lru::LruCache;
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Capacity of the process-wide cache unless configured otherwise
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// SHA-256 digest of a formula's text
pub type FormulaKey = [u8; 32];

static GLOBAL_CACHE: OnceCell<Arc<FormulaCache>> = OnceCell::new();

/// Compute the cache key for formula text
pub fn formula_key(text: &str) -> FormulaKey {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(&hasher.finalize());
    key
}

fn short_key(key: &FormulaKey) -> String {
    key[..6].iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hit/miss counters and occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

/// Bounded LRU cache of parsed formulas
pub struct FormulaCache {
    entries: Mutex<LruCache<FormulaKey, Arc<Expr>>>,
    capacity: NonZeroUsize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FormulaCache {
    /// Create a cache holding at most `capacity` formulas (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Process-wide cache, created with `DEFAULT_CACHE_CAPACITY` on first use
    pub fn global() -> Arc<FormulaCache> {
        GLOBAL_CACHE
            .get_or_init(|| Arc::new(FormulaCache::new(DEFAULT_CACHE_CAPACITY)))
            .clone()
    }

    /// Size the process-wide cache before first use
    ///
    /// Returns false if the global cache already exists (its capacity is
    /// then left unchanged).
    pub fn init_global(capacity: usize) -> bool {
        GLOBAL_CACHE
            .set(Arc::new(FormulaCache::new(capacity)))
            .is_ok()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<FormulaKey, Arc<Expr>>> {
        // Entries are immutable, so a panic while locked cannot corrupt them
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Look up an already-parsed formula
    pub fn get(&self, text: &str) -> Option<Arc<Expr>> {
        let key = formula_key(text);
        self.lock().get(&key).cloned()
    }

    /// Return the cached AST for `text`, parsing and inserting on a miss
    pub fn get_or_parse(&self, text: &str) -> Result<Arc<Expr>, ParseError> {
        let key = formula_key(text);

        if let Some(ast) = self.lock().get(&key).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(component = "formula_cache", event = "hit", key = %short_key(&key));
            return Ok(ast);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(component = "formula_cache", event = "miss", key = %short_key(&key));
        let parsed = Arc::new(parse_formula(text)?);

        let mut entries = self.lock();
        if let Some(existing) = entries.get(&key) {
            // Another caller inserted first
            return Ok(existing.clone());
        }
        entries.put(key, parsed.clone());
        Ok(parsed)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
            capacity: self.capacity(),
        }
    }

    /// Drop every entry (counters are kept)
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl std::fmt::Debug for FormulaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormulaCache")
            .field("stats", &self.stats())
            .finish()
    }
}
