//! Bounded chunk cache.
//!
//! Holds generated chunks keyed by address and evicts the oldest insertion once
//! the configured bound is reached. Lookups do not refresh an entry's age.
//! Chunks are shared through `Arc` so that a region handed to a caller stays
//! valid after the cache evicts its chunks; in-place edits go through
//! [`Arc::make_mut`] and never disturb such snapshots.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::chunk::Chunk;
use crate::coords::ChunkAddress;

/// Cache statistics for monitoring
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
    /// Number of chunks generated and inserted
    pub generated: usize,
    /// Number of evictions
    pub evictions: usize,
    /// Wall time spent generating chunks
    pub total_generation_time: Duration,
    /// Current number of resident chunks
    pub resident: usize,
    /// Estimated memory usage in bytes
    pub memory_bytes: usize,
}

impl CacheStats {
    /// Calculate hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }

    /// Mean generation time per chunk
    pub fn average_generation_time(&self) -> Duration {
        if self.generated == 0 {
            Duration::ZERO
        } else {
            self.total_generation_time / self.generated as u32
        }
    }

    /// Format as human-readable string
    pub fn summary(&self) -> String {
        format!(
            "Hits: {} | Misses: {} | Rate: {:.1}% | Generated: {} (avg {:.2}ms) | Chunks: {} | Mem: {:.1}MB",
            self.hits,
            self.misses,
            self.hit_rate() * 100.0,
            self.generated,
            self.average_generation_time().as_secs_f64() * 1000.0,
            self.resident,
            self.memory_bytes as f32 / (1024.0 * 1024.0)
        )
    }
}

/// Insertion-ordered chunk cache with a fixed capacity
pub struct TerrainCache {
    /// Cached chunks by address
    chunks: HashMap<ChunkAddress, Arc<Chunk>>,
    /// Insertion order (oldest at front)
    order: VecDeque<ChunkAddress>,
    /// Maximum number of chunks
    max_size: usize,
    stats: CacheStats,
}

impl TerrainCache {
    /// Create a cache holding at most `max_size` chunks (minimum 1)
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            chunks: HashMap::with_capacity(max_size),
            order: VecDeque::with_capacity(max_size),
            max_size,
            stats: CacheStats::default(),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Look up a chunk, counting a hit or a miss
    pub fn get(&mut self, address: ChunkAddress) -> Option<Arc<Chunk>> {
        match self.chunks.get(&address) {
            Some(chunk) => {
                self.stats.hits += 1;
                Some(Arc::clone(chunk))
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Look up a chunk without touching the statistics
    pub fn peek(&self, address: ChunkAddress) -> Option<&Arc<Chunk>> {
        self.chunks.get(&address)
    }

    /// Mutable access to a resident chunk. Clones the chunk first if a
    /// snapshot still shares it.
    pub fn get_mut(&mut self, address: ChunkAddress) -> Option<&mut Chunk> {
        self.chunks.get_mut(&address).map(Arc::make_mut)
    }

    /// Insert a freshly generated chunk, evicting the oldest entry when full.
    /// Returns the evicted address, if any.
    pub fn insert(&mut self, chunk: Arc<Chunk>, generation_time: Duration) -> Option<ChunkAddress> {
        let address = chunk.address();
        let mut evicted = None;

        // Check if we need to evict
        if self.chunks.len() >= self.max_size && !self.chunks.contains_key(&address) {
            if let Some(old) = self.order.pop_front() {
                self.chunks.remove(&old);
                self.stats.evictions += 1;
                log::debug!("Evicted chunk {}", old);
                evicted = Some(old);
            }
        }

        if self.chunks.insert(address, chunk).is_none() {
            self.order.push_back(address);
        }
        self.stats.generated += 1;
        self.stats.total_generation_time += generation_time;

        evicted
    }

    pub fn contains(&self, address: ChunkAddress) -> bool {
        self.chunks.contains_key(&address)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Resident addresses, oldest first
    pub fn addresses(&self) -> impl Iterator<Item = ChunkAddress> + '_ {
        self.order.iter().copied()
    }

    pub fn memory_size(&self) -> usize {
        self.chunks.values().map(|c| c.memory_size()).sum()
    }

    /// Drop every resident chunk. Cumulative statistics are kept.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.order.clear();
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Statistics snapshot
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            resident: self.chunks.len(),
            memory_bytes: self.memory_size(),
            ..self.stats
        }
    }
}
