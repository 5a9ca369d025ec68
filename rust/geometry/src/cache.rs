// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry cache
//!
//! Bounded LRU cache of machining outcomes keyed by element category,
//! dimensions and feature-set signature. An outcome is the machined mesh
//! together with the warnings of the features that were skipped, so
//! elements with malformed features hit the cache like any other. Entries expire after a TTL measured
//! from their last access; an interval sweep piggybacks on cache operations,
//! so no background thread is needed.
//!
//! Every `get` hands out a private copy. Callers may mutate what they
//! receive without affecting the cached entry.
//!
//! Each time-dependent operation has an `*_at(Instant)` twin for
//! deterministic clocks in tests.

use crate::engine::FeatureWarning;
use crate::mesh::Mesh;
use nc_lite_core::{feature_set_signature, NormalizedFeature, StructuralElement};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::time::{Duration, Instant};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Share of entries `optimize` drops
pub const OPTIMIZE_FRACTION: f64 = 0.2;

/// Cache limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    pub max_size_mb: f64,
    pub max_entries: usize,
    pub ttl_seconds: u64,
    pub cleanup_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size_mb: 100.0,
            max_entries: 500,
            ttl_seconds: 300,
            cleanup_interval_seconds: 60,
        }
    }
}

impl CacheConfig {
    #[inline]
    pub fn max_bytes(&self) -> usize {
        if self.max_size_mb.is_finite() && self.max_size_mb > 0.0 {
            (self.max_size_mb * BYTES_PER_MB) as usize
        } else {
            0
        }
    }

    #[inline]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    #[inline]
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds)
    }
}

/// Cache key: `"{category}|{dimensions}|{feature signature}"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(category: &str, dimensions: &str, signature: &str) -> Self {
        Self(format!("{}|{}|{}", category, dimensions, signature))
    }

    /// Key for an element and its (full) normalized feature list
    pub fn for_element(element: &StructuralElement, features: &[NormalizedFeature]) -> Self {
        Self::new(
            element.category.as_str(),
            &dimension_signature(element),
            &feature_set_signature(features),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything that shapes the base solid: designation, nominal dimensions
/// and thickness overrides
fn dimension_signature(element: &StructuralElement) -> String {
    let dims = &element.dimensions;
    let meta = &element.metadata;
    let mut out = String::with_capacity(64);
    out.push_str(element.profile_designation().unwrap_or("-"));
    for value in [
        dims.length,
        dims.height,
        dims.width,
        dims.thickness,
        dims.diameter,
        meta.flange_thickness,
        meta.web_thickness,
        meta.height,
        meta.width,
    ] {
        // Writing to a String cannot fail
        let _ = match value {
            Some(v) => write!(out, ":{:.3}", v),
            None => write!(out, ":-"),
        };
    }
    out
}

/// A machined mesh and how it came about
#[derive(Debug, Clone, PartialEq)]
pub struct CachedGeometry {
    pub mesh: Mesh,
    pub success: bool,
    pub warnings: Vec<FeatureWarning>,
}

impl CachedGeometry {
    pub fn new(mesh: Mesh, success: bool, warnings: Vec<FeatureWarning>) -> Self {
        Self {
            mesh,
            success,
            warnings,
        }
    }

    /// Mesh buffer bytes plus the warning text
    pub fn byte_size(&self) -> usize {
        self.mesh.byte_size()
            + self
                .warnings
                .iter()
                .map(|w| w.feature_id.len() + w.message.len())
                .sum::<usize>()
    }
}

impl From<Mesh> for CachedGeometry {
    /// A clean result: every feature applied
    fn from(mesh: Mesh) -> Self {
        Self::new(mesh, true, Vec::new())
    }
}

#[derive(Debug)]
struct CacheEntry {
    geometry: CachedGeometry,
    created: Instant,
    last_access: Instant,
    /// Access sequence number for LRU ordering
    sequence: u64,
    hits: u64,
    bytes: usize,
}

/// Snapshot of cache counters and limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    pub size_bytes: usize,
    pub size_mb: f64,
    pub hit_rate: f64,
    pub max_entries: usize,
    pub max_size_mb: f64,
}

/// Bounded geometry cache with TTL and LRU eviction
#[derive(Debug)]
pub struct GeometryCache {
    config: CacheConfig,
    entries: FxHashMap<CacheKey, CacheEntry>,
    total_bytes: usize,
    sequence: u64,
    last_sweep: Instant,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl GeometryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self::new_at(config, Instant::now())
    }

    pub fn new_at(config: CacheConfig, now: Instant) -> Self {
        Self {
            config,
            entries: FxHashMap::default(),
            total_bytes: 0,
            sequence: 0,
            last_sweep: now,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Sum of the byte sizes of all cached outcomes
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<CachedGeometry> {
        self.get_at(key, Instant::now())
    }

    /// Copy of the cached outcome; expired entries are evicted and miss
    pub fn get_at(&mut self, key: &CacheKey, now: Instant) -> Option<CachedGeometry> {
        self.maybe_sweep(now);

        let ttl = self.config.ttl();
        let expired = match self.entries.get(key) {
            None => {
                self.misses += 1;
                return None;
            }
            Some(entry) => now.saturating_duration_since(entry.last_access) >= ttl,
        };

        if expired {
            self.remove(key);
            self.misses += 1;
            tracing::debug!(key = %key, "Cache entry expired");
            return None;
        }

        self.sequence += 1;
        let sequence = self.sequence;
        let entry = self.entries.get_mut(key)?;
        entry.last_access = now;
        entry.sequence = sequence;
        entry.hits += 1;
        self.hits += 1;
        tracing::trace!(key = %key, hits = entry.hits, "Cache hit");
        Some(entry.geometry.clone())
    }

    pub fn set(&mut self, key: CacheKey, geometry: &CachedGeometry) {
        self.set_at(key, geometry, Instant::now())
    }

    /// Store a copy of `geometry`, evicting least-recently-used entries to
    /// stay within the limits. Outcomes larger than the whole budget are not
    /// cached.
    pub fn set_at(&mut self, key: CacheKey, geometry: &CachedGeometry, now: Instant) {
        self.maybe_sweep(now);

        let bytes = geometry.byte_size();
        let max_bytes = self.config.max_bytes();
        if bytes > max_bytes || self.config.max_entries == 0 {
            tracing::debug!(
                key = %key,
                size = bytes,
                max_bytes,
                "Mesh exceeds cache budget, not cached"
            );
            return;
        }

        self.remove(&key);
        while !self.entries.is_empty()
            && (self.entries.len() >= self.config.max_entries
                || self.total_bytes + bytes > max_bytes)
        {
            self.evict_lru();
        }

        self.sequence += 1;
        self.total_bytes += bytes;
        tracing::debug!(key = %key, size = bytes, entries = self.entries.len() + 1, "Cached result");
        self.entries.insert(
            key,
            CacheEntry {
                geometry: geometry.clone(),
                created: now,
                last_access: now,
                sequence: self.sequence,
                hits: 0,
                bytes,
            },
        );
    }

    /// Drop one entry; returns whether it existed
    pub fn evict(&mut self, key: &CacheKey) -> bool {
        let removed = self.remove(key);
        if removed {
            self.evictions += 1;
            tracing::debug!(key = %key, "Evicted cache entry");
        }
        removed
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.total_bytes = 0;
        self.evictions += count as u64;
        tracing::debug!(entries = count, "Cleared geometry cache");
    }

    pub fn sweep_expired(&mut self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    /// Evict every entry whose TTL has lapsed
    pub fn sweep_expired_at(&mut self, now: Instant) -> usize {
        self.last_sweep = now;
        let ttl = self.config.ttl();
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.last_access) >= ttl)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }
        self.evictions += expired.len() as u64;
        if !expired.is_empty() {
            tracing::debug!(evicted = expired.len(), "Swept expired cache entries");
        }
        expired.len()
    }

    pub fn optimize(&mut self) -> usize {
        self.optimize_at(Instant::now())
    }

    /// Rank entries by hits per second of age and drop the bottom fifth
    pub fn optimize_at(&mut self, now: Instant) -> usize {
        let count = (self.entries.len() as f64 * OPTIMIZE_FRACTION).floor() as usize;
        if count == 0 {
            return 0;
        }

        let mut ranked: Vec<(f64, u64, CacheKey)> = self
            .entries
            .iter()
            .map(|(key, entry)| {
                let age = now
                    .saturating_duration_since(entry.created)
                    .as_secs_f64()
                    .max(1e-3);
                (entry.hits as f64 / age, entry.sequence, key.clone())
            })
            .collect();
        // Lowest score first; ties go to the least recently used
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        for (_, _, key) in ranked.into_iter().take(count) {
            self.remove(&key);
        }
        self.evictions += count as u64;
        tracing::debug!(evicted = count, remaining = self.entries.len(), "Optimized geometry cache");
        count
    }

    /// Apply new limits, evicting immediately if the cache is now over them
    pub fn reconfigure(&mut self, config: CacheConfig) {
        self.config = config;
        let max_bytes = config.max_bytes();
        while !self.entries.is_empty()
            && (self.entries.len() > config.max_entries || self.total_bytes > max_bytes)
        {
            self.evict_lru();
        }
    }

    pub fn statistics(&self) -> CacheStatistics {
        let lookups = self.hits + self.misses;
        CacheStatistics {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            entries: self.entries.len(),
            size_bytes: self.total_bytes,
            size_mb: self.total_bytes as f64 / BYTES_PER_MB,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                self.hits as f64 / lookups as f64
            },
            max_entries: self.config.max_entries,
            max_size_mb: self.config.max_size_mb,
        }
    }

    fn maybe_sweep(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_sweep) >= self.config.cleanup_interval() {
            self.sweep_expired_at(now);
        }
    }

    fn evict_lru(&mut self) {
        let lru_key = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.sequence)
            .map(|(key, _)| key.clone());

        if let Some(key) = lru_key {
            self.remove(&key);
            self.evictions += 1;
            tracing::debug!(key = %key, "Evicted least recently used entry");
        }
    }

    fn remove(&mut self, key: &CacheKey) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.total_bytes -= entry.bytes;
                true
            }
            None => false,
        }
    }
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};
    use nc_lite_core::{Dimensions, MaterialCategory};

    fn mesh_with_vertices(count: usize) -> CachedGeometry {
        let mut mesh = Mesh::new();
        for i in 0..count {
            mesh.add_vertex(Point3::new(i as f64, 0.0, 0.0), Vector3::z());
        }
        mesh.add_triangle(0, 1, 2);
        mesh.into()
    }

    fn key(name: &str) -> CacheKey {
        CacheKey::new("BEAM", name, "n0")
    }

    fn config(max_entries: usize, max_size_mb: f64) -> CacheConfig {
        CacheConfig {
            max_size_mb,
            max_entries,
            ttl_seconds: 10,
            cleanup_interval_seconds: 60,
        }
    }

    #[test]
    fn test_get_returns_private_copy() {
        let mut cache = GeometryCache::default();
        let mesh = mesh_with_vertices(3);
        cache.set(key("a"), &mesh);

        let mut copy = cache.get(&key("a")).unwrap();
        copy.mesh.positions[0] = 42.0;
        copy.mesh.indices.clear();

        assert_eq!(cache.get(&key("a")).unwrap(), mesh);
        let stats = cache.statistics();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_entry_limit_evicts_lru() {
        let now = Instant::now();
        let mut cache = GeometryCache::new_at(config(2, 10.0), now);
        cache.set_at(key("a"), &mesh_with_vertices(3), now);
        cache.set_at(key("b"), &mesh_with_vertices(3), now);
        // Touch "a" so "b" becomes the LRU entry
        assert!(cache.get_at(&key("a"), now).is_some());
        cache.set_at(key("c"), &mesh_with_vertices(3), now);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&key("a")));
        assert!(!cache.contains(&key("b")));
        assert_eq!(cache.statistics().evictions, 1);
    }

    #[test]
    fn test_byte_limit() {
        let now = Instant::now();
        let mesh = mesh_with_vertices(1000); // 24012 bytes
        let budget_mb = (mesh.byte_size() as f64 * 2.5) / BYTES_PER_MB;
        let mut cache = GeometryCache::new_at(config(100, budget_mb), now);
        for name in ["a", "b", "c", "d"] {
            cache.set_at(key(name), &mesh, now);
            assert!(cache.size_bytes() <= cache.config().max_bytes());
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&key("d")));
    }

    #[test]
    fn test_warnings_are_cached_with_the_mesh() {
        let mut geometry = mesh_with_vertices(3);
        geometry.success = true;
        geometry.warnings.push(FeatureWarning {
            feature_id: "hole-2".to_string(),
            message: "Hole diameter must be positive".to_string(),
        });
        assert_eq!(geometry.byte_size(), 84 + 6 + 30);

        let mut cache = GeometryCache::default();
        cache.set(key("a"), &geometry);
        assert_eq!(cache.size_bytes(), geometry.byte_size());

        let mut copy = cache.get(&key("a")).unwrap();
        assert_eq!(copy, geometry);
        copy.warnings.clear();
        assert_eq!(cache.get(&key("a")).unwrap().warnings.len(), 1);
    }

    #[test]
    fn test_oversized_mesh_is_not_cached() {
        let mut cache = GeometryCache::new(config(10, 0.001));
        cache.set(key("big"), &mesh_with_vertices(1000));
        assert!(cache.is_empty());
        assert_eq!(cache.size_bytes(), 0);
    }

    #[test]
    fn test_ttl_expiry_on_get() {
        let now = Instant::now();
        let mut cache = GeometryCache::new_at(config(10, 10.0), now);
        cache.set_at(key("a"), &mesh_with_vertices(3), now);

        assert!(cache.get_at(&key("a"), now + Duration::from_secs(5)).is_some());
        // TTL counts from the last access
        assert!(cache.get_at(&key("a"), now + Duration::from_secs(14)).is_some());
        assert!(cache.get_at(&key("a"), now + Duration::from_secs(25)).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.statistics().misses, 1);
    }

    #[test]
    fn test_interval_sweep_runs_on_operations() {
        let now = Instant::now();
        let mut cache = GeometryCache::new_at(config(10, 10.0), now);
        cache.set_at(key("a"), &mesh_with_vertices(3), now);
        cache.set_at(key("b"), &mesh_with_vertices(3), now);

        // Before the cleanup interval nothing is swept proactively
        let _ = cache.get_at(&key("missing"), now + Duration::from_secs(30));
        assert_eq!(cache.len(), 2);

        let _ = cache.get_at(&key("missing"), now + Duration::from_secs(61));
        assert!(cache.is_empty());
        assert_eq!(cache.statistics().evictions, 2);
    }

    #[test]
    fn test_optimize_evicts_bottom_fifth() {
        let now = Instant::now();
        let mut cache = GeometryCache::new_at(config(100, 10.0), now);
        for i in 0..10 {
            cache.set_at(key(&format!("k{}", i)), &mesh_with_vertices(3), now);
        }
        let later = now + Duration::from_secs(5);
        for i in 2..10 {
            let _ = cache.get_at(&key(&format!("k{}", i)), later);
        }

        assert_eq!(cache.optimize_at(later), 2);
        assert_eq!(cache.len(), 8);
        assert!(!cache.contains(&key("k0")));
        assert!(!cache.contains(&key("k1")));

        let mut small = GeometryCache::new_at(config(100, 10.0), now);
        small.set_at(key("only"), &mesh_with_vertices(3), now);
        assert_eq!(small.optimize_at(later), 0);
    }

    #[test]
    fn test_reconfigure_shrinks() {
        let now = Instant::now();
        let mut cache = GeometryCache::new_at(config(10, 10.0), now);
        for name in ["a", "b", "c"] {
            cache.set_at(key(name), &mesh_with_vertices(3), now);
        }
        cache.reconfigure(config(1, 10.0));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&key("c")));
    }

    #[test]
    fn test_evict_and_clear() {
        let mut cache = GeometryCache::default();
        cache.set(key("a"), &mesh_with_vertices(3));
        cache.set(key("b"), &mesh_with_vertices(3));
        assert!(cache.evict(&key("a")));
        assert!(!cache.evict(&key("a")));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.size_bytes(), 0);
        assert_eq!(cache.statistics().evictions, 2);
    }

    #[test]
    fn test_key_includes_dimensions_and_designation() {
        let a = StructuralElement::new("a", MaterialCategory::Beam)
            .with_profile("IPE300")
            .with_dimensions(Dimensions::new().with_length(6000.0));
        let b = a.clone().with_profile("IPE330");
        let c = a
            .clone()
            .with_dimensions(Dimensions::new().with_length(5000.0));

        let ka = CacheKey::for_element(&a, &[]);
        assert!(ka.as_str().starts_with("BEAM|IPE300:6000.000"));
        assert_ne!(ka, CacheKey::for_element(&b, &[]));
        assert_ne!(ka, CacheKey::for_element(&c, &[]));
        // Element id does not matter
        let mut d = a.clone();
        d.id = "other".to_string();
        assert_eq!(ka, CacheKey::for_element(&d, &[]));
    }
}
