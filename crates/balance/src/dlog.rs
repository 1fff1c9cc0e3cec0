//! Bounded discrete-log search for `m` given `m·B`.
//!
//! No trapdoor exists, so the solver tries candidates in an order tuned for
//! payroll amounts: cache, small values, round values, a strided chunk scan,
//! then every remaining value up to `max_value`.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use primitives::curve::{Point, Projective};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::DiscreteLogCache;
use crate::BalanceError;

/// Round amounts tried in tier 3, largest step first.
const ROUND_STEPS: [u64; 5] = [10_000, 5_000, 1_000, 500, 100];
const WARM_SMALL: u64 = 100;
const WARM_HUNDREDS_UP_TO: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Largest amount the search will consider.
    pub max_value: u64,
    pub small_range: u64,
    pub chunk_size: u64,
    pub stride: u64,
    pub cache_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_value: 100_000, small_range: 1_000, chunk_size: 1_000, stride: 10, cache_capacity: 1_000 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTier {
    Cache,
    Linear,
    RoundValues,
    Chunked,
    Exhaustive,
}

impl SearchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchTier::Cache => "cache",
            SearchTier::Linear => "linear",
            SearchTier::RoundValues => "round",
            SearchTier::Chunked => "chunked",
            SearchTier::Exhaustive => "exhaustive",
        }
    }
}

/// Snapshot of solver counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SolverStats {
    pub searches: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub points_checked: u64,
    pub cache_len: usize,
}

#[derive(Default)]
struct Counters {
    searches: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    points_checked: AtomicU64,
}

struct Shared {
    cache: DiscreteLogCache,
    warmed: bool,
}

pub struct DiscreteLogSolver {
    config: SearchConfig,
    shared: Mutex<Shared>,
    counters: Counters,
}

/// Candidate comparisons against one target.
struct Scan {
    target: Projective,
    checked: u64,
}

impl Scan {
    fn hit(&mut self, candidate: &Projective) -> bool {
        self.checked += 1;
        *candidate == self.target
    }
}

fn multiple(k: u64) -> Projective { Point::generator().mul_u64(k).projective() }

impl DiscreteLogSolver {
    pub fn new(config: SearchConfig) -> Self {
        let cache = DiscreteLogCache::new(config.cache_capacity);
        Self { config, shared: Mutex::new(Shared { cache, warmed: false }), counters: Counters::default() }
    }

    pub fn config(&self) -> &SearchConfig { &self.config }

    pub fn stats(&self) -> SolverStats {
        SolverStats {
            searches: self.counters.searches.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.counters.cache_misses.load(Ordering::Relaxed),
            points_checked: self.counters.points_checked.load(Ordering::Relaxed),
            cache_len: self.shared.lock().cache.len(),
        }
    }

    /// Find `m <= max_value` with `m·B == target`.
    pub fn solve(&self, target: &Point) -> Result<u64, BalanceError> {
        self.counters.searches.fetch_add(1, Ordering::Relaxed);
        {
            let mut shared = self.shared.lock();
            if !shared.warmed {
                self.warm(&mut shared.cache);
                shared.warmed = true;
            }
            if let Some(value) = shared.cache.get(target) {
                self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
                debug!(tier = SearchTier::Cache.as_str(), value, "discrete log resolved");
                return Ok(value);
            }
        }
        self.counters.cache_misses.fetch_add(1, Ordering::Relaxed);

        match self.search(target) {
            Some((value, tier)) => {
                self.shared.lock().cache.insert(*target, value);
                debug!(tier = tier.as_str(), value, "discrete log resolved");
                Ok(value)
            }
            None => {
                warn!(bound = self.config.max_value, "discrete log search exhausted");
                Err(BalanceError::BalanceUnresolved { bound: self.config.max_value })
            }
        }
    }

    fn warm(&self, cache: &mut DiscreteLogCache) {
        let max = self.config.max_value;
        let b = Point::generator().projective();
        let mut acc = Point::identity().projective();
        for v in 0..=WARM_SMALL.min(max) {
            if cache.is_full() {
                return;
            }
            cache.insert(Point::from(acc), v);
            acc += b;
        }
        let hundred = multiple(100);
        let mut v = 2 * 100;
        let mut acc = multiple(v);
        while v <= WARM_HUNDREDS_UP_TO.min(max) && !cache.is_full() {
            cache.insert(Point::from(acc), v);
            acc += hundred;
            v += 100;
        }
        debug!(entries = cache.len(), "discrete log cache warmed");
    }

    /// Already tried by the linear or round-value tiers.
    fn covered(&self, v: u64) -> bool {
        v <= self.config.small_range || ROUND_STEPS.iter().any(|s| v % s == 0)
    }

    pub(crate) fn search(&self, target: &Point) -> Option<(u64, SearchTier)> {
        let mut scan = Scan { target: target.projective(), checked: 0 };
        let found = self
            .linear(&mut scan)
            .map(|v| (v, SearchTier::Linear))
            .or_else(|| self.round_values(&mut scan).map(|v| (v, SearchTier::RoundValues)))
            .or_else(|| self.chunked(&mut scan).map(|v| (v, SearchTier::Chunked)))
            .or_else(|| self.exhaustive(&mut scan).map(|v| (v, SearchTier::Exhaustive)));
        self.counters.points_checked.fetch_add(scan.checked, Ordering::Relaxed);
        found
    }

    fn linear(&self, scan: &mut Scan) -> Option<u64> {
        let b = Point::generator().projective();
        let mut acc = Point::identity().projective();
        for v in 0..=self.config.small_range.min(self.config.max_value) {
            if scan.hit(&acc) {
                return Some(v);
            }
            acc += b;
        }
        None
    }

    fn round_values(&self, scan: &mut Scan) -> Option<u64> {
        let max = self.config.max_value;
        for (i, &step) in ROUND_STEPS.iter().enumerate() {
            let earlier = &ROUND_STEPS[..i];
            let step_point = multiple(step);
            let mut acc = step_point;
            let mut v = step;
            while v <= max {
                let fresh = v > self.config.small_range && !earlier.iter().any(|e| v % e == 0);
                if fresh && scan.hit(&acc) {
                    return Some(v);
                }
                acc += step_point;
                v = v.checked_add(step)?;
            }
        }
        None
    }

    fn chunked(&self, scan: &mut Scan) -> Option<u64> {
        let max = self.config.max_value;
        let chunk = self.config.chunk_size.max(1);
        let stride = self.config.stride.max(1);

        let chunk_point = multiple(chunk);
        let mut acc = Point::identity().projective();
        let mut start = 0u64;
        while start <= max {
            if !self.covered(start) && scan.hit(&acc) {
                return Some(start);
            }
            acc += chunk_point;
            start = match start.checked_add(chunk) {
                Some(s) => s,
                None => break,
            };
        }

        let stride_point = multiple(stride);
        let mut start = 0u64;
        while start <= max {
            let end = start.saturating_add(chunk - 1).min(max);
            let mut v = start.div_ceil(stride).saturating_mul(stride);
            let mut acc = multiple(v);
            while v <= end {
                if v != start && !self.covered(v) && scan.hit(&acc) {
                    return Some(v);
                }
                acc += stride_point;
                v = match v.checked_add(stride) {
                    Some(n) => n,
                    None => break,
                };
            }
            start = start.checked_add(chunk)?;
        }
        None
    }

    fn exhaustive(&self, scan: &mut Scan) -> Option<u64> {
        let max = self.config.max_value;
        let stride = self.config.stride.max(1);
        let from = self.config.small_range.checked_add(1)?;
        if from > max {
            return None;
        }
        let b = Point::generator().projective();
        let mut acc = multiple(from);
        for v in from..=max {
            if v % stride != 0 && !self.covered(v) && scan.hit(&acc) {
                return Some(v);
            }
            acc += b;
        }
        None
    }
}

impl Default for DiscreteLogSolver {
    fn default() -> Self { Self::new(SearchConfig::default()) }
}
