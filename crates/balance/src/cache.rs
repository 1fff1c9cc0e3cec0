//! Bounded point -> amount map with FIFO eviction.
//!
//! Backed by an `LruCache` that is only ever read with `peek`, so recency is
//! never refreshed and the least recently *inserted* entry goes first.

use std::num::NonZeroUsize;

use lru::LruCache;
use primitives::curve::Point;

#[derive(Debug)]
pub struct DiscreteLogCache {
    capacity: usize,
    /// `None` for a zero-capacity cache.
    entries: Option<LruCache<Point, u64>>,
}

impl DiscreteLogCache {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, entries: NonZeroUsize::new(capacity).map(LruCache::new) }
    }

    pub fn get(&self, point: &Point) -> Option<u64> { self.entries.as_ref()?.peek(point).copied() }

    /// Insert a solved point; the oldest entry is evicted once full.
    pub fn insert(&mut self, point: Point, value: u64) {
        let Some(entries) = self.entries.as_mut() else { return };
        if entries.contains(&point) {
            return;
        }
        entries.push(point, value);
    }

    pub fn len(&self) -> usize { self.entries.as_ref().map_or(0, LruCache::len) }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn capacity(&self) -> usize { self.capacity }

    pub fn is_full(&self) -> bool { self.len() >= self.capacity }

    pub fn clear(&mut self) {
        if let Some(entries) = self.entries.as_mut() {
            entries.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(k: u64) -> Point { Point::generator().mul_u64(k) }

    #[test]
    fn evicts_oldest_first() {
        let mut c = DiscreteLogCache::new(2);
        c.insert(pt(1), 1);
        c.insert(pt(2), 2);
        c.insert(pt(3), 3);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(&pt(1)), None);
        assert_eq!(c.get(&pt(2)), Some(2));
        assert_eq!(c.get(&pt(3)), Some(3));
    }

    #[test]
    fn reinsert_does_not_duplicate() {
        let mut c = DiscreteLogCache::new(3);
        c.insert(pt(5), 5);
        c.insert(pt(5), 5);
        assert_eq!(c.len(), 1);
        c.insert(pt(6), 6);
        c.insert(pt(7), 7);
        c.insert(pt(8), 8);
        assert_eq!(c.get(&pt(5)), None);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn lookups_do_not_refresh_age() {
        let mut c = DiscreteLogCache::new(2);
        c.insert(pt(1), 1);
        c.insert(pt(2), 2);
        assert_eq!(c.get(&pt(1)), Some(1));
        c.insert(pt(3), 3);
        assert_eq!(c.get(&pt(1)), None);
        assert_eq!(c.get(&pt(2)), Some(2));
        assert!(c.is_full());
        c.clear();
        assert!(c.is_empty());
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut c = DiscreteLogCache::new(0);
        c.insert(pt(1), 1);
        assert!(c.is_empty());
    }
}
