//! Bounded free-list allocator for high-churn value objects
//!
//! Objects move out of the pool on `acquire` and back in on `release`, so
//! ownership alone guarantees an instance is never both live and free.

/// A type the pool can hand out and recycle
pub trait Poolable {
    /// Build a brand new instance (free list was empty)
    fn fresh() -> Self;
    /// Restore the fields acquirers rely on being freshly initialized.
    /// Fields every acquirer overwrites unconditionally may be left alone.
    fn reset(&mut self);
}

/// Allocation counters, mostly for debugging overlays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub created: u64,
    pub reused: u64,
    pub discarded: u64,
}

#[derive(Debug)]
pub struct ObjectPool<T: Poolable> {
    free: Vec<T>,
    max_size: usize,
    stats: PoolStats,
}

impl<T: Poolable> ObjectPool<T> {
    pub fn new(max_size: usize) -> Self {
        Self {
            free: Vec::with_capacity(max_size.min(256)),
            max_size,
            stats: PoolStats::default(),
        }
    }

    /// Take an instance, reusing a released one when available
    pub fn acquire(&mut self) -> T {
        match self.free.pop() {
            Some(obj) => {
                self.stats.reused += 1;
                obj
            }
            None => {
                self.stats.created += 1;
                T::fresh()
            }
        }
    }

    /// Reset and return an instance. Dropped if the pool is already full.
    pub fn release(&mut self, mut obj: T) {
        if self.free.len() >= self.max_size {
            self.stats.discarded += 1;
            return;
        }
        obj.reset();
        self.free.push(obj);
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Shrink or grow the cap (quality preset change). Excess instances are dropped.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        self.free.truncate(max_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug)]
    struct Spark {
        life: f32,
        opacity: f32,
        tag: u32,
    }

    impl Poolable for Spark {
        fn fresh() -> Self {
            Self {
                life: 1.0,
                opacity: 1.0,
                tag: 0,
            }
        }

        fn reset(&mut self) {
            self.life = 1.0;
            self.opacity = 1.0;
        }
    }

    #[test]
    fn test_acquire_creates_when_empty() {
        let mut pool: ObjectPool<Spark> = ObjectPool::new(4);
        let spark = pool.acquire();
        assert_eq!(spark.life, 1.0);
        assert_eq!(pool.stats().created, 1);
    }

    #[test]
    fn test_release_resets_life_and_opacity() {
        let mut pool: ObjectPool<Spark> = ObjectPool::new(4);
        let mut spark = pool.acquire();
        spark.life = -0.2;
        spark.opacity = 0.0;
        spark.tag = 7;
        pool.release(spark);

        let reused = pool.acquire();
        assert_eq!(reused.life, 1.0);
        assert_eq!(reused.opacity, 1.0);
        // identity fields are the acquirer's job
        assert_eq!(reused.tag, 7);
        assert_eq!(pool.stats().reused, 1);
    }

    #[test]
    fn test_release_beyond_capacity_discards() {
        let mut pool: ObjectPool<Spark> = ObjectPool::new(2);
        let items: Vec<_> = (0..3).map(|_| pool.acquire()).collect();
        for item in items {
            pool.release(item);
        }
        assert_eq!(pool.free_len(), 2);
        assert_eq!(pool.stats().discarded, 1);
    }

    #[test]
    fn test_set_max_size_truncates() {
        let mut pool: ObjectPool<Spark> = ObjectPool::new(8);
        let items: Vec<_> = (0..6).map(|_| pool.acquire()).collect();
        for item in items {
            pool.release(item);
        }
        pool.set_max_size(3);
        assert_eq!(pool.free_len(), 3);
    }

    proptest! {
        #[test]
        fn prop_pool_never_exceeds_max(
            max in 0usize..16,
            ops in prop::collection::vec(any::<bool>(), 0..200)
        ) {
            let mut pool: ObjectPool<Spark> = ObjectPool::new(max);
            let mut live = Vec::new();
            for acquire in ops {
                if acquire || live.is_empty() {
                    let mut s = pool.acquire();
                    prop_assert_eq!(s.life, 1.0);
                    prop_assert_eq!(s.opacity, 1.0);
                    s.life = 0.0;
                    s.opacity = 0.0;
                    live.push(s);
                } else if let Some(s) = live.pop() {
                    pool.release(s);
                }
                prop_assert!(pool.free_len() <= max);
            }
        }
    }
}
