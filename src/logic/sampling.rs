use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the uniform picks used when nothing has been pinned.
pub trait Sampler: Send + Sync {
    /// Pick an index in `0..len`, or `None` when there is nothing to pick from
    fn pick(&self, len: usize) -> Option<usize>;
}

/// Pick one element of `items` with `sampler`.
pub fn choose<'a, T>(sampler: &dyn Sampler, items: &'a [T]) -> Option<&'a T> {
    sampler.pick(items.len()).and_then(|index| items.get(index))
}

/// Uniform picks from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSampler;

impl Sampler for ThreadRngSampler {
    fn pick(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(rand::rng().random_range(0..len))
    }
}

/// Reproducible picks from a seeded generator shared across threads.
#[derive(Debug)]
pub struct SeededSampler {
    rng: Mutex<StdRng>,
}

impl SeededSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Sampler for SeededSampler {
    fn pick(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.rng.lock().random_range(0..len))
    }
}

/// Always picks the same index, clamped to the last element.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedSampler(pub usize);

impl Sampler for FixedSampler {
    fn pick(&self, len: usize) -> Option<usize> {
        len.checked_sub(1).map(|last| self.0.min(last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sets_yield_nothing() {
        let items: [u8; 0] = [];
        assert_eq!(choose(&ThreadRngSampler, &items), None);
        assert_eq!(choose(&SeededSampler::new(7), &items), None);
        assert_eq!(choose(&FixedSampler(3), &items), None);
    }

    #[test]
    fn test_thread_rng_stays_in_range() {
        for _ in 0..200 {
            assert!(ThreadRngSampler.pick(3).unwrap() < 3);
        }
    }

    #[test]
    fn test_seeded_sampler_is_reproducible() {
        let a = SeededSampler::new(42);
        let b = SeededSampler::new(42);
        let first: Vec<_> = (0..32).map(|_| a.pick(10)).collect();
        let second: Vec<_> = (0..32).map(|_| b.pick(10)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fixed_sampler_clamps() {
        assert_eq!(choose(&FixedSampler(5), &["a", "b"]), Some(&"b"));
        assert_eq!(choose(&FixedSampler(0), &["a", "b"]), Some(&"a"));
    }
}
