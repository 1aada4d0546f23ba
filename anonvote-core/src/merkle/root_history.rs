use ark_bls12_381::Fr as F;
use ark_ff::Zero;
use std::collections::VecDeque;

/// Number of recent roots remembered by default
pub const DEFAULT_ROOT_HISTORY_SIZE: usize = 30;

/// Largest history accepted from configuration or a snapshot
pub const MAX_ROOT_HISTORY_SIZE: usize = 1 << 16;

/// Bounded ring of the most recent tree roots.
///
/// Lets a verifier accept a proof built against a root that has since been
/// superseded by a few more inserts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootHistory {
    capacity: usize,
    roots: VecDeque<F>,
}

impl RootHistory {
    /// `capacity` is clamped to `1..=MAX_ROOT_HISTORY_SIZE`
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.clamp(1, MAX_ROOT_HISTORY_SIZE),
            roots: VecDeque::new(),
        }
    }

    /// Forget every root except `root`
    pub fn reset(&mut self, root: F) {
        self.roots.clear();
        self.roots.push_back(root);
    }

    pub fn push(&mut self, root: F) {
        if self.roots.len() == self.capacity {
            self.roots.pop_front();
        }
        self.roots.push_back(root);
    }

    /// The zero root is never known
    pub fn is_known_root(&self, root: &F) -> bool {
        !root.is_zero() && self.roots.contains(root)
    }

    pub fn latest(&self) -> Option<F> {
        self.roots.back().copied()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn roots(&self) -> impl Iterator<Item = &F> {
        self.roots.iter()
    }
}

impl Default for RootHistory {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_HISTORY_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_eviction() {
        let mut history = RootHistory::new(3);
        for i in 1..=4u64 {
            history.push(F::from(i));
        }

        assert!(!history.is_known_root(&F::from(1u64)));
        for i in 2..=4u64 {
            assert!(history.is_known_root(&F::from(i)));
        }
        assert_eq!(history.latest(), Some(F::from(4u64)));
        assert_eq!(history.roots().count(), 3);
    }

    #[test]
    fn test_zero_root_never_known() {
        let mut history = RootHistory::new(2);
        history.push(F::zero());
        assert!(!history.is_known_root(&F::zero()));
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut history = RootHistory::new(0);
        history.push(F::from(9u64));
        assert_eq!(history.capacity(), 1);
        assert!(history.is_known_root(&F::from(9u64)));
    }

    #[test]
    fn test_huge_capacity_clamped() {
        let mut history = RootHistory::new(usize::MAX);
        history.push(F::from(9u64));
        assert_eq!(history.capacity(), MAX_ROOT_HISTORY_SIZE);
        assert_eq!(history.roots().count(), 1);
    }

    #[test]
    fn test_reset_keeps_only_given_root() {
        let mut history = RootHistory::new(4);
        for i in 1..=3u64 {
            history.push(F::from(i));
        }
        history.reset(F::from(7u64));

        assert_eq!(history.roots().copied().collect::<Vec<_>>(), vec![F::from(7u64)]);
        assert!(!history.is_known_root(&F::from(3u64)));
        assert_eq!(history.capacity(), 4);
    }
}
