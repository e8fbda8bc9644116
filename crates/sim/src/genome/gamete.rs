use crate::base::{Mutation, MutationKey};

/// Index of a gamete in a population's gamete pool.
pub type GameteKey = usize;

/// A haploid genome shared by every chromosome that carries it.
///
/// Mutation keys are split into neutral and selected lists, each kept
/// sorted by mutation position. `count` is the number of chromosomes in
/// the current generation that carry exactly this gamete; a gamete with
/// `count == 0` is extinct and its slot may be reused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gamete {
    count: u32,
    neutral: Vec<MutationKey>,
    selected: Vec<MutationKey>,
}

impl Gamete {
    /// Create a gamete with the given carrier count and no mutations.
    pub fn new(count: u32) -> Self {
        Self {
            count,
            neutral: Vec::new(),
            selected: Vec::new(),
        }
    }

    /// Create a gamete from already position-sorted key lists.
    pub fn from_keys(count: u32, neutral: Vec<MutationKey>, selected: Vec<MutationKey>) -> Self {
        Self {
            count,
            neutral,
            selected,
        }
    }

    /// Number of chromosomes carrying this gamete.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether no chromosome carries this gamete.
    #[inline]
    pub fn is_extinct(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub(crate) fn set_count(&mut self, count: u32) {
        self.count = count;
    }

    #[inline]
    pub(crate) fn increment(&mut self) {
        self.count += 1;
    }

    #[inline]
    pub(crate) fn decrement(&mut self) {
        self.count -= 1;
    }

    /// Keys of neutral mutations, sorted by position.
    #[inline]
    pub fn neutral(&self) -> &[MutationKey] {
        &self.neutral
    }

    /// Keys of selected mutations, sorted by position.
    #[inline]
    pub fn selected(&self) -> &[MutationKey] {
        &self.selected
    }

    /// Total number of mutations carried.
    pub fn len(&self) -> usize {
        self.neutral.len() + self.selected.len()
    }

    /// Whether the gamete carries no mutations.
    pub fn is_empty(&self) -> bool {
        self.neutral.is_empty() && self.selected.is_empty()
    }

    /// Iterate over all mutation keys, neutral first.
    pub fn keys(&self) -> impl Iterator<Item = MutationKey> + '_ {
        self.neutral.iter().chain(self.selected.iter()).copied()
    }

    /// Insert a mutation key, keeping the matching list position-sorted.
    pub fn insert(&mut self, key: MutationKey, mutations: &[Mutation]) {
        let mutation = &mutations[key as usize];
        let list = if mutation.neutral {
            &mut self.neutral
        } else {
            &mut self.selected
        };
        let at = list.partition_point(|&k| mutations[k as usize].position < mutation.position);
        list.insert(at, key);
    }

    /// Keep only the keys for which `keep` returns true.
    pub fn retain<F: FnMut(MutationKey) -> bool>(&mut self, mut keep: F) {
        self.neutral.retain(|&k| keep(k));
        self.selected.retain(|&k| keep(k));
    }

    /// Whether two gametes carry the same mutations.
    pub fn same_mutations(&self, other: &Gamete) -> bool {
        self.neutral == other.neutral && self.selected == other.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<Mutation> {
        vec![
            Mutation::neutral(0.5, 0),
            Mutation::neutral(0.1, 0),
            Mutation::selected(0.3, -0.1, 0.5, 0),
            Mutation::neutral(0.9, 0),
            Mutation::selected(0.2, -0.2, 0.5, 0),
        ]
    }

    #[test]
    fn test_new_is_empty() {
        let g = Gamete::new(4);
        assert_eq!(g.count(), 4);
        assert!(g.is_empty());
        assert!(!g.is_extinct());
    }

    #[test]
    fn test_insert_keeps_position_order() {
        let mutations = table();
        let mut g = Gamete::new(1);
        for key in 0..5 {
            g.insert(key, &mutations);
        }
        assert_eq!(g.neutral(), &[1, 0, 3]);
        assert_eq!(g.selected(), &[4, 2]);
        assert_eq!(g.len(), 5);
    }

    #[test]
    fn test_retain() {
        let mutations = table();
        let mut g = Gamete::new(1);
        for key in 0..5 {
            g.insert(key, &mutations);
        }
        g.retain(|k| k != 0 && k != 2);
        assert_eq!(g.neutral(), &[1, 3]);
        assert_eq!(g.selected(), &[4]);
    }

    #[test]
    fn test_counts() {
        let mut g = Gamete::new(0);
        assert!(g.is_extinct());
        g.increment();
        g.increment();
        g.decrement();
        assert_eq!(g.count(), 1);
    }

    #[test]
    fn test_same_mutations_ignores_count() {
        let a = Gamete::from_keys(3, vec![1, 2], vec![]);
        let b = Gamete::from_keys(7, vec![1, 2], vec![]);
        assert!(a.same_mutations(&b));
        assert_ne!(a, b);
    }
}
