//! Bounded per-node candidate list used by the NN-Descent engine.
//!
//! Entries are kept ordered from most to least similar so the worst candidate
//! sits at the tail and insertion positions are found with a binary search.
//! A full list only admits a newcomer that beats the tail, or, with
//! probability `perturbation_rate`, one that ties it. The tie rule keeps the
//! search moving on plateaus where many candidates share a score.

use rand::{Rng, distributions::Standard};

/// A candidate neighbour and its similarity to the list owner.
///
/// # Examples
/// ```
/// use simgraph_core::Neighbour;
///
/// let neighbour = Neighbour::new(3, 0.75);
/// assert_eq!(neighbour.id(), 3);
/// assert_eq!(neighbour.similarity(), 0.75);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Neighbour {
    id: usize,
    similarity: f64,
}

impl Neighbour {
    /// Creates a neighbour record.
    #[must_use]
    #[rustfmt::skip]
    pub fn new(id: usize, similarity: f64) -> Self { Self { id, similarity } }

    /// Returns the neighbour's node id.
    #[must_use]
    #[rustfmt::skip]
    pub fn id(&self) -> usize { self.id }

    /// Returns the similarity between the list owner and this neighbour.
    #[must_use]
    #[rustfmt::skip]
    pub fn similarity(&self) -> f64 { self.similarity }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Entry {
    neighbour: Neighbour,
    explored: bool,
}

/// Fixed-capacity list of the most similar candidates found for one node.
///
/// The list never holds its owner and never holds the same id twice. Callers
/// that share lists between threads wrap each one in its own lock.
///
/// # Examples
/// ```
/// use rand::{SeedableRng, rngs::SmallRng};
/// use simgraph_core::NeighbourList;
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let mut list = NeighbourList::new(0, 2);
/// assert_eq!(list.add(1, 0.2, &mut rng, 0.0), 1);
/// assert_eq!(list.add(2, 0.9, &mut rng, 0.0), 1);
/// assert_eq!(list.add(3, 0.1, &mut rng, 0.0), 0);
/// assert_eq!(list.ids().collect::<Vec<_>>(), [2, 1]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct NeighbourList {
    owner: usize,
    capacity: usize,
    entries: Vec<Entry>,
}

impl NeighbourList {
    /// Creates an empty list for `owner` holding at most `capacity` entries.
    #[must_use]
    pub fn new(owner: usize, capacity: usize) -> Self {
        Self {
            owner,
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Offers `id` as a neighbour, returning `1` when the list changed.
    ///
    /// Self-loops and ids already present are ignored. While the list has
    /// spare capacity every candidate is admitted. Once full, a candidate
    /// strictly more similar than the current worst entry replaces it, and a
    /// candidate tying the worst entry replaces it with probability
    /// `perturbation_rate`.
    pub fn add<R: Rng + ?Sized>(
        &mut self,
        id: usize,
        similarity: f64,
        rng: &mut R,
        perturbation_rate: f64,
    ) -> u64 {
        self.insert(id, similarity, || {
            perturbation_rate > 0.0 && rng.sample::<f64, _>(Standard) < perturbation_rate
        })
    }

    /// Offers `id` like [`NeighbourList::add`] with a zero perturbation rate:
    /// a candidate tying a full list's worst entry is rejected.
    pub fn add_keeping_ties(&mut self, id: usize, similarity: f64) -> u64 {
        self.insert(id, similarity, || false)
    }

    fn insert(&mut self, id: usize, similarity: f64, replace_tie: impl FnOnce() -> bool) -> u64 {
        if id == self.owner || self.capacity == 0 || self.contains(id) {
            return 0;
        }
        if self.entries.len() >= self.capacity {
            let Some(worst) = self.entries.last() else {
                return 0;
            };
            let worst = worst.neighbour.similarity;
            let accepted = similarity > worst || (similarity == worst && replace_tie());
            if !accepted {
                return 0;
            }
            self.entries.pop();
        }
        let position = self
            .entries
            .partition_point(|entry| entry.neighbour.similarity >= similarity);
        self.entries.insert(
            position,
            Entry {
                neighbour: Neighbour::new(id, similarity),
                explored: false,
            },
        );
        1
    }

    /// Removes every entry whose similarity is below `cutoff`.
    pub fn filter_high_similarity_results(&mut self, cutoff: f64) {
        self.entries
            .retain(|entry| entry.neighbour.similarity >= cutoff);
    }

    /// Splits the list into previously explored ids (`old`) and a Bernoulli
    /// sample of unexplored ids (`new`).
    ///
    /// Each unexplored entry is selected with probability `sampled_k / len`;
    /// selected entries are marked explored so later splits report them as
    /// old. Unselected entries stay unexplored.
    pub(crate) fn split_old_new<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        sampled_k: usize,
        old: &mut Vec<usize>,
        new: &mut Vec<usize>,
    ) {
        let len = self.entries.len();
        for entry in &mut self.entries {
            if entry.explored {
                old.push(entry.neighbour.id);
            } else if rng.gen_range(0..len) < sampled_k {
                entry.explored = true;
                new.push(entry.neighbour.id);
            }
        }
    }

    /// Returns whether `id` is currently held.
    #[must_use]
    pub fn contains(&self, id: usize) -> bool {
        self.entries.iter().any(|entry| entry.neighbour.id == id)
    }

    /// Returns the node that owns this list.
    #[must_use]
    #[rustfmt::skip]
    pub fn owner(&self) -> usize { self.owner }

    /// Returns the maximum number of entries.
    #[must_use]
    #[rustfmt::skip]
    pub fn capacity(&self) -> usize { self.capacity }

    /// Returns the number of entries held.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Returns whether the list holds no entries.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Iterates over the neighbours from most to least similar.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Neighbour> + '_ {
        self.entries.iter().map(|entry| entry.neighbour)
    }

    /// Iterates over the neighbour ids from most to least similar.
    pub fn ids(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.entries.iter().map(|entry| entry.neighbour.id)
    }

    /// Iterates over the similarities in descending order.
    pub fn similarities(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.entries.iter().map(|entry| entry.neighbour.similarity)
    }
}
