//! Validated configuration for [`crate::Knn`] runs.

use std::num::NonZeroUsize;

use crate::{
    error::{KnnError, Result},
    sampler::SamplerKind,
};

/// Configures and validates a [`KnnConfig`].
///
/// # Examples
/// ```
/// use simgraph_core::{KnnConfigBuilder, SamplerKind};
///
/// let config = KnnConfigBuilder::new()
///     .with_top_k(5)
///     .with_sampler(SamplerKind::RandomWalk)
///     .with_random_seed(Some(42))
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(config.top_k().get(), 5);
/// assert_eq!(config.random_seed(), Some(42));
/// ```
#[derive(Debug, Clone)]
pub struct KnnConfigBuilder {
    top_k: usize,
    sample_rate: f64,
    delta_threshold: f64,
    max_iterations: usize,
    random_joins: usize,
    perturbation_rate: f64,
    similarity_cutoff: f64,
    sampler: SamplerKind,
    random_seed: Option<u64>,
    concurrency: usize,
    min_batch_size: usize,
}

impl Default for KnnConfigBuilder {
    fn default() -> Self {
        Self {
            top_k: 10,
            sample_rate: 0.5,
            delta_threshold: 0.001,
            max_iterations: 100,
            random_joins: 10,
            perturbation_rate: 0.0,
            similarity_cutoff: 0.0,
            sampler: SamplerKind::Uniform,
            random_seed: None,
            concurrency: 4,
            min_batch_size: 1000,
        }
    }
}

impl KnnConfigBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use simgraph_core::KnnConfigBuilder;
    ///
    /// let builder = KnnConfigBuilder::new();
    /// assert_eq!(builder.top_k(), 10);
    /// assert_eq!(builder.max_iterations(), 100);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of neighbours kept per node.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the fraction of each list sampled per iteration.
    #[must_use]
    pub fn with_sample_rate(mut self, rate: f64) -> Self {
        self.sample_rate = rate;
        self
    }

    /// Sets the fraction of possible updates below which the run converges.
    #[must_use]
    pub fn with_delta_threshold(mut self, threshold: f64) -> Self {
        self.delta_threshold = threshold;
        self
    }

    /// Caps the number of refinement iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the number of random joins attempted per node and iteration.
    #[must_use]
    pub fn with_random_joins(mut self, joins: usize) -> Self {
        self.random_joins = joins;
        self
    }

    /// Sets the probability of replacing the worst neighbour on a tie.
    #[must_use]
    pub fn with_perturbation_rate(mut self, rate: f64) -> Self {
        self.perturbation_rate = rate;
        self
    }

    /// Sets the minimum similarity kept in the final result; `0` disables it.
    #[must_use]
    pub fn with_similarity_cutoff(mut self, cutoff: f64) -> Self {
        self.similarity_cutoff = cutoff;
        self
    }

    /// Selects the initial neighbour sampler.
    #[must_use]
    pub fn with_sampler(mut self, sampler: SamplerKind) -> Self {
        self.sampler = sampler;
        self
    }

    /// Fixes the run-level seed; `None` draws one from OS entropy.
    #[must_use]
    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        self.random_seed = seed;
        self
    }

    /// Sets the number of worker threads.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the smallest node range handed to one task.
    #[must_use]
    pub fn with_min_batch_size(mut self, size: usize) -> Self {
        self.min_batch_size = size;
        self
    }

    /// Returns the configured neighbour count.
    #[must_use]
    #[rustfmt::skip]
    pub fn top_k(&self) -> usize { self.top_k }

    /// Returns the configured iteration cap.
    #[must_use]
    #[rustfmt::skip]
    pub fn max_iterations(&self) -> usize { self.max_iterations }

    /// Returns the configured sampler.
    #[must_use]
    #[rustfmt::skip]
    pub fn sampler(&self) -> SamplerKind { self.sampler }

    /// Validates every field and constructs a [`KnnConfig`].
    ///
    /// # Errors
    /// Returns the [`KnnError`] configuration variant naming the first
    /// invalid field.
    ///
    /// # Examples
    /// ```
    /// use simgraph_core::{KnnConfigBuilder, KnnError};
    ///
    /// let err = KnnConfigBuilder::new().with_top_k(0).build().unwrap_err();
    /// assert_eq!(err, KnnError::InvalidTopK { got: 0 });
    /// ```
    pub fn build(self) -> Result<KnnConfig> {
        let top_k = NonZeroUsize::new(self.top_k).ok_or(KnnError::InvalidTopK { got: self.top_k })?;
        if !(self.sample_rate > 0.0 && self.sample_rate <= 1.0) {
            return Err(KnnError::InvalidSampleRate {
                got: self.sample_rate,
            });
        }
        if !(self.delta_threshold > 0.0 && self.delta_threshold <= 1.0) {
            return Err(KnnError::InvalidDeltaThreshold {
                got: self.delta_threshold,
            });
        }
        if !(0.0..=1.0).contains(&self.perturbation_rate) {
            return Err(KnnError::InvalidPerturbationRate {
                got: self.perturbation_rate,
            });
        }
        if !(self.similarity_cutoff.is_finite() && self.similarity_cutoff >= 0.0) {
            return Err(KnnError::InvalidSimilarityCutoff {
                got: self.similarity_cutoff,
            });
        }
        let concurrency = NonZeroUsize::new(self.concurrency).ok_or(KnnError::InvalidConcurrency {
            got: self.concurrency,
        })?;
        let min_batch_size =
            NonZeroUsize::new(self.min_batch_size).ok_or(KnnError::InvalidMinBatchSize {
                got: self.min_batch_size,
            })?;

        Ok(KnnConfig {
            top_k,
            sample_rate: self.sample_rate,
            delta_threshold: self.delta_threshold,
            max_iterations: self.max_iterations,
            random_joins: self.random_joins,
            perturbation_rate: self.perturbation_rate,
            similarity_cutoff: self.similarity_cutoff,
            sampler: self.sampler,
            random_seed: self.random_seed,
            concurrency,
            min_batch_size,
        })
    }
}

/// Immutable, validated parameters of a KNN run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KnnConfig {
    top_k: NonZeroUsize,
    sample_rate: f64,
    delta_threshold: f64,
    max_iterations: usize,
    random_joins: usize,
    perturbation_rate: f64,
    similarity_cutoff: f64,
    sampler: SamplerKind,
    random_seed: Option<u64>,
    concurrency: NonZeroUsize,
    min_batch_size: NonZeroUsize,
}

impl Default for KnnConfig {
    fn default() -> Self {
        let defaults = KnnConfigBuilder::default();
        let one = NonZeroUsize::MIN;
        Self {
            top_k: NonZeroUsize::new(defaults.top_k).unwrap_or(one),
            sample_rate: defaults.sample_rate,
            delta_threshold: defaults.delta_threshold,
            max_iterations: defaults.max_iterations,
            random_joins: defaults.random_joins,
            perturbation_rate: defaults.perturbation_rate,
            similarity_cutoff: defaults.similarity_cutoff,
            sampler: defaults.sampler,
            random_seed: defaults.random_seed,
            concurrency: NonZeroUsize::new(defaults.concurrency).unwrap_or(one),
            min_batch_size: NonZeroUsize::new(defaults.min_batch_size).unwrap_or(one),
        }
    }
}

impl KnnConfig {
    /// Returns the number of neighbours kept per node.
    #[must_use]
    #[rustfmt::skip]
    pub fn top_k(&self) -> NonZeroUsize { self.top_k }

    /// Returns the per-iteration sample rate.
    #[must_use]
    #[rustfmt::skip]
    pub fn sample_rate(&self) -> f64 { self.sample_rate }

    /// Returns the convergence threshold.
    #[must_use]
    #[rustfmt::skip]
    pub fn delta_threshold(&self) -> f64 { self.delta_threshold }

    /// Returns the iteration cap.
    #[must_use]
    #[rustfmt::skip]
    pub fn max_iterations(&self) -> usize { self.max_iterations }

    /// Returns the random joins attempted per node and iteration.
    #[must_use]
    #[rustfmt::skip]
    pub fn random_joins(&self) -> usize { self.random_joins }

    /// Returns the tie replacement probability.
    #[must_use]
    #[rustfmt::skip]
    pub fn perturbation_rate(&self) -> f64 { self.perturbation_rate }

    /// Returns the final similarity cutoff; `0` means disabled.
    #[must_use]
    #[rustfmt::skip]
    pub fn similarity_cutoff(&self) -> f64 { self.similarity_cutoff }

    /// Returns the initial neighbour sampler.
    #[must_use]
    #[rustfmt::skip]
    pub fn sampler(&self) -> SamplerKind { self.sampler }

    /// Returns the run-level seed, if fixed.
    #[must_use]
    #[rustfmt::skip]
    pub fn random_seed(&self) -> Option<u64> { self.random_seed }

    /// Returns the worker thread count.
    #[must_use]
    #[rustfmt::skip]
    pub fn concurrency(&self) -> NonZeroUsize { self.concurrency }

    /// Returns the smallest node range handed to one task.
    #[must_use]
    #[rustfmt::skip]
    pub fn min_batch_size(&self) -> NonZeroUsize { self.min_batch_size }

    /// Returns the maximum number of accepted updates that still counts as
    /// convergence for `node_count` nodes.
    ///
    /// Computed as `floor(delta_threshold * ceil(sample_rate * top_k * node_count))`.
    ///
    /// # Examples
    /// ```
    /// use simgraph_core::KnnConfigBuilder;
    ///
    /// let config = KnnConfigBuilder::new()
    ///     .with_top_k(10)
    ///     .with_sample_rate(0.5)
    ///     .with_delta_threshold(0.01)
    ///     .build()
    ///     .expect("configuration is valid");
    /// assert_eq!(config.update_threshold(1_000), 50);
    /// ```
    #[must_use]
    pub fn update_threshold(&self, node_count: usize) -> u64 {
        let possible = (self.sample_rate * self.top_k.get() as f64 * node_count as f64).ceil();
        (self.delta_threshold * possible).floor() as u64
    }
}
