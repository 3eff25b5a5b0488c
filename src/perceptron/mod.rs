//! Multi-class averaged perceptron.
//!
//! An online linear classifier over sparse named features. Training is
//! mistake-driven: weights change only when the live prediction disagrees
//! with the true label, and the model served for inference is the
//! time-weighted average of every weight value held during training,
//! computed lazily from update-counter stamps.
//!
//! # Example
//!
//! ```
//! use ponderar::prelude::*;
//!
//! let data = vec![
//!     Example::from_pairs(&[("bad", 1.0)], "L0"),
//!     Example::from_pairs(&[("good", 1.0)], "L1"),
//!     Example::from_pairs(&[("bad", 1.0), ("good", 1.0)], "L1"),
//! ];
//!
//! let mut model = Perceptron::new().with_max_iterations(1);
//! assert_eq!(model.learn(&data).expect("two classes present"), 3);
//!
//! let query = Example::from_pairs(&[("bad", 1.0), ("good", 1.0)], "").features;
//! assert_eq!(model.predict(&query).expect("model is trained"), "L0");
//! ```

pub(crate) mod snapshot;
pub(crate) mod weights;

#[cfg(test)]
mod tests;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

use crate::error::{PonderarError, Result};
use self::weights::{AveragedSnapshot, WeightStore};

pub use self::weights::FeatureVector;

/// Sentinel label returned when no trained class scores at all.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Default number of training epochs.
pub const DEFAULT_MAX_ITERATIONS: usize = 9;

/// One training example: a sparse feature vector and its true class.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    /// Named feature signals; zero values carry no signal.
    pub features: FeatureVector,
    /// True class label.
    pub label: String,
}

impl Example {
    /// Creates an example from an already-built feature vector.
    pub fn new(features: FeatureVector, label: impl Into<String>) -> Self {
        Self {
            features,
            label: label.into(),
        }
    }

    /// Creates an example from `(name, value)` pairs.
    ///
    /// ```
    /// use ponderar::Example;
    ///
    /// let e = Example::from_pairs(&[("sl", 5.1), ("sw", 3.5)], "setosa");
    /// assert_eq!(e.features["sl"], 5.1);
    /// ```
    pub fn from_pairs(pairs: &[(&str, f64)], label: impl Into<String>) -> Self {
        Self {
            features: pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect(),
            label: label.into(),
        }
    }
}

/// A raw record prior to feature extraction, e.g. the fields of a CSV row.
pub type RawExample = Vec<String>;

/// Expands one raw record into its training examples.
pub type FeatureExtractor = fn(&[String]) -> Vec<Example>;

/// Re-applicable training settings.
///
/// `None` fields keep the value currently in force; `shuffle_data` is
/// plain `bool` and is always applied, so re-configuring with
/// `PerceptronConfig::default()` turns shuffling back off while leaving
/// the other settings untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerceptronConfig {
    /// Reshuffle the top-level example order after every epoch.
    pub shuffle_data: bool,
    /// Number of training epochs; must be at least 1 when set.
    pub max_iterations: Option<usize>,
    /// Switches learning into extracted mode (see [`Perceptron::learn_raw`]).
    pub feature_extractor: Option<FeatureExtractor>,
}

/// Multi-class averaged perceptron.
///
/// Each instance owns its entire learning state; instances never share
/// storage and the model is strictly single-threaded within an instance.
///
/// Lifecycle: a fresh instance must [`learn`](Self::learn) or
/// [`import_json`](Self::import_json) before it can
/// [`predict`](Self::predict). An imported instance refuses further
/// learning until [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct Perceptron {
    store: WeightStore,
    /// Present once training finalized or a snapshot was imported.
    averaged: Option<AveragedSnapshot>,
    examples_seen: usize,
    imported: bool,
    shuffle_data: bool,
    max_iterations: usize,
    feature_extractor: Option<FeatureExtractor>,
    random_state: Option<u64>,
}

impl Default for Perceptron {
    fn default() -> Self {
        Self::new()
    }
}

impl Perceptron {
    /// Creates an untrained perceptron with default settings: 9 epochs,
    /// no shuffling, no feature extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: WeightStore::default(),
            averaged: None,
            examples_seen: 0,
            imported: false,
            shuffle_data: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            feature_extractor: None,
            random_state: None,
        }
    }

    /// Sets whether the example order is reshuffled after every epoch.
    #[must_use]
    pub fn with_shuffle_data(mut self, shuffle: bool) -> Self {
        self.shuffle_data = shuffle;
        self
    }

    /// Sets the number of training epochs. Validated at learn time;
    /// must be at least 1.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the feature extractor used by [`learn_raw`](Self::learn_raw).
    #[must_use]
    pub fn with_feature_extractor(mut self, extractor: FeatureExtractor) -> Self {
        self.feature_extractor = Some(extractor);
        self
    }

    /// Seeds the shuffle order for reproducible shuffled runs.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Re-applies training settings.
    ///
    /// # Errors
    ///
    /// Returns [`PonderarError::InvalidHyperparameter`] when
    /// `max_iterations` is set to 0. Nothing is applied on error.
    pub fn configure(&mut self, config: &PerceptronConfig) -> Result<()> {
        if config.max_iterations == Some(0) {
            return Err(PonderarError::InvalidHyperparameter {
                param: "max_iterations".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }
        self.shuffle_data = config.shuffle_data;
        if let Some(max_iterations) = config.max_iterations {
            self.max_iterations = max_iterations;
        }
        if let Some(extractor) = config.feature_extractor {
            self.feature_extractor = Some(extractor);
        }
        Ok(())
    }

    /// Trains on direct examples for the configured number of epochs and
    /// finalizes the averaged snapshot.
    ///
    /// Returns the number of examples submitted.
    ///
    /// # Errors
    ///
    /// - [`PonderarError::AlreadyImported`] when the current state came
    ///   from a snapshot import (checked before any mutation).
    /// - [`PonderarError::InsufficientClasses`] when fewer than two
    ///   distinct labels were observed; this is detected only after the
    ///   full pass, which is not rolled back, though the instance does
    ///   not become trained.
    pub fn learn(&mut self, data: &[Example]) -> Result<usize> {
        self.check_learnable()?;
        let mut work: Vec<Example> = data.to_vec();
        let mut rng = self.shuffle_rng();
        for _ in 0..self.max_iterations {
            for example in &work {
                let guess = self.store.predict(&example.features);
                if guess.as_deref() != Some(example.label.as_str()) {
                    self.store
                        .apply_mistake(&example.features, &example.label, guess.as_deref());
                }
            }
            if let Some(rng) = rng.as_mut() {
                work.shuffle(rng);
            }
        }
        self.finish_learn(data.len())
    }

    /// Trains on raw records, expanding each through the configured
    /// feature extractor on every epoch. Shuffling permutes the raw rows,
    /// never the extracted sub-lists.
    ///
    /// Returns the number of raw records submitted, not the expanded
    /// example count.
    ///
    /// # Errors
    ///
    /// [`PonderarError::MissingFeatureExtractor`] when no extractor is
    /// configured, plus the same errors as [`learn`](Self::learn).
    pub fn learn_raw(&mut self, data: &[RawExample]) -> Result<usize> {
        let extractor = self
            .feature_extractor
            .ok_or(PonderarError::MissingFeatureExtractor)?;
        self.check_learnable()?;
        let mut work: Vec<RawExample> = data.to_vec();
        let mut rng = self.shuffle_rng();
        for _ in 0..self.max_iterations {
            for raw in &work {
                for example in extractor(raw) {
                    let guess = self.store.predict(&example.features);
                    if guess.as_deref() != Some(example.label.as_str()) {
                        self.store.apply_mistake(
                            &example.features,
                            &example.label,
                            guess.as_deref(),
                        );
                    }
                }
            }
            if let Some(rng) = rng.as_mut() {
                work.shuffle(rng);
            }
        }
        self.finish_learn(data.len())
    }

    /// Predicts the best-matching class from the averaged snapshot, or
    /// [`UNKNOWN_LABEL`] when the feature vector shares no nonzero
    /// feature with any trained weight row.
    ///
    /// # Errors
    ///
    /// [`PonderarError::NotTrained`] before any successful learn or
    /// import.
    pub fn predict(&self, features: &FeatureVector) -> Result<String> {
        let snapshot = self.averaged.as_ref().ok_or(PonderarError::NotTrained)?;
        Ok(snapshot
            .predict(features)
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string()))
    }

    /// Serializes the averaged snapshot as a 4-field JSON sequence.
    ///
    /// # Errors
    ///
    /// [`PonderarError::NothingToExport`] unless a learn call has
    /// succeeded on this instance.
    pub fn export_json(&self) -> Result<String> {
        if self.examples_seen == 0 {
            return Err(PonderarError::NothingToExport);
        }
        let snapshot = self.averaged.as_ref().ok_or(PonderarError::NothingToExport)?;
        snapshot::to_json(snapshot)
    }

    /// Installs a previously exported snapshot, replacing all current
    /// state. Learning is disallowed afterwards until [`reset`](Self::reset).
    ///
    /// # Errors
    ///
    /// Empty payloads, unparseable JSON, and structural mismatches are
    /// all rejected with the existing state left exactly as it was.
    pub fn import_json(&mut self, payload: &str) -> Result<()> {
        let snapshot = snapshot::from_json(payload)?;
        self.reset();
        self.averaged = Some(snapshot);
        self.imported = true;
        Ok(())
    }

    /// Clears all learning state while keeping the configured settings.
    /// Always succeeds.
    pub fn reset(&mut self) -> bool {
        self.store.clear();
        self.averaged = None;
        self.examples_seen = 0;
        self.imported = false;
        true
    }

    /// Raw examples submitted to the most recent successful learn call;
    /// 0 means never trained.
    #[must_use]
    pub fn examples_seen(&self) -> usize {
        self.examples_seen
    }

    /// Whether the current state came from a snapshot import.
    #[must_use]
    pub fn is_imported(&self) -> bool {
        self.imported
    }

    /// Total mistake-correction steps applied across all learn calls.
    #[must_use]
    pub fn updates(&self) -> u64 {
        self.store.updates()
    }

    /// Number of training epochs currently in force.
    #[must_use]
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Whether post-epoch shuffling is currently enabled.
    #[must_use]
    pub fn shuffle_data(&self) -> bool {
        self.shuffle_data
    }

    fn check_learnable(&self) -> Result<()> {
        if self.imported {
            return Err(PonderarError::AlreadyImported);
        }
        if self.max_iterations == 0 {
            return Err(PonderarError::InvalidHyperparameter {
                param: "max_iterations".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }
        Ok(())
    }

    fn finish_learn(&mut self, raw_count: usize) -> Result<usize> {
        let found = self.store.n_classes();
        if found < 2 {
            return Err(PonderarError::InsufficientClasses { found });
        }
        self.averaged = Some(self.store.finalize());
        self.examples_seen = raw_count;
        Ok(raw_count)
    }

    /// One rng for the whole learn call, so a seeded run replays the same
    /// sequence of epoch permutations.
    fn shuffle_rng(&self) -> Option<Box<dyn RngCore>> {
        if !self.shuffle_data {
            return None;
        }
        let rng: Box<dyn RngCore> = match self.random_state {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(rand::thread_rng()),
        };
        Some(rng)
    }
}
