//! Sparse weight storage and the lazy averaging engine.
//!
//! Weights live in a feature × class matrix keyed by name; an absent
//! entry reads as 0. Averaging uses update-counter stamps so that the
//! time-weighted average can be reconstructed in O(touched entries)
//! instead of re-summing the whole matrix on every example: each entry
//! remembers the counter value at which it last changed, and the running
//! sum absorbs `(now - last) * held_value` just before the change.

use std::collections::BTreeMap;

/// Sparse mapping from feature name to signal strength. Zero-valued or
/// absent entries carry no signal and never touch the weights.
pub type FeatureVector = BTreeMap<String, f64>;

/// Feature name → class label → weight.
pub(crate) type WeightMatrix = BTreeMap<String, BTreeMap<String, f64>>;

/// Class label → bias.
pub(crate) type BiasVector = BTreeMap<String, f64>;

/// Live weights, biases, and the bookkeeping needed to average them.
///
/// All mutation goes through [`apply_mistake`](WeightStore::apply_mistake)
/// so the counter-and-stamp accounting stays consistent; there is no
/// direct write access to individual weights.
#[derive(Debug, Clone, Default)]
pub(crate) struct WeightStore {
    weights: WeightMatrix,
    biases: BiasVector,
    /// Time-integral of past weight values, keyed like `weights`.
    sum_of_weights: WeightMatrix,
    sum_of_biases: BiasVector,
    /// Update count at which each weight last changed; 0 = never.
    last_weight_update: BTreeMap<String, BTreeMap<String, u64>>,
    last_bias_update: BTreeMap<String, u64>,
    /// Global mistake counter; increments once per mistake-correction step.
    updates: u64,
}

impl WeightStore {
    /// Number of mistake-correction steps applied so far.
    pub(crate) fn updates(&self) -> u64 {
        self.updates
    }

    /// Distinct class labels that have ever received a bias update.
    pub(crate) fn n_classes(&self) -> usize {
        self.biases.len()
    }

    /// Predicts against the live (unaveraged) snapshot.
    pub(crate) fn predict(&self, features: &FeatureVector) -> Option<String> {
        best_label(&self.weights, &self.biases, features)
    }

    /// Applies one mistake-correction step: `+value` toward `truth`,
    /// `-value` away from `guess` (when there was a guess), `±1` on the
    /// corresponding biases. Zero-valued features are skipped.
    pub(crate) fn apply_mistake(
        &mut self,
        features: &FeatureVector,
        truth: &str,
        guess: Option<&str>,
    ) {
        self.updates += 1;
        for (feature, &value) in features {
            if value == 0.0 {
                continue;
            }
            self.adjust_weight(feature, truth, value);
            if let Some(guess) = guess {
                self.adjust_weight(feature, guess, -value);
            }
        }
        self.adjust_bias(truth, 1.0);
        if let Some(guess) = guess {
            self.adjust_bias(guess, -1.0);
        }
    }

    /// Changes `weights[feature][class]` by `delta`, first crediting the
    /// running sum with the interval the old value was held.
    fn adjust_weight(&mut self, feature: &str, class: &str, delta: f64) {
        let now = self.updates;
        let old = self
            .weights
            .get(feature)
            .and_then(|row| row.get(class))
            .copied()
            .unwrap_or(0.0);
        let last = self
            .last_weight_update
            .entry(feature.to_string())
            .or_default()
            .entry(class.to_string())
            .or_insert(0);
        let held = (now - *last) as f64 * old;
        *last = now;
        *self
            .sum_of_weights
            .entry(feature.to_string())
            .or_default()
            .entry(class.to_string())
            .or_insert(0.0) += held;
        self.weights
            .entry(feature.to_string())
            .or_default()
            .insert(class.to_string(), old + delta);
    }

    /// Bias counterpart of [`adjust_weight`](Self::adjust_weight); shares
    /// the same update-counter domain.
    fn adjust_bias(&mut self, class: &str, delta: f64) {
        let now = self.updates;
        let old = self.biases.get(class).copied().unwrap_or(0.0);
        let last = self.last_bias_update.entry(class.to_string()).or_insert(0);
        let held = (now - *last) as f64 * old;
        *last = now;
        *self.sum_of_biases.entry(class.to_string()).or_insert(0.0) += held;
        self.biases.insert(class.to_string(), old + delta);
    }

    /// Computes the averaged snapshot: every touched entry's running sum
    /// is brought up to the current counter, divided by it, and rounded
    /// to 3 decimals. The store itself is left untouched, so finalization
    /// is idempotent and further training keeps accumulating correctly.
    ///
    /// With no updates the snapshot is empty; no entry was ever touched
    /// and the division is skipped entirely.
    pub(crate) fn finalize(&self) -> AveragedSnapshot {
        let mut snapshot = AveragedSnapshot::default();
        if self.updates == 0 {
            return snapshot;
        }
        let total_updates = self.updates as f64;
        for (feature, row) in &self.weights {
            let mut averaged_row = BTreeMap::new();
            for (class, &weight) in row {
                let sum = self
                    .sum_of_weights
                    .get(feature)
                    .and_then(|r| r.get(class))
                    .copied()
                    .unwrap_or(0.0);
                let last = self
                    .last_weight_update
                    .get(feature)
                    .and_then(|r| r.get(class))
                    .copied()
                    .unwrap_or(0);
                let tail = (self.updates - last) as f64 * weight;
                averaged_row.insert(class.clone(), round3((sum + tail) / total_updates));
            }
            snapshot.weights.insert(feature.clone(), averaged_row);
        }
        for (class, &bias) in &self.biases {
            let sum = self.sum_of_biases.get(class).copied().unwrap_or(0.0);
            let last = self.last_bias_update.get(class).copied().unwrap_or(0);
            let tail = (self.updates - last) as f64 * bias;
            snapshot
                .biases
                .insert(class.clone(), round3((sum + tail) / total_updates));
        }
        snapshot
    }

    /// Drops all learning state, returning the store to its initial empty
    /// condition.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Time-averaged weights and biases, as produced by finalization or
/// installed by a snapshot import. This is the view inference reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct AveragedSnapshot {
    pub(crate) weights: WeightMatrix,
    pub(crate) biases: BiasVector,
}

impl AveragedSnapshot {
    /// Predicts against the averaged weights.
    pub(crate) fn predict(&self, features: &FeatureVector) -> Option<String> {
        best_label(&self.weights, &self.biases, features)
    }
}

/// Scores every class reachable from the nonzero features and picks the
/// arg-max, resolving exact ties toward the lexicographically greater
/// label in a single pass. Returns `None` when no class scores at all.
///
/// Pure with respect to both snapshots, so it is safe to call against
/// the live view mid-training and the averaged view at inference.
pub(crate) fn best_label(
    weights: &WeightMatrix,
    biases: &BiasVector,
    features: &FeatureVector,
) -> Option<String> {
    let mut scores: BTreeMap<&str, f64> = BTreeMap::new();
    for (feature, &value) in features {
        if value == 0.0 {
            continue;
        }
        if let Some(row) = weights.get(feature) {
            for (class, &weight) in row {
                *scores.entry(class.as_str()).or_insert(0.0) += value * weight;
            }
        }
    }

    let mut best: Option<(&str, f64)> = None;
    for (class, &score) in &scores {
        // Bias joins only at selection time; the scores map stays raw.
        let total = score + biases.get(*class).copied().unwrap_or(0.0);
        match best {
            Some((best_class, best_total)) => {
                if total > best_total || (total == best_total && *class > best_class) {
                    best = Some((class, total));
                }
            }
            None => best = Some((class, total)),
        }
    }
    best.map(|(class, _)| class.to_string())
}

/// Lossy 3-decimal rounding applied to every averaged value; part of the
/// persisted-snapshot contract.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
