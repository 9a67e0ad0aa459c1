//! Fold splitters for cross-validation.

use std::collections::BTreeMap;

use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::warn;
use vc_types::{DataError, VcResult};

use crate::estimator::EstimatorKind;

/// One train/test partition of the sample indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

fn check_fold_count(n_samples: usize, n_splits: usize) -> VcResult<()> {
    if n_splits < 2 {
        return Err(DataError::InvalidFolds { n_splits }.into());
    }
    if n_splits > n_samples {
        return Err(DataError::TooFewSamples {
            n_samples,
            n_splits,
        }
        .into());
    }
    Ok(())
}

/// Turn per-sample fold assignments into train/test index lists.
fn splits_from_assignment(fold_of: &[usize], n_splits: usize) -> Vec<Split> {
    (0..n_splits)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..fold_of.len()).partition(|&idx| fold_of[idx] == fold);
            Split { train, test }
        })
        .collect()
}

/// Contiguous k-fold splitting with optional seeded shuffling.
///
/// The first `n_samples % n_splits` folds hold one extra sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub seed: Option<u64>,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            seed: None,
        }
    }

    pub fn with_shuffle(mut self, seed: Option<u64>) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }

    pub fn split(&self, n_samples: usize) -> VcResult<Vec<Split>> {
        check_fold_count(n_samples, self.n_splits)?;

        let mut order: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            match self.seed {
                Some(seed) => order.shuffle(&mut StdRng::seed_from_u64(seed)),
                None => order.shuffle(&mut rand::thread_rng()),
            }
        }

        let base = n_samples / self.n_splits;
        let extra = n_samples % self.n_splits;
        let mut fold_of = vec![0; n_samples];
        let mut start = 0;
        for fold in 0..self.n_splits {
            let size = base + usize::from(fold < extra);
            for &idx in &order[start..start + size] {
                fold_of[idx] = fold;
            }
            start += size;
        }

        Ok(splits_from_assignment(&fold_of, self.n_splits))
    }
}

/// K-fold splitting that preserves the class proportions of `y` in every
/// fold.
///
/// Per-fold class counts come from dealing the class-sorted labels to folds
/// round-robin, so each fold receives `floor` or `ceil` of
/// `class_count / n_splits` members of every class. Within a class, fold 0
/// takes the first block of samples (by index), fold 1 the next block, and
/// so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratifiedKFold {
    pub n_splits: usize,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn split(&self, y: ArrayView1<'_, f64>) -> VcResult<Vec<Split>> {
        let n_samples = y.len();
        check_fold_count(n_samples, self.n_splits)?;

        let mut classes: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, label) in y.iter().enumerate() {
            classes.entry(class_key(*label)).or_default().push(idx);
        }

        let largest = classes.values().map(Vec::len).max().unwrap_or(0);
        let smallest = classes.values().map(Vec::len).min().unwrap_or(0);
        if largest < self.n_splits {
            return Err(DataError::ClassTooSmall {
                n_splits: self.n_splits,
                largest_class: largest,
            }
            .into());
        }
        if smallest < self.n_splits {
            warn!(
                "The least populated class in y has only {} members, which is less than n_splits={}",
                smallest, self.n_splits
            );
        }

        // allocation[c][f]: members of class c that land in fold f
        let mut allocation = vec![vec![0usize; self.n_splits]; classes.len()];
        let mut position = 0;
        for (class, members) in classes.values().enumerate() {
            for _ in members {
                allocation[class][position % self.n_splits] += 1;
                position += 1;
            }
        }

        let mut fold_of = vec![0; n_samples];
        for (members, counts) in classes.values().zip(&allocation) {
            let folds = counts
                .iter()
                .enumerate()
                .flat_map(|(fold, &count)| std::iter::repeat(fold).take(count));
            for (&idx, fold) in members.iter().zip(folds) {
                fold_of[idx] = fold;
            }
        }

        Ok(splits_from_assignment(&fold_of, self.n_splits))
    }
}

/// Total order over float labels that groups equal values together.
fn class_key(label: f64) -> i64 {
    // -0.0 + 0.0 == +0.0, so both zeros share a class
    let bits = (label + 0.0).to_bits() as i64;
    // Map the IEEE-754 bit pattern onto a monotone integer scale.
    if bits < 0 {
        bits ^ i64::MAX
    } else {
        bits
    }
}

/// Which splitter a validation curve uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvStrategy {
    /// Fold count only: stratified for classifiers, plain k-fold otherwise.
    Folds(usize),
    KFold(KFold),
    Stratified(StratifiedKFold),
}

impl Default for CvStrategy {
    fn default() -> Self {
        Self::Folds(5)
    }
}

impl CvStrategy {
    pub fn n_splits(&self) -> usize {
        match self {
            Self::Folds(n) => *n,
            Self::KFold(k) => k.n_splits,
            Self::Stratified(s) => s.n_splits,
        }
    }

    /// Produce the train/test splits for labels `y`.
    pub fn split(&self, y: ArrayView1<'_, f64>, kind: EstimatorKind) -> VcResult<Vec<Split>> {
        match (self, kind) {
            (Self::Folds(n), EstimatorKind::Classifier) => StratifiedKFold::new(*n).split(y),
            (Self::Folds(n), EstimatorKind::Regressor) => KFold::new(*n).split(y.len()),
            (Self::KFold(k), _) => k.split(y.len()),
            (Self::Stratified(s), _) => s.split(y),
        }
    }
}
