//! K-nearest-neighbours classifier.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use vc_types::{DataError, ModelError, ParamValue, VcResult};

use crate::estimator::{
    invalid_value, param_f64, param_usize, unknown_param, Estimator, EstimatorKind,
};

/// Neighbour vote weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weights {
    /// Every neighbour has one vote.
    Uniform,
    /// Votes weighted by inverse distance; exact matches outvote everything.
    Distance,
}

/// Majority vote among the `n_neighbors` closest training samples under the
/// Minkowski `p` distance.
///
/// Tunable parameters: `n_neighbors`, `weights`, `p`.
#[derive(Debug, Clone)]
pub struct KNeighborsClassifier {
    n_neighbors: usize,
    weights: Weights,
    p: f64,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl Default for KNeighborsClassifier {
    fn default() -> Self {
        Self::new(5)
    }
}

impl KNeighborsClassifier {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors: n_neighbors.max(1),
            weights: Weights::Uniform,
            p: 2.0,
            x_train: None,
            y_train: None,
        }
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_p(mut self, p: f64) -> Self {
        self.p = p;
        self
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    pub fn weights(&self) -> Weights {
        self.weights
    }

    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        let diffs = a.iter().zip(b.iter()).map(|(u, v)| (u - v).abs());
        if self.p == 1.0 {
            diffs.sum()
        } else if self.p == 2.0 {
            diffs.map(|d| d * d).sum::<f64>().sqrt()
        } else {
            diffs.map(|d| d.powf(self.p)).sum::<f64>().powf(1.0 / self.p)
        }
    }

    fn vote(&self, neighbours: &[(f64, f64)]) -> f64 {
        // (label, weight) tallies; labels are few so a linear scan is enough
        let mut tally: Vec<(f64, f64)> = Vec::new();
        let exact_match = neighbours.iter().any(|(d, _)| *d == 0.0);

        for &(dist, label) in neighbours {
            let weight = match self.weights {
                Weights::Uniform => 1.0,
                Weights::Distance if exact_match => {
                    if dist == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                }
                Weights::Distance => 1.0 / dist,
            };
            match tally.iter_mut().find(|(l, _)| *l == label) {
                Some(entry) => entry.1 += weight,
                None => tally.push((label, weight)),
            }
        }

        // highest weight wins; ties go to the smaller label
        tally
            .into_iter()
            .fold(None, |best: Option<(f64, f64)>, (label, weight)| match best {
                Some((best_label, best_weight))
                    if best_weight > weight || (best_weight == weight && best_label < label) =>
                {
                    Some((best_label, best_weight))
                }
                _ => Some((label, weight)),
            })
            .map(|(label, _)| label)
            .unwrap_or(f64::NAN)
    }
}

impl Estimator for KNeighborsClassifier {
    fn name(&self) -> &str {
        "KNeighborsClassifier"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Classifier
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> VcResult<()> {
        match name {
            "n_neighbors" => self.n_neighbors = param_usize(name, value, 1)?,
            "p" => self.p = param_f64(name, value, 1.0)?,
            "weights" => {
                self.weights = match value.as_str() {
                    Some("uniform") => Weights::Uniform,
                    Some("distance") => Weights::Distance,
                    _ => {
                        return Err(invalid_value(
                            name,
                            format!("expected 'uniform' or 'distance', got {value}"),
                        ))
                    }
                }
            }
            _ => return Err(unknown_param(self.name(), name)),
        }
        Ok(())
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> VcResult<()> {
        if x.nrows() != y.len() {
            return Err(DataError::ShapeMismatch {
                x_rows: x.nrows(),
                y_len: y.len(),
            }
            .into());
        }
        if x.nrows() == 0 {
            return Err(DataError::Empty.into());
        }
        self.x_train = Some(x.to_owned());
        self.y_train = Some(y.to_owned());
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> VcResult<Array1<f64>> {
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(x_train), Some(y_train)) => (x_train, y_train),
            _ => {
                return Err(ModelError::NotFitted {
                    estimator: self.name().to_string(),
                }
                .into())
            }
        };
        if x.ncols() != x_train.ncols() {
            return Err(invalid_value(
                "X",
                format!(
                    "expected {} features, got {}",
                    x_train.ncols(),
                    x.ncols()
                ),
            ));
        }

        let k = self.n_neighbors.min(x_train.nrows());
        let predictions = x
            .rows()
            .into_iter()
            .map(|sample| {
                let mut distances: Vec<(f64, f64)> = x_train
                    .rows()
                    .into_iter()
                    .zip(y_train.iter())
                    .map(|(row, label)| (self.distance(sample, row), *label))
                    .collect();
                // stable sort keeps training order among equidistant points
                distances.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
                self.vote(&distances[..k])
            })
            .collect::<Vec<f64>>();

        Ok(Array1::from_vec(predictions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use vc_types::{ParamError, VcError};

    fn blobs() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.2],
            [0.2, 0.1],
            [5.0, 5.0],
            [5.1, 4.9],
            [4.8, 5.2]
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn classifies_separated_blobs() {
        let (x, y) = blobs();
        let mut knn = KNeighborsClassifier::new(3);
        knn.fit(x.view(), y.view()).unwrap();

        let pred = knn.predict(array![[0.05, 0.05], [5.0, 5.1]].view()).unwrap();
        assert_eq!(pred, array![0.0, 1.0]);
        assert_eq!(knn.score(x.view(), y.view()).unwrap(), 1.0);
    }

    #[test]
    fn one_neighbour_memorises_training_set() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![0.0, 1.0, 0.0, 1.0];
        let mut knn = KNeighborsClassifier::new(1);
        knn.fit(x.view(), y.view()).unwrap();
        assert_eq!(knn.score(x.view(), y.view()).unwrap(), 1.0);
    }

    #[test]
    fn ties_go_to_smaller_label() {
        let x = array![[0.0], [2.0]];
        let y = array![1.0, 0.0];
        let mut knn = KNeighborsClassifier::new(2);
        knn.fit(x.view(), y.view()).unwrap();
        assert_eq!(knn.predict(array![[1.0]].view()).unwrap(), array![0.0]);
    }

    #[test]
    fn distance_weighting_favours_close_points() {
        let x = array![[0.0], [3.0], [3.5]];
        let y = array![0.0, 1.0, 1.0];
        let mut knn = KNeighborsClassifier::new(3).with_weights(Weights::Distance);
        knn.fit(x.view(), y.view()).unwrap();
        // 1/0.5 = 2 for class 0 vs 1/2.5 + 1/3 for class 1
        assert_eq!(knn.predict(array![[0.5]].view()).unwrap(), array![0.0]);
    }

    #[test]
    fn n_neighbors_is_clamped_to_training_size() {
        let (x, y) = blobs();
        let mut knn = KNeighborsClassifier::new(100);
        knn.fit(x.view(), y.view()).unwrap();
        let pred = knn.predict(array![[5.0, 5.0]].view()).unwrap();
        // all six points vote: 3 vs 3, tie to the smaller label
        assert_eq!(pred, array![0.0]);
    }

    #[test]
    fn set_param_validates_names_and_values() {
        let mut knn = KNeighborsClassifier::default();
        knn.set_param("n_neighbors", &ParamValue::Int(7)).unwrap();
        assert_eq!(knn.n_neighbors(), 7);
        knn.set_param("weights", &ParamValue::from("distance")).unwrap();
        assert_eq!(knn.weights(), Weights::Distance);
        knn.set_param("p", &ParamValue::Float(1.0)).unwrap();

        assert!(matches!(
            knn.set_param("n_neighbors", &ParamValue::Int(0)),
            Err(VcError::Param(ParamError::InvalidValue { .. }))
        ));
        assert!(matches!(
            knn.set_param("weights", &ParamValue::from("cosine")),
            Err(VcError::Param(ParamError::InvalidValue { .. }))
        ));
        assert!(matches!(
            knn.set_param("gamma", &ParamValue::Float(0.1)),
            Err(VcError::Param(ParamError::Unknown { .. }))
        ));
    }

    #[test]
    fn predict_before_fit_fails() {
        let knn = KNeighborsClassifier::default();
        assert!(matches!(
            knn.predict(array![[1.0]].view()),
            Err(VcError::Model(ModelError::NotFitted { .. }))
        ));
    }
}
