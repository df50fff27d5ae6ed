// =============================================================================
// Dense layers and the trainable regression head
// =============================================================================
//
// The model's only trained parameters live here: a two-layer perceptron
// (ReLU hidden layer, dropout, linear scalar output) with analytic
// gradients, updated by mini-batch gradient descent on MSE.

use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::Rng;

/// A fully connected layer: `y = W x + b`.
#[derive(Debug, Clone)]
pub struct Dense {
    pub weights: Array2<f64>, // (out x in)
    pub bias: Array1<f64>,
}

impl Dense {
    pub fn new(input_size: usize, output_size: usize, rng: &mut StdRng) -> Self {
        let limit = (1.0 / input_size as f64).sqrt();
        Self {
            weights: Array2::random_using(
                (output_size, input_size),
                Uniform::new(-limit, limit),
                rng,
            ),
            bias: Array1::zeros(output_size),
        }
    }

    pub fn forward(&self, x: &Array1<f64>) -> Array1<f64> {
        self.weights.dot(x) + &self.bias
    }
}

/// Accumulated gradients for one head update.
struct HeadGradients {
    dw1: Array2<f64>,
    db1: Array1<f64>,
    dw2: Array2<f64>,
    db2: Array1<f64>,
}

impl HeadGradients {
    fn zeros(head: &RegressionHead) -> Self {
        Self {
            dw1: Array2::zeros(head.fc1.weights.raw_dim()),
            db1: Array1::zeros(head.fc1.bias.raw_dim()),
            dw2: Array2::zeros(head.fc2.weights.raw_dim()),
            db2: Array1::zeros(head.fc2.bias.raw_dim()),
        }
    }
}

/// The trained regression head: Dense(ReLU) -> Dropout -> Dense(1).
#[derive(Debug, Clone)]
pub struct RegressionHead {
    fc1: Dense,
    fc2: Dense,
    dropout: f64,
}

impl RegressionHead {
    pub fn new(input_size: usize, hidden_size: usize, dropout: f64, rng: &mut StdRng) -> Self {
        Self {
            fc1: Dense::new(input_size, hidden_size, rng),
            fc2: Dense::new(hidden_size, 1, rng),
            dropout,
        }
    }

    /// Inference pass (dropout disabled).
    pub fn predict(&self, features: &Array1<f64>) -> f64 {
        let hidden = self.fc1.forward(features).mapv(|v| v.max(0.0));
        self.fc2.forward(&hidden)[0]
    }

    /// Mean squared error of the head over a feature batch.
    pub fn batch_mse(&self, features: &[Array1<f64>], targets: &[f64]) -> f64 {
        if features.is_empty() {
            return 0.0;
        }
        let sum: f64 = features
            .iter()
            .zip(targets.iter())
            .map(|(f, &y)| {
                let diff = self.predict(f) - y;
                diff * diff
            })
            .sum();
        sum / features.len() as f64
    }

    /// One mini-batch gradient step; returns the batch MSE before the
    /// update.  Dropout (inverted scaling) is active during this pass only.
    pub fn train_batch(
        &mut self,
        features: &[Array1<f64>],
        targets: &[f64],
        learning_rate: f64,
        rng: &mut StdRng,
    ) -> f64 {
        let batch = features.len();
        if batch == 0 {
            return 0.0;
        }

        let mut grads = HeadGradients::zeros(self);
        let keep = 1.0 - self.dropout;
        let mut loss_sum = 0.0;

        for (x, &y) in features.iter().zip(targets.iter()) {
            let pre1 = self.fc1.forward(x);
            let h1 = pre1.mapv(|v| v.max(0.0));

            // Inverted dropout mask on the hidden activations.
            let mask: Array1<f64> = if self.dropout > 0.0 {
                Array1::from_shape_fn(h1.len(), |_| {
                    if rng.gen::<f64>() < keep {
                        1.0 / keep
                    } else {
                        0.0
                    }
                })
            } else {
                Array1::ones(h1.len())
            };
            let h1_dropped = &h1 * &mask;

            let pred = self.fc2.forward(&h1_dropped)[0];
            let diff = pred - y;
            loss_sum += diff * diff;

            // d(MSE)/d(pred), averaged over the batch.
            let dpred = 2.0 * diff / batch as f64;

            // Output layer.
            for j in 0..h1_dropped.len() {
                grads.dw2[[0, j]] += dpred * h1_dropped[j];
            }
            grads.db2[0] += dpred;

            // Back through dropout and ReLU into the hidden layer.
            for j in 0..h1.len() {
                let dh1 = dpred * self.fc2.weights[[0, j]] * mask[j];
                if pre1[j] <= 0.0 {
                    continue;
                }
                grads.db1[j] += dh1;
                for k in 0..x.len() {
                    grads.dw1[[j, k]] += dh1 * x[k];
                }
            }
        }

        self.fc1.weights -= &(grads.dw1 * learning_rate);
        self.fc1.bias -= &(grads.db1 * learning_rate);
        self.fc2.weights -= &(grads.dw2 * learning_rate);
        self.fc2.bias -= &(grads.db2 * learning_rate);

        loss_sum / batch as f64
    }
}
