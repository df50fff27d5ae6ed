// =============================================================================
// LSTM cell and bidirectional wrapper
// =============================================================================
//
// Standard gated recurrence, one cell per direction:
//
//   i = σ(W_ii x + W_hi h + b_i)        input gate
//   f = σ(W_if x + W_hf h + b_f)        forget gate (bias seeded at 1.0)
//   g = tanh(W_ig x + W_hg h + b_g)     cell candidate
//   o = σ(W_io x + W_ho h + b_o)        output gate
//   c' = f * c + i * g
//   h' = o * tanh(c')
//
// The bidirectional wrapper runs one cell forward over the sequence and an
// independent cell over the reversed sequence, concatenating the per-step
// hidden states (or the two final states).

use ndarray::{Array1, Array2, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;

/// One LSTM cell: per-gate input/hidden weights and biases.
#[derive(Debug, Clone)]
pub struct LstmCell {
    hidden_size: usize,
    w_ii: Array2<f64>,
    w_hi: Array2<f64>,
    b_i: Array1<f64>,
    w_if: Array2<f64>,
    w_hf: Array2<f64>,
    b_f: Array1<f64>,
    w_ig: Array2<f64>,
    w_hg: Array2<f64>,
    b_g: Array1<f64>,
    w_io: Array2<f64>,
    w_ho: Array2<f64>,
    b_o: Array1<f64>,
}

impl LstmCell {
    pub fn new(input_size: usize, hidden_size: usize, rng: &mut StdRng) -> Self {
        let limit = (1.0 / hidden_size as f64).sqrt();
        let dist = Uniform::new(-limit, limit);
        let input_w = |rng: &mut StdRng| Array2::random_using((hidden_size, input_size), dist, rng);
        let hidden_w =
            |rng: &mut StdRng| Array2::random_using((hidden_size, hidden_size), dist, rng);

        Self {
            hidden_size,
            w_ii: input_w(rng),
            w_hi: hidden_w(rng),
            b_i: Array1::zeros(hidden_size),
            w_if: input_w(rng),
            w_hf: hidden_w(rng),
            // Forget bias at 1.0 keeps early memory open.
            b_f: Array1::from_elem(hidden_size, 1.0),
            w_ig: input_w(rng),
            w_hg: hidden_w(rng),
            b_g: Array1::zeros(hidden_size),
            w_io: input_w(rng),
            w_ho: hidden_w(rng),
            b_o: Array1::zeros(hidden_size),
        }
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// One time step: (h_prev, c_prev) -> (h_next, c_next).
    pub fn step(
        &self,
        x: &Array1<f64>,
        h_prev: &Array1<f64>,
        c_prev: &Array1<f64>,
    ) -> (Array1<f64>, Array1<f64>) {
        let i_gate = sigmoid(&(self.w_ii.dot(x) + self.w_hi.dot(h_prev) + &self.b_i));
        let f_gate = sigmoid(&(self.w_if.dot(x) + self.w_hf.dot(h_prev) + &self.b_f));
        let g = tanh(&(self.w_ig.dot(x) + self.w_hg.dot(h_prev) + &self.b_g));
        let o_gate = sigmoid(&(self.w_io.dot(x) + self.w_ho.dot(h_prev) + &self.b_o));

        let c_next = &f_gate * c_prev + &i_gate * &g;
        let h_next = &o_gate * &tanh(&c_next);
        (h_next, c_next)
    }

    fn zero_state(&self) -> (Array1<f64>, Array1<f64>) {
        (
            Array1::zeros(self.hidden_size),
            Array1::zeros(self.hidden_size),
        )
    }

    /// Run the cell over a (time x features) sequence, returning the hidden
    /// state at every step.
    fn run(&self, xs: &ArrayView2<f64>) -> Array2<f64> {
        let steps = xs.nrows();
        let mut out = Array2::zeros((steps, self.hidden_size));
        let (mut h, mut c) = self.zero_state();
        for (t, x) in xs.axis_iter(Axis(0)).enumerate() {
            let (h_next, c_next) = self.step(&x.to_owned(), &h, &c);
            out.row_mut(t).assign(&h_next);
            h = h_next;
            c = c_next;
        }
        out
    }
}

/// A bidirectional LSTM layer: independent forward and backward cells.
#[derive(Debug, Clone)]
pub struct BiLstm {
    forward: LstmCell,
    backward: LstmCell,
}

impl BiLstm {
    pub fn new(input_size: usize, hidden_size: usize, rng: &mut StdRng) -> Self {
        Self {
            forward: LstmCell::new(input_size, hidden_size, rng),
            backward: LstmCell::new(input_size, hidden_size, rng),
        }
    }

    /// Output width: both directions concatenated.
    pub fn output_size(&self) -> usize {
        self.forward.hidden_size() + self.backward.hidden_size()
    }

    /// Sequence-to-sequence pass: per-step hidden states of both directions
    /// concatenated, time order preserved.
    pub fn forward_sequence(&self, xs: &ArrayView2<f64>) -> Array2<f64> {
        let steps = xs.nrows();
        let fwd = self.forward.run(xs);

        let reversed = reverse_rows(xs);
        let bwd_rev = self.backward.run(&reversed.view());

        let mut out = Array2::zeros((steps, self.output_size()));
        let split = self.forward.hidden_size();
        for t in 0..steps {
            for j in 0..split {
                out[[t, j]] = fwd[[t, j]];
            }
            for j in 0..self.backward.hidden_size() {
                // Backward states come out in reversed time order.
                out[[t, split + j]] = bwd_rev[[steps - 1 - t, j]];
            }
        }
        out
    }

    /// Sequence-to-vector pass: final forward state concatenated with the
    /// final backward state (i.e. the backward cell's view of step 0).
    pub fn forward_last(&self, xs: &ArrayView2<f64>) -> Array1<f64> {
        let fwd = self.forward.run(xs);
        let reversed = reverse_rows(xs);
        let bwd = self.backward.run(&reversed.view());

        let mut out = Array1::zeros(self.output_size());
        let split = self.forward.hidden_size();
        let last = xs.nrows() - 1;
        for j in 0..split {
            out[j] = fwd[[last, j]];
        }
        for j in 0..self.backward.hidden_size() {
            out[split + j] = bwd[[last, j]];
        }
        out
    }
}

fn reverse_rows(xs: &ArrayView2<f64>) -> Array2<f64> {
    let steps = xs.nrows();
    let mut out = Array2::zeros((steps, xs.ncols()));
    for t in 0..steps {
        out.row_mut(t).assign(&xs.row(steps - 1 - t));
    }
    out
}

fn sigmoid(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

fn tanh(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(f64::tanh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn cell_step_shapes() {
        let mut rng = StdRng::seed_from_u64(3);
        let cell = LstmCell::new(5, 10, &mut rng);
        let x = Array1::zeros(5);
        let (h, c) = cell.zero_state();
        let (h2, c2) = cell.step(&x, &h, &c);
        assert_eq!(h2.len(), 10);
        assert_eq!(c2.len(), 10);
    }

    #[test]
    fn hidden_state_is_bounded() {
        // h = o * tanh(c) with o in (0,1), so |h| < 1 always.
        let mut rng = StdRng::seed_from_u64(3);
        let cell = LstmCell::new(4, 8, &mut rng);
        let xs = Array2::from_shape_fn((20, 4), |(r, c)| ((r + c) as f64 * 10.0).sin() * 100.0);
        let out = cell.run(&xs.view());
        assert!(out.iter().all(|v| v.abs() < 1.0));
    }

    #[test]
    fn bilstm_sequence_output_shape() {
        let mut rng = StdRng::seed_from_u64(11);
        let layer = BiLstm::new(6, 16, &mut rng);
        let xs = Array2::zeros((12, 6));
        let out = layer.forward_sequence(&xs.view());
        assert_eq!(out.shape(), &[12, 32]);
    }

    #[test]
    fn bilstm_last_matches_sequence_ends() {
        let mut rng = StdRng::seed_from_u64(11);
        let layer = BiLstm::new(3, 8, &mut rng);
        let xs = Array2::from_shape_fn((9, 3), |(r, c)| (r as f64 - c as f64) * 0.1);

        let seq = layer.forward_sequence(&xs.view());
        let last = layer.forward_last(&xs.view());

        // Forward half of the final vector equals the last sequence step;
        // backward half equals the backward states at step 0.
        for j in 0..8 {
            assert!((last[j] - seq[[8, j]]).abs() < 1e-12);
            assert!((last[8 + j] - seq[[0, 8 + j]]).abs() < 1e-12);
        }
    }

    #[test]
    fn bilstm_deterministic_under_seed() {
        let mk = || {
            let mut rng = StdRng::seed_from_u64(42);
            BiLstm::new(4, 6, &mut rng)
        };
        let xs = Array2::from_shape_fn((10, 4), |(r, c)| (r * 4 + c) as f64 * 0.01);
        let a = mk().forward_last(&xs.view());
        let b = mk().forward_last(&xs.view());
        assert_eq!(a, b);
    }
}
