//! Fully-connected (dense) layers, runtime-sized.
//!
//! [`Dense`] is the exact affine transform. [`SampledDense`] is an
//! importance-sampled approximation that skips the lowest-energy inputs on
//! every frame, trading a small bounded error for fewer multiply-accumulate
//! operations.

use crate::error::{Error, Result};
use crate::kernels;
use crate::layer::Layer;

/// Fully-connected layer: `out[j] = bias[j] + Σ_k in[k] * w[j][k]`.
///
/// Weights are stored row-major (`[out_size][in_size]`), loaded in bulk
/// after construction via [`set_weights`](Dense::set_weights) /
/// [`set_bias`](Dense::set_bias). Storage is allocated exactly once, at
/// construction. There is no internal state, so `reset` is a no-op.
pub struct Dense {
    in_size: usize,
    out_size: usize,
    weights: Vec<f32>,
    bias: Vec<f32>,
}

impl Dense {
    /// Creates a dense layer with zeroed weights and bias.
    pub fn new(in_size: usize, out_size: usize) -> Self {
        Self {
            in_size,
            out_size,
            weights: vec![0.0; in_size * out_size],
            bias: vec![0.0; out_size],
        }
    }

    /// Bulk-loads the weight matrix.
    ///
    /// `weights[j]` is the row for output channel `j` and must hold
    /// `in_size` coefficients; there must be `out_size` rows.
    pub fn set_weights(&mut self, weights: &[Vec<f32>]) -> Result<()> {
        check_matrix_shape(weights, self.out_size, self.in_size)?;

        for (row, new) in self.weights.chunks_exact_mut(self.in_size).zip(weights) {
            row.copy_from_slice(new);
        }

        tracing::debug!(
            in_size = self.in_size,
            out_size = self.out_size,
            "dense weights loaded"
        );
        Ok(())
    }

    /// Bulk-loads the bias vector (`out_size` entries).
    pub fn set_bias(&mut self, bias: &[f32]) -> Result<()> {
        check_bias_len(bias, self.out_size)?;
        self.bias.copy_from_slice(bias);
        Ok(())
    }
}

impl Layer for Dense {
    fn in_size(&self) -> usize {
        self.in_size
    }

    fn out_size(&self) -> usize {
        self.out_size
    }

    fn reset(&mut self) {}

    #[inline]
    fn forward(&mut self, input: &[f32], output: &mut [f32]) {
        for (out, (row, &b)) in output
            .iter_mut()
            .zip(self.weights.chunks_exact(self.in_size).zip(&self.bias))
        {
            *out = kernels::inner_product(input, row, b);
        }
    }
}

/// Importance-sampled dense layer.
///
/// Instead of summing over all inputs, each frame scores every input by the
/// product of its magnitude and the precomputed L2 norm of its weight
/// column, normalizes the scores into a probability distribution, and sums
/// only over the `ceil(factor * in_size)` most probable inputs. Each
/// surviving term carries the `1 / (C * prob)` importance-sampling
/// correction, which bounds the partial sum's error by the total input
/// energy `Σ |x_t| * ||w_col_t||`.
///
/// Selection is top-C by descending probability (ties broken by ascending
/// input index), so the layer is fully deterministic: the same weights and
/// input always produce the same output. All scratch storage is allocated
/// at construction; `forward` sorts an index table in place and allocates
/// nothing.
///
/// With `in_size == 1` the sampling machinery cannot help, so the layer
/// falls back to the exact sum.
pub struct SampledDense {
    in_size: usize,
    out_size: usize,
    factor: f32,
    weights: Vec<f32>,
    bias: Vec<f32>,
    // per-input-column weight norms, rebuilt by set_weights
    w_norm: Vec<f32>,
    // per-frame scratch
    prob: Vec<f32>,
    idxs: Vec<usize>,
}

impl SampledDense {
    /// Sampling fraction with a good error/throughput balance for typical
    /// amp-model widths.
    pub const DEFAULT_FACTOR: f32 = 0.9;

    /// Creates a sampled dense layer keeping the top `factor` fraction of
    /// inputs per frame. `factor` must lie in `(0, 1]`; `1.0` keeps every
    /// index (the terms stay importance-reweighted).
    pub fn new(in_size: usize, out_size: usize, factor: f32) -> Result<Self> {
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "sampling factor {factor} out of range (0, 1]"
            )));
        }

        Ok(Self {
            in_size,
            out_size,
            factor,
            weights: vec![0.0; in_size * out_size],
            bias: vec![0.0; out_size],
            w_norm: vec![0.0; in_size],
            prob: vec![0.0; in_size],
            idxs: (0..in_size).collect(),
        })
    }

    /// Fraction of inputs kept per frame.
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Bulk-loads the weight matrix (same shape contract as
    /// [`Dense::set_weights`]) and rebuilds the per-column norms used for
    /// energy scoring.
    pub fn set_weights(&mut self, weights: &[Vec<f32>]) -> Result<()> {
        check_matrix_shape(weights, self.out_size, self.in_size)?;

        for (row, new) in self.weights.chunks_exact_mut(self.in_size).zip(weights) {
            row.copy_from_slice(new);
        }

        for (k, norm) in self.w_norm.iter_mut().enumerate() {
            let mut sum_sq = 0.0f32;
            for row in self.weights.chunks_exact(self.in_size) {
                sum_sq += row[k] * row[k];
            }
            *norm = sum_sq.sqrt();
        }

        tracing::debug!(
            in_size = self.in_size,
            out_size = self.out_size,
            factor = self.factor,
            "sampled dense weights loaded"
        );
        Ok(())
    }

    /// Bulk-loads the bias vector (`out_size` entries).
    pub fn set_bias(&mut self, bias: &[f32]) -> Result<()> {
        check_bias_len(bias, self.out_size)?;
        self.bias.copy_from_slice(bias);
        Ok(())
    }

    #[inline]
    fn forward_exact(&self, input: &[f32], output: &mut [f32]) {
        for (out, (row, &b)) in output
            .iter_mut()
            .zip(self.weights.chunks_exact(self.in_size).zip(&self.bias))
        {
            *out = kernels::inner_product(input, row, b);
        }
    }
}

impl Layer for SampledDense {
    fn in_size(&self) -> usize {
        self.in_size
    }

    fn out_size(&self) -> usize {
        self.out_size
    }

    fn reset(&mut self) {}

    fn forward(&mut self, input: &[f32], output: &mut [f32]) {
        let n = self.in_size;
        if n == 1 {
            self.forward_exact(input, output);
            return;
        }

        // energy score per input: |x_k| * ||w_col_k||
        let mut sum_norm = 0.0f32;
        for ((p, &x), &wn) in self.prob.iter_mut().zip(input).zip(&self.w_norm) {
            *p = x.abs() * wn;
            sum_norm += *p;
        }

        // silent frame or all-zero columns: every term of the true sum is
        // zero, so the output is the bias alone
        if sum_norm <= 0.0 {
            output.copy_from_slice(&self.bias);
            return;
        }

        for p in self.prob.iter_mut() {
            *p /= sum_norm;
        }

        let c = ((n as f32 * self.factor).ceil() as usize).min(n);

        for (i, idx) in self.idxs.iter_mut().enumerate() {
            *idx = i;
        }
        let prob = &self.prob;
        self.idxs.sort_unstable_by(|&a, &b| {
            prob[b]
                .partial_cmp(&prob[a])
                .unwrap_or(core::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let scale = 1.0 / c as f32;
        for (j, out) in output.iter_mut().enumerate() {
            let row = &self.weights[j * n..][..n];
            let mut acc = self.bias[j];
            for &t in &self.idxs[..c] {
                let p = self.prob[t];
                if p > 0.0 {
                    acc += (scale / p) * input[t] * row[t];
                }
            }
            *out = acc;
        }
    }
}

fn check_matrix_shape(weights: &[Vec<f32>], out_size: usize, in_size: usize) -> Result<()> {
    if weights.len() != out_size || weights.iter().any(|row| row.len() != in_size) {
        return Err(Error::WeightShape {
            expected: format!("[{out_size}][{in_size}]"),
            actual: format!(
                "[{}][{}]",
                weights.len(),
                weights.first().map_or(0, Vec::len)
            ),
        });
    }
    Ok(())
}

fn check_bias_len(bias: &[f32], out_size: usize) -> Result<()> {
    if bias.len() != out_size {
        return Err(Error::BiasLength {
            expected: out_size,
            actual: bias.len(),
        });
    }
    Ok(())
}
