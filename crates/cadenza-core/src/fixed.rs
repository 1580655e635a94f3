//! Fixed-size layer variants with sizes resolved at compile time.
//!
//! These mirror the runtime-sized layers in [`dense`](crate::dense) and
//! [`conv1d`](crate::conv1d) but carry every dimension as a const generic,
//! so storage is plain arrays (no heap at all) and the compiler can unroll
//! and vectorize against known bounds. Use them when the pipeline topology
//! is fixed at build time; use the dynamic layers when loading arbitrary
//! saved topologies.
//!
//! The fixed variants are deliberately not `Layer` trait objects: their
//! `forward` signatures take sized arrays, which is the point. The numeric
//! contract is identical to the dynamic layers: for equal weights and
//! inputs the outputs match.

use crate::kernels;

/// Fixed-size fully-connected layer: `out[j] = bias[j] + Σ_k in[k] * w[j][k]`.
#[derive(Debug, Clone)]
pub struct Dense<const IN: usize, const OUT: usize> {
    weights: [[f32; IN]; OUT],
    bias: [f32; OUT],
}

impl<const IN: usize, const OUT: usize> Dense<IN, OUT> {
    pub const IN_SIZE: usize = IN;
    pub const OUT_SIZE: usize = OUT;

    /// Creates the layer with zeroed weights and bias.
    pub fn new() -> Self {
        Self {
            weights: [[0.0; IN]; OUT],
            bias: [0.0; OUT],
        }
    }

    /// Loads the weight matrix, row per output channel.
    pub fn set_weights(&mut self, weights: &[[f32; IN]; OUT]) {
        self.weights = *weights;
    }

    pub fn set_bias(&mut self, bias: &[f32; OUT]) {
        self.bias = *bias;
    }

    /// No internal state; present for call-site symmetry with the stateful
    /// layers.
    pub fn reset(&mut self) {}

    #[inline]
    pub fn forward(&self, input: &[f32; IN], output: &mut [f32; OUT]) {
        for (out, (row, &b)) in output
            .iter_mut()
            .zip(self.weights.iter().zip(&self.bias))
        {
            *out = kernels::inner_product(input, row, b);
        }
    }
}

impl<const IN: usize, const OUT: usize> Default for Dense<IN, OUT> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-size causal dilated grouped 1-D convolution.
///
/// Stable const generics cannot evaluate `(K - 1) * D + 1` or `IN / G` in a
/// type position, so the state-row count `S` and the per-group input width
/// `FPG` are passed explicitly and checked at construction with inline
/// `const` assertions; an inconsistent instantiation fails to compile.
///
/// For the common ungrouped case use [`Conv1dUngrouped`], which pins
/// `G = 1` and `FPG = IN`.
#[derive(Debug, Clone)]
pub struct Conv1d<
    const IN: usize,
    const OUT: usize,
    const K: usize,
    const D: usize,
    const S: usize,
    const G: usize,
    const FPG: usize,
> {
    weights: [[[f32; FPG]; K]; OUT],
    bias: [f32; OUT],
    state: [[f32; IN]; S],
    taps: [usize; K],
    write_ptr: usize,
}

/// Ungrouped fixed-size convolution: every output channel sees every input
/// channel.
pub type Conv1dUngrouped<const IN: usize, const OUT: usize, const K: usize, const D: usize, const S: usize> =
    Conv1d<IN, OUT, K, D, S, 1, IN>;

impl<
        const IN: usize,
        const OUT: usize,
        const K: usize,
        const D: usize,
        const S: usize,
        const G: usize,
        const FPG: usize,
    > Conv1d<IN, OUT, K, D, S, G, FPG>
{
    pub const IN_SIZE: usize = IN;
    pub const OUT_SIZE: usize = OUT;
    pub const STATE_SIZE: usize = S;
    const CHANNELS_PER_GROUP: usize = OUT / G;

    /// Creates the layer with zeroed weights, bias, and state.
    pub fn new() -> Self {
        const {
            assert!(K >= 1 && D >= 1 && G >= 1, "kernel, dilation and groups must be nonzero");
            assert!(S == (K - 1) * D + 1, "S must equal (K - 1) * D + 1");
            assert!(FPG * G == IN, "FPG must equal IN / G");
            assert!(OUT % G == 0, "OUT must be divisible by G");
        }

        Self {
            weights: [[[0.0; FPG]; K]; OUT],
            bias: [0.0; OUT],
            state: [[0.0; IN]; S],
            taps: [0; K],
            write_ptr: 0,
        }
    }

    /// Loads the weight tensor: `weights[i][k]` holds output channel `i`'s
    /// coefficients at tap `k`, one per input channel within the group.
    pub fn set_weights(&mut self, weights: &[[[f32; FPG]; K]; OUT]) {
        self.weights = *weights;
    }

    pub fn set_bias(&mut self, bias: &[f32; OUT]) {
        self.bias = *bias;
    }

    /// Zeroes the state ring and rewinds the write pointer. Call before the
    /// first forward pass.
    pub fn reset(&mut self) {
        self.state = [[0.0; IN]; S];
        self.write_ptr = 0;
    }

    #[inline]
    pub fn forward(&mut self, input: &[f32; IN], output: &mut [f32; OUT]) {
        self.state[self.write_ptr] = *input;

        for (k, tap) in self.taps.iter_mut().enumerate() {
            *tap = (self.write_ptr + S - k * D) % S;
        }

        for (i, out) in output.iter_mut().enumerate() {
            let base = (i / Self::CHANNELS_PER_GROUP) * FPG;
            let mut acc = self.bias[i];
            for (k, &tap) in self.taps.iter().enumerate() {
                let row = &self.state[tap][base..base + FPG];
                acc = kernels::inner_product(row, &self.weights[i][k], acc);
            }
            *out = acc;
        }

        self.write_ptr = if self.write_ptr == S - 1 {
            0
        } else {
            self.write_ptr + 1
        };
    }
}

impl<
        const IN: usize,
        const OUT: usize,
        const K: usize,
        const D: usize,
        const S: usize,
        const G: usize,
        const FPG: usize,
    > Default for Conv1d<IN, OUT, K, D, S, G, FPG>
{
    fn default() -> Self {
        Self::new()
    }
}
