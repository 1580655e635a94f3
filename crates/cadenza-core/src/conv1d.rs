//! Causal, dilated, optionally grouped 1-D convolution, runtime-sized.
//!
//! Designed for temporal convolution: the layer keeps a ring of past input
//! frames and convolves the kernel taps against dilation-spaced rows of
//! that ring. Call [`Conv1d::reset`] before the first forward pass so the
//! history starts from silence.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kernels;
use crate::layer::Layer;

/// Construction parameters for [`Conv1d`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conv1dConfig {
    pub in_size: usize,
    pub out_size: usize,
    pub kernel_size: usize,
    /// Spacing, in frames, between consecutive kernel taps.
    pub dilation: usize,
    /// Number of independent channel groups. Input and output channels are
    /// partitioned into `groups` contiguous equal blocks; output block `g`
    /// only convolves against input block `g`.
    pub groups: usize,
}

impl Default for Conv1dConfig {
    fn default() -> Self {
        Self {
            in_size: 1,
            out_size: 1,
            kernel_size: 1,
            dilation: 1,
            groups: 1,
        }
    }
}

impl Conv1dConfig {
    pub fn validate(&self) -> Result<()> {
        if self.in_size == 0
            || self.out_size == 0
            || self.kernel_size == 0
            || self.dilation == 0
            || self.groups == 0
        {
            return Err(Error::InvalidConfig(format!(
                "all conv1d parameters must be nonzero, got {self:?}"
            )));
        }
        if self.in_size % self.groups != 0 || self.out_size % self.groups != 0 {
            return Err(Error::InvalidConfig(format!(
                "in_size {} and out_size {} must be divisible by groups {}",
                self.in_size, self.out_size, self.groups
            )));
        }
        Ok(())
    }

    /// Number of past frames the layer must retain: the receptive field of
    /// `kernel_size` taps spaced `dilation` frames apart.
    pub fn state_size(&self) -> usize {
        (self.kernel_size - 1) * self.dilation + 1
    }
}

/// Temporal convolution layer with an internal circular state buffer.
///
/// Weights have shape `[out_size][kernel_size][in_size / groups]` (tap 0 is
/// the current frame, tap `k` reaches `k * dilation` frames into the past).
/// All storage (weights, bias, the state ring, and the per-tap offset
/// table) is allocated once at construction; `forward` and `reset` never
/// allocate.
///
/// The state ring holds `state_size = (kernel_size - 1) * dilation + 1`
/// rows of `in_size` samples. Row `(write_ptr - k * dilation) mod
/// state_size` always holds the frame `k` dilation-steps in the past.
pub struct Conv1d {
    in_size: usize,
    out_size: usize,
    kernel_size: usize,
    dilation: usize,
    groups: usize,

    state_size: usize,
    filters_per_group: usize,
    channels_per_group: usize,

    weights: Vec<f32>,
    bias: Vec<f32>,

    state: Vec<f32>,
    taps: Vec<usize>,
    write_ptr: usize,
}

impl Conv1d {
    /// Builds the layer, allocating storage sized exactly to `config`.
    pub fn new(config: Conv1dConfig) -> Result<Self> {
        config.validate()?;

        let state_size = config.state_size();
        let filters_per_group = config.in_size / config.groups;
        let channels_per_group = config.out_size / config.groups;

        tracing::debug!(?config, state_size, "conv1d configured");

        Ok(Self {
            in_size: config.in_size,
            out_size: config.out_size,
            kernel_size: config.kernel_size,
            dilation: config.dilation,
            groups: config.groups,
            state_size,
            filters_per_group,
            channels_per_group,
            weights: vec![0.0; config.out_size * config.kernel_size * filters_per_group],
            bias: vec![0.0; config.out_size],
            state: vec![0.0; state_size * config.in_size],
            taps: vec![0; config.kernel_size],
            write_ptr: 0,
        })
    }

    /// Bulk-loads the weight tensor.
    ///
    /// `weights[i][k]` holds the coefficients for output channel `i` at tap
    /// `k`, one per input channel within the channel's group
    /// (`in_size / groups` of them).
    pub fn set_weights(&mut self, weights: &[Vec<Vec<f32>>]) -> Result<()> {
        let fpg = self.filters_per_group;
        let shape_ok = weights.len() == self.out_size
            && weights.iter().all(|taps| {
                taps.len() == self.kernel_size && taps.iter().all(|w| w.len() == fpg)
            });
        if !shape_ok {
            return Err(Error::WeightShape {
                expected: format!("[{}][{}][{}]", self.out_size, self.kernel_size, fpg),
                actual: format!(
                    "[{}][{}][{}]",
                    weights.len(),
                    weights.first().map_or(0, Vec::len),
                    weights
                        .first()
                        .and_then(|taps| taps.first())
                        .map_or(0, Vec::len)
                ),
            });
        }

        for (dst, src) in self
            .weights
            .chunks_exact_mut(fpg)
            .zip(weights.iter().flatten())
        {
            dst.copy_from_slice(src);
        }

        tracing::debug!(
            out_size = self.out_size,
            kernel_size = self.kernel_size,
            filters_per_group = fpg,
            "conv1d weights loaded"
        );
        Ok(())
    }

    /// Bulk-loads the bias vector (`out_size` entries).
    pub fn set_bias(&mut self, bias: &[f32]) -> Result<()> {
        if bias.len() != self.out_size {
            return Err(Error::BiasLength {
                expected: self.out_size,
                actual: bias.len(),
            });
        }
        self.bias.copy_from_slice(bias);
        Ok(())
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    pub fn dilation(&self) -> usize {
        self.dilation
    }

    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Rows retained in the state ring.
    pub fn state_size(&self) -> usize {
        self.state_size
    }
}

impl Layer for Conv1d {
    fn in_size(&self) -> usize {
        self.in_size
    }

    fn out_size(&self) -> usize {
        self.out_size
    }

    fn reset(&mut self) {
        self.state.fill(0.0);
        self.write_ptr = 0;
    }

    #[inline]
    fn forward(&mut self, input: &[f32], output: &mut [f32]) {
        // insert the incoming frame into the ring, overwriting the oldest
        self.state[self.write_ptr * self.in_size..][..self.in_size].copy_from_slice(input);

        // row offset of the frame k dilation-steps in the past
        for (k, tap) in self.taps.iter_mut().enumerate() {
            *tap = (self.write_ptr + self.state_size - k * self.dilation) % self.state_size;
        }

        let fpg = self.filters_per_group;
        if self.groups == 1 {
            for (i, out) in output.iter_mut().enumerate() {
                let mut acc = self.bias[i];
                for (k, &tap) in self.taps.iter().enumerate() {
                    let row = &self.state[tap * self.in_size..][..self.in_size];
                    let w = &self.weights[(i * self.kernel_size + k) * fpg..][..fpg];
                    acc = kernels::inner_product(row, w, acc);
                }
                *out = acc;
            }
        } else {
            for (i, out) in output.iter_mut().enumerate() {
                let base = (i / self.channels_per_group) * fpg;
                let mut acc = self.bias[i];
                for (k, &tap) in self.taps.iter().enumerate() {
                    let row = &self.state[tap * self.in_size + base..][..fpg];
                    let w = &self.weights[(i * self.kernel_size + k) * fpg..][..fpg];
                    acc = kernels::inner_product(row, w, acc);
                }
                *out = acc;
            }
        }

        self.write_ptr = if self.write_ptr == self.state_size - 1 {
            0
        } else {
            self.write_ptr + 1
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config(in_size: usize, out_size: usize, kernel: usize, dilation: usize) -> Conv1dConfig {
        Conv1dConfig {
            in_size,
            out_size,
            kernel_size: kernel,
            dilation,
            groups: 1,
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(config(1, 1, 1, 1).validate().is_ok());
        assert!(config(0, 1, 1, 1).validate().is_err());
        assert!(config(1, 1, 0, 1).validate().is_err());

        let bad_groups = Conv1dConfig {
            in_size: 4,
            out_size: 3,
            kernel_size: 2,
            dilation: 1,
            groups: 2,
        };
        assert!(bad_groups.validate().is_err());

        let good_groups = Conv1dConfig {
            out_size: 4,
            ..bad_groups
        };
        assert!(good_groups.validate().is_ok());
    }

    #[test]
    fn test_state_size() {
        assert_eq!(config(1, 1, 1, 1).state_size(), 1);
        assert_eq!(config(1, 1, 3, 1).state_size(), 3);
        assert_eq!(config(1, 1, 2, 2).state_size(), 3);
        assert_eq!(config(1, 1, 4, 3).state_size(), 10);
    }

    #[test]
    fn test_weight_shape_rejected() {
        let mut conv = Conv1d::new(config(2, 1, 2, 1)).unwrap();
        // wrong tap count
        assert!(conv.set_weights(&[vec![vec![1.0, 2.0]]]).is_err());
        // wrong channel count per tap
        assert!(conv
            .set_weights(&[vec![vec![1.0], vec![2.0]]])
            .is_err());
        // correct
        assert!(conv
            .set_weights(&[vec![vec![1.0, 2.0], vec![3.0, 4.0]]])
            .is_ok());
    }

    #[test]
    fn test_single_tap_is_memoryless_matmul() {
        // kernel_size 1, dilation anything: output depends only on the
        // current frame
        let mut conv = Conv1d::new(config(2, 2, 1, 1)).unwrap();
        conv.set_weights(&[
            vec![vec![1.0, 0.0]],
            vec![vec![0.0, -1.0]],
        ])
        .unwrap();
        conv.set_bias(&[0.5, 0.0]).unwrap();
        conv.reset();

        let mut out = [0.0f32; 2];
        conv.forward(&[2.0, 3.0], &mut out);
        assert_eq!(out, [2.5, -3.0]);
        conv.forward(&[-1.0, 1.0], &mut out);
        assert_eq!(out, [-0.5, -1.0]);
    }

    #[test]
    fn test_startup_only_tap_zero_sees_input() {
        // After reset and K-1 zero frames, the first nonzero frame must
        // convolve against tap 0 only: all other taps still read zeros.
        let k = 3;
        let mut conv = Conv1d::new(config(1, 1, k, 1)).unwrap();
        conv.set_weights(&[vec![vec![2.0], vec![30.0], vec![500.0]]])
            .unwrap();
        conv.reset();

        let mut out = [0.0f32; 1];
        for _ in 0..k - 1 {
            conv.forward(&[0.0], &mut out);
            assert_eq!(out, [0.0]);
        }
        conv.forward(&[1.5], &mut out);
        assert_eq!(out, [3.0]); // 1.5 * tap0 weight only
    }

    #[test]
    fn test_fir_identity_delay() {
        // weight only on the last tap: pure delay of (K-1)*dilation frames
        let mut conv = Conv1d::new(config(1, 1, 2, 3)).unwrap();
        conv.set_weights(&[vec![vec![0.0], vec![1.0]]]).unwrap();
        conv.reset();

        let input: Vec<f32> = (1..=8).map(|v| v as f32).collect();
        let mut got = Vec::new();
        let mut out = [0.0f32; 1];
        for &x in &input {
            conv.forward(&[x], &mut out);
            got.push(out[0]);
        }
        // delayed by 3 frames, zero-padded at start
        assert_eq!(got, vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_moving_average_with_wraparound() {
        // 3-tap average, fed for longer than state_size to cross the ring
        // wrap boundary repeatedly
        let mut conv = Conv1d::new(config(1, 1, 3, 1)).unwrap();
        let third = 1.0 / 3.0;
        conv.set_weights(&[vec![vec![third], vec![third], vec![third]]])
            .unwrap();
        conv.reset();

        let mut out = [0.0f32; 1];
        let mut history = vec![0.0f32, 0.0];
        for n in 1..=20 {
            let x = n as f32;
            conv.forward(&[x], &mut out);
            let expected = (x + history[history.len() - 1] + history[history.len() - 2]) * third;
            assert_relative_eq!(out[0], expected, max_relative = 1e-6);
            history.push(x);
        }
    }

    #[test]
    fn test_reset_clears_history() {
        let mut conv = Conv1d::new(config(1, 1, 2, 1)).unwrap();
        conv.set_weights(&[vec![vec![1.0], vec![1.0]]]).unwrap();
        conv.reset();

        let mut out = [0.0f32; 1];
        conv.forward(&[5.0], &mut out);
        assert_eq!(out, [5.0]);

        conv.reset();
        conv.forward(&[1.0], &mut out);
        // history gone: only the current frame contributes
        assert_eq!(out, [1.0]);
    }

    #[test]
    fn test_grouped_matches_independent_slices() {
        // groups=2 over 4-in/4-out must equal two independent 2-in/2-out
        // convolutions on the channel halves
        let g_cfg = Conv1dConfig {
            in_size: 4,
            out_size: 4,
            kernel_size: 2,
            dilation: 1,
            groups: 2,
        };
        let mut grouped = Conv1d::new(g_cfg).unwrap();

        let w: Vec<Vec<Vec<f32>>> = (0..4)
            .map(|i| {
                (0..2)
                    .map(|k| vec![0.1 * (i + 1) as f32, 0.2 * (k + 1) as f32])
                    .collect()
            })
            .collect();
        let bias = [0.1, -0.1, 0.2, -0.2];
        grouped.set_weights(&w).unwrap();
        grouped.set_bias(&bias).unwrap();
        grouped.reset();

        let mut halves: Vec<Conv1d> = (0..2)
            .map(|g| {
                let mut half = Conv1d::new(config(2, 2, 2, 1)).unwrap();
                half.set_weights(&w[g * 2..g * 2 + 2]).unwrap();
                half.set_bias(&bias[g * 2..g * 2 + 2]).unwrap();
                half.reset();
                half
            })
            .collect();

        let frames = [
            [1.0f32, 2.0, 3.0, 4.0],
            [0.5, -0.5, 0.25, -0.25],
            [-1.0, 1.0, -1.0, 1.0],
        ];
        for frame in &frames {
            let mut out_grouped = [0.0f32; 4];
            grouped.forward(frame, &mut out_grouped);

            let mut out_halves = [0.0f32; 4];
            for (g, half) in halves.iter_mut().enumerate() {
                let mut out = [0.0f32; 2];
                half.forward(&frame[g * 2..g * 2 + 2], &mut out);
                out_halves[g * 2..g * 2 + 2].copy_from_slice(&out);
            }

            for (a, b) in out_grouped.iter().zip(&out_halves) {
                assert_relative_eq!(a, b, max_relative = 1e-6);
            }
        }
    }
}
