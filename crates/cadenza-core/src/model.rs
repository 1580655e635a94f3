//! Sequential layer chains.
//!
//! A [`Model`] owns an ordered list of layers and the two scratch buffers
//! frames ping-pong through. Boundaries are validated while the chain is
//! assembled, so by the time audio runs the per-frame path is nothing but
//! layer calls, with no checks and no allocation.

use crate::error::{Error, Result};
use crate::layer::Layer;

/// An ordered chain of layers driven one frame at a time.
///
/// Assembly (`push`) validates that adjacent widths agree and grows the
/// scratch buffers; both are configuration-time operations. [`forward`]
/// runs every layer strictly in order, since convolution state depends on
/// exact call sequencing; layers are never reordered or skipped.
///
/// A `Model` is exclusively owned state: for multiple independent streams
/// (stereo channels, parallel voices) build one instance per stream and
/// never share one reentrantly.
///
/// [`forward`]: Model::forward
#[derive(Default)]
pub struct Model {
    layers: Vec<Box<dyn Layer>>,
    scratch: [Vec<f32>; 2],
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer, checking that its input width matches the current
    /// chain output.
    pub fn push(&mut self, layer: Box<dyn Layer>) -> Result<()> {
        if let Some(last) = self.layers.last() {
            if last.out_size() != layer.in_size() {
                return Err(Error::LayerBoundary {
                    from: last.out_size(),
                    to: layer.in_size(),
                });
            }
        }

        let width = layer.in_size().max(layer.out_size());
        for buf in self.scratch.iter_mut() {
            if buf.len() < width {
                buf.resize(width, 0.0);
            }
        }

        tracing::debug!(
            index = self.layers.len(),
            in_size = layer.in_size(),
            out_size = layer.out_size(),
            "layer appended to model"
        );
        self.layers.push(layer);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Input width of the first layer (0 for an empty model).
    pub fn in_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.in_size())
    }

    /// Output width of the last layer (0 for an empty model).
    pub fn out_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.out_size())
    }

    /// Resets every layer, in order. Call once before processing and after
    /// any stream discontinuity.
    pub fn reset(&mut self) {
        for layer in self.layers.iter_mut() {
            layer.reset();
        }
    }

    /// Pushes one frame through the chain and returns the final output
    /// frame. `input` must hold `in_size()` samples.
    pub fn forward(&mut self, input: &[f32]) -> &[f32] {
        if self.layers.is_empty() {
            return &[];
        }

        self.scratch[0][..input.len()].copy_from_slice(input);

        let mut cur = 0;
        for layer in self.layers.iter_mut() {
            let (in_size, out_size) = (layer.in_size(), layer.out_size());
            let (a, b) = self.scratch.split_at_mut(1);
            let (src, dst) = if cur == 0 {
                (&a[0], &mut b[0])
            } else {
                (&b[0], &mut a[0])
            };
            layer.forward(&src[..in_size], &mut dst[..out_size]);
            cur ^= 1;
        }

        &self.scratch[cur][..self.out_size()]
    }
}
