//! Stateless elementwise activation layers.
//!
//! [`Tanh`] and [`Sigmoid`] are generic over a [`MathProvider`], so a chain
//! can opt into the fast bit-pattern approximations
//! ([`FastMath`](cadenza_math::FastMath)) without touching layer code.

use core::marker::PhantomData;

use cadenza_math::{MathProvider, StdMath};

use crate::layer::Layer;

/// Elementwise `tanh` over a frame.
pub struct Tanh<P: MathProvider = StdMath> {
    width: usize,
    _provider: PhantomData<P>,
}

impl<P: MathProvider> Tanh<P> {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            _provider: PhantomData,
        }
    }
}

impl<P: MathProvider> Layer for Tanh<P> {
    fn in_size(&self) -> usize {
        self.width
    }

    fn out_size(&self) -> usize {
        self.width
    }

    fn reset(&mut self) {}

    #[inline]
    fn forward(&mut self, input: &[f32], output: &mut [f32]) {
        for (out, &x) in output.iter_mut().zip(input) {
            *out = P::tanh(x);
        }
    }
}

/// Elementwise logistic sigmoid over a frame.
pub struct Sigmoid<P: MathProvider = StdMath> {
    width: usize,
    _provider: PhantomData<P>,
}

impl<P: MathProvider> Sigmoid<P> {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            _provider: PhantomData,
        }
    }
}

impl<P: MathProvider> Layer for Sigmoid<P> {
    fn in_size(&self) -> usize {
        self.width
    }

    fn out_size(&self) -> usize {
        self.width
    }

    fn reset(&mut self) {}

    #[inline]
    fn forward(&mut self, input: &[f32], output: &mut [f32]) {
        for (out, &x) in output.iter_mut().zip(input) {
            *out = P::sigmoid(x);
        }
    }
}

/// Elementwise rectifier.
pub struct ReLu {
    width: usize,
}

impl ReLu {
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

impl Layer for ReLu {
    fn in_size(&self) -> usize {
        self.width
    }

    fn out_size(&self) -> usize {
        self.width
    }

    fn reset(&mut self) {}

    #[inline]
    fn forward(&mut self, input: &[f32], output: &mut [f32]) {
        for (out, &x) in output.iter_mut().zip(input) {
            *out = x.max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cadenza_math::FastMath;

    #[test]
    fn test_tanh_layer() {
        let mut layer: Tanh = Tanh::new(3);
        let mut out = [0.0f32; 3];
        layer.forward(&[-1.0, 0.0, 1.0], &mut out);
        assert_relative_eq!(out[0], (-1.0f32).tanh());
        assert_eq!(out[1], 0.0);
        assert_relative_eq!(out[2], 1.0f32.tanh());
    }

    #[test]
    fn test_fast_tanh_layer_close_to_exact() {
        let mut exact: Tanh = Tanh::new(4);
        let mut fast: Tanh<FastMath> = Tanh::new(4);

        let input = [-2.0f32, -0.3, 0.3, 2.0];
        let mut out_exact = [0.0f32; 4];
        let mut out_fast = [0.0f32; 4];
        exact.forward(&input, &mut out_exact);
        fast.forward(&input, &mut out_fast);

        for (f, e) in out_fast.iter().zip(&out_exact) {
            assert!((f - e).abs() < 1e-2);
        }
    }

    #[test]
    fn test_relu_layer() {
        let mut layer = ReLu::new(4);
        let mut out = [0.0f32; 4];
        layer.forward(&[-2.0, -0.0, 0.5, 3.0], &mut out);
        assert_eq!(out, [0.0, 0.0, 0.5, 3.0]);
    }

    #[test]
    fn test_sigmoid_layer_midpoint() {
        let mut layer: Sigmoid = Sigmoid::new(1);
        let mut out = [0.0f32; 1];
        layer.forward(&[0.0], &mut out);
        assert_relative_eq!(out[0], 0.5);
    }
}
