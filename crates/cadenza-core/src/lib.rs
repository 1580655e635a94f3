//! Real-time neural layer engine.
//!
//! cadenza-core computes per-frame forward passes for small neural
//! networks inside hard real-time audio callbacks (amp sims, drive pedals,
//! neural effects). The defining constraint: once a model is assembled,
//! every `forward` call completes in bounded time with **no allocation, no
//! locking, and no I/O**. Violating that is a correctness defect here, not
//! a performance regression.
//!
//! # Layout
//!
//! - [`Layer`]: the runtime contract (fixed widths, `reset`, `forward`).
//! - [`Dense`] / [`SampledDense`]: fully-connected layers (exact and
//!   importance-sampled).
//! - [`Conv1d`]: causal dilated grouped temporal convolution with a
//!   circular state buffer.
//! - [`Tanh`], [`Sigmoid`], [`ReLu`]: elementwise activations, generic
//!   over the math provider from `cadenza-math`.
//! - [`fixed`]: const-generic variants of the compute layers for pipelines
//!   whose topology is known at build time.
//! - [`Model`]: a validated sequential chain with preallocated scratch.
//! - [`kernels`]: the scalar arithmetic backend all layers share.
//!
//! # Division of labor
//!
//! Configuration errors (bad sizes, mis-shaped weight tensors, mismatched
//! chain boundaries) surface as [`Error`] when models are built or loaded,
//! before anything reaches the audio thread. The hot path checks nothing:
//! input lengths and reset-before-forward are documented preconditions of
//! [`Layer::forward`].

mod error;
pub use error::{Error, Result};

mod layer;
pub use layer::Layer;

pub mod kernels;

mod dense;
pub use dense::{Dense, SampledDense};

mod conv1d;
pub use conv1d::{Conv1d, Conv1dConfig};

mod activation;
pub use activation::{ReLu, Sigmoid, Tanh};

pub mod fixed;

mod model;
pub use model::Model;
