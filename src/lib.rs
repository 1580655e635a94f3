//! # cadenza: real-time neural inference for audio
//!
//! Neural amp and effect emulation that runs inside a hard real-time audio
//! callback: once a model is assembled and reset, every per-frame
//! `forward` call completes in bounded time with no allocation, no locks,
//! and no I/O.
//!
//! ## Architecture
//!
//! cadenza is an umbrella crate over two subsystems:
//!
//! - **cadenza-core**: the layer engine: dense and temporal-convolution
//!   layers (runtime-sized and const-generic fixed-size variants),
//!   activation layers, the sequential [`Model`] chain, and the scalar
//!   arithmetic kernels.
//! - **cadenza-math**: scalar math providers: exact ([`StdMath`]) and
//!   fast bit-pattern approximations ([`FastMath`]) selected at compile
//!   time through the [`MathProvider`] trait.
//!
//! ## Quick start
//!
//! ```
//! use cadenza::prelude::*;
//!
//! # fn main() -> cadenza::Result<()> {
//! let mut conv = Conv1d::new(Conv1dConfig {
//!     in_size: 1,
//!     out_size: 4,
//!     kernel_size: 3,
//!     dilation: 2,
//!     groups: 1,
//! })?;
//! conv.set_weights(&vec![vec![vec![0.1], vec![0.2], vec![0.3]]; 4])?;
//!
//! let mut model = Model::new();
//! model.push(Box::new(conv))?;
//! let tanh: Box<Tanh> = Box::new(Tanh::new(4));
//! model.push(tanh)?;
//! model.push(Box::new(Dense::new(4, 1)))?;
//!
//! // reset once before the stream starts, then forward per sample
//! model.reset();
//! let out = model.forward(&[0.25])[0];
//! # let _ = out;
//! # Ok(())
//! # }
//! ```
//!
//! External collaborators (model-file deserialization, audio I/O, the
//! process driver) sit outside this crate: they construct layers, bulk-load
//! weights through `set_weights` / `set_bias`, call `reset`, and then drive
//! `forward` once per frame per stream.

/// Re-export of cadenza-core for direct access.
pub use cadenza_core as core;

/// Re-export of cadenza-math for direct access.
pub use cadenza_math as math;

pub use cadenza_core::{
    fixed, kernels, Conv1d, Conv1dConfig, Dense, Error, Layer, Model, ReLu, Result, SampledDense,
    Sigmoid, Tanh,
};

pub use cadenza_math::{fast, FastMath, MathProvider, StdMath};

/// Common imports for building and running models.
pub mod prelude {
    pub use cadenza_core::{
        Conv1d, Conv1dConfig, Dense, Error, Layer, Model, ReLu, Result, SampledDense, Sigmoid,
        Tanh,
    };
    pub use cadenza_math::{FastMath, MathProvider, StdMath};
}
