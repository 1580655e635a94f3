//! The runtime layer contract.

/// A single processing unit with fixed input/output widths.
///
/// Implementations own their weights and any internal state; input and
/// output widths are fixed for the lifetime of the instance. A chain of
/// layers is driven by calling [`forward`](Layer::forward) once per frame,
/// in strict sequence.
///
/// # Hot-path contract
///
/// `forward` and `reset` must not allocate, lock, log, or perform I/O, and
/// their cost must depend only on the configured sizes, never on the input
/// values. `input` must hold exactly `in_size()` samples and `output` at
/// least `out_size()`; this is a documented precondition, not a checked
/// error, since per-call validation would put branches back on the audio
/// thread.
///
/// Stateful layers must be `reset` once before the first `forward` call and
/// after any stream discontinuity; otherwise stale history leaks into the
/// first outputs.
pub trait Layer {
    /// Number of input channels consumed per frame.
    fn in_size(&self) -> usize;

    /// Number of output channels produced per frame.
    fn out_size(&self) -> usize;

    /// Zeroes all internal state without reallocating. A no-op for
    /// stateless layers.
    fn reset(&mut self);

    /// Processes one frame: reads `in_size()` samples from `input` and
    /// writes `out_size()` samples into `output`.
    fn forward(&mut self, input: &[f32], output: &mut [f32]);
}
