//! Minimal amp-style chain: dilated temporal convolution into a tanh
//! waveshaper into a dense mixdown, driven one sample at a time over a
//! synthetic sine burst.
//!
//! Run with: `cargo run --example amp_chain`

use cadenza::prelude::*;

fn main() -> Result<()> {
    let hidden = 8;

    let mut conv = Conv1d::new(Conv1dConfig {
        in_size: 1,
        out_size: hidden,
        kernel_size: 3,
        dilation: 2,
        groups: 1,
    })?;
    // a small spread of tap gains per channel stands in for trained weights
    let conv_weights: Vec<Vec<Vec<f32>>> = (0..hidden)
        .map(|i| {
            let g = 0.1 + 0.05 * i as f32;
            vec![vec![g], vec![g * 0.5], vec![-g * 0.25]]
        })
        .collect();
    conv.set_weights(&conv_weights)?;

    let mut mixdown = Dense::new(hidden, 1);
    mixdown.set_weights(&vec![(0..hidden)
        .map(|i| if i % 2 == 0 { 0.3 } else { -0.2 })
        .collect::<Vec<f32>>()])?;

    let mut model = Model::new();
    model.push(Box::new(conv))?;
    let shaper: Box<Tanh<FastMath>> = Box::new(Tanh::new(hidden));
    model.push(shaper)?;
    model.push(Box::new(mixdown))?;
    model.reset();

    // 10 ms of a 440 Hz sine at 44.1 kHz
    let sample_rate = 44_100.0f32;
    let frames = 441;
    let mut peak = 0.0f32;
    let mut sum_sq = 0.0f32;

    for n in 0..frames {
        let x = (core::f32::consts::TAU * 440.0 * n as f32 / sample_rate).sin() * 0.5;
        let y = model.forward(&[x])[0];
        peak = peak.max(y.abs());
        sum_sq += y * y;
    }

    let rms = (sum_sq / frames as f32).sqrt();
    println!("processed {frames} frames through a {}-layer chain", model.len());
    println!("output peak: {peak:.4}, rms: {rms:.4}");

    Ok(())
}
