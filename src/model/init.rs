//! Parameter initializers

use crate::error::{Result, TextCnnError};
use burn::{
    module::Param,
    tensor::{backend::Backend, Tensor, TensorData},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Samples beyond this many standard deviations are redrawn
const TRUNCATION: f64 = 2.0;

/// RNG for host-side initialization, seeded when the config asks for it
pub fn init_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Draw `count` values from N(0, stddev²), redrawing anything outside
/// two standard deviations
pub fn truncated_normal(rng: &mut StdRng, count: usize, stddev: f64) -> Result<Vec<f32>> {
    let normal = Normal::new(0.0, stddev).map_err(|e| TextCnnError::Init(e.to_string()))?;
    let bound = TRUNCATION * stddev;

    let mut values = Vec::with_capacity(count);
    while values.len() < count {
        let sample: f64 = normal.sample(rng);
        if sample.abs() <= bound {
            values.push(sample as f32);
        }
    }
    Ok(values)
}

/// Truncated normal parameter of the given shape
pub fn truncated_normal_param<B: Backend, const D: usize>(
    rng: &mut StdRng,
    shape: [usize; D],
    stddev: f64,
    device: &B::Device,
) -> Result<Param<Tensor<B, D>>> {
    let count = shape.iter().product();
    let values = truncated_normal(rng, count, stddev)?;
    let tensor = Tensor::from_data(TensorData::new(values, shape), device);
    Ok(Param::from_tensor(tensor))
}

/// Bias vector filled with a constant
pub fn constant_bias<B: Backend>(size: usize, value: f64, device: &B::Device) -> Param<Tensor<B, 1>> {
    Param::from_tensor(Tensor::full([size], value, device))
}
