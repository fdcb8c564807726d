// src/utils/candle.rs
use anyhow::{Context, Result as AnyhowResult};
use candle_core::{Device, Tensor};
use once_cell::sync::Lazy;

static CANDLE_DEVICE: Lazy<Device> = Lazy::new(|| Device::Cpu);

/// Cosine similarity between two equal-length vectors, computed with candle
/// tensors. Zero-magnitude or non-finite results collapse to 0.0.
pub fn cosine_similarity_candle(v1_slice: &[f32], v2_slice: &[f32]) -> AnyhowResult<f64> {
    if v1_slice.len() != v2_slice.len() {
        return Err(anyhow::anyhow!(
            "Input vector lengths differ: {} vs {}",
            v1_slice.len(),
            v2_slice.len()
        ));
    }
    if v1_slice.is_empty() {
        return Err(anyhow::anyhow!("Input vectors must not be empty"));
    }

    let v1 = Tensor::from_slice(v1_slice, (v1_slice.len(),), &CANDLE_DEVICE)
        .with_context(|| format!("Failed to create tensor from slice with len {}", v1_slice.len()))?;
    let v2 = Tensor::from_slice(v2_slice, (v2_slice.len(),), &CANDLE_DEVICE)
        .with_context(|| format!("Failed to create tensor from slice with len {}", v2_slice.len()))?;

    let dot_product = (&v1 * &v2)
        .and_then(|t| t.sum_all())
        .and_then(|t| t.to_scalar::<f32>())
        .context("Dot product computation failed")? as f64;

    let mag1 = (&v1 * &v1)
        .and_then(|t| t.sum_all())
        .and_then(|t| t.sqrt())
        .and_then(|t| t.to_scalar::<f32>())
        .context("Magnitude computation for v1 failed")? as f64;

    let mag2 = (&v2 * &v2)
        .and_then(|t| t.sum_all())
        .and_then(|t| t.sqrt())
        .and_then(|t| t.to_scalar::<f32>())
        .context("Magnitude computation for v2 failed")? as f64;

    if mag1 == 0.0 || mag2 == 0.0 {
        return Ok(0.0);
    }

    let similarity = dot_product / (mag1 * mag2);
    if similarity.is_nan() || similarity.is_infinite() {
        log::warn!(
            "Cosine similarity is not finite (dot: {}, mag1: {}, mag2: {})",
            dot_product,
            mag1,
            mag2
        );
        return Ok(0.0);
    }

    Ok(similarity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_similarity_one() {
        let v = vec![0.5f32, 0.5, 0.5, 0.5];
        let sim = cosine_similarity_candle(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_have_similarity_zero() {
        let sim = cosine_similarity_candle(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn zero_vector_yields_zero() {
        let sim = cosine_similarity_candle(&[0.0, 0.0], &[1.0, 0.0]).unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn mismatched_lengths_error() {
        assert!(cosine_similarity_candle(&[1.0], &[1.0, 0.0]).is_err());
    }
}
