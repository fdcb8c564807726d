// src/utils/mod.rs
pub mod candle;

/// Round to exactly two decimal places; every externally visible score goes
/// through this.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
