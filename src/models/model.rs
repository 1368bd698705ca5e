//! Exponential attenuation model.
//!
//! Transmission halves every `tau` units of thickness:
//!
//! `T(x) = 0.5^(x / tau)`

/// Predicted transmission through `thickness` for half-value layer `tau`.
///
/// No guard on `tau`: callers that can see `tau == 0` must reject it first.
pub fn transmission(thickness: f64, tau: f64) -> f64 {
    0.5_f64.powf(thickness / tau)
}

/// Thickness at which the model reaches `transmission` (inverse of [`transmission`]).
///
/// Returns `None` outside `(0, 1]` or for a non-positive `tau`.
pub fn thickness_for(transmission: f64, tau: f64) -> Option<f64> {
    if !(transmission > 0.0 && transmission <= 1.0 && tau > 0.0) {
        return None;
    }
    Some(-tau * transmission.log2())
}
