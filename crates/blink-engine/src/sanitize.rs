//! Input Sanitization
//!
//! Detector outputs are noisy but informative: out-of-range values are
//! clamped instead of rejected.

use crate::types::Sample;

/// Probability used when a backend produced no reading.
pub const ASSUME_OPEN: f32 = 1.0;

/// Clamp to the nearest bound of [0, 1]; NaN falls back to "assume open".
pub fn sanitize_probability(p: f32) -> f32 {
    if p.is_nan() {
        ASSUME_OPEN
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Whether a probability needed correcting.
pub fn is_out_of_range(p: f32) -> bool {
    !p.is_finite() || !(0.0..=1.0).contains(&p)
}

pub fn sanitize_sample(sample: &Sample) -> Sample {
    Sample {
        left_open_probability: sanitize_probability(sample.left_open_probability),
        right_open_probability: sanitize_probability(sample.right_open_probability),
        ..*sample
    }
}
