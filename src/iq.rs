//! Sample conversion at the SDR-driver boundary: a 12-bit DAC expects
//! integers in [-2048, 2047].

use num_complex::Complex32;

/// Positive full scale of the 12-bit DAC.
pub const DAC_FULL_SCALE: f32 = 2047.0;

/// Clamps one component to ±1.0 and scales to the DAC range, saturating
/// the negative rail.
pub fn component_to_dac(x: f32) -> i16 {
    let scaled = (x.clamp(-1.0, 1.0) * DAC_FULL_SCALE).round() as i32;
    scaled.clamp(-2048, 2047) as i16
}

/// Interleaved (I, Q) 12-bit words for a DAC-backed transmit path.
pub fn to_dac_i16(samples: &[Complex32]) -> Vec<i16> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        out.push(component_to_dac(s.re));
        out.push(component_to_dac(s.im));
    }
    out
}
