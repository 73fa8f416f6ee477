//! Chip pulse shaping. The air interface uses non-overlapping half-sine
//! windows; a root-raised-cosine shaper is available as an alternative
//! strategy.

use crate::error::BeaconError;

/// Half-sine window: sin(pi * n / sps) for n = 0..sps.
pub fn half_sine_taps(sps: usize) -> Vec<f32> {
    (0..sps)
        .map(|n| (std::f64::consts::PI * n as f64 / sps as f64).sin() as f32)
        .collect()
}

/// Unit-energy RRC taps spanning `span_chips` chips at `sps` samples per
/// chip. `span_chips` must be a positive even integer.
pub fn rrc_taps(alpha: f64, sps: usize, span_chips: usize) -> Result<Vec<f32>, BeaconError> {
    if !(0.0 < alpha && alpha <= 1.0) {
        return Err(BeaconError::out_of_range("rrc_alpha", alpha, 0.0, 1.0));
    }
    if span_chips == 0 || span_chips % 2 != 0 {
        return Err(BeaconError::out_of_range(
            "rrc_span_chips",
            span_chips as f64,
            2.0,
            f64::INFINITY,
        ));
    }
    if sps == 0 {
        return Err(BeaconError::out_of_range("sps", 0.0, 1.0, f64::INFINITY));
    }

    let n_taps = span_chips * sps + 1;
    let center = (n_taps as f64 - 1.0) / 2.0;
    let sps_f = sps as f64;

    let mut h = vec![0f64; n_taps];
    for (i, h_i) in h.iter_mut().enumerate() {
        let ti = (i as f64 - center) / sps_f;
        if ti.abs() < 1e-12 {
            *h_i = 1.0 - alpha + 4.0 * alpha / std::f64::consts::PI;
            continue;
        }
        let sing = 1.0 / (4.0 * alpha);
        if (ti.abs() - sing).abs() < 1e-9 {
            let a = alpha;
            *h_i = (a / 2.0_f64.sqrt())
                * ((1.0 + 2.0 / std::f64::consts::PI) * (std::f64::consts::PI / (4.0 * a)).sin()
                    + (1.0 - 2.0 / std::f64::consts::PI)
                        * (std::f64::consts::PI / (4.0 * a)).cos());
            continue;
        }

        let a = alpha;
        let num = (std::f64::consts::PI * ti * (1.0 - a)).sin()
            + 4.0 * a * ti * (std::f64::consts::PI * ti * (1.0 + a)).cos();
        let den = std::f64::consts::PI * ti * (1.0 - (4.0 * a * ti).powi(2));
        *h_i = num / den;
    }

    let energy: f64 = h.iter().map(|v| v * v).sum();
    let scale = energy.sqrt();
    for v in &mut h {
        *v /= scale;
    }

    Ok(h.into_iter().map(|v| v as f32).collect())
}

#[derive(Clone, Debug)]
pub struct Fir {
    pub taps: Vec<f32>,
}

impl Fir {
    pub fn filter_same(&self, x: &[f32]) -> Vec<f32> {
        let l = self.taps.len();
        let mut y = vec![0f32; x.len()];
        for n in 0..x.len() {
            let mut acc = 0f32;
            let kmax = std::cmp::min(l - 1, n);
            for k in 0..=kmax {
                acc += x[n - k] * self.taps[k];
            }
            y[n] = acc;
        }
        y
    }
}

/// Strategy turning a ±1 chip stream into `sps` samples per chip.
#[derive(Clone, Debug)]
pub enum ChipShaper {
    /// Each chip occupies its own sps-sample half-sine window.
    HalfSine,
    /// Impulse train filtered by an RRC FIR.
    Rrc(Fir),
}

impl ChipShaper {
    pub fn half_sine() -> Self {
        ChipShaper::HalfSine
    }

    pub fn rrc(alpha: f64, sps: usize, span_chips: usize) -> Result<Self, BeaconError> {
        Ok(ChipShaper::Rrc(Fir {
            taps: rrc_taps(alpha, sps, span_chips)?,
        }))
    }

    /// Produces `chips.len() * sps` samples.
    pub fn shape(&self, chips: &[i8], sps: usize) -> Vec<f32> {
        match self {
            ChipShaper::HalfSine => {
                let window = half_sine_taps(sps);
                let mut out = vec![0f32; chips.len() * sps];
                for (k, &chip) in chips.iter().enumerate() {
                    let base = k * sps;
                    for (n, &w) in window.iter().enumerate() {
                        out[base + n] = f32::from(chip) * w;
                    }
                }
                out
            }
            ChipShaper::Rrc(fir) => {
                let mut up = vec![0f32; chips.len() * sps];
                for (k, &chip) in chips.iter().enumerate() {
                    up[k * sps] = f32::from(chip);
                }
                fir.filter_same(&up)
            }
        }
    }
}
