//! DSSS spreading and OQPSK chip-to-sample modulation.
//!
//! One burst is 300 bits: a 50-bit all-zero preamble (T.018 §2.2.4)
//! followed by the 250 codeword bits. Even-indexed bits feed the I
//! channel, odd-indexed bits the Q channel; each channel bit is spread
//! by 256 PRN chips and every chip is shaped into `sps` baseband
//! samples, with the Q stream advanced by half a chip.

use num_complex::Complex32;

use crate::error::BeaconError;
use crate::frame::{Frame, CODEWORD_BITS};
use crate::prn::{self, Channel, PrnGenerator, PrnMode};
use crate::pulse::ChipShaper;

/// Chip rate mandated by the air interface.
pub const CHIP_RATE: u32 = 38_400;
/// All-zero synchronization preamble length in bits.
pub const PREAMBLE_BITS: usize = 50;
/// Bits per burst: preamble plus codeword.
pub const BURST_BITS: usize = PREAMBLE_BITS + CODEWORD_BITS;
/// Bits carried by each of the I and Q channels.
pub const BITS_PER_CHANNEL: usize = BURST_BITS / 2;
/// Chips per channel per burst.
pub const CHIPS_PER_CHANNEL: usize = BITS_PER_CHANNEL * prn::CHIPS_PER_BIT;
/// Smallest supported integer oversampling factor.
pub const MIN_SPS: usize = 8;

/// Peak and power figures of one modulated burst.
#[derive(Clone, Copy, Debug)]
pub struct WaveformStats {
    pub peak_i: f32,
    pub peak_q: f32,
    pub mean_power: f32,
    pub all_finite: bool,
}

impl WaveformStats {
    pub fn measure(samples: &[Complex32]) -> Self {
        let mut peak_i = 0f32;
        let mut peak_q = 0f32;
        let mut power = 0f64;
        let mut all_finite = true;
        for s in samples {
            all_finite &= s.re.is_finite() && s.im.is_finite();
            peak_i = peak_i.max(s.re.abs());
            peak_q = peak_q.max(s.im.abs());
            power += f64::from(s.norm_sqr());
        }
        let mean_power = if samples.is_empty() {
            0.0
        } else {
            (power / samples.len() as f64) as f32
        };
        Self {
            peak_i,
            peak_q,
            mean_power,
            all_finite,
        }
    }

    /// Sanity mask every healthy burst satisfies.
    pub fn within_mask(&self) -> bool {
        self.all_finite
            && self.peak_i <= 1.5
            && self.peak_q <= 1.5
            && (0.45..=2.0).contains(&self.mean_power)
    }
}

pub struct Modulator {
    sps: usize,
    shaper: ChipShaper,
    prn_mode: PrnMode,
}

impl Modulator {
    /// Fails if `sps` is below the supported minimum or the PRN
    /// generator does not reproduce its published reference sequence.
    /// The latter is a hard gate: no modulator, no bursts.
    pub fn new(sps: usize, shaper: ChipShaper, prn_mode: PrnMode) -> Result<Self, BeaconError> {
        if sps < MIN_SPS {
            return Err(BeaconError::out_of_range(
                "sps",
                sps as f64,
                MIN_SPS as f64,
                f64::INFINITY,
            ));
        }
        prn::verify_reference()?;
        Ok(Self {
            sps,
            shaper,
            prn_mode,
        })
    }

    pub fn sps(&self) -> usize {
        self.sps
    }

    pub fn sample_rate(&self) -> u32 {
        CHIP_RATE * self.sps as u32
    }

    /// Exact output size of one burst: `38_400 * sps` complex samples.
    pub fn samples_per_burst(&self) -> usize {
        CHIPS_PER_CHANNEL * self.sps
    }

    /// Spreads the burst bits into the per-channel ±1 chip streams.
    pub fn chip_streams(&self, frame: &Frame) -> (Vec<i8>, Vec<i8>) {
        let (i_bits, q_bits) = demux_bits(frame);
        let mut gen = PrnGenerator::new(self.prn_mode);
        (
            spread(&i_bits, &mut gen, Channel::I),
            spread(&q_bits, &mut gen, Channel::Q),
        )
    }

    /// Modulates one frame into `out`, returning the sample count.
    /// Checks the buffer before writing anything.
    pub fn modulate_frame(&self, frame: &Frame, out: &mut [Complex32]) -> Result<usize, BeaconError> {
        let n = self.samples_per_burst();
        if out.len() < n {
            return Err(BeaconError::BufferTooSmall {
                needed: n,
                got: out.len(),
            });
        }

        let (i_chips, q_chips) = self.chip_streams(frame);
        let i_stream = self.shaper.shape(&i_chips, self.sps);
        let q_stream = self.shaper.shape(&q_chips, self.sps);

        // Q leads I by half a chip: its first chip would occupy samples
        // [-q_delay, sps - q_delay), so the head falls off the buffer.
        let q_delay = self.sps / 2;
        let scale = std::f32::consts::FRAC_1_SQRT_2;
        let rotate = Complex32::new(
            std::f32::consts::FRAC_1_SQRT_2,
            std::f32::consts::FRAC_1_SQRT_2,
        );
        for (idx, slot) in out[..n].iter_mut().enumerate() {
            let i = i_stream[idx];
            let q = match q_stream.get(idx + q_delay) {
                Some(&v) => v,
                None => 0.0,
            };
            *slot = Complex32::new(i * scale, q * scale) * rotate;
        }
        Ok(n)
    }
}

/// Prepends the preamble and splits the 300 burst bits by index parity:
/// even positions to I, odd positions to Q.
fn demux_bits(frame: &Frame) -> ([u8; BITS_PER_CHANNEL], [u8; BITS_PER_CHANNEL]) {
    let mut tx_bits = [0u8; BURST_BITS];
    tx_bits[PREAMBLE_BITS..].copy_from_slice(frame.codeword_bits());

    let mut i_bits = [0u8; BITS_PER_CHANNEL];
    let mut q_bits = [0u8; BITS_PER_CHANNEL];
    for (k, pair) in tx_bits.chunks_exact(2).enumerate() {
        i_bits[k] = pair[0];
        q_bits[k] = pair[1];
    }
    (i_bits, q_bits)
}

/// A set data bit negates its 256-chip PRN run; a clear bit passes it
/// through (T.018 Table 2.3).
fn spread(bits: &[u8], gen: &mut PrnGenerator, channel: Channel) -> Vec<i8> {
    let mut chips = Vec::with_capacity(bits.len() * prn::CHIPS_PER_BIT);
    for &bit in bits {
        let run = gen.generate(channel, prn::CHIPS_PER_BIT);
        if bit == 1 {
            chips.extend(run.iter().map(|&c| -c));
        } else {
            chips.extend(run);
        }
    }
    chips
}
