//! DSSS spreading-sequence generator.
//!
//! 23-stage Fibonacci LFSR, x^23 + x^18 + 1, shifted right. The output is
//! stage 0 before the shift; feedback x0 xor x18 enters stage 22. Logic 1
//! maps to chip -1 and logic 0 to chip +1 (T.018 Table 2.3).

use crate::error::BeaconError;

/// Spreading factor: chips per data bit per channel.
pub const CHIPS_PER_BIT: usize = 256;

const LFSR_MASK: u32 = 0x7F_FFFF;

/// Normal-mode I-channel initial state (T.018 Table 2.2).
pub const NORMAL_I_STATE: u32 = 0x00_0001;
/// Self-test-mode initial states.
pub const SELFTEST_I_STATE: u32 = 0x52_C9F0;
pub const SELFTEST_Q_STATE: u32 = 0x3C_E928;

/// First 64 Normal/I chips of T.018 Table 2.2, packed MSB-first with a
/// set bit meaning chip -1.
const REFERENCE_CHIPS: u64 = 0x8000_0108_4212_84A1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrnMode {
    Normal,
    SelfTest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    I,
    Q,
}

fn step(lfsr: &mut u32) -> i8 {
    let out = if *lfsr & 1 == 1 { -1 } else { 1 };
    let feedback = (*lfsr ^ (*lfsr >> 18)) & 1;
    *lfsr = ((*lfsr >> 1) | (feedback << 22)) & LFSR_MASK;
    out
}

/// Runs the register `steps` cycles forward without emitting chips.
pub fn advance(state: u32, steps: u32) -> u32 {
    let mut lfsr = state & LFSR_MASK;
    for _ in 0..steps {
        step(&mut lfsr);
    }
    lfsr
}

/// Per-burst chip source. The I and Q registers evolve independently;
/// each channel is one continuous m-sequence run, never reset per bit.
#[derive(Clone, Debug)]
pub struct PrnGenerator {
    lfsr_i: u32,
    lfsr_q: u32,
    mode: PrnMode,
}

impl PrnGenerator {
    pub fn new(mode: PrnMode) -> Self {
        match mode {
            // The Normal/Q register is the Normal/I register advanced 64
            // cycles, which realizes the Table 2.2 64-chip offset between
            // the channels by construction.
            PrnMode::Normal => Self {
                lfsr_i: NORMAL_I_STATE,
                lfsr_q: advance(NORMAL_I_STATE, 64),
                mode,
            },
            PrnMode::SelfTest => Self {
                lfsr_i: SELFTEST_I_STATE,
                lfsr_q: SELFTEST_Q_STATE,
                mode,
            },
        }
    }

    pub fn mode(&self) -> PrnMode {
        self.mode
    }

    /// Emits the next `count` chips of `channel`, each in {-1, +1}.
    /// Register state is preserved across calls.
    pub fn generate(&mut self, channel: Channel, count: usize) -> Vec<i8> {
        let lfsr = match channel {
            Channel::I => &mut self.lfsr_i,
            Channel::Q => &mut self.lfsr_q,
        };
        let mut chips = Vec::with_capacity(count);
        for _ in 0..count {
            chips.push(step(lfsr));
        }
        chips
    }
}

/// Hard gate: checks the generator against T.018 Table 2.2. Callers must
/// refuse to produce any burst when this fails.
pub fn verify_reference() -> Result<(), BeaconError> {
    let mut lfsr = NORMAL_I_STATE;
    let mut packed = 0u64;
    for _ in 0..64 {
        packed = (packed << 1) | u64::from(step(&mut lfsr) == -1);
    }
    if packed == REFERENCE_CHIPS {
        Ok(())
    } else {
        Err(BeaconError::PrnSelfCheck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_2_2_self_check_passes() {
        verify_reference().unwrap();
    }

    #[test]
    fn first_chips_match_table_2_2() {
        let mut prn = PrnGenerator::new(PrnMode::Normal);
        let chips = prn.generate(Channel::I, 64);
        let packed = chips
            .iter()
            .fold(0u64, |acc, &c| (acc << 1) | u64::from(c == -1));
        assert_eq!(packed, 0x8000_0108_4212_84A1);
    }

    #[test]
    fn q_channel_is_i_channel_offset_by_64_chips() {
        let mut prn = PrnGenerator::new(PrnMode::Normal);
        let i = prn.generate(Channel::I, 128);
        let q = prn.generate(Channel::Q, 64);
        assert_eq!(&q[..], &i[64..128]);
    }

    #[test]
    fn generation_is_continuous_across_calls() {
        let mut a = PrnGenerator::new(PrnMode::Normal);
        let mut b = PrnGenerator::new(PrnMode::Normal);
        let whole = a.generate(Channel::I, 2 * CHIPS_PER_BIT);
        let mut split = b.generate(Channel::I, CHIPS_PER_BIT);
        split.extend(b.generate(Channel::I, CHIPS_PER_BIT));
        assert_eq!(whole, split);
    }

    #[test]
    fn self_test_states_differ_from_normal() {
        let mut normal = PrnGenerator::new(PrnMode::Normal);
        let mut test = PrnGenerator::new(PrnMode::SelfTest);
        assert_eq!(test.mode(), PrnMode::SelfTest);
        assert_ne!(
            normal.generate(Channel::I, 64),
            test.generate(Channel::I, 64)
        );
    }

    #[test]
    fn advance_matches_generate() {
        let mut prn = PrnGenerator::new(PrnMode::Normal);
        prn.generate(Channel::I, 1000);
        assert_eq!(prn.lfsr_i, advance(NORMAL_I_STATE, 1000));
    }
}
