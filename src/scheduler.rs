//! Inter-burst cadence for an activated beacon: 5 s intervals for the
//! first 36 bursts, 10 s for the next 162, then 28.5 ±1.5 s for as long
//! as the beacon stays active.

use rand::Rng;
use std::time::Duration;

pub const PHASE1_BURSTS: u32 = 36;
pub const PHASE2_BURSTS: u32 = 162;

const PHASE1_INTERVAL_S: f64 = 5.0;
const PHASE2_INTERVAL_S: f64 = 10.0;
const PHASE3_INTERVAL_S: f64 = 28.5;
const PHASE3_JITTER_S: f64 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    One,
    Two,
    Three,
}

/// Phase state machine; the caller advances it once per transmitted
/// burst and sleeps for the returned interval.
#[derive(Clone, Debug)]
pub struct BurstScheduler {
    phase: Phase,
    sent_in_phase: u32,
}

impl BurstScheduler {
    pub fn new() -> Self {
        Self {
            phase: Phase::One,
            sent_in_phase: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Interval to the next burst. Phase 3 draws uniform jitter from
    /// `rng` so that adjacent beacons decorrelate.
    pub fn advance<R: Rng>(&mut self, rng: &mut R) -> Duration {
        let interval = match self.phase {
            Phase::One => Duration::from_secs_f64(PHASE1_INTERVAL_S),
            Phase::Two => Duration::from_secs_f64(PHASE2_INTERVAL_S),
            Phase::Three => Duration::from_secs_f64(
                PHASE3_INTERVAL_S + rng.gen_range(-PHASE3_JITTER_S..=PHASE3_JITTER_S),
            ),
        };
        self.sent_in_phase += 1;
        match self.phase {
            Phase::One if self.sent_in_phase >= PHASE1_BURSTS => {
                self.phase = Phase::Two;
                self.sent_in_phase = 0;
            }
            Phase::Two if self.sent_in_phase >= PHASE2_BURSTS => {
                self.phase = Phase::Three;
                self.sent_in_phase = 0;
            }
            _ => {}
        }
        interval
    }
}

impl Default for BurstScheduler {
    fn default() -> Self {
        Self::new()
    }
}
