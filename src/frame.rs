//! 252-bit frame assembly: 2 header bits, 202 information bits, 48 BCH
//! parity bits.

use crate::bch;
use crate::config::{BeaconConfig, BeaconType, RotatingKind, TestMode};
use crate::error::BeaconError;
use crate::position;
use crate::rotating::RotatingField;

pub const FRAME_BITS: usize = 252;
pub const HEADER_BITS: usize = 2;
pub const INFO_BITS: usize = bch::INFO_BITS;
/// Bits actually transmitted: information plus parity. The two header
/// bits are assembly-time metadata and never go over the air.
pub const CODEWORD_BITS: usize = INFO_BITS + bch::PARITY_BITS;

/// TAC value substituted whenever the beacon operates in test mode.
const TEST_MODE_TAC: u16 = 9999;

/// Wall-clock UTC instant, supplied by the caller for the ELT-DT
/// rotating field. The core never reads a clock itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct UtcTime {
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

/// Caller-owned mutable burst state. The transmission counter is the
/// only quantity that survives from one burst to the next.
#[derive(Clone, Copy, Debug, Default)]
pub struct BurstState {
    pub tx_count: u32,
    pub hours_since_activation: u32,
    pub minutes_since_fix: u32,
    pub utc: UtcTime,
}

/// One assembled 252-bit frame, bit values 0/1 at indices 0..252.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    bits: [u8; FRAME_BITS],
}

impl Frame {
    pub fn bits(&self) -> &[u8; FRAME_BITS] {
        &self.bits
    }

    pub fn info_bits(&self) -> &[u8] {
        &self.bits[HEADER_BITS..HEADER_BITS + INFO_BITS]
    }

    pub fn parity_bits(&self) -> &[u8] {
        &self.bits[HEADER_BITS + INFO_BITS..]
    }

    /// The 250 transmitted bits (information followed by parity).
    pub fn codeword_bits(&self) -> &[u8] {
        &self.bits[HEADER_BITS..]
    }

    /// 63-nibble hex rendering, MSB first, for logs and dumps.
    pub fn to_hex(&self) -> String {
        self.bits
            .chunks(4)
            .map(|nibble| {
                let v = nibble.iter().fold(0u8, |acc, &b| (acc << 1) | b);
                char::from_digit(u32::from(v), 16)
                    .unwrap_or('0')
                    .to_ascii_uppercase()
            })
            .collect()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({})", self.to_hex())
    }
}

/// Writes `width` bits of `value`, MSB first, at `start`.
pub(crate) fn write_bits(bits: &mut [u8], start: usize, width: usize, value: u64) {
    for i in 0..width {
        bits[start + i] = ((value >> (width - 1 - i)) & 1) as u8;
    }
}

fn resolve_rotating_field(config: &BeaconConfig, state: &BurstState) -> RotatingField {
    let altitude_code = position::altitude_code(config.position.altitude_m);
    match config.rotating_kind() {
        RotatingKind::G008 => RotatingField::G008 {
            hours_since_activation: state.hours_since_activation,
            minutes_since_fix: state.minutes_since_fix,
            altitude_code,
            scramble_seed: match config.test_mode {
                TestMode::Test => Some(state.tx_count as u8),
                TestMode::Exercise => None,
            },
        },
        RotatingKind::EltDt => RotatingField::EltDt {
            day: state.utc.day,
            hour: state.utc.hour,
            minute: state.utc.minute,
            altitude_code,
        },
        RotatingKind::Rls => RotatingField::Rls {
            provider: config.rls_provider,
            payload: config.rls_payload,
        },
        RotatingKind::Cancel => RotatingField::Cancel {
            method: config.deactivation_method,
        },
    }
}

/// Assembles one frame from the beacon configuration and burst state.
///
/// Field positions below are the 1-based T.018 information-bit numbers;
/// information bit N lands at frame index N + 1.
pub fn build_frame(config: &BeaconConfig, state: &BurstState) -> Result<Frame, BeaconError> {
    config.validate()?;

    let mut info = [0u8; INFO_BITS];

    // 1-16: TAC, overridden in test mode.
    let tac = match config.test_mode {
        TestMode::Test => TEST_MODE_TAC,
        TestMode::Exercise => config.tac_number,
    };
    write_bits(&mut info, 0, 16, tac.into());
    // 17-30: serial number.
    write_bits(&mut info, 16, 14, u64::from(config.serial_number & 0x3FFF));
    // 31-40: country code.
    write_bits(&mut info, 30, 10, config.country_code.into());
    // 41: homing-device status (not equipped / disabled).
    info[40] = 0;
    // 42: RLS capability.
    info[41] = 1;
    // 43: test-protocol flag.
    info[42] = u8::from(config.test_mode == TestMode::Test);
    // 44-90: latitude and longitude.
    let location = position::encode(&config.position);
    info[43..90].copy_from_slice(&location);
    // 91-93: vessel-ID type; 94-123: vessel ID.
    let (vessel_type, vessel_id) = match config.beacon_type {
        BeaconType::Epirb => (1u8, config.vessel_id),
        BeaconType::Elt | BeaconType::EltDt => (2, config.vessel_id & 0xFF_FFFF),
        BeaconType::Plb => (0, 0),
    };
    write_bits(&mut info, 90, 3, vessel_type.into());
    write_bits(&mut info, 93, 30, vessel_id.into());
    // 124-137: EPIRB-AIS system identity.
    write_bits(&mut info, 123, 14, config.ais_identity.into());
    // 138-140: beacon type.
    write_bits(&mut info, 137, 3, config.beacon_type.ordinal().into());
    // 141-154: spare, fixed to ones.
    write_bits(&mut info, 140, 14, 0x3FFF);
    // 155-202: rotating field.
    let field = resolve_rotating_field(config, state);
    write_bits(&mut info, 154, 4, field.kind_code().into());
    write_bits(&mut info, 158, 44, field.payload());

    let parity = bch::compute(&info);
    if cfg!(debug_assertions) && !bch::verify(&info, parity) {
        return Err(BeaconError::BchInvariant);
    }

    let mut bits = [0u8; FRAME_BITS];
    bits[0] = u8::from(config.test_mode == TestMode::Test);
    bits[1] = 0;
    bits[HEADER_BITS..HEADER_BITS + INFO_BITS].copy_from_slice(&info);
    bits[HEADER_BITS + INFO_BITS..].copy_from_slice(&bch::parity_to_bits(parity));

    Ok(Frame { bits })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Position;

    fn field(bits: &[u8]) -> u64 {
        bits.iter().fold(0u64, |acc, &b| (acc << 1) | u64::from(b))
    }

    /// Slice of the information block by 1-based T.018 bit positions.
    fn info_field(frame: &Frame, first: usize, last: usize) -> u64 {
        field(&frame.bits()[HEADER_BITS + first - 1..HEADER_BITS + last])
    }

    #[test]
    fn french_epirb_test_frame_fields() {
        let config = BeaconConfig::default();
        let frame = build_frame(&config, &BurstState::default()).unwrap();

        // Test mode forces TAC 9999 regardless of the configured value.
        assert_eq!(info_field(&frame, 1, 16), 9999);
        assert_eq!(info_field(&frame, 17, 30), 13_398);
        // MID 227, MSB first: 0011100011.
        assert_eq!(info_field(&frame, 31, 40), 227);
        assert_eq!(frame.bits()[0], 1, "test-mode header bit");
        assert_eq!(frame.bits()[1], 0);
        assert_eq!(info_field(&frame, 43, 43), 1, "test-protocol flag");
    }

    #[test]
    fn parity_verifies_on_every_built_frame() {
        let configs = [
            BeaconConfig::default(),
            BeaconConfig {
                beacon_type: BeaconType::Plb,
                test_mode: TestMode::Exercise,
                ..Default::default()
            },
            BeaconConfig {
                beacon_type: BeaconType::EltDt,
                vessel_id: 0x3C_66F1,
                ..Default::default()
            },
            BeaconConfig {
                rotating_field: Some(RotatingKind::Cancel),
                ..Default::default()
            },
        ];
        for config in configs {
            let frame = build_frame(&config, &BurstState::default()).unwrap();
            let parity = bch::bits_to_parity(frame.parity_bits());
            assert!(bch::verify(frame.info_bits(), parity));
        }
    }

    #[test]
    fn spare_field_is_all_ones() {
        let frame = build_frame(&BeaconConfig::default(), &BurstState::default()).unwrap();
        assert_eq!(info_field(&frame, 141, 154), 0x3FFF);
    }

    #[test]
    fn plb_without_fix_zeroes_location_and_vessel_id() {
        let config = BeaconConfig {
            beacon_type: BeaconType::Plb,
            position: Position {
                latitude: 43.2,
                longitude: 5.4,
                altitude_m: 0.0,
                valid: false,
            },
            ..Default::default()
        };
        let frame = build_frame(&config, &BurstState::default()).unwrap();
        assert_eq!(info_field(&frame, 44, 90), 0, "location field");
        assert_eq!(info_field(&frame, 91, 93), 0, "vessel-ID type");
        assert_eq!(info_field(&frame, 94, 123), 0, "vessel ID");
        assert_eq!(info_field(&frame, 138, 140), 1, "PLB ordinal");
    }

    #[test]
    fn epirb_with_zero_mmsi_keeps_maritime_vessel_type() {
        let frame = build_frame(&BeaconConfig::default(), &BurstState::default()).unwrap();
        assert_eq!(info_field(&frame, 91, 93), 1);
        assert_eq!(info_field(&frame, 94, 123), 0);
    }

    #[test]
    fn exercise_mode_keeps_configured_tac() {
        let config = BeaconConfig {
            test_mode: TestMode::Exercise,
            ..Default::default()
        };
        let frame = build_frame(&config, &BurstState::default()).unwrap();
        assert_eq!(info_field(&frame, 1, 16), 10_001);
        assert_eq!(frame.bits()[0], 0);
        assert_eq!(info_field(&frame, 43, 43), 0);
    }

    #[test]
    fn elt_dt_frame_uses_caller_clock() {
        let config = BeaconConfig {
            beacon_type: BeaconType::EltDt,
            position: Position {
                latitude: 43.2,
                longitude: 5.4,
                altitude_m: 1500.0,
                valid: true,
            },
            ..Default::default()
        };
        let state = BurstState {
            utc: UtcTime {
                day: 3,
                hour: 14,
                minute: 7,
            },
            ..Default::default()
        };
        let frame = build_frame(&config, &state).unwrap();
        assert_eq!(info_field(&frame, 155, 158), 1, "rotating kind");
        assert_eq!(info_field(&frame, 159, 174), 7047, "packed UTC time");
        assert_eq!(info_field(&frame, 175, 184), 119, "altitude code");
        assert_eq!(info_field(&frame, 185, 202), 0, "spare tail");
    }

    #[test]
    fn cancel_frame_fixed_bits() {
        let config = BeaconConfig {
            rotating_field: Some(RotatingKind::Cancel),
            deactivation_method: 0,
            ..Default::default()
        };
        let frame = build_frame(&config, &BurstState::default()).unwrap();
        assert_eq!(info_field(&frame, 155, 158), 3);
        assert_eq!(info_field(&frame, 159, 160), 0, "manual deactivation");
        assert_eq!(info_field(&frame, 161, 202), 0x3FF_FFFF_FFFF);
    }

    #[test]
    fn invalid_config_is_rejected_before_assembly() {
        let config = BeaconConfig {
            country_code: 2000,
            ..Default::default()
        };
        assert!(matches!(
            build_frame(&config, &BurstState::default()),
            Err(BeaconError::ConfigOutOfRange { .. })
        ));
    }

    #[test]
    fn hex_dump_has_63_nibbles() {
        let frame = build_frame(&BeaconConfig::default(), &BurstState::default()).unwrap();
        let hex = frame.to_hex();
        assert_eq!(hex.len(), 63);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
