//! GPS position and altitude encoding (T.018 Appendix C).

use crate::config::Position;

pub const LAT_BITS: usize = 23;
pub const LON_BITS: usize = 24;

/// Lowest encodable altitude, metres.
pub const ALTITUDE_FLOOR_M: f64 = -400.0;
/// Highest encodable altitude, metres (code 1022; 1023 is reserved).
pub const ALTITUDE_CEILING_M: f64 = 15_952.0;
const ALTITUDE_STEP_M: f64 = 16.0;
const ALTITUDE_MAX_CODE: u16 = 1022;

fn put(out: &mut [u8], start: usize, width: usize, value: u32) {
    for i in 0..width {
        out[start + i] = ((value >> (width - 1 - i)) & 1) as u8;
    }
}

/// Encodes latitude and longitude into the 47-bit location field:
/// 23 bits of latitude followed by 24 bits of longitude.
///
/// Each block is sign (0 = N/E, 1 = S/W), whole degrees, then the
/// fractional part scaled by 2^15. An invalid position encodes as zeros.
pub fn encode(pos: &Position) -> [u8; LAT_BITS + LON_BITS] {
    let mut bits = [0u8; LAT_BITS + LON_BITS];
    if !pos.valid {
        return bits;
    }

    let lat_abs = pos.latitude.abs();
    bits[0] = u8::from(pos.latitude < 0.0);
    put(&mut bits, 1, 7, lat_abs.floor() as u32);
    put(&mut bits, 8, 15, frac_code(lat_abs));

    let lon_abs = pos.longitude.abs();
    bits[LAT_BITS] = u8::from(pos.longitude < 0.0);
    put(&mut bits, LAT_BITS + 1, 8, lon_abs.floor() as u32);
    put(&mut bits, LAT_BITS + 9, 15, frac_code(lon_abs));

    bits
}

fn frac_code(degrees_abs: f64) -> u32 {
    let scaled = (degrees_abs.fract() * 32_768.0).round() as u32;
    scaled.min(32_767)
}

/// 10-bit altitude code: 16 m steps from a -400 m floor, saturating at
/// the field boundaries. Code 1023 is reserved and never emitted.
pub fn altitude_code(meters: f64) -> u16 {
    if meters <= ALTITUDE_FLOOR_M {
        return 0;
    }
    if meters > ALTITUDE_CEILING_M {
        return ALTITUDE_MAX_CODE;
    }
    let code = ((meters - ALTITUDE_FLOOR_M) / ALTITUDE_STEP_M).round() as u16;
    code.min(ALTITUDE_MAX_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(bits: &[u8]) -> u32 {
        bits.iter().fold(0u32, |acc, &b| (acc << 1) | u32::from(b))
    }

    #[test]
    fn marseille_offshore_encodes_north_east() {
        let pos = Position {
            latitude: 43.2,
            longitude: 5.4,
            altitude_m: 0.0,
            valid: true,
        };
        let bits = encode(&pos);
        assert_eq!(bits[0], 0, "north");
        assert_eq!(field(&bits[1..8]), 43);
        assert_eq!(field(&bits[8..23]), (0.2f64 * 32_768.0).round() as u32);
        assert_eq!(bits[23], 0, "east");
        assert_eq!(field(&bits[24..32]), 5);
        assert_eq!(field(&bits[32..47]), (0.4f64 * 32_768.0).round() as u32);
    }

    #[test]
    fn southern_western_hemispheres_set_sign_bits() {
        let pos = Position {
            latitude: -33.85,
            longitude: -151.2,
            altitude_m: 0.0,
            valid: true,
        };
        let bits = encode(&pos);
        assert_eq!(bits[0], 1);
        assert_eq!(field(&bits[1..8]), 33);
        assert_eq!(bits[23], 1);
        assert_eq!(field(&bits[24..32]), 151);
    }

    #[test]
    fn invalid_position_encodes_all_zero() {
        let pos = Position {
            latitude: 43.2,
            longitude: 5.4,
            altitude_m: 0.0,
            valid: false,
        };
        assert!(encode(&pos).iter().all(|&b| b == 0));
    }

    #[test]
    fn fraction_near_one_saturates_instead_of_carrying() {
        let pos = Position {
            latitude: 43.999_999,
            longitude: 0.0,
            altitude_m: 0.0,
            valid: true,
        };
        let bits = encode(&pos);
        assert_eq!(field(&bits[1..8]), 43);
        assert_eq!(field(&bits[8..23]), 32_767);
    }

    #[test]
    fn altitude_boundaries() {
        assert_eq!(altitude_code(-401.0), 0);
        assert_eq!(altitude_code(-400.0), 0);
        assert_eq!(altitude_code(0.0), 25);
        assert_eq!(altitude_code(1500.0), 119);
        assert_eq!(altitude_code(15_952.0), 1022);
        assert_eq!(altitude_code(20_000.0), 1022);
    }
}
