//! End-to-end frame scenarios checked bit-for-bit through the public API.

use sgb406::bch;
use sgb406::config::{BeaconConfig, BeaconType, Position, RotatingKind, TestMode};
use sgb406::frame::{build_frame, BurstState, Frame, UtcTime, HEADER_BITS};

fn bits_str(frame: &Frame, first: usize, last: usize) -> String {
    frame.bits()[HEADER_BITS + first - 1..HEADER_BITS + last]
        .iter()
        .map(|&b| char::from(b'0' + b))
        .collect()
}

fn bits_value(frame: &Frame, first: usize, last: usize) -> u64 {
    frame.bits()[HEADER_BITS + first - 1..HEADER_BITS + last]
        .iter()
        .fold(0, |acc, &b| (acc << 1) | u64::from(b))
}

#[test]
fn french_epirb_test_burst() {
    let config = BeaconConfig {
        beacon_type: BeaconType::Epirb,
        country_code: 227,
        serial_number: 13_398,
        test_mode: TestMode::Test,
        position: Position {
            latitude: 43.2,
            longitude: 5.4,
            altitude_m: 0.0,
            valid: true,
        },
        ..Default::default()
    };
    let frame = build_frame(&config, &BurstState::default()).unwrap();

    assert_eq!(bits_str(&frame, 31, 40), "0011100011", "MID 227");
    assert_eq!(bits_str(&frame, 1, 16), "0010011100001111", "TAC 9999");
    let parity = bch::bits_to_parity(frame.parity_bits());
    assert!(bch::verify(frame.info_bits(), parity));
}

#[test]
fn plb_without_position_fix() {
    let config = BeaconConfig {
        beacon_type: BeaconType::Plb,
        test_mode: TestMode::Test,
        position: Position {
            latitude: 12.0,
            longitude: 34.0,
            altitude_m: 0.0,
            valid: false,
        },
        vessel_id: 0,
        ..Default::default()
    };
    let frame = build_frame(&config, &BurstState::default()).unwrap();

    assert_eq!(bits_value(&frame, 44, 66), 0, "latitude");
    assert_eq!(bits_value(&frame, 67, 90), 0, "longitude");
    assert_eq!(bits_value(&frame, 91, 93), 0, "vessel-ID type");
    assert_eq!(bits_value(&frame, 94, 123), 0, "vessel ID");
}

#[test]
fn elt_dt_burst_carries_clock_and_altitude() {
    let config = BeaconConfig {
        beacon_type: BeaconType::EltDt,
        vessel_id: 0x00_1234,
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

    assert_eq!(bits_value(&frame, 155, 158), 1, "rotating kind");
    assert_eq!(bits_value(&frame, 159, 174), 7047, "(3<<11)|(14<<6)|7");
    assert_eq!(bits_value(&frame, 175, 184), 119, "round(1900/16)");
}

#[test]
fn manual_cancellation_burst() {
    let config = BeaconConfig {
        rotating_field: Some(RotatingKind::Cancel),
        deactivation_method: 0,
        ..Default::default()
    };
    let frame = build_frame(&config, &BurstState::default()).unwrap();

    assert_eq!(bits_value(&frame, 155, 158), 3);
    assert_eq!(bits_value(&frame, 159, 160), 0);
    for pos in 161..=202 {
        assert_eq!(bits_value(&frame, pos, pos), 1, "bit {pos} must be fixed");
    }
}

#[test]
fn spare_field_and_parity_hold_across_types() {
    let types = [
        BeaconType::Epirb,
        BeaconType::Plb,
        BeaconType::Elt,
        BeaconType::EltDt,
    ];
    for beacon_type in types {
        let config = BeaconConfig {
            beacon_type,
            vessel_id: 0,
            ..Default::default()
        };
        let frame = build_frame(&config, &BurstState::default()).unwrap();
        assert_eq!(bits_value(&frame, 141, 154), 0x3FFF, "{beacon_type:?}");
        let parity = bch::bits_to_parity(frame.parity_bits());
        assert!(bch::verify(frame.info_bits(), parity), "{beacon_type:?}");
    }
}

#[test]
fn rotating_field_varies_with_burst_counter_in_test_mode() {
    let config = BeaconConfig::default();
    let first = build_frame(
        &config,
        &BurstState {
            tx_count: 1,
            ..Default::default()
        },
    )
    .unwrap();
    let second = build_frame(
        &config,
        &BurstState {
            tx_count: 2,
            ..Default::default()
        },
    )
    .unwrap();
    assert_ne!(
        bits_value(&first, 186, 202),
        bits_value(&second, 186, 202),
        "scramble block must rotate between bursts"
    );
}
