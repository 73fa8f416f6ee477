use anyhow::Context;
use serde::Deserialize;

use crate::error::BeaconError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BeaconType {
    Epirb,
    Plb,
    Elt,
    EltDt,
}

impl BeaconType {
    /// 3-bit beacon-type ordinal carried in the frame.
    pub fn ordinal(self) -> u8 {
        match self {
            BeaconType::Epirb => 0,
            BeaconType::Plb => 1,
            BeaconType::Elt => 2,
            BeaconType::EltDt => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestMode {
    Exercise,
    Test,
}

/// Which variant fills the 48-bit rotating field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotatingKind {
    G008,
    EltDt,
    Rls,
    Cancel,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
    pub valid: bool,
}

/// Immutable beacon identity and operating mode, consumed once per burst.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    pub beacon_type: BeaconType,
    /// Maritime identification digits, 10 bits.
    pub country_code: u16,
    /// Type Approval Certificate number; forced to 9999 in test mode.
    pub tac_number: u16,
    pub serial_number: u16,
    pub test_mode: TestMode,
    pub position: Position,
    /// EPIRB: 30-bit MMSI. ELT / ELT-DT: 24-bit aircraft address.
    /// PLB: must be zero.
    pub vessel_id: u32,
    /// EPIRB-AIS system identity, 14 bits, zero when unused.
    pub ais_identity: u16,
    /// Overrides the derived rotating-field kind when set.
    pub rotating_field: Option<RotatingKind>,
    pub rls_provider: u8,
    /// RLS payload, 36 bits.
    pub rls_payload: u64,
    /// Cancellation method, 2 bits (0 = manual deactivation).
    pub deactivation_method: u8,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            beacon_type: BeaconType::Epirb,
            country_code: 227,
            tac_number: 10_001,
            serial_number: 13_398,
            test_mode: TestMode::Test,
            position: Position {
                latitude: 43.2,
                longitude: 5.4,
                altitude_m: 0.0,
                valid: true,
            },
            vessel_id: 0,
            ais_identity: 0,
            rotating_field: None,
            rls_provider: 0,
            rls_payload: 0,
            deactivation_method: 0,
        }
    }
}

impl BeaconConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("read config file {path}"))?;
        let config: BeaconConfig = toml::from_str(&content).context("parse config toml")?;
        Ok(config)
    }

    /// Rotating-field kind in effect: ELT-DT beacons default to the
    /// ELT-DT variant, everything else to G.008; an explicit choice wins.
    pub fn rotating_kind(&self) -> RotatingKind {
        self.rotating_field.unwrap_or(match self.beacon_type {
            BeaconType::EltDt => RotatingKind::EltDt,
            _ => RotatingKind::G008,
        })
    }

    pub fn validate(&self) -> Result<(), BeaconError> {
        if self.country_code > 1023 {
            return Err(BeaconError::out_of_range(
                "country_code",
                self.country_code.into(),
                0.0,
                1023.0,
            ));
        }
        if self.serial_number > 16_383 {
            return Err(BeaconError::out_of_range(
                "serial_number",
                self.serial_number.into(),
                0.0,
                16_383.0,
            ));
        }
        if !(-90.0..=90.0).contains(&self.position.latitude) {
            return Err(BeaconError::out_of_range(
                "latitude",
                self.position.latitude,
                -90.0,
                90.0,
            ));
        }
        if !(-180.0..=180.0).contains(&self.position.longitude) {
            return Err(BeaconError::out_of_range(
                "longitude",
                self.position.longitude,
                -180.0,
                180.0,
            ));
        }
        let vessel_id_max: u32 = match self.beacon_type {
            BeaconType::Epirb => (1 << 30) - 1,
            BeaconType::Elt | BeaconType::EltDt => (1 << 24) - 1,
            BeaconType::Plb => 0,
        };
        if self.vessel_id > vessel_id_max {
            return Err(BeaconError::out_of_range(
                "vessel_id",
                self.vessel_id.into(),
                0.0,
                vessel_id_max.into(),
            ));
        }
        if self.ais_identity > 0x3FFF {
            return Err(BeaconError::out_of_range(
                "ais_identity",
                self.ais_identity.into(),
                0.0,
                f64::from(0x3FFFu16),
            ));
        }
        if self.rls_payload >= 1 << 36 {
            return Err(BeaconError::out_of_range(
                "rls_payload",
                self.rls_payload as f64,
                0.0,
                ((1u64 << 36) - 1) as f64,
            ));
        }
        if self.deactivation_method > 3 {
            return Err(BeaconError::out_of_range(
                "deactivation_method",
                self.deactivation_method.into(),
                0.0,
                3.0,
            ));
        }
        Ok(())
    }
}
