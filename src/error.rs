use thiserror::Error;

/// Failure kinds surfaced by the signal-generation core.
///
/// All of these are unrecoverable within one burst: the caller aborts the
/// transmission (or, for `ConfigOutOfRange`, rejects the invocation).
#[derive(Debug, Error)]
pub enum BeaconError {
    /// The spreading-sequence generator does not reproduce the first 64
    /// Normal/I chips of T.018 Table 2.2. No bursts may be produced.
    #[error("PRN generator failed the T.018 Table 2.2 self-check")]
    PrnSelfCheck,

    /// A freshly encoded frame does not verify against its own BCH
    /// parity. Indicates an encoder bug, not bad input.
    #[error("BCH parity does not verify on a freshly built frame")]
    BchInvariant,

    /// A configuration field is outside its defined range. Fields are
    /// never clamped silently; the saturating rotating-field quantities
    /// (altitude, elapsed hours, minutes since fix) are the only
    /// exceptions and never raise this.
    #[error("{field} out of range: got {got}, allowed [{min}, {max}]")]
    ConfigOutOfRange {
        field: &'static str,
        got: f64,
        min: f64,
        max: f64,
    },

    /// The caller-provided sample buffer cannot hold one full burst.
    /// Raised before any sample is written.
    #[error("sample buffer too small: need {needed} samples, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
}

impl BeaconError {
    pub(crate) fn out_of_range(field: &'static str, got: f64, min: f64, max: f64) -> Self {
        BeaconError::ConfigOutOfRange {
            field,
            got,
            min,
            max,
        }
    }
}
