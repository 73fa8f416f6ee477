use anyhow::Context;
use chrono::{Datelike, Timelike, Utc};
use clap::{Parser, ValueEnum};
use log::{debug, info, LevelFilter};
use num_complex::Complex32;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Instant;

use sgb406::config::{BeaconConfig, BeaconType, Position, RotatingKind, TestMode};
use sgb406::frame::{build_frame, BurstState, UtcTime};
use sgb406::modulator::{Modulator, WaveformStats};
use sgb406::prn::{self, PrnMode};
use sgb406::pulse::ChipShaper;
use sgb406::scheduler::BurstScheduler;
use sgb406::sigmf::{SampleFormat, SigmfWriter};

#[derive(Parser, Debug)]
#[command(about = "T.018 second-generation beacon burst generator (SigMF output)")]
struct Args {
    /// Beacon configuration TOML; identity flags below are ignored when set.
    #[arg(long)]
    config: Option<String>,

    #[arg(long, value_enum, default_value_t = BeaconTypeArg::Epirb)]
    beacon_type: BeaconTypeArg,

    /// Country code (MID).
    #[arg(long, default_value_t = 227)]
    country: u16,

    /// Type Approval Certificate number.
    #[arg(long, default_value_t = 10001)]
    tac: u16,

    #[arg(long, default_value_t = 13398)]
    serial: u16,

    #[arg(long, value_enum, default_value_t = ModeArg::Test)]
    mode: ModeArg,

    /// Latitude in degrees (north positive).
    #[arg(long, default_value_t = 43.2, allow_negative_numbers = true)]
    lat: f64,

    /// Longitude in degrees (east positive).
    #[arg(long, default_value_t = 5.4, allow_negative_numbers = true)]
    lon: f64,

    /// Altitude in metres.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    alt: f64,

    /// Encode the position as invalid (no fix).
    #[arg(long)]
    no_fix: bool,

    /// MMSI (EPIRB) or 24-bit aircraft address (ELT / ELT-DT).
    #[arg(long, default_value_t = 0)]
    vessel_id: u32,

    /// Rotating-field kind override.
    #[arg(long, value_enum)]
    rotating: Option<RotatingArg>,

    #[arg(long, default_value_t = 0)]
    rls_provider: u8,

    #[arg(long, default_value_t = 0)]
    rls_payload: u64,

    /// Cancellation method (0 = manual).
    #[arg(long, default_value_t = 0)]
    deactivation: u8,

    /// Samples per chip (integer >= 8). 16 gives 614.4 kHz.
    #[arg(long, default_value_t = 16)]
    sps: usize,

    /// RRC chip shaping instead of the half-sine window.
    #[arg(long)]
    rrc: bool,

    #[arg(long, default_value_t = 0.5)]
    rrc_alpha: f64,

    #[arg(long, default_value_t = 6)]
    rrc_span_chips: usize,

    /// Spread with the self-test PRN states.
    #[arg(long)]
    self_test_prn: bool,

    /// Output base path; burst N lands at <out>-NNN.sigmf-data.
    #[arg(long, default_value = "sgb_burst")]
    out: String,

    #[arg(long, value_enum, default_value_t = FormatArg::Cf32)]
    format: FormatArg,

    /// Carrier frequency recorded in the capture metadata (Hz).
    #[arg(long, default_value_t = 406_037_000)]
    frequency: u64,

    /// Number of bursts to generate.
    #[arg(long, default_value_t = 1)]
    bursts: u32,

    /// Skip the inter-burst wait; write files back to back.
    #[arg(long)]
    no_wait: bool,

    /// RNG seed for the phase-3 interval jitter.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BeaconTypeArg {
    Epirb,
    Plb,
    Elt,
    EltDt,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Exercise,
    Test,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RotatingArg {
    G008,
    EltDt,
    Rls,
    Cancel,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Cf32,
    Ci16,
}

fn log_setup(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn config_from_args(args: &Args) -> anyhow::Result<BeaconConfig> {
    if let Some(path) = &args.config {
        return BeaconConfig::from_file(path);
    }
    Ok(BeaconConfig {
        beacon_type: match args.beacon_type {
            BeaconTypeArg::Epirb => BeaconType::Epirb,
            BeaconTypeArg::Plb => BeaconType::Plb,
            BeaconTypeArg::Elt => BeaconType::Elt,
            BeaconTypeArg::EltDt => BeaconType::EltDt,
        },
        country_code: args.country,
        tac_number: args.tac,
        serial_number: args.serial,
        test_mode: match args.mode {
            ModeArg::Exercise => TestMode::Exercise,
            ModeArg::Test => TestMode::Test,
        },
        position: Position {
            latitude: args.lat,
            longitude: args.lon,
            altitude_m: args.alt,
            valid: !args.no_fix,
        },
        vessel_id: args.vessel_id,
        ais_identity: 0,
        rotating_field: args.rotating.map(|r| match r {
            RotatingArg::G008 => RotatingKind::G008,
            RotatingArg::EltDt => RotatingKind::EltDt,
            RotatingArg::Rls => RotatingKind::Rls,
            RotatingArg::Cancel => RotatingKind::Cancel,
        }),
        rls_provider: args.rls_provider,
        rls_payload: args.rls_payload,
        deactivation_method: args.deactivation,
    })
}

struct Transmitter {
    args: Args,
    config: BeaconConfig,
    modulator: Modulator,
    activated_at: Instant,
}

impl Transmitter {
    fn new(args: Args) -> anyhow::Result<Self> {
        // Hard gate: a generator that cannot reproduce Table 2.2 must
        // not produce bursts.
        prn::verify_reference().context("PRN self-check")?;

        let config = config_from_args(&args)?;
        config.validate().context("beacon configuration")?;

        let shaper = if args.rrc {
            ChipShaper::rrc(args.rrc_alpha, args.sps, args.rrc_span_chips)?
        } else {
            ChipShaper::half_sine()
        };
        let prn_mode = if args.self_test_prn {
            PrnMode::SelfTest
        } else {
            PrnMode::Normal
        };
        let modulator = Modulator::new(args.sps, shaper, prn_mode)?;

        Ok(Self {
            args,
            config,
            modulator,
            activated_at: Instant::now(),
        })
    }

    fn burst_state(&self, tx_count: u32) -> BurstState {
        let elapsed = self.activated_at.elapsed().as_secs();
        let now = Utc::now();
        BurstState {
            tx_count,
            hours_since_activation: (elapsed / 3600) as u32,
            // The position is fixed once at startup in this front end.
            minutes_since_fix: (elapsed / 60) as u32,
            utc: UtcTime {
                day: now.day() as u8,
                hour: now.hour() as u8,
                minute: now.minute() as u8,
            },
        }
    }

    fn burst_path(&self, tx_count: u32) -> PathBuf {
        if self.args.bursts == 1 {
            PathBuf::from(&self.args.out)
        } else {
            PathBuf::from(format!("{}-{tx_count:03}", self.args.out))
        }
    }

    fn run(&self) -> anyhow::Result<()> {
        let sample_rate = f64::from(self.modulator.sample_rate());
        let format = match self.args.format {
            FormatArg::Cf32 => SampleFormat::Cf32Le,
            FormatArg::Ci16 => SampleFormat::Ci16Le,
        };
        info!(
            "sps={} sample_rate={} Hz, {} burst(s) to {}.sigmf-data",
            self.modulator.sps(),
            sample_rate,
            self.args.bursts,
            self.args.out
        );

        let mut buf = vec![Complex32::new(0.0, 0.0); self.modulator.samples_per_burst()];
        let mut scheduler = BurstScheduler::new();
        let mut rng = StdRng::seed_from_u64(self.args.seed);

        for tx_count in 0..self.args.bursts {
            let state = self.burst_state(tx_count);
            let frame = build_frame(&self.config, &state)?;
            info!("burst {tx_count}: frame {}", frame.to_hex());

            let n = self.modulator.modulate_frame(&frame, &mut buf)?;
            let stats = WaveformStats::measure(&buf[..n]);
            debug!(
                "burst {tx_count}: {n} samples, peak I/Q {:.3}/{:.3}, mean power {:.3}",
                stats.peak_i, stats.peak_q, stats.mean_power
            );
            if !stats.within_mask() {
                anyhow::bail!("waveform sanity check failed: {stats:?}");
            }

            let base = self.burst_path(tx_count);
            let mut writer = SigmfWriter::create(
                &base,
                sample_rate,
                self.args.frequency as f64,
                format,
            )?;
            writer.set_description(&format!(
                "T.018 burst {tx_count}, frame {}",
                frame.to_hex()
            ));
            writer.write_samples(&buf[..n])?;
            let meta_path = writer.close()?;
            info!("burst {tx_count}: wrote {n} samples, sidecar {}", meta_path.display());

            let interval = scheduler.advance(&mut rng);
            if tx_count + 1 < self.args.bursts && !self.args.no_wait {
                debug!("sleeping {:.1} s until next burst", interval.as_secs_f64());
                std::thread::sleep(interval);
            }
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    log_setup(args.verbose);
    Transmitter::new(args)?.run()
}
