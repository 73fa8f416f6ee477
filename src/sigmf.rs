//! SigMF capture writer: raw samples in `.sigmf-data` plus a JSON
//! `.sigmf-meta` sidecar describing the recording.

use anyhow::Context;
use num_complex::Complex32;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::iq;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleFormat {
    /// Complex float32 pairs, little-endian.
    Cf32Le,
    /// Complex int16 pairs, little-endian, 12-bit DAC scaling.
    Ci16Le,
}

impl SampleFormat {
    pub fn datatype(self) -> &'static str {
        match self {
            SampleFormat::Cf32Le => "cf32_le",
            SampleFormat::Ci16Le => "ci16_le",
        }
    }
}

#[derive(Serialize)]
struct Global {
    #[serde(rename = "core:datatype")]
    datatype: String,
    #[serde(rename = "core:sample_rate")]
    sample_rate: f64,
    #[serde(rename = "core:version")]
    version: String,
    #[serde(rename = "core:description", skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "core:datetime")]
    datetime: String,
}

#[derive(Serialize)]
struct Capture {
    #[serde(rename = "core:sample_start")]
    sample_start: u64,
    #[serde(rename = "core:frequency", skip_serializing_if = "Option::is_none")]
    frequency: Option<f64>,
}

#[derive(Serialize)]
struct Meta {
    global: Global,
    captures: Vec<Capture>,
    annotations: Vec<serde_json::Value>,
}

pub struct SigmfWriter {
    data: BufWriter<File>,
    meta: Meta,
    base: PathBuf,
    format: SampleFormat,
    samples_written: u64,
}

impl SigmfWriter {
    /// Creates `<base>.sigmf-data` immediately; the metadata sidecar is
    /// written on `close`. The capture timestamp is the creation time,
    /// ISO-8601 UTC.
    pub fn create(
        base: &Path,
        sample_rate: f64,
        frequency: f64,
        format: SampleFormat,
    ) -> anyhow::Result<Self> {
        let data_path = base.with_extension("sigmf-data");
        let data = File::create(&data_path)
            .with_context(|| format!("create {}", data_path.display()))?;
        let meta = Meta {
            global: Global {
                datatype: format.datatype().to_string(),
                sample_rate,
                version: "1.0.0".to_string(),
                description: None,
                datetime: chrono::Utc::now().to_rfc3339(),
            },
            captures: vec![Capture {
                sample_start: 0,
                frequency: Some(frequency),
            }],
            annotations: Vec::new(),
        };
        Ok(Self {
            data: BufWriter::new(data),
            meta,
            base: base.to_path_buf(),
            format,
            samples_written: 0,
        })
    }

    pub fn set_description(&mut self, description: &str) {
        self.meta.global.description = Some(description.to_string());
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    pub fn write_samples(&mut self, samples: &[Complex32]) -> anyhow::Result<()> {
        match self.format {
            SampleFormat::Cf32Le => {
                let mut bytes = Vec::with_capacity(samples.len() * 8);
                for s in samples {
                    bytes.extend_from_slice(&s.re.to_le_bytes());
                    bytes.extend_from_slice(&s.im.to_le_bytes());
                }
                self.data.write_all(&bytes).context("write sigmf-data")?;
            }
            SampleFormat::Ci16Le => {
                let words = iq::to_dac_i16(samples);
                let mut bytes = Vec::with_capacity(words.len() * 2);
                for w in words {
                    bytes.extend_from_slice(&w.to_le_bytes());
                }
                self.data.write_all(&bytes).context("write sigmf-data")?;
            }
        }
        self.samples_written += samples.len() as u64;
        Ok(())
    }

    /// Flushes the data file and writes the JSON sidecar; returns the
    /// sidecar path.
    pub fn close(mut self) -> anyhow::Result<PathBuf> {
        self.data.flush().context("flush sigmf-data")?;
        let meta_path = self.base.with_extension("sigmf-meta");
        let meta_file = File::create(&meta_path)
            .with_context(|| format!("create {}", meta_path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(meta_file), &self.meta)
            .context("write sigmf-meta")?;
        Ok(meta_path)
    }
}
