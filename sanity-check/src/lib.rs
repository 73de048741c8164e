use anyhow::{bail, Context, Result};
use clap::Parser;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use maskstft::{Enhanced, Enhancer, Float, FnMask, StreamConfig, StreamGeometry};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Run a WAV file through STFT analysis, a constant mask and overlap-add
/// synthesis, and report how well the input is reconstructed.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to input WAV file
    pub input: PathBuf,

    /// Path to output WAV file
    pub output: PathBuf,

    /// JSON stream configuration; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Window length in milliseconds
    #[arg(long)]
    pub window_ms: Option<f64>,

    /// Hop as a fraction of the window length
    #[arg(long)]
    pub hop_fraction: Option<f64>,

    /// DFT size in samples
    #[arg(long)]
    pub dft_size: Option<usize>,

    /// Spectral floor for zero-power bins, dB
    #[arg(long, allow_hyphen_values = true)]
    pub floor_db: Option<f64>,

    /// Centre frames in the DFT buffer
    #[arg(long)]
    pub zero_phase: bool,

    /// Constant mask applied to every bin
    #[arg(long, default_value_t = 1.0)]
    pub gain: f32,

    /// Run the transform in double precision
    #[arg(long)]
    pub double: bool,

    /// Keep the leading analysis padding in the output
    #[arg(long)]
    pub keep_latency: bool,

    /// Dump normalised features, one frame per line
    #[arg(long)]
    pub features: Option<PathBuf>,
}

impl Args {
    /// Configuration from `--config` (or defaults) with flag overrides.
    pub fn stream_config(&self) -> Result<StreamConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => StreamConfig::default(),
        };
        if let Some(ms) = self.window_ms {
            config.window_seconds = ms / 1000.0;
        }
        if let Some(frac) = self.hop_fraction {
            config.hop_fraction = frac;
        }
        if let Some(n) = self.dft_size {
            config.dft_size = n;
        }
        if let Some(db) = self.floor_db {
            config.spectral_floor_db = db;
        }
        if self.zero_phase {
            config.zero_phase = true;
        }
        Ok(config)
    }
}

pub fn load_config(path: &Path) -> Result<StreamConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

/// Interleaved samples scaled to `[-1, 1]` and the WAV format they came with.
#[derive(Debug, Clone)]
pub struct Audio {
    pub samples: Vec<f32>,
    pub spec: WavSpec,
}

pub fn read_wav(path: &Path) -> Result<Audio> {
    let mut reader =
        WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                bail!("unsupported bit depth {}", spec.bits_per_sample);
            }
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(Audio { samples, spec })
}

/// Write `samples` (nominally in `[-1, 1]`) with `spec`, clipping integer
/// formats.
pub fn write_wav(path: &Path, samples: &[f64], spec: WavSpec) -> Result<()> {
    let mut writer =
        WavWriter::create(path, spec).with_context(|| format!("creating {}", path.display()))?;
    match spec.sample_format {
        SampleFormat::Float => {
            for &s in samples {
                writer.write_sample(s as f32)?;
            }
        }
        SampleFormat::Int => {
            let full = (1u64 << (spec.bits_per_sample - 1)) as f64;
            let (lo, hi) = (-full, full - 1.0);
            for &s in samples {
                writer.write_sample((s * full).round().clamp(lo, hi) as i32)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Reconstruction SNR of `output` against `gain · reference`, in dB.
pub fn snr_db(reference: &[f32], gain: f64, output: &[f64]) -> f64 {
    let (mut signal, mut noise) = (0.0f64, 0.0f64);
    for (&x, &y) in reference.iter().zip(output) {
        let x = gain * x as f64;
        signal += x * x;
        noise += (x - y) * (x - y);
    }
    if noise == 0.0 {
        return f64::INFINITY;
    }
    10.0 * (signal / noise).log10()
}

pub fn write_features_csv(path: &Path, rows: &[Vec<f32>]) -> Result<()> {
    let mut out = BufWriter::new(
        File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    for row in rows {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(out, "{}", line.join(","))?;
    }
    out.flush()?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Report {
    pub geometry: StreamGeometry,
    pub frames: usize,
    pub latency: usize,
    pub input_len: usize,
    pub output_len: usize,
    pub snr_db: f64,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "window {} hop {} dft {} ({} Hz)",
            self.geometry.window_len,
            self.geometry.hop,
            self.geometry.dft_size,
            self.geometry.sample_rate
        )?;
        writeln!(
            f,
            "frames {} latency {} samples, {} in / {} out",
            self.frames, self.latency, self.input_len, self.output_len
        )?;
        write!(f, "reconstruction SNR {:.1} dB", self.snr_db)
    }
}

fn process<T: Float>(
    config: StreamConfig,
    audio: &Audio,
    gain: f32,
    capture: bool,
) -> Result<(Enhanced, StreamGeometry, Vec<Vec<f32>>)> {
    let enhancer = Enhancer::<T>::new(config, audio.spec.sample_rate)?;
    let geometry = *enhancer.geometry();
    let mut features = Vec::new();
    let mut engine = FnMask::new(geometry.bins, |feature: &[f32], mask: &mut [f32]| {
        if capture {
            features.push(feature.to_vec());
        }
        mask.fill(gain);
    });
    let enhanced = enhancer.enhance(
        &audio.samples,
        usize::from(audio.spec.channels),
        &mut engine,
    )?;
    drop(engine);
    Ok((enhanced, geometry, features))
}

pub fn run(args: &Args) -> Result<Report> {
    let config = args.stream_config()?;
    let audio = read_wav(&args.input)?;
    log::info!(
        "{}: {} samples, {} channel(s) at {} Hz",
        args.input.display(),
        audio.samples.len(),
        audio.spec.channels,
        audio.spec.sample_rate
    );
    let capture = args.features.is_some();
    let (enhanced, geometry, features) = if args.double {
        process::<f64>(config, &audio, args.gain, capture)?
    } else {
        process::<f32>(config, &audio, args.gain, capture)?
    };

    let input_len = audio.samples.len();
    let aligned = enhanced.aligned(input_len);
    let snr = snr_db(&audio.samples, f64::from(args.gain), aligned);
    let output: &[f64] = if args.keep_latency {
        let channels = usize::from(audio.spec.channels);
        let whole = enhanced.samples.len() / channels * channels;
        &enhanced.samples[..whole]
    } else {
        aligned
    };
    write_wav(&args.output, output, audio.spec)?;
    if let Some(path) = &args.features {
        write_features_csv(path, &features)?;
    }
    Ok(Report {
        geometry,
        frames: enhanced.frames,
        latency: enhanced.latency,
        input_len,
        output_len: output.len(),
        snr_db: snr,
    })
}
