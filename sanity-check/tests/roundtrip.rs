use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use sanity_check::{read_wav, run, Args};
use std::path::Path;

fn write_tone(path: &Path, spec: WavSpec, len: usize) {
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..len {
        let x = 0.4 * (i as f64 * 0.07).sin() + 0.1 * (i as f64 * 0.31).cos();
        match spec.sample_format {
            SampleFormat::Float => writer.write_sample(x as f32).unwrap(),
            SampleFormat::Int => writer.write_sample((x * 32_767.0) as i16).unwrap(),
        }
    }
    writer.finalize().unwrap();
}

fn args(input: &Path, output: &Path) -> Args {
    Args {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        config: None,
        window_ms: None,
        hop_fraction: None,
        dft_size: None,
        floor_db: None,
        zero_phase: false,
        gain: 1.0,
        double: false,
        keep_latency: false,
        features: None,
    }
}

#[test]
fn float_wav_reconstructs() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in.wav");
    let output = tmp.path().join("out.wav");
    let spec = WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    write_tone(&input, spec, 4_000);

    let report = run(&args(&input, &output)).unwrap();
    assert_eq!(report.geometry.window_len, 320);
    assert_eq!(report.geometry.hop, 160);
    assert_eq!(report.latency, 160);
    assert_eq!(report.output_len, 4_000);
    assert!(report.snr_db > 60.0, "{}", report.snr_db);

    let back = read_wav(&output).unwrap();
    assert_eq!(back.spec, spec);
    assert_eq!(back.samples.len(), 4_000);
}

#[test]
fn int16_wav_keeps_format_and_latency() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in.wav");
    let output = tmp.path().join("out.wav");
    let spec = WavSpec {
        channels: 1,
        sample_rate: 8_000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    write_tone(&input, spec, 2_000);

    let mut a = args(&input, &output);
    a.keep_latency = true;
    a.double = true;
    let report = run(&a).unwrap();
    assert_eq!(report.output_len, report.frames * report.geometry.hop);

    let reader = WavReader::open(&output).unwrap();
    assert_eq!(reader.spec(), spec);
    assert_eq!(reader.len() as usize, report.output_len);
}

#[test]
fn gain_and_feature_dump() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in.wav");
    let output = tmp.path().join("out.wav");
    let csv = tmp.path().join("features.csv");
    let spec = WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    write_tone(&input, spec, 3_200);

    let mut a = args(&input, &output);
    a.gain = 0.5;
    a.features = Some(csv.clone());
    let report = run(&a).unwrap();
    assert!(report.snr_db > 60.0, "{}", report.snr_db);

    let text = std::fs::read_to_string(&csv).unwrap();
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), report.frames);
    assert_eq!(rows[0].split(',').count(), report.geometry.bins);
}

#[test]
fn json_config_is_applied() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in.wav");
    let output = tmp.path().join("out.wav");
    let config = tmp.path().join("stream.json");
    std::fs::write(&config, r#"{ "window_seconds": 0.032, "dft_size": 1024 }"#).unwrap();
    let spec = WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    write_tone(&input, spec, 3_000);

    let mut a = args(&input, &output);
    a.config = Some(config);
    let report = run(&a).unwrap();
    assert_eq!(report.geometry.window_len, 512);
    assert_eq!(report.geometry.dft_size, 1024);
    assert_eq!(report.geometry.bins, 513);
}

#[test]
fn missing_input_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let a = args(&tmp.path().join("nope.wav"), &tmp.path().join("out.wav"));
    assert!(run(&a).is_err());
}
