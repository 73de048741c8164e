use assert_cmd::Command;
use hound::{SampleFormat, WavSpec, WavWriter};

#[test]
fn prints_report() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in.wav");
    let output = tmp.path().join("out.wav");
    let spec = WavSpec {
        channels: 2,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&input, spec).unwrap();
    for i in 0..2_000 {
        let x = ((i as f64 * 0.05).sin() * 8_000.0) as i16;
        writer.write_sample(x).unwrap();
        writer.write_sample(-x).unwrap();
    }
    writer.finalize().unwrap();

    let assert = Command::cargo_bin("sanity-check")
        .unwrap()
        .arg(&input)
        .arg(&output)
        .args(["--floor-db", "-100"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("window 320 hop 160 dft 512"), "{stdout}");
    assert!(stdout.contains("reconstruction SNR"), "{stdout}");
    assert!(output.exists());
}

#[test]
fn rejects_bad_hop() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in.wav");
    let spec = WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&input, spec).unwrap();
    for _ in 0..1_000 {
        writer.write_sample(0.0f32).unwrap();
    }
    writer.finalize().unwrap();

    Command::cargo_bin("sanity-check")
        .unwrap()
        .arg(&input)
        .arg(tmp.path().join("out.wav"))
        .args(["--hop-fraction", "0.9"])
        .assert()
        .failure();
}
