//! Integration tests for mastr-cli.
//!
//! Tests cover the CLI binary invocation and end-to-end batch processing
//! workflows that need no external tools.

use mastr_io::{WavSpec, read_wav, read_wav_info, write_wav};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Helper to get the path to the `mastr` binary built by cargo.
fn mastr_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mastr"))
}

const CONFIG: &str = r#"
[master]
gain = 0.8
bit_depth = 24

[hpf]
freq = 60.0

[[parametric]]
freq = 3000.0
gain = -2.0
q = 1.0

[compressor]
threshold = -18.0
ratio = 3.0
attack = 10.0
release = 100.0
knee = 6.0
lookahead = 1.0
"#;

fn write_sine(path: &Path, channels: u16, sample_rate: u32, frames: usize) {
    let samples: Vec<f64> = (0..frames)
        .flat_map(|i| {
            let x = 0.7
                * (2.0 * std::f64::consts::PI * 440.0 * i as f64 / f64::from(sample_rate)).sin();
            std::iter::repeat_n(x, usize::from(channels))
        })
        .collect();
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
    };
    write_wav(path, &samples, spec).unwrap();
}

struct Workspace {
    _root: TempDir,
    input: std::path::PathBuf,
    output: std::path::PathBuf,
    config: std::path::PathBuf,
}

fn workspace(config: &str) -> Workspace {
    let root = TempDir::new().unwrap();
    let input = root.path().join("in");
    std::fs::create_dir_all(&input).unwrap();
    let output = root.path().join("out");
    let config_path = root.path().join("master.toml");
    std::fs::write(&config_path, config).unwrap();
    Workspace {
        input,
        output,
        config: config_path,
        _root: root,
    }
}

fn process(ws: &Workspace) -> std::process::Output {
    mastr_bin()
        .arg("process")
        .arg("--in-path")
        .arg(&ws.input)
        .arg("--out-path")
        .arg(&ws.output)
        .arg("--config")
        .arg(&ws.config)
        .args(["--workers", "2"])
        .output()
        .expect("failed to run mastr process")
}

// ---------------------------------------------------------------------------
// CLI binary tests -- `mastr info`
// ---------------------------------------------------------------------------

#[test]
fn cli_info_prints_metadata() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.wav");
    write_sine(&path, 2, 44100, 22050);

    let output = mastr_bin()
        .arg("info")
        .arg(&path)
        .output()
        .expect("failed to run mastr info");
    assert!(output.status.success(), "mastr info failed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tone.wav"), "got: {stdout}");
    assert!(stdout.contains("Channels:    2"), "got: {stdout}");
    assert!(stdout.contains("44100 Hz"), "got: {stdout}");
    assert!(stdout.contains("16 (PCM)"), "got: {stdout}");
    assert!(stdout.contains("0.500s"), "got: {stdout}");
}

#[test]
fn cli_info_levels() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.wav");
    write_sine(&path, 1, 48000, 4800);

    let output = mastr_bin()
        .args(["info", "--levels"])
        .arg(&path)
        .output()
        .expect("failed to run mastr info");
    assert!(output.status.success());

    // 0.7 peak is about -3.1 dBFS
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Channel 0:"), "got: {stdout}");
    assert!(stdout.contains("peak   -3.1"), "got: {stdout}");
}

#[test]
fn cli_info_missing_file_fails() {
    let output = mastr_bin()
        .arg("info")
        .arg("/definitely/not/here.wav")
        .output()
        .expect("failed to run mastr info");
    assert!(!output.status.success());
}

#[test]
fn cli_help_lists_subcommands() {
    let output = mastr_bin().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("info"));
    assert!(stdout.contains("process"));
}

// ---------------------------------------------------------------------------
// CLI binary tests -- `mastr process`
// ---------------------------------------------------------------------------

#[test]
fn cli_process_batch() {
    let ws = workspace(CONFIG);
    write_sine(&ws.input.join("a.wav"), 2, 48000, 24000);
    write_sine(&ws.input.join("b.wav"), 1, 44100, 4410);
    std::fs::write(ws.input.join("readme.txt"), "not audio").unwrap();

    let output = process(&ws);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    for (name, channels, rate, frames) in [("a.wav", 2, 48000, 24000), ("b.wav", 1, 44100, 4410)] {
        let info = read_wav_info(ws.output.join(name)).unwrap();
        assert_eq!(info.channels, channels);
        assert_eq!(info.sample_rate, rate);
        assert_eq!(info.bits_per_sample, 24, "bit depth comes from the config");
        assert_eq!(info.num_frames, frames);
    }
    assert!(!ws.output.join("readme.txt").exists());

    // Master gain and compression only ever lower a 0.7 sine
    let (samples, _) = read_wav(ws.output.join("a.wav")).unwrap();
    let peak = samples.iter().fold(0.0f64, |m, s| m.max(s.abs()));
    assert!(peak > 0.05 && peak < 0.7, "peak {peak}");
    assert!(samples.chunks_exact(2).all(|f| f[0] == f[1]));
}

#[test]
fn cli_process_recreates_output_dir() {
    let ws = workspace(CONFIG);
    write_sine(&ws.input.join("a.wav"), 1, 44100, 1000);
    std::fs::create_dir_all(&ws.output).unwrap();
    std::fs::write(ws.output.join("stale.wav"), b"old").unwrap();

    let output = process(&ws);
    assert!(output.status.success());
    assert!(ws.output.join("a.wav").exists());
    assert!(!ws.output.join("stale.wav").exists());
}

#[test]
fn cli_process_reports_failed_file_and_continues() {
    let ws = workspace(CONFIG);
    write_sine(&ws.input.join("good.wav"), 2, 44100, 4410);
    std::fs::write(ws.input.join("broken.wav"), b"RIFF nonsense").unwrap();

    let output = process(&ws);
    assert!(!output.status.success(), "a failed file must fail the run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.wav"), "got: {stderr}");
    assert!(stderr.contains("1 of 2 files failed"), "got: {stderr}");
    assert!(ws.output.join("good.wav").exists());
}

#[test]
fn cli_process_rejects_invalid_config() {
    let ws = workspace("[compressor]\nthreshold = -18.0\nratio = 0.5\nattack = 1.0\nrelease = 1.0\n");
    write_sine(&ws.input.join("a.wav"), 1, 44100, 100);

    let output = process(&ws);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ratio"), "got: {stderr}");
    assert!(!ws.output.exists(), "nothing is touched before the config is valid");
}

#[test]
fn cli_process_nyquist_violation_fails_file() {
    // 23 kHz is fine at 48 kHz but above Nyquist at 44.1 kHz
    let ws = workspace("[lpf]\nfreq = 23000.0\n");
    write_sine(&ws.input.join("hi.wav"), 1, 48000, 480);
    write_sine(&ws.input.join("lo.wav"), 1, 44100, 441);

    let output = process(&ws);
    assert!(!output.status.success());
    assert!(ws.output.join("hi.wav").exists());
    assert!(!ws.output.join("lo.wav").exists());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("lpf"), "got: {stderr}");
}
