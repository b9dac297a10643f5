//! Invocations of sox, ffmpeg and audiowaveform.
//!
//! Argument lists are built by plain functions so they can be checked
//! without the tools installed.

use anyhow::{Context, bail};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Output};

use mastr_config::MasterSettings;

/// ffmpeg PCM codec for an output bit depth.
pub fn codec_for(bit_depth: u16) -> anyhow::Result<&'static str> {
    match bit_depth {
        16 => Ok("pcm_s16le"),
        24 => Ok("pcm_s24le"),
        32 => Ok("pcm_f32le"),
        other => bail!("no output codec for {other}-bit audio"),
    }
}

/// Run `program` and fail unless it exits successfully.
pub fn run(program: &str, args: &[OsString]) -> anyhow::Result<Output> {
    tracing::debug!(program, ?args, "running external tool");
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to start {program}, is it installed and on PATH?"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{program} exited with {}: {}", output.status, stderr.trim());
    }
    Ok(output)
}

/// `sox <in> -t wavpcm <out>`: rewrite the header as plain PCM.
pub fn repair_args(input: &Path, output: &Path) -> Vec<OsString> {
    vec![input.into(), "-t".into(), "wavpcm".into(), output.into()]
}

/// `ffmpeg` format and rate conversion.
pub fn convert_args(input: &Path, output: &Path, codec: &str, sample_rate: u32) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-i".into(),
        input.into(),
        "-acodec".into(),
        codec.into(),
        "-ar".into(),
        sample_rate.to_string().into(),
        output.into(),
    ]
}

/// The `loudnorm` filter expression for the master targets.
pub fn loudnorm_filter(master: &MasterSettings) -> String {
    format!(
        "loudnorm=I={}:LRA={}:TP={}",
        master.integrated_loudness, master.loudness_range, master.true_peak
    )
}

/// `ffmpeg` loudness normalization plus format and rate conversion.
pub fn loudnorm_args(
    input: &Path,
    output: &Path,
    master: &MasterSettings,
    codec: &str,
    sample_rate: u32,
) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-i".into(),
        input.into(),
        "-af".into(),
        loudnorm_filter(master).into(),
        "-acodec".into(),
        codec.into(),
        "-ar".into(),
        sample_rate.to_string().into(),
        output.into(),
    ]
}

/// `sox <in> <out> --norm=<level>`: peak normalization.
pub fn peak_norm_args(input: &Path, output: &Path, level_db: f64) -> Vec<OsString> {
    vec![input.into(), output.into(), format!("--norm={level_db}").into()]
}

/// Repair `input` into `output` with sox.
pub fn repair_header(input: &Path, output: &Path) -> anyhow::Result<()> {
    run("sox", &repair_args(input, output)).context("header repair failed")?;
    Ok(())
}

/// Convert `input` to `output` at the given depth and rate with ffmpeg.
pub fn convert(input: &Path, output: &Path, bit_depth: u16, sample_rate: u32) -> anyhow::Result<()> {
    let codec = codec_for(bit_depth)?;
    run("ffmpeg", &convert_args(input, output, codec, sample_rate))
        .context("format conversion failed")?;
    Ok(())
}

/// Loudness-normalize `input` into `scratch` with ffmpeg, then
/// peak-normalize `scratch` into `output` with sox.
pub fn normalize(
    input: &Path,
    scratch: &Path,
    output: &Path,
    master: &MasterSettings,
    sample_rate: u32,
) -> anyhow::Result<()> {
    let codec = codec_for(master.bit_depth)?;
    run(
        "ffmpeg",
        &loudnorm_args(input, scratch, master, codec, sample_rate),
    )
    .context("loudness normalization failed")?;
    run("sox", &peak_norm_args(scratch, output, master.peak_norm))
        .context("peak normalization failed")?;
    Ok(())
}

/// Render the spectrogram, waveform and stats reports for one output file
/// into `out_dir`. Failures are logged, never returned.
pub fn write_reports(output: &Path, out_dir: &Path, duration_secs: f64) {
    let Some(stem) = output.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
        return;
    };

    let report = |folder: &str, ext: &str| -> anyhow::Result<std::path::PathBuf> {
        let dir = out_dir.join(folder);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        Ok(dir.join(format!("{stem}.{ext}")))
    };

    let spectrogram = report("Spectrograms", "png").and_then(|png| {
        let args: Vec<OsString> = vec![
            output.into(),
            "-n".into(),
            "spectrogram".into(),
            "-o".into(),
            png.into(),
        ];
        run("sox", &args).map(drop)
    });
    if let Err(e) = spectrogram {
        tracing::warn!(file = %output.display(), "spectrogram skipped: {e:#}");
    }

    let waveform = report("Waveforms", "png").and_then(|png| {
        let args: Vec<OsString> = vec![
            "-i".into(),
            output.into(),
            "-o".into(),
            png.into(),
            "-b".into(),
            "16".into(),
            "-e".into(),
            format!("{duration_secs:.3}").into(),
        ];
        run("audiowaveform", &args).map(drop)
    });
    if let Err(e) = waveform {
        tracing::warn!(file = %output.display(), "waveform skipped: {e:#}");
    }

    // sox prints stats on stderr
    let stats = report("Stats", "txt").and_then(|txt| {
        let args: Vec<OsString> = vec![output.into(), "-n".into(), "stats".into()];
        let result = run("sox", &args)?;
        let mut text = result.stdout;
        text.extend_from_slice(&result.stderr);
        std::fs::write(&txt, text).with_context(|| format!("failed to write {}", txt.display()))
    });
    if let Err(e) = stats {
        tracing::warn!(file = %output.display(), "stats skipped: {e:#}");
    }
}
