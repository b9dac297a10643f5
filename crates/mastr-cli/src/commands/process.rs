//! Batch mastering command.

use anyhow::{Context, bail};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use mastr_config::{MasteringConfig, ProcessingChain, validate_config};
use mastr_io::{ProcessingEngine, WavSpec, read_wav, read_wav_info, write_wav};

use crate::external;

#[derive(Args)]
pub struct ProcessArgs {
    /// Directory containing the input WAV files
    #[arg(long, value_name = "DIR")]
    in_path: PathBuf,

    /// Output directory (deleted and recreated)
    #[arg(long, value_name = "DIR")]
    out_path: PathBuf,

    /// Mastering config (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Number of files processed in parallel [default: number of CPUs]
    #[arg(short, long)]
    workers: Option<usize>,

    /// Also render spectrogram, waveform and stats reports
    #[arg(long)]
    spectro: bool,

    /// Rewrite each input header with sox before decoding
    #[arg(long)]
    repair: bool,
}

/// Everything a worker needs, shared read-only across the pool.
struct Job<'a> {
    config: &'a MasteringConfig,
    out_dir: &'a Path,
    repair: bool,
    spectro: bool,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let config = MasteringConfig::load(&args.config)?;
    validate_config(&config)
        .with_context(|| format!("invalid config {}", args.config.display()))?;

    let files = list_wavs(&args.in_path)?;
    prepare_out_dir(&args.in_path, &args.out_path)?;

    if files.is_empty() {
        tracing::warn!(dir = %args.in_path.display(), "no .wav files found");
        return Ok(());
    }

    if args.spectro {
        copy_config(&args.config, &args.out_path);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.workers.unwrap_or(0))
        .build()
        .context("failed to start worker pool")?;

    tracing::info!(
        files = files.len(),
        workers = pool.current_num_threads(),
        stages = config.stage_count(),
        "mastering"
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("invalid progress template")?
            .progress_chars("##-"),
    );

    let job = Job {
        config: &config,
        out_dir: &args.out_path,
        repair: args.repair,
        spectro: args.spectro,
    };

    let failures: Vec<(PathBuf, anyhow::Error)> = pool.install(|| {
        files
            .par_iter()
            .filter_map(|input| {
                let result = job.process(input);
                pb.inc(1);
                match result {
                    Ok(output) => {
                        pb.set_message(file_name(&output));
                        tracing::info!(file = %file_name(input), "done");
                        None
                    }
                    Err(e) => {
                        tracing::error!(file = %file_name(input), "failed: {e:#}");
                        Some((input.clone(), e))
                    }
                }
            })
            .collect()
    });

    pb.finish_and_clear();

    if !failures.is_empty() {
        for (input, e) in &failures {
            eprintln!("!!! {} failed: {e:#}", input.display());
        }
        bail!("{} of {} files failed", failures.len(), files.len());
    }

    println!(
        "Mastered {} file(s) into {}",
        files.len(),
        args.out_path.display()
    );
    Ok(())
}

impl Job<'_> {
    /// Master one file. Returns the output path.
    fn process(&self, input: &Path) -> anyhow::Result<PathBuf> {
        let name = input
            .file_name()
            .with_context(|| format!("{} has no file name", input.display()))?;
        let output = self.out_dir.join(name);

        let repaired = if self.repair {
            let tmp = scratch_wav()?;
            external::repair_header(input, tmp.path())?;
            Some(tmp)
        } else {
            None
        };
        let source = repaired.as_ref().map_or(input, |tmp| tmp.path());

        let (samples, spec) =
            read_wav(source).with_context(|| format!("failed to read {}", input.display()))?;
        let channels = usize::from(spec.channels);
        let sample_rate = f64::from(spec.sample_rate);

        let chain = ProcessingChain::from_config(self.config, sample_rate, channels)?;
        tracing::debug!(
            file = %file_name(input),
            channels,
            sample_rate,
            stages = ?chain.stage_names(),
            "built chain"
        );
        let mut engine = ProcessingEngine::new(channels);
        engine.add_stage(Box::new(chain));
        let processed = engine.process_file(&samples)?;

        let master = &self.config.master;
        let target_rate = master.sample_rate.unwrap_or(spec.sample_rate);

        if master.normalize || target_rate != spec.sample_rate {
            // Float intermediate, so quantization happens once
            let tmp = scratch_wav()?;
            let float_spec = WavSpec {
                bits_per_sample: 32,
                ..spec
            };
            write_wav(tmp.path(), &processed, float_spec)?;

            if master.normalize {
                let scratch = scratch_wav()?;
                external::normalize(tmp.path(), scratch.path(), &output, master, target_rate)?;
            } else {
                external::convert(tmp.path(), &output, master.bit_depth, target_rate)?;
            }
        } else {
            let out_spec = WavSpec {
                bits_per_sample: master.bit_depth,
                ..spec
            };
            write_wav(&output, &processed, out_spec)
                .with_context(|| format!("failed to write {}", output.display()))?;
        }

        if self.spectro {
            match read_wav_info(&output) {
                Ok(info) => external::write_reports(&output, self.out_dir, info.duration_secs),
                Err(e) => tracing::warn!(file = %output.display(), "reports skipped: {e}"),
            }
        }

        Ok(output)
    }
}

/// `*.wav` files directly inside `dir`, sorted by name.
fn list_wavs(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_wav = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if is_wav && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Delete and recreate `out_dir`, refusing to delete the inputs.
fn prepare_out_dir(in_dir: &Path, out_dir: &Path) -> anyhow::Result<()> {
    if out_dir.exists() {
        let in_abs = in_dir.canonicalize()?;
        let out_abs = out_dir.canonicalize()?;
        if in_abs.starts_with(&out_abs) {
            bail!(
                "output directory {} contains the input directory",
                out_dir.display()
            );
        }
        std::fs::remove_dir_all(out_dir)
            .with_context(|| format!("failed to clear {}", out_dir.display()))?;
    }
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    Ok(())
}

fn copy_config(config: &Path, out_dir: &Path) {
    let dir = out_dir.join("Config");
    let result = std::fs::create_dir_all(&dir).and_then(|()| {
        let name = config
            .file_name()
            .unwrap_or(std::ffi::OsStr::new("config.toml"));
        std::fs::copy(config, dir.join(name)).map(drop)
    });
    if let Err(e) = result {
        tracing::warn!(config = %config.display(), "config copy skipped: {e}");
    }
}

fn scratch_wav() -> anyhow::Result<tempfile::NamedTempFile> {
    tempfile::Builder::new()
        .prefix("mastr")
        .suffix(".wav")
        .tempfile()
        .context("failed to create temp file")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
