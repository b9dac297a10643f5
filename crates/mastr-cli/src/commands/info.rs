//! Show the header of a WAV file, optionally with its levels.

use clap::Args;
use mastr_core::linear_to_db;
use mastr_io::{WavFormat, read_wav, read_wav_info};
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// WAV file to inspect
    pub file: PathBuf,

    /// Also decode the file and print per-channel peak and RMS in dBFS
    #[arg(long)]
    pub levels: bool,
}

pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let info = read_wav_info(&args.file)?;
    let encoding = match info.format {
        WavFormat::Pcm => "PCM",
        WavFormat::IeeeFloat => "IEEE Float",
    };

    println!("File:        {}", args.file.display());
    println!("Channels:    {}", info.channels);
    println!("Sample Rate: {} Hz", info.sample_rate);
    println!("Bit Depth:   {} ({encoding})", info.bits_per_sample);
    println!(
        "Duration:    {:.3}s ({} frames)",
        info.duration_secs, info.num_frames
    );

    if args.levels {
        let (samples, spec) = read_wav(&args.file)?;
        for (ch, (peak, rms)) in channel_levels(&samples, usize::from(spec.channels))
            .into_iter()
            .enumerate()
        {
            println!(
                "Channel {ch}:   peak {:>7.2} dBFS, rms {:>7.2} dBFS",
                linear_to_db(peak),
                linear_to_db(rms)
            );
        }
    }

    Ok(())
}

/// Linear (peak, rms) for each channel of an interleaved buffer.
fn channel_levels(samples: &[f64], channels: usize) -> Vec<(f64, f64)> {
    if channels == 0 {
        return Vec::new();
    }
    let mut peaks = vec![0.0f64; channels];
    let mut sums = vec![0.0f64; channels];
    let mut frames = 0usize;
    for frame in samples.chunks_exact(channels) {
        for (ch, &s) in frame.iter().enumerate() {
            peaks[ch] = peaks[ch].max(s.abs());
            sums[ch] += s * s;
        }
        frames += 1;
    }
    peaks
        .into_iter()
        .zip(sums)
        .map(|(peak, sum)| (peak, (sum / frames.max(1) as f64).sqrt()))
        .collect()
}
