#![cfg_attr(not(feature = "opencore"), allow(dead_code))]

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use log::info;

use amr_storage::{EncodeOptions, Engine, Mode};
use amr_transcode::pcm::read_raw;
use amr_transcode::{mp3_to_container, pcm_to_container, wav_to_container, Pcm};

use crate::path_arg;

pub fn encode<E: Engine>(args: &ArgMatches, engine: &E) -> Result<i32> {
    let input = path_arg(args, "INPUT")?;
    let output = path_arg(args, "output")?;
    let mode = args.get_one::<Mode>("mode").copied().unwrap_or_default();
    let options = EncodeOptions::new()
        .with_frames_per_group(args.get_one::<usize>("frames-per-group").copied().unwrap_or(1))
        .pad_partial_block(!args.get_flag("drop-partial"));

    let format = match args.get_one::<String>("input-format") {
        Some(format) => format.clone(),
        None => input
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default(),
    };

    let data =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let report = match format.as_str() {
        "wav" => wav_to_container(&data, mode, engine, &options)?,
        "mp3" => mp3_to_container(&data, mode, engine, &options)?,
        "pcm" | "raw" => {
            let sample_rate = args.get_one::<u32>("sample-rate").copied().unwrap_or(8000);
            pcm_to_container(&Pcm::new(read_raw(&data), sample_rate), mode, engine, &options)?
        }
        other => bail!("Unknown input format {:?}, pass --input-format", other),
    };

    std::fs::write(output, &report.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "{} at {}: {} frames in {} groups, {} bytes",
        report.kind,
        mode,
        report.frames,
        report.groups,
        report.bytes.len()
    );
    Ok(if report.diagnostics.is_empty() { 0 } else { 2 })
}
