#![cfg_attr(not(feature = "opencore"), allow(dead_code))]

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use amr_storage::{DecodeOptions, Engine};
use amr_transcode::pcm::write_raw;
use amr_transcode::{container_to_pcm, write_wav};

use crate::path_arg;

pub fn decode<E: Engine>(args: &ArgMatches, engine: &E) -> Result<i32> {
    let input = path_arg(args, "INPUT")?;
    let output = path_arg(args, "output")?;

    let data =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let options = DecodeOptions::new().strict(args.get_flag("strict"));
    let report = container_to_pcm(&data, engine, &options)?;

    let mut file = BufWriter::new(
        File::create(output).with_context(|| format!("Failed to create {}", output.display()))?,
    );
    if args.get_flag("raw") {
        write_raw(&mut file, &report.pcm)?;
    } else {
        write_wav(&mut file, &report.pcm, report.sample_rate())?;
    }
    file.flush()?;

    info!(
        "{}: {} frames in {} groups, {} samples at {} Hz",
        report.kind,
        report.frames,
        report.groups,
        report.pcm.len(),
        report.sample_rate()
    );
    Ok(if report.diagnostics.is_empty() { 0 } else { 2 })
}
