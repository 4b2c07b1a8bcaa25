use std::fs::{self, File};
use std::io::ErrorKind;

use anyhow::{Context, Result};
use clap::ArgMatches;
use symphonia::core::errors::Error;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;

use amr_storage::{scan, AmrReader};

use crate::path_arg;

pub fn info(args: &ArgMatches) -> Result<i32> {
    let input = path_arg(args, "INPUT")?;
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let info = scan(&data)?;

    println!("{}", input.display());
    println!("  format:   {}", info.kind);
    println!("  groups:   {}", info.groups);
    println!("  frames:   {}", info.frames);
    println!(
        "  samples:  {} at {} Hz",
        info.sample_count(),
        info.kind.sample_rate()
    );
    println!("  duration: {:.3} s", info.duration().as_secs_f64());
    for diag in &info.diagnostics {
        println!("  warning:  {}", diag);
    }

    if args.get_flag("packets") {
        list_packets(File::open(input)?)?;
    }

    Ok(if info.diagnostics.is_empty() { 0 } else { 2 })
}

fn list_packets(file: File) -> Result<()> {
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let mut reader = AmrReader::try_new(mss, &FormatOptions::default())?;

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(err)) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
        };
        let frames = packet.buf().iter().take_while(|b| **b & 0x80 != 0).count() + 1;
        println!(
            "  ts {:>8}  dur {:>5}  frames {:>2}  bytes {:>4}",
            packet.ts,
            packet.dur,
            frames,
            packet.buf().len()
        );
    }
    Ok(())
}
