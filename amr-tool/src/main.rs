use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::error;

use amr_storage::Mode;

mod decode;
mod encode;
mod info;

fn cli() -> Command {
    let input = Arg::new("INPUT")
        .help("Input file")
        .required(true)
        .value_parser(value_parser!(PathBuf));
    let output = Arg::new("output")
        .short('o')
        .long("output")
        .help("Output file")
        .required(true)
        .value_parser(value_parser!(PathBuf));

    Command::new("amr-tool")
        .about("Inspect, decode and encode AMR / AMR-WB storage format files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("info")
                .about("Show the frame layout of a .amr or .awb file")
                .arg(input.clone())
                .arg(
                    Arg::new("packets")
                        .long("packets")
                        .help("List every TOC group")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("decode")
                .about("Decode a .amr or .awb file to WAV")
                .arg(input.clone())
                .arg(output.clone())
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .help("Fail on the first malformed group instead of decoding best-effort")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("raw")
                        .long("raw")
                        .help("Write headerless 16 bit little-endian PCM")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("encode")
                .about("Encode WAV, MP3 or raw PCM to AMR / AMR-WB")
                .arg(input)
                .arg(output)
                .arg(
                    Arg::new("mode")
                        .short('m')
                        .long("mode")
                        .help("Bitrate, e.g. 12.2k for AMR or 23.85k for AMR-WB")
                        .default_value("12.2k")
                        .value_parser(value_parser!(Mode)),
                )
                .arg(
                    Arg::new("input-format")
                        .long("input-format")
                        .help("wav, mp3 or pcm, taken from the file extension by default")
                        .value_parser(["wav", "mp3", "pcm"]),
                )
                .arg(
                    Arg::new("sample-rate")
                        .long("sample-rate")
                        .help("Sample rate of raw PCM input")
                        .default_value("8000")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("frames-per-group")
                        .long("frames-per-group")
                        .help("Frames sharing one TOC chain")
                        .default_value("1")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("drop-partial")
                        .long("drop-partial")
                        .help("Drop trailing samples that do not fill a frame")
                        .action(ArgAction::SetTrue),
                ),
        )
}

pub(crate) fn path_arg<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .ok_or_else(|| anyhow!("missing argument {}", name))
}

fn run(args: &ArgMatches) -> Result<i32> {
    match args.subcommand() {
        Some(("info", sub)) => info::info(sub),
        #[cfg(feature = "opencore")]
        Some(("decode", sub)) => decode::decode(sub, &amr_storage::engine::OpencoreEngine),
        #[cfg(feature = "opencore")]
        Some(("encode", sub)) => encode::encode(sub, &amr_storage::engine::OpencoreEngine),
        Some((cmd, _)) => Err(anyhow!(
            "{} needs a codec engine, rebuild with --features opencore",
            cmd
        )),
        None => Ok(1),
    }
}

fn main() {
    pretty_env_logger::init();

    let args = cli().get_matches();
    let code = match run(&args) {
        Ok(code) => code,
        Err(err) => {
            error!("{:#}", err);
            1
        }
    };
    std::process::exit(code)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cli() {
        cli().debug_assert();

        let args = cli()
            .try_get_matches_from(["amr-tool", "encode", "in.wav", "-o", "out.awb", "-m", "23.85k"])
            .unwrap();
        let (_, sub) = args.subcommand().unwrap();
        assert_eq!(
            sub.get_one::<Mode>("mode").copied(),
            Some(Mode::Amrwb(amr_storage::AmrwbMode::Amrwb23850))
        );
        assert_eq!(sub.get_one::<usize>("frames-per-group"), Some(&1));

        assert!(cli()
            .try_get_matches_from(["amr-tool", "encode", "in.wav", "-o", "x", "-m", "13k"])
            .is_err());
    }
}
