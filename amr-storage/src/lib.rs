//! AMR and AMR-WB storage format (RFC 4867 section 5): TOC chains, frame
//! (de)multiplexing around a pluggable speech codec, and symphonia glue.

pub mod bits;
pub mod consts;
pub mod dec;
pub mod demux;
pub mod engine;
pub mod error;
pub mod format;
pub mod mux;
pub mod sniff;
pub mod toc;

pub use consts::{AmrMode, AmrwbMode, Mode, MAX_TOC_ENTRIES};
pub use dec::{AmrDecoder, CODEC_TYPE_AMR, CODEC_TYPE_AMRWB};
pub use demux::{decode_group, decode_stream, scan, DecodeOptions, DecodeReport, StreamInfo};
pub use engine::{Engine, FrameDecoder, FrameEncoder};
pub use error::{Diagnostic, Error, Result};
pub use format::AmrReader;
pub use mux::{encode_group, encode_stream, EncodeOptions, EncodeReport};
pub use sniff::ContainerKind;
pub use toc::TocEntry;

pub const AMR_SAMPLE_RATE: u32 = 8000;
pub const AMRWB_SAMPLE_RATE: u32 = 16000;
