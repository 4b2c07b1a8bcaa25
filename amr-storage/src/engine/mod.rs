//! Seam to the speech codec that turns PCM blocks into packed frames and back.
//!
//! Engines speak the packed single-frame format: one header byte carrying the
//! frame type and quality bit, followed by the frame's payload. The container
//! layer never looks inside a payload.

use std::ffi::c_int;

use crate::consts::Mode;
use crate::error::Result;
use crate::sniff::ContainerKind;

#[cfg(any(test, feature = "mock-engine"))]
pub mod mock;
#[cfg(feature = "opencore")]
mod opencore;

#[cfg(any(test, feature = "mock-engine"))]
pub use mock::MockEngine;
#[cfg(feature = "opencore")]
pub use opencore::{OpencoreDecoder, OpencoreEngine, OpencoreEncoder};

pub trait FrameDecoder {
    /// Decode one packed record into `pcm`, which holds exactly one frame.
    fn decode_frame(&mut self, record: &[u8], pcm: &mut [i16]) -> Result<()>;
}

pub trait FrameEncoder {
    /// Encode one frame of PCM into `record` and return the record size the
    /// engine reports. Callers must sanity check that size.
    fn encode_frame(&mut self, pcm: &[i16], mode: Mode, record: &mut [u8]) -> Result<usize>;
}

impl<T: FrameDecoder + ?Sized> FrameDecoder for Box<T> {
    fn decode_frame(&mut self, record: &[u8], pcm: &mut [i16]) -> Result<()> {
        (**self).decode_frame(record, pcm)
    }
}

impl<T: FrameEncoder + ?Sized> FrameEncoder for Box<T> {
    fn encode_frame(&mut self, pcm: &[i16], mode: Mode, record: &mut [u8]) -> Result<usize> {
        (**self).encode_frame(pcm, mode, record)
    }
}

/// Record size for a raw encoder return value. Negative codes read as an
/// empty record, which the multiplexer skips.
pub(crate) fn record_size(ret: c_int) -> usize {
    usize::try_from(ret).unwrap_or(0)
}

/// Factory for codec handles.
///
/// Handles are scoped: whoever creates one owns it for a single encode or
/// decode call, and dropping it releases the underlying codec state.
pub trait Engine {
    type Encoder: FrameEncoder;
    type Decoder: FrameDecoder;

    fn encoder(&self, kind: ContainerKind) -> Result<Self::Encoder>;

    fn decoder(&self, kind: ContainerKind) -> Result<Self::Decoder>;
}
